use super::Rule::{self, Digits, Handle, Identity, Pattern};

pub(super) struct Def {
    pub(super) key: &'static str,
    pub(super) label: &'static str,
    pub(super) template: &'static str,
    pub(super) placeholder: &'static str,
    pub(super) rule: Rule,
    pub(super) forms: &'static [Form],
}

/// A second URL shape with its own template, tried before `rule`.
pub(super) struct Form {
    pub(super) host_path: &'static str,
    pub(super) template: &'static str,
}

impl Def {
    const fn with_forms(mut self, forms: &'static [Form]) -> Def {
        self.forms = forms;
        self
    }
}

const fn def(
    key: &'static str,
    label: &'static str,
    template: &'static str,
    placeholder: &'static str,
    rule: Rule,
) -> Def {
    Def { key, label, template, placeholder, rule, forms: &[] }
}

const fn at(host_path: &'static str) -> Rule {
    Handle { host_path, sigil: '@' }
}

// host_path is appended to the shared scheme/subdomain prefix and must
// capture the identifier in group 1.
pub(super) const PLATFORMS: &[Def] = &[
    // social
    def("instagram", "Instagram", "https://instagram.com/{username}", "username", at(r"instagram\.com/([^/?#\s]+)")),
    def("facebook", "Facebook", "https://facebook.com/{username}", "username", at(r"(?:facebook|fb)\.com/([^/?#\s]+)")),
    def("twitter", "X (Twitter)", "https://x.com/{username}", "@username", at(r"(?:twitter|x)\.com/([^/?#\s]+)")),
    def("threads", "Threads", "https://threads.net/@{username}", "@username", at(r"threads\.(?:net|com)/@?([^/?#\s]+)")),
    def("tiktok", "TikTok", "https://tiktok.com/@{username}", "@username", at(r"tiktok\.com/@([^/?#\s]+)")),
    def("snapchat", "Snapchat", "https://snapchat.com/add/{username}", "username", at(r"snapchat\.com/add/([^/?#\s]+)")),
    def("pinterest", "Pinterest", "https://pinterest.com/{username}", "username", at(r"pinterest\.[a-z.]+/([^/?#\s]+)")),
    def("reddit", "Reddit", "https://reddit.com/user/{username}", "u/username", at(r"(?:reddit\.com/)?(?:u|user)/([^/?#\s]+)")),
    def("tumblr", "Tumblr", "https://{username}.tumblr.com", "blogname", at(r"([^/?#\s.]+)\.tumblr\.com")),
    def("bluesky", "Bluesky", "https://bsky.app/profile/{username}", "name.bsky.social", at(r"bsky\.app/profile/([^/?#\s]+)")),
    def("vk", "VK", "https://vk.com/{username}", "username", at(r"vk\.com/([^/?#\s]+)")),
    def("weibo", "Weibo", "https://weibo.com/{username}", "user id", at(r"weibo\.com/(?:u/)?([^/?#\s]+)")),
    def("clubhouse", "Clubhouse", "https://clubhouse.com/@{username}", "@username", at(r"clubhouse\.com/@([^/?#\s]+)")),
    def("quora", "Quora", "https://quora.com/profile/{username}", "Your-Name", at(r"quora\.com/profile/([^/?#\s]+)")),
    // professional
    def("linkedin", "LinkedIn", "https://linkedin.com/in/{username}", "profile name", at(r"linkedin\.com/in/([^/?#\s]+)")),
    def("github", "GitHub", "https://github.com/{username}", "username", at(r"github\.com/([^/?#\s]+)")),
    def("gitlab", "GitLab", "https://gitlab.com/{username}", "username", at(r"gitlab\.com/([^/?#\s]+)")),
    def("bitbucket", "Bitbucket", "https://bitbucket.org/{username}", "workspace", at(r"bitbucket\.org/([^/?#\s]+)")),
    def("stackoverflow", "Stack Overflow", "https://stackoverflow.com/users/{username}", "12345", at(r"stackoverflow\.com/users/([0-9]+)")),
    def("devto", "DEV", "https://dev.to/{username}", "username", at(r"dev\.to/([^/?#\s]+)")),
    def("hashnode", "Hashnode", "https://hashnode.com/@{username}", "@username", at(r"hashnode\.com/@([^/?#\s]+)")),
    def("medium", "Medium", "https://medium.com/@{username}", "@username", at(r"medium\.com/@([^/?#\s]+)")),
    def("substack", "Substack", "https://{username}.substack.com", "publication", at(r"([^/?#\s.]+)\.substack\.com")),
    def("producthunt", "Product Hunt", "https://producthunt.com/@{username}", "@username", at(r"producthunt\.com/@([^/?#\s]+)")),
    def("codepen", "CodePen", "https://codepen.io/{username}", "username", at(r"codepen\.io/([^/?#\s]+)")),
    def("kaggle", "Kaggle", "https://kaggle.com/{username}", "username", at(r"kaggle\.com/([^/?#\s]+)")),
    def("leetcode", "LeetCode", "https://leetcode.com/u/{username}", "username", at(r"leetcode\.com/(?:u/)?([^/?#\s]+)")),
    def("huggingface", "Hugging Face", "https://huggingface.co/{username}", "username", at(r"huggingface\.co/([^/?#\s]+)")),
    def("npm", "npm", "https://npmjs.com/~{username}", "username", at(r"npmjs\.com/~([^/?#\s]+)")),
    def("keybase", "Keybase", "https://keybase.io/{username}", "username", at(r"keybase\.io/([^/?#\s]+)")),
    def("upwork", "Upwork", "https://upwork.com/freelancers/{username}", "~0123abcd", at(r"upwork\.com/freelancers/([^/?#\s]+)")),
    def("fiverr", "Fiverr", "https://fiverr.com/{username}", "username", at(r"fiverr\.com/([^/?#\s]+)")),
    def("calendly", "Calendly", "https://calendly.com/{username}", "username", at(r"calendly\.com/([^/?#\s]+)")),
    // creative
    def("youtube", "YouTube", "https://youtube.com/@{username}", "@channel", at(r"youtube\.com/(?:@|c/|user/)?([^/?#\s]+)"))
        .with_forms(&[
            Form { host_path: r"youtube\.com/channel/([^/?#\s]+)", template: "https://youtube.com/channel/{username}" },
            Form { host_path: r"youtu\.be/([^/?#\s]+)", template: "https://youtu.be/{username}" },
        ]),
    def("twitch", "Twitch", "https://twitch.tv/{username}", "username", at(r"twitch\.tv/([^/?#\s]+)")),
    def("kick", "Kick", "https://kick.com/{username}", "username", at(r"kick\.com/([^/?#\s]+)")),
    def("vimeo", "Vimeo", "https://vimeo.com/{username}", "username", at(r"vimeo\.com/([^/?#\s]+)")),
    def("behance", "Behance", "https://behance.net/{username}", "username", at(r"behance\.net/([^/?#\s]+)")),
    def("dribbble", "Dribbble", "https://dribbble.com/{username}", "username", at(r"dribbble\.com/([^/?#\s]+)")),
    def("deviantart", "DeviantArt", "https://deviantart.com/{username}", "username", at(r"deviantart\.com/([^/?#\s]+)")),
    def("artstation", "ArtStation", "https://artstation.com/{username}", "username", at(r"artstation\.com/([^/?#\s]+)")),
    def("flickr", "Flickr", "https://flickr.com/people/{username}", "username", at(r"flickr\.com/(?:people|photos)/([^/?#\s]+)")),
    def("unsplash", "Unsplash", "https://unsplash.com/@{username}", "@username", at(r"unsplash\.com/@([^/?#\s]+)")),
    def("vsco", "VSCO", "https://vsco.co/{username}", "username", at(r"vsco\.co/([^/?#\s]+)")),
    def("imdb", "IMDb", "https://imdb.com/name/{username}", "nm0000001", at(r"imdb\.com/name/([^/?#\s]+)")),
    def("letterboxd", "Letterboxd", "https://letterboxd.com/{username}", "username", at(r"letterboxd\.com/([^/?#\s]+)")),
    def("goodreads", "Goodreads", "https://goodreads.com/{username}", "username", at(r"goodreads\.com/(?:user/show/)?([^/?#\s]+)")),
    // music
    def("spotify", "Spotify", "https://open.spotify.com/user/{username}", "user id", at(r"spotify\.com/(?:user|artist)/([^/?#\s]+)")),
    def("soundcloud", "SoundCloud", "https://soundcloud.com/{username}", "username", at(r"soundcloud\.com/([^/?#\s]+)")),
    def("bandcamp", "Bandcamp", "https://{username}.bandcamp.com", "artist", at(r"([^/?#\s.]+)\.bandcamp\.com")),
    def("mixcloud", "Mixcloud", "https://mixcloud.com/{username}", "username", at(r"mixcloud\.com/([^/?#\s]+)")),
    def("audiomack", "Audiomack", "https://audiomack.com/{username}", "username", at(r"audiomack\.com/([^/?#\s]+)")),
    // support and commerce
    def("patreon", "Patreon", "https://patreon.com/{username}", "username", at(r"patreon\.com/([^/?#\s]+)")),
    def("kofi", "Ko-fi", "https://ko-fi.com/{username}", "username", at(r"ko-fi\.com/([^/?#\s]+)")),
    def("buymeacoffee", "Buy Me a Coffee", "https://buymeacoffee.com/{username}", "username", at(r"buymeacoffee\.com/([^/?#\s]+)")),
    def("paypal", "PayPal", "https://paypal.me/{username}", "username", at(r"paypal\.me/([^/?#\s]+)")),
    def("venmo", "Venmo", "https://venmo.com/u/{username}", "@username", at(r"venmo\.com/(?:u/)?([^/?#\s]+)")),
    def("cashapp", "Cash App", "https://cash.app/${username}", "$cashtag", Handle { host_path: r"cash\.app/\$([^/?#\s]+)", sigil: '$' }),
    def("gumroad", "Gumroad", "https://{username}.gumroad.com", "username", at(r"([^/?#\s.]+)\.gumroad\.com")),
    def("etsy", "Etsy", "https://etsy.com/shop/{username}", "shop name", at(r"etsy\.com/shop/([^/?#\s]+)")),
    def("depop", "Depop", "https://depop.com/{username}", "username", at(r"depop\.com/([^/?#\s]+)")),
    def("poshmark", "Poshmark", "https://poshmark.com/closet/{username}", "username", at(r"poshmark\.com/closet/([^/?#\s]+)")),
    def("linktree", "Linktree", "https://linktr.ee/{username}", "username", at(r"linktr\.ee/([^/?#\s]+)")),
    def("strava", "Strava", "https://strava.com/athletes/{username}", "athlete id", at(r"strava\.com/athletes/([^/?#\s]+)")),
    def("steam", "Steam", "https://steamcommunity.com/id/{username}", "custom id", at(r"steamcommunity\.com/id/([^/?#\s]+)")),
    // messaging and contact
    def("discord", "Discord", "https://discord.gg/{username}", "invite code", Pattern(r"discord(?:\.gg|\.com/invite|app\.com/invite)/([^/?#\s]+)")),
    def("telegram", "Telegram", "https://t.me/{username}", "@username", at(r"(?:t|telegram)\.me/([^/?#\s]+)")),
    def("line", "LINE", "https://line.me/ti/p/~{username}", "line id", at(r"line\.me/ti/p/~?([^/?#\s]+)")),
    def("skype", "Skype", "skype:{username}?chat", "live:username", Pattern(r"skype:([^?\s]+)")),
    def("whatsapp", "WhatsApp", "https://wa.me/{username}", "+1 234 567 8900", Digits),
    def("phone", "Phone", "tel:+{username}", "+1 234 567 8900", Digits),
    def("email", "Email", "mailto:{username}", "you@example.com", Pattern(r"mailto:([^?\s]+)")),
    def("website", "Website", "https://{username}", "https://example.com", Identity),
];
