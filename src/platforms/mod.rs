//! Platform URL resolution.
//!
//! Every supported platform has a URL template with a single `{username}`
//! placeholder and a rule for recovering the bare username from whatever the
//! user typed: a qualified URL, an `@handle` or a plain identifier.
//!
//! ```
//! use socialid::platforms;
//!
//! assert_eq!(platforms::extract_username("github", "https://github.com/alice"), "alice");
//! assert_eq!(platforms::build_url("github", "@alice"), "https://github.com/alice");
//! ```
//!
//! Resolution is permissive: unknown platform keys and inputs that match no
//! rule are passed through unchanged rather than rejected.

mod table;

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

pub const PLACEHOLDER: &str = "{username}";

const URL_PREFIX: &str = r"(?i)^(?:https?://)?(?:www\.|m\.|mobile\.|old\.)?";

/// How the username is recovered from raw input.
pub(crate) enum Rule {
    /// Capture from a URL, otherwise strip one leading sigil.
    Handle { host_path: &'static str, sigil: char },
    /// Capture from a URL, nothing else.
    Pattern(&'static str),
    /// Keep only ASCII digits.
    Digits,
    /// The input already is the value.
    Identity,
}

enum Extractor {
    Handle { pattern: Regex, sigil: char },
    Pattern(Regex),
    Digits,
    Identity,
}

#[derive(Serialize)]
pub struct PlatformTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub template: &'static str,
    pub placeholder: &'static str,
    #[serde(skip)]
    extractor: Extractor,
    #[serde(skip)]
    forms: Vec<(Regex, &'static str)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub url: String,
    pub username: String,
}

static PLATFORMS: LazyLock<HashMap<&'static str, PlatformTemplate>> = LazyLock::new(|| {
    table::PLATFORMS
        .iter()
        .map(|def| {
            let extractor = match def.rule {
                Rule::Handle { host_path, sigil } => Extractor::Handle {
                    pattern: compile(host_path),
                    sigil,
                },
                Rule::Pattern(host_path) => Extractor::Pattern(compile(host_path)),
                Rule::Digits => Extractor::Digits,
                Rule::Identity => Extractor::Identity,
            };

            (def.key, PlatformTemplate {
                key: def.key,
                label: def.label,
                template: def.template,
                placeholder: def.placeholder,
                extractor,
                forms: def.forms
                    .iter()
                    .map(|form| (compile(form.host_path), form.template))
                    .collect(),
            })
        })
        .collect()
});

fn compile(host_path: &str) -> Regex {
    Regex::new(&format!("{URL_PREFIX}{host_path}"))
        .expect("invalid embedded platform pattern")
}

fn fill(template: &str, username: &str) -> String {
    let mut username = username.to_owned();
    while username.contains(PLACEHOLDER) {
        username = username.replace(PLACEHOLDER, "");
    }

    template.replace(PLACEHOLDER, &username)
}

impl PlatformTemplate {
    /// The username in `input` and the template it belongs in.
    fn parse(&self, input: &str) -> (String, &'static str) {
        let trimmed = input.trim();
        for (pattern, template) in &self.forms {
            if let Some(m) = pattern.captures(trimmed).and_then(|caps| caps.get(1)) {
                return (m.as_str().to_owned(), *template);
            }
        }

        (self.rule_username(input), self.template)
    }

    pub fn extract_username(&self, input: &str) -> String {
        self.parse(input).0
    }

    fn rule_username(&self, input: &str) -> String {
        let trimmed = input.trim();
        let captured = |pattern: &Regex| {
            pattern
                .captures(trimmed)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_owned())
        };

        match &self.extractor {
            Extractor::Identity => input.to_owned(),
            Extractor::Digits => {
                let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() { input.to_owned() } else { digits }
            }
            Extractor::Pattern(pattern) => captured(pattern).unwrap_or_else(|| input.to_owned()),
            Extractor::Handle { pattern, sigil } => captured(pattern)
                .or_else(|| {
                    trimmed
                        .strip_prefix(*sigil)
                        .filter(|rest| !rest.is_empty())
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| input.to_owned()),
        }
    }

    /// Substitutes `username` into the main template.
    pub fn url_for(&self, username: &str) -> String {
        fill(self.template, username)
    }

    /// The canonical URL for raw input, keeping the URL shape it came in.
    pub fn url_from(&self, input: &str) -> String {
        let (username, template) = self.parse(input);
        fill(template, &username)
    }
}

pub fn platform(key: &str) -> Option<&'static PlatformTemplate> {
    PLATFORMS.get(key)
}

pub fn is_known(key: &str) -> bool {
    PLATFORMS.contains_key(key)
}

/// All platforms, sorted by label.
pub fn platforms() -> Vec<&'static PlatformTemplate> {
    let mut all: Vec<_> = PLATFORMS.values().collect();
    all.sort_by(|a, b| a.label.cmp(b.label));
    all
}

pub fn is_absolute_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

pub fn extract_username(platform_key: &str, input: &str) -> String {
    match platform(platform_key) {
        Some(platform) => platform.extract_username(input),
        None => input.to_owned(),
    }
}

/// Builds the canonical URL for `input` on the given platform.
///
/// Inputs that already start with `http://` or `https://` are returned
/// verbatim, whatever the platform.
pub fn build_url(platform_key: &str, input: &str) -> String {
    if is_absolute_url(input) {
        return input.to_owned();
    }

    match platform(platform_key) {
        Some(platform) => platform.url_from(input),
        None => input.to_owned(),
    }
}

pub fn resolve(platform_key: &str, input: &str) -> ResolvedLink {
    ResolvedLink {
        url: build_url(platform_key, input),
        username: extract_username(platform_key, input),
    }
}
