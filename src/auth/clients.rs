use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, Scope, TokenUrl};
use serde::Deserialize;
use serde_json::Value;

use crate::{users::Identity, AppError, AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    pub fn id(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }

    fn endpoints(&self) -> (&'static str, &'static str) {
        use ClientProvider::*;
        match self {
            Google => ("https://accounts.google.com/o/oauth2/auth", "https://oauth2.googleapis.com/token"),
            Github => ("https://github.com/login/oauth/authorize", "https://github.com/login/oauth/access_token"),
        }
    }

    pub fn scopes(&self) -> Vec<Scope> {
        use ClientProvider::*;
        let scopes: &[&str] = match self {
            Google => &["openid", "email", "profile"],
            Github => &["read:user", "user:email"],
        };
        scopes.iter().map(|scope| Scope::new((*scope).to_owned())).collect()
    }

    /// Who the access token belongs to.
    pub async fn fetch_identity(&self, http_client: &reqwest::Client, access_token: &str) -> AppResult<Identity> {
        match self {
            ClientProvider::Google => {
                let body: Value = http_client.get("https://www.googleapis.com/oauth2/v2/userinfo")
                    .bearer_auth(access_token)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                google_identity(&body)
            }
            ClientProvider::Github => fetch_github_identity(http_client, access_token).await,
        }
    }
}

/// Accounts are merged by email, so only a verified one is accepted.
fn google_identity(body: &Value) -> AppResult<Identity> {
    if body.get("verified_email").and_then(Value::as_bool) != Some(true) {
        return Err(AppError::forbidden("Google account has no verified email"));
    }

    Ok(Identity {
        provider_id: body.get_str_field("id")?,
        email: body.get_str_field("email")?,
        name: body.get_str_field("name").ok(),
    })
}

#[derive(Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

async fn fetch_github_identity(http_client: &reqwest::Client, access_token: &str) -> AppResult<Identity> {
    let get = |url: &'static str| {
        http_client.get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, "socialid")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    };

    let user: GithubUser = get("https://api.github.com/user")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Private emails are left out of /user.
    let email = match user.email {
        Some(email) => email,
        None => {
            let emails: Vec<GithubEmail> = get("https://api.github.com/user/emails")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            emails.into_iter()
                .find(|email| email.primary && email.verified)
                .map(|email| email.email)
                .ok_or_else(|| AppError::forbidden("GitHub account has no verified email"))?
        }
    };

    Ok(Identity {
        provider_id: user.id.to_string(),
        email,
        name: user.name.or(Some(user.login)),
    })
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Default)]
pub struct Clients {
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Reads `{"google": {...}, "github": {...}}`; a missing provider stays
    /// disabled.
    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        let client = |provider: ClientProvider| -> AppResult<Option<HappyClient>> {
            let Some(json) = json.get(provider.id()) else {
                return Ok(None);
            };
            let client_id = ClientId::new(json.get_str_field("client_id")?);
            let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

            let (auth_url, token_url) = provider.endpoints();
            let auth_url = AuthUrl::new(auth_url.to_owned()).map_err(anyhow::Error::from)?;
            let token_url = TokenUrl::new(token_url.to_owned()).map_err(anyhow::Error::from)?;
            let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/{}", provider.id()))
                .map_err(anyhow::Error::from)?;

            Ok(Some(
                BasicClient::new(client_id)
                .set_client_secret(client_secret)
                .set_auth_uri(auth_url)
                .set_token_uri(token_url)
                .set_redirect_uri(redirect_url)
            ))
        };

        Ok(
            Clients {
                google_client: client(ClientProvider::Google)?,
                github_client: client(ClientProvider::Github)?,
            }
        )
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or_else(|| AppError::not_found(format!("OAuth provider {provider}")))
    }

    pub fn enabled(&self) -> Vec<ClientProvider> {
        [
            (ClientProvider::Google, self.google_client.is_some()),
            (ClientProvider::Github, self.github_client.is_some()),
        ]
        .into_iter()
        .filter_map(|(provider, enabled)| enabled.then_some(provider))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn providers_without_keys_stay_disabled() {
        let clients = Clients::from_json(json!({
            "github": { "client_id": "id", "client_secret": "secret" }
        }), "http://localhost:8080").unwrap();

        assert_eq!(clients.enabled(), [ClientProvider::Github]);
        assert!(clients.get_client(ClientProvider::Github).is_ok());
        assert!(matches!(clients.get_client(ClientProvider::Google), Err(AppError::NotFound(_))));
    }

    #[test]
    fn google_requires_a_verified_email() {
        let identity = google_identity(&json!({
            "id": "42", "email": "alice@example.com", "verified_email": true, "name": "Alice"
        })).unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.name.as_deref(), Some("Alice"));

        for body in [
            json!({ "id": "42", "email": "alice@example.com", "verified_email": false }),
            json!({ "id": "42", "email": "alice@example.com" }),
        ] {
            assert!(matches!(google_identity(&body), Err(AppError::Forbidden(_))));
        }
    }

    #[test]
    fn incomplete_keys_are_an_error() {
        assert!(Clients::from_json(json!({ "google": { "client_id": "id" } }), "http://localhost").is_err());
    }
}
