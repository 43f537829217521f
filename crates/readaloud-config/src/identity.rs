use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// OpenID Connect identity provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Tenant domain, e.g. `example.us.auth0.com`
    pub domain: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Scopes requested at login
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Override for `https://{domain}`
    #[serde(default)]
    pub base_url: Option<Url>,
}

impl IdentityConfig {
    /// Base URL of the provider's endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the domain does not form a valid URL
    pub fn endpoint_base(&self) -> Result<Url, url::ParseError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("https://{}", self.domain)),
        }
    }
}

/// Document store that receives the signed-in user's identity
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserStoreConfig {
    /// Deployment URL, e.g. `https://happy-animal-123.convex.cloud`
    pub url: Url,
    /// Mutation that upserts the caller
    #[serde(default = "default_put_mutation")]
    pub put_mutation: String,
    /// Query that reads the caller back
    #[serde(default = "default_me_query")]
    pub me_query: String,
}

fn default_scope() -> String {
    "openid profile email".to_string()
}

fn default_put_mutation() -> String {
    "addUser:put".to_string()
}

fn default_me_query() -> String {
    "addUser:me".to_string()
}
