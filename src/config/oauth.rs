//! Social login configuration

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    /// `redirect_uri` sent with the code exchange. Defaults to the origin of
    /// the page handling the callback.
    pub redirect_uri: Option<String>,
}
