//! Detection of provider redirects back to the site.

use reqwest::Url;

use super::provider::OAuthProvider;

/// What a provider redirect carried back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackDescriptor {
    pub provider: OAuthProvider,
    pub code: String,
    pub state: String,
    /// The location with query and fragment removed.
    pub clean_location: Url,
}

/// Recognizes a callback location.
///
/// Returns `None` unless the path contains a known provider callback segment
/// and both `code` and `state` query parameters are present and non-empty.
pub fn parse_callback(location: &Url) -> Option<CallbackDescriptor> {
    let path = location.path();
    let provider = OAuthProvider::all()
        .iter()
        .copied()
        .find(|p| path.contains(p.callback_path()))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in location.query_pairs() {
        match key.as_ref() {
            "code" if code.is_none() => code = Some(value.into_owned()),
            "state" if state.is_none() => state = Some(value.into_owned()),
            _ => {}
        }
    }
    let code = code.filter(|c| !c.is_empty())?;
    let state = state.filter(|s| !s.is_empty())?;

    let mut clean_location = location.clone();
    clean_location.set_query(None);
    clean_location.set_fragment(None);

    Some(CallbackDescriptor {
        provider,
        code,
        state,
        clean_location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn detects_google_callback() {
        let descriptor =
            parse_callback(&url("https://book.example/auth/google/callback?code=abc&state=xyz#top"))
                .unwrap();
        assert_eq!(descriptor.provider, OAuthProvider::Google);
        assert_eq!(descriptor.code, "abc");
        assert_eq!(descriptor.state, "xyz");
        assert_eq!(
            descriptor.clean_location.as_str(),
            "https://book.example/auth/google/callback"
        );
    }

    #[test]
    fn detects_facebook_callback_under_a_prefix() {
        let descriptor =
            parse_callback(&url("https://book.example/docs/auth/facebook/callback?state=s&code=c"))
                .unwrap();
        assert_eq!(descriptor.provider, OAuthProvider::Facebook);
    }

    #[test]
    fn missing_state_or_code_is_not_a_callback() {
        assert!(parse_callback(&url("https://book.example/auth/google/callback?code=abc")).is_none());
        assert!(parse_callback(&url("https://book.example/auth/google/callback?state=abc")).is_none());
        assert!(
            parse_callback(&url("https://book.example/auth/google/callback?code=&state=s")).is_none()
        );
    }

    #[test]
    fn unknown_path_is_not_a_callback() {
        assert!(parse_callback(&url("https://book.example/docs/intro?code=a&state=b")).is_none());
    }
}
