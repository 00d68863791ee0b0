//! Bearer token resolution from the endpoint URL fragment.
//!
//! The backend prints its endpoint as `http://127.0.0.1:PORT/#token=...` on
//! startup; the credential travels in the fragment so it never appears in
//! request paths or server logs. The resolver extracts it once, memoizes it
//! for the session, and discards the fragment so the credential cannot leak
//! through later URL display.

use percent_encoding::percent_decode_str;
use std::sync::Mutex;
use url::Url;

struct ResolverState {
    token: String,
    fragment: String,
}

/// Lazily resolves and caches the bearer token from a URL fragment.
pub struct TokenResolver {
    state: Mutex<ResolverState>,
}

impl TokenResolver {
    /// Create a resolver over a raw fragment string (without the `#`).
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ResolverState {
                token: String::new(),
                fragment: fragment.into(),
            }),
        }
    }

    /// Strip the fragment off `url` and build a resolver over it.
    pub fn from_url(url: &mut Url) -> Self {
        let fragment = url.fragment().unwrap_or("").to_string();
        url.set_fragment(None);
        Self::new(fragment)
    }

    /// Return the session token, or an empty string if none is available.
    ///
    /// The cached token is returned once resolved; until then the retained
    /// fragment is re-parsed on every call. On the first successful parse
    /// the fragment is cleared.
    pub fn resolve(&self) -> String {
        let mut state = self.state.lock().unwrap();

        if !state.token.is_empty() {
            return state.token.clone();
        }

        if let Some(token) = parse_token(&state.fragment) {
            state.token = token.clone();
            state.fragment.clear();
            return token;
        }

        String::new()
    }
}

/// Find a `token` key in an `&`-separated `key=value` fragment.
fn parse_token(fragment: &str) -> Option<String> {
    for pair in fragment.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() != Some("token") {
            continue;
        }
        if let Some(value) = parts.next() {
            let decoded = percent_decode_str(value).decode_utf8_lossy().to_string();
            if !decoded.is_empty() {
                return Some(decoded);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_memoizes_and_clears_fragment() {
        let resolver = TokenResolver::new("token=abc");

        assert_eq!(resolver.resolve(), "abc");
        assert!(resolver.state.lock().unwrap().fragment.is_empty());
        assert_eq!(resolver.resolve(), "abc");
    }

    #[test]
    fn test_resolve_without_token_returns_empty() {
        let resolver = TokenResolver::new("foo=bar&baz=1");
        assert_eq!(resolver.resolve(), "");
        // Unresolved: the fragment is kept for later attempts.
        assert_eq!(resolver.state.lock().unwrap().fragment, "foo=bar&baz=1");
    }

    #[test]
    fn test_resolve_token_among_other_pairs() {
        let resolver = TokenResolver::new("lang=en&token=s3cret&theme=dark");
        assert_eq!(resolver.resolve(), "s3cret");
    }

    #[test]
    fn test_resolve_percent_encoded_token() {
        let resolver = TokenResolver::new("token=a%2Fb%3Dc");
        assert_eq!(resolver.resolve(), "a/b=c");
    }

    #[test]
    fn test_from_url_strips_fragment() {
        let mut url = Url::parse("http://127.0.0.1:9763/#token=abc").unwrap();
        let resolver = TokenResolver::from_url(&mut url);

        assert_eq!(url.fragment(), None);
        assert_eq!(resolver.resolve(), "abc");
    }

    #[test]
    fn test_empty_token_value_stays_unresolved() {
        let resolver = TokenResolver::new("token=");
        assert_eq!(resolver.resolve(), "");
        assert_eq!(resolver.state.lock().unwrap().fragment, "token=");
    }
}
