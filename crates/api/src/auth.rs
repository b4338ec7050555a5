//! `Authorization: Token <key>` header handling.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domain::AccessToken;
use store::StoreError;

use crate::error::ApiError;

/// The caller's access token, extracted from the `Authorization` header.
///
/// Only the header's shape is checked here; the store decides whether the
/// token is valid.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AccessToken);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(StoreError::unauthenticated)?;
        header
            .to_str()
            .ok()
            .and_then(parse_header)
            .map(Self)
            .ok_or_else(|| StoreError::Unauthorized("Invalid token header.".to_string()).into())
    }
}

/// Parses `Token <key>` (or `Bearer <key>`).
pub fn parse_header(value: &str) -> Option<AccessToken> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !key.is_empty() && !key.contains(' ')).then(|| AccessToken::new(key))
}

/// Renders the header value for `token`.
pub fn header_value(token: &AccessToken) -> String {
    format!("Token {}", token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header("Token abc123"), Some(AccessToken::new("abc123")));
        assert_eq!(parse_header("bearer abc123"), Some(AccessToken::new("abc123")));
        assert_eq!(parse_header("Token"), None);
        assert_eq!(parse_header("Token  "), None);
        assert_eq!(parse_header("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_header("Token a b"), None);
    }

    #[test]
    fn test_header_value_parses_back() {
        let token = AccessToken::new("f00d");
        assert_eq!(parse_header(&header_value(&token)), Some(token));
    }
}
