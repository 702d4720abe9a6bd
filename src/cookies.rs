//! Cookie helpers built on the `cookie` crate.

use crate::{Error, Result};
use http::{header, HeaderMap, HeaderValue};

pub use cookie::Cookie;

/// Checks that `name=value` goes out as exactly one request cookie.
///
/// # Errors
///
/// Returns [`Error::ConfigurationError`] when the name is empty, when the pair
/// would be read back as something else (a `;` or surrounding whitespace), or
/// when it is not a valid header value.
pub fn validate(name: &str, value: &str) -> Result<()> {
    let rendered = Cookie::new(name, value).to_string();

    let parsed = Cookie::parse(rendered.as_str())
        .map_err(|e| Error::ConfigurationError(format!("Invalid cookie {:?}: {}", name, e)))?;
    if parsed.name() != name || parsed.value() != value {
        return Err(Error::ConfigurationError(format!(
            "Invalid cookie {:?}: does not survive a round trip",
            name
        )));
    }

    HeaderValue::try_from(rendered)
        .map_err(|e| Error::ConfigurationError(format!("Invalid cookie {:?}: {}", name, e)))?;
    Ok(())
}

/// Joins cookies into a single `Cookie` header value, `a=1; b=2`.
///
/// Returns `Ok(None)` when there are no cookies.
///
/// # Errors
///
/// Returns [`Error::ConfigurationError`] when the joined text is not a valid
/// header value.
pub fn cookie_header(cookies: &[(String, String)]) -> Result<Option<HeaderValue>> {
    if cookies.is_empty() {
        return Ok(None);
    }

    let joined = cookies
        .iter()
        .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).to_string())
        .collect::<Vec<_>>()
        .join("; ");

    HeaderValue::try_from(joined)
        .map(Some)
        .map_err(|e| Error::ConfigurationError(format!("Invalid cookie header: {}", e)))
}

/// Parses every `Set-Cookie` header. Unparsable ones are skipped.
///
/// # Examples
///
/// ```
/// use http::{header::SET_COOKIE, HeaderMap, HeaderValue};
/// use restcall::cookies::set_cookies;
///
/// let mut headers = HeaderMap::new();
/// headers.append(SET_COOKIE, HeaderValue::from_static("session=abc; Path=/; HttpOnly"));
/// headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark"));
///
/// let cookies = set_cookies(&headers);
/// assert_eq!(cookies[0].name_value(), ("session", "abc"));
/// assert_eq!(cookies[0].http_only(), Some(true));
/// assert_eq!(cookies[1].name_value(), ("theme", "dark"));
/// ```
pub fn set_cookies(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| match Cookie::parse(value.to_owned()) {
            Ok(cookie) => Some(cookie),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparsable Set-Cookie header");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cookies_no_header() {
        assert!(cookie_header(&[]).unwrap().is_none());
    }

    #[test]
    fn cookies_are_joined() {
        let cookies = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];
        assert_eq!(cookie_header(&cookies).unwrap().unwrap(), "a=1; b=2");
    }

    #[test]
    fn control_characters_are_rejected() {
        let cookies = vec![("bad".to_string(), "a\nb".to_string())];
        assert!(matches!(
            cookie_header(&cookies),
            Err(Error::ConfigurationError(_))
        ));
        assert!(validate("bad", "a\nb").is_err());
    }

    #[test]
    fn pairs_that_would_split_are_rejected() {
        assert!(validate("ok", "1").is_ok());
        assert!(validate("", "1").is_err());
        assert!(validate("id", "1; Path=/").is_err());
    }

    #[test]
    fn malformed_set_cookie_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("novalue"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("=orphan"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("id=\"42\"; Secure"));

        let cookies = set_cookies(&headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name(), "id");
        assert_eq!(cookies[0].value_trimmed(), "42");
        assert_eq!(cookies[0].secure(), Some(true));
    }
}
