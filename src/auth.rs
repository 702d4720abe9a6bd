//! Authentication strategies.
//!
//! A client authenticates every call through its configured [`Authentication`]:
//!
//! - [`Authentication::None`] sends nothing.
//! - [`Authentication::BearerToken`] sends `Authorization: Bearer <token>`. The token is
//!   either supplied up front or fetched once from a token endpoint with the password
//!   grant and reused for the lifetime of the strategy.
//! - [`Authentication::Integrated`] never produces a header. Its [`Credentials`] are
//!   handed to the transport, which negotiates with the server itself.

use crate::{
    transport::{Transport, TransportRequest},
    Error, Result,
};
use http::{header, HeaderValue, Method, StatusCode};
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use url::{form_urlencoded, Url};

/// The handshake used for integrated credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// HTTP Basic.
    Basic,
    /// NTLM challenge/response.
    Ntlm,
    /// SPNEGO, picking Kerberos or NTLM.
    Negotiate,
    /// Kerberos delegation.
    Kerberos,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthScheme::Basic => "Basic",
            AuthScheme::Ntlm => "NTLM",
            AuthScheme::Negotiate => "Negotiate",
            AuthScheme::Kerberos => "Kerberos",
        };
        f.write_str(name)
    }
}

/// Opaque credentials passed through to the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The handshake the transport should perform.
    pub scheme: AuthScheme,
    /// The account name.
    pub username: String,
    /// The account password.
    pub password: String,
    /// The account domain, for schemes that use one.
    pub domain: Option<String>,
}

impl Credentials {
    /// Creates credentials for `scheme` without a domain.
    pub fn new(scheme: AuthScheme, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme,
            username: username.into(),
            password: password.into(),
            domain: None,
        }
    }

    /// Sets the account domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// How a client authenticates its calls.
#[derive(Debug, Clone, Default)]
pub enum Authentication {
    /// No authentication.
    #[default]
    None,
    /// A bearer token, supplied or fetched on first use.
    BearerToken(BearerToken),
    /// Platform credentials negotiated by the transport.
    Integrated(Credentials),
}

impl Authentication {
    /// Bearer authentication with a token that is already known.
    pub fn bearer(token: impl Into<String>) -> Self {
        Authentication::BearerToken(BearerToken::new(token))
    }

    /// Bearer authentication that fetches its token from `token_uri` on first use.
    ///
    /// A relative `token_uri` is resolved against the client's base address.
    pub fn password_grant(
        username: impl Into<String>,
        password: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> Self {
        Authentication::BearerToken(BearerToken::password_grant(username, password, token_uri))
    }

    /// Credentials handed to the transport for a platform handshake.
    pub fn integrated(credentials: Credentials) -> Self {
        Authentication::Integrated(credentials)
    }

    /// Returns the credentials the transport should use, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Authentication::Integrated(credentials) => Some(credentials),
            _ => None,
        }
    }

    /// Returns the `Authorization` header value for the next call.
    ///
    /// Only the bearer strategy produces a header; it may perform a token fetch
    /// through `transport` the first time it is asked.
    pub async fn authorization(
        &self,
        transport: &dyn Transport,
        base_address: &Url,
    ) -> Result<Option<HeaderValue>> {
        match self {
            Authentication::None | Authentication::Integrated(_) => Ok(None),
            Authentication::BearerToken(bearer) => {
                let token = bearer.token(transport, base_address).await?;
                let mut value = HeaderValue::try_from(format!("Bearer {}", token)).map_err(|e| {
                    Error::ConfigurationError(format!("Invalid bearer token: {}", e))
                })?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
        }
    }
}

#[derive(Clone)]
struct PasswordGrant {
    username: String,
    password: String,
    token_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A bearer token, known up front or fetched once with the password grant.
///
/// Clones share the cached token.
#[derive(Clone)]
pub struct BearerToken {
    grant: Option<Arc<PasswordGrant>>,
    token: Arc<Mutex<Option<String>>>,
}

impl BearerToken {
    /// A strategy that always sends `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            grant: None,
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// A strategy that exchanges `username` and `password` for a token at `token_uri`.
    pub fn password_grant(
        username: impl Into<String>,
        password: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> Self {
        Self {
            grant: Some(Arc::new(PasswordGrant {
                username: username.into(),
                password: password.into(),
                token_uri: token_uri.into(),
            })),
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns `true` once a token is available without a network call.
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Returns the cached token, fetching it first if needed.
    ///
    /// The lock is held across the fetch so concurrent callers wait for a
    /// single round trip. Dropping the future mid-fetch releases the lock and
    /// caches nothing.
    pub async fn token(&self, transport: &dyn Transport, base_address: &Url) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let grant = self.grant.as_ref().ok_or_else(|| Error::AuthFailed {
            status: StatusCode::UNAUTHORIZED,
            message: "No bearer token and no credentials to fetch one".to_string(),
        })?;

        let token = fetch_token(grant, transport, base_address).await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token_uri", &self.grant.as_ref().map(|g| g.token_uri.as_str()))
            .finish_non_exhaustive()
    }
}

async fn fetch_token(
    grant: &PasswordGrant,
    transport: &dyn Transport,
    base_address: &Url,
) -> Result<String> {
    let url = base_address.join(&grant.token_uri)?;

    tracing::debug!(token_uri = %url, "Fetching bearer token");

    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("username", &grant.username)
        .append_pair("password", &grant.password)
        .append_pair("grant_type", "password")
        .finish();

    let mut request = TransportRequest::new(Method::POST, url);
    request.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    request.body = Some(body.into());

    let response = transport.execute(request).await.map_err(Error::from)?;

    if response.status == StatusCode::NOT_FOUND {
        tracing::error!("Token endpoint not found");
        return Err(Error::AuthFailed {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "TokenUri not found".to_string(),
        });
    }

    if !response.status.is_success() {
        tracing::error!(status = response.status.as_u16(), "Token request rejected");
        return Err(Error::AuthFailed {
            status: StatusCode::UNAUTHORIZED,
            message: response.text(),
        });
    }

    let parsed: TokenResponse = serde_json::from_slice(&response.body).map_err(Error::unexpected)?;
    Ok(parsed.access_token)
}
