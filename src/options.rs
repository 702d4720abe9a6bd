//! Client configuration.
//!
//! [`ClientOptions`] is put together once with [`ClientOptionsBuilder`] and is
//! read-only for the life of the client that owns it.

use crate::{auth::Authentication, cookies, formatter::Formatter, Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use url::Url;

/// The timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// The payload format spoken with the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// `application/json`
    #[default]
    Json,
    /// `application/xml`
    Xml,
}

impl ContentType {
    /// The formatter for this content type.
    pub fn formatter(self) -> Formatter {
        match self {
            ContentType::Json => Formatter::Json,
            ContentType::Xml => Formatter::Xml,
        }
    }
}

/// Configuration for a [`RestClient`](crate::RestClient).
///
/// # Examples
///
/// ```
/// use restcall::{Authentication, ClientOptions, ContentType};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restcall::Error> {
/// let options = ClientOptions::builder()
///     .base_address("https://api.example.com/v1")?
///     .controller("Users")
///     .content_type(ContentType::Json)
///     .timeout(Duration::from_secs(10))
///     .authentication(Authentication::bearer("secret"))
///     .build()?;
///
/// assert_eq!(options.base_address().as_str(), "https://api.example.com/v1/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    base_address: Url,
    controller: String,
    content_type: ContentType,
    formatter: Formatter,
    timeout: Duration,
    authentication: Authentication,
    default_action: Option<String>,
    default_headers: HeaderMap,
    cookies: Vec<(String, String)>,
}

impl ClientOptions {
    /// Creates a new `ClientOptionsBuilder`.
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::new()
    }

    /// The base address, always ending with `/`.
    pub fn base_address(&self) -> &Url {
        &self.base_address
    }

    /// The controller every call addresses.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// The configured content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// The formatter derived from the content type.
    pub fn formatter(&self) -> Formatter {
        self.formatter
    }

    /// Changes the content type and the derived formatter with it.
    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
        self.formatter = content_type.formatter();
    }

    /// The deadline applied to calls that are not given a cancellation token.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The authentication strategy.
    pub fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    /// The action used by calls that do not name one.
    pub fn default_action(&self) -> Option<&str> {
        self.default_action.as_deref()
    }

    /// Extra headers sent with every call.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Cookies sent with every call.
    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }
}

/// Builder for [`ClientOptions`].
#[derive(Debug, Clone)]
pub struct ClientOptionsBuilder {
    base_address: Option<Url>,
    controller: Option<String>,
    content_type: ContentType,
    timeout: Duration,
    authentication: Authentication,
    default_action: Option<String>,
    default_headers: HeaderMap,
    cookies: Vec<(String, String)>,
}

impl ClientOptionsBuilder {
    /// Creates a builder with JSON, a 30 second timeout and no authentication.
    pub fn new() -> Self {
        Self {
            base_address: None,
            controller: None,
            content_type: ContentType::default(),
            timeout: DEFAULT_TIMEOUT,
            authentication: Authentication::None,
            default_action: None,
            default_headers: HeaderMap::new(),
            cookies: Vec::new(),
        }
    }

    /// Sets the base address, appending a trailing `/` if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, is not an absolute URL, or
    /// cannot have a path appended to it.
    pub fn base_address(mut self, address: impl AsRef<str>) -> Result<Self> {
        let address = address.as_ref().trim();
        if address.is_empty() {
            return Err(Error::ConfigurationError(
                "Base address must not be empty".to_string(),
            ));
        }

        let normalized = if address.ends_with('/') {
            address.to_string()
        } else {
            format!("{}/", address)
        };

        let url = Url::parse(&normalized)?;
        if url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Base address cannot be used as a base: {}",
                address
            )));
        }

        self.base_address = Some(url);
        Ok(self)
    }

    /// Sets the controller.
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Sets the deadline for calls that are not given a cancellation token.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the deadline in milliseconds.
    pub fn timeout_millis(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Sets the authentication strategy.
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    /// Sets the action used by calls that do not name one.
    pub fn default_action(mut self, action: impl Into<String>) -> Self {
        self.default_action = Some(action.into());
        self
    }

    /// Adds a header that will be included in all calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Adds a cookie that will be sent with all calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair is not a single valid cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (name, value) = (name.into(), value.into());
        cookies::validate(&name, &value)?;
        self.cookies.push((name, value));
        Ok(self)
    }

    /// Builds the options.
    ///
    /// # Errors
    ///
    /// Returns an error if no base address or no controller was provided, or
    /// if the default action is empty.
    pub fn build(self) -> Result<ClientOptions> {
        let base_address = self
            .base_address
            .ok_or_else(|| Error::ConfigurationError("Base address is required".to_string()))?;

        let controller = self
            .controller
            .filter(|controller| !controller.is_empty())
            .ok_or_else(|| Error::ConfigurationError("Controller is required".to_string()))?;

        if self.default_action.as_deref() == Some("") {
            return Err(Error::ConfigurationError(
                "Default action must not be empty".to_string(),
            ));
        }

        Ok(ClientOptions {
            base_address,
            controller,
            content_type: self.content_type,
            formatter: self.content_type.formatter(),
            timeout: self.timeout,
            authentication: self.authentication,
            default_action: self.default_action,
            default_headers: self.default_headers,
            cookies: self.cookies,
        })
    }
}

impl Default for ClientOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
