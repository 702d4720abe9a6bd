//! Error types for controller calls.
//!
//! Every failure a [`RestClient`](crate::RestClient) can report is a variant of
//! [`Error`]. Each variant carries HTTP semantics through [`Error::status`], so
//! callers that only care about the status code do not need to match on the
//! variant.

use crate::{details::ExceptionDetails, transport::TransportError};
use http::StatusCode;

/// The main error type for controller calls.
///
/// # Examples
///
/// ```no_run
/// use restcall::{ClientOptions, Error, RestClient};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User { id: u64, name: String }
///
/// # async fn example() -> Result<(), Error> {
/// let options = ClientOptions::builder()
///     .base_address("https://api.example.com")?
///     .controller("Users")
///     .build()?;
/// let client = RestClient::<User>::new(options)?;
///
/// match client.read_one_by(42).await {
///     Ok(user) => println!("Found {}", user.name),
///     Err(Error::RemoteCallFailed { status, details }) => {
///         eprintln!("HTTP {}: {:?}", status, details.message);
///         for (field, messages) in &details.model_state {
///             eprintln!("  {}: {}", field, messages.join(", "));
///         }
///     }
///     Err(Error::Timeout) => eprintln!("Gave up waiting"),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty.
    ///
    /// Raised before any network activity takes place.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The call was cancelled or exceeded its deadline.
    ///
    /// A configured timeout and an explicit cancellation are reported the same way.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status code.
    ///
    /// The body of the response has been translated into [`ExceptionDetails`].
    #[error("HTTP error {status}: {}", .details.message.as_deref().unwrap_or("no message"))]
    RemoteCallFailed {
        /// The HTTP status code of the response
        status: StatusCode,
        /// The translated error body
        details: ExceptionDetails,
    },

    /// Any other failure during the call (network error, serialization error).
    ///
    /// The original cause is preserved as the error source.
    #[error("Unexpected error: {source}")]
    Unexpected {
        /// The underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Fetching a bearer token failed.
    ///
    /// `status` is `503 Service Unavailable` when the token endpoint does not
    /// exist and `401 Unauthorized` when the credentials were rejected.
    #[error("Authentication failed ({status}): {message}")]
    AuthFailed {
        /// The status describing the failure
        status: StatusCode,
        /// A human readable description
        message: String,
    },

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the client options were put together,
    /// such as an empty controller or an invalid header value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided or generated.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Wraps any error as [`Error::Unexpected`].
    pub fn unexpected(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Unexpected {
            source: source.into(),
        }
    }

    /// Returns the HTTP status code that describes this error.
    ///
    /// Configuration and URL errors never reach the network and return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use restcall::Error;
    /// use http::StatusCode;
    ///
    /// assert_eq!(Error::Timeout.status(), Some(StatusCode::REQUEST_TIMEOUT));
    /// assert_eq!(
    ///     Error::unexpected("boom").status(),
    ///     Some(StatusCode::INTERNAL_SERVER_ERROR)
    /// );
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::InvalidArgument(_) => Some(StatusCode::BAD_REQUEST),
            Error::Timeout => Some(StatusCode::REQUEST_TIMEOUT),
            Error::RemoteCallFailed { status, .. } => Some(*status),
            Error::Unexpected { .. } => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Error::AuthFailed { status, .. } => Some(*status),
            Error::ConfigurationError(_) => None,
            Error::InvalidUrl(_) => None,
        }
    }

    /// Returns the translated server error, if the server produced one.
    pub fn details(&self) -> Option<&ExceptionDetails> {
        match self {
            Error::RemoteCallFailed { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Returns the primary message of the translated server error.
    pub fn remote_message(&self) -> Option<&str> {
        self.details()?.message.as_deref()
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => Error::Timeout,
            TransportError::Unsupported(message) => Error::ConfigurationError(message),
            TransportError::Other(source) => Error::Unexpected { source },
        }
    }
}

/// A specialized `Result` type for controller calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn auth_failures_keep_their_status() {
        let err = Error::AuthFailed {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "TokenUri not found".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("TokenUri not found"));
    }

    #[test]
    fn unexpected_preserves_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::unexpected(inner);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("pipe closed"));
    }

    #[test]
    fn remote_message_reads_details() {
        let err = Error::RemoteCallFailed {
            status: StatusCode::NOT_FOUND,
            details: ExceptionDetails {
                message: Some("Not found".to_string()),
                ..ExceptionDetails::default()
            },
        };
        assert_eq!(err.remote_message(), Some("Not found"));
        assert_eq!(err.to_string(), "HTTP error 404 Not Found: Not found");
        assert!(Error::Timeout.details().is_none());
    }
}
