//! The value returned by a successful controller call.
//!
//! Besides the entity, a [`Response`] keeps what the server sent back (status,
//! headers and body text) and how long the exchange took, so callers can look
//! at `Location` headers, cookies or the exact payload without a second call.

use crate::cookies::Cookie;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// Entity plus transport details of a 2xx answer.
///
/// `Response<T>` derefs to `T`, so fields of the entity read directly off the
/// response.
///
/// ```no_run
/// use restcall::{ClientOptions, RestClient};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Invoice {
///     number: u32,
///     total_cents: i64,
/// }
///
/// # async fn example() -> Result<(), restcall::Error> {
/// let client = RestClient::<Invoice>::new(
///     ClientOptions::builder()
///         .base_address("https://billing.example.com/api")?
///         .controller("Invoices")
///         .build()?,
/// )?;
///
/// let invoice = client.read_one_by(1001).await?;
/// println!("#{} totals {} cents", invoice.number, invoice.total_cents);
/// println!("{} in {:?}", invoice.status, invoice.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The entity read from the body.
    pub data: T,

    /// Body text exactly as received.
    pub raw_body: String,

    /// Status line code, always in the 2xx range.
    pub status: StatusCode,

    /// Headers as received, repeated ones included.
    pub headers: HeaderMap,

    /// Time from sending the request until the body was read.
    ///
    /// Authentication round trips are not included.
    pub latency: Duration,
}

impl<T> Response<T> {
    /// Assembles a response from its parts.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Swaps the entity for `f(entity)` and keeps everything else.
    ///
    /// ```
    /// # use restcall::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let created = Response::new(
    ///     Some(7u32),
    ///     r#"{"id":7}"#.to_string(),
    ///     StatusCode::CREATED,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(12),
    /// );
    ///
    /// let id = created.map(|entity| entity.unwrap_or_default());
    /// assert_eq!(id.data, 7);
    /// assert_eq!(id.status, StatusCode::CREATED);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Drops the transport details and keeps the entity.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// The first value of header `name`, if it is visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Cookies set by the server, attributes included.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        crate::cookies::set_cookies(&self.headers)
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
