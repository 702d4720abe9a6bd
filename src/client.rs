//! Typed client for one controller of a CRUD-style HTTP API.
//!
//! [`RestClient`] exposes five operation families. Every public method is a
//! thin overload that fills in the action and cancellation defaults and hands
//! over to one canonical call per family:
//!
//! | Family      | Verb   | Body   | Result                           |
//! |-------------|--------|--------|----------------------------------|
//! | `create`    | POST   | entity | `Option<T>` (`None` if unparsable) |
//! | `edit`      | PUT    | entity | `Option<T>` (`None` if unparsable) |
//! | `delete`    | DELETE | none   | `()`                             |
//! | `read_one`  | GET    | none   | `T`                              |
//! | `read_many` | GET    | none   | `Vec<T>`                         |

use crate::{
    cookies::cookie_header,
    details::translate,
    formatter::Formatter,
    options::ClientOptions,
    transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse},
    uri::{generate_uri_with, Parameter, QueryPrefix},
    Error, Response, Result,
};
use http::{header, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt,
    marker::PhantomData,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;

/// A client bound to one controller and one entity type.
///
/// Cloning is cheap; clones share the transport and the options. The
/// transport is released when the last clone is dropped.
///
/// # Examples
///
/// ```no_run
/// use restcall::{ClientOptions, RestClient};
/// use restcall::uri::QueryParams;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restcall::Error> {
/// let options = ClientOptions::builder()
///     .base_address("https://api.example.com/api")?
///     .controller("Users")
///     .build()?;
/// let client = RestClient::<User>::new(options)?;
///
/// // POST api/Users
/// let created = client.create(&User { id: 0, name: "Alice".to_string() }).await?;
/// println!("Created: {:?}", created.data);
///
/// // GET api/Users/7
/// let user = client.read_one_by(7).await?;
///
/// // GET api/Users/Search?name=Alice
/// let found = client
///     .read_many_by_action(QueryParams::new().with("name", "Alice"), "Search")
///     .await?;
/// println!("{} matches", found.len());
///
/// // DELETE api/Users/7
/// client.delete_by(user.id).await?;
/// # Ok(())
/// # }
/// ```
pub struct RestClient<T> {
    inner: Arc<ClientInner>,
    _entity: PhantomData<fn() -> T>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
}

impl<T> Clone for RestClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("entity", &std::any::type_name::<T>())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

/// How a call ends when it takes too long.
enum Deadline<'a> {
    After(Duration),
    Token(&'a CancellationToken),
}

struct Sent {
    response: TransportResponse,
    latency: Duration,
}

impl<T> RestClient<T> {
    /// Creates a client that talks through a default [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Kept fallible so transport construction can report configuration
    /// problems; the default transport currently never fails.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Ok(Self::with_transport(options, Arc::new(ReqwestTransport::new())))
    }

    /// Creates a client that talks through `transport`.
    pub fn with_transport(options: ClientOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { transport, options }),
            _entity: PhantomData,
        }
    }

    /// The options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    fn formatter(&self) -> Formatter {
        self.inner.options.formatter()
    }

    fn default_action(&self) -> Option<&str> {
        self.inner.options.default_action()
    }

    fn timeout(&self) -> Deadline<'static> {
        Deadline::After(self.inner.options.timeout())
    }

    /// Runs one exchange under `deadline`.
    ///
    /// The deadline covers the bearer token fetch as well as the request
    /// itself; expiry or cancellation at any point is [`Error::Timeout`].
    async fn send(
        &self,
        method: Method,
        action: Option<&str>,
        parameter: Option<&Parameter>,
        prefix: QueryPrefix,
        body: Option<Vec<u8>>,
        deadline: Deadline<'_>,
    ) -> Result<Sent> {
        let start_time = Instant::now();
        let exchange = self.exchange(method, action, parameter, prefix, body);

        let outcome = match deadline {
            Deadline::After(timeout) => tokio::time::timeout(timeout, exchange).await.ok(),
            Deadline::Token(token) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = exchange => Some(result),
            },
        };

        outcome.unwrap_or_else(|| {
            tracing::warn!(
                elapsed_ms = start_time.elapsed().as_millis(),
                "Request cancelled or timed out"
            );
            Err(Error::Timeout)
        })
    }

    /// Authenticates, builds and sends one request, and rejects non-success responses.
    async fn exchange(
        &self,
        method: Method,
        action: Option<&str>,
        parameter: Option<&Parameter>,
        prefix: QueryPrefix,
        body: Option<Vec<u8>>,
    ) -> Result<Sent> {
        let options = &self.inner.options;
        let transport = self.inner.transport.as_ref();

        let authorization = options
            .authentication()
            .authorization(transport, options.base_address())
            .await?;

        let uri = generate_uri_with(options.controller(), action, parameter, prefix)?;
        let url = options.base_address().join(&uri)?;

        let mut headers = options.default_headers().clone();
        let media_type = HeaderValue::from_static(self.formatter().media_type());
        headers.insert(header::ACCEPT, media_type.clone());
        if body.is_some() {
            headers.insert(header::CONTENT_TYPE, media_type);
        }
        if let Some(cookies) = cookie_header(options.cookies())? {
            headers.insert(header::COOKIE, cookies);
        }
        if let Some(authorization) = authorization {
            headers.insert(header::AUTHORIZATION, authorization);
        }

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");

        let request = TransportRequest {
            method,
            url,
            headers,
            body: body.map(Into::into),
            credentials: options.authentication().credentials().cloned(),
        };

        let start_time = Instant::now();
        let response = transport.execute(request).await?;
        let latency = start_time.elapsed();

        let status = response.status;
        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(status = status.as_u16(), "Client error (4xx)");
            } else if status.is_server_error() {
                tracing::warn!(status = status.as_u16(), "Server error (5xx)");
            }
            return Err(translate(&response));
        }

        Ok(Sent { response, latency })
    }
}

fn respond<D>(sent: Sent, data: D) -> Response<D> {
    let raw_body = sent.response.text();
    Response::new(
        data,
        raw_body,
        sent.response.status,
        sent.response.headers,
        sent.latency,
    )
}

fn require_action(action: &str) -> Result<&str> {
    if action.is_empty() {
        return Err(Error::InvalidArgument("action must not be empty".to_string()));
    }
    Ok(action)
}

fn require_parameter(parameter: impl Into<Parameter>) -> Result<Parameter> {
    let parameter = parameter.into();
    if parameter.is_empty() {
        return Err(Error::InvalidArgument(
            "parameter must not be empty".to_string(),
        ));
    }
    Ok(parameter)
}

impl<T> RestClient<T>
where
    T: Serialize + DeserializeOwned,
{
    async fn write_call(
        &self,
        method: Method,
        entity: &T,
        action: Option<&str>,
        deadline: Deadline<'_>,
    ) -> Result<Response<Option<T>>> {
        let formatter = self.formatter();
        let body = formatter.serialize(entity).map_err(Error::unexpected)?;

        let sent = self
            .send(method, action, None, QueryPrefix::Question, Some(body), deadline)
            .await?;

        let data = match formatter.deserialize::<T>(&sent.response.body) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    status = sent.response.status.as_u16(),
                    "Response body is not an entity, returning no value"
                );
                None
            }
        };

        Ok(respond(sent, data))
    }

    async fn delete_call(
        &self,
        parameter: Option<&Parameter>,
        action: Option<&str>,
        deadline: Deadline<'_>,
    ) -> Result<Response<()>> {
        let sent = self
            .send(Method::DELETE, action, parameter, QueryPrefix::None, None, deadline)
            .await?;
        Ok(respond(sent, ()))
    }

    async fn read_one_call(
        &self,
        parameter: Option<&Parameter>,
        action: Option<&str>,
        deadline: Deadline<'_>,
    ) -> Result<Response<T>> {
        let sent = self
            .send(Method::GET, action, parameter, QueryPrefix::Question, None, deadline)
            .await?;
        let data = self
            .formatter()
            .deserialize::<T>(&sent.response.body)
            .map_err(Error::unexpected)?;
        Ok(respond(sent, data))
    }

    async fn read_many_call(
        &self,
        parameter: Option<&Parameter>,
        action: Option<&str>,
        deadline: Deadline<'_>,
    ) -> Result<Response<Vec<T>>> {
        let sent = self
            .send(Method::GET, action, parameter, QueryPrefix::Question, None, deadline)
            .await?;
        let data = self
            .formatter()
            .deserialize_many::<T>(&sent.response.body)
            .map_err(Error::unexpected)?;
        Ok(respond(sent, data))
    }

    // create

    /// POSTs `entity` to the controller.
    ///
    /// The response body is deserialized as `T`; a body that is not a `T`
    /// yields `None` instead of an error.
    pub async fn create(&self, entity: &T) -> Result<Response<Option<T>>> {
        self.write_call(Method::POST, entity, self.default_action(), self.timeout())
            .await
    }

    /// Like [`create`](Self::create), ending the call when `token` is cancelled.
    pub async fn create_cancellable(
        &self,
        entity: &T,
        token: &CancellationToken,
    ) -> Result<Response<Option<T>>> {
        self.write_call(Method::POST, entity, self.default_action(), Deadline::Token(token))
            .await
    }

    /// POSTs `entity` to `controller/action`.
    pub async fn create_action(&self, entity: &T, action: &str) -> Result<Response<Option<T>>> {
        let action = require_action(action)?;
        self.write_call(Method::POST, entity, Some(action), self.timeout())
            .await
    }

    /// POSTs `entity` to `controller/action`, ending the call when `token` is cancelled.
    pub async fn create_action_cancellable(
        &self,
        entity: &T,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<Option<T>>> {
        let action = require_action(action)?;
        self.write_call(Method::POST, entity, Some(action), Deadline::Token(token))
            .await
    }

    // edit

    /// PUTs `entity` to the controller.
    ///
    /// Like [`create`](Self::create), an unparsable response body yields `None`.
    pub async fn edit(&self, entity: &T) -> Result<Response<Option<T>>> {
        self.write_call(Method::PUT, entity, self.default_action(), self.timeout())
            .await
    }

    /// Like [`edit`](Self::edit), ending the call when `token` is cancelled.
    pub async fn edit_cancellable(
        &self,
        entity: &T,
        token: &CancellationToken,
    ) -> Result<Response<Option<T>>> {
        self.write_call(Method::PUT, entity, self.default_action(), Deadline::Token(token))
            .await
    }

    /// PUTs `entity` to `controller/action`.
    pub async fn edit_action(&self, entity: &T, action: &str) -> Result<Response<Option<T>>> {
        let action = require_action(action)?;
        self.write_call(Method::PUT, entity, Some(action), self.timeout())
            .await
    }

    /// PUTs `entity` to `controller/action`, ending the call when `token` is cancelled.
    pub async fn edit_action_cancellable(
        &self,
        entity: &T,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<Option<T>>> {
        let action = require_action(action)?;
        self.write_call(Method::PUT, entity, Some(action), Deadline::Token(token))
            .await
    }

    // delete

    /// Sends DELETE to the controller.
    pub async fn delete(&self) -> Result<Response<()>> {
        self.delete_call(None, self.default_action(), self.timeout())
            .await
    }

    /// Sends DELETE to the controller, ending the call when `token` is cancelled.
    pub async fn delete_cancellable(&self, token: &CancellationToken) -> Result<Response<()>> {
        self.delete_call(None, self.default_action(), Deadline::Token(token))
            .await
    }

    /// Sends DELETE to `controller/action`.
    pub async fn delete_action(&self, action: &str) -> Result<Response<()>> {
        let action = require_action(action)?;
        self.delete_call(None, Some(action), self.timeout()).await
    }

    /// Sends DELETE to `controller/action`, ending the call when `token` is cancelled.
    pub async fn delete_action_cancellable(
        &self,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<()>> {
        let action = require_action(action)?;
        self.delete_call(None, Some(action), Deadline::Token(token))
            .await
    }

    /// Sends DELETE for `parameter`.
    ///
    /// A scalar becomes `controller/42`. A structured parameter is appended
    /// directly after the path, without a `?`.
    pub async fn delete_by(&self, parameter: impl Into<Parameter>) -> Result<Response<()>> {
        let parameter = require_parameter(parameter)?;
        self.delete_call(Some(&parameter), self.default_action(), self.timeout())
            .await
    }

    /// Like [`delete_by`](Self::delete_by), ending the call when `token` is cancelled.
    pub async fn delete_by_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        token: &CancellationToken,
    ) -> Result<Response<()>> {
        let parameter = require_parameter(parameter)?;
        self.delete_call(Some(&parameter), self.default_action(), Deadline::Token(token))
            .await
    }

    /// Sends DELETE for `parameter` to `controller/action`.
    pub async fn delete_by_action(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
    ) -> Result<Response<()>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.delete_call(Some(&parameter), Some(action), self.timeout())
            .await
    }

    /// Sends DELETE for `parameter` to `controller/action`, ending the call when `token` is cancelled.
    pub async fn delete_by_action_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<()>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.delete_call(Some(&parameter), Some(action), Deadline::Token(token))
            .await
    }

    // read_one

    /// GETs a single entity from the controller.
    ///
    /// A body that is not a `T` is reported as [`Error::Unexpected`].
    pub async fn read_one(&self) -> Result<Response<T>> {
        self.read_one_call(None, self.default_action(), self.timeout())
            .await
    }

    /// Like [`read_one`](Self::read_one), ending the call when `token` is cancelled.
    pub async fn read_one_cancellable(&self, token: &CancellationToken) -> Result<Response<T>> {
        self.read_one_call(None, self.default_action(), Deadline::Token(token))
            .await
    }

    /// GETs a single entity from `controller/action`.
    pub async fn read_one_action(&self, action: &str) -> Result<Response<T>> {
        let action = require_action(action)?;
        self.read_one_call(None, Some(action), self.timeout()).await
    }

    /// GETs a single entity from `controller/action`, ending the call when `token` is cancelled.
    pub async fn read_one_action_cancellable(
        &self,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<T>> {
        let action = require_action(action)?;
        self.read_one_call(None, Some(action), Deadline::Token(token))
            .await
    }

    /// GETs the entity identified by `parameter`.
    pub async fn read_one_by(&self, parameter: impl Into<Parameter>) -> Result<Response<T>> {
        let parameter = require_parameter(parameter)?;
        self.read_one_call(Some(&parameter), self.default_action(), self.timeout())
            .await
    }

    /// Like [`read_one_by`](Self::read_one_by), ending the call when `token` is cancelled.
    pub async fn read_one_by_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        token: &CancellationToken,
    ) -> Result<Response<T>> {
        let parameter = require_parameter(parameter)?;
        self.read_one_call(Some(&parameter), self.default_action(), Deadline::Token(token))
            .await
    }

    /// GETs the entity identified by `parameter` from `controller/action`.
    pub async fn read_one_by_action(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
    ) -> Result<Response<T>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.read_one_call(Some(&parameter), Some(action), self.timeout())
            .await
    }

    /// GETs the entity identified by `parameter` from `controller/action`, ending the call when `token` is cancelled.
    pub async fn read_one_by_action_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<T>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.read_one_call(Some(&parameter), Some(action), Deadline::Token(token))
            .await
    }

    // read_many

    /// GETs the entities of the controller.
    pub async fn read_many(&self) -> Result<Response<Vec<T>>> {
        self.read_many_call(None, self.default_action(), self.timeout())
            .await
    }

    /// Like [`read_many`](Self::read_many), ending the call when `token` is cancelled.
    pub async fn read_many_cancellable(&self, token: &CancellationToken) -> Result<Response<Vec<T>>> {
        self.read_many_call(None, self.default_action(), Deadline::Token(token))
            .await
    }

    /// GETs the entities of `controller/action`.
    pub async fn read_many_action(&self, action: &str) -> Result<Response<Vec<T>>> {
        let action = require_action(action)?;
        self.read_many_call(None, Some(action), self.timeout()).await
    }

    /// GETs the entities of `controller/action`, ending the call when `token` is cancelled.
    pub async fn read_many_action_cancellable(
        &self,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<Vec<T>>> {
        let action = require_action(action)?;
        self.read_many_call(None, Some(action), Deadline::Token(token))
            .await
    }

    /// GETs the entities matching `parameter`.
    pub async fn read_many_by(&self, parameter: impl Into<Parameter>) -> Result<Response<Vec<T>>> {
        let parameter = require_parameter(parameter)?;
        self.read_many_call(Some(&parameter), self.default_action(), self.timeout())
            .await
    }

    /// Like [`read_many_by`](Self::read_many_by), ending the call when `token` is cancelled.
    pub async fn read_many_by_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        token: &CancellationToken,
    ) -> Result<Response<Vec<T>>> {
        let parameter = require_parameter(parameter)?;
        self.read_many_call(Some(&parameter), self.default_action(), Deadline::Token(token))
            .await
    }

    /// GETs the entities matching `parameter` from `controller/action`.
    pub async fn read_many_by_action(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
    ) -> Result<Response<Vec<T>>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.read_many_call(Some(&parameter), Some(action), self.timeout())
            .await
    }

    /// GETs the entities matching `parameter` from `controller/action`, ending the call when `token` is cancelled.
    pub async fn read_many_by_action_cancellable(
        &self,
        parameter: impl Into<Parameter>,
        action: &str,
        token: &CancellationToken,
    ) -> Result<Response<Vec<T>>> {
        let parameter = require_parameter(parameter)?;
        let action = require_action(action)?;
        self.read_many_call(Some(&parameter), Some(action), Deadline::Token(token))
            .await
    }
}
