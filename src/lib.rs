//! # Restcall - a typed client for controller/action HTTP APIs
//!
//! Restcall talks to conventional CRUD-style HTTP APIs, where resources live
//! under a controller (`api/Users`), optional actions add a path segment
//! (`api/Users/Active`), and failures come back as a JSON error envelope. It
//! is built on top of `reqwest` behind a pluggable [`transport::Transport`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use restcall::{Authentication, ClientOptions, RestClient};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restcall::Error> {
//!     let options = ClientOptions::builder()
//!         .base_address("https://api.example.com/api")?
//!         .controller("Users")
//!         .timeout(Duration::from_secs(10))
//!         .authentication(Authentication::password_grant("alice", "secret", "token"))
//!         .build()?;
//!     let client = RestClient::<User>::new(options)?;
//!
//!     // GET api/Users/1
//!     let user = client.read_one_by(1).await?;
//!     println!("User: {} (took {:?})", user.name, user.latency);
//!
//!     // POST api/Users
//!     let created = client
//!         .create(&User { id: 0, name: "Bob".to_string() })
//!         .await?;
//!     println!("Created: {:?}", created.data);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed operations** - create, edit, delete, read one and read many, each with
//!   overloads for an explicit action, parameter and cancellation token
//! - **URI generation** - scalar parameters become path segments, structured ones a
//!   query string in field order
//! - **Content negotiation** - JSON through `serde_json` or XML through `quick-xml`
//! - **Authentication** - bearer tokens (supplied or fetched once with the password
//!   grant) and integrated credentials handed to the transport
//! - **Structured errors** - non-success responses are translated into
//!   [`details::ExceptionDetails`] with messages, stack trace and model state
//! - **Timeouts and cancellation** - every call is bound to the configured timeout or
//!   to a caller supplied [`CancellationToken`]
//! - **Automatic logging** - structured logging with `tracing`
//!
//! ## Error Handling
//!
//! ```no_run
//! use restcall::{ClientOptions, Error, RestClient};
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Serialize, Deserialize)]
//! # struct User { id: u64, name: String }
//!
//! # async fn example() -> Result<(), Error> {
//! # let options = ClientOptions::builder()
//! #     .base_address("https://api.example.com")?
//! #     .controller("Users")
//! #     .build()?;
//! let client = RestClient::<User>::new(options)?;
//! match client.create(&User { id: 0, name: String::new() }).await {
//!     Ok(response) => println!("Created: {}", response.data.is_some()),
//!     Err(Error::RemoteCallFailed { status, details }) => {
//!         eprintln!("HTTP {}: {:?}", status, details.message);
//!         for message in details.field_errors("Name") {
//!             eprintln!("  Name: {}", message);
//!         }
//!     }
//!     Err(Error::Timeout) => eprintln!("Timed out"),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod cookies;
pub mod details;
mod error;
mod factory;
pub mod formatter;
pub mod options;
mod response;
pub mod transport;
pub mod uri;

pub use auth::{AuthScheme, Authentication, BearerToken, Credentials};
pub use client::RestClient;
pub use details::ExceptionDetails;
pub use error::{Error, Result};
pub use factory::{ClientFactory, Resource};
pub use options::{ClientOptions, ClientOptionsBuilder, ContentType};
pub use response::Response;
pub use tokio_util::sync::CancellationToken;
pub use uri::{Parameter, QueryParams, ToQueryParams};
