//! Argument validation and transport plumbing, checked with a recording transport.

use async_trait::async_trait;
use http::StatusCode;
use restcall::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use restcall::uri::QueryParams;
use restcall::{Authentication, CancellationToken, ClientOptions, Error, RestClient};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Note {
    id: u32,
    text: String,
}

#[derive(Default)]
struct Spy {
    requests: Mutex<Vec<TransportRequest>>,
    fail_with_network_error: bool,
}

impl Spy {
    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> TransportRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for Spy {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        if self.fail_with_network_error {
            let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            return Err(TransportError::Other(Box::new(cause)));
        }
        Ok(TransportResponse::new(StatusCode::OK, r#"{"id":1,"text":"hi"}"#))
    }
}

fn spy_client(spy: Arc<Spy>) -> RestClient<Note> {
    let options = ClientOptions::builder()
        .base_address("http://notes.local/api")
        .unwrap()
        .controller("Notes")
        .authentication(Authentication::bearer("tok"))
        .build()
        .unwrap();
    RestClient::with_transport(options, spy)
}

fn note() -> Note {
    Note {
        id: 1,
        text: "hi".to_string(),
    }
}

fn assert_invalid<T: std::fmt::Debug>(result: restcall::Result<T>) {
    assert!(
        matches!(result, Err(Error::InvalidArgument(_))),
        "expected InvalidArgument, got {:?}",
        result
    );
}

#[tokio::test]
async fn empty_arguments_never_reach_the_transport() {
    let spy = Arc::new(Spy::default());
    let client = spy_client(spy.clone());
    let token = CancellationToken::new();

    assert_invalid(client.create_action(&note(), "").await);
    assert_invalid(client.create_action_cancellable(&note(), "", &token).await);
    assert_invalid(client.edit_action(&note(), "").await);
    assert_invalid(client.edit_action_cancellable(&note(), "", &token).await);
    assert_invalid(client.delete_action("").await);
    assert_invalid(client.delete_by("").await);
    assert_invalid(client.delete_by_action(1, "").await);
    assert_invalid(client.delete_by_action_cancellable("", "Remove", &token).await);
    assert_invalid(client.read_one_action("").await);
    assert_invalid(client.read_one_by(String::new()).await);
    assert_invalid(client.read_one_by_action_cancellable(1, "", &token).await);
    assert_invalid(client.read_many_action_cancellable("", &token).await);
    assert_invalid(client.read_many_by("").await);
    assert_invalid(client.read_many_by_action(QueryParams::new(), "").await);

    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn request_carries_per_call_headers() {
    let spy = Arc::new(Spy::default());
    let client = spy_client(spy.clone());

    client.create(&note()).await.unwrap();

    let request = spy.last();
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.url.as_str(), "http://notes.local/api/Notes");
    assert_eq!(request.headers["authorization"], "Bearer tok");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["accept"], "application/json");
    assert_eq!(
        request.body.as_deref(),
        Some(&br#"{"id":1,"text":"hi"}"#[..])
    );
    assert!(request.credentials.is_none());
}

#[tokio::test]
async fn reads_send_no_body() {
    let spy = Arc::new(Spy::default());
    let client = spy_client(spy.clone());

    client.read_one_by_action(5, "Latest").await.unwrap();

    let request = spy.last();
    assert_eq!(request.method, http::Method::GET);
    assert_eq!(request.url.as_str(), "http://notes.local/api/Notes/Latest/5");
    assert!(request.body.is_none());
    assert!(request.headers.get("content-type").is_none());
}

#[tokio::test]
async fn cancelled_token_fails_with_timeout() {
    let spy = Arc::new(Spy::default());
    let client = spy_client(spy.clone());
    let token = CancellationToken::new();
    token.cancel();

    let result = client.read_one_cancellable(&token).await;
    assert!(matches!(result, Err(Error::Timeout)), "got {:?}", result);
}

#[tokio::test]
async fn network_errors_are_unexpected_with_cause() {
    let spy = Arc::new(Spy {
        fail_with_network_error: true,
        ..Spy::default()
    });
    let client = spy_client(spy.clone());

    let err = client.delete_by(1).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("refused"));
    assert_eq!(spy.calls(), 1);
}

/// Never answers the token endpoint; answers everything else.
#[derive(Default)]
struct StalledTokenEndpoint {
    data_calls: Mutex<usize>,
}

#[async_trait]
impl Transport for StalledTokenEndpoint {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        if request.url.path().ends_with("/token") {
            std::future::pending::<()>().await;
        }
        *self.data_calls.lock().unwrap() += 1;
        Ok(TransportResponse::new(StatusCode::OK, r#"{"id":1,"text":"hi"}"#))
    }
}

fn password_grant_client(transport: Arc<StalledTokenEndpoint>) -> RestClient<Note> {
    let options = ClientOptions::builder()
        .base_address("http://notes.local/api")
        .unwrap()
        .controller("Notes")
        .timeout_millis(50)
        .authentication(Authentication::password_grant("alice", "secret", "token"))
        .build()
        .unwrap();
    RestClient::with_transport(options, transport)
}

#[tokio::test]
async fn hung_token_fetch_is_bound_by_configured_timeout() {
    let transport = Arc::new(StalledTokenEndpoint::default());
    let client = password_grant_client(transport.clone());

    let result = tokio::time::timeout(std::time::Duration::from_secs(1), client.read_one())
        .await
        .expect("call should end on its own deadline");

    assert!(matches!(result, Err(Error::Timeout)), "got {:?}", result);
    assert_eq!(*transport.data_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn hung_token_fetch_is_bound_by_cancellation() {
    let transport = Arc::new(StalledTokenEndpoint::default());
    let client = password_grant_client(transport.clone());

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        client.read_one_cancellable(&cancelled),
    )
    .await
    .expect("cancelled call should end immediately");
    assert!(matches!(result, Err(Error::Timeout)), "got {:?}", result);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        canceller.cancel();
    });
    let result = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        client.read_many_cancellable(&token),
    )
    .await
    .expect("call should end once cancelled");
    assert!(matches!(result, Err(Error::Timeout)), "got {:?}", result);
}

#[tokio::test]
async fn configured_cookies_travel_in_one_header() {
    let spy = Arc::new(Spy::default());
    let options = ClientOptions::builder()
        .base_address("http://notes.local/api")
        .unwrap()
        .controller("Notes")
        .cookie("tenant", "acme")
        .unwrap()
        .cookie("lang", "en")
        .unwrap()
        .build()
        .unwrap();
    let client: RestClient<Note> = RestClient::with_transport(options, spy.clone());

    client.read_many().await.unwrap();

    assert_eq!(spy.last().headers["cookie"], "tenant=acme; lang=en");
}
