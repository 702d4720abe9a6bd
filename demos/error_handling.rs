//! Example demonstrating error handling.
//!
//! This example shows how to:
//! - Handle the different error variants
//! - Read the translated server message, stack trace and model state
//! - Bound calls with a timeout or an explicit cancellation token
//!
//! Run with: `cargo run --example error_handling`

use restcall::{CancellationToken, ClientOptions, Error, RestClient};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
struct Post {
    id: u32,
    title: String,
}

fn report(err: &Error) {
    match err {
        Error::RemoteCallFailed { status, details } => {
            println!("HTTP Error!");
            println!("  Status: {}", status);
            println!("  Reason: {:?}", details.reason);
            println!("  Message: {:?}", details.message);
            println!("  Exception type: {:?}", details.exception_type);
            for (field, messages) in &details.model_state {
                println!("  {}: {}", field, messages.join(", "));
            }
        }
        Error::Timeout => println!("Timed out or cancelled (HTTP {:?})", err.status()),
        Error::InvalidArgument(message) => println!("Rejected before sending: {}", message),
        Error::AuthFailed { status, message } => {
            println!("Authentication failed ({}): {}", status, message)
        }
        other => println!("Other error: {} (HTTP {:?})", other, other.status()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restcall=info")
        .init();

    let options = ClientOptions::builder()
        .base_address("https://jsonplaceholder.typicode.com")?
        .controller("posts")
        .timeout(Duration::from_secs(5))
        .build()?;
    let client = RestClient::<Post>::new(options)?;

    println!("=== Example 1: Handling HTTP Errors ===");
    if let Err(e) = client.read_one_by(999_999).await {
        report(&e);
    }
    println!();

    println!("=== Example 2: Invalid arguments ===");
    if let Err(e) = client.read_one_action("").await {
        report(&e);
    }
    println!();

    println!("=== Example 3: Cancellation ===");
    let token = CancellationToken::new();
    token.cancel();
    if let Err(e) = client.read_many_cancellable(&token).await {
        report(&e);
    }

    Ok(())
}
