//! Example demonstrating bearer token authentication with the password grant.
//!
//! The token is fetched from `<base>/token` on the first call and reused for
//! every call after that.
//!
//! Run with: `cargo run --example bearer_token`

use restcall::{Authentication, ClientOptions, Error, RestClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Customer {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("restcall=debug")
        .init();

    let options = ClientOptions::builder()
        .base_address("http://localhost:5000/api")?
        .controller("Customers")
        .authentication(Authentication::password_grant("demo", "demo", "token"))
        .build()?;
    let client = RestClient::<Customer>::new(options)?;

    for customer in client.read_many().await?.iter() {
        println!("{}: {}", customer.id, customer.name);
    }

    // Served with the cached token, no second round trip to the token endpoint.
    let first = client.read_one_by(1).await?;
    println!("First customer: {}", first.name);

    Ok(())
}
