//! Basic example demonstrating reads and writes against one controller.
//!
//! This example shows how to:
//! - Configure client options for a controller
//! - Read one entity and a list of entities
//! - Create, edit and delete an entity
//! - Access response data and metadata
//!
//! Run with: `cargo run --example basic_call`

use restcall::{ClientOptions, Error, RestClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    #[serde(default)]
    id: u32,
    title: String,
    body: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("restcall=debug,basic_call=info")
        .init();

    // Every call of this client addresses https://jsonplaceholder.typicode.com/posts
    let options = ClientOptions::builder()
        .base_address("https://jsonplaceholder.typicode.com")?
        .controller("posts")
        .build()?;
    let client = RestClient::<Post>::new(options)?;

    println!("=== Read one ===");
    let response = client.read_one_by(1).await?;
    println!("Post ID: {}", response.id);
    println!("Title: {}", response.title);
    println!("Request latency: {:?}", response.latency);
    println!("Status code: {}", response.status);
    println!();

    println!("=== Read many ===");
    let posts = client.read_many().await?;
    println!("Fetched {} posts", posts.len());
    println!();

    println!("=== Create ===");
    let new_post = Post {
        user_id: 1,
        id: 0,
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
    };
    let created = client.create(&new_post).await?;
    match &created.data {
        Some(post) => println!("Created post ID: {}", post.id),
        None => println!("Server did not echo the post: {}", created.raw_body),
    }
    println!();

    println!("=== Edit and delete ===");
    client.edit_action(&new_post, "1").await?;
    client.delete_by(1).await?;
    println!("Content-Type: {:?}", created.header("content-type"));

    Ok(())
}
