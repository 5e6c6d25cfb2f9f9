//! Run with: cargo run --bin cleanup

use mongodb::Client;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "emmaus".to_string());

    println!("Connecting to MongoDB...");
    let client = Client::with_uri_str(&uri).await?;
    let db = client.database(&db_name);

    for name in ["journeys", "reflections"] {
        println!("Dropping {} collection...", name);
        db.collection::<mongodb::bson::Document>(name).drop().await?;
        println!("✓ {} dropped", name);
    }

    println!("\nCollections remaining:");
    for name in db.list_collection_names().await? {
        println!("  - {}", name);
    }

    println!("\n✓ Cleanup complete!");
    Ok(())
}
