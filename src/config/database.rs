use mongodb::{Client, Database};
use std::env;

pub async fn connect() -> Database {
    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = env::var("MONGODB_DATABASE").unwrap_or_else(|_| "emmaus".to_string());

    let client = Client::with_uri_str(&uri)
        .await
        .expect("Failed to connect to MongoDB");

    client.database(&db_name)
}
