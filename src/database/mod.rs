pub mod memory_store;
pub mod mongo_store;
pub mod store;

pub use memory_store::MemoryStore;
pub use store::CalendarStore;

use crate::utils::AppError;
use mongodb::{options::ClientOptions, Client, Collection, Database};

pub const USERS: &str = "users";
pub const REMINDERS: &str = "reminders";
pub const EVENTS: &str = "events";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let db_name = database_name(&client_options);
        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes behind the owner and window lookups
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::{doc, Document};
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let indexes = [
            (REMINDERS, doc! { "createdBy": 1, "createdAt": 1 }),
            (REMINDERS, doc! { "createdBy": 1, "startTime": 1 }),
            (EVENTS, doc! { "startDate": 1 }),
            (EVENTS, doc! { "endDate": 1 }),
        ];

        for (collection, keys) in indexes {
            let description = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let model = IndexModel::builder().keys(keys).build();

            match self.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index created: {}", description),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Database named in the URI path, or "calendar"
fn database_name(options: &ClientOptions) -> String {
    options
        .default_database
        .clone()
        .unwrap_or_else(|| "calendar".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn name_for(uri: &str) -> String {
        database_name(&ClientOptions::parse(uri).await.unwrap())
    }

    #[tokio::test]
    async fn test_database_name_from_uri() {
        assert_eq!(name_for("mongodb://localhost:27017/planner").await, "planner");
        assert_eq!(name_for("mongodb://localhost:27017/planner?retryWrites=true").await, "planner");
        assert_eq!(name_for("mongodb://user:pw@localhost/planner").await, "planner");
        assert_eq!(name_for("mongodb://localhost:27017/").await, "calendar");
        assert_eq!(name_for("mongodb://localhost:27017").await, "calendar");
        assert_eq!(name_for("mongodb://localhost").await, "calendar");
        assert_eq!(name_for("mongodb://db1.internal,db2.internal:27018").await, "calendar");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/calendar_test".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
