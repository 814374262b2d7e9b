use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};
use tracing::{info, warn};

use notemark_core::models::{NewNote, Note, NoteId};

use crate::NoteStore;
use crate::document::NoteDocument;
use crate::error::StoreError;

/// Per-operation time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    pub connect: Duration,
    pub disconnect: Duration,
    pub create: Duration,
    pub list: Duration,
    pub get: Duration,
    pub delete: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            disconnect: Duration::from_secs(10),
            create: Duration::from_secs(5),
            list: Duration::from_secs(10),
            get: Duration::from_secs(5),
            delete: Duration::from_secs(5),
        }
    }
}

/// Connection parameters for [`MongoNoteStore::connect`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub timeouts: StoreTimeouts,
}

/// Note store backed by a single MongoDB collection.
#[derive(Clone)]
pub struct MongoNoteStore {
    client: Client,
    notes: Collection<NoteDocument>,
    timeouts: StoreTimeouts,
}

async fn bounded<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout {
            operation,
            seconds: limit.as_secs(),
        })?
}

fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    let id = NoteId::parse(id)?;
    ObjectId::parse_str(id.as_str()).map_err(|_| StoreError::InvalidId(id.to_string()))
}

impl MongoNoteStore {
    /// Connect and verify the deployment answers a `ping`.
    ///
    /// Pins the Stable API to v1. Both parse and ping run under the connect
    /// timeout; any failure is a [`StoreError::Connect`].
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.uri.trim().is_empty() {
            return Err(StoreError::MissingConfig("MONGODB_URI"));
        }
        if config.database.trim().is_empty() {
            return Err(StoreError::MissingConfig("MONGODB_DATABASE"));
        }

        let client = bounded("connect", config.timeouts.connect, async {
            let mut options = ClientOptions::parse(&config.uri)
                .await
                .map_err(|e| StoreError::Connect(e.to_string()))?;
            options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

            let client =
                Client::with_options(options).map_err(|e| StoreError::Connect(e.to_string()))?;
            client
                .database(&config.database)
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| StoreError::Connect(e.to_string()))?;
            Ok(client)
        })
        .await
        .map_err(|e| match e {
            StoreError::Timeout { seconds, .. } => {
                StoreError::Connect(format!("no response within {seconds}s"))
            }
            other => other,
        })?;

        info!(
            database = %config.database,
            collection = %config.collection,
            "connected to document store"
        );

        let notes = client
            .database(&config.database)
            .collection::<NoteDocument>(&config.collection);

        Ok(Self {
            client,
            notes,
            timeouts: config.timeouts,
        })
    }

    /// Close the client. Failures and timeouts are logged, never returned.
    pub async fn disconnect(self) {
        let limit = self.timeouts.disconnect;
        match tokio::time::timeout(limit, self.client.shutdown()).await {
            Ok(()) => info!("disconnected from document store"),
            Err(_) => warn!(seconds = limit.as_secs(), "document store disconnect timed out"),
        }
    }
}

#[async_trait]
impl NoteStore for MongoNoteStore {
    async fn create(&self, note: NewNote) -> Result<NoteId, StoreError> {
        let document = NoteDocument::from_new(&note, jiff::Timestamp::now());

        bounded("create", self.timeouts.create, async {
            let result = self.notes.insert_one(&document).await?;
            let oid = result
                .inserted_id
                .as_object_id()
                .ok_or(StoreError::MissingInsertedId)?;
            Ok(NoteId::parse(&oid.to_hex())?)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Note>, StoreError> {
        bounded("list", self.timeouts.list, async {
            let cursor = self
                .notes
                .find(doc! {})
                .sort(doc! { "createdAt": -1 })
                .await?;
            let documents: Vec<NoteDocument> = cursor.try_collect().await?;
            documents.into_iter().map(Note::try_from).collect()
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Note, StoreError> {
        let oid = parse_object_id(id)?;

        bounded("get", self.timeouts.get, async {
            let document = self
                .notes
                .find_one(doc! { "_id": oid })
                .await?
                .ok_or_else(|| StoreError::NotFound { id: oid.to_hex() })?;
            Note::try_from(document)
        })
        .await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_object_id(id)?;

        bounded("delete", self.timeouts.delete, async {
            let result = self.notes.delete_one(doc! { "_id": oid }).await?;
            if result.deleted_count == 0 {
                return Err(StoreError::NotFound { id: oid.to_hex() });
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts_match_operation_budget() {
        let t = StoreTimeouts::default();
        assert_eq!(t.connect, Duration::from_secs(10));
        assert_eq!(t.list, Duration::from_secs(10));
        assert_eq!(t.create, Duration::from_secs(5));
        assert_eq!(t.get, Duration::from_secs(5));
        assert_eq!(t.delete, Duration::from_secs(5));
    }

    #[test]
    fn object_id_parsing_rejects_malformed_input() {
        assert!(matches!(parse_object_id("not-an-id"), Err(StoreError::InvalidId(_))));
        assert!(parse_object_id("65f1c2a3b4d5e6f708192a3b").is_ok());
    }

    #[tokio::test]
    async fn bounded_reports_timeout_with_operation_name() {
        let result: Result<(), StoreError> = bounded("list", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(StoreError::Timeout { operation, .. }) => assert_eq!(operation, "list"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_requires_uri_and_database() {
        let mut config = StoreConfig {
            uri: String::new(),
            database: "notes".to_string(),
            collection: "notes".to_string(),
            timeouts: StoreTimeouts::default(),
        };
        assert!(matches!(
            MongoNoteStore::connect(&config).await,
            Err(StoreError::MissingConfig("MONGODB_URI"))
        ));

        config.uri = "mongodb://localhost:27017".to_string();
        config.database = " ".to_string();
        assert!(matches!(
            MongoNoteStore::connect(&config).await,
            Err(StoreError::MissingConfig("MONGODB_DATABASE"))
        ));
    }
}
