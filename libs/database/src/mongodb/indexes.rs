use mongodb::{
    Collection, IndexModel,
    bson::doc,
    error::{Error, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tracing::debug;

use crate::common::DatabaseResult;

/// Server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Create one ascending unique index per field.
///
/// Creating an index that already exists with the same options is a no-op
/// on the server, so this is safe to call on every startup. Returns the
/// names of the indexes.
pub async fn create_unique_indexes<T>(
    collection: &Collection<T>,
    fields: &[&str],
) -> DatabaseResult<Vec<String>>
where
    T: Send + Sync,
{
    let models = fields.iter().map(|field| {
        IndexModel::builder()
            .keys(doc! { *field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build()
    });

    let result = collection.create_indexes(models).await?;
    debug!(
        collection = %collection.name(),
        indexes = ?result.index_names,
        "Unique indexes ensured"
    );
    Ok(result.index_names)
}

/// `true` when `error` is a unique index violation.
///
/// The driver reports these as a write error for single inserts and as a
/// command error for `findAndModify`.
pub fn is_duplicate_key(error: &Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::InsertMany(e) => e
            .write_errors
            .as_ref()
            .is_some_and(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::{Client, bson::Document};

    #[tokio::test]
    async fn test_is_duplicate_key_ignores_other_errors() {
        let error = mongodb::options::ClientOptions::parse("not-a-mongo-url")
            .await
            .unwrap_err();
        assert!(!is_duplicate_key(&error));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_create_unique_indexes_is_idempotent() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let collection = client
            .database("opty_test")
            .collection::<Document>("index_test");

        let first = create_unique_indexes(&collection, &["email"]).await.unwrap();
        let second = create_unique_indexes(&collection, &["email"]).await.unwrap();
        assert_eq!(first, second);

        collection.insert_one(doc! { "email": "a@b.co" }).await.unwrap();
        let err = collection
            .insert_one(doc! { "email": "a@b.co" })
            .await
            .unwrap_err();
        assert!(is_duplicate_key(&err));

        collection.drop().await.unwrap();
    }
}
