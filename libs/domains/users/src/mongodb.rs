//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::{create_unique_indexes, is_duplicate_key};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc},
    options::{FindOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, ProfileUpdate, Role, User};
use crate::repository::UserRepository;

/// Collection holding user profiles
pub const USERS_COLLECTION: &str = "users";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Repository over the `users` collection of `db`
    ///
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(client.database("opty"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, USERS_COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Convert chrono DateTime to BSON DateTime
    fn to_bson_datetime(dt: DateTime<Utc>) -> Bson {
        Bson::DateTime(mongodb::bson::DateTime::from_millis(dt.timestamp_millis()))
    }

    /// `$set` document for the supplied fields plus `updated_at`
    fn build_update(update: &ProfileUpdate, now: DateTime<Utc>) -> Document {
        let mut set = Document::new();
        for (field, value) in update.fields() {
            set.insert(field, value);
        }
        set.insert("updated_at", Self::to_bson_datetime(now));
        doc! { "$set": set }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn get_by_provider_id(&self, supabase_id: &str) -> UserResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "supabase_id": supabase_id })
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let cursor = self
            .collection
            .find(doc! { "role": role.to_string() })
            .with_options(options)
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn add_user(&self, new_user: NewUser) -> UserResult<User> {
        let mut user = new_user.into_user(Utc::now());

        let result = self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                UserError::AlreadyExists(e.to_string())
            } else {
                UserError::StoreUnavailable(e.to_string())
            }
        })?;

        user.id = result.inserted_id.as_object_id();

        tracing::info!(supabase_id = %user.supabase_id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self, update))]
    async fn update_by_provider_id(
        &self,
        supabase_id: &str,
        update: ProfileUpdate,
    ) -> UserResult<User> {
        if update.is_empty() {
            return Err(UserError::EmptyUpdate("No data provided for update".into()));
        }

        let user = self
            .collection
            .find_one_and_update(
                doc! { "supabase_id": supabase_id },
                Self::build_update(&update, Utc::now()),
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User {supabase_id} not found")))?;

        tracing::info!(supabase_id, "User profile updated successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn update_role(&self, email: &str, role: Role) -> UserResult<User> {
        let update = doc! {
            "$set": {
                "role": role.to_string(),
                "updated_at": Self::to_bson_datetime(Utc::now()),
            }
        };

        let user = self
            .collection
            .find_one_and_update(doc! { "email": email }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User {email} not found")))?;

        tracing::info!(email, %role, "User role updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn create_indexes(&self) -> UserResult<()> {
        create_unique_indexes(&self.collection, &["email", "supabase_id"])
            .await
            .map_err(|e| UserError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}
