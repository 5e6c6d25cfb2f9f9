use crate::modules::reflection::model::{Exchange, ReflectionThread};
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

const COLLECTION_NAME: &str = "reflections";

pub struct ReflectionCrud {
    collection: Collection<ReflectionThread>,
}

impl ReflectionCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn find(
        &self,
        journey_id: &ObjectId,
        day_index: u32,
    ) -> Result<Option<ReflectionThread>, mongodb::error::Error> {
        self.collection
            .find_one(doc! { "journey_id": journey_id, "day_index": day_index })
            .await
    }

    /// One thread per (journey, day); created on first use.
    pub async fn find_or_create(
        &self,
        journey_id: &ObjectId,
        day_index: u32,
    ) -> Result<ReflectionThread, mongodb::error::Error> {
        if let Some(thread) = self.find(journey_id, day_index).await? {
            return Ok(thread);
        }

        let mut thread = ReflectionThread::new(*journey_id, day_index);
        let result = self.collection.insert_one(thread.clone()).await?;
        thread.id = result.inserted_id.as_object_id();

        Ok(thread)
    }

    pub async fn add_exchange(
        &self,
        id: &ObjectId,
        exchange: &Exchange,
    ) -> Result<bool, mongodb::error::Error> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$push": { "exchanges": bson::to_bson(exchange).unwrap() },
                    "$set": { "updated_at": bson::DateTime::now() }
                },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    pub async fn delete_for_journey(
        &self,
        journey_id: &ObjectId,
    ) -> Result<u64, mongodb::error::Error> {
        let result = self
            .collection
            .delete_many(doc! { "journey_id": journey_id })
            .await?;

        Ok(result.deleted_count)
    }
}
