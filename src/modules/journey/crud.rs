use crate::modules::journey::model::{DayFeedback, Journey, JourneyDocument};
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

const COLLECTION_NAME: &str = "journeys";

pub struct JourneyCrud {
    collection: Collection<JourneyDocument>,
}

impl JourneyCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn create(
        &self,
        document: JourneyDocument,
    ) -> Result<ObjectId, mongodb::error::Error> {
        let result = self.collection.insert_one(document).await?;
        Ok(result.inserted_id.as_object_id().unwrap())
    }

    pub async fn find_by_id(
        &self,
        id: &ObjectId,
    ) -> Result<Option<JourneyDocument>, mongodb::error::Error> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<JourneyDocument>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?;

        cursor.try_collect().await
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<u64, mongodb::error::Error> {
        self.collection
            .count_documents(doc! { "user_id": user_id })
            .await
    }

    /// Stores feedback as a sub-field keyed by the day, e.g. `feedback.day_3`.
    pub async fn set_day_feedback(
        &self,
        id: &ObjectId,
        day_index: usize,
        feedback: &DayFeedback,
    ) -> Result<bool, mongodb::error::Error> {
        let key = format!("feedback.{}", JourneyDocument::feedback_key(day_index));
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        key: bson::to_bson(feedback).unwrap(),
                        "updated_at": bson::DateTime::now()
                    }
                },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    /// Flags a day complete under `completed_days.<index>`.
    pub async fn set_day_completed(
        &self,
        id: &ObjectId,
        day_index: usize,
    ) -> Result<bool, mongodb::error::Error> {
        let key = format!("completed_days.{}", day_index);
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        key: true,
                        "updated_at": bson::DateTime::now()
                    }
                },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    pub async fn replace_journey(
        &self,
        id: &ObjectId,
        journey: &Journey,
    ) -> Result<bool, mongodb::error::Error> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "journey": bson::to_bson(journey).unwrap(),
                        "updated_at": bson::DateTime::now()
                    }
                },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<bool, mongodb::error::Error> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
