use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-owned named list of wata references. `owner_id` never changes
/// after creation; ids are store-assigned and positive, which is what the
/// share-code codec relies on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One membership record linking a collection to a wata, with audit fields
/// recording who added and last touched it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollectionItem {
    pub id: i64,
    pub collection_id: i64,
    pub wata_id: i64,
    pub adder_id: i64,
    pub updater_id: i64,
    pub created_at: String,
    pub updated_at: String,
}
