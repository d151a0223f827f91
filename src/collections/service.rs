//! Orchestration for everything collections: quotas, ownership, sharing.
//!
//! Every mutation funnels through the ownership guard before touching the
//! store. Share codes are derived from collection ids on every read and are
//! never persisted, so rotating the codec alphabet only invalidates codes
//! already handed out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::collections::store;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Collection, User};
use crate::share_code::ShareCodec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub id: i64,
    pub shared_code: String,
    pub title: String,
    pub note: Option<String>,
    /// Referenced wata ids, most recently added first.
    pub items: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionList {
    pub total_count: i64,
    pub result: Vec<CollectionResponse>,
}

/// Read-only projection handed to whoever holds a share code. Deliberately
/// omits the numeric id and the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedCollection {
    pub shared_code: String,
    pub title: String,
    pub note: Option<String>,
    pub items: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPage {
    pub total_count: i64,
    pub items: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemAction {
    Add,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub collection_id: i64,
    pub wata_id: i64,
    pub action: ItemAction,
}

/// A whitespace-only note carries no content; store it as absent rather
/// than as literal spaces.
fn normalize_note(note: Option<String>) -> Option<String> {
    note.filter(|n| !n.trim().is_empty())
}

#[derive(Clone)]
pub struct CollectionService {
    db: SqlitePool,
    codec: ShareCodec,
    max_collections: i64,
    max_collection_items: i64,
}

impl CollectionService {
    pub fn new(db: SqlitePool, config: &AppConfig) -> Self {
        Self {
            db,
            codec: ShareCodec::new(&config.share_code),
            max_collections: config.max_collections,
            max_collection_items: config.max_collection_items,
        }
    }

    fn shape(&self, collection: Collection, items: Vec<i64>) -> CollectionResponse {
        CollectionResponse {
            shared_code: self.codec.encode(collection.id),
            id: collection.id,
            title: collection.title,
            note: collection.note,
            items,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }

    /// Ownership guard for a single collection. A missing collection is
    /// NotFound; a foreign one is PermissionDenied.
    async fn check_owner(&self, actor: &User, collection_id: i64) -> Result<(), AppError> {
        let owner_id = store::owner_of(&self.db, collection_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if owner_id != actor.id {
            return Err(AppError::PermissionDenied);
        }
        Ok(())
    }

    /// Ownership guard across a set of collections; every distinct id must
    /// exist and belong to the actor.
    async fn check_owner_all(&self, actor: &User, collection_ids: &[i64]) -> Result<(), AppError> {
        let mut distinct = collection_ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let owners = store::owners_of(&self.db, &distinct).await?;
        if owners.len() != distinct.len() {
            return Err(AppError::NotFound);
        }
        if owners.iter().any(|(_, owner_id)| *owner_id != actor.id) {
            return Err(AppError::PermissionDenied);
        }
        Ok(())
    }

    pub async fn create(
        &self,
        actor: &User,
        title: String,
        note: Option<String>,
    ) -> Result<CollectionResponse, AppError> {
        let count = store::count_by_owner(&self.db, actor.id).await?;
        if count >= self.max_collections {
            return Err(AppError::TooManyCollections(self.max_collections));
        }

        let note = normalize_note(note);
        let collection = store::insert(&self.db, actor.id, &title, note.as_deref()).await?;

        tracing::info!(collection_id = collection.id, owner_id = actor.id, "collection created");
        Ok(self.shape(collection, Vec::new()))
    }

    /// Every collection the actor owns, oldest first, each with its item
    /// wata ids and a freshly computed share code.
    pub async fn find_all(&self, actor: &User) -> Result<CollectionList, AppError> {
        let collections = store::list_by_owner(&self.db, actor.id).await?;

        let mut items_by_collection: HashMap<i64, Vec<i64>> = HashMap::new();
        for (collection_id, wata_id) in store::wata_ids_by_owner(&self.db, actor.id).await? {
            items_by_collection
                .entry(collection_id)
                .or_default()
                .push(wata_id);
        }

        let result: Vec<CollectionResponse> = collections
            .into_iter()
            .map(|collection| {
                let items = items_by_collection
                    .remove(&collection.id)
                    .unwrap_or_default();
                self.shape(collection, items)
            })
            .collect();

        Ok(CollectionList {
            total_count: result.len() as i64,
            result,
        })
    }

    /// Public share view. The code is the capability: no ownership check,
    /// and an undecodable code reads the same as a missing collection.
    pub async fn find_shared(&self, code: &str) -> Result<SharedCollection, AppError> {
        let collection_id = self.codec.decode(code)?;
        let collection = store::find_by_id(&self.db, collection_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let items = store::items_for(&self.db, collection.id).await?;

        Ok(SharedCollection {
            shared_code: code.to_string(),
            title: collection.title,
            note: collection.note,
            items: items.into_iter().map(|item| item.wata_id).collect(),
        })
    }

    /// Bare record lookup used ahead of mutations.
    pub async fn find_info(&self, collection_id: i64) -> Result<Collection, AppError> {
        store::find_by_id(&self.db, collection_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// One page of a shared collection's wata ids, newest first.
    pub async fn find_items(&self, code: &str, skip: i64, take: i64) -> Result<ItemPage, AppError> {
        let collection_id = self.codec.decode(code)?;
        self.find_info(collection_id).await?;

        let (items, total_count) = store::item_page(&self.db, collection_id, skip, take).await?;
        Ok(ItemPage {
            total_count,
            items: items.into_iter().map(|item| item.wata_id).collect(),
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        collection_id: i64,
        title: String,
        note: Option<String>,
    ) -> Result<CollectionResponse, AppError> {
        self.check_owner(actor, collection_id).await?;

        let note = normalize_note(note);
        store::update(&self.db, collection_id, &title, note.as_deref()).await?;

        let collection = self.find_info(collection_id).await?;
        let items = store::items_for(&self.db, collection_id).await?;
        Ok(self.shape(
            collection,
            items.into_iter().map(|item| item.wata_id).collect(),
        ))
    }

    /// Drops the collection and all of its items in one transaction.
    pub async fn remove(&self, actor: &User, collection_id: i64) -> Result<(), AppError> {
        self.check_owner(actor, collection_id).await?;

        store::delete_with_items(&self.db, collection_id).await?;
        tracing::info!(collection_id, owner_id = actor.id, "collection removed");
        Ok(())
    }

    /// Adds wata references to an owned collection. The batch is rejected
    /// whole when it would push the collection past the item quota.
    pub async fn add_items(
        &self,
        actor: &User,
        collection_id: i64,
        wata_ids: &[i64],
    ) -> Result<(), AppError> {
        self.check_owner(actor, collection_id).await?;
        if wata_ids.is_empty() {
            return Ok(());
        }

        let count = store::count_items(&self.db, collection_id).await?;
        if count + wata_ids.len() as i64 > self.max_collection_items {
            return Err(AppError::TooManyCollectionItems(self.max_collection_items));
        }

        let entries: Vec<(i64, i64)> = wata_ids
            .iter()
            .map(|wata_id| (collection_id, *wata_id))
            .collect();
        store::insert_items(&self.db, actor.id, &entries).await?;
        Ok(())
    }

    /// Removes the given wata references from an owned collection. Every
    /// id must resolve to an item or the whole batch aborts with NotFound.
    pub async fn remove_items(
        &self,
        actor: &User,
        collection_id: i64,
        wata_ids: &[i64],
    ) -> Result<(), AppError> {
        self.check_owner(actor, collection_id).await?;

        let mut item_ids = Vec::with_capacity(wata_ids.len());
        for wata_id in wata_ids {
            let item_id = store::find_item_id(&self.db, collection_id, *wata_id)
                .await?
                .ok_or(AppError::NotFound)?;
            item_ids.push(item_id);
        }

        store::delete_items_by_ids(&self.db, &item_ids).await?;
        Ok(())
    }

    /// Bulk add/delete across several collections at once. All referenced
    /// collections are ownership-checked up front; deletes only touch rows
    /// the actor added.
    pub async fn update_items(
        &self,
        actor: &User,
        updates: &[ItemUpdate],
    ) -> Result<(), AppError> {
        let collection_ids: Vec<i64> = updates.iter().map(|u| u.collection_id).collect();
        self.check_owner_all(actor, &collection_ids).await?;

        let adds: Vec<(i64, i64)> = updates
            .iter()
            .filter(|u| u.action == ItemAction::Add)
            .map(|u| (u.collection_id, u.wata_id))
            .collect();
        let deletes: Vec<(i64, i64)> = updates
            .iter()
            .filter(|u| u.action == ItemAction::Delete)
            .map(|u| (u.collection_id, u.wata_id))
            .collect();

        store::insert_items(&self.db, actor.id, &adds).await?;
        store::delete_items_matching(&self.db, actor.id, &deletes).await?;
        Ok(())
    }

    /// Account teardown: everything the actor owns goes.
    pub async fn remove_all(&self, actor: &User) -> Result<(), AppError> {
        store::delete_all_for_user(&self.db, actor.id).await?;
        tracing::info!(owner_id = actor.id, "all collections removed");
        Ok(())
    }
}
