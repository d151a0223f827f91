//! Typed queries for the collection tables. This is the only module that
//! talks SQL for collections; the service layer composes these calls and
//! never builds predicates out of strings.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Collection, CollectionItem};

pub async fn count_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM collections WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn insert(
    pool: &SqlitePool,
    owner_id: i64,
    title: &str,
    note: Option<&str>,
) -> Result<Collection, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO collections (owner_id, title, note, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(owner_id)
    .bind(title)
    .bind(note)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM collections WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn owner_of(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT owner_id FROM collections WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(owner_id,)| owner_id))
}

/// Owner ids for a set of collections, as (collection_id, owner_id) pairs.
/// Missing collections are simply absent from the result.
pub async fn owners_of(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT id, owner_id FROM collections WHERE id IN (");
    let mut values = query.separated(", ");
    for id in ids {
        values.push_bind(*id);
    }
    query.push(")");

    query.build_query_as().fetch_all(pool).await
}

pub async fn list_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM collections WHERE owner_id = ? ORDER BY created_at ASC, id ASC")
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    note: Option<&str>,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("UPDATE collections SET title = ?, note = ?, updated_at = ? WHERE id = ?")
        .bind(title)
        .bind(note)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes a collection together with its items, atomically.
pub async fn delete_with_items(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM collection_items WHERE collection_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM collections WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Account teardown: every item the user added, then every collection the
/// user owns.
pub async fn delete_all_for_user(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM collection_items WHERE adder_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM collections WHERE owner_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_items(pool: &SqlitePool, collection_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM collection_items WHERE collection_id = ?")
            .bind(collection_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Batch insert of (collection_id, wata_id) pairs, crediting `adder_id` as
/// both adder and updater. One multi-row statement.
pub async fn insert_items(
    pool: &SqlitePool,
    adder_id: i64,
    entries: &[(i64, i64)],
) -> Result<(), sqlx::Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let now = chrono::Utc::now().to_rfc3339();

    let mut query = QueryBuilder::<Sqlite>::new(
        "INSERT INTO collection_items (collection_id, wata_id, adder_id, updater_id, created_at, updated_at) ",
    );
    query.push_values(entries, |mut row, (collection_id, wata_id)| {
        row.push_bind(*collection_id)
            .push_bind(*wata_id)
            .push_bind(adder_id)
            .push_bind(adder_id)
            .push_bind(&now)
            .push_bind(&now);
    });

    query.build().execute(pool).await?;
    Ok(())
}

/// Item id for a (collection, wata) pair. Duplicates resolve to the most
/// recently added row.
pub async fn find_item_id(
    pool: &SqlitePool,
    collection_id: i64,
    wata_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM collection_items WHERE collection_id = ? AND wata_id = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(collection_id)
    .bind(wata_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn delete_items_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM collection_items WHERE id IN (");
    let mut values = query.separated(", ");
    for id in ids {
        values.push_bind(*id);
    }
    query.push(")");

    query.build().execute(pool).await?;
    Ok(())
}

/// Conditional batch delete for the bulk-update path: a row goes only when
/// its (collection_id, wata_id) matches one of `pairs` AND it was added by
/// `adder_id`. All values are bound parameters.
pub async fn delete_items_matching(
    pool: &SqlitePool,
    adder_id: i64,
    pairs: &[(i64, i64)],
) -> Result<u64, sqlx::Error> {
    if pairs.is_empty() {
        return Ok(0);
    }

    let mut query =
        QueryBuilder::<Sqlite>::new("DELETE FROM collection_items WHERE adder_id = ");
    query.push_bind(adder_id);
    query.push(" AND (");
    for (i, (collection_id, wata_id)) in pairs.iter().enumerate() {
        if i > 0 {
            query.push(" OR ");
        }
        query
            .push("(collection_id = ")
            .push_bind(*collection_id)
            .push(" AND wata_id = ")
            .push_bind(*wata_id)
            .push(")");
    }
    query.push(")");

    let result = query.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// One page of a collection's items, most recently added first, plus the
/// unpaginated total. Ties on created_at (one batch insert) fall back to
/// insertion order via the id.
pub async fn item_page(
    pool: &SqlitePool,
    collection_id: i64,
    skip: i64,
    take: i64,
) -> Result<(Vec<CollectionItem>, i64), sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT * FROM collection_items WHERE collection_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(collection_id)
    .bind(take)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    let total = count_items(pool, collection_id).await?;
    Ok((items, total))
}

/// All items of one collection, most recently added first.
pub async fn items_for(
    pool: &SqlitePool,
    collection_id: i64,
) -> Result<Vec<CollectionItem>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM collection_items WHERE collection_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await
}

/// (collection_id, wata_id) for every item in every collection the user
/// owns, for shaping the owner's listing without a query per collection.
pub async fn wata_ids_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT ci.collection_id, ci.wata_id
        FROM collection_items ci
        JOIN collections c ON c.id = ci.collection_id
        WHERE c.owner_id = ?
        ORDER BY ci.created_at DESC, ci.id DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}
