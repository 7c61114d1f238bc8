//! Persistence for profiles and their owned file records.
//!
//! Mutations persist immediately; there is no isolation beyond
//! statement-level atomicity, so two requests mutating the same user's
//! rows can interleave (last write wins). No locks are taken here.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entity::{profile, profile_file};
use crate::error::AppError;

/// Partial profile update. `None` fields are left untouched; only fields
/// explicitly present overwrite the stored value.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub company: Option<String>,
}

/// Metadata for a freshly stored object, ready to become a file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub original_name: String,
    pub encoding: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_bucket: String,
    pub storage_key: String,
    pub location: String,
}

/// Read-only lookup of a user's profile.
pub async fn find_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<profile::Model>, AppError> {
    Ok(profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Create the user's profile, or merge `update` into the existing one.
///
/// Idempotent under identical input. A concurrent creation race resolves
/// through the unique `user_id` constraint: the loser re-reads the
/// winner's row and applies its update there.
pub async fn create_or_update<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    update: ProfileUpdate,
) -> Result<profile::Model, AppError> {
    if let Some(existing) = find_by_user(db, user_id).await? {
        return apply_update(db, existing, update).await;
    }

    let new = profile::ActiveModel {
        user_id: Set(user_id),
        company: Set(update.company.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match new.insert(db).await {
        Ok(created) => Ok(created),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::debug!("Profile creation race for user {user_id}, merging into winner");
            let existing = find_by_user(db, user_id)
                .await?
                .ok_or_else(|| AppError::Internal("profile missing after unique violation".into()))?;
            apply_update(db, existing, update).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn apply_update<C: ConnectionTrait>(
    db: &C,
    existing: profile::Model,
    update: ProfileUpdate,
) -> Result<profile::Model, AppError> {
    let mut active: profile::ActiveModel = existing.clone().into();
    let mut changed = false;
    if let Some(company) = update.company {
        active.company = Set(Some(company));
        changed = true;
    }
    if !changed {
        return Ok(existing);
    }
    Ok(active.update(db).await?)
}

/// Fetch the user's profile, creating a bare one if absent. The creation
/// race resolves the same way as in `create_or_update`.
async fn ensure_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<profile::Model, AppError> {
    if let Some(existing) = find_by_user(db, user_id).await? {
        return Ok(existing);
    }

    let new = profile::ActiveModel {
        user_id: Set(user_id),
        company: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match new.insert(db).await {
        Ok(created) => Ok(created),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_by_user(db, user_id)
                .await?
                .ok_or_else(|| AppError::Internal("profile missing after unique violation".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Insert a file record for the user, lazily creating the profile first.
/// Never fails because a profile already exists.
pub async fn insert_file<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    record: NewFileRecord,
) -> Result<profile::Model, AppError> {
    let profile = ensure_profile(db, user_id).await?;

    let row = profile_file::ActiveModel {
        id: Set(Uuid::now_v7()),
        profile_id: Set(profile.id),
        original_name: Set(record.original_name),
        encoding: Set(record.encoding),
        mime_type: Set(record.mime_type),
        size: Set(record.size),
        storage_bucket: Set(record.storage_bucket),
        storage_key: Set(record.storage_key),
        location: Set(record.location),
        created_at: Set(Utc::now()),
    };
    row.insert(db).await?;

    Ok(profile)
}

/// Look up one of the user's file records by id.
///
/// Absence (no profile, or no record with that id) is an explicit
/// `NotFound`, never a silent empty result.
pub async fn find_file_by_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    file_id: Uuid,
) -> Result<profile_file::Model, AppError> {
    let profile = find_by_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    profile_file::Entity::find()
        .filter(profile_file::Column::ProfileId.eq(profile.id))
        .filter(profile_file::Column::Id.eq(file_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))
}

/// Remove one of the user's file records by id and return the profile.
pub async fn remove_file_by_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    file_id: Uuid,
) -> Result<profile::Model, AppError> {
    let record = find_file_by_id(db, user_id, file_id).await?;

    profile_file::Entity::delete_by_id(record.id).exec(db).await?;

    find_by_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::Internal("profile vanished during file removal".into()))
}

/// All file records for a profile, newest first (insertion prepend
/// semantics; UUIDv7 ids break same-timestamp ties).
pub async fn list_files<C: ConnectionTrait>(
    db: &C,
    profile_id: i32,
) -> Result<Vec<profile_file::Model>, AppError> {
    Ok(profile_file::Entity::find()
        .filter(profile_file::Column::ProfileId.eq(profile_id))
        .order_by_desc(profile_file::Column::CreatedAt)
        .order_by_desc(profile_file::Column::Id)
        .all(db)
        .await?)
}
