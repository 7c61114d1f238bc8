use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for one uploaded object, owned by a profile. Rows are only
/// reachable through the owning profile; every query filters by
/// `profile_id`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile_file")]
pub struct Model {
    /// UUIDv7 primary key. Time-ordered, so `created_at DESC, id DESC`
    /// keeps the newest-first contract even for same-millisecond inserts.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub profile_id: i32,

    #[sea_orm(belongs_to, from = "profile_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    /// Display name supplied by the uploading client.
    pub original_name: String,

    /// Transfer encoding reported by the uploader.
    pub encoding: String,

    pub mime_type: String,

    /// Byte size counted while streaming to storage.
    pub size: i64,

    pub storage_bucket: String,

    /// Weak reference into the object store's key space; existence of the
    /// backing object is not enforced here.
    pub storage_key: String,

    /// Resolvable URL for the stored object.
    pub location: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
