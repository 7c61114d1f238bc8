use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user profile. At most one row per user; created explicitly by the
/// profile upsert or lazily by the first file upload.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub company: Option<String>,

    #[sea_orm(has_many)]
    pub files: HasMany<super::profile_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
