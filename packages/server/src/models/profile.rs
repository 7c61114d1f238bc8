use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{profile, profile_file, user};
use crate::error::AppError;

/// Request body for creating or updating the caller's profile.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertProfileRequest {
    /// Company shown on the profile. Required, non-empty.
    #[schema(example = "Initech")]
    pub company: String,
}

pub fn validate_upsert_profile_request(payload: &UpsertProfileRequest) -> Result<(), AppError> {
    if payload.company.trim().is_empty() {
        return Err(AppError::Validation("Company is required".into()));
    }
    Ok(())
}

/// Owning user, projected into profile responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileUser {
    #[schema(example = 42)]
    pub id: i32,
    /// Display name.
    #[schema(example = "Alice Wonder")]
    pub name: String,
}

/// Response DTO for one uploaded file's metadata.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileRecordResponse {
    /// File record ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Display name supplied at upload time.
    #[schema(example = "resume.pdf")]
    pub original_name: String,
    /// Transfer encoding reported by the uploader.
    #[schema(example = "7bit")]
    pub encoding: String,
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    /// Size in bytes.
    #[schema(example = 142857)]
    pub size: i64,
    #[schema(example = "folio-profile-files")]
    pub storage_bucket: String,
    /// Object key in the store. Generated, not the client filename.
    #[schema(example = "01936f0e-5678-7def-8000-000000000002")]
    pub storage_key: String,
    /// Resolvable URL for the stored object.
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<profile_file::Model> for FileRecordResponse {
    fn from(model: profile_file::Model) -> Self {
        Self {
            id: model.id.to_string(),
            original_name: model.original_name,
            encoding: model.encoding,
            mime_type: model.mime_type,
            size: model.size,
            storage_bucket: model.storage_bucket,
            storage_key: model.storage_key,
            location: model.location,
            created_at: model.created_at,
        }
    }
}

/// Response DTO for a profile, including the owner projection and the
/// file list, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    #[schema(example = 7)]
    pub id: i32,
    pub user: ProfileUser,
    #[schema(example = "Initech")]
    pub company: Option<String>,
    pub files: Vec<FileRecordResponse>,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn from_parts(
        profile: profile::Model,
        owner: &user::Model,
        files: Vec<profile_file::Model>,
    ) -> Self {
        Self {
            id: profile.id,
            user: ProfileUser {
                id: owner.id,
                name: owner.name.clone(),
            },
            company: profile.company,
            files: files.into_iter().map(FileRecordResponse::from).collect(),
            created_at: profile.created_at,
        }
    }
}
