use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::{Json, body::Body};
use common::storage::ObjectStore;
use futures::TryStreamExt;
use sea_orm::{ConnectionTrait, EntityTrait};
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{profile, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::profile::{
    ProfileResponse, UpsertProfileRequest, validate_upsert_profile_request,
};
use crate::state::AppState;
use crate::store::profile as profile_store;
use crate::store::profile::NewFileRecord;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024) // 64 MB
}

/// Transfer encoding reported when the client doesn't declare one.
const DEFAULT_ENCODING: &str = "7bit";

#[utoipa::path(
    get,
    path = "/me",
    tag = "Profile",
    operation_id = "getMyProfile",
    summary = "Current user's profile",
    description = "Returns the caller's profile with the owning user's display name and \
        the file list, newest first.",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 400, description = "No profile yet (PROFILE_MISSING)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile_store::find_by_user(&state.db, auth_user.user_id)
        .await?
        .ok_or(AppError::ProfileMissing)?;

    Ok(Json(profile_response(&state.db, profile).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Profile",
    operation_id = "upsertProfile",
    summary = "Create or update the current user's profile",
    description = "Creates the profile if absent, otherwise merges the supplied fields into \
        it. Fields not present in the body are left untouched.",
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Resulting profile", body = ProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn upsert_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpsertProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    validate_upsert_profile_request(&payload)?;

    let update = profile_store::ProfileUpdate {
        company: Some(payload.company.trim().to_string()),
    };
    let profile = profile_store::create_or_update(&state.db, auth_user.user_id, update).await?;

    Ok(Json(profile_response(&state.db, profile).await?))
}

#[utoipa::path(
    post,
    path = "/files",
    tag = "Profile Files",
    operation_id = "uploadProfileFile",
    summary = "Upload a file to the current user's profile",
    description = "Accepts exactly one `file` multipart field, streamed straight into object \
        storage while the request body is still arriving. The storage key is a fresh UUID; \
        the client filename is kept as display metadata only, so re-uploading a file with \
        the same name never overwrites the earlier object. Lazily creates the profile on \
        first upload.",
    request_body(content_type = "multipart/form-data", description = "Single-file upload"),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut uploaded: Option<NewFileRecord> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields.
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let encoding = field
            .headers()
            .get("content-transfer-encoding")
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_ENCODING)
            .to_string();

        // Fresh key per upload; `original_name` stays display-only.
        let key = Uuid::new_v4().to_string();

        let mut reader = StreamReader::new(Box::pin(field.map_err(std::io::Error::other)));
        let object = state
            .object_store
            .put(&key, &mut reader, &mime_type)
            .await?;

        uploaded = Some(NewFileRecord {
            original_name,
            encoding,
            mime_type,
            size: object.size,
            storage_bucket: object.bucket,
            storage_key: object.key,
            location: object.location,
        });

        // Exactly one file per request.
        break;
    }

    let record = uploaded.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    // A failure past this point leaves the object orphaned in storage;
    // there is no cross-store transaction to undo the put.
    let profile = profile_store::insert_file(&state.db, auth_user.user_id, record).await?;

    Ok(Json(profile_response(&state.db, profile).await?))
}

#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "Profile Files",
    operation_id = "downloadProfileFile",
    summary = "Download one of the current user's files",
    description = "Streams the stored object as an attachment. Content type and filename \
        come from the metadata recorded at upload time, never re-derived from the key.",
    params(("file_id" = String, Path, description = "File record ID (UUID)")),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid file ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, file_id))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, AppError> {
    let file_id = Uuid::parse_str(&file_id)
        .map_err(|_| AppError::Validation("Invalid file ID".into()))?;

    let record = profile_store::find_file_by_id(&state.db, auth_user.user_id, file_id).await?;

    let reader = state.object_store.get(&record.storage_key).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, record.mime_type.as_str())
        .header(header::CONTENT_LENGTH, record.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&record.original_name),
        )
        // Some clients read a bare `filename` header instead of parsing
        // Content-Disposition.
        .header("filename", ascii_filename(&record.original_name))
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/files/{file_id}",
    tag = "Profile Files",
    operation_id = "deleteProfileFile",
    summary = "Delete one of the current user's files",
    description = "Deletes the stored object first; the metadata row is only removed once \
        the object deletion succeeded, so a storage failure never strands metadata for a \
        still-deleted object.",
    params(("file_id" = String, Path, description = "File record ID (UUID)")),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid file ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, file_id))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let file_id = Uuid::parse_str(&file_id)
        .map_err(|_| AppError::Validation("Invalid file ID".into()))?;

    let record = profile_store::find_file_by_id(&state.db, auth_user.user_id, file_id).await?;

    // Object first. If this fails the record must survive.
    state.object_store.delete(&record.storage_key).await?;

    let profile = profile_store::remove_file_by_id(&state.db, auth_user.user_id, file_id).await?;

    Ok(Json(profile_response(&state.db, profile).await?))
}

/// Assemble the profile response: owner projection plus files, newest
/// first.
async fn profile_response<C: ConnectionTrait>(
    db: &C,
    profile: profile::Model,
) -> Result<ProfileResponse, AppError> {
    let owner = user::Entity::find_by_id(profile.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("profile owner missing".into()))?;

    let files = profile_store::list_files(db, profile.id).await?;

    Ok(ProfileResponse::from_parts(profile, &owner, files))
}

/// Printable-ASCII rendition of a filename, safe for a header value.
fn ascii_filename(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    if safe.is_empty() {
        "download".to_string()
    } else {
        safe
    }
}

/// Build a `Content-Disposition` attachment value.
fn content_disposition_value(filename: &str) -> String {
    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        encoded
    )
}
