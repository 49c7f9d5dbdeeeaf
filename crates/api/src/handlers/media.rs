//! Media upload, deletion, and gated file serving.
//!
//! Binaries live in the blob store under
//! `treeId/memberId/category/<random>.<ext>`; the database rows hold only
//! that relative path. Validation (MIME allow-list, size ceiling) runs
//! before any byte reaches storage, and no metadata row is written unless
//! the storage write succeeded.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use kintree_core::error::CoreError;
use kintree_core::media::{self, MediaCategory};
use kintree_core::permissions::Capability;
use kintree_core::types::DbId;
use kintree_db::models::attachment::CreateBinaryAttachment;
use kintree_db::repositories::{
    AudioClipRepo, DocumentRepo, MemberRepo, PhotoRepo, TreeRepo,
};
use serde::{Deserialize, Serialize};

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage::{self, generate_object_name};

/// One parsed multipart upload.
struct UploadParts {
    category: MediaCategory,
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
    title: Option<String>,
    description: Option<String>,
}

/// Metadata returned after a successful upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub category: MediaCategory,
    pub file_path: String,
    /// Row id of the created attachment; absent for profile pictures,
    /// which live on the member row itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
}

/// Request body for deleting an attachment.
#[derive(Deserialize)]
pub struct DeleteMediaRequest {
    pub category: MediaCategory,
    /// Attachment row id; ignored for the profile category.
    pub id: Option<DbId>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadParts, AppError> {
    let mut category: Option<MediaCategory> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "category" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                category = Some(MediaCategory::parse(&text).ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Unknown media category '{text}'"
                    )))
                })?);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((file_name, mime_type, data.to_vec()));
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {} // ignore unknown fields
        }
    }

    let category =
        category.ok_or_else(|| AppError::BadRequest("Missing 'category' field".into()))?;
    let (file_name, mime_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;

    Ok(UploadParts {
        category,
        file_name,
        mime_type,
        data,
        title,
        description,
    })
}

/// POST /api/v1/trees/{tree_id}/members/{member_id}/upload
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    let member = MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let parts = read_multipart(multipart).await?;
    media::validate_upload(parts.category, &parts.mime_type, parts.data.len() as u64)?;

    let extension = media::extension_for_mime(&parts.mime_type);
    let object_name = generate_object_name(extension);
    let file_path = format!(
        "{tree_id}/{member_id}/{}/{object_name}",
        parts.category.as_str()
    );

    // Storage write first: an upload with no stored object must fail
    // before a metadata row exists.
    state.store.put(&file_path, &parts.data).await?;

    let title = parts
        .title
        .unwrap_or_else(|| media::sanitize_file_name(&parts.file_name));

    let attachment = CreateBinaryAttachment {
        member_id,
        title,
        description: parts.description,
        file_path: file_path.clone(),
        file_type: Some(parts.mime_type),
        file_size: Some(parts.data.len() as i64),
    };

    // The object is already in storage; if the metadata write fails the
    // blob must not be left behind.
    let response = match record_upload(
        &state,
        parts.category,
        member.profile_picture_path.clone(),
        &attachment,
    )
    .await
    {
        Ok(response) => response,
        Err(err) => {
            storage::delete_all_quietly(state.store.as_ref(), &[file_path]).await;
            return Err(err);
        }
    };

    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Writes the metadata for a stored object: an attachment row, or the
/// profile picture column on the member itself.
async fn record_upload(
    state: &AppState,
    category: MediaCategory,
    old_profile_path: Option<String>,
    attachment: &CreateBinaryAttachment,
) -> Result<UploadResponse, AppError> {
    if category == MediaCategory::Profile {
        MemberRepo::set_profile_picture(
            &state.pool,
            attachment.member_id,
            Some(attachment.file_path.as_str()),
        )
        .await?;
        if let Some(old) = old_profile_path {
            storage::delete_all_quietly(state.store.as_ref(), &[old]).await;
        }
        return Ok(UploadResponse {
            category,
            file_path: attachment.file_path.clone(),
            id: None,
        });
    }

    let id = match category {
        MediaCategory::Photos => PhotoRepo::create(&state.pool, attachment).await?.id,
        MediaCategory::Documents => DocumentRepo::create(&state.pool, attachment).await?.id,
        MediaCategory::Audio => AudioClipRepo::create(&state.pool, attachment).await?.id,
        MediaCategory::Profile => unreachable!("profile uploads return above"),
    };
    Ok(UploadResponse {
        category,
        file_path: attachment.file_path.clone(),
        id: Some(id),
    })
}

/// DELETE /api/v1/trees/{tree_id}/members/{member_id}/media
///
/// Removes the metadata row first, then deletes the stored binary
/// best-effort; a storage failure never blocks the deletion.
pub async fn delete_media(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
    Json(input): Json<DeleteMediaRequest>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    let member = MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let stored_path = match input.category {
        MediaCategory::Profile => {
            let path = member.profile_picture_path.clone().ok_or(AppError::Core(
                CoreError::NotFound {
                    entity: "ProfilePicture",
                    id: member_id,
                },
            ))?;
            MemberRepo::set_profile_picture(&state.pool, member_id, None).await?;
            path
        }
        MediaCategory::Photos => {
            let id = require_attachment_id(&input)?;
            let photo = PhotoRepo::find_for_member(&state.pool, member_id, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;
            PhotoRepo::delete(&state.pool, id).await?;
            photo.file_path
        }
        MediaCategory::Documents => {
            let id = require_attachment_id(&input)?;
            let document = DocumentRepo::find_for_member(&state.pool, member_id, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Document",
                    id,
                }))?;
            DocumentRepo::delete(&state.pool, id).await?;
            document.file_path
        }
        MediaCategory::Audio => {
            let id = require_attachment_id(&input)?;
            let clip = AudioClipRepo::find_for_member(&state.pool, member_id, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "AudioClip",
                    id,
                }))?;
            AudioClipRepo::delete(&state.pool, id).await?;
            clip.file_path
        }
    };

    storage::delete_all_quietly(state.store.as_ref(), &[stored_path]).await;
    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_attachment_id(input: &DeleteMediaRequest) -> Result<DbId, AppError> {
    input
        .id
        .ok_or_else(|| AppError::BadRequest("Missing attachment 'id'".into()))
}

/// GET /api/v1/files/{*path}
///
/// Serves a stored binary. The leading path segment is the owning tree
/// id; the caller needs view access to that tree.
pub async fn serve_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let tree_id: DbId = path
        .split('/')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Malformed file path".into()))?;

    require_capability(&state.pool, tree_id, user.user_id, Capability::View).await?;

    let data = state
        .store
        .get(&path)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "File",
            id: tree_id,
        }))?;

    let mime_type = media::mime_for_path(&path);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .body(Body::from(data))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}
