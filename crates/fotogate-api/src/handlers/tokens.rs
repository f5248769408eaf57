//! Admin token management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use fotogate_core::error::AppError;
use fotogate_core::types::pagination::PageResponse;
use fotogate_delivery::portal_url;
use fotogate_entity::token::TokenKind;
use fotogate_token::service::{BatchItem, IssueRequest};

use crate::dto::request::{BulkIssueRequest, IssueTokenRequest};
use crate::dto::response::{IssuedTokenResponse, TokenView};
use crate::error::ApiError;
use crate::extractors::{AdminKey, PaginationParams};
use crate::state::AppState;

/// POST /api/tokens
pub async fn issue_token(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(req): Json<IssueTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = parse_token_kind(&req.kind)?;

    let token = state
        .token_service
        .issue(IssueRequest {
            kind,
            subject_ids: req.subject_ids,
            owner_contact: req.owner_contact,
            expires_at: req.expires_at,
        })
        .await?;

    let url = portal_url(&state.config.portal.base_url, &token.value);
    Ok(Json(serde_json::json!({
        "success": true,
        "data": IssuedTokenResponse::new(&token, url),
    })))
}

/// POST /api/tokens/bulk
pub async fn issue_bulk(
    State(state): State<AppState>,
    _admin: AdminKey,
    Json(req): Json<BulkIssueRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut items = Vec::with_capacity(req.items.len());
    for item in req.items {
        items.push(BatchItem {
            label: item.label,
            request: IssueRequest {
                kind: parse_token_kind(&item.kind)?,
                subject_ids: item.subject_ids,
                owner_contact: item.owner_contact,
                expires_at: item.expires_at,
            },
        });
    }

    let report = state.token_service.issue_batch(items).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}

/// GET /api/tokens
pub async fn list_tokens(
    State(state): State<AppState>,
    _admin: AdminKey,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .token_service
        .list(params.into_page_request())
        .await?;

    let views = PageResponse::new(
        page.items.iter().map(TokenView::from).collect(),
        page.page,
        page.page_size,
        page.total_items,
    );
    Ok(Json(serde_json::json!({ "success": true, "data": views })))
}

/// GET /api/tokens/{id}
pub async fn get_token(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state.token_service.get(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": TokenView::from(&token) }),
    ))
}

/// POST /api/tokens/{id}/rotate
pub async fn rotate_token(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state.rotation.rotate(id).await?;
    let url = portal_url(&state.config.portal.base_url, &token.value);
    Ok(Json(serde_json::json!({
        "success": true,
        "data": IssuedTokenResponse::new(&token, url),
    })))
}

/// POST /api/tokens/rotate-expiring
pub async fn rotate_expiring(
    State(state): State<AppState>,
    _admin: AdminKey,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.rotation.rotate_expiring().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}

/// DELETE /api/tokens/{id}
pub async fn revoke_token(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.token_service.revoke(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Token revoked" } }),
    ))
}

fn parse_token_kind(s: &str) -> Result<TokenKind, AppError> {
    match s {
        "student" => Ok(TokenKind::Student),
        "family" => Ok(TokenKind::Family),
        "group" => Ok(TokenKind::Group),
        "event" => Ok(TokenKind::Event),
        "folder" => Ok(TokenKind::Folder),
        "share" => Ok(TokenKind::Share),
        _ => Err(AppError::validation(format!("Invalid token kind: {s}"))),
    }
}
