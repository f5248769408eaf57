//! Admin delivery handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use fotogate_core::error::AppError;
use fotogate_delivery::portal_url;
use fotogate_delivery::templates::{GalleryItem, MessageContext};
use fotogate_delivery::DeliveryRequest;
use fotogate_entity::delivery::DeliveryChannel;

use crate::dto::request::DeliverRequest;
use crate::error::ApiError;
use crate::extractors::AdminKey;
use crate::state::AppState;

/// POST /api/tokens/{id}/deliver
pub async fn deliver_token(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<Uuid>,
    Json(req): Json<DeliverRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.recipients.is_empty() {
        return Err(AppError::validation("recipients must not be empty").into());
    }

    let mut requests = Vec::with_capacity(req.recipients.len());
    for target in req.recipients {
        let channel = DeliveryChannel::parse(&target.channel).ok_or_else(|| {
            AppError::validation(format!("Invalid delivery channel: {}", target.channel))
        })?;
        requests.push(DeliveryRequest {
            channel,
            recipient: target.recipient,
        });
    }

    let token = state.token_service.get(id).await?;
    let subjects = state.subject_repo.find_by_ids(&token.subject_ids).await?;

    let family_name = subjects
        .iter()
        .find_map(|s| s.family_name.clone())
        .or_else(|| token.owner_contact.clone())
        .unwrap_or_else(|| "there".to_string());
    let event_name = subjects
        .first()
        .map(|s| s.event_name.clone())
        .unwrap_or_default();
    let galleries = subjects
        .iter()
        .map(|s| GalleryItem {
            subject_name: s.display_name.clone(),
        })
        .collect();

    let context = MessageContext::build(
        &token,
        portal_url(&state.config.portal.base_url, &token.value),
        family_name,
        event_name,
        galleries,
        Utc::now(),
    );

    let summary = state
        .dispatcher
        .send_batch(&token, &context, requests)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}

/// GET /api/tokens/{id}/deliveries
pub async fn list_deliveries(
    State(state): State<AppState>,
    _admin: AdminKey,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // 404 for unknown tokens rather than an empty history.
    state.token_service.get(id).await?;

    let deliveries = state.delivery_repo.find_by_token(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": deliveries }),
    ))
}
