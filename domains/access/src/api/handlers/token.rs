//! Invitation token API handlers

use crate::api::middleware::{AccessState, Actor};
use crate::api::nonce::actions;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use spacegate_common::{Error, Result, ValidatedJson};
use uuid::Uuid;
use validator::Validate;

/// Request for replacing the invitation token
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTokenRequest {
    /// The new access code. Becomes part of the invitation link, so it is
    /// kept to URL-safe lengths.
    #[validate(length(min = 1, max = 128))]
    pub token: String,
}

/// Response carrying the new full invitation link
#[derive(Debug, Serialize)]
pub struct InvitationLinkResponse {
    pub link: String,
}

/// Replace the invitation token
///
/// **POST /v1/spaces/{space_id}/access/token**
///
/// The second authenticated write surface. Managers only; the stored
/// token is overwritten unconditionally and the new shareable link is
/// returned.
pub async fn update_token(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<UpdateTokenRequest>,
) -> Result<Json<InvitationLinkResponse>> {
    state.require_nonce(&actor, actions::UPDATE_TOKEN, &headers)?;

    let link = state
        .tokens
        .rotate_token(space_id, &actor, &request.token)
        .await?;

    Ok(Json(InvitationLinkResponse { link }))
}

/// Read the shareable invitation link
///
/// **GET /v1/spaces/{space_id}/access/link**
///
/// Managers only. While self-registration is active the real secret is
/// replaced with a placeholder.
pub async fn invitation_link(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
) -> Result<Json<InvitationLinkResponse>> {
    if !state
        .resolver
        .can_change_invitation_options(space_id, &actor)
        .await?
    {
        return Err(Error::Authorization(
            "You are not allowed to do this".to_string(),
        ));
    }

    let mode = state.resolver.active_mode(space_id).await?;
    let link = state.tokens.display_link(space_id, mode).await?;

    Ok(Json(InvitationLinkResponse { link }))
}
