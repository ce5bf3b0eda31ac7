//! Privacy level API handler
//!
//! The privacy level belongs to the host platform; this endpoint is the
//! host's update path into this domain. Recording the new level and
//! running the deactivation cascade happen in the same request, the
//! explicit-call replacement for the host's option-update hook.

use crate::api::middleware::{AccessState, Actor};
use crate::api::nonce::actions;
use crate::domain::entities::{PrivacyLevel, CAP_MANAGE_OPTIONS};
use crate::repository::membership::actor_can;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use spacegate_common::{Error, Result};
use uuid::Uuid;

/// Request carrying the host's raw integer privacy level
#[derive(Debug, Deserialize)]
pub struct UpdatePrivacyRequest {
    pub level: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatePrivacyResponse {
    pub privacy: PrivacyLevel,
}

/// Update the space's privacy level
///
/// **PUT /v1/spaces/{space_id}/privacy**
///
/// Requires the options capability. Turning a space private deactivates
/// self-registration and the invitation link in the same request.
pub async fn update_privacy(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdatePrivacyRequest>,
) -> Result<Json<UpdatePrivacyResponse>> {
    state.require_nonce(&actor, actions::UPDATE_PRIVACY, &headers)?;

    if !actor_can(state.members.as_ref(), space_id, &actor, CAP_MANAGE_OPTIONS).await? {
        return Err(Error::Authorization(
            "You are not allowed to change the privacy level".to_string(),
        ));
    }

    let old_level = state.settings.privacy_level(space_id).await?;
    state.settings.set_privacy_raw(space_id, request.level).await?;
    let new_level = PrivacyLevel::from_raw(request.level);

    state
        .resolver
        .on_privacy_changed(space_id, old_level, new_level)
        .await;

    Ok(Json(UpdatePrivacyResponse { privacy: new_level }))
}
