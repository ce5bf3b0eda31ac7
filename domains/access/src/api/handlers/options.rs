//! Access option management API handlers
//!
//! The mode endpoint is one of the two authenticated write surfaces of
//! the domain. Both writes require the manager capability and a
//! per-action nonce; failures come back as structured error payloads,
//! never silently.

use crate::api::middleware::{AccessState, Actor};
use crate::api::nonce::actions;
use crate::domain::entities::AccessMode;
use crate::domain::resolver::AccessModeResolver;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use spacegate_common::{Error, Result, ValidatedJson};
use uuid::Uuid;
use validator::Validate;

/// Request for changing the active access mode
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeModeRequest {
    /// Mode name: `none`, `invitation_link` or `self_registration`
    #[validate(length(min = 1))]
    pub option: String,
}

/// Response for mode changes, reporting the stored flags as written
#[derive(Debug, Serialize)]
pub struct ChangeModeResponse {
    pub message: String,
    pub option_name: AccessMode,
    pub invitation_link_active: String,
    pub self_registration: String,
}

/// Response for the option introspection endpoint
#[derive(Debug, Serialize)]
pub struct AccessOptionsResponse {
    pub active_option: AccessMode,
    pub disabled_options: Vec<AccessMode>,
    pub default_role: String,
}

/// Nonces for all write actions, bound to the requesting user
#[derive(Debug, Serialize)]
pub struct NoncesResponse {
    pub change_invitation_option: String,
    pub invitation_update_token: String,
    pub update_privacy: String,
}

/// Set the active access mode
///
/// **POST /v1/spaces/{space_id}/access/mode**
///
/// Radio-exclusive: the two stored flags are always written together.
/// Requires the manager capability; enabling self-registration
/// additionally requires the options capability and a non-private space.
pub async fn change_access_mode(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<ChangeModeRequest>,
) -> Result<Json<ChangeModeResponse>> {
    state.require_nonce(&actor, actions::CHANGE_INVITATION_OPTION, &headers)?;

    let mode: AccessMode = request
        .option
        .parse()
        .map_err(|_| Error::Validation("Invalid option given".to_string()))?;

    let change = state.resolver.set_active_mode(space_id, mode, &actor).await?;

    Ok(Json(ChangeModeResponse {
        message: format!("Updated options to {}", change.option_name),
        option_name: change.option_name,
        invitation_link_active: change.invitation_link_active,
        self_registration: change.self_registration,
    }))
}

/// Read the active option and which options are currently selectable
///
/// **GET /v1/spaces/{space_id}/access/options**
///
/// Feeds the settings surface. Managers only.
pub async fn access_options(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
) -> Result<Json<AccessOptionsResponse>> {
    if !state
        .resolver
        .can_change_invitation_options(space_id, &actor)
        .await?
    {
        return Err(Error::Authorization(
            "You are not allowed to do this".to_string(),
        ));
    }

    let active_option = state.resolver.active_mode(space_id).await?;
    let privacy = state.settings.privacy_level(space_id).await?;
    let default_role = state.settings.default_role(space_id).await?;

    Ok(Json(AccessOptionsResponse {
        active_option,
        disabled_options: AccessModeResolver::disabled_options(privacy).to_vec(),
        default_role,
    }))
}

/// Issue nonces for the write actions
///
/// **GET /v1/spaces/{space_id}/access/nonces**
///
/// The host platform embeds these into the settings page the way it
/// embeds any per-session script data.
pub async fn access_nonces(
    Actor(actor): Actor,
    State(state): State<AccessState>,
    Path(_space_id): Path<Uuid>,
) -> Result<Json<NoncesResponse>> {
    Ok(Json(NoncesResponse {
        change_invitation_option: state
            .nonces
            .issue(actor.user_id, actions::CHANGE_INVITATION_OPTION),
        invitation_update_token: state.nonces.issue(actor.user_id, actions::UPDATE_TOKEN),
        update_privacy: state.nonces.issue(actor.user_id, actions::UPDATE_PRIVACY),
    }))
}
