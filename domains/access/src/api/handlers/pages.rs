//! Space page handlers
//!
//! The home and login pages are where routing happens on the host
//! platform: every page load runs the request router once, and the
//! resulting decision is translated here into a redirect, notice data, or
//! form data. The core supplies only data maps — rendering them into
//! markup is the templating layer's job, which lives outside this
//! system.

use crate::api::middleware::{AccessState, MaybeActor};
use crate::domain::router::{Decision, Notice, NoticeKind, RequestContext};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use spacegate_common::Result;
use std::collections::HashMap;
use uuid::Uuid;

/// A notice as handed to the rendering layer.
#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(flatten)]
    pub notice: Notice,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            kind: notice.kind(),
            message: notice.message().to_string(),
            notice,
        }
    }
}

/// Data map for the access-code entry form.
#[derive(Debug, Serialize)]
pub struct PasswordFormView {
    pub home_url: String,
    pub message: &'static str,
    pub placeholder: &'static str,
    pub button_text: &'static str,
    pub on_login_page: bool,
}

/// Page payload: the space page plus whatever the router decided to show.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub space_id: Uuid,
    pub notices: Vec<NoticeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<PasswordFormView>,
}

/// Space home page.
///
/// **GET /v1/spaces/{space_id}/home**
pub async fn space_home(
    MaybeActor(identity): MaybeActor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response> {
    let current_url = state.settings.home_url(space_id).await?;
    let ctx = RequestContext::from_identity(current_url, query, identity);
    let decision = state.router.handle(space_id, &ctx).await?;
    render(&state, space_id, decision).await
}

/// Space login page. The access-code form is injected here when the
/// invitation link is active and the visitor is not a member.
///
/// **GET /v1/spaces/{space_id}/login**
pub async fn space_login(
    MaybeActor(identity): MaybeActor,
    State(state): State<AccessState>,
    Path(space_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response> {
    let current_url = state.settings.login_url(space_id).await?;
    let ctx = RequestContext::from_identity(current_url, query, identity);
    let decision = state.router.handle(space_id, &ctx).await?;
    render(&state, space_id, decision).await
}

/// Translate a routing decision into an HTTP response. Redirects are
/// 303s with no body; everything else is page data.
async fn render(state: &AccessState, space_id: Uuid, decision: Decision) -> Result<Response> {
    let response = match decision {
        Decision::Redirect { target, .. } => Redirect::to(&target).into_response(),
        Decision::Pass => Json(PageView {
            space_id,
            notices: vec![],
            form: None,
        })
        .into_response(),
        Decision::Notice(notice) => Json(PageView {
            space_id,
            notices: vec![NoticeView::from(notice)],
            form: None,
        })
        .into_response(),
        Decision::ShowForm { on_login_page } => {
            let form = PasswordFormView {
                home_url: state.settings.home_url(space_id).await?,
                message: "Join this Space with an Access Code",
                placeholder: "Access Code",
                button_text: "Join",
                on_login_page,
            };
            Json(PageView {
                space_id,
                notices: vec![],
                form: Some(form),
            })
            .into_response()
        }
    };
    Ok(response)
}
