//! Per-request access routing
//!
//! One decision per page load. The router inspects the request (URL,
//! query parameters, authentication state) together with the space's
//! active mode and membership state, and produces exactly one terminal
//! decision. Transitions are evaluated in strict priority order — first
//! match wins — and a redirect halts all further processing: no later
//! step runs and no page body is produced.

use crate::domain::entities::{AccessMode, ComparableUrl, CAP_PROMOTE_USERS};
use crate::domain::resolver::AccessModeResolver;
use crate::domain::token::{TokenManager, INVITATION_LINK_PARAM};
use crate::repository::identity::Identity;
use crate::repository::membership::MembershipDirectory;
use crate::repository::settings::SpaceSettings;
use serde::Serialize;
use spacegate_common::Result;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Everything the router needs to know about one request. Created at
/// request start, discarded at request end.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub current_url: String,
    query: HashMap<String, String>,
    pub user: Option<Uuid>,
    pub super_admin: bool,
}

impl RequestContext {
    pub fn anonymous(current_url: impl Into<String>, query: HashMap<String, String>) -> Self {
        Self {
            current_url: current_url.into(),
            query,
            user: None,
            super_admin: false,
        }
    }

    pub fn authenticated(
        current_url: impl Into<String>,
        query: HashMap<String, String>,
        identity: Identity,
    ) -> Self {
        Self {
            current_url: current_url.into(),
            query,
            user: Some(identity.user_id),
            super_admin: identity.super_admin,
        }
    }

    pub fn from_identity(
        current_url: impl Into<String>,
        query: HashMap<String, String>,
        identity: Option<Identity>,
    ) -> Self {
        match identity {
            Some(identity) => Self::authenticated(current_url, query, identity),
            None => Self::anonymous(current_url, query),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    fn param_is(&self, key: &str, value: &str) -> bool {
        self.param(key) == Some(value)
    }
}

/// Visual category of a notice, consumed by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A notice to render on the current page. Carries data, never markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Notice {
    JoinedSpace,
    LeftSpace,
    InvalidInvitation,
    CannotLeaveLastManager,
    JoinPrompt { join_url: String },
    SuperAdminAccount,
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::JoinedSpace | Notice::LeftSpace => NoticeKind::Success,
            Notice::InvalidInvitation => NoticeKind::Error,
            Notice::CannotLeaveLastManager | Notice::SuperAdminAccount => NoticeKind::Warning,
            Notice::JoinPrompt { .. } => NoticeKind::Info,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::JoinedSpace => "Welcome! You successfully joined this Space.",
            Notice::LeftSpace => "You have left this Space.",
            Notice::InvalidInvitation => {
                "The access code or invitation-link you used is not (or no longer) valid."
            }
            Notice::CannotLeaveLastManager => {
                "You can't leave this Space because you are the last member who can manage users. \
                 Please add somebody or delete this Space."
            }
            Notice::JoinPrompt { .. } => "Join this space",
            Notice::SuperAdminAccount => {
                "You are currently logged in as a super-admin. Please use a regular account to collaborate."
            }
        }
    }
}

/// A membership mutation requested by a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    AddMember { role: String },
    UpgradeRole { role: String },
    RemoveMember,
}

/// Terminal outcome of routing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Request proceeds unmodified.
    Pass,
    /// Render a notice on the current page.
    Notice(Notice),
    /// Apply the optional membership mutation, then redirect. Terminal:
    /// nothing else runs, no page body is produced.
    Redirect {
        mutation: Option<Mutation>,
        target: String,
    },
    /// Render the access-code entry form; on the login page the form is
    /// injected into the login template.
    ShowForm { on_login_page: bool },
}

#[derive(Clone)]
pub struct RequestRouter {
    settings: SpaceSettings,
    resolver: AccessModeResolver,
    tokens: TokenManager,
    members: Arc<dyn MembershipDirectory>,
}

impl RequestRouter {
    pub fn new(
        settings: SpaceSettings,
        resolver: AccessModeResolver,
        tokens: TokenManager,
        members: Arc<dyn MembershipDirectory>,
    ) -> Self {
        Self {
            settings,
            resolver,
            tokens,
            members,
        }
    }

    /// Decide and apply: routes the request, then executes the membership
    /// mutation of a redirect decision before returning it.
    pub async fn handle(&self, space: Uuid, ctx: &RequestContext) -> Result<Decision> {
        let decision = self.decide(space, ctx).await?;
        if let Decision::Redirect {
            mutation: Some(mutation),
            ..
        } = &decision
        {
            if let Some(user) = ctx.user {
                self.apply(space, user, mutation).await?;
            }
        }
        Ok(decision)
    }

    async fn apply(&self, space: Uuid, user: Uuid, mutation: &Mutation) -> Result<()> {
        match mutation {
            Mutation::AddMember { role } => {
                tracing::info!(%space, %user, %role, "adding member");
                self.members.add_member(space, user, role).await
            }
            Mutation::UpgradeRole { role } => {
                tracing::info!(%space, %user, %role, "upgrading member role");
                self.members.add_member(space, user, role).await
            }
            Mutation::RemoveMember => {
                tracing::info!(%space, %user, "removing member");
                self.members.remove_member(space, user).await
            }
        }
    }

    /// Route one request to its terminal decision. Pure with respect to
    /// membership: mutations are returned, not applied.
    pub async fn decide(&self, space: Uuid, ctx: &RequestContext) -> Result<Decision> {
        let home_url = self.settings.home_url(space).await?;
        let at_home = ComparableUrl::new(&ctx.current_url).equals(&home_url);

        // 1. Leave space, guarded against removing the last manager.
        if ctx.param_is("leave_space", "true") && at_home {
            if let Some(user) = ctx.user {
                if self.leaving_last_manager(space, user).await? {
                    return Ok(Decision::Notice(Notice::CannotLeaveLastManager));
                }
                return Ok(Decision::Redirect {
                    mutation: Some(Mutation::RemoveMember),
                    target: format!("{}?leave_space=success", home_url),
                });
            }
        }

        // 2./3. Outcome notices from a previous redirect.
        match ctx.param("invitation") {
            Some("success") => return Ok(Decision::Notice(Notice::JoinedSpace)),
            Some("failed") => return Ok(Decision::Notice(Notice::InvalidInvitation)),
            _ => {}
        }
        if ctx.param_is("src", "invitation") {
            return Ok(Decision::Notice(Notice::InvalidInvitation));
        }
        if ctx.param_is("leave_space", "success") {
            return Ok(Decision::Notice(Notice::LeftSpace));
        }

        let mode = self.resolver.active_mode(space).await?;

        // 4. Register via invitation link.
        if mode == AccessMode::InvitationLink {
            if let (Some(supplied), Some(user)) = (ctx.param(INVITATION_LINK_PARAM), ctx.user) {
                if !ctx.super_admin && at_home {
                    return self
                        .register_via_link(space, user, supplied, ctx, &home_url)
                        .await;
                }
            }
        }

        // 5./6. Self-registration: explicit join, or the join prompt.
        if mode == AccessMode::SelfRegistration {
            if let Some(user) = ctx.user {
                if !self.members.is_member(space, user).await? {
                    if ctx.super_admin {
                        return Ok(Decision::Notice(Notice::SuperAdminAccount));
                    }
                    if at_home && ctx.param_is("join", "true") {
                        let role = self.settings.default_role(space).await?;
                        return Ok(Decision::Redirect {
                            mutation: Some(Mutation::AddMember { role }),
                            target: format!("{}?invitation=success", home_url),
                        });
                    }
                    return Ok(Decision::Notice(Notice::JoinPrompt {
                        join_url: format!("{}?join=true", home_url),
                    }));
                }
            }
        }

        // 7. Access-code form for everyone who is not (yet) a member.
        if mode == AccessMode::InvitationLink {
            let is_member = match ctx.user {
                Some(user) => self.members.is_member(space, user).await?,
                None => false,
            };
            if !is_member {
                if ctx.super_admin {
                    return Ok(Decision::Notice(Notice::SuperAdminAccount));
                }
                let login_url = self.settings.login_url(space).await?;
                let on_login_page = ComparableUrl::new(&ctx.current_url).equals(&login_url);
                return Ok(Decision::ShowForm { on_login_page });
            }
        }

        // 8. Nothing to do.
        Ok(Decision::Pass)
    }

    /// The last-manager guard: the user holds the manager capability and
    /// fewer than two members hold it overall.
    async fn leaving_last_manager(&self, space: Uuid, user: Uuid) -> Result<bool> {
        let managers = self
            .members
            .users_with_capability(space, CAP_PROMOTE_USERS)
            .await?;
        let is_manager = self
            .members
            .user_capabilities(space, user)
            .await?
            .contains(CAP_PROMOTE_USERS);
        Ok(is_manager && managers.len() < 2)
    }

    async fn register_via_link(
        &self,
        space: Uuid,
        user: Uuid,
        supplied: &str,
        ctx: &RequestContext,
        home_url: &str,
    ) -> Result<Decision> {
        let stored = self.tokens.get_token(space).await?;
        if supplied != stored {
            // Send login-page arrivals back through the login flow.
            let target = if ctx.param_is("src", "login") {
                format!(
                    "{}?action=privacy&src=invitation&invitation=failed",
                    self.settings.login_url(space).await?
                )
            } else {
                format!("{}?invitation=failed", home_url)
            };
            return Ok(Decision::Redirect {
                mutation: None,
                target,
            });
        }

        let default_role = self.settings.default_role(space).await?;
        if self.members.is_member(space, user).await? {
            // Already in: upgrade only when the default role grants
            // capabilities the current role does not.
            let mutation = if self.has_all_role_caps(space, user, &default_role).await? {
                None
            } else {
                Some(Mutation::UpgradeRole { role: default_role })
            };
            return Ok(Decision::Redirect {
                mutation,
                target: home_url.to_string(),
            });
        }

        Ok(Decision::Redirect {
            mutation: Some(Mutation::AddMember { role: default_role }),
            target: format!("{}?invitation=success", home_url),
        })
    }

    async fn has_all_role_caps(&self, space: Uuid, user: Uuid, role: &str) -> Result<bool> {
        let role_caps = self.members.role_capabilities(space, role).await?;
        let user_caps = self.members.user_capabilities(space, user).await?;
        Ok(role_caps.is_subset(&user_caps))
    }
}
