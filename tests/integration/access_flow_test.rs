//! Page-load routing integration tests
//!
//! Drives the composed router the way the host platform would: page loads
//! on the space home and login URLs, with the access decisions coming
//! back as redirects, notices or form data.

mod common;

use axum::http::StatusCode;
use common::{body_json, redirect_target, TestApp, HOME};
use spacegate_access::MembershipDirectory;
use tower::ServiceExt;

/// Force the invitation-link mode with a known token.
async fn invitation_mode(app: &TestApp, token: &str) {
    app.state
        .settings
        .set_invitation_link_active(app.space, true)
        .await
        .unwrap();
    app.state
        .settings
        .set_self_registration(app.space, false)
        .await
        .unwrap();
    app.state
        .settings
        .set_invitation_token(app.space, token)
        .await
        .unwrap();
}

async fn self_registration_mode(app: &TestApp) {
    app.state
        .settings
        .set_invitation_link_active(app.space, true)
        .await
        .unwrap();
    app.state
        .settings
        .set_self_registration(app.space, true)
        .await
        .unwrap();
}

mod invitation_link_flow {
    use super::*;

    #[tokio::test]
    async fn correct_token_joins_and_redirects() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;
        let visitor = app.session("visitor", false);

        let response = app.get("/home?invitation_link=tok1", Some("visitor")).await;

        assert_eq!(
            redirect_target(&response),
            format!("{}?invitation=success", HOME)
        );
        assert!(app.is_member(visitor.user_id).await);

        // Following the redirect renders the joined notice.
        let response = app.get("/home?invitation=success", Some("visitor")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "joined_space");
        assert_eq!(page["notices"][0]["kind"], "success");
    }

    #[tokio::test]
    async fn wrong_token_redirects_failed_without_joining() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;
        let visitor = app.session("visitor", false);

        let response = app.get("/home?invitation_link=wrong", Some("visitor")).await;

        assert_eq!(
            redirect_target(&response),
            format!("{}?invitation=failed", HOME)
        );
        assert!(!app.is_member(visitor.user_id).await);

        // The failure notice shows on arrival.
        let response = app.get("/home?invitation=failed", Some("visitor")).await;
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "invalid_invitation");
        assert_eq!(page["notices"][0]["kind"], "error");
    }

    #[tokio::test]
    async fn wrong_token_via_login_redirects_to_login_flow() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;
        app.session("visitor", false);

        let response = app
            .get("/home?invitation_link=wrong&src=login", Some("visitor"))
            .await;

        assert_eq!(
            redirect_target(&response),
            format!("{}/login?action=privacy&src=invitation&invitation=failed", HOME)
        );
    }

    #[tokio::test]
    async fn anonymous_visitor_sees_access_code_form() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;

        let response = app.get("/home", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["form"]["placeholder"], "Access Code");
        assert_eq!(page["form"]["on_login_page"], false);
    }

    #[tokio::test]
    async fn login_page_injects_form() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;

        let response = app.get("/login", None).await;
        let page = body_json(response).await;
        assert_eq!(page["form"]["on_login_page"], true);
    }

    #[tokio::test]
    async fn member_rejoining_with_token_is_upgraded_not_duplicated() {
        let app = TestApp::new();
        invitation_mode(&app, "tok1").await;
        let visitor = app.member_session("visitor", "subscriber").await;

        let response = app.get("/home?invitation_link=tok1", Some("visitor")).await;

        // Plain redirect home, no success banner for an existing member.
        assert_eq!(redirect_target(&response), HOME);
        let caps = app
            .members
            .user_capabilities(app.space, visitor.user_id)
            .await
            .unwrap();
        assert!(caps.contains("publish_posts"), "role was upgraded");
    }
}

mod leave_space_flow {
    use super::*;

    #[tokio::test]
    async fn member_leaves_and_sees_notice() {
        let app = TestApp::new();
        let visitor = app.member_session("visitor", "author").await;

        let response = app.get("/home?leave_space=true", Some("visitor")).await;

        assert_eq!(
            redirect_target(&response),
            format!("{}?leave_space=success", HOME)
        );
        assert!(!app.is_member(visitor.user_id).await);

        let response = app.get("/home?leave_space=success", Some("visitor")).await;
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "left_space");
    }

    #[tokio::test]
    async fn last_manager_is_blocked_with_warning() {
        let app = TestApp::new();
        let manager = app.member_session("manager", "administrator").await;

        let response = app.get("/home?leave_space=true", Some("manager")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "cannot_leave_last_manager");
        assert_eq!(page["notices"][0]["kind"], "warning");
        assert!(app.is_member(manager.user_id).await, "membership kept");
    }

    #[tokio::test]
    async fn leave_space_wins_over_invitation_success() {
        let app = TestApp::new();
        let visitor = app.member_session("visitor", "author").await;

        let response = app
            .get("/home?leave_space=true&invitation=success", Some("visitor"))
            .await;

        assert_eq!(
            redirect_target(&response),
            format!("{}?leave_space=success", HOME)
        );
        assert!(!app.is_member(visitor.user_id).await);
    }
}

mod self_registration_flow {
    use super::*;

    #[tokio::test]
    async fn join_prompt_then_join() {
        let app = TestApp::new();
        self_registration_mode(&app).await;
        let visitor = app.session("visitor", false);

        let response = app.get("/home", Some("visitor")).await;
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "join_prompt");
        assert_eq!(
            page["notices"][0]["join_url"],
            format!("{}?join=true", HOME)
        );

        let response = app.get("/home?join=true", Some("visitor")).await;
        assert_eq!(
            redirect_target(&response),
            format!("{}?invitation=success", HOME)
        );
        assert!(app.is_member(visitor.user_id).await);
    }

    #[tokio::test]
    async fn super_admin_gets_warning_and_never_joins() {
        let app = TestApp::new();
        self_registration_mode(&app).await;
        let admin = app.session("root", true);

        let response = app.get("/home?join=true", Some("root")).await;
        let page = body_json(response).await;
        assert_eq!(page["notices"][0]["code"], "super_admin_account");
        assert_eq!(page["notices"][0]["kind"], "warning");
        assert!(!app.is_member(admin.user_id).await);
    }

    #[tokio::test]
    async fn existing_member_browses_undisturbed() {
        let app = TestApp::new();
        self_registration_mode(&app).await;
        app.member_session("visitor", "author").await;

        let response = app.get("/home", Some("visitor")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert!(page["notices"].as_array().unwrap().is_empty());
        assert!(page.get("form").is_none());
    }
}

mod disabled_flow {
    use super::*;

    #[tokio::test]
    async fn disabled_space_passes_everyone_through() {
        let app = TestApp::new();
        app.state
            .settings
            .set_invitation_link_active(app.space, false)
            .await
            .unwrap();
        app.state
            .settings
            .set_self_registration(app.space, false)
            .await
            .unwrap();
        app.session("visitor", false);

        let response = app.get("/home", Some("visitor")).await;
        let page = body_json(response).await;
        assert!(page["notices"].as_array().unwrap().is_empty());
        assert!(page.get("form").is_none());
    }

    #[tokio::test]
    async fn unknown_space_is_not_found() {
        let app = TestApp::new();
        let response = app
            .router
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri(format!("/v1/spaces/{}/home", uuid::Uuid::new_v4()))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
