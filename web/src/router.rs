use crate::{
    controller::{health_check_controller, notification_controller},
    middleware::auth::require_auth,
    ws, AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{any, get, put},
    Router,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "LMS Platform Notifications API"
        ),
        paths(
            health_check_controller::health_check,
            notification_controller::index,
            notification_controller::mark_read,
        ),
        components(
            schemas(
                domain::notifications::Model,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "lms_platform", description = "LMS Platform Notifications API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer credential requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity service"))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(notification_routes(app_state.clone()))
        .merge(push_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(notification_controller::index))
        .route(
            "/notifications/{id}/read",
            put(notification_controller::mark_read),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

// The push handshake authenticates after the upgrade, so it sits outside
// `require_auth`.
fn push_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", any(ws::handler::push_handler))
        .with_state(app_state)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::test_support::{app_state, bearer_for};
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use domain::{notifications, Id};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn notification(recipient_id: Id, message: &str, is_read: bool) -> notifications::Model {
        let now = chrono::Utc::now();
        notifications::Model {
            id: Id::new_v4(),
            recipient_id,
            message: message.to_string(),
            is_read,
            related_entity: None,
            related_entity_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_reports_ok() -> anyhow::Result<()> {
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "OK" }));
        Ok(())
    }

    #[tokio::test]
    async fn listing_without_credential_is_unauthorized() -> anyhow::Result<()> {
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let response = app
            .oneshot(Request::builder().uri("/notifications").body(Body::empty())?)
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn listing_with_forged_credential_is_unauthorized() -> anyhow::Result<()> {
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/notifications")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn listing_returns_the_callers_notifications() -> anyhow::Result<()> {
        let user_id = Id::new_v4();
        let newer = notification(user_id, "newer", false);
        let older = notification(user_id, "older", true);
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![newer.clone(), older.clone()]])
                .into_connection(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/notifications")
                    .header(AUTHORIZATION, bearer_for(user_id))
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"][0]["message"], "newer");
        assert_eq!(body["data"][1]["message"], "older");
        assert_eq!(body["data"][1]["is_read"], true);
        Ok(())
    }

    #[tokio::test]
    async fn marking_an_owned_notification_read_returns_it() -> anyhow::Result<()> {
        let user_id = Id::new_v4();
        let unread = notification(user_id, "hello", false);
        let mut read = unread.clone();
        read.is_read = true;
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![unread.clone()]])
                .append_query_results([vec![read.clone()]])
                .into_connection(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/notifications/{}/read", unread.id))
                    .header(AUTHORIZATION, bearer_for(user_id))
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["id"], json!(unread.id));
        assert_eq!(body["data"]["is_read"], true);
        Ok(())
    }

    #[tokio::test]
    async fn marking_someone_elses_notification_is_not_found() -> anyhow::Result<()> {
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notifications::Model>::new()])
                .into_connection(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/notifications/{}/read", Id::new_v4()))
                    .header(AUTHORIZATION, bearer_for(Id::new_v4()))
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn published_event_reaches_the_recipients_open_channel() {
        let now = chrono::Utc::now();
        let user = domain::users::Model {
            id: Id::new_v4(),
            user_name: "student".to_string(),
            email: "student@example.com".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let mut row = notification(user.id, "You earned the \"Fast Learner\" badge!", false);
        row.related_entity = Some("Badge".to_string());
        let state = app_state(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user.clone()]])
                .append_query_results([vec![row.clone()]])
                .append_query_results([vec![user.clone()]])
                .into_connection(),
        );
        let (channel, mut channel_rx) = push::Channel::open();
        state.connection_registry.register(user.id, channel);

        state
            .event_publisher
            .publish(events::DomainEvent::BadgeEarned {
                badge: "Fast Learner".to_string(),
                notify_user_ids: vec![user.id],
            })
            .await;

        assert_eq!(
            channel_rx.try_recv().expect("envelope pushed"),
            push::Envelope::notification(row.message.clone(), Some("Badge".to_string()), None)
        );
    }

    #[tokio::test]
    async fn marking_a_malformed_id_is_not_found() -> anyhow::Result<()> {
        let app = define_routes(app_state(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/notifications/42/read")
                    .header(AUTHORIZATION, bearer_for(Id::new_v4()))
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
