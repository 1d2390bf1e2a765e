/*
 * Responsibility
 * - Config読み込み → 依存生成 (PgPool, AuthGate) → Router 組み立て
 * - Middleware の適用 (access token / HTTP / CORS / security headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::PgProfileStore,
    services::auth::build_auth_gate,
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,user_profile_service=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may be hidden depending on the launcher.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so the panic is noticed immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting user profile service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to run database migrations")?;

    // The JWT secret is read once here and injected; nothing reads it per request.
    let auth = build_auth_gate(config);

    Ok(AppState::new(Arc::new(PgProfileStore::new(db)), auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    // Only the merged-in public routes bypass token verification.
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone())
        .merge(api::v1::public_routes());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::repos::memory::MemoryProfileStore;
    use crate::services::auth::verifier::test_support::{now, sign};
    use crate::services::auth::{AuthGate, TokenVerifier};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "s3cret";

    fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "postgres://unused".into(),
            database_max_connections: 1,
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            jwt_secret_key: SECRET.into(),
            auth_issuer: None,
            auth_audience: None,
            access_token_leeway_seconds: 0,
        }
    }

    fn app() -> Router {
        let config = test_config();
        let state = AppState::new(
            Arc::new(MemoryProfileStore::default()),
            Arc::new(AuthGate::new(TokenVerifier::with_secret(SECRET))),
        );
        build_router(state, &config)
    }

    fn token_for(user_id: &str) -> String {
        sign(&json!({"user_id": user_id, "exp": now() + 3600}), SECRET)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(&app(), request("GET", "/api/v1/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn health_ignores_bad_credentials() {
        let (status, body) =
            send(&app(), request("GET", "/api/v1/health", Some("garbage"), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn malformed_bodies_are_400_in_error_envelope() {
        let app = app();

        for body in [
            json!({"id": "42"}),
            json!({}),
            json!({"id": Uuid::new_v4(), "first_name": 5}),
        ] {
            let (status, res) =
                send(&app, request("POST", "/api/v1/users/create", None, Some(body))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(res["error"]["code"], "VALIDATION_ERROR");
        }

        let id = Uuid::new_v4();
        send(&app, request("POST", "/api/v1/users/create", None, Some(json!({"id": id})))).await;
        let token = token_for(&id.to_string());
        let (status, res) = send(
            &app,
            request(
                "PATCH",
                "/api/v1/users/profile",
                Some(&token),
                Some(json!({"last_name": ["not", "a", "string"]})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn profile_requires_credentials() {
        let (status, body) = send(&app(), request("GET", "/api/v1/users/profile", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "NOT_AUTHENTICATED");
    }

    #[tokio::test]
    async fn expired_and_invalid_tokens_are_rejected_with_reason() {
        let app = app();

        let expired = sign(&json!({"user_id": "42", "exp": now() - 10}), SECRET);
        let (status, body) =
            send(&app, request("GET", "/api/v1/users/profile", Some(&expired), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "token expired");

        let forged = sign(&json!({"user_id": "42", "exp": now() + 60}), "wrong");
        let (status, body) =
            send(&app, request("GET", "/api/v1/users/profile", Some(&forged), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "invalid token");
    }

    #[tokio::test]
    async fn bad_token_is_rejected_even_on_allow_any_route() {
        let (status, _) = send(
            &app(),
            request(
                "POST",
                "/api/v1/users/create",
                Some("garbage"),
                Some(json!({"id": Uuid::new_v4()})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_read_and_patch_own_profile() {
        let app = app();
        let id = Uuid::new_v4();
        let token = token_for(&id.to_string());

        let (status, created) = send(
            &app,
            request(
                "POST",
                "/api/v1/users/create",
                None,
                Some(json!({"id": id, "first_name": "Ada", "native_language": "en"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["settings"], json!({}));

        let (status, fetched) =
            send(&app, request("GET", "/api/v1/users/profile", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], json!(id));
        assert_eq!(fetched["first_name"], "Ada");

        let (status, patched) = send(
            &app,
            request(
                "PATCH",
                "/api/v1/users/profile",
                Some(&token),
                Some(json!({"first_name": null, "settings": {"theme": "dark"}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["first_name"], Value::Null);
        assert_eq!(patched["native_language"], "en");
        assert_eq!(patched["settings"], json!({"theme": "dark"}));
    }

    #[tokio::test]
    async fn cookie_token_authenticates() {
        let app = app();
        let id = Uuid::new_v4();
        send(
            &app,
            request("POST", "/api/v1/users/create", None, Some(json!({"id": id}))),
        )
        .await;

        let req = Request::builder()
            .uri("/api/v1/users/profile")
            .header(header::COOKIE, format!("access_token={}", token_for(&id.to_string())))
            .header(header::AUTHORIZATION, "Bearer not-even-a-jwt")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(id));
    }

    #[tokio::test]
    async fn missing_profile_is_404() {
        let app = app();

        let token = token_for(&Uuid::new_v4().to_string());
        let (status, body) =
            send(&app, request("GET", "/api/v1/users/profile", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "User not found.");

        // Non-UUID user ids cannot own a profile.
        let token = token_for("42");
        let (status, _) =
            send(&app, request("GET", "/api/v1/users/profile", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_bad_body_is_400() {
        let app = app();
        let id = Uuid::new_v4();

        let body = json!({"id": id});
        let (status, _) =
            send(&app, request("POST", "/api/v1/users/create", None, Some(body.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) =
            send(&app, request("POST", "/api/v1/users/create", None, Some(body))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/users/create",
                None,
                Some(json!({"id": Uuid::new_v4(), "settings": "dark"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn responses_carry_request_id_and_security_headers() {
        let res = app()
            .oneshot(request("GET", "/api/v1/health", None, None))
            .await
            .unwrap();

        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
    }
}
