//! End-to-end tests against the composed router with in-memory repositories

use std::sync::Arc;

use admin::InMemoryStatsRepository;
use auth::application::RegisterUseCase;
use auth::{AuthConfig, InMemoryUserRepository};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use billing::InMemoryBillingRepository;
use cms::InMemoryCmsRepository;
use platform::client::TrustedProxies;
use platform::rate_limit::RateLimitConfig;
use portal::InMemoryPortalRepository;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

use crate::{AppParts, build_router, handlers};

const ORIGIN: &str = "http://localhost:4321";

struct TestApp {
    router: Router,
    users: InMemoryUserRepository,
    cms: InMemoryCmsRepository,
}

fn app() -> TestApp {
    let users = InMemoryUserRepository::new();
    let cms = InMemoryCmsRepository::new();
    let billing = InMemoryBillingRepository::new();
    let portal = InMemoryPortalRepository::new();
    let stats =
        InMemoryStatsRepository::new(users.clone(), cms.clone(), billing.clone(), portal.clone());

    let router = build_router(AppParts {
        users: users.clone(),
        cms: cms.clone(),
        billing,
        portal,
        stats,
        auth: Arc::new(AuthConfig::development()),
        auth_rate_limit: RateLimitConfig::new(100, 60),
        trusted_proxies: TrustedProxies::default(),
        frontend_origins: vec![ORIGIN.to_string()],
    });

    TestApp { router, users, cms }
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

async fn call(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn login(app: &TestApp, email: &str) -> Value {
    let (status, body) = call(
        &app.router,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

async fn admin_token(app: &TestApp) -> String {
    RegisterUseCase::new(Arc::new(app.users.clone()))
        .ensure_admin("admin@jasaweb.test", "password123".to_string())
        .await
        .unwrap();
    login(app, "admin@jasaweb.test").await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn client_token(app: &TestApp) -> String {
    let (status, _) = call(
        &app.router,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "client@jasaweb.test", "name": "Client", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, "client@jasaweb.test").await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

mod content {
    use super::*;

    #[tokio::test]
    async fn test_created_page_appears_in_listing() {
        let app = app();
        let token = admin_token(&app).await;

        let (status, page) = call(
            &app.router,
            request(
                "POST",
                "/api/admin/pages",
                Some(&token),
                Some(json!({"title": "About Us", "content": "We build websites."})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{page}");
        assert_eq!(page["title"], "About Us");
        assert_eq!(page["slug"], "about-us");
        assert_eq!(page["content"], "We build websites.");

        let (status, listing) = call(
            &app.router,
            request("GET", "/api/admin/pages?page=1&limit=10", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(listing["pagination"]["total"].as_u64().unwrap() >= 1);
        assert!(
            listing["data"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p["id"] == page["id"])
        );

        let (status, public) =
            call(&app.router, request("GET", "/api/pages/about-us", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["id"], page["id"]);
    }

    #[tokio::test]
    async fn test_bad_pagination_is_400() {
        let app = app();
        let token = admin_token(&app).await;

        for query in ["page=0", "limit=0", "limit=101", "page=abc"] {
            let (status, body) = call(
                &app.router,
                request("GET", &format!("/api/admin/pages?{query}"), Some(&token), None),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body["error"], "BAD_REQUEST");
        }
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn test_admin_route_without_session_is_401_and_writes_nothing() {
        let app = app();

        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/api/admin/pages",
                None,
                Some(json!({"title": "Sneaky", "content": "x"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
        assert!(app.cms.pages().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_token_is_treated_as_anonymous() {
        let app = app();

        let (status, _) = call(
            &app.router,
            request("GET", "/api/admin/dashboard", Some("not-a-jwt"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app.router, request("GET", "/api/pages", Some("not-a-jwt"), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_is_forbidden_from_admin_but_reaches_portal() {
        let app = app();
        let token = client_token(&app).await;

        let (status, _) = call(
            &app.router,
            request("GET", "/api/admin/users", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app.router,
            request("GET", "/api/portal/projects", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_cookie_session_needs_csrf_header() {
        let app = app();
        admin_token(&app).await;
        let session = login(&app, "admin@jasaweb.test").await;
        let token = session["token"].as_str().unwrap();
        let csrf = session["csrfToken"].as_str().unwrap();
        let cookies = format!("auth_token={token}; csrf_token={csrf}");

        let page = |csrf_header: Option<&str>| {
            let mut builder = Request::builder()
                .method("POST")
                .uri("/api/admin/pages")
                .header(header::COOKIE, &cookies)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(value) = csrf_header {
                builder = builder.header("x-csrf-token", value);
            }
            builder
                .body(Body::from(json!({"title": "Cookie Page"}).to_string()))
                .unwrap()
        };

        let (status, body) = call(&app.router, page(None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");

        let (status, _) = call(&app.router, page(Some("wrong"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app.router, page(Some(csrf))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

mod app_routes {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app().router, request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jasaweb-api");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = app();
        for uri in ["/api/nope", "/api/admin/nope", "/elsewhere"] {
            let (status, body) = call(&app.router, request("GET", uri, None, None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"], "NOT_FOUND");
        }
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panic_becomes_json_500() {
        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handlers::panic_response));

        let (status, body) = call(&router, request("GET", "/boom", None, None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INTERNAL_SERVER_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("kaboom"));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_frontend_origin() {
        let app = app();
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/admin/pages")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-csrf-token")
            .body(Body::empty())
            .unwrap();

        let res = app.router.clone().oneshot(req).await.unwrap();
        assert_eq!(
            res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            ORIGIN
        );
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}

mod graphql {
    use super::*;

    async fn seed(app: &TestApp, token: &str) {
        for body in [
            json!({"title": "Services", "content": "Web development"}),
            json!({"title": "Contact", "content": "Say hi"}),
        ] {
            let (status, _) =
                call(&app.router, request("POST", "/api/admin/pages", Some(token), Some(body))).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        for body in [
            json!({"title": "Launch Notes", "content": "Live", "status": "published"}),
            json!({"title": "Work In Progress", "content": "Soon"}),
        ] {
            let (status, _) =
                call(&app.router, request("POST", "/api/admin/posts", Some(token), Some(body))).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        for body in [
            json!({"name": "Starter", "price": 1_500_000, "sortOrder": 1}),
            json!({"name": "Legacy", "price": 900_000, "isActive": false}),
        ] {
            let (status, _) = call(
                &app.router,
                request("POST", "/api/admin/pricing-plans", Some(token), Some(body)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    #[tokio::test]
    async fn test_get_health_query() {
        let (status, body) = call(
            &app().router,
            request("GET", "/api/graphql?query=%7B%20health%20%7D", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["health"], "ok");
    }

    #[tokio::test]
    async fn test_get_without_query_is_400() {
        let (status, body) = call(&app().router, request("GET", "/api/graphql", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_post_reads_catalog() {
        let app = app();
        let token = admin_token(&app).await;
        seed(&app, &token).await;

        let query = r#"
            query Catalog($limit: Int) {
                pages(limit: $limit) { title slug }
                posts { title publishedAt }
                pricingPlans { name price billingPeriod }
                page(slug: "contact") { title }
                missing: page(slug: "nope") { title }
            }
        "#;
        let (status, body) = call(
            &app.router,
            request(
                "POST",
                "/api/graphql",
                None,
                Some(json!({"query": query, "variables": {"limit": 1}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body.get("errors").is_none(), "{body}");

        let data = &body["data"];
        assert_eq!(data["pages"].as_array().unwrap().len(), 1);

        let posts = data["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "Launch Notes");
        assert!(posts[0]["publishedAt"].is_string());

        let plans = data["pricingPlans"].as_array().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0]["name"], "Starter");
        assert_eq!(plans[0]["billingPeriod"], "one_time");

        assert_eq!(data["page"]["title"], "Contact");
        assert!(data["missing"].is_null());
    }

    #[tokio::test]
    async fn test_mutations_are_not_exposed() {
        let (status, body) = call(
            &app().router,
            request(
                "POST",
                "/api/graphql",
                None,
                Some(json!({"query": "mutation { deletePage(id: \"x\") }"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = call(&app().router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
