//! Router-level tests for the portal crate

use std::sync::Arc;

use auth::{CurrentUser, UserRole};
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use axum::{Extension, Router};
use kernel::id::UserId;
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitState};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::domain::value_object::ticket_status::TicketStatus;
use crate::infra::memory::InMemoryPortalRepository;
use crate::presentation::router::{portal_admin_router_generic, portal_client_router_generic};

fn user(role: UserRole) -> CurrentUser {
    CurrentUser {
        id: UserId::new(),
        email: format!("{role}@example.com"),
        role,
    }
}

fn router_with_limit(
    repo: &InMemoryPortalRepository,
    caller: Option<CurrentUser>,
    max_tickets: u32,
) -> Router {
    let limiter = RateLimitState::new(
        Arc::new(InMemoryRateLimitStore::new().with_cleanup(0.0, usize::MAX)),
        RateLimitConfig::new(max_tickets, 60),
    );
    let admin = portal_admin_router_generic(repo.clone());
    let client = portal_client_router_generic(repo.clone(), limiter);
    let (admin, client) = match caller {
        Some(caller) => (
            admin.layer(Extension(caller.clone())),
            client.layer(Extension(caller)),
        ),
        None => (admin, client),
    };
    Router::new()
        .nest("/api/admin", admin)
        .nest("/api/portal", client)
}

fn router(repo: &InMemoryPortalRepository, caller: Option<CurrentUser>) -> Router {
    router_with_limit(repo, caller, 10)
}

fn send(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

async fn create_project(app: &Router, client: UserId, name: &str) -> Value {
    let (status, project) = call(
        app,
        send(
            "POST",
            "/api/admin/projects",
            Some(json!({"clientId": client, "name": name, "budget": 12_000_000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{project}");
    project
}

fn ticket_body(subject: &str) -> Value {
    json!({"subject": subject, "message": "The contact form returns an error"})
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn test_admin_crud() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, Some(user(UserRole::Admin)));
        let project = create_project(&app, UserId::new(), "Company Profile").await;
        assert_eq!(project["status"], "pending");
        assert_eq!(project["progress"], 0);
        assert_eq!(project["budget"], 12_000_000);

        let uri = format!("/api/admin/projects/{}", project["id"].as_str().unwrap());
        let (status, updated) = call(
            &app,
            send(
                "PUT",
                &uri,
                Some(json!({"status": "in_progress", "progress": 40})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "in_progress");
        assert_eq!(updated["progress"], 40);
        assert_eq!(updated["name"], "Company Profile");

        let (status, _) = call(&app, send("DELETE", &uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = call(&app, send("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_progress_out_of_range_is_rejected() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, Some(user(UserRole::Admin)));
        let project = create_project(&app, UserId::new(), "Landing Page").await;
        let uri = format!("/api/admin/projects/{}", project["id"].as_str().unwrap());

        let (status, _) = call(&app, send("PUT", &uri, Some(json!({"progress": 101})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, send("PUT", &uri, Some(json!({"progress": -1})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(repo.projects().await[0].progress, 0);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, Some(user(UserRole::Admin)));
        let (status, _) = call(
            &app,
            send(
                "POST",
                "/api/admin/projects",
                Some(json!({"clientId": UserId::new(), "name": "Shop", "status": "done"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(repo.projects().await.is_empty());
    }

    #[tokio::test]
    async fn test_admin_listing_filters() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, Some(user(UserRole::Admin)));
        let alice = UserId::new();
        create_project(&app, alice, "Alpha Shop").await;
        create_project(&app, alice, "Beta Blog").await;
        create_project(&app, UserId::new(), "Gamma Site").await;

        let (_, page) = call(
            &app,
            send("GET", &format!("/api/admin/projects?clientId={alice}"), None),
        )
        .await;
        assert_eq!(page["pagination"]["total"], 2);

        let (_, page) = call(
            &app,
            send("GET", "/api/admin/projects?search=gamma&sortBy=name", None),
        )
        .await;
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["name"], "Gamma Site");

        let (status, _) =
            call(&app, send("GET", "/api/admin/projects?sortBy=budget", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_client_reads_only_own_projects() {
        let repo = InMemoryPortalRepository::new();
        let admin = router(&repo, Some(user(UserRole::Admin)));
        let client = user(UserRole::Client);
        let mine = create_project(&admin, client.id, "Mine").await;
        let theirs = create_project(&admin, UserId::new(), "Theirs").await;

        let app = router(&repo, Some(client));
        let (status, page) = call(&app, send("GET", "/api/portal/projects", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["id"], mine["id"]);

        let other = format!("/api/portal/projects/{}", theirs["id"].as_str().unwrap());
        let (status, _) = call(&app, send("GET", &other, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            send("DELETE", &format!("/api/admin/projects/{}", mine["id"].as_str().unwrap()), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(repo.projects().await.len(), 2);
    }
}

mod tickets {
    use super::*;

    #[tokio::test]
    async fn test_client_opens_and_lists_tickets() {
        let repo = InMemoryPortalRepository::new();
        let client = user(UserRole::Client);
        let app = router(&repo, Some(client.clone()));

        let (status, ticket) = call(
            &app,
            send(
                "POST",
                "/api/portal/tickets",
                Some(json!({
                    "subject": "Site is down",
                    "message": "Nothing loads since this morning",
                    "priority": "urgent",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket["status"], "open");
        assert_eq!(ticket["priority"], "urgent");
        assert_eq!(ticket["clientId"], json!(client.id));

        let (_, page) = call(&app, send("GET", "/api/portal/tickets", None)).await;
        assert_eq!(page["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn test_default_priority_is_medium() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, Some(user(UserRole::Client)));
        let (_, ticket) = call(
            &app,
            send("POST", "/api/portal/tickets", Some(ticket_body("Typo"))),
        )
        .await;
        assert_eq!(ticket["priority"], "medium");
    }

    #[tokio::test]
    async fn test_ticket_for_foreign_project_is_forbidden() {
        let repo = InMemoryPortalRepository::new();
        let admin = router(&repo, Some(user(UserRole::Admin)));
        let theirs = create_project(&admin, UserId::new(), "Theirs").await;

        let app = router(&repo, Some(user(UserRole::Client)));
        let mut body = ticket_body("Help");
        body["projectId"] = theirs["id"].clone();
        let (status, _) = call(&app, send("POST", "/api/portal/tickets", Some(body))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(repo.tickets().await.is_empty());
    }

    #[tokio::test]
    async fn test_ticket_creation_is_rate_limited() {
        let repo = InMemoryPortalRepository::new();
        let app = router_with_limit(&repo, Some(user(UserRole::Client)), 2);

        for n in 0..2 {
            let (status, _) = call(
                &app,
                send("POST", "/api/portal/tickets", Some(ticket_body(&format!("Issue {n}")))),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let res = app
            .clone()
            .oneshot(send("POST", "/api/portal/tickets", Some(ticket_body("Again"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(repo.tickets().await.len(), 2);

        // Reads are not limited
        let (status, _) = call(&app, send("GET", "/api/portal/tickets", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_triages_tickets() {
        let repo = InMemoryPortalRepository::new();
        let client = router(&repo, Some(user(UserRole::Client)));
        let other = router(&repo, Some(user(UserRole::Client)));
        let (_, ticket) = call(
            &client,
            send("POST", "/api/portal/tickets", Some(ticket_body("First"))),
        )
        .await;
        call(&other, send("POST", "/api/portal/tickets", Some(ticket_body("Second")))).await;

        let admin = router(&repo, Some(user(UserRole::Admin)));
        let (_, page) = call(&admin, send("GET", "/api/admin/tickets", None)).await;
        assert_eq!(page["pagination"]["total"], 2);

        let status_uri = format!("/api/admin/tickets/{}/status", ticket["id"].as_str().unwrap());
        let (status, updated) = call(
            &admin,
            send("PATCH", &status_uri, Some(json!({"status": "closed"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "closed");

        let (status, body) = call(
            &admin,
            send("PATCH", &status_uri, Some(json!({"status": "open"}))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["action"].is_string());

        let (_, page) = call(&admin, send("GET", "/api/admin/tickets?status=open", None)).await;
        assert_eq!(page["pagination"]["total"], 1);

        let closed: Vec<_> = repo
            .tickets()
            .await
            .into_iter()
            .filter(|t| t.status == TicketStatus::Closed)
            .collect();
        assert_eq!(closed.len(), 1);
    }

    #[tokio::test]
    async fn test_client_cannot_see_foreign_ticket() {
        let repo = InMemoryPortalRepository::new();
        let owner = router(&repo, Some(user(UserRole::Client)));
        let (_, ticket) = call(
            &owner,
            send("POST", "/api/portal/tickets", Some(ticket_body("Private"))),
        )
        .await;

        let stranger = router(&repo, Some(user(UserRole::Client)));
        let uri = format!("/api/portal/tickets/{}", ticket["id"].as_str().unwrap());
        let (status, _) = call(&stranger, send("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&owner, send("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_cannot_change_status() {
        let repo = InMemoryPortalRepository::new();
        let client = router(&repo, Some(user(UserRole::Client)));
        let (_, ticket) = call(
            &client,
            send("POST", "/api/portal/tickets", Some(ticket_body("Mine"))),
        )
        .await;
        let uri = format!("/api/admin/tickets/{}/status", ticket["id"].as_str().unwrap());
        let (status, _) = call(&client, send("PATCH", &uri, Some(json!({"status": "closed"})))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_requests_are_unauthorized() {
        let repo = InMemoryPortalRepository::new();
        let app = router(&repo, None);
        for (method, uri) in [
            ("GET", "/api/portal/projects"),
            ("GET", "/api/portal/tickets"),
            ("GET", "/api/admin/projects"),
        ] {
            let (status, _) = call(&app, send(method, uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
        let (status, _) = call(
            &app,
            send("POST", "/api/portal/tickets", Some(ticket_body("Anon"))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(repo.tickets().await.is_empty());
    }
}
