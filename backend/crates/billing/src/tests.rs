//! Router-level tests for the billing crate

use auth::{CurrentUser, UserRole};
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use axum::{Extension, Router};
use kernel::id::UserId;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::domain::value_object::invoice_status::InvoiceStatus;
use crate::infra::memory::InMemoryBillingRepository;
use crate::presentation::router::{
    billing_admin_router_generic, billing_portal_router_generic, billing_public_router_generic,
};

fn user(role: UserRole) -> CurrentUser {
    CurrentUser {
        id: UserId::new(),
        email: format!("{role}@example.com"),
        role,
    }
}

fn router(repo: &InMemoryBillingRepository, caller: Option<CurrentUser>) -> Router {
    let admin = billing_admin_router_generic(repo.clone());
    let portal = billing_portal_router_generic(repo.clone());
    let (admin, portal) = match caller {
        Some(caller) => (
            admin.layer(Extension(caller.clone())),
            portal.layer(Extension(caller)),
        ),
        None => (admin, portal),
    };
    Router::new()
        .nest("/api", billing_public_router_generic(repo.clone()))
        .nest("/api/admin", admin)
        .nest("/api/portal", portal)
}

fn admin_app(repo: &InMemoryBillingRepository) -> Router {
    router(repo, Some(user(UserRole::Admin)))
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

async fn create_invoice(app: &Router, client: UserId, amount: i64) -> Value {
    let (status, invoice) = call(
        app,
        send(
            "POST",
            "/api/admin/invoices",
            Some(json!({
                "clientId": client,
                "description": "Company profile website",
                "amount": amount,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{invoice}");
    invoice
}

async fn set_status(app: &Router, id: &Value, status: &str) -> (StatusCode, Value) {
    call(
        app,
        send(
            "PATCH",
            &format!("/api/admin/invoices/{}/status", id.as_str().unwrap()),
            Some(json!({ "status": status })),
        ),
    )
    .await
}

mod plans {
    use super::*;

    async fn create_plan(app: &Router, body: Value) -> (StatusCode, Value) {
        call(app, send("POST", "/api/admin/pricing-plans", Some(body))).await
    }

    #[tokio::test]
    async fn test_public_catalog_is_active_and_ordered() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);

        for (name, order, active) in [
            ("Enterprise", 3, true),
            ("Starter", 1, true),
            ("Legacy", 0, false),
            ("Business", 2, true),
        ] {
            let (status, _) = create_plan(
                &app,
                json!({
                    "name": name,
                    "price": 1_500_000,
                    "billingPeriod": "monthly",
                    "features": ["Hosting", "SSL"],
                    "sortOrder": order,
                    "isActive": active,
                }),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let anonymous = router(&repo, None);
        let (status, plans) = call(&anonymous, send("GET", "/api/pricing/plans", None)).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = plans
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Starter", "Business", "Enterprise"]);
        assert_eq!(plans[0]["slug"], "starter");
        assert_eq!(plans[0]["billingPeriod"], "monthly");
        assert_eq!(plans[0]["features"], json!(["Hosting", "SSL"]));
    }

    #[tokio::test]
    async fn test_admin_listing_includes_inactive() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        create_plan(&app, json!({"name": "Hidden", "price": 0, "isActive": false})).await;

        let (status, page) = call(&app, send("GET", "/api/admin/pricing-plans", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["isActive"], false);
        assert_eq!(page["data"][0]["billingPeriod"], "one_time");
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let (status, body) = create_plan(&app, json!({"name": "Broken", "price": -1})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_billing_period_is_rejected() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let (status, _) = create_plan(
            &app,
            json!({"name": "Weekly", "price": 10, "billingPeriod": "weekly"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let (status, _) = create_plan(&app, json!({"name": "Starter", "price": 10})).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = create_plan(&app, json!({"name": "Starter", "price": 20})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let (_, plan) = create_plan(&app, json!({"name": "Starter", "price": 10})).await;
        let uri = format!("/api/admin/pricing-plans/{}", plan["id"].as_str().unwrap());

        let (status, updated) = call(
            &app,
            send("PUT", &uri, Some(json!({"price": 25, "isPopular": true}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], 25);
        assert_eq!(updated["isPopular"], true);
        assert_eq!(updated["name"], "Starter");

        let (status, _) = call(&app, send("DELETE", &uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, send("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod invoices {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_number_and_defaults() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let invoice = create_invoice(&app, UserId::new(), 2_500_000).await;

        let number = invoice["number"].as_str().unwrap();
        assert!(number.starts_with("INV-"), "{number}");
        assert_eq!(number.len(), "INV-202405-ABCDEF".len());
        assert_eq!(invoice["status"], "draft");
        assert_eq!(invoice["currency"], "IDR");
        assert!(invoice["paidAt"].is_null());
        assert!(invoice["issuedAt"].is_string());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let (status, _) = call(
            &app,
            send(
                "POST",
                "/api/admin/invoices",
                Some(json!({"clientId": UserId::new(), "description": "x", "amount": 0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(repo.invoices().await.is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_sets_paid_at() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let invoice = create_invoice(&app, UserId::new(), 100).await;

        let (status, body) = set_status(&app, &invoice["id"], "paid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["action"].as_str().unwrap().contains("sent"));

        let (status, sent) = set_status(&app, &invoice["id"], "sent").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent["status"], "sent");
        assert!(sent["paidAt"].is_null());

        let (status, paid) = set_status(&app, &invoice["id"], "paid").await;
        assert_eq!(status, StatusCode::OK);
        assert!(paid["paidAt"].is_string());

        let (status, _) = set_status(&app, &invoice["id"], "cancelled").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stored = repo.invoices().await;
        assert_eq!(stored[0].status, InvoiceStatus::Paid);
        assert!(stored[0].paid_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let invoice = create_invoice(&app, UserId::new(), 100).await;
        let (status, _) = set_status(&app, &invoice["id"], "refunded").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_only_drafts_can_be_deleted() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let draft = create_invoice(&app, UserId::new(), 100).await;
        let sent = create_invoice(&app, UserId::new(), 200).await;
        set_status(&app, &sent["id"], "sent").await;

        let uri = |v: &Value| format!("/api/admin/invoices/{}", v["id"].as_str().unwrap());

        let (status, _) = call(&app, send("DELETE", &uri(&sent), None)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, send("DELETE", &uri(&draft), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(repo.invoices().await.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_filters_by_client_and_status() {
        let repo = InMemoryBillingRepository::new();
        let app = admin_app(&repo);
        let alice = UserId::new();
        let bob = UserId::new();
        let first = create_invoice(&app, alice, 100).await;
        create_invoice(&app, alice, 200).await;
        create_invoice(&app, bob, 300).await;
        set_status(&app, &first["id"], "sent").await;

        let (_, page) = call(
            &app,
            send("GET", &format!("/api/admin/invoices?clientId={alice}"), None),
        )
        .await;
        assert_eq!(page["pagination"]["total"], 2);

        let (_, page) = call(
            &app,
            send(
                "GET",
                &format!("/api/admin/invoices?clientId={alice}&status=sent"),
                None,
            ),
        )
        .await;
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["amount"], 100);

        let (status, _) =
            call(&app, send("GET", "/api/admin/invoices?clientId=nope", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod portal {
    use super::*;

    #[tokio::test]
    async fn test_client_sees_only_own_invoices() {
        let repo = InMemoryBillingRepository::new();
        let admin = admin_app(&repo);
        let client = user(UserRole::Client);
        let mine = create_invoice(&admin, client.id, 100).await;
        let theirs = create_invoice(&admin, UserId::new(), 200).await;

        let app = router(&repo, Some(client));

        let (status, page) = call(&app, send("GET", "/api/portal/invoices", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["id"], mine["id"]);

        let own = format!("/api/portal/invoices/{}", mine["id"].as_str().unwrap());
        let (status, _) = call(&app, send("GET", &own, None)).await;
        assert_eq!(status, StatusCode::OK);

        let other = format!("/api/portal/invoices/{}", theirs["id"].as_str().unwrap());
        let (status, body) = call(&app, send("GET", &other, None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_portal_requires_login() {
        let repo = InMemoryBillingRepository::new();
        let app = router(&repo, None);
        let (status, _) = call(&app, send("GET", "/api/portal/invoices", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn test_client_cannot_manage_billing() {
        let repo = InMemoryBillingRepository::new();
        let app = router(&repo, Some(user(UserRole::Client)));

        let (status, _) = call(
            &app,
            send(
                "POST",
                "/api/admin/pricing-plans",
                Some(json!({"name": "Free", "price": 0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, send("GET", "/api/admin/invoices", None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(repo.invoices().await.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_admin_request_is_unauthorized() {
        let repo = InMemoryBillingRepository::new();
        let app = router(&repo, None);
        let (status, _) = call(&app, send("GET", "/api/admin/pricing-plans", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
