use axum::body::Body;
use axum::http::{Request, StatusCode};
use circulation_desk::api::types::ErrorResponse;
use circulation_desk::api::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

/// テスト用のアプリケーションセットアップ
///
/// インメモリのスナップショットストアと固定時計（2024-03-01）で
/// 実際のAPIルーターを組み立てます。
async fn setup_app() -> (axum::Router, common::TestContext) {
    let ctx = common::setup().await;
    let app_state = Arc::new(AppState {
        service_deps: ctx.deps.clone(),
    });
    (create_router(app_state), ctx)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn book_body(title: &str, quantity: i64) -> Value {
    json!({
        "title": title,
        "author": "Jane Austen",
        "isbn": "9780141439518",
        "category": "Romance",
        "year": 1813,
        "quantity": quantity,
    })
}

fn member_body(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "555-0102",
    })
}

// ============================================================================
// 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _ctx) = setup_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_circulation_flow() {
    let (app, _ctx) = setup_app().await;

    // Step 1: 書籍登録（POST /books）
    let (status, book) = send(&app, "POST", "/books", Some(book_body("Pride and Prejudice", 2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available"], 2);
    let book_id = book["id"].as_u64().unwrap();

    // Step 2: 会員登録（POST /members）
    let (status, member) = send(
        &app,
        "POST",
        "/members",
        Some(member_body("Bob Johnson", "bob@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["memberId"], "MEM001");
    assert_eq!(member["joinDate"], "2024-03-01");
    let member_id = member["id"].as_u64().unwrap();

    // Step 3: 貸出（POST /loans）
    let (status, loan) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": book_id, "memberId": member_id, "dueDate": "2024-03-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "active");
    assert_eq!(loan["issueDate"], "2024-03-01");
    assert_eq!(loan["dueDate"], "2024-03-10");
    assert_eq!(loan["bookTitle"], "Pride and Prejudice");
    assert_eq!(loan["memberCode"], "MEM001");
    let loan_id = loan["id"].as_u64().unwrap();

    let (_, book) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
    assert_eq!(book["available"], 1);

    // Step 4: 貸出詳細（GET /loans/:id）
    let (status, loan) = send(&app, "GET", &format!("/loans/{}", loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(loan["returnDate"].is_null());

    // Step 5: 返却（POST /loans/:id/return）
    let (status, loan) = send(&app, "POST", &format!("/loans/{}/return", loan_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loan["status"], "returned");
    assert_eq!(loan["returnDate"], "2024-03-01");

    // Step 6: 二重返却は422
    let (status, error) = send(&app, "POST", &format!("/loans/{}/return", loan_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "ALREADY_RETURNED");

    // Step 7: 集計（GET /stats）
    let (status, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalBooks"], 2);
    assert_eq!(stats["availableBooks"], 2);
    assert_eq!(stats["issuedCount"], 0);
    assert_eq!(stats["availabilityRate"], 100);
    assert_eq!(stats["totalMembers"], 1);
    assert_eq!(stats["categoryHistogram"][0]["category"], "Romance");
}

#[tokio::test]
async fn test_list_endpoints_apply_filters() {
    let (app, _ctx) = setup_app().await;
    send(&app, "POST", "/books", Some(book_body("Emma", 1))).await;
    let mut other = book_body("Dune", 1);
    other["author"] = json!("Frank Herbert");
    other["category"] = json!("Science Fiction");
    send(&app, "POST", "/books", Some(other)).await;

    let (status, books) = send(&app, "GET", "/books?search=herbert", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["title"], "Dune");

    let (_, books) = send(&app, "GET", "/books?category=Romance", None).await;
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["title"], "Emma");

    let (status, categories) = send(&app, "GET", "/books/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories, json!(["Romance", "Science Fiction"]));

    send(&app, "POST", "/members", Some(member_body("Ann Lee", "ann@example.com"))).await;
    send(&app, "POST", "/members", Some(member_body("Ben Fox", "ben@example.com"))).await;
    let (_, members) = send(&app, "GET", "/members?search=mem002", None).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["name"], "Ben Fox");
}

#[tokio::test]
async fn test_loans_default_due_date_and_status_filter() {
    let (app, ctx) = setup_app().await;
    let (_, book) = send(&app, "POST", "/books", Some(book_body("Emma", 2))).await;
    let (_, member) = send(&app, "POST", "/members", Some(member_body("Ann", "ann@example.com"))).await;

    let (status, loan) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": book["id"], "memberId": member["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["dueDate"], "2024-03-15");

    ctx.clock.advance_days(15);

    let (status, loans) = send(&app, "GET", "/loans?status=overdue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["status"], "overdue");

    let (_, loans) = send(&app, "GET", "/loans?status=active", None).await;
    assert!(loans.as_array().unwrap().is_empty());

    let (status, error) = send(&app, "GET", "/loans?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

// ============================================================================
// 異常系
// ============================================================================

#[tokio::test]
async fn test_validation_errors_return_400() {
    let (app, _ctx) = setup_app().await;

    let (status, error) = send(
        &app,
        "POST",
        "/members",
        Some(member_body("Ann", "not-an-email")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(error).unwrap();
    assert_eq!(error.error, "VALIDATION_ERROR");

    let (status, _) = send(&app, "POST", "/books", Some(json!({ "title": "Untitled" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/books", Some(book_body("Emma", 0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": 1, "memberId": 2, "dueDate": "next week" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrongly_typed_input_returns_400() {
    let (app, _ctx) = setup_app().await;

    let mut body = book_body("Emma", 1);
    body["year"] = json!("1815");
    let (status, error) = send(&app, "POST", "/books", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(error).unwrap();
    assert_eq!(error.error, "VALIDATION_ERROR");

    let mut body = book_body("Emma", 1);
    body["quantity"] = json!(1.5);
    let (status, error) = send(&app, "POST", "/books", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");

    let (status, error) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": "7", "memberId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");

    // 数値でないID・クエリも同じ形式
    let (status, error) = send(&app, "GET", "/books/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");

    let (status, error) = send(&app, "GET", "/loans?bookId=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_loans_filter_by_book_and_member() {
    let (app, _ctx) = setup_app().await;
    let (_, emma) = send(&app, "POST", "/books", Some(book_body("Emma", 1))).await;
    let (_, dune) = send(&app, "POST", "/books", Some(book_body("Dune", 1))).await;
    let (_, ann) = send(&app, "POST", "/members", Some(member_body("Ann", "ann@example.com"))).await;
    let (_, ben) = send(&app, "POST", "/members", Some(member_body("Ben", "ben@example.com"))).await;
    for (book, member) in [(&emma, &ann), (&dune, &ben)] {
        send(
            &app,
            "POST",
            "/loans",
            Some(json!({ "bookId": book["id"], "memberId": member["id"] })),
        )
        .await;
    }

    let (status, loans) = send(&app, "GET", &format!("/loans?bookId={}", dune["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["memberName"], "Ben");

    let (_, loans) = send(&app, "GET", &format!("/loans?memberId={}", ann["id"]), None).await;
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["bookTitle"], "Emma");
}

#[tokio::test]
async fn test_missing_records_return_404() {
    let (app, _ctx) = setup_app().await;

    let (status, error) = send(&app, "GET", "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "BOOK_NOT_FOUND");

    let (status, _) = send(&app, "DELETE", "/members/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, error) = send(&app, "POST", "/loans/999/return", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "LOAN_NOT_FOUND");

    let (status, error) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": 999, "memberId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "BOOK_NOT_FOUND");
}

#[tokio::test]
async fn test_unavailable_book_returns_422() {
    let (app, _ctx) = setup_app().await;
    let (_, book) = send(&app, "POST", "/books", Some(book_body("Emma", 1))).await;
    let (_, ann) = send(&app, "POST", "/members", Some(member_body("Ann", "ann@example.com"))).await;
    let (_, ben) = send(&app, "POST", "/members", Some(member_body("Ben", "ben@example.com"))).await;

    let (status, _) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": book["id"], "memberId": ann["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": book["id"], "memberId": ben["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "BOOK_UNAVAILABLE");
}

#[tokio::test]
async fn test_integrity_violations_return_409() {
    let (app, _ctx) = setup_app().await;
    let (_, book) = send(&app, "POST", "/books", Some(book_body("Emma", 2))).await;
    let (_, ann) = send(&app, "POST", "/members", Some(member_body("Ann", "ann@example.com"))).await;
    let mut loan_ids = Vec::new();
    for _ in 0..2 {
        let (_, loan) = send(
            &app,
            "POST",
            "/loans",
            Some(json!({ "bookId": book["id"], "memberId": ann["id"] })),
        )
        .await;
        loan_ids.push(loan["id"].clone());
    }

    let book_uri = format!("/books/{}", book["id"]);
    let (status, error) = send(&app, "DELETE", &book_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "INTEGRITY_ERROR");

    // 冊数を貸出中の数より減らすのも409
    let (status, error) = send(&app, "PUT", &book_uri, Some(book_body("Emma", 1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "INTEGRITY_ERROR");

    for loan_id in &loan_ids {
        let (status, _) = send(&app, "POST", &format!("/loans/{}/return", loan_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(&app, "DELETE", &book_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &book_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flush_reports_store_failure() {
    let (app, ctx) = setup_app().await;

    let (status, _) = send(&app, "POST", "/snapshot", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.store.save_count(), 1);

    ctx.store.set_failing(true);
    let (status, error) = send(&app, "POST", "/snapshot", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], "SNAPSHOT_STORE_ERROR");
}

#[tokio::test]
async fn test_clear_all_data() {
    let (app, ctx) = setup_app().await;
    let (_, book) = send(&app, "POST", "/books", Some(book_body("Emma", 1))).await;
    let (_, ann) = send(&app, "POST", "/members", Some(member_body("Ann", "ann@example.com"))).await;
    send(
        &app,
        "POST",
        "/loans",
        Some(json!({ "bookId": book["id"], "memberId": ann["id"] })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/snapshot", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, books) = send(&app, "GET", "/books", None).await;
    assert!(books.as_array().unwrap().is_empty());
    let (_, loans) = send(&app, "GET", "/loans", None).await;
    assert!(loans.as_array().unwrap().is_empty());
    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["totalBooks"], 0);
    assert_eq!(stats["totalMembers"], 0);

    let saved = ctx.store.last_saved().unwrap();
    assert!(saved.books.is_empty() && saved.members.is_empty() && saved.loans.is_empty());
}
