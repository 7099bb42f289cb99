//! API integration tests
//!
//! These run against a live server with a fresh database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to sign up (idempotent) and log in the test librarian
async fn get_auth_token(client: &Client) -> String {
    let _ = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "Test Librarian",
            "email": "librarian@example.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "librarian@example.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

/// Helper to create a book, returning its id
async fn create_book(client: &Client, token: &str, title: &str) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "description": "A test book with a sufficiently long description",
            "language": "English"
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_str().expect("No book ID").to_string()
}

/// Helper to create a reader, returning its id
async fn create_reader(client: &Client, token: &str, name: &str, email: &str) -> String {
    let response = client
        .post(format!("{}/readers", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "email": email
        }))
        .send()
        .await
        .expect("Failed to send create reader request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse reader response");
    body["id"].as_str().expect("No reader ID").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let _ = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "librarian@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "librarian@example.com");
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Delete Me").await;

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book has been deleted");
}

#[tokio::test]
#[ignore]
async fn test_lend_and_conflict_on_second_lend() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Lending Conflict Book").await;
    let reader_id = create_reader(
        &client,
        &token,
        "Conflict Reader",
        "conflict.reader@example.com",
    )
    .await;

    // First lend succeeds
    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let lending_id = body["lending"]["lending_id"]
        .as_str()
        .expect("No lending ID")
        .to_string();
    assert!(lending_id.starts_with("LENDB"));

    // Default policy: due two weeks after borrowing
    let borrowed_at: chrono::DateTime<chrono::Utc> =
        body["lending"]["borrowed_at"].as_str().unwrap().parse().unwrap();
    let due_at: chrono::DateTime<chrono::Utc> =
        body["lending"]["due_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(due_at - borrowed_at, chrono::Duration::days(14));

    // Second lend of the same book conflicts
    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Cleanup: return the book
    let response = client
        .post(format!("{}/lendings/{}/return", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_lends_only_one_wins() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Contended Book").await;
    let reader_a = create_reader(&client, &token, "Racer A", "racer.a@example.com").await;
    let reader_b = create_reader(&client, &token, "Racer B", "racer.b@example.com").await;

    let lend = |reader_id: String| {
        let client = client.clone();
        let token = token.clone();
        let book_id = book_id.clone();
        async move {
            client
                .post(format!("{}/lendings", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
                .send()
                .await
                .expect("Failed to send request")
                .status()
                .as_u16()
        }
    };

    let (first, second) = tokio::join!(lend(reader_a), lend(reader_b));

    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [201, 409]);
}

#[tokio::test]
#[ignore]
async fn test_return_twice_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Returnable Book").await;
    let reader_id =
        create_reader(&client, &token, "Returning Reader", "returner@example.com").await;

    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let lending_id = body["lending"]["lending_id"].as_str().unwrap().to_string();

    // First return succeeds
    let response = client
        .post(format!("{}/lendings/{}/return", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lending"]["returned"], true);

    // Second return conflicts
    let response = client
        .post(format!("{}/lendings/{}/return", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_return_rejects_malformed_id() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/lendings/not-a-lending-id/return", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_lending_history_filters_by_reader() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "History Book").await;
    let reader_id =
        create_reader(&client, &token, "History Reader", "historian@example.com").await;

    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/lendings/history?reader_id={}", BASE_URL, reader_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let records = body.as_array().expect("Expected an array");
    assert!(!records.is_empty());
    for record in records {
        assert_eq!(record["reader_id"].as_str().unwrap(), reader_id);
        assert_eq!(record["reader"]["name"], "History Reader");
    }

    // Malformed filter is rejected
    let response = client
        .get(format!("{}/lendings/history?reader_id=not-a-uuid", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_overdue_lending_appears_in_overdue_list() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Nearly Overdue Book").await;
    let reader_id = create_reader(&client, &token, "Tardy Reader", "tardy@example.com").await;

    // Lend with a due date one second in the future, then wait it out
    let due_at = (chrono::Utc::now() + chrono::Duration::seconds(1)).to_rfc3339();
    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id, "due_at": due_at }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let lending_id = body["lending"]["lending_id"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let response = client
        .get(format!("{}/lendings/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let overdue = body.as_array().expect("Expected an array");
    assert!(overdue
        .iter()
        .any(|record| record["lending_id"] == lending_id.as_str()));

    // A returned record drops out of the overdue list
    let response = client
        .post(format!("{}/lendings/{}/return", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/lendings/overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let overdue = body.as_array().expect("Expected an array");
    assert!(!overdue
        .iter()
        .any(|record| record["lending_id"] == lending_id.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_notify_overdue_reports_a_digest() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/lendings/notify-overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["status"] == "sent" || body["status"] == "nothing-to-notify");
    assert!(body["processed_count"].is_number());
    assert!(body["outcomes"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_delete_lending() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Disposable Lending Book").await;
    let reader_id =
        create_reader(&client, &token, "Disposable Reader", "disposable@example.com").await;

    let response = client
        .post(format!("{}/lendings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "reader_id": reader_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let lending_id = body["lending"]["lending_id"].as_str().unwrap().to_string();

    let response = client
        .delete(format!("{}/lendings/{}", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Deleting again reports not found
    let response = client
        .delete(format!("{}/lendings/{}", BASE_URL, lending_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    assert!(body["total_readers"].is_number());
    assert!(body["active_lendings"].is_number());
    assert!(body["overdue_lendings"].is_number());
}
