//! API integration tests against a running server

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos()
}

/// A fresh, checksum-valid ISBN-13
fn unique_isbn() -> String {
    let body = format!("979{:09}", unique() % 1_000_000_000);
    let sum: u32 = body
        .chars()
        .enumerate()
        .map(|(i, c)| c.to_digit(10).unwrap() * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    format!("{}{}", body, (10 - sum % 10) % 10)
}

async fn post(client: &Client, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Create an author, a publisher, a one-copy book and a patron; returns (isbn, patron_id)
async fn seed(client: &Client) -> (String, String) {
    let n = unique();
    let (status, author) = post(
        client,
        "/authors",
        json!({
            "author_first_name": format!("Ursula{}", n % 100_000),
            "author_initial_midname": "K.",
            "author_last_name": "Guin"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, publisher) = post(client, "/publishers", json!({ "publisher_name": format!("Ace {}", n) })).await;
    assert_eq!(status, StatusCode::CREATED);

    let isbn = unique_isbn();
    let (status, book) = post(
        client,
        "/books",
        json!({
            "isbn": isbn,
            "title": "The Dispossessed",
            "genre": "Science fiction",
            "author_id": author["id"],
            "publisher_id": publisher["id"],
            "published_year": 1974,
            "qty": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["isbn"], isbn);

    let patron_id = format!("1MS20CS{:03}", n % 1000);
    let (status, _) = post(
        client,
        "/patrons",
        json!({
            "patron_id": patron_id,
            "patron_first_name": "Shevek",
            "patron_last_name": "Anarres",
            "patron_email": format!("shevek{}@example.org", n % 1_000_000),
            "patron_phone": format!("9{:09}", n % 1_000_000_000)
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (isbn, patron_id)
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
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_cycle() {
    let client = Client::new();
    let (isbn, patron_id) = seed(&client).await;

    let copies: Value = client
        .get(format!("{}/copies/available", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let copy_id = copies
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["isbn"] == isbn)
        .expect("New copy is available")["id"]
        .clone();

    let (status, borrow) = post(
        &client,
        "/borrows",
        json!({ "patron_id": patron_id, "copy_id": copy_id, "borrow_date": "2025-03-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(borrow["due_date"], "2025-03-16");
    assert!(borrow["return_date"].is_null());

    let patron: Value = client
        .get(format!("{}/patrons/{}", BASE_URL, patron_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(patron["status"], "AC");

    // Copy is out
    let (status, body) = post(
        &client,
        "/borrows",
        json!({ "patron_id": patron_id, "copy_id": copy_id, "borrow_date": "2025-03-02" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateBorrow");

    let (status, outcome) = post(
        &client,
        &format!("/borrows/{}/return", borrow["id"]),
        json!({ "return_date": "2025-03-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["patron_status"], "IN");
    assert_eq!(outcome["borrow"]["return_date"], "2025-03-10");

    let (status, _) = post(
        &client,
        &format!("/borrows/{}/return", borrow["id"]),
        json!({ "return_date": "2025-03-11" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_is_conflict() {
    let client = Client::new();
    let (isbn, _) = seed(&client).await;

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let (status, body) = post(
        &client,
        "/books",
        json!({
            "isbn": isbn,
            "title": "The Dispossessed",
            "genre": "Science fiction",
            "author_id": book["author_id"],
            "publisher_id": book["publisher_id"],
            "published_year": 1974,
            "qty": 2
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateEntry");
}

#[tokio::test]
#[ignore]
async fn test_isbn10_lookup_is_normalized() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/0306406151", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid ISBN-10");
}
