//! Read API tests against an in-memory store.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sms_store::{http, QueryService};
use sms_store_mongodb::{
    Bson, Document, DocumentStore, MemoryStore, SmsRepository, UserRepository,
};
use sms_types::{SmsRecord, UserStatus};
use std::sync::Arc;
use tower::ServiceExt;

/// Store whose every operation fails.
struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn insert(&self, _collection: &str, _document: Document) -> sms_store_mongodb::Result<Bson> {
        Err(sms_store_mongodb::Error::Unavailable("down".to_string()))
    }

    async fn find_many(
        &self,
        _collection: &str,
        _filter: Document,
    ) -> sms_store_mongodb::Result<Vec<Document>> {
        Err(sms_store_mongodb::Error::Unavailable("down".to_string()))
    }

    async fn upsert_one(
        &self,
        _collection: &str,
        _filter: Document,
        _fields: Document,
    ) -> sms_store_mongodb::Result<()> {
        Err(sms_store_mongodb::Error::Unavailable("down".to_string()))
    }
}

async fn seeded_router() -> Router {
    let store = Arc::new(MemoryStore::new());

    let sms = SmsRepository::new(store.clone());
    for message in ["first", "second"] {
        sms.insert(&SmsRecord {
            id: None,
            mobile_number: "9876543210".to_string(),
            message: message.to_string(),
            status: "SUCCESS".to_string(),
        })
        .await
        .unwrap();
    }

    let users = UserRepository::new(store.clone());
    users
        .update_status("9876543210", UserStatus::Blocked)
        .await
        .unwrap();
    users
        .update_status("1234567890", UserStatus::Unblocked)
        .await
        .unwrap();

    http::router(QueryService::new(store))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_messages_by_mobile_number() {
    let (status, body) = get(seeded_router().await, "/v1/user/9876543210/messages").await;
    assert_eq!(status, StatusCode::OK);

    let records: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["mobileNumber"], "9876543210");
    assert_eq!(records[0]["message"], "first");
    assert_eq!(records[0]["status"], "SUCCESS");
    assert_eq!(records[1]["message"], "second");
    assert_eq!(records[0]["id"].as_str().unwrap().len(), 24);
}

#[tokio::test]
async fn test_unknown_mobile_number_is_empty_list() {
    let (status, body) = get(seeded_router().await, "/v1/user/5555555555/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn test_invalid_mobile_number_is_rejected() {
    for mobile in ["98765", "98765432101", "98765abcde"] {
        let (status, body) =
            get(seeded_router().await, &format!("/v1/user/{mobile}/messages")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{mobile}");
        assert_eq!(body, b"invalid mobile number: must be exactly 10 digits");
    }
}

#[tokio::test]
async fn test_status_filter_is_case_insensitive() {
    for status_path in ["blocked", "BLOCKED", "Blocked"] {
        let (status, body) =
            get(seeded_router().await, &format!("/v1/users/{status_path}/filter")).await;
        assert_eq!(status, StatusCode::OK, "{status_path}");
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!([{ "mobileNumber": "9876543210", "status": "BLOCKED" }])
        );
    }

    let (_, body) = get(seeded_router().await, "/v1/users/unblocked/filter").await;
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!([{ "mobileNumber": "1234567890", "status": "UNBLOCKED" }])
    );
}

#[tokio::test]
async fn test_invalid_status_is_rejected() {
    let (status, body) = get(seeded_router().await, "/v1/users/suspended/filter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"invalid status: must be either blocked or unblocked");
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let router = http::router(QueryService::new(Arc::new(UnavailableStore)));

    let (status, body) = get(router.clone(), "/v1/user/9876543210/messages").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"internal server error");

    let (status, _) = get(router, "/v1/users/blocked/filter").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let (status, _) = get(seeded_router().await, "/v1/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = seeded_router()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/users/blocked/filter")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
