//! HTTP read API.
//!
//! - `GET /v1/user/{mobileNumber}/messages`
//! - `GET /v1/users/{status}/filter`
//!
//! Errors are plain-text bodies with the matching status code.

use crate::query::QueryService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sms_types::{is_valid_mobile_number, SmsRecord, UserStatus, UserStatusRecord};
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single store query.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SMS record as returned to API clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsRecordView {
    pub id: String,
    pub mobile_number: String,
    pub message: String,
    pub status: String,
}

impl From<SmsRecord> for SmsRecordView {
    fn from(record: SmsRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            mobile_number: record.mobile_number,
            message: record.message,
            status: record.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusView {
    pub mobile_number: String,
    pub status: UserStatus,
}

impl From<UserStatusRecord> for UserStatusView {
    fn from(record: UserStatusRecord) -> Self {
        Self {
            mobile_number: record.mobile_number,
            status: record.status,
        }
    }
}

/// Build the read API over `query`.
pub fn router(query: QueryService) -> Router {
    Router::new()
        .route("/v1/user/:mobile_number/messages", get(messages_by_mobile))
        .route("/v1/users/:status/filter", get(users_by_status))
        .with_state(query)
}

async fn messages_by_mobile(
    State(query): State<QueryService>,
    Path(mobile_number): Path<String>,
) -> Response {
    if !is_valid_mobile_number(&mobile_number) {
        return (
            StatusCode::BAD_REQUEST,
            "invalid mobile number: must be exactly 10 digits",
        )
            .into_response();
    }

    match bounded(query.get_by_mobile_number(&mobile_number)).await {
        Ok(records) => {
            let views: Vec<SmsRecordView> = records.into_iter().map(Into::into).collect();
            Json(views).into_response()
        }
        Err(response) => response,
    }
}

async fn users_by_status(
    State(query): State<QueryService>,
    Path(status): Path<String>,
) -> Response {
    let Ok(status) = UserStatus::parse(&status) else {
        return (
            StatusCode::BAD_REQUEST,
            "invalid status: must be either blocked or unblocked",
        )
            .into_response();
    };

    match bounded(query.get_by_status(status)).await {
        Ok(records) => {
            let views: Vec<UserStatusView> = records.into_iter().map(Into::into).collect();
            Json(views).into_response()
        }
        Err(response) => response,
    }
}

/// Run a store query under [`REQUEST_TIMEOUT`], mapping failures to a 500.
async fn bounded<T>(
    query: impl Future<Output = sms_store_mongodb::Result<T>>,
) -> Result<T, Response> {
    match tokio::time::timeout(REQUEST_TIMEOUT, query).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!("Store query failed: {e}");
            Err(internal_error())
        }
        Err(_) => {
            tracing::error!("Store query timed out after {REQUEST_TIMEOUT:?}");
            Err(internal_error())
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}
