//! Bill routes
//!
//! CRUD, payment, summary, and free-text parsing. Every query runs
//! against the authenticated user's rows only, so a foreign bill id
//! reads as 404 rather than 403.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::bill::{Bill, BillSummary, Frequency};
use crate::domain::validate::{BillPayload, BillUpdatePayload, FreeTextPayload};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::BillStore;

use super::middleware::CurrentUser;

// ============================================================================
// Response DTOs
// ============================================================================

/// Wire shape of a bill. `is_overdue` is derived at read time so the
/// stored row never goes stale overnight.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub frequency: Frequency,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillResponse {
    fn new(bill: &Bill, today: NaiveDate) -> Self {
        Self {
            id: bill.id,
            name: bill.name.clone(),
            amount: bill.amount,
            due_date: bill.due_date,
            frequency: bill.frequency,
            category: bill.category.clone(),
            notes: bill.notes.clone(),
            is_paid: bill.is_paid,
            paid_date: bill.paid_date,
            is_overdue: bill.is_overdue(today),
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BillListResponse {
    pub bills: Vec<BillResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BillDetailResponse {
    pub bill: BillResponse,
}

#[derive(Debug, Serialize)]
pub struct BillEnvelope {
    pub message: &'static str,
    pub bill: BillResponse,
}

#[derive(Debug, Serialize)]
pub struct ParsedBillResponse {
    pub message: &'static str,
    pub bill: BillResponse,
    pub parsed_from: String,
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bills", get(list_bills).post(create_bill))
        .route("/bills/summary", get(summary))
        .route("/bills/parse", post(parse_bill))
        .route(
            "/bills/:bill_id",
            get(get_bill).put(update_bill).delete(delete_bill),
        )
        .route("/bills/:bill_id/pay", post(pay_bill))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/bills
async fn list_bills(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<BillListResponse>> {
    let store = BillStore::new(state.pool.clone());
    let bills = store.list_for_user(current.user.id).await?;

    let today = Utc::now().date_naive();
    let bills: Vec<BillResponse> = bills
        .iter()
        .map(|bill| BillResponse::new(bill, today))
        .collect();

    Ok(Json(BillListResponse {
        count: bills.len(),
        bills,
    }))
}

/// POST /api/bills
async fn create_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<BillPayload>,
) -> AppResult<(StatusCode, Json<BillEnvelope>)> {
    let new_bill = payload.validate()?;

    let store = BillStore::new(state.pool.clone());
    let bill = store.insert(current.user.id, new_bill).await?;
    tracing::info!(user_id = %current.user.id, bill_id = %bill.id, "bill created");

    Ok((
        StatusCode::CREATED,
        Json(BillEnvelope {
            message: "Bill created",
            bill: BillResponse::new(&bill, Utc::now().date_naive()),
        }),
    ))
}

/// GET /api/bills/:bill_id
async fn get_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bill_id): Path<Uuid>,
) -> AppResult<Json<BillDetailResponse>> {
    let store = BillStore::new(state.pool.clone());
    let bill = store
        .find(bill_id, current.user.id)
        .await?
        .ok_or(AppError::NotFound("Bill"))?;

    Ok(Json(BillDetailResponse {
        bill: BillResponse::new(&bill, Utc::now().date_naive()),
    }))
}

/// PUT /api/bills/:bill_id
///
/// Partial update; only the fields present in the body change. An empty
/// body is accepted and just bumps `updated_at`.
async fn update_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<BillUpdatePayload>,
) -> AppResult<Json<BillEnvelope>> {
    let changes = payload.validate()?;

    let store = BillStore::new(state.pool.clone());
    let bill = store
        .update(bill_id, current.user.id, changes)
        .await?
        .ok_or(AppError::NotFound("Bill"))?;

    Ok(Json(BillEnvelope {
        message: "Bill updated",
        bill: BillResponse::new(&bill, Utc::now().date_naive()),
    }))
}

/// DELETE /api/bills/:bill_id
async fn delete_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bill_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let store = BillStore::new(state.pool.clone());
    let deleted = store.delete(bill_id, current.user.id).await?;
    if !deleted {
        return Err(AppError::NotFound("Bill"));
    }

    tracing::info!(user_id = %current.user.id, %bill_id, "bill deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/bills/:bill_id/pay
///
/// Marking an already-paid bill refreshes `paid_date` to today.
async fn pay_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bill_id): Path<Uuid>,
) -> AppResult<Json<BillEnvelope>> {
    let today = Utc::now().date_naive();

    let store = BillStore::new(state.pool.clone());
    let bill = store
        .mark_paid(bill_id, current.user.id, today)
        .await?
        .ok_or(AppError::NotFound("Bill"))?;

    Ok(Json(BillEnvelope {
        message: "Bill marked as paid",
        bill: BillResponse::new(&bill, today),
    }))
}

/// GET /api/bills/summary
async fn summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<BillSummary>> {
    let store = BillStore::new(state.pool.clone());
    let summary = store
        .summary_for_user(current.user.id, Utc::now().date_naive())
        .await?;

    Ok(Json(summary))
}

/// POST /api/bills/parse
///
/// Runs the free-text extractor and persists the draft it produces.
/// The response echoes the original input under `parsed_from`.
async fn parse_bill(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<FreeTextPayload>,
) -> AppResult<(StatusCode, Json<ParsedBillResponse>)> {
    let text = payload.validate()?;
    let today = Utc::now().date_naive();

    let draft = state.extractor.extract(&text, today).await?;

    let store = BillStore::new(state.pool.clone());
    let bill = store.insert(current.user.id, draft).await?;
    tracing::info!(user_id = %current.user.id, bill_id = %bill.id, "bill parsed from text");

    Ok((
        StatusCode::CREATED,
        Json(ParsedBillResponse {
            message: "Bill parsed and created",
            bill: BillResponse::new(&bill, today),
            parsed_from: text,
        }),
    ))
}
