//! Payment API handlers
//!
//! All operations act on the account of the authenticated user; the
//! customer is looked up (or created) by the email in the token claims.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    BalanceDto, BalanceRefundRequest, CardRefundRequest, CreateIntentRequest, IntentDto,
    PayRequest, PaymentStatusDto, TransactionDto,
};
use crate::application::services::PaymentService;
use crate::interfaces::http::common::{reject, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct PaymentHandlerState {
    pub payments: Arc<PaymentService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/intents",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreateIntentRequest,
    responses(
        (status = 201, description = "Payment intent created", body = ApiResponse<IntentDto>),
        (status = 400, description = "Amount too small or provider error")
    )
)]
pub async fn create_intent(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateIntentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IntentDto>>), (StatusCode, Json<ApiResponse<IntentDto>>)>
{
    let handle = state
        .payments
        .create_payment_intent(&user.email, request.amount)
        .await
        .map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(handle.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/intents/{intent_id}/result",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("intent_id" = String, Path, description = "Payment intent ID")),
    responses(
        (status = 200, description = "Final intent status; credits the balance when succeeded", body = ApiResponse<PaymentStatusDto>)
    )
)]
pub async fn payment_result(
    State(state): State<PaymentHandlerState>,
    Path(intent_id): Path<String>,
) -> Result<
    Json<ApiResponse<PaymentStatusDto>>,
    (StatusCode, Json<ApiResponse<PaymentStatusDto>>),
> {
    let status = state
        .payments
        .handle_payment_result(&intent_id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(PaymentStatusDto { status })))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/balance",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current balance in major currency units", body = ApiResponse<BalanceDto>),
        (status = 404, description = "No customer account yet")
    )
)]
pub async fn balance(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<BalanceDto>>, (StatusCode, Json<ApiResponse<BalanceDto>>)> {
    let balance = state
        .payments
        .retrieve_customer_balance(&user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(BalanceDto { balance })))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/transactions",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transaction history, newest first", body = ApiResponse<Vec<TransactionDto>>),
        (status = 404, description = "No customer account yet")
    )
)]
pub async fn transactions(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<
    Json<ApiResponse<Vec<TransactionDto>>>,
    (StatusCode, Json<ApiResponse<Vec<TransactionDto>>>),
> {
    let history = state
        .payments
        .get_transactions_history(&user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(
        history.into_iter().map(TransactionDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/pay",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = PayRequest,
    responses(
        (status = 200, description = "\"success\" or \"insufficient-balance\"", body = ApiResponse<PaymentStatusDto>),
        (status = 404, description = "No customer account yet")
    )
)]
pub async fn pay(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<PayRequest>,
) -> Result<
    Json<ApiResponse<PaymentStatusDto>>,
    (StatusCode, Json<ApiResponse<PaymentStatusDto>>),
> {
    let status = state
        .payments
        .pay_for_parking_spot(&user.email, request.amount)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(PaymentStatusDto { status })))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/refunds/card",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CardRefundRequest,
    responses(
        (status = 200, description = "Refund status or a diagnostic message", body = ApiResponse<PaymentStatusDto>)
    )
)]
pub async fn refund_card_payment(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CardRefundRequest>,
) -> Result<
    Json<ApiResponse<PaymentStatusDto>>,
    (StatusCode, Json<ApiResponse<PaymentStatusDto>>),
> {
    let status = state
        .payments
        .create_card_payment_refund(&request.charge_id, &user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(PaymentStatusDto { status })))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/refunds/balance",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = BalanceRefundRequest,
    responses(
        (status = 200, description = "\"success\" or a diagnostic message", body = ApiResponse<PaymentStatusDto>)
    )
)]
pub async fn refund_balance_transaction(
    State(state): State<PaymentHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<BalanceRefundRequest>,
) -> Result<
    Json<ApiResponse<PaymentStatusDto>>,
    (StatusCode, Json<ApiResponse<PaymentStatusDto>>),
> {
    let status = state
        .payments
        .refund_customer_balance_transaction(&request.transaction_id, &user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(PaymentStatusDto { status })))
}
