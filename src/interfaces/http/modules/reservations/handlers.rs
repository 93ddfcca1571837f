//! Reservation API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{cost_to_minor, CreateReservationRequest, ReservationDto};
use crate::application::services::ReservationService;
use crate::interfaces::http::common::{reject, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReservationHandlerState {
    pub reservations: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Inverted time window"),
        (status = 404, description = "Unknown spot or car"),
        (status = 409, description = "Spot already reserved")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<
    (StatusCode, Json<ApiResponse<ReservationDto>>),
    (StatusCode, Json<ApiResponse<ReservationDto>>),
> {
    let reservation = state
        .reservations
        .create_reservation(
            &user.email,
            request.spot_id,
            request.start_time,
            request.end_time,
            cost_to_minor(request.cost),
            &request.car_plate,
        )
        .await
        .map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reservations of the current user", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_own_reservations(
    State(state): State<ReservationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<
    Json<ApiResponse<Vec<ReservationDto>>>,
    (StatusCode, Json<ApiResponse<Vec<ReservationDto>>>),
> {
    let reservations = state
        .reservations
        .user_reservations(&user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/active",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active reservations of the current user", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_own_active_reservations(
    State(state): State<ReservationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<
    Json<ApiResponse<Vec<ReservationDto>>>,
    (StatusCode, Json<ApiResponse<Vec<ReservationDto>>>),
> {
    let reservations = state
        .reservations
        .own_active_reservations(&user.email)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/all",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every reservation in the system", body = ApiResponse<Vec<ReservationDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_all_reservations(
    State(state): State<ReservationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<
    Json<ApiResponse<Vec<ReservationDto>>>,
    (StatusCode, Json<ApiResponse<Vec<ReservationDto>>>),
> {
    if !user.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Admin access required")),
        ));
    }

    let reservations = state.reservations.all_reservations().await.map_err(reject)?;
    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/spot/{spot_id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("spot_id" = i64, Path, description = "Spot ID")),
    responses(
        (status = 200, description = "Active reservation for the spot, if any (data is null when free)", body = ApiResponse<ReservationDto>)
    )
)]
pub async fn get_spot_reservation(
    State(state): State<ReservationHandlerState>,
    Path(spot_id): Path<i64>,
) -> Result<
    Json<ApiResponse<Option<ReservationDto>>>,
    (StatusCode, Json<ApiResponse<Option<ReservationDto>>>),
> {
    let reservation = state
        .reservations
        .spot_reservation(spot_id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(
        reservation.map(ReservationDto::from),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the owner of the reserving car"),
        (status = 404, description = "Unknown reservation")
    )
)]
pub async fn delete_reservation(
    State(state): State<ReservationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    state
        .reservations
        .delete_reservation(&user.email, id)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
