//! Car API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CarDto, RegisterCarRequest};
use crate::application::services::FleetService;
use crate::interfaces::http::common::{reject, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct CarHandlerState {
    pub fleet: Arc<FleetService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/cars",
    tag = "Cars",
    security(("bearer_auth" = [])),
    request_body = RegisterCarRequest,
    responses(
        (status = 201, description = "Car registered", body = ApiResponse<CarDto>),
        (status = 409, description = "Plate already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register_car(
    State(state): State<CarHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<RegisterCarRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CarDto>>), (StatusCode, Json<ApiResponse<CarDto>>)> {
    let car = state
        .fleet
        .register_car(&user.email, &request.plate, request.brand, request.model)
        .await
        .map_err(reject)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(car.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/cars",
    tag = "Cars",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cars owned by the current user", body = ApiResponse<Vec<CarDto>>)
    )
)]
pub async fn list_own_cars(
    State(state): State<CarHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CarDto>>>, (StatusCode, Json<ApiResponse<Vec<CarDto>>>)> {
    let cars = state.fleet.own_cars(&user.email).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(
        cars.into_iter().map(CarDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/cars/all",
    tag = "Cars",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All registered cars", body = ApiResponse<Vec<CarDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_all_cars(
    State(state): State<CarHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<CarDto>>>, (StatusCode, Json<ApiResponse<Vec<CarDto>>>)> {
    if !user.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Admin access required")),
        ));
    }

    let cars = state.fleet.all_cars().await.map_err(reject)?;
    Ok(Json(ApiResponse::success(
        cars.into_iter().map(CarDto::from).collect(),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cars/{plate}",
    tag = "Cars",
    security(("bearer_auth" = [])),
    params(("plate" = String, Path, description = "License plate")),
    responses(
        (status = 200, description = "Car removed", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown plate"),
        (status = 409, description = "Car has an active reservation")
    )
)]
pub async fn remove_car(
    State(state): State<CarHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(plate): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    state
        .fleet
        .remove_car(&user.email, &plate)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
