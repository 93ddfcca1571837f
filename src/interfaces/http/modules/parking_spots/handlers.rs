//! Parking spot API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{parse_status, CreateSpotRequest, SpotDto, UpdateSpotStatusRequest};
use crate::application::services::FleetService;
use crate::interfaces::http::common::{reject, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ParkingSpotHandlerState {
    pub fleet: Arc<FleetService>,
}

fn admin_only<T>(user: &AuthenticatedUser) -> Result<(), (StatusCode, Json<ApiResponse<T>>)> {
    if user.is_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Admin access required")),
        ))
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/parking-spots",
    tag = "Parking Spots",
    security(("bearer_auth" = [])),
    request_body = CreateSpotRequest,
    responses(
        (status = 201, description = "Spot created", body = ApiResponse<SpotDto>),
        (status = 403, description = "Admin only"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_spot(
    State(state): State<ParkingSpotHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateSpotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SpotDto>>), (StatusCode, Json<ApiResponse<SpotDto>>)> {
    admin_only(&user)?;

    let spot = state.fleet.create_spot(&request.label).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(spot.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/parking-spots",
    tag = "Parking Spots",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All parking spots", body = ApiResponse<Vec<SpotDto>>)
    )
)]
pub async fn list_spots(
    State(state): State<ParkingSpotHandlerState>,
) -> Result<Json<ApiResponse<Vec<SpotDto>>>, (StatusCode, Json<ApiResponse<Vec<SpotDto>>>)> {
    let spots = state.fleet.all_spots().await.map_err(reject)?;
    Ok(Json(ApiResponse::success(
        spots.into_iter().map(SpotDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/parking-spots/{id}",
    tag = "Parking Spots",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Spot ID")),
    responses(
        (status = 200, description = "Parking spot", body = ApiResponse<SpotDto>),
        (status = 404, description = "Unknown spot")
    )
)]
pub async fn get_spot(
    State(state): State<ParkingSpotHandlerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SpotDto>>, (StatusCode, Json<ApiResponse<SpotDto>>)> {
    let spot = state.fleet.spot(id).await.map_err(reject)?;
    Ok(Json(ApiResponse::success(spot.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/parking-spots/{id}/status",
    tag = "Parking Spots",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Spot ID")),
    request_body = UpdateSpotStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<EmptyData>),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown spot"),
        (status = 409, description = "Spot has an active reservation")
    )
)]
pub async fn update_spot_status(
    State(state): State<ParkingSpotHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateSpotStatusRequest>,
) -> Result<Json<ApiResponse<EmptyData>>, (StatusCode, Json<ApiResponse<EmptyData>>)> {
    admin_only(&user)?;

    let Some(status) = parse_status(&request.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Unknown status: {}",
                request.status
            ))),
        ));
    };

    state
        .fleet
        .set_spot_status(id, status)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
