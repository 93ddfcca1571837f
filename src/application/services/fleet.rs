//! Car and parking spot management

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    Car, DomainError, DomainResult, ParkingSpot, RepositoryProvider, SpotStatus,
};

pub struct FleetService {
    repos: Arc<dyn RepositoryProvider>,
}

impl FleetService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Cars ───────────────────────────────────────────────────

    pub async fn register_car(
        &self,
        owner_email: &str,
        plate: &str,
        brand: Option<String>,
        model: Option<String>,
    ) -> DomainResult<Car> {
        let plate = plate.trim().to_uppercase();
        if plate.is_empty() {
            return Err(DomainError::Validation(
                "License plate must not be empty".to_string(),
            ));
        }

        let mut car = Car::new(plate, owner_email);
        car.brand = brand;
        car.model = model;
        self.repos.cars().save(car.clone()).await?;

        info!(plate = %car.plate, owner_email, "Car registered");
        Ok(car)
    }

    pub async fn own_cars(&self, owner_email: &str) -> DomainResult<Vec<Car>> {
        self.repos.cars().find_by_owner(owner_email).await
    }

    pub async fn all_cars(&self) -> DomainResult<Vec<Car>> {
        self.repos.cars().find_all().await
    }

    /// Remove a car. Only its owner may do so, and not while the car holds
    /// an active reservation.
    pub async fn remove_car(&self, owner_email: &str, plate: &str) -> DomainResult<()> {
        let car = self
            .repos
            .cars()
            .find_by_plate(plate)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Car",
                field: "plate",
                value: plate.to_string(),
            })?;

        if !car.is_owned_by(owner_email) {
            return Err(DomainError::Unauthorized(
                "You are not authorized to remove this car".to_string(),
            ));
        }

        let active = self
            .repos
            .reservations()
            .find_active_for_owner(owner_email)
            .await?;
        if active.iter().any(|r| r.car_plate == car.plate) {
            return Err(DomainError::Conflict(format!(
                "Car {} has an active reservation",
                car.plate
            )));
        }

        self.repos.cars().delete(&car.plate).await?;
        info!(plate = %car.plate, "Car removed");
        Ok(())
    }

    // ── Parking spots ──────────────────────────────────────────

    pub async fn create_spot(&self, label: &str) -> DomainResult<ParkingSpot> {
        let label = label.trim();
        if label.is_empty() {
            return Err(DomainError::Validation(
                "Spot label must not be empty".to_string(),
            ));
        }

        let id = self.repos.parking_spots().next_id().await?;
        let spot = ParkingSpot::new(id, label);
        self.repos.parking_spots().save(spot.clone()).await?;

        info!(spot_id = id, label, "Parking spot created");
        Ok(spot)
    }

    pub async fn all_spots(&self) -> DomainResult<Vec<ParkingSpot>> {
        self.repos.parking_spots().find_all().await
    }

    pub async fn spot(&self, id: i64) -> DomainResult<ParkingSpot> {
        self.repos
            .parking_spots()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ParkingSpot",
                field: "id",
                value: id.to_string(),
            })
    }

    /// Change a spot's status. A spot with an active reservation cannot be
    /// marked available.
    pub async fn set_spot_status(&self, id: i64, status: SpotStatus) -> DomainResult<()> {
        if status == SpotStatus::Available {
            if let Some(existing) = self.repos.reservations().find_active_for_spot(id).await? {
                return Err(DomainError::Conflict(format!(
                    "Spot {} has an active reservation ({})",
                    id, existing.id
                )));
            }
        }
        self.repos.parking_spots().update_status(id, status).await?;
        info!(spot_id = id, status = %status, "Spot status updated");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
