//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::db_err;
use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{car, reservation};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Plates of all cars owned by `owner_email`
    async fn owner_plates(&self, owner_email: &str) -> DomainResult<Vec<String>> {
        let cars = car::Entity::find()
            .filter(car::Column::OwnerEmail.eq(owner_email))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(cars.into_iter().map(|c| c.plate).collect())
    }
}

fn model_to_domain(m: reservation::Model) -> Reservation {
    Reservation {
        id: m.id,
        car_plate: m.car_plate,
        spot_id: m.spot_id,
        start_time: m.start_time,
        end_time: m.end_time,
        cost: m.cost,
        status: ReservationStatus::from_str(&m.status),
        created_at: m.created_at,
    }
}

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn save(&self, r: Reservation) -> DomainResult<()> {
        debug!("Saving reservation: {}", r.id);

        let model = reservation::ActiveModel {
            id: Set(r.id),
            car_plate: Set(r.car_plate),
            spot_id: Set(r.spot_id),
            start_time: Set(r.start_time),
            end_time: Set(r.end_time),
            cost: Set(r.cost),
            status: Set(r.status.as_str().to_string()),
            created_at: Set(r.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_active_for_spot(&self, spot_id: i64) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find()
            .filter(reservation::Column::SpotId.eq(spot_id))
            .filter(reservation::Column::Status.eq("active"))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_active_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>> {
        let plates = self.owner_plates(owner_email).await?;
        if plates.is_empty() {
            return Ok(Vec::new());
        }
        let models = reservation::Entity::find()
            .filter(reservation::Column::CarPlate.is_in(plates))
            .filter(reservation::Column::Status.eq("active"))
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>> {
        let plates = self.owner_plates(owner_email).await?;
        if plates.is_empty() {
            return Ok(Vec::new());
        }
        let models = reservation::Entity::find()
            .filter(reservation::Column::CarPlate.is_in(plates))
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let existing = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "Reservation",
                field: "id",
                value: id.to_string(),
            });
        };

        reservation::Entity::delete_by_id(existing.id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn next_id(&self) -> DomainResult<i64> {
        let last = reservation::Entity::find()
            .order_by_desc(reservation::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(last.map(|r| r.id).unwrap_or(0) + 1)
    }
}
