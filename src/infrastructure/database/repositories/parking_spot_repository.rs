//! SeaORM implementation of ParkingSpotRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::db_err;
use crate::domain::parking_spot::{ParkingSpot, ParkingSpotRepository, SpotStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::parking_spot;

pub struct SeaOrmParkingSpotRepository {
    db: DatabaseConnection,
}

impl SeaOrmParkingSpotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: parking_spot::Model) -> ParkingSpot {
    ParkingSpot {
        id: m.id,
        label: m.label,
        status: SpotStatus::from_str(&m.status),
        created_at: m.created_at,
    }
}

#[async_trait]
impl ParkingSpotRepository for SeaOrmParkingSpotRepository {
    async fn save(&self, spot: ParkingSpot) -> DomainResult<()> {
        debug!("Saving parking spot: {}", spot.id);

        let model = parking_spot::ActiveModel {
            id: Set(spot.id),
            label: Set(spot.label),
            status: Set(spot.status.as_str().to_string()),
            created_at: Set(spot.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<ParkingSpot>> {
        let model = parking_spot::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingSpot>> {
        let models = parking_spot::Entity::find()
            .order_by_asc(parking_spot::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_status(&self, id: i64, status: SpotStatus) -> DomainResult<()> {
        let existing = parking_spot::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "ParkingSpot",
                field: "id",
                value: id.to_string(),
            });
        };

        let mut active: parking_spot::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn next_id(&self) -> DomainResult<i64> {
        let last = parking_spot::Entity::find()
            .order_by_desc(parking_spot::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(last.map(|s| s.id).unwrap_or(0) + 1)
    }
}
