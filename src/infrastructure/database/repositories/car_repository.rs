//! SeaORM implementation of CarRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::db_err;
use crate::domain::car::{Car, CarRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::car;

pub struct SeaOrmCarRepository {
    db: DatabaseConnection,
}

impl SeaOrmCarRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: car::Model) -> Car {
    Car {
        plate: m.plate,
        owner_email: m.owner_email,
        brand: m.brand,
        model: m.model,
        created_at: m.created_at,
    }
}

#[async_trait]
impl CarRepository for SeaOrmCarRepository {
    async fn save(&self, c: Car) -> DomainResult<()> {
        debug!("Saving car: {}", c.plate);

        let existing = car::Entity::find_by_id(&c.plate)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(DomainError::Conflict(format!(
                "Car with plate {} already exists",
                c.plate
            )));
        }

        let model = car::ActiveModel {
            plate: Set(c.plate),
            owner_email: Set(c.owner_email),
            brand: Set(c.brand),
            model: Set(c.model),
            created_at: Set(c.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_plate(&self, plate: &str) -> DomainResult<Option<Car>> {
        let model = car::Entity::find_by_id(plate)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Car>> {
        let models = car::Entity::find()
            .filter(car::Column::OwnerEmail.eq(owner_email))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Car>> {
        let models = car::Entity::find().all(&self.db).await.map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn delete(&self, plate: &str) -> DomainResult<()> {
        let existing = car::Entity::find_by_id(plate)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "Car",
                field: "plate",
                value: plate.to_string(),
            });
        };

        car::Entity::delete_by_id(existing.plate)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
