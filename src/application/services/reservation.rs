//! Reservation service
//!
//! Creates and deletes reservations tied to a spot, a car, a time window and
//! a cost. A spot holds at most one active reservation, and only the owner
//! of the reserving car may delete a reservation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{DomainError, DomainResult, Reservation, RepositoryProvider};

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Reserve a spot for a car over a time window.
    ///
    /// Fails when the spot or car does not exist, when the window is
    /// inverted, or when the spot already has an active reservation.
    pub async fn create_reservation(
        &self,
        user_email: &str,
        spot_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cost: i64,
        car_plate: &str,
    ) -> DomainResult<Reservation> {
        if start_time >= end_time {
            return Err(DomainError::Validation(
                "Reservation start must precede its end".to_string(),
            ));
        }

        let spot = self
            .repos
            .parking_spots()
            .find_by_id(spot_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ParkingSpot",
                field: "id",
                value: spot_id.to_string(),
            })?;

        self.repos
            .cars()
            .find_by_plate(car_plate)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Car",
                field: "plate",
                value: car_plate.to_string(),
            })?;

        if let Some(existing) = self.repos.reservations().find_active_for_spot(spot.id).await? {
            return Err(DomainError::Conflict(format!(
                "Spot {} is already reserved (reservation {})",
                spot.id, existing.id
            )));
        }

        let id = self.repos.reservations().next_id().await?;
        let reservation = Reservation::new(id, car_plate, spot.id, start_time, end_time, cost);
        self.repos.reservations().save(reservation.clone()).await?;

        info!(
            reservation_id = id,
            spot_id,
            car_plate,
            user_email,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Delete a reservation. Only the owner of the reserving car may do so.
    pub async fn delete_reservation(&self, user_email: &str, id: i64) -> DomainResult<()> {
        let reservation =
            self.repos
                .reservations()
                .find_by_id(id)
                .await?
                .ok_or(DomainError::NotFound {
                    entity: "Reservation",
                    field: "id",
                    value: id.to_string(),
                })?;

        let car = self
            .repos
            .cars()
            .find_by_plate(&reservation.car_plate)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Car",
                field: "plate",
                value: reservation.car_plate.clone(),
            })?;

        if !car.is_owned_by(user_email) {
            return Err(DomainError::Unauthorized(
                "You are not authorized to delete this reservation".to_string(),
            ));
        }

        self.repos.reservations().delete(id).await?;
        info!(reservation_id = id, user_email, "Reservation deleted");
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    pub async fn all_reservations(&self) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_all().await
    }

    pub async fn spot_reservation(&self, spot_id: i64) -> DomainResult<Option<Reservation>> {
        self.repos.reservations().find_active_for_spot(spot_id).await
    }

    pub async fn own_active_reservations(&self, email: &str) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_active_for_owner(email).await
    }

    pub async fn user_reservations(&self, email: &str) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_for_owner(email).await
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Car, CarRepository, ParkingSpot, ParkingSpotRepository, ReservationRepository, SpotStatus,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory repositories for service tests
    #[derive(Default)]
    struct MemoryRepos {
        cars: Mutex<Vec<Car>>,
        spots: Mutex<Vec<ParkingSpot>>,
        reservations: Mutex<Vec<Reservation>>,
        counter: AtomicI64,
        fail_next_id: AtomicBool,
    }

    impl MemoryRepos {
        fn next_counter(&self) -> DomainResult<i64> {
            if self.fail_next_id.load(Ordering::SeqCst) {
                return Err(DomainError::Validation(
                    "Database error: connection closed".to_string(),
                ));
            }
            Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    #[async_trait]
    impl CarRepository for MemoryRepos {
        async fn save(&self, car: Car) -> DomainResult<()> {
            let mut cars = self.cars.lock().unwrap();
            if cars.iter().any(|c| c.plate == car.plate) {
                return Err(DomainError::Conflict(car.plate));
            }
            cars.push(car);
            Ok(())
        }

        async fn find_by_plate(&self, plate: &str) -> DomainResult<Option<Car>> {
            Ok(self
                .cars
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.plate == plate)
                .cloned())
        }

        async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Car>> {
            Ok(self
                .cars
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.owner_email == owner_email)
                .cloned()
                .collect())
        }

        async fn find_all(&self) -> DomainResult<Vec<Car>> {
            Ok(self.cars.lock().unwrap().clone())
        }

        async fn delete(&self, plate: &str) -> DomainResult<()> {
            self.cars.lock().unwrap().retain(|c| c.plate != plate);
            Ok(())
        }
    }

    #[async_trait]
    impl ParkingSpotRepository for MemoryRepos {
        async fn save(&self, spot: ParkingSpot) -> DomainResult<()> {
            self.spots.lock().unwrap().push(spot);
            Ok(())
        }

        async fn find_by_id(&self, id: i64) -> DomainResult<Option<ParkingSpot>> {
            Ok(self
                .spots
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn find_all(&self) -> DomainResult<Vec<ParkingSpot>> {
            Ok(self.spots.lock().unwrap().clone())
        }

        async fn update_status(&self, id: i64, status: SpotStatus) -> DomainResult<()> {
            if let Some(spot) = self.spots.lock().unwrap().iter_mut().find(|s| s.id == id) {
                spot.status = status;
            }
            Ok(())
        }

        async fn next_id(&self) -> DomainResult<i64> {
            self.next_counter()
        }
    }

    #[async_trait]
    impl ReservationRepository for MemoryRepos {
        async fn save(&self, reservation: Reservation) -> DomainResult<()> {
            self.reservations.lock().unwrap().push(reservation);
            Ok(())
        }

        async fn find_by_id(&self, id: i64) -> DomainResult<Option<Reservation>> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
            Ok(self.reservations.lock().unwrap().clone())
        }

        async fn find_active_for_spot(&self, spot_id: i64) -> DomainResult<Option<Reservation>> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.spot_id == spot_id && r.is_active())
                .cloned())
        }

        async fn find_active_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>> {
            let plates: Vec<String> = self
                .cars
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.owner_email == owner_email)
                .map(|c| c.plate.clone())
                .collect();
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.is_active() && plates.contains(&r.car_plate))
                .cloned()
                .collect())
        }

        async fn find_for_owner(&self, owner_email: &str) -> DomainResult<Vec<Reservation>> {
            let plates: Vec<String> = self
                .cars
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.owner_email == owner_email)
                .map(|c| c.plate.clone())
                .collect();
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| plates.contains(&r.car_plate))
                .cloned()
                .collect())
        }

        async fn delete(&self, id: i64) -> DomainResult<()> {
            self.reservations.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn next_id(&self) -> DomainResult<i64> {
            self.next_counter()
        }
    }

    struct Repos(Arc<MemoryRepos>);

    impl RepositoryProvider for Repos {
        fn cars(&self) -> &dyn CarRepository {
            self.0.as_ref()
        }
        fn parking_spots(&self) -> &dyn ParkingSpotRepository {
            self.0.as_ref()
        }
        fn reservations(&self) -> &dyn ReservationRepository {
            self.0.as_ref()
        }
    }

    fn setup() -> (Arc<MemoryRepos>, ReservationService) {
        let mem = Arc::new(MemoryRepos::default());
        mem.spots.lock().unwrap().push(ParkingSpot::new(1, "A-1"));
        mem.cars
            .lock()
            .unwrap()
            .push(Car::new("B-123-XYZ", "ana@example.com"));
        let svc = ReservationService::new(Arc::new(Repos(mem.clone())));
        (mem, svc)
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc::now();
        (start, start + Duration::hours(2))
    }

    #[tokio::test]
    async fn creates_active_reservation() {
        let (_mem, svc) = setup();
        let (start, end) = window();
        let r = svc
            .create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap();
        assert!(r.is_active());
        assert_eq!(r.spot_id, 1);
    }

    #[tokio::test]
    async fn rejects_unknown_spot() {
        let (_mem, svc) = setup();
        let (start, end) = window();
        let err = svc
            .create_reservation("ana@example.com", 42, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "ParkingSpot", .. }));
    }

    #[tokio::test]
    async fn rejects_unknown_car() {
        let (_mem, svc) = setup();
        let (start, end) = window();
        let err = svc
            .create_reservation("ana@example.com", 1, start, end, 1500, "GHOST")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Car", .. }));
    }

    #[tokio::test]
    async fn rejects_inverted_time_window() {
        let (_mem, svc) = setup();
        let (start, end) = window();
        let err = svc
            .create_reservation("ana@example.com", 1, end, start, 1500, "B-123-XYZ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn one_active_reservation_per_spot() {
        let (mem, svc) = setup();
        mem.cars
            .lock()
            .unwrap()
            .push(Car::new("CJ-99-AAA", "dan@example.com"));
        let (start, end) = window();
        svc.create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap();
        let err = svc
            .create_reservation("dan@example.com", 1, start, end, 1500, "CJ-99-AAA")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn id_generation_failure_propagates() {
        let (mem, svc) = setup();
        mem.fail_next_id.store(true, Ordering::SeqCst);
        let (start, end) = window();
        let err = svc
            .create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(mem.reservations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let (mem, svc) = setup();
        let (start, end) = window();
        let r = svc
            .create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap();

        let err = svc
            .delete_reservation("dan@example.com", r.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
        // reservation still persisted, unchanged
        let kept = mem
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|x| x.id == r.id)
            .cloned()
            .unwrap();
        assert!(kept.is_active());
        assert_eq!(kept.car_plate, "B-123-XYZ");
    }

    #[tokio::test]
    async fn owner_delete_removes_reservation() {
        let (mem, svc) = setup();
        let (start, end) = window();
        let r = svc
            .create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap();
        svc.delete_reservation("ana@example.com", r.id).await.unwrap();
        assert!(mem.reservations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_reservation_is_not_found() {
        let (_mem, svc) = setup();
        let err = svc
            .delete_reservation("ana@example.com", 99)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn owner_queries_follow_car_ownership() {
        let (mem, svc) = setup();
        mem.cars
            .lock()
            .unwrap()
            .push(Car::new("CJ-99-AAA", "dan@example.com"));
        mem.spots.lock().unwrap().push(ParkingSpot::new(2, "A-2"));
        let (start, end) = window();
        svc.create_reservation("ana@example.com", 1, start, end, 1500, "B-123-XYZ")
            .await
            .unwrap();
        svc.create_reservation("dan@example.com", 2, start, end, 1500, "CJ-99-AAA")
            .await
            .unwrap();

        let ana = svc.own_active_reservations("ana@example.com").await.unwrap();
        assert_eq!(ana.len(), 1);
        assert_eq!(ana[0].car_plate, "B-123-XYZ");
        assert_eq!(svc.all_reservations().await.unwrap().len(), 2);
        assert!(svc.spot_reservation(2).await.unwrap().is_some());
    }
}
