use crate::core::{Pagination, RecordId, Result, VehiclePage, VehicleStore, VehicleView};
use crate::domain::model::VehicleInput;
use crate::domain::validation::{current_year, prepare_new_vehicle, validate_status};
use crate::utils::error::FleetError;
use std::sync::Arc;

/// Business rules for vehicle records. Stateless apart from the store handle.
#[derive(Clone)]
pub struct VehicleService {
    store: Arc<dyn VehicleStore>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, page: i64, limit: i64) -> Result<VehiclePage> {
        if page < 1 || limit < 1 {
            return Err(FleetError::InvalidPagination { page, limit });
        }
        let (page, limit) = (page as u64, limit as u64);

        let vehicles = self
            .store
            .find_page(Pagination::offset(page, limit), limit)
            .await?;
        let total = self.store.count().await?;

        tracing::debug!(
            "Listed {} of {} vehicles (page {}, limit {})",
            vehicles.len(),
            total,
            page,
            limit
        );
        Ok(VehiclePage {
            vehicles,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn create(&self, input: &VehicleInput, actor: RecordId) -> Result<VehicleView> {
        let vehicle = prepare_new_vehicle(input, current_year())?;
        let created = self.store.create(vehicle, actor).await?;

        tracing::info!(
            vehicle_id = %created.id,
            actor = %actor,
            "Vehicle created: {} {} ({})",
            created.mark,
            created.model,
            created.year
        );
        Ok(created)
    }

    pub async fn update_status(
        &self,
        vehicle_id: &str,
        status: Option<&str>,
        actor: RecordId,
    ) -> Result<VehicleView> {
        let status = validate_status(status)?;
        let id: RecordId = vehicle_id.parse()?;

        let updated = self
            .store
            .find_and_update_status(id, status, actor)
            .await?
            .ok_or_else(|| FleetError::NotFound {
                entity: "Vehicle".to_string(),
            })?;

        tracing::info!(vehicle_id = %id, actor = %actor, "Vehicle status set to {}", status);
        Ok(updated)
    }
}
