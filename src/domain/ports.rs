use crate::domain::model::{NewVehicle, RecordId, User, VehicleStatus, VehicleView};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level persistence used for store snapshots.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The entity store behind the vehicle service. Reads resolve `createdBy`
/// and `updatedBy` to user display fields.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Up to `limit` vehicles after skipping `skip`, most recently created first.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<VehicleView>>;

    async fn count(&self) -> Result<u64>;

    async fn create(&self, vehicle: NewVehicle, actor: RecordId) -> Result<VehicleView>;

    /// Sets status and updater in one step. `None` when no record matches.
    async fn find_and_update_status(
        &self,
        id: RecordId,
        status: VehicleStatus,
        actor: RecordId,
    ) -> Result<Option<VehicleView>>;

    async fn resolve_user(&self, id: RecordId) -> Result<Option<User>>;
}

/// Maintenance operations used by the seeder.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn insert_user(&self, email: &str) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert_many(&self, vehicles: Vec<NewVehicle>, actor: RecordId) -> Result<usize>;

    async fn clear(&self) -> Result<()>;
}
