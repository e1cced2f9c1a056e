pub mod vehicle_service;

pub use crate::domain::model::{NewVehicle, Pagination, RecordId, VehiclePage, VehicleView};
pub use crate::domain::ports::{Storage, UserDirectory, VehicleStore};
pub use crate::utils::error::Result;
pub use vehicle_service::VehicleService;
