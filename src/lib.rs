pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{ClientOutcome, DocumentStore, LocalStorage, MemoryStore, VehicleClient};
pub use config::FleetConfig;
pub use crate::core::VehicleService;
pub use domain::model::{RecordId, VehicleInput, VehicleStatus, VehicleView};
pub use http::{build_router, AppState};
pub use utils::error::{FleetError, Result};
