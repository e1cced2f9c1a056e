use crate::domain::model::{NewVehicle, VehicleStatus};
use crate::domain::ports::{UserDirectory, VehicleStore};
use crate::utils::error::Result;
use crate::utils::validation::validate_non_empty_string;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@fleet.local";
pub const DEFAULT_VEHICLE_COUNT: usize = 25;

const MARKS: [&str; 10] = [
    "Toyota", "Honda", "Ford", "Tesla", "Nissan", "Chevrolet", "BMW", "Audi", "Kia", "Hyundai",
];
const BODY_STYLES: [&str; 8] = [
    "Sedan", "SUV", "Hatchback", "Pickup", "Crossover", "Coupe", "Van", "Roadster",
];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_email: String,
    pub count: usize,
    /// When false the store is emptied first.
    pub keep_existing: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            count: DEFAULT_VEHICLE_COUNT,
            keep_existing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub admin_email: String,
    pub vehicles_created: usize,
    pub total_vehicles: u64,
}

/// The `index`-th sample vehicle. Marks, body styles and statuses cycle;
/// years span 2015 to 2024.
pub fn sample_vehicle(index: usize) -> NewVehicle {
    let mark = MARKS[index % MARKS.len()];
    NewVehicle {
        mark: mark.to_string(),
        model: format!("{} {} {}", mark, BODY_STYLES[index % BODY_STYLES.len()], index + 1),
        year: 2015 + (index % 10) as i32,
        status: VehicleStatus::ALL[index % VehicleStatus::ALL.len()],
    }
}

pub async fn seed_store<D>(store: &D, options: &SeedOptions) -> Result<SeedSummary>
where
    D: VehicleStore + UserDirectory,
{
    validate_non_empty_string("admin_email", &options.admin_email)?;

    if !options.keep_existing {
        store.clear().await?;
        tracing::info!("🧹 Store cleared");
    }

    let admin = match store.find_user_by_email(&options.admin_email).await? {
        Some(user) => user,
        None => store.insert_user(&options.admin_email).await?,
    };
    tracing::info!("✅ Admin user ready: {}", admin.email);

    let vehicles = (0..options.count).map(sample_vehicle).collect();
    let vehicles_created = store.insert_many(vehicles, admin.id).await?;
    let total_vehicles = store.count().await?;
    tracing::info!("✅ {} vehicles created ({} total)", vehicles_created, total_vehicles);

    Ok(SeedSummary {
        admin_email: admin.email,
        vehicles_created,
        total_vehicles,
    })
}
