pub mod seed;
pub mod server;

pub use seed::{seed_store, SeedOptions, SeedSummary};
pub use server::{app_state, open_store, serve, spawn_router};
