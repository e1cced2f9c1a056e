// Domain layer: vehicle records, the shared validation rules and the store ports.

pub mod model;
pub mod ports;
pub mod validation;
