pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ChasTier, PatientProfile, UpsertProfileRequest};
pub use router::patient_routes;
