pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{RosterEntry, StaffError, StaffRole, UpdateStatusRequest};
pub use router::staff_routes;
