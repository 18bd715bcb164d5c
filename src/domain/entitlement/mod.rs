pub mod error;
pub mod gate;
pub mod model;
pub mod service;

pub use error::EntitlementServiceError;
pub use gate::EntitlementGate;
pub use model::{ActivateSubscriptionRequest, Entitlement};
pub use service::EntitlementService;
