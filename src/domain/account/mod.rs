pub mod dto;
pub mod model;
pub mod service;

pub use dto::{GatedActionUsage, MeResponse};
pub use model::{Account, PremiumTier};
pub use service::AccountService;
