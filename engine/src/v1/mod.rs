pub mod health;
pub mod predict;

pub use health::{health_check, HealthResponse};
pub use predict::{predict, PredictResponse};
