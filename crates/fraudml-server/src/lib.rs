//! HTTP prediction service.
//!
//! `POST /predict/` takes the 30 transaction features as a JSON object and
//! answers with the fraud label and risk score. The scoring pipeline is
//! loaded once and shared read-only across requests.

pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::ServiceError;
pub use routes::{build_router, serve};
pub use state::AppState;
