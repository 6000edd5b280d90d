//! `SkillGate` gateway: configuration, HTTP routes and service wiring.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use service::GatewayService;
pub use state::{AppState, ChatSettings};
