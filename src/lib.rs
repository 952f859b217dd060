//! Course API: declarative CRUD REST backend over PostgreSQL or SQLite.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{resolve, FullConfig, ResolvedEntity, ResolvedModel, Settings};
pub use error::{AppError, ConfigError, FieldErrors};
pub use migration::apply_migrations;
pub use routes::{app_router, common_routes, resource_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{connect, ensure_database_exists, Backend};
