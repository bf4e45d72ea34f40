//! Kafka Steward operator surface: admin HTTP API, migration driver, CLI.

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod driver;
pub mod plan;

pub use api::{DeleteResponse, StewardApi, TopicInfoResponse};
pub use backend::build_backend;
pub use cli::{Cli, Command};
pub use config::{Backend, MgmtConfig};
pub use driver::{run_migration, MigrationReport};
pub use plan::MigrationPlan;
