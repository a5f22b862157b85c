mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_config, build_schedule};
pub use models::AppConfig;
