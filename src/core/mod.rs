// Core infrastructure module
// Configuration that the mirror operations depend on

pub mod app_config;
pub mod mirror_config;

pub use app_config::AppConfig;
pub use mirror_config::{MirrorConfig, MirrorSettings};
