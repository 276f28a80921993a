//! CLI Command Implementations
//!
//! - render: view model rendering
//! - config: configuration management commands

pub mod config;
pub mod render;

pub use config::{list_graphs, print_default_config, validate_config};
pub use render::render_command;
