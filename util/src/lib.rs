pub mod config;
pub mod notifier;
pub mod state;
