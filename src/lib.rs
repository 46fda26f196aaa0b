pub mod agent;
pub mod cache;
pub mod chat;
pub mod cli;
pub mod config;
pub mod i18n;
pub mod knowledge;
pub mod launcher;
pub mod llm;
pub mod memory;
pub mod store;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use agent::workflow::launch;
pub use config::Config;
pub use launcher::ProcessLauncher;
