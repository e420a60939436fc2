// Infrastructure module - External dependencies and adapters
pub mod clipboard;
pub mod config;
pub mod logging;
pub mod logsource;
pub mod packages;
pub mod probe;
