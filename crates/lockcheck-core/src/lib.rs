pub mod config;
pub mod logging;

pub mod artifact;
pub mod integrity;
pub mod manifest;
pub mod pipeline;
pub mod pool;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod task;
