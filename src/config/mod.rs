pub mod error;
pub mod pipeline_config;
