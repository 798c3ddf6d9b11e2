pub mod api;
pub mod config;
pub mod models;
pub mod short_code;
pub mod storage;
pub mod telemetry;
