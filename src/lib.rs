pub mod configuration;
pub mod document;
pub mod editor;
pub mod error;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod telemetry;
