pub mod client;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod intent;
pub mod metrics_api;
pub mod model;
pub mod report;
pub mod settings;
pub mod transport;
