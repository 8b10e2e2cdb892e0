pub mod envelope;
pub mod errors;
pub mod legs;
pub mod ports;
pub mod statistics;
pub mod telemetry;
pub mod topology;
