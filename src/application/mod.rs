// Leg-latency analysis over the telemetry archive
pub mod analyzer;

// Telemetry generation and submission
pub mod emitter;
