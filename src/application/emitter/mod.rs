pub mod payload;
pub mod scheduler;

pub use payload::{PayloadFactory, application_log_bundle};
pub use scheduler::{Cadences, Emitter, EmitterState};
