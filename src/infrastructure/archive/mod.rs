pub mod in_memory;
pub mod local;

pub use in_memory::{InMemoryArchiveStore, InjectedFailure};
pub use local::LocalArchiveStore;
