pub mod bus;
pub mod store;
pub mod students;

pub use bus::BroadcastBus;
pub use store::{JsonFileStore, MemoryStore};
pub use students::StaticDirectory;
