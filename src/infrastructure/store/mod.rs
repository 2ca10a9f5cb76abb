//! Dictionary store implementations

mod file;
mod memory;
mod state;

pub use file::TomlFileStore;
pub use memory::MemoryStore;
pub use state::{StoreDocument, StoreState};
