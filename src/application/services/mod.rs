//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (DictionaryStore)
//! but are themselves concrete structs, not traits.

mod dictionary;

pub use dictionary::{DeleteReport, DictionaryService, SaveRequest};
