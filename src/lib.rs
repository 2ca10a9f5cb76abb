//! dictree: a tree of dictionary items with globally unique keys and
//! per-language translations.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
