//! Persistence for the JSON dataset.

mod file;
mod lock;
mod store;

pub use file::*;
pub use lock::*;
pub use store::*;
