//! Storage adapters

mod fs;

pub use fs::FsStorage;
