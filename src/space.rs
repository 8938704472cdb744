// impl Allocator
pub mod allocator;

// settings loaded by drivers
pub mod config;

// ordered range storage
pub mod sequence;

// types
pub mod types;

pub use config::SpaceConfig;
pub use sequence::RangeSequence;
pub use types::{Allocator, Range, Release, Result, Snapshot, SpaceError};
