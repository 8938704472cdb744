pub mod space;

pub use space::Result as SpaceResult;
pub use space::{Allocator, Range, RangeSequence, Release, Snapshot, SpaceConfig, SpaceError};

// notes for `space`:
//
// a first-fit allocator over an abstract address space. It only tracks (base, length) metadata,
// there is no backing storage. Every address in [0, capacity) is always either in exactly one free
// range or exactly one allocated range, `Allocator::check_tiling` verifies that.
//
// single threaded: if it ever needs sharing, put the whole `Allocator` behind one lock, since
// allocate/release move ranges between both sequences together.
