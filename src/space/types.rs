use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sequence::RangeSequence;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    #[error("requested length must be greater than zero")]
    InvalidLength,

    #[error("no free range can hold {requested} words (largest free range is {largest})")]
    AllocationFailure { requested: u32, largest: u32 },

    #[error("no allocated block starts at address {0}")]
    NotFound(u32),

    #[error("index {index} is out of range for a sequence of length {len}")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, SpaceError>;

/// A contiguous run of addresses, `[base, base + length)`.
///
/// Ranges are only built by the allocator, which never hands out or keeps one
/// with a zero length.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub base: u32,
    pub length: u32,
}

impl Range {
    pub fn new(base: u32, length: u32) -> Self {
        Self { base, length }
    }

    /// One past the last address covered by this range.
    pub fn end(&self) -> u32 {
        self.base + self.length
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.base <= addr && addr < self.end()
    }

    /// `true` when `other` starts exactly where `self` ends.
    pub fn is_adjacent_to(&self, other: &Range) -> bool {
        self.end() == other.base
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} , {})", self.base, self.length)
    }
}

/// Outcome of a successful `release`: the block that went back to the free set.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Release {
    pub base: u32,
    pub length: u32,
}

/// Owned copy of both sets, free first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub free: Vec<Range>,
    pub allocated: Vec<Range>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for range in &self.free {
            write!(f, "{} ", range)?;
        }
        writeln!(f)?;
        for range in &self.allocated {
            write!(f, "{} ", range)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Allocator {
    pub(super) capacity: u32,
    // first-fit scan order, not necessarily sorted until coalesce
    pub(super) free: RangeSequence,
    // request order
    pub(super) allocated: RangeSequence,
}
