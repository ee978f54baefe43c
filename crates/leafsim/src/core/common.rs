use std::fmt::{Display, Formatter};
use std::ops::Range;

use serde::Serialize;

/// Binary occupancy state of a single node. A node is wholly free or wholly
/// occupied, no partial occupancy is modeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NodeState {
    Free,
    Occupied,
}

/// Contiguous range of node indices granted to a single job.
///
/// The range is recorded at allocation time and freed verbatim when the job
/// completes, so that concurrent jobs never release each other's nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NodeRange {
    pub start: u32,
    pub count: u32,
}

impl NodeRange {
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    /// Returns the first node index past the range.
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    /// Returns the range as indices into the occupancy array.
    pub fn indices(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }
}

impl Display for NodeRange {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}
