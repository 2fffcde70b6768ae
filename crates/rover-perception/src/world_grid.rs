//! Persistent world map of evidence counters.
//!
//! A [`WorldGrid`] is a square grid with three independent `u32` counters per
//! cell, one per [`Channel`].  Counters only ever grow: every projected
//! detection adds one, so repeated consistent observations raise confidence.
//! Cells are addressed `(x, y)` = (column, row).

use tracing::warn;

use crate::projector::GridIndices;

/// Evidence channel, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Obstacle = 0,
    Target = 1,
    Navigable = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Obstacle, Channel::Target, Channel::Navigable];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldGrid {
    size: usize,
    cells: Vec<[u32; 3]>,
}

impl WorldGrid {
    /// An all-zero `size × size` grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![[0; 3]; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Counter at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, channel: Channel, x: usize, y: usize) -> Option<u32> {
        (x < self.size && y < self.size).then(|| self.cells[y * self.size + x][channel.index()])
    }

    /// Add one to `channel` at every index.  Repeated indices accumulate.
    ///
    /// Indices are expected to come from
    /// [`WorldProjector`][crate::projector::WorldProjector] and therefore lie
    /// inside the grid; anything else is skipped.  Returns the number of
    /// increments applied.
    pub fn accumulate(&mut self, channel: Channel, indices: &GridIndices) -> usize {
        let ch = channel.index();
        let mut applied = 0;
        for (x, y) in indices.iter() {
            if x >= self.size || y >= self.size {
                continue;
            }
            let cell = &mut self.cells[y * self.size + x][ch];
            *cell = cell.saturating_add(1);
            applied += 1;
        }
        if applied < indices.len() {
            warn!(
                channel = ?channel,
                skipped = indices.len() - applied,
                "indices outside world grid skipped"
            );
        }
        applied
    }

    /// Sum of one channel over the whole grid.
    pub fn total(&self, channel: Channel) -> u64 {
        let ch = channel.index();
        self.cells.iter().map(|c| u64::from(c[ch])).sum()
    }

    /// Number of cells with a nonzero counter on `channel`.
    pub fn touched_cells(&self, channel: Channel) -> usize {
        let ch = channel.index();
        self.cells.iter().filter(|c| c[ch] > 0).count()
    }
}
