//! Register-file collaborator.
//!
//! The transport (a Modbus-style serial slave) owns an array of 16-bit
//! holding registers. The dispatcher only ever touches it through the
//! [`RegisterFile`] trait: single-cell reads and writes plus a polling
//! primitive that advances the transport.
//!
//! Layout:
//!
//! ```text
//! cell 0        control word  [code | count]
//! cells 1..N-1  payload       [b0|b1] [b2|b3] ...
//! ```
//!
//! [`HoldingRegisters`] is an in-memory register bank. A transport binding
//! writes incoming frames into it with [`HoldingRegisters::receive`]; tests
//! use it to play the host.

use crate::codec::{ControlWord, MAX_PAYLOAD_CELLS};

/// Index of the control cell.
pub const CONTROL_CELL: usize = 0;

/// Index of the first payload cell.
pub const PAYLOAD_START: usize = 1;

/// Register count that fits a full 255-byte payload plus the control cell.
pub const DEFAULT_REGISTER_COUNT: usize = PAYLOAD_START + MAX_PAYLOAD_CELLS;

/// Access to the transport's holding registers.
///
/// Indices outside `0..cell_count()` are a caller precondition violation;
/// the dispatcher checks payload sizes against [`payload_cells`] before it
/// touches any cell.
///
/// [`payload_cells`]: RegisterFile::payload_cells
pub trait RegisterFile {
    /// Total number of cells, control cell included.
    fn cell_count(&self) -> usize;

    /// Read one cell.
    fn get(&self, index: usize) -> u16;

    /// Write one cell.
    fn set(&mut self, index: usize, value: u16);

    /// Advance the transport's receive/transmit state machine.
    ///
    /// Returns `true` if new data arrived since the previous call.
    fn poll(&mut self) -> bool;

    /// Number of payload cells (everything after the control cell).
    fn payload_cells(&self) -> usize {
        self.cell_count().saturating_sub(PAYLOAD_START)
    }

    /// Decode the control cell.
    fn control(&self) -> ControlWord {
        ControlWord::decode(self.get(CONTROL_CELL))
    }

    /// Encode and write the control cell.
    fn set_control(&mut self, word: ControlWord) {
        self.set(CONTROL_CELL, word.encode());
    }
}

impl<T: RegisterFile + ?Sized> RegisterFile for &mut T {
    fn cell_count(&self) -> usize {
        (**self).cell_count()
    }

    fn get(&self, index: usize) -> u16 {
        (**self).get(index)
    }

    fn set(&mut self, index: usize, value: u16) {
        (**self).set(index, value)
    }

    fn poll(&mut self) -> bool {
        (**self).poll()
    }
}

/// Fixed-size in-memory holding-register bank.
///
/// Out-of-range reads return `0` and out-of-range writes are dropped, the
/// way a Modbus slave treats unmapped registers.
#[derive(Debug, Clone)]
pub struct HoldingRegisters<const N: usize = DEFAULT_REGISTER_COUNT> {
    cells: [u16; N],
    received: bool,
}

impl<const N: usize> Default for HoldingRegisters<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HoldingRegisters<N> {
    /// All cells zero (idle, no results), nothing received.
    pub const fn new() -> Self {
        Self {
            cells: [0; N],
            received: false,
        }
    }

    /// Store a cell written by the remote side and flag new data for the
    /// next [`poll`](RegisterFile::poll).
    pub fn receive(&mut self, index: usize, value: u16) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
            self.received = true;
        }
    }

    /// Raw view of every cell.
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }
}

impl<const N: usize> RegisterFile for HoldingRegisters<N> {
    fn cell_count(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> u16 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    fn set(&mut self, index: usize, value: u16) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }

    fn poll(&mut self) -> bool {
        core::mem::take(&mut self.received)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
