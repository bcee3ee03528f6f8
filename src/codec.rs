//! Conversion between byte payloads and 16-bit register cells.
//!
//! The register file only moves 16-bit cells, but command arguments and
//! results are byte sequences. Bytes are packed two per cell, most
//! significant byte first:
//!
//! ```text
//! bytes:  [b0] [b1] [b2] [b3] [b4]
//! cells:  [b0|b1]   [b2|b3]   [b4|00]
//! ```
//!
//! Byte `i` lives in cell `i / 2`: the high half when `i` is even, the low
//! half when `i` is odd. An odd-length payload leaves a zero filler in the
//! low half of its last cell, and that filler is never read back as data.
//!
//! The control cell uses the same split: the high byte carries the command
//! code (or `0` for idle) and the low byte carries the argument or result
//! count. See [`ControlWord`].
//!
//! All functions here are pure and allocation-free; buffers are bounded by
//! the one-byte count field.

use heapless::Vec;

use crate::error::CodecError;

/// Largest payload a one-byte count can describe.
pub const MAX_PAYLOAD_BYTES: usize = 255;

/// Cells needed for a [`MAX_PAYLOAD_BYTES`] payload.
pub const MAX_PAYLOAD_CELLS: usize = cells_for(MAX_PAYLOAD_BYTES);

/// A bounded byte payload (command arguments or results).
pub type Payload = Vec<u8, MAX_PAYLOAD_BYTES>;

/// A bounded run of packed payload cells.
pub type Cells = Vec<u16, MAX_PAYLOAD_CELLS>;

/// Number of cells a payload of `len` bytes occupies (`ceil(len / 2)`).
pub const fn cells_for(len: usize) -> usize {
    (len + 1) / 2
}

// ---------------------------------------------------------------------------
// Control word
// ---------------------------------------------------------------------------

/// Decoded control cell.
///
/// In the request direction `code` is the command code and `count` the
/// number of argument bytes. In the response direction `code` is always `0`
/// and `count` is the number of result bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlWord {
    /// Command code, or `0` when idle.
    pub code: u8,
    /// Argument count (request) or result count (response).
    pub count: u8,
}

impl ControlWord {
    /// Idle with no results.
    pub const IDLE: ControlWord = ControlWord { code: 0, count: 0 };

    /// A request for `code` carrying `argc` argument bytes.
    pub const fn request(code: u8, argc: u8) -> Self {
        Self { code, count: argc }
    }

    /// An idle control word publishing `result_count` result bytes.
    pub const fn response(result_count: u8) -> Self {
        Self {
            code: 0,
            count: result_count,
        }
    }

    /// Split a raw cell into code (high byte) and count (low byte).
    ///
    /// Every 16-bit value is a valid control word.
    pub const fn decode(cell: u16) -> Self {
        Self {
            code: (cell >> 8) as u8,
            count: (cell & 0xFF) as u8,
        }
    }

    /// Join code and count back into a raw cell.
    pub const fn encode(self) -> u16 {
        ((self.code as u16) << 8) | self.count as u16
    }

    /// `true` while a request is written but not yet consumed.
    pub const fn is_pending(self) -> bool {
        self.code != 0
    }
}

impl From<u16> for ControlWord {
    fn from(cell: u16) -> Self {
        Self::decode(cell)
    }
}

impl From<ControlWord> for u16 {
    fn from(word: ControlWord) -> Self {
        word.encode()
    }
}

// ---------------------------------------------------------------------------
// Payload packing
// ---------------------------------------------------------------------------

/// Pack bytes two per cell, high half first.
///
/// An odd-length input sets the low half of the final cell to `0`.
///
/// # Errors
/// [`CodecError::PayloadTooLong`] if `bytes` is longer than
/// [`MAX_PAYLOAD_BYTES`].
///
/// # Example
/// ```
/// use modmata::codec::pack;
///
/// let cells = pack(&[0x12, 0x34, 0x56]).unwrap();
/// assert_eq!(&cells[..], &[0x1234, 0x5600]);
/// ```
pub fn pack(bytes: &[u8]) -> Result<Cells, CodecError> {
    let too_long = CodecError::PayloadTooLong { len: bytes.len() };
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(too_long);
    }

    let mut cells = Cells::new();
    for pair in bytes.chunks(2) {
        let high = pair[0];
        let low = pair.get(1).copied().unwrap_or(0);
        cells
            .push(u16::from_be_bytes([high, low]))
            .map_err(|_| too_long)?;
    }

    Ok(cells)
}

/// Unpack `len` bytes from packed cells.
///
/// Only the first `ceil(len / 2)` cells are read; extra cells are ignored.
/// For odd `len` the low half of the last cell read is discarded.
///
/// # Errors
/// * [`CodecError::PayloadTooLong`] if `len` exceeds [`MAX_PAYLOAD_BYTES`]
/// * [`CodecError::MissingCells`] if `cells` is shorter than `ceil(len / 2)`
///
/// # Example
/// ```
/// use modmata::codec::unpack;
///
/// let bytes = unpack(&[0x1234, 0x56FF], 3).unwrap();
/// assert_eq!(&bytes[..], &[0x12, 0x34, 0x56]);
/// ```
pub fn unpack(cells: &[u16], len: usize) -> Result<Payload, CodecError> {
    if len > MAX_PAYLOAD_BYTES {
        return Err(CodecError::PayloadTooLong { len });
    }

    let needed = cells_for(len);
    if cells.len() < needed {
        return Err(CodecError::MissingCells {
            needed,
            available: cells.len(),
        });
    }

    let mut bytes = Payload::new();
    for byte in cells[..needed]
        .iter()
        .flat_map(|cell| cell.to_be_bytes())
        .take(len)
    {
        bytes
            .push(byte)
            .map_err(|_| CodecError::PayloadTooLong { len })?;
    }

    Ok(bytes)
}

// ── Unit Tests ───────────────────────────────────────────────────────
