//! Host side of the request/response rendezvous.
//!
//! The host writes the argument payload first and the control cell last, so
//! the device never sees a pending code with a half-written payload. It then
//! waits for the control cell's high byte to return to zero before reading
//! the results. There is no timeout in the protocol; a host that needs one
//! layers it on top of [`collect`].
//!
//! These helpers operate on a [`HoldingRegisters`] mirror of the device's
//! register bank and mark every write as received data, the way the
//! transport would on the device.

use crate::codec::{self, cells_for, ControlWord, Payload};
use crate::error::HostError;
use crate::registers::{HoldingRegisters, RegisterFile, CONTROL_CELL, PAYLOAD_START};

/// Write a request for `code` with `args`.
///
/// # Errors
/// * [`HostError::Busy`] if the previous request is still pending
/// * [`HostError::ReservedCode`] if `code` is `0`
/// * [`HostError::Capacity`] if `args` does not fit the payload cells
/// * [`HostError::Codec`] if `args` is longer than 255 bytes
///
/// # Example
/// ```
/// use modmata::host;
/// use modmata::registers::HoldingRegisters;
///
/// let mut regs: HoldingRegisters = HoldingRegisters::new();
/// host::submit(&mut regs, 3, &[7]).unwrap();
/// assert_eq!(regs.cells()[0], 0x0301);
/// ```
pub fn submit<const N: usize>(
    registers: &mut HoldingRegisters<N>,
    code: u8,
    args: &[u8],
) -> Result<(), HostError> {
    if registers.control().is_pending() {
        return Err(HostError::Busy);
    }
    if code == 0 {
        return Err(HostError::ReservedCode);
    }

    let cells = codec::pack(args)?;
    let available = registers.payload_cells();
    if cells.len() > available {
        return Err(HostError::Capacity {
            needed: cells.len(),
            available,
        });
    }

    for (offset, &cell) in cells.iter().enumerate() {
        registers.receive(PAYLOAD_START + offset, cell);
    }

    // Length already checked against MAX_PAYLOAD_BYTES by `pack`.
    let argc = args.len() as u8;
    registers.receive(CONTROL_CELL, ControlWord::request(code, argc).encode());

    Ok(())
}

/// `true` once the device has consumed the last request.
pub fn is_idle<const N: usize>(registers: &HoldingRegisters<N>) -> bool {
    !registers.control().is_pending()
}

/// Read the result bytes of the last completed request.
///
/// # Errors
/// * [`HostError::Busy`] while the request is still pending
/// * [`HostError::Capacity`] if the published count exceeds the bank
pub fn collect<const N: usize>(registers: &HoldingRegisters<N>) -> Result<Payload, HostError> {
    let control = registers.control();
    if control.is_pending() {
        return Err(HostError::Busy);
    }

    let len = control.count as usize;
    let needed = cells_for(len);
    let payload = registers.cells().get(PAYLOAD_START..).unwrap_or(&[]);
    if needed > payload.len() {
        return Err(HostError::Capacity {
            needed,
            available: payload.len(),
        });
    }

    Ok(codec::unpack(payload, len)?)
}

// ── Unit Tests ───────────────────────────────────────────────────────
