//! I2C bus commands.
//!
//! Bus lifecycle and clock go through the [`Board`]; transactions go
//! straight to the `embedded-hal` [`I2c`] bus owned by the [`Device`].

use embedded_hal::i2c::I2c;

use crate::board::{board_error, Board, Device};
use crate::command::{expect_args, expect_min_args, Reply};
use crate::error::CommandError;

fn bus_error<E: embedded_hal::i2c::Error>(error: E) -> CommandError {
    let kind = error.kind();
    #[cfg(feature = "defmt")]
    defmt::warn!("i2c error: {}", kind);
    CommandError::I2c(kind)
}

/// `[]` → nothing.
pub fn i2c_begin<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_args::<0>(args)?;
    dev.board.i2c_begin().map_err(board_error)
}

/// `[]` → nothing.
pub fn i2c_end<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_args::<0>(args)?;
    dev.board.i2c_end().map_err(board_error)
}

/// `[hz3, hz2, hz1, hz0]` (big-endian) → nothing.
pub fn i2c_set_clock<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let hz = u32::from_be_bytes(expect_args(args)?);
    if hz == 0 {
        return Err(CommandError::InvalidArgument);
    }
    dev.board.i2c_set_clock(hz).map_err(board_error)
}

/// `[addr, reg, data…]` → nothing.
///
/// `reg` and the data bytes go out in a single write transaction.
pub fn i2c_write<B, I2C: I2c, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_min_args(args, 2)?;
    let (address, bytes) = (args[0], &args[1..]);
    dev.i2c.write(address, bytes).map_err(bus_error)
}

/// `[addr, reg, count]` → `count` bytes read from `reg`.
///
/// The register select and the read are two transactions: `[reg]` is
/// written and the bus stopped, then `count` bytes are read. No repeated
/// start is used. A failed transaction yields no result bytes at all,
/// never a short read.
pub fn i2c_read<B, I2C: I2c, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [address, register, count] = expect_args(args)?;
    let count = count as usize;

    // `count` is at most 255, which is exactly the reply capacity.
    reply
        .resize(count, 0)
        .map_err(|_| CommandError::PayloadOverflow)?;

    let result = write_then_read(&mut dev.i2c, address, register, &mut reply[..]);
    if result.is_err() {
        reply.clear();
    }
    result
}

fn write_then_read<I2C: I2c>(
    i2c: &mut I2C,
    address: u8,
    register: u8,
    buffer: &mut [u8],
) -> Result<(), CommandError> {
    i2c.write(address, &[register]).map_err(bus_error)?;
    i2c.read(address, buffer).map_err(bus_error)
}

// ── Unit Tests ───────────────────────────────────────────────────────
