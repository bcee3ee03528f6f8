//! Pin mode, digital and analog I/O.

use crate::board::{board_error, Board, Device, Level, PinMode};
use crate::command::{expect_args, reply_with, Reply};
use crate::error::CommandError;

/// `[pin, mode]` → nothing.
pub fn pin_mode<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin, mode] = expect_args(args)?;
    let mode = PinMode::try_from(mode)?;
    dev.board.pin_mode(pin, mode).map_err(board_error)
}

/// `[pin, value]` → nothing. Any nonzero value drives the pin high.
pub fn digital_write<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin, value] = expect_args(args)?;
    dev.board
        .digital_write(pin, Level::from_byte(value))
        .map_err(board_error)
}

/// `[pin]` → `[level]`.
pub fn digital_read<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin] = expect_args(args)?;
    let level = dev.board.digital_read(pin).map_err(board_error)?;
    reply_with(reply, &[level.as_byte()])
}

/// `[reference]` → nothing.
pub fn analog_reference<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let [reference] = expect_args(args)?;
    dev.board.analog_reference(reference).map_err(board_error)
}

/// `[pin, value_hi, value_lo]` → nothing.
pub fn analog_write<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin, hi, lo] = expect_args(args)?;
    dev.board
        .analog_write(pin, u16::from_be_bytes([hi, lo]))
        .map_err(board_error)
}

/// `[pin]` → `[value_hi, value_lo]`.
pub fn analog_read<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin] = expect_args(args)?;
    let value = dev.board.analog_read(pin).map_err(board_error)?;
    reply_with(reply, &value.to_be_bytes())
}

// ── Unit Tests ───────────────────────────────────────────────────────
