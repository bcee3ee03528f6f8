//! Built-in command handlers.
//!
//! Every handler follows the same contract: check the argument count, do
//! the hardware operation through the [`Device`], and append any result
//! bytes to the reply. A wrong argument count or a hardware failure returns
//! an error, which the dispatcher publishes as zero results.
//!
//! Servo commands are the exception: once their arity is right they always
//! answer with an explicit status byte (`1` success, `0` failure), so a
//! failed servo operation is *not* an empty result.
//!
//! | Code | Command | Arguments | Results |
//! |------|---------|-----------|---------|
//! | 1 | pin mode | pin, mode | — |
//! | 2 | digital write | pin, value | — |
//! | 3 | digital read | pin | value |
//! | 4 | analog reference | reference | — |
//! | 5 | analog write | pin, value-hi, value-lo | — |
//! | 6 | analog read | pin | value-hi, value-lo |
//! | 7 | servo attach | pin | status |
//! | 8 | servo detach | pin | status |
//! | 9 | servo write | pin, angle | status |
//! | 10 | servo read | pin | angle |
//! | 11 | I2C begin | — | — |
//! | 12 | I2C end | — | — |
//! | 13 | I2C set clock | 4 bytes big-endian | — |
//! | 14 | I2C write | addr, reg, data… | — |
//! | 15 | I2C read | addr, reg, count | data… |
//! | 16 | SPI begin | — | — |
//! | 17 | SPI settings | 4-byte speed, order, mode | — |
//! | 18 | SPI transfer | chip-select pin, data… | data… |
//! | 19 | SPI end | — | — |

pub mod i2c;
pub mod pins;
pub mod servo;
pub mod spi;

use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiBus;

use crate::board::{Board, Device};
use crate::command::{Command, CommandTable};
use crate::dispatcher::Dispatcher;
use crate::registers::RegisterFile;

/// Command table with every built-in command attached.
pub fn builtin_table<B, I2C, SPI>() -> CommandTable<Device<B, I2C, SPI>>
where
    B: Board,
    I2C: I2c,
    SPI: SpiBus,
{
    let mut table = CommandTable::new();

    table.attach(Command::PinMode, pins::pin_mode::<B, I2C, SPI>);
    table.attach(Command::DigitalWrite, pins::digital_write::<B, I2C, SPI>);
    table.attach(Command::DigitalRead, pins::digital_read::<B, I2C, SPI>);
    table.attach(
        Command::AnalogReference,
        pins::analog_reference::<B, I2C, SPI>,
    );
    table.attach(Command::AnalogWrite, pins::analog_write::<B, I2C, SPI>);
    table.attach(Command::AnalogRead, pins::analog_read::<B, I2C, SPI>);

    table.attach(Command::ServoAttach, servo::servo_attach::<B, I2C, SPI>);
    table.attach(Command::ServoDetach, servo::servo_detach::<B, I2C, SPI>);
    table.attach(Command::ServoWrite, servo::servo_write::<B, I2C, SPI>);
    table.attach(Command::ServoRead, servo::servo_read::<B, I2C, SPI>);

    table.attach(Command::I2cBegin, i2c::i2c_begin::<B, I2C, SPI>);
    table.attach(Command::I2cEnd, i2c::i2c_end::<B, I2C, SPI>);
    table.attach(Command::I2cSetClock, i2c::i2c_set_clock::<B, I2C, SPI>);
    table.attach(Command::I2cWrite, i2c::i2c_write::<B, I2C, SPI>);
    table.attach(Command::I2cRead, i2c::i2c_read::<B, I2C, SPI>);

    table.attach(Command::SpiBegin, spi::spi_begin::<B, I2C, SPI>);
    table.attach(Command::SpiSettings, spi::spi_settings::<B, I2C, SPI>);
    table.attach(Command::SpiTransfer, spi::spi_transfer::<B, I2C, SPI>);
    table.attach(Command::SpiEnd, spi::spi_end::<B, I2C, SPI>);

    table
}

impl<R, B, I2C, SPI> Dispatcher<R, Device<B, I2C, SPI>>
where
    R: RegisterFile,
    B: Board,
    I2C: I2c,
    SPI: SpiBus,
{
    /// Dispatcher over `device` with every built-in command attached.
    ///
    /// Codes 20 and up stay free for [`attach`](Dispatcher::attach).
    pub fn with_builtin_commands(registers: R, device: Device<B, I2C, SPI>) -> Self {
        Self::with_table(registers, device, builtin_table())
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
