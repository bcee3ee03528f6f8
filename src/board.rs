//! Hardware context passed to the built-in command handlers.
//!
//! Pin-numbered operations (pin mode, digital/analog I/O, servo pulses) and
//! bus lifecycle/configuration go through the [`Board`] trait, which each
//! firmware target implements for its HAL. Bus *transactions* go through the
//! standard `embedded-hal` traits so any [`I2c`] or [`SpiBus`]
//! implementation can be plugged in directly.
//!
//! [`Device`] owns the board, both buses, the servo bookkeeping and the
//! current SPI settings for as long as the dispatcher lives.

use core::fmt;

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Mode, SpiBus, MODE_0, MODE_1, MODE_2, MODE_3};

use crate::error::CommandError;
use crate::servo::ServoBank;

/// Default SPI clock after `SPI begin`.
pub const DEFAULT_SPI_SPEED_HZ: u32 = 4_000_000;

// ---------------------------------------------------------------------------
// Pin and bus parameter types
// ---------------------------------------------------------------------------

/// Pin direction, using the host's numeric encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinMode {
    Input = 0,
    Output = 1,
    InputPullup = 2,
}

impl TryFrom<u8> for PinMode {
    type Error = CommandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PinMode::Input),
            1 => Ok(PinMode::Output),
            2 => Ok(PinMode::InputPullup),
            _ => Err(CommandError::InvalidArgument),
        }
    }
}

/// Digital logic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Any nonzero byte is high.
    pub const fn from_byte(value: u8) -> Self {
        if value == 0 {
            Level::Low
        } else {
            Level::High
        }
    }

    /// `0` for low, `1` for high.
    pub const fn as_byte(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// SPI bit order. Wire values follow the Arduino constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BitOrder {
    LsbFirst = 0,
    MsbFirst = 1,
}

impl TryFrom<u8> for BitOrder {
    type Error = CommandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BitOrder::LsbFirst),
            1 => Ok(BitOrder::MsbFirst),
            _ => Err(CommandError::InvalidArgument),
        }
    }
}

/// Settings applied to the SPI bus at the start of every transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiSettings {
    /// Clock speed in Hz.
    pub speed_hz: u32,
    /// Bit order on the wire.
    pub bit_order: BitOrder,
    /// Clock polarity and phase.
    pub mode: Mode,
}

impl Default for SpiSettings {
    /// 4 MHz, MSB first, mode 0.
    fn default() -> Self {
        Self {
            speed_hz: DEFAULT_SPI_SPEED_HZ,
            bit_order: BitOrder::MsbFirst,
            mode: MODE_0,
        }
    }
}

/// Map a mode number (`0..=3`) to its polarity/phase pair.
pub fn spi_mode(value: u8) -> Result<Mode, CommandError> {
    match value {
        0 => Ok(MODE_0),
        1 => Ok(MODE_1),
        2 => Ok(MODE_2),
        3 => Ok(MODE_3),
        _ => Err(CommandError::InvalidArgument),
    }
}

// ---------------------------------------------------------------------------
// Board trait
// ---------------------------------------------------------------------------

/// Pin-numbered peripherals and bus control of a target board.
///
/// Every method is synchronous and must return promptly: handlers run to
/// completion inside a single dispatcher cycle.
pub trait Board {
    /// Error reported by the board implementation.
    type Error: fmt::Debug;

    fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error>;

    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), Self::Error>;

    fn digital_read(&mut self, pin: u8) -> Result<Level, Self::Error>;

    /// Select the analog reference source (board-specific numbering).
    fn analog_reference(&mut self, reference: u8) -> Result<(), Self::Error>;

    /// Write a PWM / DAC value.
    fn analog_write(&mut self, pin: u8, value: u16) -> Result<(), Self::Error>;

    fn analog_read(&mut self, pin: u8) -> Result<u16, Self::Error>;

    /// Start generating servo pulses on `pin`.
    fn servo_attach(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Stop generating servo pulses on `pin`.
    fn servo_detach(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Set the pulse for `angle` degrees (`0..=180`).
    fn servo_write(&mut self, pin: u8, angle: u8) -> Result<(), Self::Error>;

    fn i2c_begin(&mut self) -> Result<(), Self::Error>;

    fn i2c_end(&mut self) -> Result<(), Self::Error>;

    fn i2c_set_clock(&mut self, hz: u32) -> Result<(), Self::Error>;

    fn spi_begin(&mut self) -> Result<(), Self::Error>;

    /// Reconfigure the SPI peripheral before a transfer.
    fn spi_configure(&mut self, settings: &SpiSettings) -> Result<(), Self::Error>;

    fn spi_end(&mut self) -> Result<(), Self::Error>;
}

/// Collapse a board error into [`CommandError::Board`], logging it first.
pub(crate) fn board_error<E: fmt::Debug>(_error: E) -> CommandError {
    #[cfg(feature = "defmt")]
    defmt::warn!("board error: {}", defmt::Debug2Format(&_error));
    CommandError::Board
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Hardware context owned by the dispatcher and handed to every handler.
pub struct Device<B, I2C, SPI> {
    pub(crate) board: B,
    pub(crate) i2c: I2C,
    pub(crate) spi: SPI,
    pub(crate) servos: ServoBank,
    pub(crate) spi_settings: SpiSettings,
}

impl<B, I2C, SPI> Device<B, I2C, SPI>
where
    B: Board,
    I2C: I2c,
    SPI: SpiBus,
{
    /// Take ownership of the board and both buses.
    ///
    /// No hardware traffic is generated; buses are started by the host
    /// through the `I2C begin` / `SPI begin` commands.
    pub fn new(board: B, i2c: I2C, spi: SPI) -> Self {
        Self {
            board,
            i2c,
            spi,
            servos: ServoBank::new(),
            spi_settings: SpiSettings::default(),
        }
    }
}

impl<B, I2C, SPI> Device<B, I2C, SPI> {
    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn i2c(&self) -> &I2C {
        &self.i2c
    }

    pub fn spi(&self) -> &SPI {
        &self.spi
    }

    /// Servo attachment state.
    pub fn servos(&self) -> &ServoBank {
        &self.servos
    }

    /// Settings the next SPI transfer will use.
    pub fn spi_settings(&self) -> &SpiSettings {
        &self.spi_settings
    }

    /// Release the board and buses.
    pub fn release(self) -> (B, I2C, SPI) {
        (self.board, self.i2c, self.spi)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
