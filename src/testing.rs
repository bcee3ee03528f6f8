//! Hand-written fakes for the board and buses, used by the handler and
//! end-to-end tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::i2c::{self, ErrorKind as I2cErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal::spi::{self, ErrorKind as SpiErrorKind};

use crate::board::{Board, Device, Level, PinMode, SpiSettings};
use crate::dispatcher::Dispatcher;
use crate::registers::HoldingRegisters;

/// Pins the mock board exposes.
pub const MOCK_PINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    NoSuchPin,
    Unavailable,
}

/// Records every call and serves preset input levels and analog readings.
#[derive(Debug, Default)]
pub struct MockBoard {
    pub input_levels: [Option<Level>; MOCK_PINS],
    pub analog_inputs: [u16; MOCK_PINS],
    pub pin_modes: Vec<(u8, PinMode)>,
    pub digital_writes: Vec<(u8, Level)>,
    pub analog_writes: Vec<(u8, u16)>,
    pub analog_reference: Option<u8>,
    pub servo_attached: Vec<u8>,
    pub servo_detached: Vec<u8>,
    pub servo_pulses: Vec<(u8, u8)>,
    pub i2c_running: bool,
    pub i2c_clock: Option<u32>,
    pub spi_running: bool,
    pub spi_configured: Vec<SpiSettings>,
    /// Make every servo call fail, to exercise hardware-level failures.
    pub fail_servos: bool,
}

impl MockBoard {
    fn check(pin: u8) -> Result<usize, MockError> {
        let index = pin as usize;
        if index < MOCK_PINS {
            Ok(index)
        } else {
            Err(MockError::NoSuchPin)
        }
    }

    fn servo_available(&self) -> Result<(), MockError> {
        if self.fail_servos {
            Err(MockError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Board for MockBoard {
    type Error = MockError;

    fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), MockError> {
        Self::check(pin)?;
        self.pin_modes.push((pin, mode));
        Ok(())
    }

    fn digital_write(&mut self, pin: u8, level: Level) -> Result<(), MockError> {
        Self::check(pin)?;
        self.digital_writes.push((pin, level));
        Ok(())
    }

    fn digital_read(&mut self, pin: u8) -> Result<Level, MockError> {
        let index = Self::check(pin)?;
        Ok(self.input_levels[index].unwrap_or(Level::Low))
    }

    fn analog_reference(&mut self, reference: u8) -> Result<(), MockError> {
        self.analog_reference = Some(reference);
        Ok(())
    }

    fn analog_write(&mut self, pin: u8, value: u16) -> Result<(), MockError> {
        Self::check(pin)?;
        self.analog_writes.push((pin, value));
        Ok(())
    }

    fn analog_read(&mut self, pin: u8) -> Result<u16, MockError> {
        let index = Self::check(pin)?;
        Ok(self.analog_inputs[index])
    }

    fn servo_attach(&mut self, pin: u8) -> Result<(), MockError> {
        self.servo_available()?;
        self.servo_attached.push(pin);
        Ok(())
    }

    fn servo_detach(&mut self, pin: u8) -> Result<(), MockError> {
        self.servo_available()?;
        self.servo_detached.push(pin);
        Ok(())
    }

    fn servo_write(&mut self, pin: u8, angle: u8) -> Result<(), MockError> {
        self.servo_available()?;
        self.servo_pulses.push((pin, angle));
        Ok(())
    }

    fn i2c_begin(&mut self) -> Result<(), MockError> {
        self.i2c_running = true;
        Ok(())
    }

    fn i2c_end(&mut self) -> Result<(), MockError> {
        self.i2c_running = false;
        Ok(())
    }

    fn i2c_set_clock(&mut self, hz: u32) -> Result<(), MockError> {
        self.i2c_clock = Some(hz);
        Ok(())
    }

    fn spi_begin(&mut self) -> Result<(), MockError> {
        self.spi_running = true;
        Ok(())
    }

    fn spi_configure(&mut self, settings: &SpiSettings) -> Result<(), MockError> {
        self.spi_configured.push(*settings);
        Ok(())
    }

    fn spi_end(&mut self) -> Result<(), MockError> {
        self.spi_running = false;
        Ok(())
    }
}

/// I2C fake: records writes per address and serves reads from a queue.
#[derive(Debug, Default)]
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: Vec<(u8, usize)>,
    pub responses: VecDeque<u8>,
    /// Number of `transaction` calls, i.e. start-to-stop sequences.
    pub transactions: usize,
    /// Address that NACKs every transaction.
    pub absent_address: Option<u8>,
}

impl i2c::ErrorType for MockI2c {
    type Error = I2cErrorKind;
}

impl i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if self.absent_address == Some(address) {
            return Err(I2cErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buffer) => {
                    self.reads.push((address, buffer.len()));
                    for byte in buffer.iter_mut() {
                        *byte = self.responses.pop_front().ok_or(I2cErrorKind::Bus)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// SPI fake: records outgoing bytes and answers each with its bitwise
/// complement.
#[derive(Debug, Default)]
pub struct MockSpi {
    pub sent: Vec<u8>,
    pub flushes: usize,
    pub broken: bool,
}

impl MockSpi {
    fn exchange(&mut self, byte: u8) -> Result<u8, SpiErrorKind> {
        if self.broken {
            return Err(SpiErrorKind::Other);
        }
        self.sent.push(byte);
        Ok(!byte)
    }
}

impl spi::ErrorType for MockSpi {
    type Error = SpiErrorKind;
}

impl spi::SpiBus for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(0)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let incoming = self.exchange(write.get(i).copied().unwrap_or(0))?;
            if let Some(slot) = read.get_mut(i) {
                *slot = incoming;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

pub type MockDevice = Device<MockBoard, MockI2c, MockSpi>;

pub fn mock_device() -> MockDevice {
    Device::new(MockBoard::default(), MockI2c::default(), MockSpi::default())
}

/// Dispatcher with the built-in command set over mock hardware.
pub fn mock_dispatcher() -> Dispatcher<HoldingRegisters, MockDevice> {
    Dispatcher::with_builtin_commands(HoldingRegisters::new(), mock_device())
}
