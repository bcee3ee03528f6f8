//! Error types for the codec, the command handlers and the host helpers.
//!
//! None of these errors ever reach the host as such: the register protocol
//! has no error channel, so the dispatcher turns every [`CommandError`] into
//! a zero-length result. They exist so the device side can log and test
//! *why* a cycle produced nothing.

use core::fmt;

/// Errors raised while converting between bytes and register cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A payload longer than the one-byte count field can describe.
    PayloadTooLong {
        /// Length of the rejected payload in bytes.
        len: usize,
    },
    /// Fewer cells were supplied than the requested byte length needs.
    MissingCells {
        /// Cells required to hold the payload (`ceil(len / 2)`).
        needed: usize,
        /// Cells actually supplied.
        available: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodecError::PayloadTooLong { len } => {
                write!(f, "payload of {} bytes exceeds 255", len)
            }
            CodecError::MissingCells { needed, available } => {
                write!(
                    f,
                    "payload needs {} cells, only {} available",
                    needed, available
                )
            }
        }
    }
}

/// Reasons a command cycle completed with zero results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The argument count does not match the handler's arity.
    ///
    /// For variadic commands `expected` is the minimum count.
    ArityMismatch { expected: usize, actual: usize },
    /// An argument byte is outside the values the command accepts.
    InvalidArgument,
    /// No handler is attached for this command code.
    UnknownCommand(u8),
    /// The request or the result does not fit in the register file.
    PayloadOverflow,
    /// Payload cells could not be decoded.
    Codec(CodecError),
    /// The board rejected a pin, servo or bus-control operation.
    Board,
    /// Servo bookkeeping refused the operation.
    Servo(ServoError),
    /// An I2C transaction failed.
    I2c(embedded_hal::i2c::ErrorKind),
    /// An SPI transfer failed.
    Spi(embedded_hal::spi::ErrorKind),
}

impl From<CodecError> for CommandError {
    fn from(error: CodecError) -> Self {
        CommandError::Codec(error)
    }
}

impl From<ServoError> for CommandError {
    fn from(error: ServoError) -> Self {
        CommandError::Servo(error)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandError::ArityMismatch { expected, actual } => {
                write!(f, "expected {} argument bytes, got {}", expected, actual)
            }
            CommandError::InvalidArgument => write!(f, "invalid argument value"),
            CommandError::UnknownCommand(code) => write!(f, "no handler for command {}", code),
            CommandError::PayloadOverflow => write!(f, "payload does not fit the register file"),
            CommandError::Codec(e) => write!(f, "codec error: {}", e),
            CommandError::Board => write!(f, "board operation failed"),
            CommandError::Servo(e) => write!(f, "servo error: {}", e),
            CommandError::I2c(kind) => write!(f, "I2C error: {:?}", kind),
            CommandError::Spi(kind) => write!(f, "SPI error: {:?}", kind),
        }
    }
}

/// Servo bookkeeping failures. Servo handlers report these to the host as a
/// `0` status byte rather than an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Pin is outside the servo-capable range.
    PinOutOfRange,
    /// Every servo slot is already in use.
    NoFreeSlot,
    /// No servo is attached to the pin.
    NotAttached,
}

impl fmt::Display for ServoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServoError::PinOutOfRange => write!(f, "pin cannot drive a servo"),
            ServoError::NoFreeSlot => write!(f, "all servo slots in use"),
            ServoError::NotAttached => write!(f, "no servo attached to pin"),
        }
    }
}

/// Errors returned by the host-side request helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError {
    /// A request is still outstanding (control high byte nonzero).
    Busy,
    /// Code 0 means idle and cannot carry a request.
    ReservedCode,
    /// The payload needs more cells than the register file provides.
    Capacity { needed: usize, available: usize },
    /// The payload could not be packed or unpacked.
    Codec(CodecError),
}

impl From<CodecError> for HostError {
    fn from(error: CodecError) -> Self {
        HostError::Codec(error)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostError::Busy => write!(f, "request still pending"),
            HostError::ReservedCode => write!(f, "command code 0 is reserved for idle"),
            HostError::Capacity { needed, available } => {
                write!(
                    f,
                    "request needs {} payload cells, {} available",
                    needed, available
                )
            }
            HostError::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}
