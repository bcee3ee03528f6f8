//! Command codes, the handler contract, and the command table.
//!
//! A handler is a plain function of the hardware context, the argument
//! bytes, and a caller-owned result buffer:
//!
//! ```ignore
//! fn handler(ctx: &mut C, args: &[u8], reply: &mut Reply) -> Result<(), CommandError>
//! ```
//!
//! Handlers check the argument count themselves. Returning an error makes
//! the dispatcher publish zero results, which is all the host ever sees of a
//! failure. Handlers must not block indefinitely: nothing else runs on the
//! device while one executes.

use core::fmt;

use crate::codec::Payload;
use crate::error::CommandError;

/// Result buffer handed to every handler, cleared before each call.
pub type Reply = Payload;

/// Signature every command handler implements.
pub type Handler<C> = fn(&mut C, &[u8], &mut Reply) -> Result<(), CommandError>;

/// Number of distinct command codes (the full byte range).
pub const COMMAND_CODES: usize = 256;

// ---------------------------------------------------------------------------
// Built-in command codes
// ---------------------------------------------------------------------------

/// Reserved command codes of the built-in command set.
///
/// Code `0` marks the control cell idle and is never dispatched. Codes above
/// [`Command::SpiEnd`] are free for custom commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    Idle = 0,
    PinMode = 1,
    DigitalWrite = 2,
    DigitalRead = 3,
    AnalogReference = 4,
    AnalogWrite = 5,
    AnalogRead = 6,
    ServoAttach = 7,
    ServoDetach = 8,
    ServoWrite = 9,
    ServoRead = 10,
    I2cBegin = 11,
    I2cEnd = 12,
    I2cSetClock = 13,
    I2cWrite = 14,
    I2cRead = 15,
    SpiBegin = 16,
    SpiSettings = 17,
    SpiTransfer = 18,
    SpiEnd = 19,
}

impl Command {
    /// Every reserved command, in code order.
    pub const ALL: [Command; 20] = [
        Command::Idle,
        Command::PinMode,
        Command::DigitalWrite,
        Command::DigitalRead,
        Command::AnalogReference,
        Command::AnalogWrite,
        Command::AnalogRead,
        Command::ServoAttach,
        Command::ServoDetach,
        Command::ServoWrite,
        Command::ServoRead,
        Command::I2cBegin,
        Command::I2cEnd,
        Command::I2cSetClock,
        Command::I2cWrite,
        Command::I2cRead,
        Command::SpiBegin,
        Command::SpiSettings,
        Command::SpiTransfer,
        Command::SpiEnd,
    ];

    /// Wire value of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.code()
    }
}

impl TryFrom<u8> for Command {
    type Error = CommandError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Command::ALL
            .get(code as usize)
            .copied()
            .ok_or(CommandError::UnknownCommand(code))
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Destructure exactly `N` argument bytes.
///
/// ```ignore
/// let [pin, mode] = expect_args(args)?;
/// ```
///
/// # Errors
/// [`CommandError::ArityMismatch`] if `args.len() != N`.
pub fn expect_args<const N: usize>(args: &[u8]) -> Result<[u8; N], CommandError> {
    args.try_into().map_err(|_| CommandError::ArityMismatch {
        expected: N,
        actual: args.len(),
    })
}

/// Require at least `min` argument bytes (variadic commands).
///
/// # Errors
/// [`CommandError::ArityMismatch`] if `args.len() < min`.
pub fn expect_min_args(args: &[u8], min: usize) -> Result<(), CommandError> {
    if args.len() < min {
        return Err(CommandError::ArityMismatch {
            expected: min,
            actual: args.len(),
        });
    }
    Ok(())
}

/// Append result bytes to a reply.
///
/// # Errors
/// [`CommandError::PayloadOverflow`] if the reply would exceed 255 bytes.
pub fn reply_with(reply: &mut Reply, bytes: &[u8]) -> Result<(), CommandError> {
    reply
        .extend_from_slice(bytes)
        .map_err(|_| CommandError::PayloadOverflow)
}

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// Handler table covering every command code.
///
/// Codes without a handler resolve to `None`; the dispatcher treats them as
/// a no-op with zero results. Attaching to a code replaces whatever was
/// there before.
pub struct CommandTable<C> {
    handlers: [Option<Handler<C>>; COMMAND_CODES],
}

impl<C> CommandTable<C> {
    /// An empty table: every code is a no-op.
    pub const fn new() -> Self {
        Self {
            handlers: [None; COMMAND_CODES],
        }
    }

    /// Bind `handler` to `code`, returning the handler it replaced.
    ///
    /// Accepts either a raw byte or a [`Command`].
    pub fn attach(&mut self, code: impl Into<u8>, handler: Handler<C>) -> Option<Handler<C>> {
        self.handlers[code.into() as usize].replace(handler)
    }

    /// Remove the handler for `code`, returning it.
    pub fn detach(&mut self, code: impl Into<u8>) -> Option<Handler<C>> {
        self.handlers[code.into() as usize].take()
    }

    /// Handler bound to `code`, if any.
    pub fn get(&self, code: u8) -> Option<Handler<C>> {
        self.handlers[code as usize]
    }

    /// `true` if a handler is bound to `code`.
    pub fn is_attached(&self, code: impl Into<u8>) -> bool {
        self.handlers[code.into() as usize].is_some()
    }

    /// Number of codes with a handler bound.
    pub fn attached_count(&self) -> usize {
        self.handlers.iter().filter(|h| h.is_some()).count()
    }
}

impl<C> Default for CommandTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for CommandTable<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers,
        }
    }
}

impl<C> fmt::Debug for CommandTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("attached", &self.attached_count())
            .finish()
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
