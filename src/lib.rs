//! Command dispatch over a Modbus holding-register file.
//!
//! A host (typically a PC) drives a microcontroller's pins, servos and
//! I2C/SPI buses by writing requests into 16-bit holding registers and
//! reading results back from the same registers. This crate is the device
//! side of that protocol:
//!
//! - [`codec`] packs byte payloads into big-endian register cells and
//!   encodes the `[code | count]` control word.
//! - [`Dispatcher`] polls the register file, decodes pending requests,
//!   runs the handler attached to the command code and publishes the result.
//! - [`handlers`] provides the built-in commands 1–19, operating on a
//!   [`Device`] that owns a [`Board`] implementation and `embedded-hal`
//!   I2C/SPI buses.
//! - [`host`] implements the host half of the rendezvous, for host-side
//!   tooling and tests.
//!
//! The serial transport, Modbus framing and CRC are out of scope: the
//! transport only has to implement [`RegisterFile`].
//!
//! # Quick Start
//!
//! ```ignore
//! use modmata::{Device, Dispatcher, HoldingRegisters};
//!
//! let device = Device::new(MyBoard::new(p), i2c, spi);
//! let mut dispatcher = Dispatcher::with_builtin_commands(HoldingRegisters::new(), device);
//!
//! loop {
//!     transport.sync(dispatcher.registers_mut());
//!     dispatcher.run_once();
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`** — structured logging via [`defmt`](https://docs.rs/defmt).
//! - **`task`** — [`dispatch_task`], an Embassy loop serving requests from
//!   a dispatcher shared behind a mutex.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod codec;
pub mod command;
pub mod config;
#[cfg(feature = "task")]
pub mod dispatch_task;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod host;
pub mod registers;
pub mod servo;

#[cfg(test)]
mod testing;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use board::{BitOrder, Board, Device, Level, PinMode, SpiSettings};
pub use codec::{ControlWord, Payload};
pub use command::{Command, CommandTable, Handler, Reply};
pub use config::DispatchConfig;
#[cfg(feature = "task")]
pub use dispatch_task::dispatch_task;
pub use dispatcher::{Completion, Dispatcher};
pub use error::{CodecError, CommandError, HostError, ServoError};
pub use handlers::builtin_table;
pub use registers::{HoldingRegisters, RegisterFile};
