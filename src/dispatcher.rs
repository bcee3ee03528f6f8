//! Request/response cycle over the register file.
//!
//! [`Dispatcher`] owns the command table and the hardware context, and
//! borrows nothing: the register file is handed to it at construction. One
//! call to [`process()`](Dispatcher::process) performs one full cycle:
//!
//! 1. Decode the control cell into `(code, argc)`.
//! 2. Read `ceil(argc / 2)` payload cells and unpack `argc` bytes.
//! 3. Look up and run the handler for `code`.
//! 4. Pack the result over the request payload, starting at cell 1.
//! 5. Write `(0, result_count)` to the control cell.
//!
//! Step 5 always happens, whatever the handler did. Any failure along the
//! way publishes zero results. Since the device never yields mid-cycle, the
//! host sees the switch from pending to idle as atomic.
//!
//! # Idle detection
//!
//! The control cell's high byte is the only state: nonzero means a request
//! is pending, zero means idle with the last result count in the low byte.
//! [`poll()`](Dispatcher::poll) drives the transport and reports pending;
//! [`run_once()`](Dispatcher::run_once) combines both calls with the guard.

use crate::codec::{self, cells_for, Cells, ControlWord, Payload};
use crate::command::{CommandTable, Handler, Reply};
use crate::error::CommandError;
use crate::registers::{RegisterFile, PAYLOAD_START};

/// What one cycle did, returned by [`Dispatcher::process`].
///
/// The host only ever observes `result_count`; `outcome` keeps the reason a
/// cycle produced nothing, which the register protocol cannot carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Completion {
    /// Command code of the consumed request.
    pub code: u8,
    /// Argument byte count of the consumed request.
    pub argument_count: u8,
    /// Result byte count published in the control cell.
    pub result_count: u8,
    /// `Ok` if the handler ran and its result was published.
    pub outcome: Result<(), CommandError>,
}

/// Command dispatcher bound to a register file and a hardware context.
///
/// # Example
///
/// ```ignore
/// let mut dispatcher = Dispatcher::new(registers, context);
/// dispatcher.attach(42u8, my_handler);
///
/// loop {
///     dispatcher.run_once();
/// }
/// ```
pub struct Dispatcher<R, C> {
    registers: R,
    context: C,
    table: CommandTable<C>,
    reply: Reply,
}

impl<R, C> Dispatcher<R, C>
where
    R: RegisterFile,
{
    /// Create a dispatcher with an empty command table.
    pub fn new(registers: R, context: C) -> Self {
        Self::with_table(registers, context, CommandTable::new())
    }

    /// Create a dispatcher with a prepared command table.
    pub fn with_table(registers: R, context: C, table: CommandTable<C>) -> Self {
        Self {
            registers,
            context,
            table,
            reply: Reply::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Command table
    // -----------------------------------------------------------------------

    /// Bind `handler` to `code`, replacing any previous handler.
    ///
    /// Every byte is a valid code. Attaching to `0` is accepted but never
    /// dispatched, because code `0` is the idle marker.
    pub fn attach(&mut self, code: impl Into<u8>, handler: Handler<C>) -> Option<Handler<C>> {
        self.table.attach(code, handler)
    }

    /// Remove the handler for `code`; the code becomes a no-op.
    pub fn detach(&mut self, code: impl Into<u8>) -> Option<Handler<C>> {
        self.table.detach(code)
    }

    pub fn table(&self) -> &CommandTable<C> {
        &self.table
    }

    // -----------------------------------------------------------------------
    // Cycle
    // -----------------------------------------------------------------------

    /// Drive the transport and report whether a request is pending.
    ///
    /// Must be called repeatedly from the device's main loop; the transport
    /// makes no progress otherwise.
    pub fn poll(&mut self) -> bool {
        let _received = self.registers.poll();
        let control = self.registers.control();

        #[cfg(feature = "defmt")]
        {
            if _received {
                defmt::trace!(
                    "transport data received, control={=u16:#x}",
                    control.encode()
                );
            }
        }

        control.is_pending()
    }

    /// Consume the pending request and publish its response.
    ///
    /// Returns `None` without touching the register file if the control
    /// cell is idle. Otherwise the control cell's high byte is `0` when
    /// this returns, whatever the handler did.
    pub fn process(&mut self) -> Option<Completion> {
        let request = self.registers.control();
        if !request.is_pending() {
            return None;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("request: code={} argc={}", request.code, request.count);

        let (result_count, outcome) = match self.execute(request) {
            Ok(count) => (count, Ok(())),
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("command {} produced no result: {}", request.code, error);
                (0, Err(error))
            }
        };

        self.registers.set_control(ControlWord::response(result_count));

        #[cfg(feature = "defmt")]
        defmt::trace!("completed: code={} results={}", request.code, result_count);

        Some(Completion {
            code: request.code,
            argument_count: request.count,
            result_count,
            outcome,
        })
    }

    /// [`poll()`](Self::poll), then [`process()`](Self::process) if a
    /// request is pending.
    pub fn run_once(&mut self) -> Option<Completion> {
        if self.poll() {
            self.process()
        } else {
            None
        }
    }

    /// Decode, dispatch and encode. Returns the published result count.
    fn execute(&mut self, request: ControlWord) -> Result<u8, CommandError> {
        let args = self.read_arguments(request.count as usize)?;
        let handler = self
            .table
            .get(request.code)
            .ok_or(CommandError::UnknownCommand(request.code))?;

        self.reply.clear();
        handler(&mut self.context, &args, &mut self.reply)?;

        self.write_results()
    }

    fn read_arguments(&self, argc: usize) -> Result<Payload, CommandError> {
        let needed = cells_for(argc);
        if needed > self.registers.payload_cells() {
            return Err(CommandError::PayloadOverflow);
        }

        let mut cells = Cells::new();
        for index in PAYLOAD_START..PAYLOAD_START + needed {
            cells
                .push(self.registers.get(index))
                .map_err(|_| CommandError::PayloadOverflow)?;
        }

        Ok(codec::unpack(&cells, argc)?)
    }

    fn write_results(&mut self) -> Result<u8, CommandError> {
        let cells = codec::pack(&self.reply)?;
        if cells.len() > self.registers.payload_cells() {
            return Err(CommandError::PayloadOverflow);
        }

        for (offset, &cell) in cells.iter().enumerate() {
            self.registers.set(PAYLOAD_START + offset, cell);
        }

        u8::try_from(self.reply.len()).map_err(|_| CommandError::PayloadOverflow)
    }
}

impl<R, C> Dispatcher<R, C> {
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Mutable access to the register file, e.g. for a transport binding
    /// that shares the dispatcher's loop.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Tear down, returning the register file and the hardware context.
    pub fn into_parts(self) -> (R, C) {
        (self.registers, self.context)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
