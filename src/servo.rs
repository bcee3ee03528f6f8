//! Servo attachment bookkeeping.
//!
//! Tracks which pins have a servo attached and the last angle written to
//! each, so `servo read` can answer without touching hardware and `servo
//! attach` can enforce the slot limit of the PWM timer.

use crate::error::ServoError;

/// Pins `0..SERVO_PIN_COUNT` can drive a servo.
pub const SERVO_PIN_COUNT: usize = 14;

/// Servos that can be attached at the same time.
pub const MAX_SERVOS: usize = 12;

/// Largest accepted angle; writes above it are clamped.
pub const MAX_ANGLE: u8 = 180;

/// Angle reported after attach and before the first write (1500 µs pulse).
pub const DEFAULT_ANGLE: u8 = 90;

/// Per-pin servo state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoBank {
    /// `Some(angle)` when a servo is attached to the pin.
    angles: [Option<u8>; SERVO_PIN_COUNT],
    attached: usize,
}

impl Default for ServoBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoBank {
    pub const fn new() -> Self {
        Self {
            angles: [None; SERVO_PIN_COUNT],
            attached: 0,
        }
    }

    /// Check that `pin` could be attached without changing any state.
    ///
    /// Re-attaching a pin that already has a servo always succeeds and
    /// does not consume another slot.
    pub fn check_attach(&self, pin: u8) -> Result<(), ServoError> {
        match self.slot(pin)? {
            Some(_) => Ok(()),
            None if self.attached < MAX_SERVOS => Ok(()),
            None => Err(ServoError::NoFreeSlot),
        }
    }

    /// Record a servo on `pin`.
    pub fn attach(&mut self, pin: u8) -> Result<(), ServoError> {
        self.check_attach(pin)?;
        let slot = &mut self.angles[pin as usize];
        if slot.is_none() {
            *slot = Some(DEFAULT_ANGLE);
            self.attached += 1;
        }
        Ok(())
    }

    /// Forget the servo on `pin`.
    pub fn detach(&mut self, pin: u8) -> Result<(), ServoError> {
        self.slot(pin)?.ok_or(ServoError::NotAttached)?;
        self.angles[pin as usize] = None;
        self.attached -= 1;
        Ok(())
    }

    /// Record a new angle, clamped to [`MAX_ANGLE`]. Returns the stored angle.
    pub fn write(&mut self, pin: u8, angle: u8) -> Result<u8, ServoError> {
        self.slot(pin)?.ok_or(ServoError::NotAttached)?;
        let angle = angle.min(MAX_ANGLE);
        self.angles[pin as usize] = Some(angle);
        Ok(angle)
    }

    /// Last angle written to the servo on `pin`.
    pub fn read(&self, pin: u8) -> Result<u8, ServoError> {
        self.slot(pin)?.ok_or(ServoError::NotAttached)
    }

    pub fn is_attached(&self, pin: u8) -> bool {
        matches!(self.slot(pin), Ok(Some(_)))
    }

    /// Number of attached servos.
    pub fn attached_count(&self) -> usize {
        self.attached
    }

    fn slot(&self, pin: u8) -> Result<Option<u8>, ServoError> {
        self.angles
            .get(pin as usize)
            .copied()
            .ok_or(ServoError::PinOutOfRange)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
