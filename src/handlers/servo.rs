//! Servo commands.
//!
//! Attach, detach and write answer with a single status byte once their
//! argument count is right: `1` on success, `0` on any failure. Read answers
//! with the last written angle, or nothing if the pin has no servo.

use crate::board::{board_error, Board, Device};
use crate::command::{expect_args, reply_with, Reply};
use crate::error::CommandError;
use crate::servo::MAX_ANGLE;

const STATUS_OK: u8 = 1;
const STATUS_FAILED: u8 = 0;

fn reply_status(reply: &mut Reply, result: Result<(), CommandError>) -> Result<(), CommandError> {
    let status = match result {
        Ok(()) => STATUS_OK,
        Err(_error) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("servo command failed: {}", _error);
            STATUS_FAILED
        }
    };
    reply_with(reply, &[status])
}

/// `[pin]` → `[status]`.
pub fn servo_attach<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin] = expect_args(args)?;
    let result = attach(dev, pin);
    reply_status(reply, result)
}

/// `[pin]` → `[status]`.
pub fn servo_detach<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin] = expect_args(args)?;
    let result = detach(dev, pin);
    reply_status(reply, result)
}

/// `[pin, angle]` → `[status]`. Angles above 180 are clamped.
pub fn servo_write<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin, angle] = expect_args(args)?;
    let result = write(dev, pin, angle);
    reply_status(reply, result)
}

/// `[pin]` → `[angle]`, or nothing if no servo is attached to `pin`.
pub fn servo_read<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    let [pin] = expect_args(args)?;
    let angle = dev.servos.read(pin)?;
    reply_with(reply, &[angle])
}

fn attach<B: Board, I2C, SPI>(dev: &mut Device<B, I2C, SPI>, pin: u8) -> Result<(), CommandError> {
    dev.servos.check_attach(pin)?;
    dev.board.servo_attach(pin).map_err(board_error)?;
    dev.servos.attach(pin)?;
    Ok(())
}

fn detach<B: Board, I2C, SPI>(dev: &mut Device<B, I2C, SPI>, pin: u8) -> Result<(), CommandError> {
    // Fails with `NotAttached` before the board sees anything.
    dev.servos.read(pin)?;
    dev.board.servo_detach(pin).map_err(board_error)?;
    dev.servos.detach(pin)?;
    Ok(())
}

fn write<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    pin: u8,
    angle: u8,
) -> Result<(), CommandError> {
    dev.servos.read(pin)?;
    let angle = angle.min(MAX_ANGLE);
    dev.board.servo_write(pin, angle).map_err(board_error)?;
    dev.servos.write(pin, angle)?;
    Ok(())
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ControlWord;
    use crate::command::Command;
    use crate::host;
    use crate::registers::RegisterFile;
    use crate::servo::{DEFAULT_ANGLE, MAX_SERVOS};
    use crate::testing::{mock_device, mock_dispatcher};

    #[test]
    fn attach_reports_success_and_records_servo() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[9], &mut reply).unwrap();

        assert_eq!(&reply[..], &[1]);
        assert!(dev.servos().is_attached(9));
        assert_eq!(dev.board().servo_attached, vec![9]);
    }

    #[test]
    fn attach_out_of_range_pin_reports_failure() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[30], &mut reply).unwrap();

        assert_eq!(&reply[..], &[0]);
        assert!(dev.board().servo_attached.is_empty());
    }

    #[test]
    fn attach_beyond_slot_limit_reports_failure() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        for pin in 0..MAX_SERVOS as u8 {
            reply.clear();
            servo_attach(&mut dev, &[pin], &mut reply).unwrap();
            assert_eq!(&reply[..], &[1]);
        }

        reply.clear();
        servo_attach(&mut dev, &[13], &mut reply).unwrap();
        assert_eq!(&reply[..], &[0]);
        assert_eq!(dev.servos().attached_count(), MAX_SERVOS);
    }

    #[test]
    fn board_failure_leaves_servo_unattached() {
        let mut dev = mock_device();
        dev.board_mut().fail_servos = true;
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[4], &mut reply).unwrap();

        assert_eq!(&reply[..], &[0]);
        assert!(!dev.servos().is_attached(4));
    }

    #[test]
    fn detach_without_servo_reports_failure() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_detach(&mut dev, &[4], &mut reply).unwrap();

        assert_eq!(&reply[..], &[0]);
        assert!(dev.board().servo_detached.is_empty());
    }

    #[test]
    fn detach_after_attach_reports_success() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[4], &mut reply).unwrap();
        reply.clear();
        servo_detach(&mut dev, &[4], &mut reply).unwrap();

        assert_eq!(&reply[..], &[1]);
        assert!(!dev.servos().is_attached(4));
        assert_eq!(dev.board().servo_detached, vec![4]);
    }

    #[test]
    fn write_clamps_angle_before_reaching_board() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[6], &mut reply).unwrap();
        reply.clear();
        servo_write(&mut dev, &[6, 255], &mut reply).unwrap();

        assert_eq!(&reply[..], &[1]);
        assert_eq!(dev.board().servo_pulses, vec![(6, 180)]);
        assert_eq!(dev.servos().read(6), Ok(180));
    }

    #[test]
    fn read_without_servo_returns_nothing() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        assert!(servo_read(&mut dev, &[6], &mut reply).is_err());
        assert!(reply.is_empty());
    }

    #[test]
    fn read_after_attach_reports_default_angle() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        servo_attach(&mut dev, &[6], &mut reply).unwrap();
        reply.clear();
        servo_read(&mut dev, &[6], &mut reply).unwrap();
        assert_eq!(&reply[..], &[DEFAULT_ANGLE]);
    }

    #[test]
    fn wrong_arity_returns_nothing_not_a_status() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        assert!(servo_write(&mut dev, &[6], &mut reply).is_err());
        assert!(servo_attach(&mut dev, &[], &mut reply).is_err());
        assert!(reply.is_empty());
    }

    // ── Through the register file ────────────────────────────────────

    #[test]
    fn write_to_unattached_servo_cycle_returns_failure_status() {
        let mut d = mock_dispatcher();
        host::submit(d.registers_mut(), Command::ServoWrite.code(), &[5, 90]).unwrap();
        let completion = d.run_once().unwrap();

        assert_eq!(completion.result_count, 1);
        assert_eq!(d.registers().control(), ControlWord::response(1));
        assert_eq!(&host::collect(d.registers()).unwrap()[..], &[0]);
    }

    #[test]
    fn attach_write_read_cycle() {
        let mut d = mock_dispatcher();

        host::submit(d.registers_mut(), Command::ServoAttach.code(), &[5]).unwrap();
        d.run_once().unwrap();
        assert_eq!(&host::collect(d.registers()).unwrap()[..], &[1]);

        host::submit(d.registers_mut(), Command::ServoWrite.code(), &[5, 30]).unwrap();
        d.run_once().unwrap();
        assert_eq!(&host::collect(d.registers()).unwrap()[..], &[1]);

        host::submit(d.registers_mut(), Command::ServoRead.code(), &[5]).unwrap();
        d.run_once().unwrap();
        assert_eq!(&host::collect(d.registers()).unwrap()[..], &[30]);
    }
}
