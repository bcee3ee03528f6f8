//! SPI bus commands.

use embedded_hal::spi::SpiBus;

use crate::board::{board_error, spi_mode, BitOrder, Board, Device, Level, SpiSettings};
use crate::command::{expect_args, expect_min_args, reply_with, Reply};
use crate::error::CommandError;

fn bus_error<E: embedded_hal::spi::Error>(error: E) -> CommandError {
    let kind = error.kind();
    #[cfg(feature = "defmt")]
    defmt::warn!("spi error: {}", kind);
    CommandError::Spi(kind)
}

/// `[]` → nothing. Also restores the default transfer settings.
pub fn spi_begin<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_args::<0>(args)?;
    dev.board.spi_begin().map_err(board_error)?;
    dev.spi_settings = SpiSettings::default();
    Ok(())
}

/// `[hz3, hz2, hz1, hz0, order, mode]` → nothing.
///
/// Settings are only stored here; they reach the peripheral at the start of
/// the next transfer.
pub fn spi_settings<B, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    let [hz3, hz2, hz1, hz0, order, mode] = expect_args(args)?;

    let speed_hz = u32::from_be_bytes([hz3, hz2, hz1, hz0]);
    if speed_hz == 0 {
        return Err(CommandError::InvalidArgument);
    }
    let settings = SpiSettings {
        speed_hz,
        bit_order: BitOrder::try_from(order)?,
        mode: spi_mode(mode)?,
    };

    #[cfg(feature = "defmt")]
    defmt::debug!("spi settings: {}", settings);

    dev.spi_settings = settings;
    Ok(())
}

/// `[cs_pin, data…]` → the bytes clocked in, one per byte sent.
///
/// Chip select is driven low around the transfer and always released, even
/// when the transfer fails.
pub fn spi_transfer<B: Board, I2C, SPI: SpiBus>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_min_args(args, 2)?;
    let (cs, data) = (args[0], &args[1..]);

    dev.board
        .spi_configure(&dev.spi_settings)
        .map_err(board_error)?;
    dev.board
        .digital_write(cs, Level::Low)
        .map_err(board_error)?;

    reply_with(reply, data)?;
    let transfer = dev
        .spi
        .transfer_in_place(&mut reply[..])
        .and_then(|()| dev.spi.flush())
        .map_err(bus_error);

    let release = dev
        .board
        .digital_write(cs, Level::High)
        .map_err(board_error);

    let result = transfer.and(release);
    if result.is_err() {
        reply.clear();
    }
    result
}

/// `[]` → nothing.
pub fn spi_end<B: Board, I2C, SPI>(
    dev: &mut Device<B, I2C, SPI>,
    args: &[u8],
    _reply: &mut Reply,
) -> Result<(), CommandError> {
    expect_args::<0>(args)?;
    dev.board.spi_end().map_err(board_error)
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DEFAULT_SPI_SPEED_HZ;
    use crate::codec::ControlWord;
    use crate::command::Command;
    use crate::host;
    use crate::registers::RegisterFile;
    use crate::testing::{mock_device, mock_dispatcher};
    use embedded_hal::spi::{ErrorKind, MODE_0, MODE_3};

    #[test]
    fn begin_restores_default_settings() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        spi_settings(&mut dev, &[0, 0x0F, 0x42, 0x40, 0, 3], &mut reply).unwrap();
        spi_begin(&mut dev, &[], &mut reply).unwrap();

        assert!(dev.board().spi_running);
        assert_eq!(*dev.spi_settings(), SpiSettings::default());
    }

    #[test]
    fn settings_decodes_speed_order_and_mode() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        // 1 MHz, LSB first, mode 3
        spi_settings(&mut dev, &[0x00, 0x0F, 0x42, 0x40, 0, 3], &mut reply).unwrap();

        let settings = dev.spi_settings();
        assert_eq!(settings.speed_hz, 1_000_000);
        assert_eq!(settings.bit_order, BitOrder::LsbFirst);
        assert_eq!(settings.mode, MODE_3);
        // Nothing reaches the peripheral until the next transfer.
        assert!(dev.board().spi_configured.is_empty());
    }

    #[test]
    fn invalid_settings_leave_previous_ones() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        let rejected: [&[u8]; 4] = [
            &[0, 0x0F, 0x42, 0x40, 2, 0],
            &[0, 0x0F, 0x42, 0x40, 1, 4],
            &[0, 0, 0, 0, 1, 0],
            &[0, 0x0F, 0x42, 0x40, 1],
        ];
        for args in rejected {
            assert!(spi_settings(&mut dev, args, &mut reply).is_err());
        }

        assert_eq!(dev.spi_settings().speed_hz, DEFAULT_SPI_SPEED_HZ);
        assert_eq!(dev.spi_settings().mode, MODE_0);
    }

    #[test]
    fn transfer_frames_chip_select_and_returns_clocked_in_bytes() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        spi_transfer(&mut dev, &[10, 0x9F, 0x00, 0x00], &mut reply).unwrap();

        // Mock peripheral answers with the complement of each byte.
        assert_eq!(&reply[..], &[0x60, 0xFF, 0xFF]);
        assert_eq!(dev.spi().sent, vec![0x9F, 0x00, 0x00]);
        assert_eq!(dev.spi().flushes, 1);
        assert_eq!(
            dev.board().digital_writes,
            vec![(10, Level::Low), (10, Level::High)]
        );
        assert_eq!(dev.board().spi_configured, vec![SpiSettings::default()]);
    }

    #[test]
    fn transfer_needs_data_after_chip_select() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        assert!(spi_transfer(&mut dev, &[10], &mut reply).is_err());
        assert!(dev.board().digital_writes.is_empty());
        assert!(dev.spi().sent.is_empty());
    }

    #[test]
    fn failed_transfer_still_releases_chip_select() {
        let mut dev = mock_device();
        dev.spi.broken = true;
        let mut reply = Reply::new();

        assert_eq!(
            spi_transfer(&mut dev, &[10, 0x01], &mut reply),
            Err(CommandError::Spi(ErrorKind::Other))
        );
        assert!(reply.is_empty());
        assert_eq!(
            dev.board().digital_writes,
            vec![(10, Level::Low), (10, Level::High)]
        );
    }

    #[test]
    fn end_stops_bus() {
        let mut dev = mock_device();
        let mut reply = Reply::new();
        spi_begin(&mut dev, &[], &mut reply).unwrap();
        spi_end(&mut dev, &[], &mut reply).unwrap();
        assert!(!dev.board().spi_running);
    }

    // ── Through the register file ────────────────────────────────────

    #[test]
    fn transfer_cycle_uses_latest_settings() {
        let mut d = mock_dispatcher();

        host::submit(
            d.registers_mut(),
            Command::SpiSettings.code(),
            &[0x00, 0x1E, 0x84, 0x80, 1, 0],
        )
        .unwrap();
        assert_eq!(d.run_once().unwrap().result_count, 0);

        host::submit(
            d.registers_mut(),
            Command::SpiTransfer.code(),
            &[8, 0xAA, 0x55],
        )
        .unwrap();
        let completion = d.run_once().unwrap();

        assert_eq!(completion.result_count, 2);
        assert_eq!(d.registers().control(), ControlWord::response(2));
        assert_eq!(&host::collect(d.registers()).unwrap()[..], &[0x55, 0xAA]);
        assert_eq!(d.context().board().spi_configured[0].speed_hz, 2_000_000);
    }
}
