//! Periodic dispatch loop for Embassy firmware.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};

use crate::config::DispatchConfig;
use crate::dispatcher::Dispatcher;
use crate::registers::RegisterFile;

/// Poll the register file and serve requests forever.
///
/// This is a regular `async fn`, not an Embassy `#[task]`. Embassy tasks
/// cannot be generic, so callers wrap it in a concrete task:
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn modmata_task(
///     dispatcher: &'static Mutex<CriticalSectionRawMutex, MyDispatcher>,
/// ) {
///     dispatch_task(dispatcher, DispatchConfig::default()).await
/// }
/// ```
///
/// The mutex is held for exactly one poll-and-process cycle. Other tasks
/// may lock it between cycles to attach commands or reach the hardware
/// context; a request is never observed half-processed.
#[allow(clippy::needless_pass_by_value)] // config is small and consumed
pub async fn dispatch_task<R, C>(
    dispatcher: &'static Mutex<CriticalSectionRawMutex, Dispatcher<R, C>>,
    config: DispatchConfig,
) where
    R: RegisterFile,
{
    #[cfg(feature = "defmt")]
    defmt::info!("dispatch task started: {}", config);

    let period = Duration::from_micros(config.poll_period_us());

    loop {
        {
            let mut dispatcher = dispatcher.lock().await;
            dispatcher.run_once();
        } // ← mutex released

        Timer::after(period).await;
    }
}
