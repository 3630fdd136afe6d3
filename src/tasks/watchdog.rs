//! Watchdog timer tasks
//!
//! Timers run in a minimal non-blocking context: on expiry they only
//! post events to the worker queue, never touching the bus or the link
//! state directly.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Ticker, Timer};

use crate::config;
use crate::tasks::worker::{self, Event};

/// Arm/re-arm signal for the transmit watchdog
static TX_WATCHDOG: Signal<CriticalSectionRawMutex, Instant> = Signal::new();

/// (Re)arm the transmit watchdog; called whenever a transmission
/// becomes pending.
pub fn arm(deadline: Instant) {
    TX_WATCHDOG.signal(deadline);
}

/// Transmit watchdog task.
///
/// Sleeps until the armed deadline, re-arming whenever a new one is
/// signalled. On expiry it posts the deadline it fired for; the worker
/// validates it against the current link state, so a stale expiry that
/// raced a re-arm is ignored there.
pub async fn tx_watchdog_task() {
    loop {
        let mut deadline = TX_WATCHDOG.wait().await;
        loop {
            match select(Timer::at(deadline), TX_WATCHDOG.wait()).await {
                Either::First(()) => {
                    worker::enqueue(Event::TxTimeout(deadline)).await;
                    break;
                }
                Either::Second(rearmed) => deadline = rearmed,
            }
        }
    }
}

/// Bus-health watchdog task.
///
/// Ticks on a fixed short period; the worker decides whether a recovery
/// is due. The ticker never stops, so a failed recovery is retried on
/// the next tick.
pub async fn health_watchdog_task() {
    let mut ticker = Ticker::every(config::link::HEALTH_WD_PERIOD);
    loop {
        ticker.next().await;
        worker::enqueue(Event::HealthTick).await;
    }
}
