//! Deferred work queue and the single worker context
//!
//! Every bus operation blocks (busy-wait polling, settle sleeps) and is
//! therefore confined to this worker. The hardware notification handler
//! and the timer tasks never touch the bus; they post events here, and
//! the worker runs the dispatcher and reconciler under the link mutex.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;
use embedded_hal_async::digital::Wait;

use crate::bus::traits::RadioBus;
use crate::config;
use crate::link::session::Link;
use crate::power::PowerRail;
use crate::radio::configure::ConfigSource;

/// Work items consumed by the worker task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Run the reconciler (new data, flow-control or parameter change)
    Kick,
    /// The radio raised its interrupt line
    Interrupt,
    /// Transmit watchdog expired for the given deadline
    TxTimeout(Instant),
    /// Bus-health watchdog tick
    HealthTick,
}

/// The one lock guarding the link; held across every bus operation
pub type SharedLink<B, P, C> = Mutex<CriticalSectionRawMutex, Link<B, P, C>>;

/// Queue feeding the worker task
pub static WORK_QUEUE: Channel<CriticalSectionRawMutex, Event, { config::tasks::WORK_QUEUE_DEPTH }> =
    Channel::new();

/// Post an event to the worker.
pub async fn enqueue(event: Event) {
    WORK_QUEUE.send(event).await;
}

/// Task that owns all bus I/O and link-state mutation.
///
/// The dispatcher runs under the lock; when it reports work, the lock is
/// released and re-acquired for the reconciler.
pub async fn worker_task<B, P, C>(link: &'static SharedLink<B, P, C>)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    loop {
        let event = WORK_QUEUE.receive().await;

        let work = match event {
            Event::Kick => true,
            Event::Interrupt => link.lock().await.handle_interrupt().await,
            Event::TxTimeout(deadline) => link.lock().await.handle_tx_timeout(deadline).await,
            Event::HealthTick => link.lock().await.handle_health_tick().await,
        };

        if work {
            if let Err(err) = link.lock().await.do_work().await {
                log::error!("reconcile failed: {:?}", err);
            }
        }
    }
}

/// Task that forwards the radio's active-low interrupt line into the
/// work queue.
pub async fn irq_task<W: Wait>(mut irq: W) {
    loop {
        if irq.wait_for_low().await.is_err() {
            embassy_time::Timer::after_millis(10).await;
            continue;
        }
        enqueue(Event::Interrupt).await;
        // Wait out the level so one event is posted per assertion
        let _ = irq.wait_for_high().await;
    }
}
