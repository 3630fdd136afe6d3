//! Operator interface
//!
//! Tunable parameters and lifecycle requests arriving from outside the
//! worker context. Each write takes the link lock, applies the change
//! and kicks the reconciler so the new value takes effect immediately.

use embassy_time::Duration;

use crate::bus::traits::RadioBus;
use crate::link::{LinkError, LinkStats};
use crate::power::PowerRail;
use crate::radio::configure::ConfigSource;
use crate::tasks::worker::{self, Event, SharedLink};

/// Set the package size (0 = variable-length mode, max 64).
pub async fn set_package_size<B, P, C>(
    link: &SharedLink<B, P, C>,
    size: u8,
) -> Result<(), LinkError>
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.set_package_size(size)?;
    worker::enqueue(Event::Kick).await;
    Ok(())
}

/// Set the channel used for the next transmission.
pub async fn set_tx_channel<B, P, C>(link: &SharedLink<B, P, C>, channel: u8)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.set_tx_channel(channel);
    worker::enqueue(Event::Kick).await;
}

/// Set the receive channel.
pub async fn set_rx_channel<B, P, C>(link: &SharedLink<B, P, C>, channel: u8)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.set_rx_channel(channel);
    worker::enqueue(Event::Kick).await;
}

/// Set the transmit watchdog timeout, applied on the next transmission.
pub async fn set_tx_timeout<B, P, C>(link: &SharedLink<B, P, C>, timeout: Duration)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.set_tx_timeout(timeout);
    worker::enqueue(Event::Kick).await;
}

/// Latest RSSI sample measured by the chip.
pub async fn current_rssi<B, P, C>(link: &SharedLink<B, P, C>) -> u8
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.rssi()
}

/// Diagnostic counters.
pub async fn stats<B, P, C>(link: &SharedLink<B, P, C>) -> LinkStats
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.stats()
}

/// Resume transmissions after a host-side flow stop.
pub async fn start_tx<B, P, C>(link: &SharedLink<B, P, C>)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.resume_tx();
    worker::enqueue(Event::Kick).await;
}

/// Stop starting new transmissions.
pub async fn stop_tx<B, P, C>(link: &SharedLink<B, P, C>)
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.stop_tx();
}

/// Stop delivering received data and park the radio.
pub async fn stop_rx<B, P, C>(link: &SharedLink<B, P, C>) -> Result<(), LinkError>
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    link.lock().await.stop_rx().await
}
