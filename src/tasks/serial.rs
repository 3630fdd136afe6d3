//! Byte-stream pump tasks
//!
//! Bridge any `embedded_io_async` serial endpoint onto the link queues.
//! These tasks are the byte-stream collaborator's side of the boundary:
//! they lock the link only long enough to move bytes, never across a bus
//! operation.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_io_async::{Read, Write};

use crate::bus::traits::RadioBus;
use crate::power::PowerRail;
use crate::radio::configure::ConfigSource;
use crate::tasks::worker::{self, Event, SharedLink};

/// Received data was flushed into the inbound queue
static INBOUND_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Space opened up in the outbound queue
static OUTBOUND_SPACE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Flush notification for the inbound consumer.
pub fn inbound_ready() {
    INBOUND_READY.signal(());
}

/// Wake a writer blocked on a full outbound queue.
pub fn outbound_space() {
    OUTBOUND_SPACE.signal(());
}

/// Task that feeds host bytes into the outbound queue.
///
/// Applies backpressure by waiting for queue space instead of dropping;
/// every accepted chunk kicks the reconciler.
pub async fn outbound_pump_task<R, B, P, C>(mut reader: R, link: &'static SharedLink<B, P, C>)
where
    R: Read,
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    let mut buf = [0u8; 64];

    loop {
        let count = match reader.read(&mut buf).await {
            Ok(0) => continue,
            Ok(count) => count,
            Err(_) => {
                embassy_time::Timer::after_millis(10).await;
                continue;
            }
        };

        let mut written = 0;
        while written < count {
            let accepted = link
                .lock()
                .await
                .stream_mut()
                .accept(&buf[written..count]);
            written += accepted;

            if accepted > 0 {
                worker::enqueue(Event::Kick).await;
            }
            if written < count {
                OUTBOUND_SPACE.wait().await;
            }
        }
    }
}

/// Task that drains the inbound queue to the host.
pub async fn inbound_pump_task<W, B, P, C>(mut writer: W, link: &'static SharedLink<B, P, C>)
where
    W: Write,
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    let mut buf = [0u8; 64];

    loop {
        INBOUND_READY.wait().await;

        loop {
            let count = link.lock().await.stream_mut().rx_read(&mut buf);
            if count == 0 {
                break;
            }
            if writer.write_all(&buf[..count]).await.is_err() {
                break;
            }
        }
        let _ = writer.flush().await;
    }
}
