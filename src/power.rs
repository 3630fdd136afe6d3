//! Power rail collaborator
//!
//! A single enable/disable line; reference counting lives in the link
//! layer so nested users of the rail compose.

use core::future::Future;

use embassy_time::Timer;
use embedded_hal::digital::OutputPin;

use crate::config;

/// Control over the radio's power/shutdown line
pub trait PowerRail {
    fn set_enabled(&mut self, on: bool) -> impl Future<Output = ()>;
}

/// Power rail driven by a shutdown GPIO
pub struct GpioPowerRail<P> {
    pin: P,
}

impl<P: OutputPin> GpioPowerRail<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> PowerRail for GpioPowerRail<P> {
    async fn set_enabled(&mut self, on: bool) {
        // Drop the line first in either direction; enabling then raises
        // it after the chip has had time to settle out of shutdown.
        let _ = self.pin.set_low();
        if on {
            Timer::after(config::power::SETTLE_DELAY).await;
            let _ = self.pin.set_high();
            Timer::after(config::power::SETTLE_DELAY).await;
        }
    }
}
