//! TX/RX packet sessions and session lifecycle
//!
//! One packet is in flight at a time in either direction; the radio is
//! half-duplex and the reconciler (`do_work`) decides which. Transmit
//! sessions copy bytes out of the outbound queue but only consume them
//! when the completion interrupt arrives, so a cancelled or lost
//! transmission never loses stream data.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::bus::traits::RadioBus;
use crate::bus::transport::CommandBus;
use crate::config;
use crate::link::state::{LinkState, LinkStats};
use crate::link::LinkError;
use crate::power::PowerRail;
use crate::radio::commands::{self, fifo, state};
use crate::radio::configure::{self, ConfigSource};
use crate::radio::status::{ModemStatus, PartInfo};
use crate::stream::queues::StreamQueues;
use crate::tasks::watchdog;

/// Bring-up parameters
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub tx_channel: u8,
    pub rx_channel: u8,
    /// 0 = variable-length mode, else fixed packet size (max 64)
    pub package_size: u8,
    pub tx_wd_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tx_channel: config::link::CHANNEL,
            rx_channel: config::link::CHANNEL,
            package_size: config::link::PACKAGE_SIZE,
            tx_wd_timeout: config::link::TX_WD_TIMEOUT,
        }
    }
}

/// Link-layer session manager for one radio
pub struct Link<B, P, C> {
    pub(crate) bus: CommandBus<B>,
    pub(crate) power: P,
    pub(crate) source: C,
    pub(crate) stream: StreamQueues,
    pub(crate) part: PartInfo,
    /// Revision C2A takes a trailing byte on START_TX; resolved once here
    pub(crate) extended_tx_cmd: bool,
    pub(crate) modem: ModemStatus,
    pub(crate) state: LinkState,
}

impl<B, P, C> Link<B, P, C>
where
    B: RadioBus,
    P: PowerRail,
    C: ConfigSource,
{
    /// Power the radio, confirm its identity and replay the
    /// configuration table. The chip is left parked in sleep; call
    /// `startup` to begin moving data.
    pub async fn bring_up(
        bus: B,
        power: P,
        source: C,
        cfg: LinkConfig,
    ) -> Result<Self, LinkError> {
        if cfg.package_size as usize > config::chip::FIFO_SIZE {
            return Err(LinkError::InvalidLength);
        }

        let mut link = Self {
            bus: CommandBus::new(bus),
            power,
            source,
            stream: StreamQueues::new(),
            part: PartInfo::default(),
            extended_tx_cmd: false,
            modem: ModemStatus::default(),
            state: LinkState::new(
                cfg.tx_channel,
                cfg.rx_channel,
                cfg.package_size,
                cfg.tx_wd_timeout,
            ),
        };

        link.set_power(true).await;

        let part = match link.bus.part_info().await {
            Ok(part) => part,
            Err(err) => {
                link.set_power(false).await;
                return Err(err.into());
            }
        };
        log::info!(
            "{}: part 0x{:04x}, rev {}, rom {}",
            part.revision_name(),
            part.part,
            part.chip_rev,
            part.rom_id
        );
        if part.part != config::chip::PART_NUMBER {
            link.set_power(false).await;
            return Err(LinkError::WrongPart(part.part));
        }
        link.extended_tx_cmd = part.rom_id == config::chip::ROM_ID_REV_C2A;
        link.part = part;

        if let Err(err) = link.reconfigure().await {
            link.set_power(false).await;
            return Err(err.into());
        }
        if let Err(err) = link.bus.change_state(state::SLEEP).await {
            link.set_power(false).await;
            return Err(err.into());
        }

        Ok(link)
    }

    /// Toggle the rail only on the 0 <-> 1 reference transitions.
    pub(crate) async fn set_power(&mut self, on: bool) {
        let toggle_at = if on { 0 } else { 1 };
        if self.state.power_count == toggle_at {
            self.power.set_enabled(on).await;
        }
        self.state.power_count += if on { 1 } else { -1 };
        debug_assert!(self.state.power_count >= 0);
    }

    /// Replay the configuration table from scratch.
    ///
    /// Safe to re-run at any time; `configured` is only true after a
    /// complete successful replay.
    pub(crate) async fn reconfigure(&mut self) -> Result<(), configure::ConfigError> {
        self.state.configured = false;
        if self.state.power_count == 0 {
            self.set_power(true).await;
        }

        let table = self.source.table()?;
        configure::replay(&mut self.bus, table).await?;

        self.state.configured = true;
        self.bus.clear_cts_error();
        Ok(())
    }

    /// Load one packet into the radio and start transmitting it.
    ///
    /// The interrupt-status and FIFO-info fetches flush stale chip state
    /// before the FIFO write; their values are not consumed.
    pub(crate) async fn begin_tx(&mut self, channel: u8, data: &[u8]) -> Result<(), LinkError> {
        if data.len() > config::chip::FIFO_SIZE {
            return Err(LinkError::InvalidLength);
        }

        self.bus.interrupt_status(0, 0, 0).await?;
        self.bus.fifo_info(fifo::RESET_TX).await?;
        self.bus.write_tx_fifo(data).await?;
        self.bus
            .start_tx(
                channel,
                commands::TX_CONDITION,
                data.len() as u16,
                self.extended_tx_cmd,
            )
            .await?;
        Ok(())
    }

    /// Acknowledge the end of a transmit session.
    pub(crate) async fn end_tx(&mut self) -> Result<(), LinkError> {
        self.bus.interrupt_status(0, 0, 0).await?;
        Ok(())
    }

    /// Abort any in-flight transmission and park the radio.
    pub(crate) async fn cancel_tx(&mut self) -> Result<(), LinkError> {
        if self.state.tx_pending {
            let _ = self.end_tx().await;
            self.state.tx_pending = false;
            self.state.tx_pending_size = 0;
            self.state.tx_deadline = None;
            self.stream.set_clear_to_send(true);
            self.bus.change_state(state::SLEEP).await?;
        }
        Ok(())
    }

    /// Start one transmit session from the outbound queue, if warranted.
    ///
    /// In fixed mode nothing is sent until a full package is queued; in
    /// variable mode any pending byte goes out, length-prefixed. The
    /// copied count is recorded so the completion interrupt can advance
    /// the queue tail by exactly that much.
    pub(crate) async fn start_tx_xmit(&mut self) -> Result<(), LinkError> {
        if self.state.tx_stopped {
            return Ok(());
        }

        let pending = self.stream.tx_pending();
        if pending == 0 || pending < self.state.package_size as usize {
            return Ok(());
        }

        let chunk = pending.min(self.state.tx_capacity());

        let mut frame: Vec<u8, { config::chip::FIFO_SIZE }> = Vec::new();
        if self.state.package_size == 0 {
            let _ = frame.push(chunk as u8);
        }
        let start = frame.len();
        if frame.resize(start + chunk, 0).is_err() {
            return Err(LinkError::InvalidLength);
        }
        let copied = self.stream.tx_copy(&mut frame[start..]);
        debug_assert_eq!(copied, chunk);

        self.begin_tx(self.state.tx_channel, &frame).await?;

        self.state.tx_pending = true;
        self.state.rx_pending = false;
        self.state.tx_pending_size = chunk;
        self.stream.set_clear_to_send(false);

        let deadline = Instant::now() + self.state.tx_wd_timeout;
        self.state.tx_deadline = Some(deadline);
        watchdog::arm(deadline);

        Ok(())
    }

    /// Arm a receive session.
    ///
    /// The next-state table re-arms reception on every outcome, so the
    /// radio keeps listening whenever it is not transmitting.
    pub(crate) async fn begin_rx(&mut self, channel: u8, length: u16) -> Result<(), LinkError> {
        self.bus.interrupt_status(0, 0, 0).await?;
        self.bus.fifo_info(fifo::RESET_RX).await?;

        if self.state.rx_stopped {
            return Ok(());
        }

        self.bus
            .start_rx(channel, 0, length, state::RX, state::RX, state::RX)
            .await?;
        self.state.rx_pending = true;
        Ok(())
    }

    /// Drain a received packet out of the radio FIFO.
    pub(crate) async fn end_rx(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        self.bus.read_rx_fifo(buf).await?;
        Ok(())
    }

    /// Clear stale flags, mark the session connected and reconcile.
    pub async fn startup(&mut self) -> Result<(), LinkError> {
        self.state.tx_pending = false;
        self.state.tx_stopped = false;
        self.state.rx_stopped = false;
        self.state.connected = true;
        self.do_work().await
    }

    /// Mark the session disconnected and park the radio. Timer events
    /// arriving afterwards become no-ops.
    pub async fn shutdown(&mut self) -> Result<(), LinkError> {
        self.state.connected = false;
        self.bus.change_state(state::SLEEP).await?;
        Ok(())
    }

    /// Cancel any pending transmission and put the chip to sleep before
    /// the surrounding session suspends.
    pub async fn suspend(&mut self) -> Result<(), LinkError> {
        self.cancel_tx().await?;
        self.bus.change_state(state::SLEEP).await?;
        self.state.suspended = true;
        Ok(())
    }

    /// Leave suspend, clear stale stop flags and reconcile.
    pub async fn resume(&mut self) -> Result<(), LinkError> {
        self.state.suspended = false;
        self.state.rx_stopped = false;
        self.do_work().await
    }

    /// Allow transmissions again; caller must reconcile afterwards.
    pub fn resume_tx(&mut self) {
        self.state.tx_stopped = false;
    }

    /// Stop starting new transmissions (flow control from the host).
    pub fn stop_tx(&mut self) {
        self.state.tx_stopped = true;
    }

    /// Stop delivering received data and park the radio.
    pub async fn stop_rx(&mut self) -> Result<(), LinkError> {
        self.state.rx_stopped = true;
        self.bus.change_state(state::SLEEP).await?;
        self.state.rx_pending = false;
        Ok(())
    }

    pub fn set_package_size(&mut self, size: u8) -> Result<(), LinkError> {
        if size as usize > config::chip::FIFO_SIZE {
            return Err(LinkError::InvalidLength);
        }
        self.state.package_size = size;
        Ok(())
    }

    pub fn set_tx_channel(&mut self, channel: u8) {
        self.state.tx_channel = channel;
    }

    pub fn set_rx_channel(&mut self, channel: u8) {
        self.state.rx_channel = channel;
    }

    pub fn set_tx_timeout(&mut self, timeout: Duration) {
        self.state.tx_wd_timeout = timeout;
    }

    /// Latest RSSI sample
    pub fn rssi(&self) -> u8 {
        self.state.current_rssi
    }

    /// Last full modem status sample
    pub fn modem(&self) -> &ModemStatus {
        &self.modem
    }

    pub fn part_info(&self) -> &PartInfo {
        &self.part
    }

    /// True when no transmission is in flight
    pub fn tx_empty(&self) -> bool {
        !self.state.tx_pending
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    pub fn is_configured(&self) -> bool {
        self.state.configured
    }

    pub fn stats(&self) -> LinkStats {
        LinkStats {
            cts_error_count: self.bus.cts_error_count(),
            tx_error_count: self.state.tx_error_count,
            tx_bytes: self.state.tx_bytes,
            rx_bytes: self.state.rx_bytes,
            rx_overruns: self.state.rx_overruns,
        }
    }

    /// Byte-stream boundary, for the serial pumps
    pub fn stream(&self) -> &StreamQueues {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut StreamQueues {
        &mut self.stream
    }
}
