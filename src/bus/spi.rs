//! embedded-hal SPI implementation of the radio bus
//!
//! Uses the `SpiBus` trait with manual NSS control so one chip-select
//! cycle can carry a command byte followed by an in-cycle reply read.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiBus;

use crate::bus::traits::{BusError, RadioBus};

/// SPI transport to the Si4455 with a dedicated NSS line
pub struct SpiRadioBus<Spi, Nss> {
    spi: Spi,
    nss: Nss,
}

impl<Spi, Nss> SpiRadioBus<Spi, Nss>
where
    Spi: SpiBus,
    Nss: OutputPin,
{
    pub fn new(spi: Spi, nss: Nss) -> Self {
        Self { spi, nss }
    }
}

impl<Spi, Nss> RadioBus for SpiRadioBus<Spi, Nss>
where
    Spi: SpiBus,
    Nss: OutputPin,
{
    async fn write(&mut self, frame: &[u8]) -> Result<(), BusError> {
        let _ = self.nss.set_low();

        self.spi.write(frame).await.map_err(|_| BusError::Io)?;
        self.spi.flush().await.map_err(|_| BusError::Io)?;

        let _ = self.nss.set_high();

        Ok(())
    }

    async fn read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let _ = self.nss.set_low();

        self.spi.write(&[cmd]).await.map_err(|_| BusError::Io)?;
        self.spi.read(buf).await.map_err(|_| BusError::Io)?;
        self.spi.flush().await.map_err(|_| BusError::Io)?;

        let _ = self.nss.set_high();

        Ok(())
    }
}
