//! # Mercury 206 Driver
//!
//! Stateless driver for the single-phase 206 family: every read is a
//! self-contained request/response addressed by the meter's serial number
//! (4 big-endian bytes). Registers are BCD-encoded, so payload fields go
//! through the base-10 digitizer.
//!
//! A response addressed to a different meter on the shared bus yields
//! `Ok(None)`; the caller decides whether to retry or give up.

use crate::constants::{M206_CMD_READ_ENERGY, M206_CMD_READ_FREQ, M206_CMD_READ_VAP};
use crate::error::MercuryError;
use crate::mercury::digits::digitize;
use crate::mercury::frame::{expect_payload, AddressWidth, FrameCodec, MeterAddress};
use crate::mercury::link::{exchange, MeterLink};
use log::debug;
use std::collections::BTreeMap;

/// Instantaneous line readings returned by [`Mercury206Client::read_vap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    /// Line voltage, volts.
    pub voltage: f64,
    /// Line current, amperes.
    pub amperage: f64,
    /// Active power, watts.
    pub power: f64,
}

/// Client for the 206 wire variant.
pub struct Mercury206Client<L: MeterLink> {
    link: L,
    codec: FrameCodec,
}

impl<L: MeterLink> Mercury206Client<L> {
    pub fn new(link: L) -> Self {
        Mercury206Client {
            link,
            codec: FrameCodec::new(AddressWidth::Quad),
        }
    }

    /// Releases the underlying link.
    pub fn into_link(self) -> L {
        self.link
    }

    async fn request(
        &mut self,
        address: u32,
        command: u8,
    ) -> Result<Option<Vec<u8>>, MercuryError> {
        exchange(
            &mut self.link,
            &self.codec,
            &MeterAddress::Value(address),
            command,
            &[],
            None,
        )
        .await
    }

    /// Reads instantaneous voltage, amperage and active power
    /// (command 0x63).
    pub async fn read_vap(&mut self, address: u32) -> Result<Option<PowerReading>, MercuryError> {
        let Some(data) = self.request(address, M206_CMD_READ_VAP).await? else {
            return Ok(None);
        };
        expect_payload(&data, 8, "voltage/amperage/power")?;
        let reading = PowerReading {
            voltage: digitize(&data[1..3], 10)? as f64 / 10.0,
            amperage: digitize(&data[3..5], 10)? as f64 / 100.0,
            power: digitize(&data[5..8], 10)? as f64,
        };
        debug!("meter {address}: {reading:?}");
        Ok(Some(reading))
    }

    /// Reads the four tariff accumulators since the last reset
    /// (command 0x27), in kWh. The map also carries the total under
    /// "A+sum", rounded to two decimals.
    pub async fn read_energy(
        &mut self,
        address: u32,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        let Some(data) = self.request(address, M206_CMD_READ_ENERGY).await? else {
            return Ok(None);
        };
        expect_payload(&data, 17, "energy accumulators")?;

        let mut result = BTreeMap::new();
        for tariff in 0..4 {
            let start = tariff * 4 + 1;
            let value = digitize(&data[start..start + 4], 10)? as f64 / 100.0;
            result.insert(format!("A+_T{}", tariff + 1), value);
        }
        let sum: f64 = result.values().sum();
        result.insert("A+sum".to_string(), (sum * 100.0).round() / 100.0);
        Ok(Some(result))
    }

    /// Reads the grid frequency (command 0x81), in hertz.
    pub async fn read_freq(&mut self, address: u32) -> Result<Option<f64>, MercuryError> {
        let Some(data) = self.request(address, M206_CMD_READ_FREQ).await? else {
            return Ok(None);
        };
        expect_payload(&data, 3, "frequency")?;
        Ok(Some(digitize(&data[1..3], 10)? as f64 / 100.0))
    }
}
