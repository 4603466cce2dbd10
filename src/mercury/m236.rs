//! # Mercury 236 Driver
//!
//! Session-oriented driver for the three-phase 230/236 family: a channel
//! must be opened with an access level and password before metered reads,
//! and closed afterwards. Addresses are single bus bytes derived from the
//! serial number; registers are plain binary with per-field byte swaps,
//! decoded through the base-16 digitizer.
//!
//! The client tracks the channel in an explicit [`SessionState`] but does
//! not refuse out-of-session reads: the meter is the authority on the
//! wire, and a read issued on a closed channel simply gets whatever the
//! device sends back, or nothing.

use crate::constants::{
    M236_ACCESS_ADMIN, M236_ACCESS_USER, M236_AUX_CURRENT, M236_AUX_FREQUENCY, M236_AUX_GROUP,
    M236_AUX_POWER, M236_AUX_VOLTAGE, M236_CMD_CLOSE_CHANNEL, M236_CMD_OPEN_CHANNEL,
    M236_CMD_READ_AUX, M236_CMD_READ_ENERGY, M236_CMD_TEST_CONNECT, M236_DEFAULT_ADMIN_PASSWORD,
    M236_DEFAULT_USER_PASSWORD, M236_ENERGY_PER_PHASE, M236_ENERGY_SINCE_RESET,
    M236_MAX_BUS_ADDRESS,
};
use crate::error::MercuryError;
use crate::mercury::digits::digitize;
use crate::mercury::frame::{expect_payload, AddressWidth, FrameCodec, MeterAddress};
use crate::mercury::link::{exchange, MeterLink};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Privilege tier of a 236 session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    User,
    Admin,
}

impl AccessLevel {
    /// Wire code carried in the open-channel request.
    pub fn code(self) -> u8 {
        match self {
            AccessLevel::User => M236_ACCESS_USER,
            AccessLevel::Admin => M236_ACCESS_ADMIN,
        }
    }

    /// Factory default password for the level.
    pub fn default_password(self) -> &'static str {
        match self {
            AccessLevel::User => M236_DEFAULT_USER_PASSWORD,
            AccessLevel::Admin => M236_DEFAULT_ADMIN_PASSWORD,
        }
    }
}

/// Exchange-channel state as tracked by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open(AccessLevel),
}

/// Which accumulator bank an energy read addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyRegister {
    /// Totals since the last reset: A+, A-, R+, R-.
    SinceReset,
    /// Per-phase forward active energy: A+_F1..A+_F3.
    PerPhase,
}

impl EnergyRegister {
    /// First parameter byte of the energy command.
    pub fn code(self) -> u8 {
        match self {
            EnergyRegister::SinceReset => M236_ENERGY_SINCE_RESET,
            EnergyRegister::PerPhase => M236_ENERGY_PER_PHASE,
        }
    }

    fn labels(self) -> &'static [&'static str] {
        match self {
            EnergyRegister::SinceReset => &["A+", "A-", "R+", "R-"],
            EnergyRegister::PerPhase => &["A+_F1", "A+_F2", "A+_F3"],
        }
    }
}

/// Default bus address of a meter, derived from its serial number.
///
/// The vendor rule: the address is the last three digits of the serial
/// number, or the last two when the last three exceed 240; all-zero last
/// digits map to address 1.
pub fn derive_bus_address(serial: u32) -> u8 {
    let mut address = serial % 1000;
    if address == 0 {
        address = 1;
    } else if address > M236_MAX_BUS_ADDRESS {
        address %= 100;
    }
    address as u8
}

/// Client for the 236 wire variant.
pub struct Mercury236Client<L: MeterLink> {
    link: L,
    codec: FrameCodec,
    session: SessionState,
}

impl<L: MeterLink> Mercury236Client<L> {
    pub fn new(link: L) -> Self {
        Mercury236Client {
            link,
            codec: FrameCodec::new(AddressWidth::Single),
            session: SessionState::Closed,
        }
    }

    /// Channel state as last observed by this client.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Releases the underlying link.
    pub fn into_link(self) -> L {
        self.link
    }

    async fn request(
        &mut self,
        address: u8,
        command: u8,
        params: &[u8],
        password: Option<&str>,
    ) -> Result<Option<Vec<u8>>, MercuryError> {
        exchange(
            &mut self.link,
            &self.codec,
            &MeterAddress::from(address),
            command,
            params,
            password,
        )
        .await
    }

    fn warn_if_closed(&self, what: &str) {
        if self.session == SessionState::Closed {
            warn!("{what} issued with no open channel; the meter may ignore it");
        }
    }

    /// Probes the meter (command 0x00). True when it answered; no session
    /// state changes.
    pub async fn check_connect(&mut self, address: u8) -> Result<bool, MercuryError> {
        let reply = self
            .request(address, M236_CMD_TEST_CONNECT, &[], None)
            .await?;
        Ok(reply.is_some())
    }

    /// Opens an exchange channel at `level` (command 0x01), falling back
    /// to the level's factory password when none is given. The session
    /// becomes `Open` only when the meter acknowledges; on silence it
    /// stays `Closed`.
    pub async fn open_channel(
        &mut self,
        address: u8,
        level: AccessLevel,
        password: Option<&str>,
    ) -> Result<SessionState, MercuryError> {
        let password = password.unwrap_or_else(|| level.default_password());
        let reply = self
            .request(address, M236_CMD_OPEN_CHANNEL, &[level.code()], Some(password))
            .await?;
        self.session = match reply {
            Some(_) => SessionState::Open(level),
            None => SessionState::Closed,
        };
        debug!("meter {address}: open channel -> {:?}", self.session);
        Ok(self.session)
    }

    /// Closes the exchange channel (command 0x02). The session is
    /// considered closed whether or not the meter acknowledges.
    pub async fn close_channel(&mut self, address: u8) -> Result<SessionState, MercuryError> {
        let _ = self
            .request(address, M236_CMD_CLOSE_CHANNEL, &[], None)
            .await?;
        self.session = SessionState::Closed;
        debug!("meter {address}: channel closed");
        Ok(self.session)
    }

    /// Reads phase voltages, power registers and phase currents as three
    /// command-0x08 requests. Keys: `V_F1..V_F3`, `Psum`, `P_F1..P_F3`,
    /// `A_F1..A_F3`. A silent sub-request makes the whole call `None`.
    pub async fn read_vap(
        &mut self,
        address: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.warn_if_closed("voltage/power/current read");
        let mut result = BTreeMap::new();

        let Some(volts) = self
            .request(address, M236_CMD_READ_AUX, &[M236_AUX_GROUP, M236_AUX_VOLTAGE], None)
            .await?
        else {
            return Ok(None);
        };
        expect_payload(&volts, 9, "phase voltages")?;
        for (i, field) in volts.chunks(3).take(3).enumerate() {
            let value = digitize(&[field[0], field[2], field[1]], 16)? as f64 / 100.0;
            result.insert(format!("V_F{}", i + 1), value);
        }

        let Some(power) = self
            .request(address, M236_CMD_READ_AUX, &[M236_AUX_GROUP, M236_AUX_POWER], None)
            .await?
        else {
            return Ok(None);
        };
        expect_payload(&power, 12, "power registers")?;
        for (label, field) in ["Psum", "P_F1", "P_F2", "P_F3"].iter().zip(power.chunks(3)) {
            // The leading byte carries direction flags, not digits.
            let value = digitize(&[field[2], field[1]], 16)? as f64 / 100.0;
            result.insert((*label).to_string(), value);
        }

        let Some(amps) = self
            .request(address, M236_CMD_READ_AUX, &[M236_AUX_GROUP, M236_AUX_CURRENT], None)
            .await?
        else {
            return Ok(None);
        };
        expect_payload(&amps, 9, "phase currents")?;
        for (i, field) in amps.chunks(3).take(3).enumerate() {
            let value = digitize(&[field[0], field[2], field[1]], 16)? as f64 / 1000.0;
            result.insert(format!("A_F{}", i + 1), value);
        }

        Ok(Some(result))
    }

    /// Reads the grid frequency (command 0x08, register 0x40), in hertz.
    pub async fn read_freq(&mut self, address: u8) -> Result<Option<f64>, MercuryError> {
        self.warn_if_closed("frequency read");
        let Some(data) = self
            .request(address, M236_CMD_READ_AUX, &[M236_AUX_GROUP, M236_AUX_FREQUENCY], None)
            .await?
        else {
            return Ok(None);
        };
        expect_payload(&data, 3, "frequency")?;
        Ok(Some(digitize(&[data[0], data[2], data[1]], 16)? as f64 / 100.0))
    }

    /// Reads one accumulator bank (command 0x05) for `tariff` (0 = the
    /// tariff sum, 1..=4 a single tariff), in kWh/kvarh. Each field is 4
    /// payload bytes in swapped word order.
    ///
    /// Reverse active energy (`A-…`) is always reported as 0: the meters
    /// never accumulate it meaningfully and the vendor tooling blanks the
    /// field.
    pub async fn read_energy(
        &mut self,
        address: u8,
        register: EnergyRegister,
        tariff: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.warn_if_closed("energy read");
        let Some(data) = self
            .request(address, M236_CMD_READ_ENERGY, &[register.code(), tariff], None)
            .await?
        else {
            return Ok(None);
        };
        let labels = register.labels();
        expect_payload(&data, labels.len() * 4, "energy registers")?;
        let suffix = if tariff == 0 {
            "sum".to_string()
        } else {
            format!("_T{tariff}")
        };

        let mut result = BTreeMap::new();
        for (label, field) in labels.iter().zip(data.chunks(4)) {
            let mut value =
                digitize(&[field[1], field[0], field[3], field[2]], 16)? as f64 / 1000.0;
            if label.starts_with("A-") {
                value = 0.0;
            }
            result.insert(format!("{label}{suffix}"), value);
        }
        Ok(Some(result))
    }

    /// Energy totals since the last reset, summed over tariffs.
    pub async fn read_energy_totals(
        &mut self,
        address: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.read_energy(address, EnergyRegister::SinceReset, 0).await
    }

    /// Energy since the last reset, tariffs 1..=4 merged into one map.
    pub async fn read_energy_totals_by_tariff(
        &mut self,
        address: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.merge_tariffs(address, EnergyRegister::SinceReset).await
    }

    /// Per-phase forward active energy, summed over tariffs.
    pub async fn read_energy_phase_totals(
        &mut self,
        address: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.read_energy(address, EnergyRegister::PerPhase, 0).await
    }

    /// Per-phase forward active energy, tariffs 1..=4 merged into one map.
    pub async fn read_energy_phases_by_tariff(
        &mut self,
        address: u8,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        self.merge_tariffs(address, EnergyRegister::PerPhase).await
    }

    /// Tariff suffixes differ per call, so merged keys never collide.
    async fn merge_tariffs(
        &mut self,
        address: u8,
        register: EnergyRegister,
    ) -> Result<Option<BTreeMap<String, f64>>, MercuryError> {
        let mut merged = BTreeMap::new();
        for tariff in 1..=4 {
            let Some(part) = self.read_energy(address, register, tariff).await? else {
                return Ok(None);
            };
            merged.extend(part);
        }
        Ok(Some(merged))
    }
}
