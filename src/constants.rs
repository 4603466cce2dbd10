//! Mercury Protocol Constants
//!
//! This module defines constants used by both Mercury wire variants, based
//! on the vendor documentation for the 206 and 230/236 meter families.

use std::time::Duration;

// ----------------------------------------------------------------------------
// M206 command codes (4-byte addressing, BCD registers)
// ----------------------------------------------------------------------------

/// Read instantaneous voltage / amperage / power
pub const M206_CMD_READ_VAP: u8 = 0x63;

/// Read the four tariff energy accumulators since the last reset
pub const M206_CMD_READ_ENERGY: u8 = 0x27;

/// Read auxiliary grid parameters (frequency)
pub const M206_CMD_READ_FREQ: u8 = 0x81;

// ----------------------------------------------------------------------------
// M236 command codes (1-byte addressing, byte-swapped binary registers)
// ----------------------------------------------------------------------------

/// Connection liveness probe
pub const M236_CMD_TEST_CONNECT: u8 = 0x00;

/// Open an authenticated exchange channel
pub const M236_CMD_OPEN_CHANNEL: u8 = 0x01;

/// Close the exchange channel
pub const M236_CMD_CLOSE_CHANNEL: u8 = 0x02;

/// Read active/reactive energy accumulators
pub const M236_CMD_READ_ENERGY: u8 = 0x05;

/// Read auxiliary parameters, sub-selected by two parameter bytes
pub const M236_CMD_READ_AUX: u8 = 0x08;

// First parameter byte of M236_CMD_READ_AUX: the auxiliary register group
pub const M236_AUX_GROUP: u8 = 0x16;

// Second parameter byte: which register set to read
pub const M236_AUX_POWER: u8 = 0x00;
pub const M236_AUX_VOLTAGE: u8 = 0x11;
pub const M236_AUX_CURRENT: u8 = 0x21;
pub const M236_AUX_FREQUENCY: u8 = 0x40;

// First parameter byte of M236_CMD_READ_ENERGY: the accumulator bank
pub const M236_ENERGY_SINCE_RESET: u8 = 0x00;
pub const M236_ENERGY_PER_PHASE: u8 = 0x60;

// ----------------------------------------------------------------------------
// M236 access levels
// ----------------------------------------------------------------------------

pub const M236_ACCESS_USER: u8 = 0x01;
pub const M236_ACCESS_ADMIN: u8 = 0x02;

/// Factory default password for the User level
pub const M236_DEFAULT_USER_PASSWORD: &str = "111111";

/// Factory default password for the Admin level
pub const M236_DEFAULT_ADMIN_PASSWORD: &str = "222222";

/// Highest bus address reachable through the serial-number derivation rule
pub const M236_MAX_BUS_ADDRESS: u32 = 240;

// ----------------------------------------------------------------------------
// Transport defaults
// ----------------------------------------------------------------------------

/// Default TCP port of an RS485-to-TCP gateway
pub const DEFAULT_GATEWAY_PORT: u16 = 50;

/// Poll interval re-armed by the link until a response burst arrives
pub const READ_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Receive buffer size; no Mercury response comes close to this
pub const READ_BUFFER_SIZE: usize = 1024;
