//! # mercury-rs - A Rust Crate for Mercury Energy Meter Communication
//!
//! The mercury-rs crate talks to Mercury electricity meters over the
//! proprietary vendor protocol, in both of its incompatible wire variants:
//! the simple read-only 206 framing and the session-based, authenticated
//! 236 framing. Meters usually sit on an RS485 bus behind an RS485-to-TCP
//! gateway; a directly attached serial adapter works as well.
//!
//! ## Features
//!
//! - Request framing with Modbus CRC-16 and per-variant address widths
//! - BCD (206) and byte-swapped binary (236) register decoding through a
//!   single base-parameterized digitizer
//! - Stateless 206 reads: voltage/amperage/power, frequency, tariff energy
//! - 236 sessions: connect check, authenticated channel open/close,
//!   per-phase readings, and energy by accumulator bank and tariff
//! - TCP and serial links, plus a mock link for hardware-free tests
//! - Responses addressed to other meters on the bus are dropped silently
//!   and surface as `None`, never as an error
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mercury-rs = "0.1"
//! ```
//!
//! ```rust,no_run
//! use mercury_rs::{connect_tcp, Mercury206Client};
//!
//! # async fn demo() -> Result<(), mercury_rs::MercuryError> {
//! let link = connect_tcp("192.168.1.50:50").await?;
//! let mut meter = Mercury206Client::new(link);
//! if let Some(reading) = meter.read_vap(10925856).await? {
//!     println!("U={} V, I={} A, P={} W", reading.voltage, reading.amperage, reading.power);
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod mercury;
pub mod report;
pub mod util;

pub use crate::error::MercuryError;
pub use crate::report::Report;

// Core codec types
pub use mercury::frame::{AddressWidth, FrameCodec, MeterAddress};

// Link transports
pub use mercury::link::{MeterLink, SerialLink, TcpLink};
pub use mercury::link_mock::MockLink;

// Per-variant drivers
pub use mercury::m206::{Mercury206Client, PowerReading};
pub use mercury::m236::{
    derive_bus_address, AccessLevel, EnergyRegister, Mercury236Client, SessionState,
};

/// Connects to an RS485-to-TCP gateway.
///
/// # Arguments
/// * `addr` - Gateway socket address, e.g. "192.168.1.50:50"
///
/// # Returns
/// * `Ok(TcpLink)` - Connected link ready for a driver
/// * `Err(MercuryError)` - Connection failed
pub async fn connect_tcp(addr: &str) -> Result<TcpLink, MercuryError> {
    TcpLink::connect(addr).await
}

/// Opens a directly attached RS485 serial adapter.
///
/// # Arguments
/// * `path` - Serial device path (e.g., "/dev/ttyUSB0")
/// * `baudrate` - Line speed, 8N1 framing
///
/// # Returns
/// * `Ok(SerialLink)` - Open link ready for a driver
/// * `Err(MercuryError)` - Opening the device failed
pub fn open_serial(path: &str, baudrate: u32) -> Result<SerialLink, MercuryError> {
    SerialLink::open(path, baudrate)
}
