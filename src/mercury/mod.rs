//! The mercury module contains the components responsible for the core
//! Mercury protocol implementation: checksum, digit decoding, the frame
//! codec, link transports and the per-variant drivers.

pub mod crc;
pub mod digits;
pub mod frame;
pub mod link;
pub mod link_mock;
pub mod m206;
pub mod m236;

pub use frame::{AddressWidth, FrameCodec, MeterAddress};
pub use link::{MeterLink, SerialLink, TcpLink};
pub use m206::{Mercury206Client, PowerReading};
pub use m236::{derive_bus_address, AccessLevel, EnergyRegister, Mercury236Client, SessionState};
