//! # Mercury Frame Codec
//!
//! Builds request frames and splits response frames for both wire
//! variants. A request is laid out as
//!
//! ```text
//! [address bytes][command][param bytes...][password digit bytes...][CRC16 lo, hi]
//! ```
//!
//! and a response as `[address bytes][payload bytes...]`. The two variants
//! differ only in the fixed address width: the 206 family addresses meters
//! by their full serial number in 4 big-endian bytes, the 236 family by a
//! 1-byte bus address.
//!
//! Inbound frames are not CRC-checked: the meters do append a checksum to
//! their responses, but the exchange discards it by never decoding past
//! the fields it wants. `unpack` keeps that behavior and returns the raw
//! remainder, trailing CRC included.

use crate::error::MercuryError;
use crate::mercury::crc::crc16;
use bytes::{BufMut, BytesMut};
use nom::bytes::complete::take;

/// Fixed address-prefix width of a framing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    /// Four-byte big-endian addresses (206: the serial number itself).
    Quad,
    /// Single-byte bus addresses (236: derived from the serial number).
    Single,
}

impl AddressWidth {
    /// Width in bytes.
    pub fn len(self) -> usize {
        match self {
            AddressWidth::Quad => 4,
            AddressWidth::Single => 1,
        }
    }
}

/// A meter address prior to wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeterAddress {
    /// Numeric network address, rendered big-endian at the codec width.
    Value(u32),
    /// Raw address bytes, at most the codec width, left-zero-padded.
    Raw(Vec<u8>),
}

impl From<u32> for MeterAddress {
    fn from(value: u32) -> Self {
        MeterAddress::Value(value)
    }
}

impl From<u8> for MeterAddress {
    fn from(value: u8) -> Self {
        MeterAddress::Value(u32::from(value))
    }
}

/// Packs requests and splits responses at a fixed address width.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    width: AddressWidth,
}

impl FrameCodec {
    pub const fn new(width: AddressWidth) -> Self {
        FrameCodec { width }
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Normalizes an address to exactly `width` big-endian bytes.
    fn address_bytes(&self, address: &MeterAddress) -> Result<Vec<u8>, MercuryError> {
        let width = self.width.len();
        match address {
            MeterAddress::Value(value) => {
                let be = value.to_be_bytes();
                let (lead, tail) = be.split_at(be.len() - width);
                if lead.iter().any(|&b| b != 0) {
                    return Err(MercuryError::Address(format!(
                        "address {value} does not fit in {width} byte(s)"
                    )));
                }
                Ok(tail.to_vec())
            }
            MeterAddress::Raw(bytes) => {
                if bytes.len() > width {
                    return Err(MercuryError::Address(format!(
                        "address length {} exceeds {width} byte(s)",
                        bytes.len()
                    )));
                }
                let mut out = vec![0u8; width - bytes.len()];
                out.extend_from_slice(bytes);
                Ok(out)
            }
        }
    }

    /// Builds a request frame: address, command, parameter bytes, password
    /// digits when given, and the CRC16 unless suppressed.
    ///
    /// Every password character is sent as one byte holding its decimal
    /// value, so "222222" travels as six 0x02 bytes.
    pub fn pack(
        &self,
        address: &MeterAddress,
        command: u8,
        params: &[u8],
        password: Option<&str>,
        with_crc: bool,
    ) -> Result<Vec<u8>, MercuryError> {
        let mut body = BytesMut::with_capacity(self.width.len() + 1 + params.len() + 8);
        body.put_slice(&self.address_bytes(address)?);
        body.put_u8(command);
        body.put_slice(params);
        if let Some(password) = password {
            for ch in password.chars() {
                let digit = ch.to_digit(10).ok_or_else(|| {
                    MercuryError::Password(format!("'{ch}' is not a decimal digit"))
                })?;
                body.put_u8(digit as u8);
            }
        }
        if with_crc {
            let crc = crc16(&body);
            body.put_slice(&crc);
        }
        Ok(body.to_vec())
    }

    /// Splits a response into the echoed address and the remaining payload
    /// bytes. Responses shorter than the address prefix are malformed.
    pub fn unpack(&self, raw: &[u8]) -> Result<(u64, Vec<u8>), MercuryError> {
        let parsed: nom::IResult<&[u8], &[u8]> = take(self.width.len())(raw);
        let (payload, prefix) = parsed.map_err(|_| {
            MercuryError::Frame(format!(
                "response of {} byte(s) is shorter than the {}-byte address prefix",
                raw.len(),
                self.width.len()
            ))
        })?;
        let mut address = 0u64;
        for &b in prefix {
            address = address << 8 | u64::from(b);
        }
        Ok((address, payload.to_vec()))
    }
}

/// Fails with a frame error when `payload` is shorter than the smallest
/// complete answer for the field group being decoded.
pub(crate) fn expect_payload(payload: &[u8], min: usize, what: &str) -> Result<(), MercuryError> {
    if payload.len() < min {
        return Err(MercuryError::Frame(format!(
            "{what}: payload of {} byte(s), expected at least {min}",
            payload.len()
        )));
    }
    Ok(())
}
