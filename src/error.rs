//! # Mercury Error Handling
//!
//! This module defines the MercuryError enum, which represents the different
//! error types that can occur in the mercury-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the Mercury crate.
#[derive(Debug, Error)]
pub enum MercuryError {
    /// Indicates a meter address that failed validation at pack time
    /// (wrong width or numeric overflow).
    #[error("Invalid meter address: {0}")]
    Address(String),

    /// Indicates a response that could not be split into address and
    /// payload, or a payload too short for the fields being decoded.
    #[error("Error parsing Mercury frame: {0}")]
    Frame(String),

    /// Indicates the digit decoder received a numeral invalid in the
    /// requested base (for base 10: a register byte with a hex nibble).
    #[error("Invalid base-{base} numeral \"{digits}\"")]
    Format { digits: String, base: u32 },

    /// Indicates a socket- or serial-level failure propagated from the link.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Indicates a session password containing a non-decimal character.
    #[error("Invalid password: {0}")]
    Password(String),
}
