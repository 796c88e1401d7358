//! Error types surfaced across the crate's construction boundary.
//!
//! Fatal protocol violations (writes to ROM, illegal PPU reads) are not part of this
//! taxonomy: they are unrecoverable and `panic!` at the point of violation, after being
//! logged at `error!`.

use thiserror::Error;

/// Failure to parse or accept an iNES cartridge image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("file is too short to contain an iNES header")]
    TooShort,

    #[error("file is not in iNES file format")]
    BadMagic,

    #[error("NES 2.0 format is not supported")]
    Nes2NotSupported,

    #[error("iNES header declares {expected} bytes of PRG/CHR data but the file has {actual}")]
    Truncated { expected: usize, actual: usize },
}
