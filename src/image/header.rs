//! P5 header encode/decode, and the wire form broadcast to every worker
//! during distributed image I/O.

use crate::error::{AppError, Result};
use std::io::BufRead;

pub struct PgmHeader {
    pub width: usize,
    pub height: usize,
    pub maxval: u8,
}

impl PgmHeader {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, maxval: 1 }
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("P5\n{} {}\n{}\n", self.width, self.height, self.maxval).into_bytes()
    }

    /// Parses a header from the front of `reader`, returning it along with
    /// the byte offset its pixel data starts at.
    pub fn parse<R: BufRead>(mut reader: R) -> Result<(PgmHeader, u64)> {
        let mut offset = 0u64;

        let mut magic = String::new();
        offset += reader.read_line(&mut magic)? as u64;
        if magic.trim_end() != "P5" {
            return Err(AppError::Configuration(format!("not a P5 PGM file: {magic:?}")));
        }

        let mut dims = String::new();
        offset += reader.read_line(&mut dims)? as u64;
        let mut parts = dims.split_whitespace();
        let width: usize = parts
            .next()
            .ok_or_else(|| AppError::Configuration("missing PGM width".into()))?
            .parse()
            .map_err(|_| AppError::Configuration("invalid PGM width".into()))?;
        let height: usize = parts
            .next()
            .ok_or_else(|| AppError::Configuration("missing PGM height".into()))?
            .parse()
            .map_err(|_| AppError::Configuration("invalid PGM height".into()))?;

        let mut maxval_line = String::new();
        offset += reader.read_line(&mut maxval_line)? as u64;
        let maxval: u8 = maxval_line
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration("invalid PGM maxval".into()))?;

        Ok((PgmHeader { width, height, maxval }, offset))
    }
}

/// The header fields a worker needs to compute its own byte offsets,
/// packed for `Communicator::broadcast`.
pub struct GlobalHeaderInfo {
    pub width: usize,
    pub height: usize,
    pub maxval: u8,
    pub data_offset: u64,
}

const ENCODED_LEN: usize = 8 + 8 + 1 + 8;

impl GlobalHeaderInfo {
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ENCODED_LEN);
        bytes.extend_from_slice(&(self.width as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.height as u64).to_le_bytes());
        bytes.push(self.maxval);
        bytes.extend_from_slice(&self.data_offset.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENCODED_LEN {
            return Err(AppError::Transport("malformed PGM header broadcast".into()));
        }
        let width = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        let height = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
        let maxval = bytes[16];
        let data_offset = u64::from_le_bytes(bytes[17..25].try_into().unwrap());
        Ok(Self { width, height, maxval, data_offset })
    }
}
