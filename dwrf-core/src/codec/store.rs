use super::{CompressionKind, Compressor};
use crate::error::Result;

/// Streams stored as-is.
pub struct Passthrough;

impl Compressor for Passthrough {
    fn kind(&self) -> CompressionKind {
        CompressionKind::None
    }

    fn compress(&self, raw: &[u8], _level: i32) -> Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn inflate(&self, stored: &[u8]) -> Result<Vec<u8>> {
        Ok(stored.to_vec())
    }
}
