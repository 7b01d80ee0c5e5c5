use super::{CompressionKind, Compressor};
use crate::error::{DwrfError, Result};

/// One zstd frame per stream or footer.
pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn kind(&self) -> CompressionKind {
        CompressionKind::Zstd
    }

    fn compress(&self, raw: &[u8], level: i32) -> Result<Vec<u8>> {
        Ok(zstd::stream::encode_all(raw, level.max(1))?)
    }

    // A frame that fails to decode is a property of the file, not the disk.
    fn inflate(&self, stored: &[u8]) -> Result<Vec<u8>> {
        zstd::stream::decode_all(stored).map_err(|e| DwrfError::Codec(format!("zstd: {e}")))
    }
}
