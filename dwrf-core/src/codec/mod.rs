use crate::error::{DwrfError, Result};
use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionKind {
    None = 0,
    #[default]
    Zstd = 1,
}

impl TryFrom<u8> for CompressionKind {
    type Error = DwrfError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(CompressionKind::None),
            1 => Ok(CompressionKind::Zstd),
            other => Err(DwrfError::Format(format!("unknown compression kind {other}"))),
        }
    }
}

impl std::str::FromStr for CompressionKind {
    type Err = DwrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionKind::None),
            "zstd" => Ok(CompressionKind::Zstd),
            other => Err(DwrfError::Config {
                key: "compression".into(),
                reason: format!("unknown codec {other:?}"),
            }),
        }
    }
}

pub trait Compressor: Send + Sync {
    fn kind(&self) -> CompressionKind;
    fn compress(&self, raw: &[u8], level: i32) -> Result<Vec<u8>>;
    fn inflate(&self, stored: &[u8]) -> Result<Vec<u8>>;
}

pub mod store;
pub mod zstdc;

pub fn compressor_for(kind: CompressionKind) -> &'static dyn Compressor {
    match kind {
        CompressionKind::None => &store::Passthrough,
        CompressionKind::Zstd => &zstdc::ZstdCompressor,
    }
}

/// Compress a whole buffer.
pub fn compress(kind: CompressionKind, raw: &[u8], level: i32) -> Result<Vec<u8>> {
    compressor_for(kind).compress(raw, level)
}

pub fn inflate(kind: CompressionKind, stored: &[u8]) -> Result<Vec<u8>> {
    compressor_for(kind).inflate(stored)
}

/// Decompress a whole buffer, checking it inflates to `raw_len` bytes.
pub fn decompress(kind: CompressionKind, stored: &[u8], raw_len: u64) -> Result<Vec<u8>> {
    let codec = compressor_for(kind);
    let out = codec.inflate(stored)?;
    let n = out.len() as u64;
    if n != raw_len {
        return Err(DwrfError::Codec(format!(
            "{:?} stream inflated to {n} bytes, expected {raw_len}",
            codec.kind()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zstd_shrinks_repetitive_data() {
        let raw = b"stripe".repeat(1000);
        let stored = compress(CompressionKind::Zstd, &raw, 3).unwrap();
        assert!(stored.len() < raw.len());
        assert_eq!(
            decompress(CompressionKind::Zstd, &stored, raw.len() as u64).unwrap(),
            raw
        );
    }

    #[test]
    fn length_mismatch_is_a_codec_error() {
        let stored = compress(CompressionKind::None, b"abc", 0).unwrap();
        let err = decompress(CompressionKind::None, &stored, 4).unwrap_err();
        assert!(matches!(err, DwrfError::Codec(_)));
    }

    #[test]
    fn garbage_zstd_frame_is_structural() {
        let err = decompress(CompressionKind::Zstd, b"definitely not zstd", 10).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn every_kind_has_its_own_compressor() {
        for kind in [CompressionKind::None, CompressionKind::Zstd] {
            assert_eq!(compressor_for(kind).kind(), kind);
        }
    }

    #[test]
    fn mismatch_names_the_codec() {
        let stored = compress(CompressionKind::Zstd, b"abcdef", 3).unwrap();
        let err = decompress(CompressionKind::Zstd, &stored, 5).unwrap_err();
        assert!(err.to_string().contains("Zstd stream inflated to 6 bytes"));
    }

    #[test]
    fn kind_parses_from_config_strings() {
        assert_eq!("ZSTD".parse::<CompressionKind>().unwrap(), CompressionKind::Zstd);
        assert_eq!("none".parse::<CompressionKind>().unwrap(), CompressionKind::None);
        assert!("lz4".parse::<CompressionKind>().is_err());
        assert!(CompressionKind::try_from(9u8).is_err());
    }
}
