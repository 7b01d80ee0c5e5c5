use crate::codec::CompressionKind;
use crate::error::{DwrfError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

pub const MAGIC: &[u8; 3] = b"ORC";
pub const HEADER_LEN: u64 = MAGIC.len() as u64;
pub const VERSION: u16 = 1;
/// footer_len (8) + compression (1) + version (2) + footer blake3 (32) + magic (3)
pub const POSTSCRIPT_LEN: usize = 46;

/// Fixed-size trailer that locates the footer. The file's final byte holds
/// the postscript length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostScript {
    pub footer_len: u64,
    pub compression: CompressionKind,
    pub version: u16,
    /// blake3 of the footer bytes as stored (after compression)
    pub footer_blake3: [u8; 32],
}

impl PostScript {
    pub fn write_to(&self, mut w: impl Write) -> std::io::Result<()> {
        w.write_all(&self.footer_len.to_le_bytes())?;
        w.write_all(&[self.compression as u8])?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.footer_blake3)?;
        w.write_all(MAGIC)?;
        w.write_all(&[POSTSCRIPT_LEN as u8])?;
        Ok(())
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() != POSTSCRIPT_LEN {
            return Err(DwrfError::Format(format!(
                "postscript is {} bytes, expected {POSTSCRIPT_LEN}",
                buf.len()
            )));
        }
        if &buf[POSTSCRIPT_LEN - MAGIC.len()..] != MAGIC {
            return Err(DwrfError::Format("postscript magic mismatch".into()));
        }
        let mut le64 = [0u8; 8];
        le64.copy_from_slice(&buf[0..8]);
        let footer_len = u64::from_le_bytes(le64);
        let compression = CompressionKind::try_from(buf[8])?;
        let version = u16::from_le_bytes([buf[9], buf[10]]);
        if version > VERSION {
            return Err(DwrfError::Format(format!(
                "file version {version} is newer than supported {VERSION}"
            )));
        }
        let mut footer_blake3 = [0u8; 32];
        footer_blake3.copy_from_slice(&buf[11..43]);
        Ok(Self {
            footer_len,
            compression,
            version,
            footer_blake3,
        })
    }

    /// Locate and parse the postscript from the end of a file of `file_len` bytes.
    pub fn read_at_eof<F: Read + Seek>(f: &mut F, file_len: u64) -> Result<Self> {
        if file_len < HEADER_LEN + 1 {
            return Err(DwrfError::Format(format!(
                "file of {file_len} bytes is too small"
            )));
        }
        f.seek(SeekFrom::Start(file_len - 1))?;
        let mut len = [0u8; 1];
        f.read_exact(&mut len)?;
        let ps_len = len[0] as u64;
        if HEADER_LEN + ps_len + 1 > file_len {
            return Err(DwrfError::Format(format!(
                "postscript length {ps_len} out of range for file of {file_len} bytes"
            )));
        }
        if ps_len as usize != POSTSCRIPT_LEN {
            return Err(DwrfError::Format(format!(
                "unexpected postscript length {ps_len}"
            )));
        }
        f.seek(SeekFrom::Start(file_len - 1 - ps_len))?;
        let mut buf = [0u8; POSTSCRIPT_LEN];
        f.read_exact(&mut buf)?;
        Self::parse(&buf)
    }
}
