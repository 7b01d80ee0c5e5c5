//! Header sniffing for files that failed to open.
//!
//! When the footer of a supposed ORC file cannot be parsed, the leading bytes
//! tell apart "an ORC file with a broken footer" from "not an ORC file at all"
//! (a text file, a SequenceFile, an RCFile, ...). This runs only on the error
//! path; it re-opens the file.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::container::postscript::MAGIC;
use crate::error::Result;

/// Long enough to hold the longest header we may be confused with:
/// `SEQ-org.apache.hadoop.hive.ql.io.RCFile` plus its version byte.
pub const HEADER_PROBE_LEN: usize = 40;

/// Raw leading bytes of a file, kept for error reports.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct HeaderBytes(Vec<u8>);

impl HeaderBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for HeaderBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for HeaderBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeaderBytes({:?} / 0x{})", self.to_string(), self.to_hex())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDiagnosis {
    pub looks_like_orc: bool,
    pub header: HeaderBytes,
}

/// Classify a file prefix. Bytes past [`HEADER_PROBE_LEN`] are ignored.
pub fn classify(prefix: &[u8]) -> FormatDiagnosis {
    let prefix = &prefix[..prefix.len().min(HEADER_PROBE_LEN)];
    FormatDiagnosis {
        looks_like_orc: prefix.starts_with(MAGIC),
        header: HeaderBytes::new(prefix),
    }
}

/// Read up to [`HEADER_PROBE_LEN`] leading bytes of `path` and classify them.
pub fn diagnose(path: &Path) -> Result<FormatDiagnosis> {
    let f = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_PROBE_LEN);
    f.take(HEADER_PROBE_LEN as u64).read_to_end(&mut header)?;
    Ok(classify(&header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orc_magic_is_recognised() {
        let d = classify(b"ORC\x00\x01garbage-footer");
        assert!(d.looks_like_orc);
        assert_eq!(d.header.as_bytes(), b"ORC\x00\x01garbage-footer");
    }

    #[test]
    fn rcfile_header_is_not_orc() {
        let header = b"SEQ\x06org.apache.hadoop.hive.ql.io.RCFile$KeyBuffer";
        let d = classify(header);
        assert!(!d.looks_like_orc);
        assert_eq!(d.header.as_bytes().len(), HEADER_PROBE_LEN);
        assert!(d.header.to_string().starts_with("SEQ"));
    }

    #[test]
    fn short_inputs_are_classified_as_is() {
        assert!(!classify(b"").looks_like_orc);
        assert!(!classify(b"OR").looks_like_orc);
        assert!(classify(b"ORC").looks_like_orc);
        assert!(!classify(b"orc").looks_like_orc);
    }

    #[test]
    fn header_renders_hex_for_binary_junk() {
        let h = HeaderBytes::new(vec![0xff, 0x00, b'A']);
        assert_eq!(h.to_hex(), "ff0041");
        assert!(format!("{h:?}").contains("0xff0041"));
    }

    #[test]
    fn diagnose_reads_at_most_the_probe() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.txt");
        std::fs::write(&short, b"hello").unwrap();
        let d = diagnose(&short).unwrap();
        assert_eq!(d.header.as_bytes(), b"hello");

        let long = dir.path().join("long.orc");
        let mut bytes = MAGIC.to_vec();
        bytes.extend(std::iter::repeat_n(b'x', 100));
        std::fs::write(&long, &bytes).unwrap();
        let d = diagnose(&long).unwrap();
        assert!(d.looks_like_orc);
        assert_eq!(d.header.as_bytes().len(), HEADER_PROBE_LEN);
    }
}
