use crate::codec::{self, CompressionKind};
use crate::container::postscript::HEADER_LEN;
use crate::error::{DwrfError, Result};
use crate::types::TypeTree;
use serde::{Deserialize, Serialize};

/// One top-level column's data within a stripe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamInformation {
    pub column: u32,    // top-level column ordinal
    pub offset: u64,    // relative to the stripe start
    pub length: u64,    // stored bytes
    pub raw_length: u64, // bytes after decompression
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StripeInformation {
    /// Absolute file offset of the stripe's first byte.
    pub offset: u64,
    pub length: u64,
    pub rows: u64,
    pub streams: Vec<StreamInformation>,
}

impl StripeInformation {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterMeta {
    pub created: i64,
    pub writer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Footer {
    /// End of the stripe section (start of the footer).
    pub content_length: u64,
    pub types: TypeTree,
    pub stripes: Vec<StripeInformation>,
    pub row_count: u64,
    pub meta: WriterMeta,
}

impl Footer {
    pub fn encode(&self, compression: CompressionKind, level: i32) -> Result<Vec<u8>> {
        let mut raw = Vec::new();
        ciborium::ser::into_writer(self, &mut raw)
            .map_err(|e| DwrfError::Format(format!("footer encode: {e}")))?;
        codec::compress(compression, &raw, level)
    }

    pub fn decode(stored: &[u8], compression: CompressionKind) -> Result<Self> {
        let raw = codec::inflate(compression, stored)?;
        let footer: Footer = ciborium::de::from_reader(&raw[..])
            .map_err(|e| DwrfError::Format(format!("footer decode: {e}")))?;
        footer.validate()?;
        Ok(footer)
    }

    /// Check the stripe directory against itself and the type tree.
    pub fn validate(&self) -> Result<()> {
        self.types.validate()?;
        let columns = self.types.columns().len() as u64;
        let mut prev_end = HEADER_LEN;
        let mut rows = 0u64;
        for (i, s) in self.stripes.iter().enumerate() {
            let end = s.offset.checked_add(s.length);
            if s.offset < prev_end || end.is_none_or(|e| e > self.content_length) {
                return Err(DwrfError::Format(format!(
                    "stripe[{i}] at {}+{} out of bounds",
                    s.offset, s.length
                )));
            }
            for st in &s.streams {
                let in_stripe = st
                    .offset
                    .checked_add(st.length)
                    .is_some_and(|e| e <= s.length);
                if st.column as u64 >= columns || !in_stripe {
                    return Err(DwrfError::Format(format!(
                        "stripe[{i}] stream for column {} out of bounds",
                        st.column
                    )));
                }
            }
            prev_end = s.end();
            rows += s.rows;
        }
        if rows != self.row_count {
            return Err(DwrfError::Format(format!(
                "footer claims {} rows, stripes hold {rows}",
                self.row_count
            )));
        }
        Ok(())
    }

    /// Stripes that start inside `[offset, offset + length)`. Every stripe
    /// belongs to exactly one of a set of adjacent ranges.
    pub fn stripes_in_range(&self, offset: u64, length: u64) -> Vec<StripeInformation> {
        let max_offset = offset.saturating_add(length);
        self.stripes
            .iter()
            .filter(|s| offset <= s.offset && s.offset < max_offset)
            .cloned()
            .collect()
    }
}
