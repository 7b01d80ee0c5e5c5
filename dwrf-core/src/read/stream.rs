use super::opened::Opened;
use crate::codec::{self, CompressionKind};
use crate::container::footer::StripeInformation;
use crate::error::{DwrfError, Result};
use crate::projection::ColumnInclusion;
use crate::read::source::{Reader, RowSource};
use crate::value::{Row, Value};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Rows of the stripes assigned to one byte range, decoded a stripe at a time.
/// Only the streams of included top-level columns are read.
pub struct StripeRows {
    path: PathBuf,
    file: Option<File>,
    compression: CompressionKind,
    stripes: Vec<StripeInformation>,
    included: Vec<bool>,
    next_stripe: usize,
    current: Option<LoadedStripe>,
    rows_returned: u64,
    total_rows: u64,
}

struct LoadedStripe {
    columns: Vec<Option<Vec<Value>>>,
    next: usize,
    rows: usize,
}

impl StripeRows {
    pub fn open(file: &Opened, offset: u64, length: u64, include: &ColumnInclusion) -> Result<Self> {
        let stripes = file.footer.stripes_in_range(offset, length);
        let total_rows = stripes.iter().map(|s| s.rows).sum();
        let included = include.top_level(file.types());
        debug!(
            path = %file.path.display(),
            offset,
            length,
            stripes = stripes.len(),
            rows = total_rows,
            "opening row range"
        );
        Ok(Self {
            path: file.path.clone(),
            file: Some(File::open(&file.path)?),
            compression: file.compression(),
            stripes,
            included,
            next_stripe: 0,
            current: None,
            rows_returned: 0,
            total_rows,
        })
    }

    fn load_next(&mut self) -> Result<bool> {
        let Some(stripe) = self.stripes.get(self.next_stripe) else {
            return Ok(false);
        };
        let f = self.file.as_mut().ok_or(DwrfError::Closed)?;

        let mut columns: Vec<Option<Vec<Value>>> = vec![None; self.included.len()];
        for st in &stripe.streams {
            let col = st.column as usize;
            if !self.included[col] {
                continue;
            }
            f.seek(SeekFrom::Start(stripe.offset + st.offset))?;
            let mut stored = vec![0u8; st.length as usize];
            f.read_exact(&mut stored)?;
            let raw = codec::decompress(self.compression, &stored, st.raw_length)?;
            let values: Vec<Value> = ciborium::de::from_reader(&raw[..]).map_err(|e| {
                DwrfError::Format(format!(
                    "stripe at {}: column {col} decode: {e}",
                    stripe.offset
                ))
            })?;
            if values.len() as u64 != stripe.rows {
                return Err(DwrfError::Format(format!(
                    "stripe at {}: column {col} holds {} values for {} rows",
                    stripe.offset,
                    values.len(),
                    stripe.rows
                )));
            }
            columns[col] = Some(values);
        }
        if stripe.rows > 0 {
            let missing = (0..columns.len()).find(|&c| self.included[c] && columns[c].is_none());
            if let Some(col) = missing {
                return Err(DwrfError::Format(format!(
                    "stripe at {}: no stream for column {col}",
                    stripe.offset
                )));
            }
        }
        trace!(
            path = %self.path.display(),
            stripe = stripe.offset,
            rows = stripe.rows,
            "loaded stripe"
        );

        self.next_stripe += 1;
        self.current = Some(LoadedStripe {
            columns,
            next: 0,
            rows: stripe.rows as usize,
        });
        Ok(true)
    }
}

impl RowSource for StripeRows {
    fn next_row(&mut self, row: &mut Row) -> Result<bool> {
        loop {
            if let Some(stripe) = self.current.as_mut() {
                if stripe.next < stripe.rows {
                    row.reset(stripe.columns.len());
                    for (i, col) in stripe.columns.iter_mut().enumerate() {
                        if let Some(values) = col {
                            row.set(i, std::mem::take(&mut values[stripe.next]));
                        }
                    }
                    stripe.next += 1;
                    self.rows_returned += 1;
                    return Ok(true);
                }
                self.current = None;
            }
            if !self.load_next()? {
                return Ok(false);
            }
        }
    }

    fn progress(&self) -> f32 {
        if self.total_rows == 0 {
            return 1.0;
        }
        (self.rows_returned as f64 / self.total_rows as f64) as f32
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.file = None;
        Ok(())
    }
}
