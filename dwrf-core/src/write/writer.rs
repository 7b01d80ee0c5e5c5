use crate::codec::{self, CompressionKind};
use crate::container::footer::{Footer, StreamInformation, StripeInformation, WriterMeta};
use crate::container::postscript::{MAGIC, PostScript, VERSION};
use crate::error::{DwrfError, Result};
use crate::types::{Field, TypeTree};
use crate::value::{Row, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Rows buffered before a stripe is cut.
    pub stripe_rows: usize,
    pub compression: CompressionKind,
    pub level: i32,
    /// When true, zero the creation timestamp for reproducible output.
    pub deterministic: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            stripe_rows: 10_000,
            compression: CompressionKind::Zstd,
            level: 3,
            deterministic: false,
        }
    }
}

/// Small Write adapter that counts bytes written
struct CountingWriter<W: Write> {
    inner: W,
    n: u64,
}
impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, n: 0 }
    }
}
impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let k = self.inner.write(buf)?;
        self.n += k as u64;
        Ok(k)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Writes rows into stripes of per-column streams, then the footer and
/// postscript on [`close`](Writer::close).
pub struct Writer {
    path: PathBuf,
    out: CountingWriter<BufWriter<File>>,
    fields: Vec<Field>,
    types: TypeTree,
    opts: WriterOptions,
    // column-major buffer of the stripe being built
    pending: Vec<Vec<Value>>,
    pending_rows: u64,
    stripes: Vec<StripeInformation>,
    row_count: u64,
}

impl Writer {
    pub fn create(path: &Path, fields: Vec<Field>, opts: WriterOptions) -> Result<Self> {
        if fields.is_empty() {
            return Err(DwrfError::Schema("a file needs at least one column".into()));
        }
        let types = TypeTree::from_fields(&fields);
        let mut out = CountingWriter::new(BufWriter::new(File::create(path)?));
        out.write_all(MAGIC)?;
        Ok(Self {
            path: path.to_path_buf(),
            out,
            pending: vec![Vec::new(); fields.len()],
            fields,
            types,
            opts,
            pending_rows: 0,
            stripes: Vec::new(),
            row_count: 0,
        })
    }

    pub fn types(&self) -> &TypeTree {
        &self.types
    }

    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        if row.width() != self.fields.len() {
            return Err(DwrfError::Schema(format!(
                "row has {} columns, schema has {}",
                row.width(),
                self.fields.len()
            )));
        }
        for (field, v) in self.fields.iter().zip(row.values()) {
            if !v.conforms_to(&field.data_type) {
                return Err(DwrfError::Schema(format!(
                    "value {v:?} does not fit column {}",
                    field.name
                )));
            }
        }
        for (col, v) in self.pending.iter_mut().zip(row.values()) {
            col.push(v.clone());
        }
        self.pending_rows += 1;
        if self.pending_rows as usize >= self.opts.stripe_rows.max(1) {
            self.flush_stripe()?;
        }
        Ok(())
    }

    /// Cut a stripe from the buffered rows. No-op when nothing is buffered.
    pub fn flush_stripe(&mut self) -> Result<()> {
        if self.pending_rows == 0 {
            return Ok(());
        }
        let offset = self.out.n;
        let mut streams = Vec::with_capacity(self.pending.len());
        for (column, values) in self.pending.iter_mut().enumerate() {
            let mut raw = Vec::new();
            ciborium::ser::into_writer(&*values, &mut raw)
                .map_err(|e| DwrfError::Format(format!("column {column} encode: {e}")))?;
            let stored = codec::compress(self.opts.compression, &raw, self.opts.level)?;
            streams.push(StreamInformation {
                column: column as u32,
                offset: self.out.n - offset,
                length: stored.len() as u64,
                raw_length: raw.len() as u64,
            });
            self.out.write_all(&stored)?;
            values.clear();
        }
        let stripe = StripeInformation {
            offset,
            length: self.out.n - offset,
            rows: self.pending_rows,
            streams,
        };
        debug!(
            path = %self.path.display(),
            offset = stripe.offset,
            length = stripe.length,
            rows = stripe.rows,
            "wrote stripe"
        );
        self.row_count += stripe.rows;
        self.stripes.push(stripe);
        self.pending_rows = 0;
        Ok(())
    }

    /// Flush the last stripe and write the file tail. Returns the file length.
    pub fn close(mut self) -> Result<u64> {
        self.flush_stripe()?;
        let created = if self.opts.deterministic {
            0
        } else {
            OffsetDateTime::now_utc().unix_timestamp()
        };
        let footer = Footer {
            content_length: self.out.n,
            types: self.types,
            stripes: self.stripes,
            row_count: self.row_count,
            meta: WriterMeta {
                created,
                writer: concat!("dwrf-core/", env!("CARGO_PKG_VERSION")).to_string(),
            },
        };
        let stored = footer.encode(self.opts.compression, self.opts.level)?;
        self.out.write_all(&stored)?;
        PostScript {
            footer_len: stored.len() as u64,
            compression: self.opts.compression,
            version: VERSION,
            footer_blake3: *blake3::hash(&stored).as_bytes(),
        }
        .write_to(&mut self.out)?;
        self.out.flush()?;
        debug!(
            path = %self.path.display(),
            rows = footer.row_count,
            stripes = footer.stripes.len(),
            bytes = self.out.n,
            "closed file"
        );
        Ok(self.out.n)
    }
}
