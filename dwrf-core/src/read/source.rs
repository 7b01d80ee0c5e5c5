use crate::error::Result;
use crate::projection::ColumnInclusion;
use crate::types::TypeTree;
use crate::value::Row;

/// A file-level reader: knows the schema and hands out row sources over byte
/// ranges of the file.
pub trait Reader {
    type Rows: RowSource;

    fn types(&self) -> &TypeTree;

    /// Open the rows of the stripes starting inside `[offset, offset + length)`.
    /// `ColumnInclusion::All` and a mask that includes every node must behave
    /// the same.
    fn rows(&self, offset: u64, length: u64, include: &ColumnInclusion) -> Result<Self::Rows>;
}

/// Pull-based row production for one byte range.
pub trait RowSource {
    /// Decode the next row into `row`, overwriting it. Returns false once the
    /// range is exhausted.
    fn next_row(&mut self, row: &mut Row) -> Result<bool>;

    /// Fraction of the range's rows returned so far, in `[0, 1]`.
    fn progress(&self) -> f32;

    /// Release the file handle and buffers. Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}

impl<R: RowSource + ?Sized> RowSource for Box<R> {
    fn next_row(&mut self, row: &mut Row) -> Result<bool> {
        (**self).next_row(row)
    }

    fn progress(&self) -> f32 {
        (**self).progress()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
