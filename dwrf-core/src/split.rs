//! Record reader bound to one split of a file.

use crate::error::{DwrfError, Result};
use crate::projection::ColumnInclusion;
use crate::read::source::{Reader, RowSource};
use crate::value::Row;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Open,
    Exhausted,
    Closed,
}

/// Pulls rows for the byte range `[offset, offset + length)` of a file and
/// tracks how far through the range it is.
///
/// One instance serves one split on one thread. After [`advance`] returns
/// false it keeps returning false; after [`close`] it returns
/// [`DwrfError::Closed`].
///
/// [`advance`]: SplitRecordReader::advance
/// [`close`]: SplitRecordReader::close
pub struct SplitRecordReader<R> {
    rows: R,
    include: ColumnInclusion,
    offset: u64,
    length: u64,
    progress: f32,
    state: State,
    row: Row,
}

impl<R: RowSource> SplitRecordReader<R> {
    pub fn open<F>(file: &F, offset: u64, length: u64, include: ColumnInclusion) -> Result<Self>
    where
        F: Reader<Rows = R>,
    {
        let rows = file.rows(offset, length, &include)?;
        let width = file.types().columns().len();
        Ok(Self::new(rows, offset, length, include, width))
    }

    /// Wrap an already opened row source producing rows `width` columns wide.
    pub fn new(rows: R, offset: u64, length: u64, include: ColumnInclusion, width: usize) -> Self {
        Self {
            rows,
            include,
            offset,
            length,
            progress: 0.0,
            state: State::Open,
            row: Row::new(width),
        }
    }

    /// Decode the next row into the reader's own slot, see [`row`](Self::row).
    pub fn advance(&mut self) -> Result<bool> {
        let mut row = std::mem::take(&mut self.row);
        let res = self.advance_into(&mut row);
        self.row = row;
        res
    }

    /// Decode the next row into a caller-supplied slot, overwriting it.
    pub fn advance_into(&mut self, row: &mut Row) -> Result<bool> {
        match self.state {
            State::Closed => return Err(DwrfError::Closed),
            State::Exhausted => return Ok(false),
            State::Open => {}
        }
        let more = self.rows.next_row(row)?;
        self.progress = self.progress.max(self.rows.progress().clamp(0.0, 1.0));
        if !more {
            self.state = State::Exhausted;
        }
        Ok(more)
    }

    /// `advance` returning the decoded row, or `None` once exhausted.
    pub fn next_row(&mut self) -> Result<Option<&Row>> {
        if self.advance()? {
            Ok(Some(&self.row))
        } else {
            Ok(None)
        }
    }

    /// The most recently decoded row. Overwritten by the next `advance`.
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Approximate byte position in the file: `offset + round(progress * length)`.
    pub fn position(&self) -> u64 {
        let done = (self.progress as f64 * self.length as f64).round() as u64;
        self.offset + done.min(self.length)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn inclusion(&self) -> &ColumnInclusion {
        &self.include
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closed;
        self.rows.close()
    }
}
