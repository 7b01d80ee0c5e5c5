#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod mapred;
pub mod projection;
pub mod sniff;
pub mod split;
pub mod types;
pub mod value;

pub mod codec;

pub mod container {
    pub mod footer;
    pub mod postscript;
}

pub mod read {
    pub mod opened;
    pub mod source;
    pub mod stream;
}

pub mod write {
    pub mod writer;
}

// Re-exports: stable API surface
pub use config::ScanConf;
pub use error::{DwrfError, Result};
pub use mapred::{DwrfInputFormat, DwrfRecordReader, FileSplit, NullKey, RecordReader};
pub use projection::{ColumnInclusion, ColumnProjection, find_included_columns};
pub use read::opened::Opened;
pub use read::source::{Reader, RowSource};
pub use split::SplitRecordReader;
pub use types::{DataType, Field, TypeTree};
pub use value::{Row, Value};
pub use write::writer::{Writer, WriterOptions};
