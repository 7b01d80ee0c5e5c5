//! Host-facing input format: split planning, record readers and input
//! validation in the shape of Hadoop's `mapred` API.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConf;
use crate::error::{DwrfError, Result};
use crate::projection::{ColumnInclusion, find_included_columns};
use crate::read::opened::Opened;
use crate::read::source::Reader;
use crate::read::stream::StripeRows;
use crate::sniff;
use crate::split::SplitRecordReader;
use crate::types::TypeTree;
use crate::value::Row;

/// A split may overshoot its nominal size by this factor before a file is cut
/// once more.
const SPLIT_SLOP: f64 = 1.1;

/// A byte range of one file, handed to one record reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSplit {
    pub path: PathBuf,
    pub start: u64,
    pub length: u64,
}

impl FileSplit {
    pub fn new(path: impl Into<PathBuf>, start: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            start,
            length,
        }
    }

    /// The whole file as one split.
    pub fn whole(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let length = fs::metadata(&path)?.len();
        Ok(Self::new(path, 0, length))
    }
}

impl fmt::Display for FileSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.path.display(), self.start, self.length)
    }
}

/// Keys carry nothing; rows are the values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NullKey;

/// The record reader contract a host drives: allocate a key and value once,
/// then call `next` until it returns false.
pub trait RecordReader {
    type Key;
    type Value;

    fn create_key(&self) -> Self::Key;
    fn create_value(&self) -> Self::Value;
    fn next(&mut self, key: &mut Self::Key, value: &mut Self::Value) -> Result<bool>;
    /// Approximate byte position in the file.
    fn pos(&self) -> u64;
    fn progress(&self) -> f32;
    fn close(&mut self) -> Result<()>;
}

pub struct DwrfRecordReader {
    reader: SplitRecordReader<StripeRows>,
    types: TypeTree,
    path: PathBuf,
}

impl DwrfRecordReader {
    fn open(file: &Opened, conf: &ScanConf, offset: u64, length: u64) -> Result<Self> {
        let projection = conf.projection(file.types())?;
        let include = find_included_columns(file.types(), &projection);
        let reader = SplitRecordReader::open(file, offset, length, include)?;
        Ok(Self {
            reader,
            types: file.types().clone(),
            path: file.path.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema of the file being read.
    pub fn types(&self) -> &TypeTree {
        &self.types
    }

    pub fn inclusion(&self) -> &ColumnInclusion {
        self.reader.inclusion()
    }
}

impl RecordReader for DwrfRecordReader {
    type Key = NullKey;
    type Value = Row;

    fn create_key(&self) -> NullKey {
        NullKey
    }

    fn create_value(&self) -> Row {
        Row::new(self.types.columns().len())
    }

    fn next(&mut self, _key: &mut NullKey, value: &mut Row) -> Result<bool> {
        self.reader.advance_into(value).map_err(|e| match e {
            DwrfError::Closed => e,
            e => e.with_path(&self.path),
        })
    }

    fn pos(&self) -> u64 {
        self.reader.position()
    }

    fn progress(&self) -> f32 {
        self.reader.progress()
    }

    fn close(&mut self) -> Result<()> {
        self.reader.close()
    }
}

#[derive(Clone, Debug, Default)]
pub struct DwrfInputFormat {
    conf: ScanConf,
}

impl DwrfInputFormat {
    pub fn new(conf: ScanConf) -> Self {
        Self { conf }
    }

    pub fn conf(&self) -> &ScanConf {
        &self.conf
    }

    pub fn min_split_size(&self) -> u64 {
        self.conf.min_split_size.max(1)
    }

    pub fn record_reader(&self, split: &FileSplit) -> Result<DwrfRecordReader> {
        info!(split = %split, "opening record reader");
        let opened = Opened::open(&split.path).and_then(|file| {
            DwrfRecordReader::open(&file, &self.conf, split.start, split.length)
        });
        match opened {
            Ok(reader) => Ok(reader),
            Err(e) if e.is_structural() => Err(explain_structural(&split.path, e)),
            Err(e) => Err(e.with_path(&split.path)),
        }
    }

    /// True when every file opens. An empty list is not valid input.
    pub fn validate_input(&self, files: &[PathBuf]) -> bool {
        if files.is_empty() {
            return false;
        }
        files.iter().all(|path| match Opened::open(path) {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "input rejected");
                false
            }
        })
    }

    /// Data files under `roots`, sorted. Names starting with `.` or `_` are
    /// skipped, directories included.
    pub fn list_status(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in roots {
            let walker = WalkDir::new(root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
            for e in walker {
                let e = e.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
                if e.file_type().is_file() {
                    files.push(e.into_path());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Cut `files` into roughly `num_splits` byte ranges, never smaller than
    /// [`min_split_size`](Self::min_split_size) nor larger than a block.
    pub fn splits(&self, files: &[PathBuf], num_splits: usize) -> Result<Vec<FileSplit>> {
        let mut sized = Vec::with_capacity(files.len());
        for path in files {
            let md = fs::metadata(path)?;
            if md.is_dir() {
                return Err(DwrfError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file: {}", path.display()),
                )));
            }
            sized.push((path, md.len()));
        }
        let total: u64 = sized.iter().map(|(_, len)| len).sum();
        let goal = total / num_splits.max(1) as u64;
        let min = self.min_split_size();

        let mut splits = Vec::new();
        for (path, len) in sized {
            if len == 0 {
                splits.push(FileSplit::new(path, 0, 0));
                continue;
            }
            let split_size = goal.min(self.conf.block_size).max(min);
            let mut remaining = len;
            while remaining as f64 / split_size as f64 > SPLIT_SLOP {
                splits.push(FileSplit::new(path, len - remaining, split_size));
                remaining -= split_size;
            }
            if remaining != 0 {
                splits.push(FileSplit::new(path, len - remaining, remaining));
            }
        }
        debug!(files = files.len(), total, splits = splits.len(), "planned splits");
        Ok(splits)
    }
}

fn is_hidden(e: &DirEntry) -> bool {
    e.file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

/// A structural failure on open: tell a damaged ORC file from a file that was
/// never ORC to begin with.
fn explain_structural(path: &Path, err: DwrfError) -> DwrfError {
    match sniff::diagnose(path) {
        Ok(d) if d.looks_like_orc => {
            warn!(path = %path.display(), error = %err, "error while parsing the footer of the file");
            err.with_path(path)
        }
        Ok(d) => DwrfError::NotAnOrcFile {
            path: path.to_path_buf(),
            header: d.header,
        },
        Err(sniff_err) => sniff_err.with_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_with_min(min: u64) -> DwrfInputFormat {
        DwrfInputFormat::new(ScanConf {
            min_split_size: min,
            ..Default::default()
        })
    }

    fn sized_file(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn default_floor_is_16k() {
        assert_eq!(DwrfInputFormat::default().min_split_size(), 16384);
        assert_eq!(format_with_min(0).min_split_size(), 1);
    }

    #[test]
    fn split_displays_like_hadoop() {
        let s = FileSplit::new("/t/000000_0", 3, 4096);
        assert_eq!(s.to_string(), "/t/000000_0:3+4096");
    }

    #[test]
    fn small_files_are_not_cut_below_the_floor() {
        let dir = tempfile::tempdir().unwrap();
        let f = sized_file(dir.path(), "a", 50_000);
        let splits = DwrfInputFormat::default().splits(&[f.clone()], 100).unwrap();
        let got: Vec<(u64, u64)> = splits.iter().map(|s| (s.start, s.length)).collect();
        assert_eq!(got, vec![(0, 16384), (16384, 16384), (32768, 17232)]);
    }

    #[test]
    fn slop_keeps_a_short_tail_in_the_last_split() {
        let dir = tempfile::tempdir().unwrap();
        let f = sized_file(dir.path(), "a", 1050);
        let splits = format_with_min(1000).splits(&[f], 10).unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!((splits[0].start, splits[0].length), (0, 1050));
    }

    #[test]
    fn splits_tile_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            sized_file(dir.path(), "a", 10_000),
            sized_file(dir.path(), "b", 0),
            sized_file(dir.path(), "c", 3_333),
        ];
        let splits = format_with_min(1024).splits(&files, 4).unwrap();
        for f in &files {
            let mut next = 0;
            for s in splits.iter().filter(|s| &s.path == f) {
                assert_eq!(s.start, next);
                next += s.length;
            }
            assert_eq!(next, fs::metadata(f).unwrap().len());
        }
        assert!(splits.iter().any(|s| s.path == files[1] && s.length == 0));
    }

    #[test]
    fn listing_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        sized_file(dir.path(), "000000_0", 1);
        sized_file(dir.path(), ".000000_0.crc", 1);
        sized_file(dir.path(), "_SUCCESS", 1);
        fs::create_dir(dir.path().join("_temporary")).unwrap();
        sized_file(&dir.path().join("_temporary"), "attempt_0", 1);
        fs::create_dir(dir.path().join("part=1")).unwrap();
        sized_file(&dir.path().join("part=1"), "000001_0", 1);

        let listed = DwrfInputFormat::default()
            .list_status(&[dir.path().to_path_buf()])
            .unwrap();
        let names: Vec<String> = listed
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["000000_0".to_string(), "part=1/000001_0".to_string()]);
    }

    #[test]
    fn no_files_is_invalid_input() {
        assert!(!DwrfInputFormat::default().validate_input(&[]));
    }

    #[test]
    fn missing_file_is_wrapped_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let split = FileSplit::new(dir.path().join("gone"), 0, 10);
        let err = DwrfInputFormat::default().record_reader(&split).err().unwrap();
        match err {
            DwrfError::RecordReader { path, source } => {
                assert_eq!(path, split.path);
                assert!(matches!(*source, DwrfError::Io(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
