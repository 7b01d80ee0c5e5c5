use crate::codec::CompressionKind;
use crate::container::footer::{Footer, StripeInformation};
use crate::container::postscript::{HEADER_LEN, MAGIC, POSTSCRIPT_LEN, PostScript};
use crate::error::{DwrfError, Result};
use crate::projection::ColumnInclusion;
use crate::read::source::Reader;
use crate::read::stream::StripeRows;
use crate::types::TypeTree;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A file whose tail (postscript + footer) has been read and checked. Holds no
/// file handle; every row source opens its own.
#[derive(Debug, Clone)]
pub struct Opened {
    pub path: PathBuf,
    pub file_len: u64,
    pub postscript: PostScript,
    pub footer: Footer,
}

impl Opened {
    pub fn open(path: &Path) -> Result<Self> {
        let mut f = File::open(path)?;
        let file_len = f.metadata()?.len();

        // postscript
        let postscript = PostScript::read_at_eof(&mut f, file_len)?;

        // header
        f.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 3];
        f.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(DwrfError::Format("header magic mismatch".into()));
        }

        // footer
        let footer_end = file_len - POSTSCRIPT_LEN as u64 - 1;
        if postscript.footer_len > footer_end - HEADER_LEN {
            return Err(DwrfError::Format(format!(
                "footer length {} out of range for file of {file_len} bytes",
                postscript.footer_len
            )));
        }
        let footer_off = footer_end - postscript.footer_len;
        f.seek(SeekFrom::Start(footer_off))?;
        let mut fbytes = vec![0u8; postscript.footer_len as usize];
        f.read_exact(&mut fbytes)?;
        if blake3::hash(&fbytes).as_bytes() != &postscript.footer_blake3 {
            return Err(DwrfError::Format("footer checksum mismatch".into()));
        }
        let footer = Footer::decode(&fbytes, postscript.compression)?;
        if footer.content_length != footer_off {
            return Err(DwrfError::Format(format!(
                "footer found at {footer_off}, stripes end at {}",
                footer.content_length
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file_len,
            postscript,
            footer,
        })
    }

    pub fn stripes(&self) -> &[StripeInformation] {
        &self.footer.stripes
    }

    pub fn row_count(&self) -> u64 {
        self.footer.row_count
    }

    pub fn compression(&self) -> CompressionKind {
        self.postscript.compression
    }
}

impl Reader for Opened {
    type Rows = StripeRows;

    fn types(&self) -> &TypeTree {
        &self.footer.types
    }

    fn rows(&self, offset: u64, length: u64, include: &ColumnInclusion) -> Result<StripeRows> {
        StripeRows::open(self, offset, length, include)
    }
}
