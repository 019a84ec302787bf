//! # Record Store
//!
//! Generic line-based, file-backed collection of serializable records.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One File Per Collection                             │
//! │                                                                         │
//! │  data/Category.dat      CLT,Clothes                                     │
//! │                         SHO,Shoes                                       │
//! │  data/Product.dat       CLT/1,Nike Cloths,"Nike Cloths L",50,...        │
//! │  data/VendorCLT.dat     Campus Prints,"Bulk supplier, on demand"        │
//! │                                                                         │
//! │  append:   add()        write one more line at the end                  │
//! │  rewrite:  delete(),    read every line, filter/swap, write the         │
//! │            replace()    whole file again (O(n) in lines)                │
//! │                                                                         │
//! │  There is NO atomic replace: a crash mid-rewrite can corrupt the        │
//! │  file. Known weakness of the format, tolerated on read by skipping      │
//! │  undecodable lines.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate detection is the CALLER's job: `add` appends unconditionally and
//! the managers perform uniqueness checks before calling it.

#[cfg(test)]
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use campus_core::Record;

/// File extension shared by every collection.
pub const FILE_EXTENSION: &str = ".dat";

/// A file-backed ordered collection of line-encoded records.
///
/// ## Usage
/// ```rust,ignore
/// let store: RecordStore<Category> = RecordStore::open(dir.join("Category.dat"))?;
/// store.add(&Category::new("CLT", "Clothes"))?;
/// let categories = store.get_all()?;
/// ```
#[derive(Debug)]
pub struct RecordStore<R: Record> {
    path: PathBuf,
    _record: PhantomData<R>,
    #[cfg(test)]
    fail_next_write: Cell<bool>,
}

impl<R: Record> RecordStore<R> {
    /// Opens a store, creating an empty backing file (and its parent
    /// directory) on first use.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            debug!(path = %path.display(), "Creating empty record file");
            fs::write(&path, "")?;
        }
        Ok(RecordStore {
            path,
            _record: PhantomData,
            #[cfg(test)]
            fail_next_write: Cell::new(false),
        })
    }

    /// Makes the next write to this store fail, so tests can exercise the
    /// paths that recover from a mid-sequence write error.
    #[cfg(test)]
    pub(crate) fn fail_next_write(&self) {
        self.fail_next_write.set(true);
    }

    fn check_write_fault(&self) -> io::Result<()> {
        #[cfg(test)]
        if self.fail_next_write.replace(false) {
            return Err(io::Error::new(io::ErrorKind::Other, "write fault"));
        }
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record to the end of the file.
    ///
    /// Does NOT check for duplicates; callers are responsible for uniqueness
    /// checks before calling.
    pub fn add(&self, record: &R) -> io::Result<()> {
        self.check_write_fault()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", record.encode())?;
        debug!(path = %self.path.display(), "Appended record");
        Ok(())
    }

    /// Reads and decodes every line.
    ///
    /// Blank lines are silently skipped (the separator-per-record format
    /// leaves a trailing one); non-blank lines that fail to decode are
    /// skipped with a warning, never repaired.
    pub fn get_all(&self) -> io::Result<Vec<R>> {
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            match R::decode(line) {
                Some(record) => records.push(record),
                None => warn!(path = %self.path.display(), line, "Skipping corrupt line"),
            }
        }
        Ok(records)
    }

    /// Removes every line textually equal to `encoded` and rewrites the file.
    ///
    /// Returns whether anything was removed. Lines that do not match,
    /// including corrupt ones, are preserved as-is.
    pub fn delete(&self, encoded: &str) -> io::Result<bool> {
        let lines = self.snapshot()?;
        let kept: Vec<&String> = lines.iter().filter(|line| *line != encoded).collect();
        let removed = kept.len() != lines.len();
        if removed {
            self.write_lines(kept.iter().map(|line| line.as_str()))?;
            debug!(path = %self.path.display(), "Deleted record");
        }
        Ok(removed)
    }

    /// Swaps the line textually equal to `old_encoded` for the new record's
    /// line, in a single rewrite of the file.
    ///
    /// This is the update primitive: staging the swap in memory closes the
    /// data-loss window a separate delete-then-add pair would have.
    pub fn replace(&self, old_encoded: &str, new: &R) -> io::Result<bool> {
        let new_line = new.encode();
        let mut lines = self.snapshot()?;
        let mut replaced = false;
        for line in &mut lines {
            if line == old_encoded {
                *line = new_line.clone();
                replaced = true;
            }
        }
        if replaced {
            self.write_lines(lines.iter().map(|line| line.as_str()))?;
            debug!(path = %self.path.display(), "Replaced record");
        }
        Ok(replaced)
    }

    /// Replaces the whole file with the given records.
    pub fn add_all(&self, records: &[R]) -> io::Result<()> {
        let lines: Vec<String> = records.iter().map(Record::encode).collect();
        self.write_lines(lines.iter().map(|line| line.as_str()))?;
        debug!(path = %self.path.display(), count = records.len(), "Rewrote collection");
        Ok(())
    }

    /// Truncates the collection to empty.
    pub fn delete_all(&self) -> io::Result<()> {
        self.check_write_fault()?;
        fs::write(&self.path, "")?;
        debug!(path = %self.path.display(), "Cleared collection");
        Ok(())
    }

    /// Raw lines as currently persisted, corrupt ones included.
    ///
    /// Used by checkout to capture a pre-write image for rollback.
    pub fn snapshot(&self) -> io::Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Restores a previously captured raw image, byte for byte.
    pub fn restore(&self, lines: &[String]) -> io::Result<()> {
        self.write_lines(lines.iter().map(|line| line.as_str()))
    }

    fn write_lines<'a>(&self, lines: impl Iterator<Item = &'a str>) -> io::Result<()> {
        self.check_write_fault()?;
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        fs::write(&self.path, content)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
