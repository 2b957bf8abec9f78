//! Journal: where a run reports what happened.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Severity of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Diagnostic detail
    Debug,
    /// Normal progress
    Info,
    /// Something unexpected that did not stop the run
    Warn,
    /// The run was aborted
    Error,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Severity
    pub level: LogType,
    /// Human-readable message
    pub message: String,
    /// When the entry was created
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    /// Create an entry stamped with the current time.
    pub fn new(level: LogType, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Informational entry.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogType::Info, message)
    }

    /// Error entry.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogType::Error, message)
    }
}

/// Receives journal entries during a run.
pub trait Journal {
    /// Record an entry.
    fn record(&mut self, entry: JournalEntry);
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Vec<JournalEntry>,
}

impl MemoryJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries of one severity.
    pub fn entries_of(&self, level: LogType) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.level == level)
    }
}

impl Journal for MemoryJournal {
    fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }
}

/// Forwards entries to the `log` facade.
#[derive(Debug, Default)]
pub struct LogJournal;

impl Journal for LogJournal {
    fn record(&mut self, entry: JournalEntry) {
        let level = match entry.level {
            LogType::Debug => log::Level::Debug,
            LogType::Info => log::Level::Info,
            LogType::Warn => log::Level::Warn,
            LogType::Error => log::Level::Error,
        };
        log::log!(target: "xmpstamp::journal", level, "{}", entry.message);
    }
}

/// Appends entries as JSON lines to a file.
///
/// Write failures are logged and otherwise ignored; the journal never aborts
/// a run.
pub struct JsonLinesJournal {
    out: BufWriter<File>,
}

impl JsonLinesJournal {
    /// Open (or create) a journal file for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    fn write_entry(&mut self, entry: &JournalEntry) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, entry)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl Journal for JsonLinesJournal {
    fn record(&mut self, entry: JournalEntry) {
        if let Err(e) = self.write_entry(&entry) {
            log::warn!("cannot write journal entry: {}", e);
        }
    }
}

/// Sends every entry to several journals.
#[derive(Default)]
pub struct TeeJournal<'a> {
    targets: Vec<&'a mut dyn Journal>,
}

impl<'a> TeeJournal<'a> {
    /// Create a journal with no targets.
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Add a target.
    pub fn with(mut self, journal: &'a mut dyn Journal) -> Self {
        self.targets.push(journal);
        self
    }
}

impl Journal for TeeJournal<'_> {
    fn record(&mut self, entry: JournalEntry) {
        for target in &mut self.targets {
            target.record(entry.clone());
        }
    }
}
