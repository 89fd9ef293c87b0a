//! Durable, level-filtered log file
//!
//! Console diagnostics go through `tracing`. Events that must survive the process (failed
//! downloads, mostly) are also appended to a plain text log file by a [`FileLogger`] the
//! coordinator owns. Each line is written inside a critical section so a termination
//! request cannot leave half a line behind.

use crate::interrupt::Interrupt;
use chrono::Local;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    NotSet,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Numeric priority of the level
    pub fn value(self) -> u8 {
        match self {
            Self::NotSet => 0,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSet => "NOT_SET",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Warning
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOT_SET" | "NOTSET" => Ok(Self::NotSet),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Appends formatted lines to a log file
#[derive(Debug, Clone)]
pub struct FileLogger {
    path: PathBuf,
    threshold: LogLevel,
    include_time: bool,
    interrupt: Interrupt,
}

impl FileLogger {
    pub fn new(path: &Path, threshold: LogLevel, include_time: bool, interrupt: Interrupt) -> Self {
        Self {
            path: path.to_path_buf(),
            threshold,
            include_time,
            interrupt,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: LogLevel) {
        self.threshold = threshold;
    }

    /// Logs `message` at `level`
    ///
    /// A message below the threshold is dropped. A message without a level is always
    /// written and carries no level tag.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The line was written
    /// * `Ok(false)` - The message was below the threshold
    /// * `Err(io::Error)` - The log file could not be written
    pub fn log(&self, level: Option<LogLevel>, message: &str) -> std::io::Result<bool> {
        let Some(line) = self.format_line(level, message) else {
            return Ok(false);
        };

        let _section = self.interrupt.block();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        Ok(true)
    }

    pub fn debug(&self, message: &str) -> std::io::Result<bool> {
        self.log(Some(LogLevel::Debug), message)
    }

    pub fn info(&self, message: &str) -> std::io::Result<bool> {
        self.log(Some(LogLevel::Info), message)
    }

    pub fn warning(&self, message: &str) -> std::io::Result<bool> {
        self.log(Some(LogLevel::Warning), message)
    }

    pub fn error(&self, message: &str) -> std::io::Result<bool> {
        self.log(Some(LogLevel::Error), message)
    }

    pub fn critical(&self, message: &str) -> std::io::Result<bool> {
        self.log(Some(LogLevel::Critical), message)
    }

    /// Builds the line for `message`, or `None` when it is filtered out
    fn format_line(&self, level: Option<LogLevel>, message: &str) -> Option<String> {
        let mut line = String::new();

        if self.include_time {
            line.push_str(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            line.push(' ');
        }

        if let Some(level) = level {
            if level < self.threshold {
                return None;
            }
            line.push_str(level.as_str());
            line.push_str(": ");
        }

        line.push_str(message.trim());
        line.push('\n');
        Some(line)
    }
}
