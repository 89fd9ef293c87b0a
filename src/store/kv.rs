use crate::interrupt::Interrupt;
use crate::store::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A stored value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Str(String),
}

impl Value {
    /// Coerces raw text the way the file format expects: all-digit text becomes an integer
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse() {
                return Self::Int(n);
            }
        }
        Self::Str(raw.to_string())
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Key-value store bound to a file path
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    interrupt: Interrupt,
}

impl KvStore {
    /// Opens the store at `path`, starting empty if the file does not exist yet
    ///
    /// # Returns
    ///
    /// * `Ok(KvStore)` - Store loaded from disk, or empty on first run
    /// * `Err(StoreError::Parse)` - A line has no `=` separator
    /// * `Err(StoreError::Io)` - The file exists but could not be read
    pub fn open(path: &Path, interrupt: Interrupt) -> StoreResult<Self> {
        let entries = Self::load(path)?.unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            interrupt,
        })
    }

    /// Creates an empty store bound to `path`, ignoring any existing file
    pub fn empty(path: &Path, interrupt: Interrupt) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: BTreeMap::new(),
            interrupt,
        }
    }

    /// Reads and parses the file at `path`
    ///
    /// A missing file is the expected first-run state and yields `Ok(None)`.
    pub fn load(path: &Path) -> StoreResult<Option<BTreeMap<String, Value>>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        parse(&content, path).map(Some)
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Inserts `default` only if `key` is absent, then returns the current value
    pub fn get_default(&mut self, key: &str, default: impl Into<Value>) -> &Value {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| default.into())
    }

    /// Overwrites `key`, returning the previous value if there was one
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.to_string(), value.into())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders all entries as sorted `key=value` lines
    pub fn render(&self) -> String {
        render(&self.entries)
    }

    /// Writes the store to its file
    ///
    /// The content goes to a sibling temporary file which is then renamed over the
    /// target, all inside a critical section.
    pub fn save(&self) -> StoreResult<()> {
        let content = self.render();
        let tmp_path = temporary_path(&self.path);
        let io_error = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let _section = self.interrupt.block();
        fs::write(&tmp_path, content).map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(io_error)?;

        tracing::debug!("Saved {} keys to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

/// Parses store file content
fn parse(content: &str, path: &Path) -> StoreResult<BTreeMap<String, Value>> {
    let mut entries = BTreeMap::new();

    for (index, line) in content.lines().enumerate() {
        let (key, raw) = line.split_once('=').ok_or_else(|| StoreError::Parse {
            path: path.display().to_string(),
            line_number: index + 1,
            line: line.to_string(),
        })?;
        entries.insert(key.to_string(), Value::parse(raw));
    }

    Ok(entries)
}

fn render(entries: &BTreeMap<String, Value>) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
