use crate::interrupt::Interrupt;
use crate::store::{KvStore, StoreResult, Value};
use std::path::Path;

const KEY_URL: &str = "url";
const KEY_QUERY: &str = "query";
const KEY_CURRENT_PAGES: &str = "current_pages";
const KEY_TOTAL_PAGES: &str = "total_pages";

/// Snapshot of the resume state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    /// Last book whose artifacts were fully written
    pub last_processed_book_url: Option<String>,
    /// Last listing page whose links were exhausted
    pub last_processed_page_number: u64,
    /// Page count observed when the previous run started
    pub total_pages_at_last_check: u64,
}

/// Computes how many pages to crawl, shifting the resume page by newly published pages
///
/// Pages are numbered newest-first, so every page published since the last run pushes
/// the resume page further back. The result is clamped to `0..=new_total`.
///
/// # Examples
///
/// ```
/// use shelf_sweep::state::pages_to_crawl;
///
/// assert_eq!(pages_to_crawl(12, 10, 3), 5);
/// assert_eq!(pages_to_crawl(40, 0, 0), 40);
/// ```
pub fn pages_to_crawl(new_total: u64, stored_total: u64, stored_current: u64) -> u64 {
    let shifted = new_total as i128 - stored_total as i128 + stored_current as i128;
    shifted.clamp(0, new_total as i128) as u64
}

/// Resume state backed by the progress file
#[derive(Debug)]
pub struct Progress {
    store: KvStore,
}

impl Progress {
    /// Loads the progress file and fills in defaults for missing keys
    pub fn open(path: &Path, interrupt: Interrupt) -> StoreResult<Self> {
        Ok(Self::with_defaults(KvStore::open(path, interrupt)?))
    }

    /// Starts from defaults, ignoring the content of an existing progress file
    pub fn fresh(path: &Path, interrupt: Interrupt) -> Self {
        Self::with_defaults(KvStore::empty(path, interrupt))
    }

    fn with_defaults(mut store: KvStore) -> Self {
        store.get_default(KEY_URL, "");
        store.get_default(KEY_QUERY, "");
        store.get_default(KEY_CURRENT_PAGES, 0u64);
        store.get_default(KEY_TOTAL_PAGES, 0u64);
        Self { store }
    }

    /// The resume cursor, if a book has been completed
    pub fn last_book_url(&self) -> Option<&str> {
        self.store
            .get(KEY_URL)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn current_page(&self) -> u64 {
        self.int(KEY_CURRENT_PAGES)
    }

    pub fn total_pages(&self) -> u64 {
        self.int(KEY_TOTAL_PAGES)
    }

    fn int(&self, key: &str) -> u64 {
        match self.store.get(key) {
            Some(Value::Int(n)) => *n,
            Some(other) => {
                tracing::warn!("Ignoring non-numeric {}={} in progress file", key, other);
                0
            }
            None => 0,
        }
    }

    pub fn record(&self) -> ProgressRecord {
        ProgressRecord {
            last_processed_book_url: self.last_book_url().map(str::to_string),
            last_processed_page_number: self.current_page(),
            total_pages_at_last_check: self.total_pages(),
        }
    }

    /// Stores the freshly observed page count and returns the number of pages to crawl
    pub fn adjust_for_total_pages(&mut self, new_total: u64) -> u64 {
        let pages = pages_to_crawl(new_total, self.total_pages(), self.current_page());
        let previous = self.store.set(KEY_TOTAL_PAGES, new_total);
        tracing::debug!(
            "Total pages {} (previously {:?}), crawling {} pages",
            new_total,
            previous,
            pages
        );
        pages
    }

    /// Moves the resume cursor to a completed book
    pub fn record_book(&mut self, book_url: &str) {
        self.store.set(KEY_URL, book_url);
    }

    /// Marks a listing page as exhausted
    pub fn record_page(&mut self, page_number: u64) {
        self.store.set(KEY_CURRENT_PAGES, page_number);
    }

    /// Persists the progress file
    pub fn save(&self) -> StoreResult<()> {
        self.store.save()
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }
}
