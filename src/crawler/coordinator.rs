//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Loading the progress file, blacklist and log file
//! - Working out how many listing pages to visit from the homepage page count
//! - Walking listing pages from the oldest to the newest and downloading each book
//! - Handling termination requests and errors by saving progress first

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, download_file, fetch_book_metadata, fetch_page};
use crate::crawler::parser::{extract_book_links, extract_total_pages, SiteMarkers};
use crate::interrupt::{Interrupt, Signal};
use crate::logging::FileLogger;
use crate::output::{artifact_paths, write_artifacts, CrawlStatistics};
use crate::state::{processing_order, skip_processed, Blacklist, Progress};
use crate::url::page_url;
use crate::SweepError;
use reqwest::Client;
use std::path::Path;

/// How a crawl ended without a fatal error
#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    /// Every page down to the newest was processed
    Completed(CrawlStatistics),
    /// A termination request stopped the crawl after progress was saved
    Interrupted(Signal),
}

enum Stop {
    Signal(Signal),
    Finished(Result<(), SweepError>),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    progress: Progress,
    blacklist: Blacklist,
    logger: FileLogger,
    client: Client,
    markers: SiteMarkers,
    interrupt: Interrupt,
    stats: CrawlStatistics,
    downloads_since_save: u64,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fresh` - Ignore the stored progress record and start from defaults
    /// * `interrupt` - Handle that termination requests are recorded on
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - The progress file is malformed or unreadable, or the
    ///   blacklist could not be read
    pub fn new(config: Config, fresh: bool, interrupt: Interrupt) -> Result<Self, SweepError> {
        let progress_path = Path::new(&config.paths.progress_file);
        let progress = if fresh {
            tracing::info!(
                "Starting fresh, ignoring progress in {}",
                progress_path.display()
            );
            Progress::fresh(progress_path, interrupt.clone())
        } else {
            Progress::open(progress_path, interrupt.clone())?
        };

        let blacklist = Blacklist::load(Path::new(&config.paths.blacklist_file))?;
        if !blacklist.is_empty() {
            tracing::info!("Loaded {} blacklisted links", blacklist.len());
        }

        let logger = FileLogger::new(
            Path::new(&config.logging.log_file),
            config.logging.level,
            config.logging.include_time,
            interrupt.clone(),
        );

        let client = build_http_client(&config.site)?;

        Ok(Self {
            config,
            progress,
            blacklist,
            logger,
            client,
            markers: SiteMarkers::default(),
            interrupt,
            stats: CrawlStatistics::new(),
            downloads_since_save: 0,
        })
    }

    /// Replaces the page layout markers
    pub fn with_markers(mut self, markers: SiteMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Reads the current page count from the homepage and returns how many pages to crawl
    ///
    /// The stored page count is replaced by the new one. On failure the progress file is
    /// saved before the error is returned.
    pub async fn prepare(&mut self) -> Result<u64, SweepError> {
        let total = match self.read_total_pages().await {
            Ok(total) => total,
            Err(e) => {
                self.flush_after_error(&e);
                return Err(e);
            }
        };

        let stored = self.progress.record();
        let pages = self.progress.adjust_for_total_pages(total);
        tracing::info!(
            "{} pages listed (previously {}, {} done), crawling {} pages",
            total,
            stored.total_pages_at_last_check,
            stored.last_processed_page_number,
            pages
        );
        if pages == 0 && total > 0 {
            tracing::warn!(
                "Nothing to crawl: no pages were published since the last run. \
                 Use --fresh to start over from the oldest page"
            );
        }

        Ok(pages)
    }

    async fn read_total_pages(&self) -> Result<u64, SweepError> {
        let homepage = &self.config.site.homepage;
        let html = fetch_page(&self.client, &self.config.site.user_agent, homepage).await?;

        extract_total_pages(&html, &self.markers).map_err(|source| SweepError::Extraction {
            url: homepage.clone(),
            source,
        })
    }

    /// Crawls listing pages `pages` down to 1
    ///
    /// A delivered termination request wins over the crawl: progress is saved and
    /// `CrawlOutcome::Interrupted` is returned. Requests raised during a durable write are
    /// only delivered once the write is complete.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome::Completed)` - All pages were processed and progress saved
    /// * `Ok(CrawlOutcome::Interrupted)` - Stopped by a termination request
    /// * `Err(SweepError)` - A page could not be fetched or parsed; progress was saved
    pub async fn crawl(&mut self, pages: u64) -> Result<CrawlOutcome, SweepError> {
        let interrupt = self.interrupt.clone();

        let stop = tokio::select! {
            biased;
            signal = interrupt.delivered() => Stop::Signal(signal),
            result = self.crawl_pages(pages) => Stop::Finished(result),
        };

        match stop {
            Stop::Signal(signal) => {
                self.terminate(signal)?;
                Ok(CrawlOutcome::Interrupted(signal))
            }
            Stop::Finished(Ok(())) => {
                self.progress.save()?;
                tracing::info!("Done!");
                Ok(CrawlOutcome::Completed(self.stats.clone()))
            }
            Stop::Finished(Err(e)) => {
                self.flush_after_error(&e);
                Err(e)
            }
        }
    }

    async fn crawl_pages(&mut self, pages: u64) -> Result<(), SweepError> {
        for page_number in (1..=pages).rev() {
            self.crawl_page(page_number).await?;
        }
        Ok(())
    }

    /// Processes every new book on a listing page, then marks the page as done
    async fn crawl_page(&mut self, page_number: u64) -> Result<(), SweepError> {
        let url = page_url(&self.config.site.page_url_template, page_number)?;
        tracing::info!("Crawling page {}: {}", page_number, url);

        let html = fetch_page(&self.client, &self.config.site.user_agent, url.as_str()).await?;
        let links = extract_book_links(&html, &self.markers).map_err(|source| {
            SweepError::Extraction {
                url: url.to_string(),
                source,
            }
        })?;

        let ordered = processing_order(links);
        let listed = ordered.len();
        let pending = skip_processed(ordered, self.progress.last_book_url());
        self.stats.books_skipped_processed += (listed - pending.len()) as u64;
        self.stats.books_seen += pending.len() as u64;

        for link in pending {
            if self.blacklist.contains(&link) {
                tracing::debug!("Skipping blacklisted {}", link);
                self.stats.books_skipped_blacklisted += 1;
                continue;
            }

            match self.process_book(&link).await {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => self.record_failure(&link, &e)?,
                Err(e) => return Err(e),
            }
        }

        self.progress.record_page(page_number);
        self.stats.pages_crawled += 1;
        Ok(())
    }

    /// Downloads one book and moves the resume cursor to it
    async fn process_book(&mut self, link: &str) -> Result<(), SweepError> {
        tracing::info!("{}", link);

        let metadata =
            fetch_book_metadata(&self.client, &self.config.site.user_agent, link, &self.markers)
                .await?;
        let pdf = download_file(&self.client, &metadata.pdf_download_url)
            .await
            .map_err(|source| SweepError::DownloadFailed {
                url: metadata.pdf_download_url.clone(),
                source,
            })?;

        let paths = artifact_paths(
            Path::new(&self.config.paths.download_root),
            &metadata.category,
            &metadata.pdf_download_url,
        );

        {
            let _section = self.interrupt.block();
            write_artifacts(&paths, &pdf, &metadata.summary)?;
            self.progress.record_book(link);
        }

        self.stats.books_downloaded += 1;
        self.stats.bytes_downloaded += pdf.len() as u64;
        self.checkpoint()?;

        Ok(())
    }

    /// Saves progress every `save-every-books` downloads
    fn checkpoint(&mut self) -> Result<(), SweepError> {
        let every = self.config.progress.save_every_books;
        if every == 0 {
            return Ok(());
        }

        self.downloads_since_save += 1;
        if self.downloads_since_save >= every {
            self.progress.save()?;
            self.downloads_since_save = 0;
            tracing::debug!("Checkpoint saved to {}", self.progress.path().display());
        }
        Ok(())
    }

    /// Writes a skipped book's failure to the log file
    fn record_failure(&mut self, link: &str, error: &SweepError) -> Result<(), SweepError> {
        tracing::warn!("Skipping {}: {}", link, error);
        self.stats.downloads_failed += 1;

        if let SweepError::DownloadFailed { url, source } = error {
            self.logger.error(&format!("{}: {}", source, url))?;
        }
        Ok(())
    }

    fn terminate(&mut self, signal: Signal) -> Result<(), SweepError> {
        let _section = self.interrupt.block();

        tracing::warn!("{} received. Saving progress...", signal);
        self.logger.info("Saving progress...")?;
        self.progress.save()?;
        self.logger.info(&format!("Terminated by {}", signal))?;
        tracing::warn!("Terminated. Progress saved to {}", self.progress.path().display());

        Ok(())
    }

    /// Best-effort save before a fatal error is returned
    fn flush_after_error(&self, error: &SweepError) {
        tracing::error!("{}", error);

        if let Err(e) = self.logger.critical(&error.to_string()) {
            tracing::error!("Failed to write log file {}: {}", self.logger.path().display(), e);
        }
        match self.progress.save() {
            Ok(()) => tracing::info!("Progress saved to {}", self.progress.path().display()),
            Err(e) => tracing::error!("Failed to save progress: {}", e),
        }
    }
}
