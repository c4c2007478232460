use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use glinax_crawler::{CrawlerConfig, Fetch, FetchResult};
use glinax_extract::{AdmissionsPageRules, MainPageRules};
use log::{info, warn};

use crate::model::{PageOutcome, ScrapedRecord, Snapshot, UniversityRecord};
use crate::reference::ReferenceData;
use crate::registry::{SourceRegistry, SourceTarget};

/// Drives one scrape run over every registered source.
///
/// Sources are visited sequentially in registry order. A source whose pages
/// can't be reached at the transport level is replaced wholesale by its
/// fallback record; HTTP error statuses are recorded and scraping goes on.
pub struct Orchestrator<F> {
    fetcher: F,
    registry: SourceRegistry,
    reference: ReferenceData,
    max_retries: u32,
    source_delay: Duration,
}

impl<F: Fetch> Orchestrator<F> {
    pub fn new(fetcher: F, reference: ReferenceData, config: &CrawlerConfig) -> Result<Self> {
        let registry = reference.registry()?;
        Ok(Self {
            fetcher,
            registry,
            reference,
            max_retries: config.max_retries,
            source_delay: config.source_delay(),
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Scrapes every registered source in order. Consecutive sources are
    /// `source_delay` apart; there is no pause after the last one.
    pub async fn run(&self) -> Snapshot {
        info!("Scraping {} sources", self.registry.len());

        let mut universities = BTreeMap::new();
        let mut targets = self.registry.iter().peekable();
        while let Some(target) = targets.next() {
            let record = self.scrape_or_fallback(target, &target.rules()).await;
            universities.insert(target.code.clone(), record);

            if targets.peek().is_some() && !self.source_delay.is_zero() {
                tokio::time::sleep(self.source_delay).await;
            }
        }

        let now = Utc::now();
        let snapshot = Snapshot {
            universities,
            scholarships: self.reference.scholarships_at(now),
            cut_off_points: self.reference.cut_offs_at(now),
        };
        let fallbacks = snapshot
            .universities
            .values()
            .filter(|r| r.is_fallback())
            .count();
        info!(
            "Scraped {} sources ({} fallbacks), {} scholarships",
            snapshot.universities.len(),
            fallbacks,
            snapshot.scholarships.len()
        );
        snapshot
    }

    /// Scrapes `target` with the given `rules`, falling back to its
    /// hand-authored record on transport failure.
    pub async fn scrape_or_fallback<R>(&self, target: &SourceTarget, rules: &R) -> UniversityRecord
    where
        R: MainPageRules + AdmissionsPageRules,
    {
        info!("Scraping {} ({})", target.code, target.url);
        match self.scrape(target, rules).await {
            Ok(record) => UniversityRecord::Scraped(record),
            Err(e) => {
                warn!("Using fallback data for {}: {:#}", target.code, e);
                UniversityRecord::Fallback(target.fallback_record())
            }
        }
    }

    async fn scrape<R>(&self, target: &SourceTarget, rules: &R) -> Result<ScrapedRecord>
    where
        R: MainPageRules + AdmissionsPageRules,
    {
        let main = match self.fetch_page(&target.url).await? {
            PageOutcome::Read(body) => PageOutcome::Read(rules.scrap_main(&body)),
            PageOutcome::Unreachable(status) => PageOutcome::Unreachable(status),
        };
        let admissions = match self.fetch_page(&target.admissions_url).await? {
            PageOutcome::Read(body) => PageOutcome::Read(rules.scrap_admissions(&body)),
            PageOutcome::Unreachable(status) => PageOutcome::Unreachable(status),
        };

        let source_urls = vec![target.url.clone(), target.admissions_url.clone()];
        Ok(ScrapedRecord::merge(main, admissions, source_urls, Utc::now()))
    }

    /// Fetches `url`, retrying transport failures up to `max_retries` times.
    async fn fetch_page(&self, url: &str) -> Result<PageOutcome<String>> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(url).await {
                FetchResult::Ok { body, .. } => return Ok(PageOutcome::Read(body)),
                FetchResult::HttpError(status) => {
                    warn!("Got HTTP {status} for {url}");
                    return Ok(PageOutcome::Unreachable(status));
                }
                FetchResult::TransportError(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Couldn't fetch {url} (attempt {attempt}/{}): {e}",
                        self.max_retries + 1
                    );
                }
                FetchResult::TransportError(e) => {
                    return Err(e.context(format!("Couldn't fetch {url}")));
                }
            }
        }
    }
}
