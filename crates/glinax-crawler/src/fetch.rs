use std::io::prelude::*;

use anyhow::Error;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use lazy_static::lazy_static;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, DNT, USER_AGENT};
use reqwest::Response;

use crate::config::CrawlerConfig;
use crate::limiter::HostLimiter;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";

lazy_static! {
    static ref HTTP_CLI: reqwest::Client = reqwest::ClientBuilder::new()
        .gzip(true)
        .deflate(true)
        .build()
        .unwrap();
}

/// Outcome of a single GET request.
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered with a 2xx status.
    Ok { body: String, status: u16 },
    /// The server answered with any other status.
    HttpError(u16),
    /// No usable answer: connection refused, timeout, broken body...
    TransportError(Error),
}

impl FetchResult {
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}

#[async_trait]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> FetchResult;
}

#[async_trait]
impl<T: Fetch + Sync + ?Sized> Fetch for &T {
    async fn fetch(&self, url: &str) -> FetchResult {
        (**self).fetch(url).await
    }
}

/// Issues one GET for `url`, bounded by `config.timeout()` and identified by
/// `config.user_agent`. Never retries.
pub async fn fetch(config: &CrawlerConfig, url: &str) -> FetchResult {
    let resp = match HTTP_CLI
        .get(url)
        .timeout(config.timeout())
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN)
        .header(DNT, "1")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return FetchResult::TransportError(e.into()),
    };

    let status = resp.status();
    if !status.is_success() {
        return FetchResult::HttpError(status.as_u16());
    }

    match read_body(resp).await {
        Ok(body) => FetchResult::Ok {
            body,
            status: status.as_u16(),
        },
        Err(e) => FetchResult::TransportError(e),
    }
}

async fn read_body(resp: Response) -> anyhow::Result<String> {
    let page = match resp.headers().get(CONTENT_TYPE) {
        Some(c) if c == "application/x-gzip" || c == "application/gzip" => {
            let compressed = resp.bytes().await?;
            let mut gz = GzDecoder::new(&compressed[..]);
            let mut page = String::new();
            gz.read_to_string(&mut page)?;
            page
        }
        _ => resp.text().await?,
    };
    Ok(page)
}

/// Network fetcher that spaces out requests per host before issuing them.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: CrawlerConfig,
    limiter: HostLimiter,
}

impl HttpFetcher {
    pub fn new(config: CrawlerConfig) -> Self {
        let limiter = HostLimiter::new(config.throttle);
        Self { config, limiter }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.limiter.until_ready(url).await;
        log::debug!("GET {url}");
        fetch(&self.config, url).await
    }
}
