mod config;
mod fetch;
mod limiter;

pub use config::{CrawlerConfig, Throttle};
pub use fetch::{fetch, Fetch, FetchResult, HttpFetcher};
pub use limiter::HostLimiter;

pub use anyhow;
