use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::config::Throttle;

/// Fixed-interval limiter keyed by host.
///
/// Each host owns a "next free slot". Acquiring a slot reserves it and pushes
/// the next one `interval` further, so callers targeting the same host are
/// spaced out regardless of the order in which they arrive. Requests to
/// distinct hosts never wait on each other.
#[derive(Debug, Clone)]
pub struct HostLimiter {
    interval: Duration,
    slots: Arc<Mutex<HashMap<String, Instant>>>,
}

impl HostLimiter {
    pub fn new(throttle: Throttle) -> Self {
        Self::with_interval(throttle.interval())
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Waits until a request to `url` is allowed.
    pub async fn until_ready(&self, url: &str) {
        let host = host_key(url);
        let slot = {
            let mut slots = self.slots.lock().await;
            let now = Instant::now();
            let slot = match slots.get(&host) {
                Some(next) if *next > now => *next,
                _ => now,
            };
            slots.insert(host.clone(), slot + self.interval);
            slot
        };

        if slot > Instant::now() {
            log::debug!("Throttling request to {host}");
        }
        sleep_until(slot).await;
    }
}

fn host_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_key_ignores_path_and_case() {
        assert_eq!(host_key("https://WWW.knust.edu.gh/admissions"), "www.knust.edu.gh");
        assert_eq!(host_key("not a url"), "not a url");
    }

    #[tokio::test(start_paused = true)]
    async fn same_host_requests_are_spaced() {
        let limiter = HostLimiter::with_interval(Duration::from_secs(2));
        let start = Instant::now();

        limiter.until_ready("https://www.ug.edu.gh").await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.until_ready("https://www.ug.edu.gh/admissions").await;
        limiter.until_ready("https://www.ug.edu.gh/contact").await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(4010), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_hosts_do_not_wait() {
        let limiter = HostLimiter::with_interval(Duration::from_secs(2));
        let start = Instant::now();

        limiter.until_ready("https://www.ug.edu.gh").await;
        limiter.until_ready("https://www.ucc.edu.gh").await;
        limiter.until_ready("https://www.knust.edu.gh").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_interval_frees_the_slot() {
        let limiter = HostLimiter::with_interval(Duration::from_secs(2));

        limiter.until_ready("https://www.ug.edu.gh").await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let start = Instant::now();
        limiter.until_ready("https://www.ug.edu.gh").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
