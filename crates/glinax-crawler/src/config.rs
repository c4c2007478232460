use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_throttle")]
    pub throttle: Throttle,

    /// Pause in seconds between two consecutive sources
    #[serde(default = "default_source_delay")]
    pub source_delay: f32,

    /// Extra attempts made when a request fails at the transport level
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            throttle: default_throttle(),
            source_delay: default_source_delay(),
            max_retries: default_max_retries(),
        }
    }
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn source_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.source_delay).unwrap_or_default()
    }

    /// Rejects delays and rates that can't be turned into a [`Duration`].
    pub fn validate(&self) -> Result<()> {
        self.throttle.try_interval()?;
        Duration::try_from_secs_f32(self.source_delay)
            .map_err(|e| anyhow!("Invalid sourceDelay {}: {e}", self.source_delay))?;
        Ok(())
    }
}

fn default_user_agent() -> String {
    String::from("Glinax University Bot 1.0 (Educational Purpose)")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_throttle() -> Throttle {
    Throttle::default()
}

fn default_source_delay() -> f32 {
    2.0
}

fn default_max_retries() -> u32 {
    0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Throttle {
    /// The number of requests per second to a single host
    PerSecond(NonZeroUsize),
    /// The delay in seconds between requests to a single host
    Delay(f32),
}

impl Throttle {
    /// Minimum spacing between two requests hitting the same host, zero
    /// when the throttle is invalid.
    pub fn interval(&self) -> Duration {
        self.try_interval().unwrap_or_default()
    }

    pub fn try_interval(&self) -> Result<Duration> {
        match self {
            Self::PerSecond(n) => {
                let n = u32::try_from(n.get())
                    .map_err(|_| anyhow!("Invalid throttle: {n} requests per second is too many"))?;
                Ok(Duration::from_secs(1) / n)
            }
            Self::Delay(secs) => Duration::try_from_secs_f32(*secs)
                .map_err(|e| anyhow!("Invalid throttle delay {secs}: {e}")),
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::Delay(2.0)
    }
}
