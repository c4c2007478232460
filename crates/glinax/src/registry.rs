use std::collections::HashSet;

use anyhow::{bail, Result};
use glinax_extract::HintedRules;
use serde::{Deserialize, Serialize};

use crate::model::FallbackRecord;

/// One institution to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTarget {
    pub code: String,
    pub url: String,
    pub admissions_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programs_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackRecord>,
}

impl SourceTarget {
    /// Extraction rules steered by this source's selector hints.
    pub fn rules(&self) -> HintedRules {
        HintedRules::new(
            self.programs_selector.as_deref(),
            self.requirements_selector.as_deref(),
        )
    }

    /// The record substituted when this source can't be scraped.
    pub fn fallback_record(&self) -> FallbackRecord {
        self.fallback.clone().unwrap_or_else(FallbackRecord::unavailable)
    }
}

/// The fixed, ordered set of sources scraped by a run.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    targets: Vec<SourceTarget>,
}

impl SourceRegistry {
    pub fn new(targets: Vec<SourceTarget>) -> Result<Self> {
        let mut seen = HashSet::new();
        for target in &targets {
            if target.code.trim().is_empty() {
                bail!("Source with url `{}` has an empty code", target.url);
            }
            if !seen.insert(target.code.as_str()) {
                bail!("Duplicate source code `{}`", target.code);
            }
            if target.url.trim().is_empty() || target.admissions_url.trim().is_empty() {
                bail!("Source `{}` is missing a url", target.code);
            }
        }
        Ok(Self { targets })
    }

    pub fn get(&self, code: &str) -> Option<&SourceTarget> {
        self.targets.iter().find(|t| t.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceTarget> {
        self.targets.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
