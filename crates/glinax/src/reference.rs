use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{CutOffTable, ScholarshipInfo, ScholarshipRecord, YearCutOffs};
use crate::registry::{SourceRegistry, SourceTarget};

const BUNDLED: &str = include_str!("../reference/ghana.yaml");

/// Hand-curated inputs of a run: the sources to scrape and the
/// scholarship and cut-off tables published alongside them.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceData {
    pub sources: Vec<SourceTarget>,
    #[serde(default)]
    pub scholarships: BTreeMap<String, ScholarshipInfo>,
    pub cut_offs: CutOffReference,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CutOffReference {
    pub source: String,
    #[serde(default)]
    pub years: BTreeMap<String, YearCutOffs>,
}

impl ReferenceData {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_yaml_str(BUNDLED).context("Invalid bundled reference data")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs_err::read_to_string(path).context("Cannot read reference data")?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid reference data in {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn registry(&self) -> Result<SourceRegistry> {
        SourceRegistry::new(self.sources.clone())
    }

    pub fn scholarships_at(&self, now: DateTime<Utc>) -> BTreeMap<String, ScholarshipRecord> {
        self.scholarships
            .iter()
            .map(|(id, info)| {
                let record = ScholarshipRecord {
                    info: info.clone(),
                    last_updated: now,
                };
                (id.clone(), record)
            })
            .collect()
    }

    pub fn cut_offs_at(&self, now: DateTime<Utc>) -> CutOffTable {
        CutOffTable {
            source: self.cut_offs.source.clone(),
            last_updated: now,
            years: self.cut_offs.years.clone(),
        }
    }
}
