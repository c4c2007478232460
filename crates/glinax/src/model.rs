use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use glinax_extract::{AdmissionsFragments, ContactInfo, MainPageFragments};
use serde::{Deserialize, Serialize};

/// Hand-authored facts about an institution, used when it can't be scraped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established: Option<u16>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FallbackRecord {
    /// Stand-in for sources without any hand-authored data.
    pub fn unavailable() -> Self {
        Self {
            note: Some("no data available".to_string()),
            ..Default::default()
        }
    }
}

/// Everything scraped from an institution's two pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub url_accessible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,

    pub admissions_url_accessible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admissions_status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlines: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<String>>,

    pub last_updated: DateTime<Utc>,
    pub source_urls: Vec<String>,
}

/// Result of fetching one page of a source, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome<T> {
    Read(T),
    Unreachable(u16),
}

impl ScrapedRecord {
    pub fn merge(
        main: PageOutcome<MainPageFragments>,
        admissions: PageOutcome<AdmissionsFragments>,
        source_urls: Vec<String>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let (url_accessible, status_code, main) = match main {
            PageOutcome::Read(fragments) => (true, None, fragments),
            PageOutcome::Unreachable(status) => (false, Some(status), Default::default()),
        };
        let (admissions_url_accessible, admissions_status_code, admissions) = match admissions {
            PageOutcome::Read(fragments) => (true, None, fragments),
            PageOutcome::Unreachable(status) => (false, Some(status), Default::default()),
        };

        Self {
            url_accessible,
            status_code,
            description: main.description,
            contact: main.contact,
            admissions_url_accessible,
            admissions_status_code,
            admission_requirements: admissions.admission_requirements,
            deadlines: admissions.deadlines,
            programs: admissions.programs,
            last_updated,
            source_urls,
        }
    }
}

/// One institution in a snapshot: fully scraped or fully substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UniversityRecord {
    Scraped(ScrapedRecord),
    Fallback(FallbackRecord),
}

impl UniversityRecord {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipInfo {
    pub full_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coverage: Vec<String>,
    pub eligibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partner_universities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond_requirement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipRecord {
    #[serde(flatten)]
    pub info: ScholarshipInfo,
    pub last_updated: DateTime<Utc>,
}

/// institution → program → cut-off aggregate
pub type YearCutOffs = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutOffTable {
    pub source: String,
    pub last_updated: DateTime<Utc>,
    /// Keyed by academic year, e.g. `2024_2025`.
    #[serde(flatten)]
    pub years: BTreeMap<String, YearCutOffs>,
}

/// Complete result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub universities: BTreeMap<String, UniversityRecord>,
    pub scholarships: BTreeMap<String, ScholarshipRecord>,
    pub cut_off_points: CutOffTable,
}
