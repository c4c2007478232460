//! Scrapes admissions facts about Ghanaian universities and publishes them,
//! together with curated scholarship and cut-off tables, as JSON artifacts
//! and document store rows.

mod model;
mod orchestrator;
mod persist;
mod reference;
mod registry;

pub use model::{
    CutOffTable, FallbackRecord, PageOutcome, ScholarshipInfo, ScholarshipRecord, ScrapedRecord,
    Snapshot, UniversityRecord, YearCutOffs,
};
pub use orchestrator::Orchestrator;
pub use persist::{persist, CUT_OFF_POINTS_FILE, SCHOLARSHIPS_FILE, UNIVERSITIES_FILE};
pub use reference::{CutOffReference, ReferenceData};
pub use registry::{SourceRegistry, SourceTarget};
