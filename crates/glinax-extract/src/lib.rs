//! Pattern-based extraction of admissions facts from HTML pages.
//!
//! Every extractor is a pure function over a parsed [`Document`] or its
//! rendered text. Finding nothing is a valid outcome, never an error.

mod extract;
mod fragment;
mod rules;
mod text;

pub use extract::{
    extract_contacts, extract_deadlines, extract_description, extract_programs,
    extract_requirements, MAX_PROGRAMS, MAX_REQUIREMENTS,
};
pub use fragment::{AdmissionsFragments, ContactInfo, MainPageFragments};
pub use rules::{AdmissionsPageRules, DefaultRules, HintedRules, MainPageRules};
pub use text::page_text;

pub use select::document::Document;
