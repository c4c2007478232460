use std::collections::BTreeSet;

use select::document::Document;
use select::predicate::{Class, Name, Predicate};

use crate::extract::{self, MAX_PROGRAMS, MAX_REQUIREMENTS};
use crate::fragment::{AdmissionsFragments, ContactInfo, MainPageFragments};
use crate::text::{page_text, rendered_within};

/// Extraction rules for an institution's home page.
pub trait MainPageRules {
    fn description(&self, document: &Document) -> Option<String> {
        extract::extract_description(document)
    }

    fn contacts(&self, text: &str) -> Option<ContactInfo> {
        extract::extract_contacts(text)
    }

    fn scrap_main(&self, markup: &str) -> MainPageFragments {
        let document = Document::from(markup);
        MainPageFragments {
            description: self.description(&document),
            contact: self.contacts(&page_text(&document)),
        }
    }
}

/// Extraction rules for an institution's admissions page.
pub trait AdmissionsPageRules {
    fn requirements(&self, document: &Document) -> Vec<String> {
        extract::extract_requirements(document)
    }

    fn deadlines(&self, text: &str) -> BTreeSet<String> {
        extract::extract_deadlines(text)
    }

    fn programs(&self, document: &Document) -> Vec<String> {
        extract::extract_programs(document)
    }

    fn scrap_admissions(&self, markup: &str) -> AdmissionsFragments {
        let document = Document::from(markup);
        let requirements = self.requirements(&document);
        let deadlines = self.deadlines(&page_text(&document));
        let programs = self.programs(&document);

        AdmissionsFragments {
            admission_requirements: non_empty(requirements),
            deadlines: (!deadlines.is_empty()).then_some(deadlines),
            programs: non_empty(programs),
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// The plain keyword heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRules;

impl MainPageRules for DefaultRules {}

impl AdmissionsPageRules for DefaultRules {}

/// Keyword heuristics steered by per-institution class hints such as
/// `.program-list, .course-list`.
///
/// When the page has elements carrying one of the hinted classes, their
/// content is used; otherwise extraction falls back to [`DefaultRules`].
#[derive(Debug, Clone, Default)]
pub struct HintedRules {
    program_classes: Vec<String>,
    requirement_classes: Vec<String>,
}

impl HintedRules {
    pub fn new(programs_selector: Option<&str>, requirements_selector: Option<&str>) -> Self {
        Self {
            program_classes: programs_selector.map(parse_classes).unwrap_or_default(),
            requirement_classes: requirements_selector
                .map(parse_classes)
                .unwrap_or_default(),
        }
    }
}

/// Keeps the plain `.class` parts of a selector list.
fn parse_classes(selector: &str) -> Vec<String> {
    selector
        .split(',')
        .map(str::trim)
        .filter_map(|part| match part.strip_prefix('.') {
            Some(class) if !class.is_empty() && class.chars().all(is_class_char) => {
                Some(class.to_string())
            }
            _ => {
                if !part.is_empty() {
                    log::debug!("Ignoring unsupported selector hint `{part}`");
                }
                None
            }
        })
        .collect()
}

fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl MainPageRules for HintedRules {}

impl AdmissionsPageRules for HintedRules {
    fn requirements(&self, document: &Document) -> Vec<String> {
        let hinted: Vec<String> = self
            .requirement_classes
            .iter()
            .flat_map(|class| document.find(Class(class.as_str())))
            .filter_map(|block| rendered_within(block, |len| (20..500).contains(&len)))
            .take(MAX_REQUIREMENTS)
            .collect();

        if hinted.is_empty() {
            DefaultRules.requirements(document)
        } else {
            hinted
        }
    }

    fn programs(&self, document: &Document) -> Vec<String> {
        let hinted: Vec<String> = self
            .program_classes
            .iter()
            .flat_map(|class| document.find(Class(class.as_str()).descendant(Name("li"))))
            .filter_map(|item| rendered_within(item, |len| 10 < len && len < 100))
            .take(MAX_PROGRAMS)
            .collect();

        if hinted.is_empty() {
            DefaultRules.programs(document)
        } else {
            hinted
        }
    }
}
