use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use select::document::Document;
use select::predicate::{Attr, Name, Predicate};

use crate::fragment::ContactInfo;
use crate::text::{own_string, rendered_within};

/// Only the first matching blocks are considered for requirements.
pub const MAX_REQUIREMENTS: usize = 3;
/// Only the first matching elements are considered for programs.
pub const MAX_PROGRAMS: usize = 20;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"(\+233|0)[0-9]{9,10}").unwrap();
    static ref REQUIREMENT_RE: Regex = Regex::new(r"(?i)requirement|admission|entry").unwrap();
    static ref DEADLINE_RE: Regex = Regex::new(
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b"
    )
    .unwrap();
    static ref PROGRAM_RE: Regex = Regex::new(r"(?i)Bachelor|Master|PhD|Diploma").unwrap();
}

/// Emails and Ghanaian phone numbers found anywhere in `text`.
pub fn extract_contacts(text: &str) -> Option<ContactInfo> {
    let contact = ContactInfo {
        emails: EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        phones: PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    };

    (!contact.is_empty()).then_some(contact)
}

/// Content of the `<meta name="description">` tag, if any.
pub fn extract_description(document: &Document) -> Option<String> {
    document
        .find(Name("meta").and(Attr("name", "description")))
        .next()
        .map(|meta| meta.attr("content").unwrap_or_default().to_string())
}

/// Blurbs surrounding the first blocks that talk about requirements,
/// admission or entry. Each kept blurb is 20 to 499 characters long.
pub fn extract_requirements(document: &Document) -> Vec<String> {
    document
        .find(Name("div").or(Name("section")).or(Name("p")))
        .filter(|node| own_string(*node).map_or(false, |s| REQUIREMENT_RE.is_match(s)))
        .take(MAX_REQUIREMENTS)
        .filter_map(|node| {
            let block = node.parent().unwrap_or(node);
            rendered_within(block, |len| (20..500).contains(&len))
        })
        .collect()
}

/// Dates written as `<Month> <day>[st|nd|rd|th], <year>`.
pub fn extract_deadlines(text: &str) -> BTreeSet<String> {
    DEADLINE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Names of degree programmes listed on the page, strictly between 10 and
/// 100 characters long.
pub fn extract_programs(document: &Document) -> Vec<String> {
    document
        .find(Name("li").or(Name("div")))
        .filter(|node| own_string(*node).map_or(false, |s| PROGRAM_RE.is_match(s)))
        .take(MAX_PROGRAMS)
        .filter_map(|node| rendered_within(node, |len| 10 < len && len < 100))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contacts_from_plain_text() {
        let contact = extract_contacts("contact: a@b.com or 0244123456").unwrap();
        assert_eq!(contact.emails, BTreeSet::from(["a@b.com".to_string()]));
        assert!(contact.phones.contains("0244123456"));
    }

    #[test]
    fn contacts_are_deduplicated() {
        let contact = extract_contacts(
            "admissions@ug.edu.gh, +233302213850, admissions@ug.edu.gh, +233302213850",
        )
        .unwrap();
        assert_eq!(contact.emails.len(), 1);
        assert_eq!(
            contact.phones,
            BTreeSet::from(["+233302213850".to_string()])
        );
    }

    #[test]
    fn no_contacts_is_none() {
        assert_eq!(extract_contacts("Welcome to campus"), None);
        assert_eq!(extract_contacts("call 12345"), None);
    }

    #[test]
    fn deadline_with_ordinal() {
        assert_eq!(
            extract_deadlines("Apply by March 15th, 2025"),
            BTreeSet::from(["March 15th, 2025".to_string()])
        );
    }

    #[test]
    fn deadlines_without_dates() {
        assert!(extract_deadlines("Applications close soon, 2025 intake").is_empty());
        assert!(extract_deadlines("").is_empty());
    }

    #[test]
    fn deadlines_are_case_insensitive_and_unique() {
        let found = extract_deadlines(
            "Opens june 1 2025. Closes August 31st, 2025. Reminder: August 31st, 2025.",
        );
        assert_eq!(
            found,
            BTreeSet::from(["August 31st, 2025".to_string(), "june 1 2025".to_string()])
        );
    }

    #[test]
    fn description_from_meta() {
        let doc = Document::from(
            r#"<html><head><meta name="description" content="Premier university"></head></html>"#,
        );
        assert_eq!(extract_description(&doc).as_deref(), Some("Premier university"));
        assert_eq!(extract_description(&Document::from("<p>none</p>")), None);
    }

    #[test]
    fn requirements_take_the_parent_block() {
        let doc = Document::from(
            r#"<section>
                 <h2>x</h2>
                 <p>Entry Requirements</p>
                 <ul><li>Credit passes in six WASSCE subjects</li></ul>
               </section>"#,
        );
        let found = extract_requirements(&doc);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with('x'));
        assert!(found[0].contains("Entry Requirements"));
        assert!(found[0].contains("six WASSCE subjects"));
    }

    #[test]
    fn requirements_outside_length_window_are_dropped() {
        let long = "a".repeat(600);
        let doc = Document::from(format!(
            "<div><p>Admission</p></div><div><p>Admission</p>{long}</div>"
        ).as_str());
        assert!(extract_requirements(&doc).is_empty());
    }

    #[test]
    fn only_first_three_requirement_blocks_count() {
        let block = "<div><p>Admission requirements apply</p><span>to every applicant</span></div>";
        let doc = Document::from(block.repeat(5).as_str());
        assert_eq!(extract_requirements(&doc).len(), 3);
    }

    #[test]
    fn programs_keep_list_items() {
        let doc = Document::from(
            "<ul><li>Bachelor of Science in Nursing</li><li>PhD</li><li>Master of Laws (LLM)</li><li>Campus tour</li></ul>",
        );
        assert_eq!(
            extract_programs(&doc),
            vec!["Bachelor of Science in Nursing", "Master of Laws (LLM)"]
        );
    }
}
