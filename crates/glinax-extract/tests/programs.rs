use glinax_extract::{extract_programs, AdmissionsPageRules, DefaultRules, Document, MAX_PROGRAMS};

fn list_of(items: impl IntoIterator<Item = String>) -> String {
    let items: String = items.into_iter().map(|i| format!("<li>{i}</li>")).collect();
    format!("<html><body><ul>{items}</ul></body></html>")
}

#[test]
fn programs_are_capped() {
    let page = list_of((1..=50).map(|i| format!("Bachelor of Science in Subject {i:02}")));
    let programs = extract_programs(&Document::from(page.as_str()));

    assert_eq!(programs.len(), MAX_PROGRAMS);
    assert_eq!(programs[0], "Bachelor of Science in Subject 01");
    assert_eq!(programs[19], "Bachelor of Science in Subject 20");
}

#[test]
fn programs_outside_length_window_are_excluded() {
    let exactly_10 = "PhD Hist 1".to_string();
    let exactly_11 = "PhD History".to_string();
    let exactly_99 = format!("Master of {}", "x".repeat(89));
    let exactly_100 = format!("Master of {}", "x".repeat(90));
    assert_eq!(exactly_10.chars().count(), 10);
    assert_eq!(exactly_99.chars().count(), 99);

    let page = list_of([
        exactly_10,
        exactly_11.clone(),
        exactly_99.clone(),
        exactly_100,
    ]);
    let programs = extract_programs(&Document::from(page.as_str()));

    assert_eq!(programs, vec![exactly_11, exactly_99]);
}

#[test]
fn programs_require_a_degree_keyword() {
    let page = list_of([
        "Faculty of Engineering".to_string(),
        "diploma in basic education".to_string(),
        "Research and Innovation".to_string(),
    ]);
    let programs = extract_programs(&Document::from(page.as_str()));

    assert_eq!(programs, vec!["diploma in basic education"]);
}

#[test]
fn divs_count_as_program_entries() {
    let page = r#"<div class="card">Master of Business Administration</div>
                  <div class="card"><span>Bachelor of Laws (LLB)</span></div>"#;
    let programs = extract_programs(&Document::from(page));

    assert_eq!(
        programs,
        vec!["Master of Business Administration", "Bachelor of Laws (LLB)"]
    );
}

#[test]
fn admissions_page_serializes_without_empty_fields() {
    let page = r#"<div><p>Entry requirements for 2025</p><p>Six credits at WASSCE are needed.</p></div>
                  <ul><li>Bachelor of Arts in History</li></ul>
                  <p>Deadline: September 30th, 2025</p>"#;
    let fragments = DefaultRules.scrap_admissions(page);
    let json = serde_json::to_value(&fragments).unwrap();

    assert_eq!(
        json["programs"],
        serde_json::json!(["Bachelor of Arts in History"])
    );
    assert_eq!(json["deadlines"], serde_json::json!(["September 30th, 2025"]));
    assert_eq!(json["admission_requirements"].as_array().unwrap().len(), 1);

    let empty = serde_json::to_value(DefaultRules.scrap_admissions("<p>Nothing here</p>")).unwrap();
    assert_eq!(empty, serde_json::json!({}));
}
