use pretty_assertions::assert_eq;
use snapshot_core::{
    chunk_rows, clean_cell, crn_from_href, parse_count, parse_flag, parse_language,
    split_distributives, split_tags, TimetableEntry, TimetableQuery,
};

#[test]
fn crn_is_taken_after_last_equals_without_suffix() {
    assert_eq!(
        crn_from_href("timetable.course_detail?p_term=202403&p_crn=1234567XX").as_deref(),
        Some("1234567")
    );
    assert_eq!(crn_from_href("detail?a=1&crn=99XX").as_deref(), Some("99"));
    assert_eq!(crn_from_href("x=ab"), None);
}

#[test]
fn distributives_drop_the_word_or() {
    assert_eq!(split_distributives("SOC or SCI"), vec!["SOC", "SCI"]);
    assert_eq!(split_distributives("TAS"), vec!["TAS"]);
    assert_eq!(split_distributives(""), Vec::<String>::new());
}

#[test]
fn world_culture_tags_split_on_whitespace() {
    assert_eq!(split_tags(" W  NW&nbsp"), vec!["W", "NW"]);
    assert_eq!(split_tags("\u{a0}"), Vec::<String>::new());
}

#[test]
fn counts_parse_only_pure_digits() {
    assert_eq!(parse_count("15"), Some(15));
    assert_eq!(parse_count(" 15 "), Some(15));
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("N/A"), None);
    assert_eq!(parse_count("-3"), None);
}

#[test]
fn language_and_seminar_flags() {
    assert_eq!(parse_language("  LANG "), Some("LANG".to_string()));
    assert_eq!(parse_language("&nbsp"), None);
    assert!(parse_flag("Y"));
    assert!(!parse_flag("y"));
    assert!(!parse_flag(""));
    assert_eq!(clean_cell(" a&nbsp "), "a");
}

#[test]
fn entry_ignores_unknown_columns() {
    let entry = TimetableEntry::from_columns([
        ("Term", "202403"),
        ("WC", "CI"),
        ("Dist", "LIT or ART"),
        ("Lang Req", ""),
        ("FYS", "Y"),
        ("Enrl", "12"),
        ("Lim", "16"),
        ("Instructor", "Someone"),
    ]);
    assert_eq!(
        entry,
        TimetableEntry {
            wc: vec!["CI".into()],
            dist: vec!["LIT".into(), "ART".into()],
            lang: None,
            fys: true,
            enrl: Some(12),
            lim: Some(16),
        }
    );
}

#[test]
fn rows_are_rebuilt_from_header_width() {
    let rows = chunk_rows(vec![1, 2, 3, 4, 5, 6, 7], 3);
    assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);
    assert!(chunk_rows(vec![1, 2], 0).is_empty());
}

#[test]
fn single_term_gets_an_empty_companion() {
    let fields = TimetableQuery::new(["202403"]).form_fields();
    let terms: Vec<&str> = fields
        .iter()
        .filter(|(k, _)| *k == "terms")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(terms, vec!["202403", ""]);
    assert_eq!(fields.len(), 25);

    let fields = TimetableQuery::new(["202403", "202406"]).form_fields();
    let terms: Vec<&str> = fields
        .iter()
        .filter(|(k, _)| *k == "terms")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(terms, vec!["202403", "202406"]);
    assert!(fields.contains(&("sortorder", "dept".to_string())));
}
