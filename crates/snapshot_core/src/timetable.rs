//! Timetable report rules: the form submitted to the report endpoint and the
//! cell parsing applied to each result row.

use crate::model::TimetableEntry;

/// Number of characters the report appends to the CRN inside row links.
pub const CRN_LINK_SUFFIX_LEN: usize = 2;

/// Column holding the anchor whose link carries the CRN.
pub const CRN_COLUMN: &str = "Text";

/// Marker the report uses for an affirmative first-year-seminar flag.
const FYS_MARKER: &str = "Y";

/// Columns the extractor understands. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimetableColumn {
    WorldCulture,
    Distributive,
    Language,
    FirstYearSeminar,
    Enrollment,
    Limit,
}

impl TimetableColumn {
    pub fn from_header(header: &str) -> Option<Self> {
        match header {
            "WC" => Some(Self::WorldCulture),
            "Dist" => Some(Self::Distributive),
            "Lang Req" => Some(Self::Language),
            "FYS" => Some(Self::FirstYearSeminar),
            "Enrl" => Some(Self::Enrollment),
            "Lim" => Some(Self::Limit),
            _ => None,
        }
    }
}

/// Query for the timetable report. Only the term list varies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimetableQuery {
    pub terms: Vec<String>,
}

impl TimetableQuery {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Form fields in submission order. `terms` is a multi-value field and the
    /// report rejects a single value, so a lone term gets an empty companion.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut terms = self.terms.clone();
        if terms.len() == 1 {
            terms.push(String::new());
        }

        let mut fields: Vec<(&'static str, String)> = [
            ("classyear", "2008"),
            ("searchtype", "Subject Area(s)"),
            ("pmode", "public"),
            ("term", ""),
            ("levl", ""),
            ("fys", "n"),
            ("wrt", "n"),
            ("pe", "n"),
            ("review", "n"),
            ("crnl", "no_value"),
            ("termradio", "selectterms"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        fields.extend(terms.into_iter().map(|term| ("terms", term)));

        fields.extend(
            [
                ("hoursradio", "allhours"),
                ("periods", "no_value"),
                ("subjectradio", "allsubjects"),
                ("depts", "no_value"),
                ("deliveryradio", "alldelivery"),
                ("deliverymodes", "no_value"),
                ("distribs_i", "no_value"),
                ("distribs_wc", "no_value"),
                ("distribs_lang", "no_value"),
                ("distribradio", "alldistribs"),
                ("distribs", "no_value"),
                ("sortorder", "dept"),
            ]
            .into_iter()
            .map(|(k, v)| (k, v.to_string())),
        );
        fields
    }
}

/// Strips literal `&nbsp` residue and non-breaking spaces, then trims.
pub fn clean_cell(text: &str) -> String {
    text.replace("&nbsp", "")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// CRN from a row link target: the text after the last `=`, minus the
/// two-character suffix the report appends.
pub fn crn_from_href(href: &str) -> Option<String> {
    let tail = href.rsplit('=').next().unwrap_or(href);
    let keep = tail.chars().count().saturating_sub(CRN_LINK_SUFFIX_LEN);
    let crn: String = tail.chars().take(keep).collect();
    if crn.is_empty() {
        None
    } else {
        Some(crn)
    }
}

pub fn split_tags(text: &str) -> Vec<String> {
    clean_cell(text)
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

/// Alternatives are rendered as `X or Y`; either tag satisfies the requirement.
pub fn split_distributives(text: &str) -> Vec<String> {
    clean_cell(text)
        .replace(" or ", " ")
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

pub fn parse_language(text: &str) -> Option<String> {
    let cleaned = clean_cell(text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

pub fn parse_flag(text: &str) -> bool {
    clean_cell(text) == FYS_MARKER
}

/// Integer when the cell is purely digits, otherwise absent.
pub fn parse_count(text: &str) -> Option<u32> {
    let cleaned = clean_cell(text);
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

impl TimetableEntry {
    /// Builds an entry from `(header, cell text)` pairs of one row.
    pub fn from_columns<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entry = Self::default();
        for (header, text) in columns {
            match TimetableColumn::from_header(header) {
                Some(TimetableColumn::WorldCulture) => entry.wc = split_tags(text),
                Some(TimetableColumn::Distributive) => entry.dist = split_distributives(text),
                Some(TimetableColumn::Language) => entry.lang = parse_language(text),
                Some(TimetableColumn::FirstYearSeminar) => entry.fys = parse_flag(text),
                Some(TimetableColumn::Enrollment) => entry.enrl = parse_count(text),
                Some(TimetableColumn::Limit) => entry.lim = parse_count(text),
                None => {}
            }
        }
        entry
    }
}

/// Rebuilds rows from a flat cell sequence using the header width.
///
/// Cells beyond the last full row are dropped. A missing cell anywhere shifts
/// every following row.
pub fn chunk_rows<T>(cells: Vec<T>, width: usize) -> Vec<Vec<T>> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Vec::with_capacity(cells.len() / width);
    let mut current = Vec::with_capacity(width);
    for cell in cells {
        current.push(cell);
        if current.len() == width {
            rows.push(std::mem::replace(&mut current, Vec::with_capacity(width)));
        }
    }
    rows
}
