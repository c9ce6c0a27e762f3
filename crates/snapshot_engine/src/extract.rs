use std::collections::BTreeMap;

use engine_logging::{engine_debug, engine_warn};
use scraper::{ElementRef, Html, Selector};
use snapshot_core::{chunk_rows, clean_cell, crn_from_href, TimetableEntry, CRN_COLUMN};

use crate::ParseError;

const TABLE_CONTAINER: &str = "div.data-table";

/// Parses the timetable result table into entries keyed by CRN.
///
/// The report emits every `td` of the table flat, so rows are rebuilt from the
/// number of `th` cells. Rows whose link carries no CRN are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn extract(&self, html: &str) -> Result<BTreeMap<String, TimetableEntry>, ParseError> {
        let doc = Html::parse_document(html);
        let container_sel = selector(TABLE_CONTAINER)?;
        let header_sel = selector("th")?;
        let cell_sel = selector("td")?;
        let anchor_sel = selector("a[href]")?;

        let table = doc
            .select(&container_sel)
            .next()
            .ok_or(ParseError::MissingTable)?;

        let headers: Vec<String> = table
            .select(&header_sel)
            .map(|th| clean_cell(&th.text().collect::<String>()))
            .collect();
        let cells: Vec<ElementRef> = table.select(&cell_sel).collect();

        if headers.is_empty() {
            engine_warn!("Course table has no header cells; no rows extracted");
            return Ok(BTreeMap::new());
        }
        if cells.len() % headers.len() != 0 {
            engine_warn!(
                "Course table has {} cells for {} columns; trailing cells dropped",
                cells.len(),
                headers.len()
            );
        }

        let crn_index = headers.iter().rposition(|h| h == CRN_COLUMN);
        let mut parsed = BTreeMap::new();
        for row in chunk_rows(cells, headers.len()) {
            let crn = crn_index
                .and_then(|index| row[index].select(&anchor_sel).next())
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(crn_from_href);
            let Some(crn) = crn else {
                engine_warn!("Skipping course table row without a CRN link");
                continue;
            };

            let texts: Vec<String> = row.iter().map(|cell| cell.text().collect()).collect();
            let entry = TimetableEntry::from_columns(
                headers
                    .iter()
                    .map(String::as_str)
                    .zip(texts.iter().map(String::as_str)),
            );
            parsed.insert(crn, entry);
        }

        engine_debug!("Extracted {} timetable rows", parsed.len());
        Ok(parsed)
    }
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|err| ParseError::Selector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}
