use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use snapshot_core::{TimetableEntry, TimetableQuery};
use snapshot_engine::{
    build_client, FailureKind, FetchSettings, ParseError, RenderError, RenderedPageFetcher,
    Renderer, SnapshotError, StaticRenderer, TableExtractor, TimetableSource,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT: &str = r#"
<html><head><title>Timetable</title></head><body>
<div class="data-table">
<table>
<tr><th>Term</th><th>CRN Link</th><th>Text</th><th>WC</th><th>Dist</th><th>Lang Req</th><th>FYS</th><th>Enrl</th><th>Lim</th></tr>
<tr><td>202403</td><td>x</td><td><a href="timetable.course_detail?p_term=202403&amp;p_crn=31234AB">Text</a></td>
    <td>W NW</td><td>SOC or SCI</td><td>&nbsp;</td><td>Y</td><td>12</td><td>16</td></tr>
<tr><td>202403</td><td>x</td><td><a href="detail?crn=31299AB">Text</a></td>
    <td></td><td>TAS</td><td>LANG</td><td></td><td>N/A</td><td>&nbsp;</td></tr>
</table>
</div>
</body></html>
"#;

#[test]
fn report_rows_are_keyed_by_crn() {
    engine_logging::initialize_for_tests();
    let entries = TableExtractor.extract(REPORT).expect("table");

    assert_eq!(entries.keys().cloned().collect::<Vec<_>>(), vec!["31234", "31299"]);
    assert_eq!(
        entries["31234"],
        TimetableEntry {
            wc: vec!["W".into(), "NW".into()],
            dist: vec!["SOC".into(), "SCI".into()],
            lang: None,
            fys: true,
            enrl: Some(12),
            lim: Some(16),
        }
    );
    assert_eq!(
        entries["31299"],
        TimetableEntry {
            wc: vec![],
            dist: vec!["TAS".into()],
            lang: Some("LANG".into()),
            fys: false,
            enrl: None,
            lim: None,
        }
    );
}

#[test]
fn missing_container_is_a_parse_error() {
    let err = TableExtractor
        .extract("<html><body><table><tr><th>Text</th></tr></table></body></html>")
        .unwrap_err();
    assert_eq!(err, ParseError::MissingTable);
}

#[test]
fn trailing_partial_row_is_dropped() {
    let html = r#"<div class="data-table"><table>
        <tr><th>Text</th><th>Enrl</th></tr>
        <tr><td><a href="?crn=100XX">a</a></td><td>5</td></tr>
        <tr><td><a href="?crn=200XX">b</a></td></tr>
    </table></div>"#;
    let entries = TableExtractor.extract(html).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["100"].enrl, Some(5));
}

#[test]
fn rows_without_a_link_are_skipped() {
    let html = r#"<div class="data-table"><table>
        <tr><th>Text</th><th>FYS</th></tr>
        <tr><td>no link</td><td>Y</td></tr>
        <tr><td><a href="?crn=300XX">c</a></td><td>Y</td></tr>
    </table></div>"#;
    let entries = TableExtractor.extract(html).unwrap();
    assert_eq!(entries.keys().cloned().collect::<Vec<_>>(), vec!["300"]);
}

/// Stands in for a browser: fills the table container the way report scripts do.
struct FillingRenderer;

#[async_trait::async_trait]
impl Renderer for FillingRenderer {
    async fn render(&self, html: &str, base_url: &str) -> Result<String, RenderError> {
        assert!(base_url.ends_with("/timetable.display_courses"));
        Ok(html.replace("<!-- results -->", REPORT))
    }
}

fn fetcher(server: &MockServer, renderer: Arc<dyn Renderer>) -> RenderedPageFetcher {
    let settings = FetchSettings::default();
    RenderedPageFetcher::new(
        build_client(&settings).unwrap(),
        format!("{}/dart/groucho/timetable.display_courses", server.uri()),
        settings.max_bytes,
        renderer,
    )
}

#[tokio::test]
async fn form_is_posted_and_rendered_before_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dart/groucho/timetable.display_courses"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("terms=202403&terms=&hoursradio=allhours"))
        .and(body_string_contains("searchtype=Subject+Area%28s%29"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "<html><body><!-- results --></body></html>",
                    "text/html; charset=ISO-8859-1",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entries = fetcher(&server, Arc::new(FillingRenderer))
        .fetch_timetable(&TimetableQuery::new(["202403"]))
        .await
        .expect("timetable");
    assert_eq!(entries.len(), 2);
    assert!(entries["31234"].fys);
}

#[tokio::test]
async fn unrendered_page_without_table_fails_to_parse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body></body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let err = fetcher(&server, Arc::new(StaticRenderer))
        .fetch_timetable(&TimetableQuery::new(["202403", "202406"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SnapshotError::Parse(ParseError::MissingTable)));
}

#[tokio::test]
async fn failed_submission_is_a_render_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher(&server, Arc::new(StaticRenderer))
        .fetch_rendered(&TimetableQuery::new(["202403"]))
        .await
        .unwrap_err();
    match err {
        RenderError::Submit(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(500)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn mislabelled_charset_still_yields_entries() {
    let server = MockServer::start().await;
    let body = b"<div class=\"data-table\"><table>\
        <tr><th>Text</th><th>Enrl</th></tr>\
        <tr><td><a href=\"?crn=100XX\">Caf\xE9</a></td><td>7</td></tr>\
        </table></div>"
        .to_vec();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(&server)
        .await;

    let entries = fetcher(&server, Arc::new(StaticRenderer))
        .fetch_timetable(&TimetableQuery::new(["202403"]))
        .await
        .expect("lossy decode");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["100"].enrl, Some(7));
}

/// Renderer that never produces a document.
struct FailingRenderer(fn() -> RenderError);

#[async_trait::async_trait]
impl Renderer for FailingRenderer {
    async fn render(&self, _html: &str, _base_url: &str) -> Result<String, RenderError> {
        Err((self.0)())
    }
}

#[tokio::test]
async fn renderer_failures_surface_as_render_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REPORT, "text/html"))
        .mount(&server)
        .await;

    let crashed = fetcher(
        &server,
        Arc::new(FailingRenderer(|| RenderError::Engine("target crashed".into()))),
    )
    .fetch_timetable(&TimetableQuery::new(["202403"]))
    .await
    .unwrap_err();
    assert!(matches!(
        crashed,
        SnapshotError::Render(RenderError::Engine(ref message)) if message == "target crashed"
    ));

    let stalled = fetcher(
        &server,
        Arc::new(FailingRenderer(|| RenderError::Timeout(Duration::from_secs(60)))),
    )
    .fetch_timetable(&TimetableQuery::new(["202403"]))
    .await
    .unwrap_err();
    assert!(matches!(
        stalled,
        SnapshotError::Render(RenderError::Timeout(limit)) if limit == Duration::from_secs(60)
    ));
}
