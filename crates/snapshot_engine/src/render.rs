//! Client-side rendering of the timetable report.
//!
//! The report answers with a page whose result table is filled in by scripts,
//! so the body is run through a [`Renderer`] before it is parsed.

use std::time::Duration;

use crate::RenderError;

#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Executes the page scripts of `html` as if served from `base_url` and
    /// returns the resulting document.
    async fn render(&self, html: &str, base_url: &str) -> Result<String, RenderError>;
}

/// Returns the document unchanged, for pages that are already complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticRenderer;

#[async_trait::async_trait]
impl Renderer for StaticRenderer {
    async fn render(&self, html: &str, _base_url: &str) -> Result<String, RenderError> {
        Ok(html.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub timeout: Duration,
    /// Extra time given to scripts after the document has loaded.
    pub settle: Duration,
    pub chromium_path: Option<std::path::PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            settle: Duration::from_millis(500),
            chromium_path: None,
        }
    }
}

/// Inserts `<base href>` so relative script and link targets resolve against
/// the report server. Documents that already declare a base are left alone.
pub fn with_base_href(html: &str, base_url: &str) -> String {
    let lower = html.to_ascii_lowercase();
    if lower.contains("<base ") {
        return html.to_string();
    }
    let tag = format!("<base href=\"{base_url}\">");
    let head = lower.match_indices("<head").map(|(i, _)| i).find(|&i| {
        matches!(lower.as_bytes().get(i + 5), Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n'))
    });
    match head {
        Some(start) => match lower[start..].find('>') {
            Some(end) => {
                let at = start + end + 1;
                format!("{}{}{}", &html[..at], tag, &html[at..])
            }
            None => format!("{tag}{html}"),
        },
        None => format!("{tag}{html}"),
    }
}

#[cfg(feature = "chromium")]
pub use chromium::ChromiumRenderer;

#[cfg(feature = "chromium")]
mod chromium {
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use engine_logging::{engine_debug, engine_info};
    use futures_util::StreamExt;

    use super::{with_base_href, RenderSettings, Renderer};
    use crate::RenderError;

    /// Headless Chromium session reused for every render of a run.
    pub struct ChromiumRenderer {
        browser: Browser,
        settings: RenderSettings,
        handler: tokio::task::JoinHandle<()>,
    }

    impl ChromiumRenderer {
        pub async fn launch(settings: RenderSettings) -> Result<Self, RenderError> {
            let mut builder = BrowserConfig::builder()
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--no-sandbox")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-extensions");
            if let Some(path) = settings.chromium_path.as_ref() {
                builder = builder.chrome_executable(path);
            }
            let config = builder.build().map_err(RenderError::Unavailable)?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|err| RenderError::Unavailable(err.to_string()))?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    let _ = event;
                }
            });

            engine_info!("Launched headless Chromium");
            Ok(Self {
                browser,
                settings,
                handler,
            })
        }

        async fn render_page(&self, html: &str) -> Result<String, RenderError> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|err| RenderError::Engine(err.to_string()))?;
            page.set_content(html)
                .await
                .map_err(|err| RenderError::Engine(err.to_string()))?;
            tokio::time::sleep(self.settings.settle).await;
            let content = page
                .content()
                .await
                .map_err(|err| RenderError::Engine(err.to_string()))?;
            let _ = page.close().await;
            Ok(content)
        }
    }

    #[async_trait::async_trait]
    impl Renderer for ChromiumRenderer {
        async fn render(&self, html: &str, base_url: &str) -> Result<String, RenderError> {
            let html = with_base_href(html, base_url);
            engine_debug!("Rendering {} bytes of report HTML", html.len());
            tokio::time::timeout(self.settings.timeout, self.render_page(&html))
                .await
                .map_err(|_| RenderError::Timeout(self.settings.timeout))?
        }
    }

    impl Drop for ChromiumRenderer {
        fn drop(&mut self) {
            self.handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_href_goes_right_after_head() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        assert_eq!(
            with_base_href(html, "https://example.edu/report"),
            "<html><head><base href=\"https://example.edu/report\"><title>t</title></head><body></body></html>"
        );
    }

    #[test]
    fn existing_base_is_kept() {
        let html = "<head><BASE href=\"/x\"></head>";
        assert_eq!(with_base_href(html, "https://example.edu"), html);
    }

    #[test]
    fn fragment_without_head_gets_base_prefix() {
        assert_eq!(with_base_href("<p>x</p>", "u"), "<base href=\"u\"><p>x</p>");
        assert_eq!(
            with_base_href("<header>x</header>", "u"),
            "<base href=\"u\"><header>x</header>"
        );
    }
}
