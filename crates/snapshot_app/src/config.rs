use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use snapshot_engine::{EngineConfig, RendererKind};

pub const DEFAULT_OUTPUT: &str = "data.js";
pub const DEFAULT_PEOPLE_CACHE: &str = "people.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RendererChoice {
    Static,
    Chromium,
}

/// Optional overrides read from a RON file. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub timetable_url: Option<String>,
    pub output: Option<PathBuf>,
    pub people_cache: Option<PathBuf>,
    pub page_size: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub render_timeout_secs: Option<u64>,
    pub render_settle_millis: Option<u64>,
    pub chromium_path: Option<PathBuf>,
    pub renderer: Option<RendererChoice>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub people_cache: Option<PathBuf>,
    pub static_render: bool,
}

pub fn build_engine_config(file: FileConfig, cli: CliOverrides) -> EngineConfig {
    let output = cli
        .output
        .or(file.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let people_cache = cli
        .people_cache
        .or(file.people_cache)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PEOPLE_CACHE));

    let mut config = EngineConfig::default_with_paths(output, people_cache);
    if let Some(api_base) = file.api_base {
        config.api_base = api_base;
    }
    if let Some(url) = file.timetable_url {
        config.timetable_url = url;
    }
    if let Some(page_size) = file.page_size {
        config.fetch.page_size = page_size;
    }
    if let Some(secs) = file.connect_timeout_secs {
        config.fetch.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        config.fetch.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.render_timeout_secs {
        config.render.timeout = Duration::from_secs(secs);
    }
    if let Some(millis) = file.render_settle_millis {
        config.render.settle = Duration::from_millis(millis);
    }
    config.render.chromium_path = file.chromium_path;

    config.renderer = match (cli.static_render, file.renderer) {
        (true, _) | (false, Some(RendererChoice::Static)) => RendererKind::Static,
        (false, Some(RendererChoice::Chromium)) | (false, None) => RendererKind::Chromium,
    };
    config
}
