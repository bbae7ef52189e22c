//! Display surfaces for finished figures.
//!
//! A host application installs one [`Renderer`] at startup with
//! [`init_renderer`]; [`crate::chart::build_chart`] hands every figure built
//! with `draw` set to it. The slot is written once and never replaced.

use anyhow::{Context, Result};
use plotly::Plot;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing::info;

use crate::chart::FigureSpec;
use crate::error::ChartError;

/// Something that can show a figure to a user
pub trait Renderer: Send + Sync {
    fn display(&self, figure: &FigureSpec) -> Result<()>;
}

static RENDERER: OnceLock<Box<dyn Renderer>> = OnceLock::new();

/// Install the process-wide renderer. Fails if one is already installed.
pub fn init_renderer(renderer: Box<dyn Renderer>) -> Result<(), ChartError> {
    RENDERER
        .set(renderer)
        .map_err(|_| ChartError::RendererAlreadyInitialized)
}

/// The installed renderer, if any
pub fn renderer() -> Option<&'static dyn Renderer> {
    RENDERER.get().map(|r| r.as_ref())
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Pages are written world-readable only when set
    pub world_readable: bool,
}

/// Writes each figure as a standalone HTML page built by `plotly::Plot`.
///
/// The first figure goes to `path`; later ones get a numeric suffix
/// (`chart.html`, `chart-1.html`, ...).
pub struct HtmlRenderer {
    path: PathBuf,
    config: RendererConfig,
    count: AtomicUsize,
}

impl HtmlRenderer {
    pub fn new(path: impl Into<PathBuf>, config: RendererConfig) -> Self {
        Self {
            path: path.into(),
            config,
            count: AtomicUsize::new(0),
        }
    }

    fn next_path(&self) -> PathBuf {
        let n = self.count.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            return self.path.clone();
        }
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "figure".to_string());
        let file_name = match self.path.extension() {
            Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
            None => format!("{}-{}", stem, n),
        };
        self.path.with_file_name(file_name)
    }

    /// The HTML page for one figure
    pub fn page(&self, figure: &FigureSpec) -> String {
        to_plot(&escape_figure(figure)).to_html()
    }
}

impl Renderer for HtmlRenderer {
    fn display(&self, figure: &FigureSpec) -> Result<()> {
        let path = self.next_path();
        fs::write(&path, self.page(figure))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        set_permissions(&path, self.config.world_readable)?;
        info!(path = %path.display(), traces = figure.traces.len(), "wrote figure page");
        Ok(())
    }
}

/// The figure as a `plotly::Plot`
pub fn to_plot(figure: &FigureSpec) -> Plot {
    let mut plot = Plot::new();
    for trace in &figure.traces {
        plot.add_trace(Box::new(trace.clone()));
    }
    plot.set_layout(figure.layout.to_plotly());
    plot
}

#[cfg(unix)]
fn set_permissions(path: &std::path::Path, world_readable: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if world_readable { 0o644 } else { 0o600 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &std::path::Path, _world_readable: bool) -> Result<()> {
    Ok(())
}

// plotly.js decodes these entities in titles, names and labels, and the
// page's inline script can no longer be closed by figure text.
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_values(values: &[Value]) -> Vec<Value> {
    values.iter().cloned().map(escape_value).collect()
}

fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_markup(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (escape_markup(&k), escape_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Copy of `figure` with every user-supplied string entity-encoded
fn escape_figure(figure: &FigureSpec) -> FigureSpec {
    let mut escaped = figure.clone();
    let layout = &mut escaped.layout;
    layout.title = escape_markup(&layout.title);
    layout.xaxis.title = escape_markup(&layout.xaxis.title);
    layout.yaxis.title = escape_markup(&layout.yaxis.title);
    for trace in &mut escaped.traces {
        trace.name = escape_markup(&trace.name);
        trace.x = escape_values(&trace.x);
        trace.y = escape_values(&trace.y);
        let extra = std::mem::take(&mut trace.style.extra);
        trace.style.extra = extra
            .into_iter()
            .map(|(k, v)| (escape_markup(&k), escape_value(v)))
            .collect();
    }
    escaped
}

/// Writes each figure as one JSON line, e.g. for a front end reading a pipe
pub struct JsonRenderer<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn display(&self, figure: &FigureSpec) -> Result<()> {
        let json = figure.to_json().context("Failed to serialize figure")?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("Renderer writer lock poisoned"))?;
        writeln!(writer, "{}", json).context("Failed to write figure")?;
        writer.flush().context("Failed to flush figure output")?;
        Ok(())
    }
}
