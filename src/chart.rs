// Chart building: labels + layout + one trace per y column

use plotly::common::{Fill, Orientation};
use plotly::histogram::{Bins, HistNorm};
use plotly::layout::{AxisType, BarMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::attrs;
use crate::data::{Dataset, INDEX_COLUMN};
use crate::error::ChartError;
use crate::label::{resolve_label, ColumnSpec};
use crate::layout::{build_layout, LayoutOverrides, LayoutSpec, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::renderer;
use crate::trace::{TraceKind, TraceOverrides, TraceSpec};

/// Traces plus layout: the unit handed to a renderer
#[derive(Debug, Clone, Serialize)]
pub struct FigureSpec {
    #[serde(rename = "data")]
    pub traces: Vec<TraceSpec>,
    pub layout: LayoutSpec,
}

impl FigureSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Everything the caller can say about one chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRequest {
    pub y: ColumnSpec,
    #[serde(default)]
    pub x: Option<ColumnSpec>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default, deserialize_with = "attrs::axis_type")]
    pub x_type: Option<AxisType>,
    #[serde(default)]
    pub legend_name: Option<ColumnSpec>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub trace_kind: TraceKind,
    #[serde(default)]
    pub trace_overrides: TraceOverrides,
    #[serde(default)]
    pub layout_overrides: LayoutOverrides,
    #[serde(default = "default_draw")]
    pub draw: bool,
}

fn default_width() -> u32 { DEFAULT_WIDTH }
fn default_height() -> u32 { DEFAULT_HEIGHT }
fn default_draw() -> bool { true }

impl ChartRequest {
    pub fn new(y: impl Into<ColumnSpec>) -> Self {
        ChartRequest {
            y: y.into(),
            x: None,
            title: None,
            y_title: None,
            x_title: None,
            x_type: None,
            legend_name: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            trace_kind: TraceKind::default(),
            trace_overrides: TraceOverrides::default(),
            layout_overrides: LayoutOverrides::default(),
            draw: true,
        }
    }

    /// Parse a request from JSON.
    ///
    /// An unknown `trace_kind` is reported as [`ChartError::UnknownTraceKind`],
    /// the same as [`ChartRequest::trace_kind_named`].
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        let value: Value = serde_json::from_str(json)?;
        if let Some(kind) = value.get("trace_kind").and_then(Value::as_str) {
            kind.parse::<TraceKind>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn x(mut self, x: impl Into<ColumnSpec>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn y_title(mut self, y_title: impl Into<String>) -> Self {
        self.y_title = Some(y_title.into());
        self
    }

    pub fn x_title(mut self, x_title: impl Into<String>) -> Self {
        self.x_title = Some(x_title.into());
        self
    }

    pub fn x_type(mut self, x_type: AxisType) -> Self {
        self.x_type = Some(x_type);
        self
    }

    pub fn legend_name(mut self, legend_name: impl Into<ColumnSpec>) -> Self {
        self.legend_name = Some(legend_name.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn trace_kind(mut self, kind: TraceKind) -> Self {
        self.trace_kind = kind;
        self
    }

    /// Select the trace kind by name, e.g. `"bar"`
    pub fn trace_kind_named(self, name: &str) -> Result<Self, ChartError> {
        let kind = name.parse()?;
        Ok(self.trace_kind(kind))
    }

    pub fn trace_overrides(mut self, overrides: TraceOverrides) -> Self {
        self.trace_overrides = overrides;
        self
    }

    pub fn layout_overrides(mut self, overrides: LayoutOverrides) -> Self {
        self.layout_overrides = overrides;
        self
    }

    pub fn draw(mut self, draw: bool) -> Self {
        self.draw = draw;
        self
    }
}

/// Build a figure from `dataset`, and display it if `request.draw` is set.
///
/// Without an x column the row positions become a synthetic `index` column.
pub fn build_chart(dataset: &Dataset, request: ChartRequest) -> Result<FigureSpec, ChartError> {
    let ChartRequest {
        y,
        x,
        title,
        y_title,
        x_title,
        x_type,
        legend_name,
        width,
        height,
        trace_kind,
        trace_overrides,
        layout_overrides,
        draw,
    } = request;

    let indexed;
    let (data, x) = match x {
        Some(x) => (dataset, x),
        None => {
            indexed = dataset.with_row_index(INDEX_COLUMN);
            (&indexed, ColumnSpec::from(INDEX_COLUMN))
        }
    };

    let label = resolve_label(
        &y,
        &x,
        title.as_deref(),
        y_title.as_deref(),
        x_title.as_deref(),
        legend_name.as_ref(),
    );
    let layout = build_layout(
        &label.title,
        &label.y_title,
        &label.x_title,
        x_type,
        width,
        height,
        Some(layout_overrides),
    );

    let mut traces = Vec::with_capacity(label.y_columns.len());
    for (idx, y_col) in label.y_columns.iter().enumerate() {
        let x_col = label.x_column_at(idx);
        let name = label.legend_name_at(idx);
        debug!(kind = %trace_kind, y = %y_col, x = %x_col, legend = %name, "binding trace");

        let trace = TraceSpec::new(trace_kind, data.column(y_col)?, data.column(x_col)?, name)
            .with_overrides(&trace_overrides);
        traces.push(trace);
    }

    let figure = FigureSpec { traces, layout };

    if draw {
        match renderer::renderer() {
            Some(r) => r.display(&figure).map_err(ChartError::Render)?,
            None => warn!("draw requested but no renderer is initialized; skipping display"),
        }
    }

    Ok(figure)
}

/// Filled area under each series
pub fn area(dataset: &Dataset, request: ChartRequest) -> Result<FigureSpec, ChartError> {
    let preset = TraceOverrides {
        fill: Some(Fill::ToZeroY),
        ..Default::default()
    };
    let trace_overrides = preset.merged_with(request.trace_overrides.clone());
    build_chart(
        dataset,
        request.trace_kind(TraceKind::Scatter).trace_overrides(trace_overrides),
    )
}

/// Plain scatter traces
pub fn line(dataset: &Dataset, request: ChartRequest) -> Result<FigureSpec, ChartError> {
    build_chart(dataset, request.trace_kind(TraceKind::Scatter))
}

/// Preset values for [`bar_with`]
#[derive(Debug, Clone)]
pub struct BarOptions {
    pub barmode: BarMode,
    pub orientation: Orientation,
}

impl Default for BarOptions {
    fn default() -> Self {
        BarOptions {
            barmode: BarMode::Stack,
            orientation: Orientation::Vertical,
        }
    }
}

/// Stacked vertical bars
pub fn bar(dataset: &Dataset, request: ChartRequest) -> Result<FigureSpec, ChartError> {
    bar_with(dataset, request, BarOptions::default())
}

pub fn bar_with(
    dataset: &Dataset,
    request: ChartRequest,
    options: BarOptions,
) -> Result<FigureSpec, ChartError> {
    let trace_preset = TraceOverrides {
        orientation: Some(options.orientation),
        ..Default::default()
    };
    let layout_preset = LayoutOverrides {
        barmode: Some(options.barmode),
        ..Default::default()
    };
    let trace_overrides = trace_preset.merged_with(request.trace_overrides.clone());
    let layout_overrides = layout_preset.merged_with(request.layout_overrides.clone());
    build_chart(
        dataset,
        request
            .trace_kind(TraceKind::Bar)
            .trace_overrides(trace_overrides)
            .layout_overrides(layout_overrides),
    )
}

/// Preset values for [`histogram_with`]
#[derive(Debug, Clone)]
pub struct HistogramOptions {
    pub barmode: BarMode,
    pub orientation: Orientation,
    pub histnorm: HistNorm,
    /// `None` leaves binning to plotly.js
    pub xbins: Option<Bins>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        HistogramOptions {
            barmode: BarMode::Overlay,
            orientation: Orientation::Vertical,
            histnorm: HistNorm::Default,
            xbins: None,
        }
    }
}

/// Overlaid vertical count histograms
pub fn histogram(dataset: &Dataset, request: ChartRequest) -> Result<FigureSpec, ChartError> {
    histogram_with(dataset, request, HistogramOptions::default())
}

pub fn histogram_with(
    dataset: &Dataset,
    request: ChartRequest,
    options: HistogramOptions,
) -> Result<FigureSpec, ChartError> {
    let trace_preset = TraceOverrides {
        orientation: Some(options.orientation),
        histnorm: Some(options.histnorm),
        xbins: options.xbins,
        ..Default::default()
    };
    let layout_preset = LayoutOverrides {
        barmode: Some(options.barmode),
        ..Default::default()
    };
    let trace_overrides = trace_preset.merged_with(request.trace_overrides.clone());
    let layout_overrides = layout_preset.merged_with(request.layout_overrides.clone());
    build_chart(
        dataset,
        request
            .trace_kind(TraceKind::Histogram)
            .trace_overrides(trace_overrides)
            .layout_overrides(layout_overrides),
    )
}
