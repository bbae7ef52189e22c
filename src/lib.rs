// Library exports for vizlab

pub mod attrs;
pub mod csv_reader;
pub mod data;
pub mod error;

// Chart request resolution
pub mod label;
pub mod layout;
pub mod trace;
pub mod chart;
pub mod renderer;

pub use chart::{
    area, bar, bar_with, build_chart, histogram, histogram_with, line, BarOptions, ChartRequest,
    FigureSpec, HistogramOptions,
};
pub use data::Dataset;
pub use error::ChartError;
pub use label::{resolve_label, ColumnSpec, LabelBundle};
pub use layout::{build_layout, AxisPatch, LayoutOverrides, LayoutSpec, LegendPatch, MarginPatch};
pub use renderer::{init_renderer, Renderer, RendererConfig};
pub use trace::{TraceKind, TraceOverrides, TraceSpec};
