use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use plotly::layout::AxisType;
use vizlab::attrs::parse_axis_type;
use vizlab::csv_reader;
use vizlab::renderer::{self, HtmlRenderer, RendererConfig};
use vizlab::{
    ChartRequest, ColumnSpec, Dataset, FigureSpec, LayoutOverrides, TraceKind, TraceOverrides,
};

#[derive(Parser, Debug)]
#[command(name = "vizlab")]
#[command(about = "Build Plotly figures from CSV or JSON data", long_about = None)]
struct Args {
    /// Column to plot on the y-axis; repeat for one trace per column
    #[arg(short, long, required = true)]
    y: Vec<String>,

    /// X column; repeat to pair x columns with y columns by position.
    /// Defaults to the row index.
    #[arg(short, long)]
    x: Vec<String>,

    /// Chart kind: line, area, bar, histogram, or a raw trace kind (scatter)
    #[arg(short, long, default_value = "line")]
    kind: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    y_title: Option<String>,

    #[arg(long)]
    x_title: Option<String>,

    /// X-axis type (linear, log, date, category)
    #[arg(long, value_parser = parse_axis_type)]
    x_type: Option<AxisType>,

    /// Legend name per trace, in y order
    #[arg(short, long)]
    legend: Vec<String>,

    #[arg(long, default_value_t = 500)]
    width: u32,

    #[arg(long, default_value_t = 350)]
    height: u32,

    /// Trace overrides as JSON, e.g. '{"mode": "markers"}'
    #[arg(long)]
    trace_json: Option<String>,

    /// Layout overrides as JSON, e.g. '{"yaxis": {"range": [0, 10]}}'
    #[arg(long)]
    layout_json: Option<String>,

    /// Read stdin as JSON (an array of records or an object of columns)
    /// instead of CSV
    #[arg(long)]
    json: bool,

    /// Write an HTML page here instead of printing figure JSON
    #[arg(long)]
    html: Option<PathBuf>,

    /// Make written HTML pages world-readable
    #[arg(long)]
    world_readable: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn column_spec(mut names: Vec<String>) -> Option<ColumnSpec> {
    match names.len() {
        0 => None,
        1 => names.pop().map(ColumnSpec::One),
        _ => Some(ColumnSpec::Many(names)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let dataset = if args.json {
        Dataset::from_json_reader(io::stdin().lock()).context("Failed to read JSON from stdin")?
    } else {
        csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?
    };

    let trace_overrides: TraceOverrides = match &args.trace_json {
        Some(json) => serde_json::from_str(json).context("Invalid --trace-json")?,
        None => TraceOverrides::default(),
    };
    let layout_overrides: LayoutOverrides = match &args.layout_json {
        Some(json) => serde_json::from_str(json).context("Invalid --layout-json")?,
        None => LayoutOverrides::default(),
    };

    let draw = args.html.is_some();
    if let Some(path) = &args.html {
        let config = RendererConfig {
            world_readable: args.world_readable,
        };
        renderer::init_renderer(Box::new(HtmlRenderer::new(path, config)))?;
    }

    let y = column_spec(args.y).context("At least one --y column is required")?;
    let mut request = ChartRequest::new(y)
        .size(args.width, args.height)
        .trace_overrides(trace_overrides)
        .layout_overrides(layout_overrides)
        .draw(draw);
    request.x = column_spec(args.x);
    request.legend_name = column_spec(args.legend);
    request.title = args.title;
    request.y_title = args.y_title;
    request.x_title = args.x_title;
    request.x_type = args.x_type;

    let figure = render(&dataset, request, &args.kind).context("Failed to build chart")?;

    if !draw {
        let json = figure.to_json().context("Failed to serialize figure")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", json).context("Failed to write figure to stdout")?;
        handle.flush().context("Failed to flush stdout")?;
    }

    Ok(())
}

fn render(dataset: &Dataset, request: ChartRequest, kind: &str) -> Result<FigureSpec> {
    let figure = match kind.to_ascii_lowercase().as_str() {
        "line" => vizlab::line(dataset, request)?,
        "area" => vizlab::area(dataset, request)?,
        "bar" => vizlab::bar(dataset, request)?,
        "histogram" => vizlab::histogram(dataset, request)?,
        other => {
            let trace_kind: TraceKind = other.parse()?;
            vizlab::build_chart(dataset, request.trace_kind(trace_kind))?
        }
    };
    Ok(figure)
}
