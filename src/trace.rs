// Trace kinds and per-series trace specifications

use plotly::common::{Fill, Mode, Orientation};
use plotly::histogram::{Bins, HistNorm};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::attrs;
use crate::error::ChartError;

/// Closed set of trace constructors a chart can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TraceKind {
    #[default]
    Scatter,
    Bar,
    Histogram,
}

impl FromStr for TraceKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, ChartError> {
        match s.to_ascii_lowercase().as_str() {
            "scatter" => Ok(TraceKind::Scatter),
            "bar" => Ok(TraceKind::Bar),
            "histogram" => Ok(TraceKind::Histogram),
            _ => Err(ChartError::UnknownTraceKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for TraceKind {
    type Error = ChartError;

    fn try_from(name: String) -> Result<Self, ChartError> {
        name.parse()
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceKind::Scatter => "scatter",
            TraceKind::Bar => "bar",
            TraceKind::Histogram => "histogram",
        };
        write!(f, "{}", name)
    }
}

/// Keys a trace owns outright; they never pass through `extra`
const RESERVED_KEYS: &[&str] = &[
    "type", "x", "y", "name", "mode", "fill", "orientation", "histnorm", "xbins", "opacity",
];

/// Style attributes layered onto every trace of a chart.
///
/// Serialized flat into the trace object, so a field that is `None` simply
/// does not appear in the output. Plotly attributes with no field here go in
/// `extra`; nested objects there merge key by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOverrides {
    /// Replaces the legend name of every trace it is applied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "attrs::mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(deserialize_with = "attrs::fill", skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(
        deserialize_with = "attrs::orientation",
        skip_serializing_if = "Option::is_none"
    )]
    pub orientation: Option<Orientation>,
    #[serde(deserialize_with = "attrs::histnorm", skip_serializing_if = "Option::is_none")]
    pub histnorm: Option<HistNorm>,
    #[serde(deserialize_with = "attrs::bins", skip_serializing_if = "Option::is_none")]
    pub xbins: Option<Bins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceOverrides {
    /// Layer `over` on top of `self`; fields set in `over` win
    pub fn merged_with(self, over: TraceOverrides) -> TraceOverrides {
        let mut extra = self.extra;
        attrs::merge_map(&mut extra, over.extra);
        TraceOverrides {
            name: over.name.or(self.name),
            mode: over.mode.or(self.mode),
            fill: over.fill.or(self.fill),
            orientation: over.orientation.or(self.orientation),
            histnorm: over.histnorm.or(self.histnorm),
            xbins: over.xbins.or(self.xbins),
            opacity: over.opacity.or(self.opacity),
            extra,
        }
    }
}

/// One renderable data series
#[derive(Debug, Clone, Serialize)]
pub struct TraceSpec {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub y: Vec<Value>,
    pub x: Vec<Value>,
    pub name: String,
    /// `style.name` is always `None` here; a name override lands in `name`
    #[serde(flatten)]
    pub style: TraceOverrides,
}

impl TraceSpec {
    pub fn new(kind: TraceKind, y: Vec<Value>, x: Vec<Value>, name: impl Into<String>) -> Self {
        TraceSpec {
            kind,
            y,
            x,
            name: name.into(),
            style: TraceOverrides::default(),
        }
    }

    /// Apply overrides; anything they set replaces the current style
    pub fn with_overrides(mut self, overrides: &TraceOverrides) -> Self {
        let mut style = self.style.merged_with(overrides.clone());
        if let Some(name) = style.name.take() {
            self.name = name;
        }
        style.extra.retain(|key, _| {
            let reserved = RESERVED_KEYS.contains(&key.as_str());
            if reserved {
                warn!(key = %key, "ignoring trace override for a reserved attribute");
            }
            !reserved
        });
        self.style = style;
        self
    }
}

impl plotly::Trace for TraceSpec {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(json: &str) -> TraceOverrides {
        serde_json::from_str(json).unwrap()
    }

    fn sample() -> TraceSpec {
        TraceSpec::new(TraceKind::Scatter, vec![json!(1)], vec![json!(0)], "a")
    }

    #[test]
    fn test_parse_trace_kind() {
        assert_eq!("scatter".parse::<TraceKind>().unwrap(), TraceKind::Scatter);
        assert_eq!("Bar".parse::<TraceKind>().unwrap(), TraceKind::Bar);
        assert_eq!("HISTOGRAM".parse::<TraceKind>().unwrap(), TraceKind::Histogram);
    }

    #[test]
    fn test_unknown_trace_kind() {
        let err = "pie".parse::<TraceKind>().unwrap_err();
        assert!(matches!(err, ChartError::UnknownTraceKind(ref k) if k == "pie"));
    }

    #[test]
    fn test_trace_kind_from_json() {
        let kind: TraceKind = serde_json::from_str(r#""Histogram""#).unwrap();
        assert_eq!(kind, TraceKind::Histogram);
        let err = serde_json::from_str::<TraceKind>(r#""pie""#).unwrap_err();
        assert!(err.to_string().contains("Unknown trace kind 'pie'"));
    }

    #[test]
    fn test_trace_serializes_flat() {
        let trace = sample().with_overrides(&overrides(r#"{"fill": "tozeroy"}"#));
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            value,
            json!({"type": "scatter", "y": [1], "x": [0], "name": "a", "fill": "tozeroy"})
        );
    }

    #[test]
    fn test_histogram_attributes() {
        let parsed = overrides(
            r#"{"histnorm": "count", "xbins": {"start": 0, "end": 10, "size": 2}}"#,
        );
        let trace = sample().with_overrides(&parsed);
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["histnorm"], json!(""));
        assert_eq!(value["xbins"], json!({"start": 0.0, "end": 10.0, "size": 2.0}));

        assert!(serde_json::from_str::<TraceOverrides>(r#"{"fill": "sideways"}"#).is_err());
    }

    #[test]
    fn test_name_override_replaces_legend_name() {
        let trace = sample().with_overrides(&overrides(r#"{"name": "renamed"}"#));
        assert_eq!(trace.name, "renamed");

        let text = serde_json::to_string(&trace).unwrap();
        assert_eq!(text.matches(r#""name""#).count(), 1);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], json!("renamed"));
    }

    #[test]
    fn test_reserved_keys_never_pass_through() {
        let mut extra = Map::new();
        extra.insert("fill".to_string(), json!("toself"));
        extra.insert("x".to_string(), json!([9]));
        let programmatic = TraceOverrides { extra, ..Default::default() };
        let parsed = overrides(r#"{"type": "bar", "y": [7]}"#);

        let trace = sample().with_overrides(&programmatic).with_overrides(&parsed);
        let text = serde_json::to_string(&trace).unwrap();
        for key in ["type", "x", "y", "fill"] {
            assert!(text.matches(&format!("\"{}\"", key)).count() <= 1, "duplicate {}", key);
        }
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], json!("scatter"));
        assert_eq!(value["x"], json!([0]));
        assert_eq!(value["y"], json!([1]));
        assert!(value.get("fill").is_none());
    }

    #[test]
    fn test_overrides_keep_unknown_attributes() {
        let parsed = overrides(r#"{"fill": "tozeroy", "line": {"dash": "dot"}}"#);
        assert_eq!(parsed.extra["line"], json!({"dash": "dot"}));

        let trace = sample().with_overrides(&parsed);
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["line"]["dash"], json!("dot"));
    }

    #[test]
    fn test_overrides_merge_nested_extra() {
        let base = overrides(r#"{"line": {"width": 2, "shape": "linear"}, "opacity": 1.0}"#);
        let over = overrides(r#"{"line": {"shape": "spline"}, "opacity": 0.5}"#);
        let merged = base.merged_with(over);
        assert_eq!(merged.extra["line"], json!({"width": 2, "shape": "spline"}));
        assert_eq!(merged.opacity, Some(0.5));
    }

    #[test]
    fn test_plotly_trace_json() {
        let trace = sample().with_overrides(&overrides(r#"{"mode": "lines"}"#));
        let json = plotly::Trace::to_json(&trace);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], json!("lines"));
        assert_eq!(value["name"], json!("a"));
    }
}
