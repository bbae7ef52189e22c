// Layout construction with fixed margin/legend/axis defaults

use plotly::common::{Orientation, Title};
use plotly::layout::{AxisType, BarMode, RangeMode};
use serde::{Deserialize, Serialize};

use crate::attrs;

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 350;
pub const DEFAULT_MARGIN: u32 = 70;

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub orientation: Orientation,
}

impl Default for Legend {
    /// Below the plot area, laid out horizontally
    fn default() -> Self {
        Legend {
            x: 0.0,
            y: -0.2,
            orientation: Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Margin {
            l: DEFAULT_MARGIN,
            r: DEFAULT_MARGIN,
            t: DEFAULT_MARGIN,
            b: DEFAULT_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<AxisType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangemode: Option<RangeMode>,
}

impl Axis {
    fn to_plotly(&self) -> plotly::layout::Axis {
        let mut axis = plotly::layout::Axis::new().title(Title::from(self.title.as_str()));
        if let Some(axis_type) = &self.axis_type {
            axis = axis.type_(axis_type.clone());
        }
        if let Some(range) = &self.range {
            axis = axis.range(range.clone());
        }
        if let Some(rangemode) = &self.rangemode {
            axis = axis.range_mode(rangemode.clone());
        }
        axis
    }
}

/// Plotly layout for one figure
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSpec {
    pub title: String,
    pub legend: Legend,
    pub yaxis: Axis,
    pub xaxis: Axis,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl LayoutSpec {
    /// The same layout as a `plotly::Layout`, for handing to a `plotly::Plot`
    pub fn to_plotly(&self) -> plotly::Layout {
        let margin = plotly::layout::Margin::new()
            .left(self.margin.l as usize)
            .right(self.margin.r as usize)
            .top(self.margin.t as usize)
            .bottom(self.margin.b as usize);
        let legend = plotly::layout::Legend::new()
            .x(self.legend.x)
            .y(self.legend.y)
            .orientation(self.legend.orientation.clone());

        let mut layout = plotly::Layout::new()
            .title(Title::from(self.title.as_str()))
            .width(self.width as usize)
            .height(self.height as usize)
            .margin(margin)
            .legend(legend)
            .x_axis(self.xaxis.to_plotly())
            .y_axis(self.yaxis.to_plotly());
        if let Some(barmode) = &self.barmode {
            layout = layout.bar_mode(barmode.clone());
        }
        if let Some(showlegend) = self.showlegend {
            layout = layout.show_legend(showlegend);
        }
        layout
    }
}

/// Partial overrides merge field by field, the later one winning
trait Patch: Sized {
    fn merged_with(self, over: Self) -> Self;
}

fn layer<P: Patch>(base: Option<P>, over: Option<P>) -> Option<P> {
    match (base, over) {
        (Some(base), Some(over)) => Some(base.merged_with(over)),
        (base, over) => over.or(base),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegendPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(
        deserialize_with = "attrs::orientation",
        skip_serializing_if = "Option::is_none"
    )]
    pub orientation: Option<Orientation>,
}

impl Patch for LegendPatch {
    fn merged_with(self, over: Self) -> Self {
        LegendPatch {
            x: over.x.or(self.x),
            y: over.y.or(self.y),
            orientation: over.orientation.or(self.orientation),
        }
    }
}

impl LegendPatch {
    fn apply_to(self, legend: &mut Legend) {
        if let Some(x) = self.x {
            legend.x = x;
        }
        if let Some(y) = self.y {
            legend.y = y;
        }
        if let Some(orientation) = self.orientation {
            legend.orientation = orientation;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<u32>,
}

impl Patch for MarginPatch {
    fn merged_with(self, over: Self) -> Self {
        MarginPatch {
            l: over.l.or(self.l),
            r: over.r.or(self.r),
            t: over.t.or(self.t),
            b: over.b.or(self.b),
        }
    }
}

impl MarginPatch {
    fn apply_to(self, margin: &mut Margin) {
        margin.l = self.l.unwrap_or(margin.l);
        margin.r = self.r.unwrap_or(margin.r);
        margin.t = self.t.unwrap_or(margin.t);
        margin.b = self.b.unwrap_or(margin.b);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "type",
        deserialize_with = "attrs::axis_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub axis_type: Option<AxisType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<f64>>,
    #[serde(
        deserialize_with = "attrs::range_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub rangemode: Option<RangeMode>,
}

impl Patch for AxisPatch {
    fn merged_with(self, over: Self) -> Self {
        AxisPatch {
            title: over.title.or(self.title),
            axis_type: over.axis_type.or(self.axis_type),
            range: over.range.or(self.range),
            rangemode: over.rangemode.or(self.rangemode),
        }
    }
}

impl AxisPatch {
    fn apply_to(self, axis: &mut Axis) {
        if let Some(title) = self.title {
            axis.title = title;
        }
        if self.axis_type.is_some() {
            axis.axis_type = self.axis_type;
        }
        if self.range.is_some() {
            axis.range = self.range;
        }
        if self.rangemode.is_some() {
            axis.rangemode = self.rangemode;
        }
    }
}

/// Field-wise layout overrides, shaped like the Plotly layout object.
///
/// Every `Some` field replaces the default; nested objects (`legend`,
/// `margin`, `xaxis`, `yaxis`) only replace the fields they name.
/// Attributes with no field here are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<MarginPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<AxisPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<AxisPatch>,
    #[serde(
        deserialize_with = "attrs::bar_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl LayoutOverrides {
    /// Layer `over` on top of `self`; fields set in `over` win
    pub fn merged_with(self, over: LayoutOverrides) -> LayoutOverrides {
        LayoutOverrides {
            title: over.title.or(self.title),
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            legend: layer(self.legend, over.legend),
            margin: layer(self.margin, over.margin),
            xaxis: layer(self.xaxis, over.xaxis),
            yaxis: layer(self.yaxis, over.yaxis),
            barmode: over.barmode.or(self.barmode),
            showlegend: over.showlegend.or(self.showlegend),
        }
    }

    fn apply_to(self, layout: &mut LayoutSpec) {
        if let Some(title) = self.title {
            layout.title = title;
        }
        if let Some(width) = self.width {
            layout.width = width;
        }
        if let Some(height) = self.height {
            layout.height = height;
        }
        if let Some(legend) = self.legend {
            legend.apply_to(&mut layout.legend);
        }
        if let Some(margin) = self.margin {
            margin.apply_to(&mut layout.margin);
        }
        if let Some(xaxis) = self.xaxis {
            xaxis.apply_to(&mut layout.xaxis);
        }
        if let Some(yaxis) = self.yaxis {
            yaxis.apply_to(&mut layout.yaxis);
        }
        if self.barmode.is_some() {
            layout.barmode = self.barmode;
        }
        if self.showlegend.is_some() {
            layout.showlegend = self.showlegend;
        }
    }
}

/// Build a layout with the fixed defaults, then apply `overrides` last.
pub fn build_layout(
    title: &str,
    y_title: &str,
    x_title: &str,
    x_type: Option<AxisType>,
    width: u32,
    height: u32,
    overrides: Option<LayoutOverrides>,
) -> LayoutSpec {
    let mut layout = LayoutSpec {
        title: title.to_string(),
        legend: Legend::default(),
        yaxis: Axis {
            title: y_title.to_string(),
            rangemode: Some(RangeMode::ToZero),
            ..Default::default()
        },
        xaxis: Axis {
            title: x_title.to_string(),
            axis_type: x_type,
            ..Default::default()
        },
        width,
        height,
        margin: Margin::default(),
        barmode: None,
        showlegend: None,
    };

    if let Some(overrides) = overrides {
        overrides.apply_to(&mut layout);
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn layout_json(overrides: Option<LayoutOverrides>) -> Value {
        let layout = build_layout("T", "Y", "X", None, DEFAULT_WIDTH, DEFAULT_HEIGHT, overrides);
        serde_json::to_value(&layout).unwrap()
    }

    fn overrides(json: &str) -> LayoutOverrides {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_layout_defaults() {
        let layout = build_layout("T", "Y", "X", None, DEFAULT_WIDTH, DEFAULT_HEIGHT, None);
        assert_eq!(layout.title, "T");
        assert_eq!(layout.width, 500);
        assert_eq!(layout.height, 350);
        assert_eq!(layout.margin, Margin { l: 70, r: 70, t: 70, b: 70 });
        assert_eq!(layout.yaxis.title, "Y");
        assert_eq!(layout.xaxis.title, "X");
        assert!(layout.xaxis.axis_type.is_none());

        let value = layout_json(None);
        assert_eq!(value["legend"], json!({"x": 0.0, "y": -0.2, "orientation": "h"}));
        assert_eq!(value["yaxis"], json!({"title": "Y", "rangemode": "tozero"}));
        assert_eq!(value["xaxis"], json!({"title": "X"}));
        assert!(value.get("barmode").is_none());
        assert!(value.get("showlegend").is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = LayoutOverrides {
            title: Some("Other".to_string()),
            width: Some(900),
            barmode: Some(BarMode::Group),
            ..Default::default()
        };
        let layout = build_layout("T", "Y", "X", Some(AxisType::Log), 500, 350, Some(overrides));
        assert_eq!(layout.title, "Other");
        assert_eq!(layout.width, 900);
        assert_eq!(layout.height, 350);

        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["barmode"], json!("group"));
        assert_eq!(value["xaxis"]["type"], json!("log"));
    }

    #[test]
    fn test_merged_with_prefers_caller() {
        let preset = overrides(r#"{"barmode": "stack", "height": 200, "yaxis": {"title": "P"}}"#);
        let caller = overrides(r#"{"barmode": "group", "yaxis": {"range": [0, 5]}}"#);
        let merged = preset.merged_with(caller);
        assert_eq!(merged.height, Some(200));

        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["barmode"], json!("group"));
        assert_eq!(value["yaxis"], json!({"title": "P", "range": [0.0, 5.0]}));
    }

    #[test]
    fn test_axis_override_merges_into_defaults() {
        let value = layout_json(Some(overrides(r#"{"yaxis": {"range": [0, 10]}}"#)));
        assert_eq!(
            value["yaxis"],
            json!({"title": "Y", "range": [0.0, 10.0], "rangemode": "tozero"})
        );

        let text = serde_json::to_string(&build_layout(
            "T",
            "Y",
            "X",
            None,
            500,
            350,
            Some(overrides(r#"{"yaxis": {"range": [0, 10]}}"#)),
        ))
        .unwrap();
        assert_eq!(text.matches(r#""yaxis""#).count(), 1);
    }

    #[test]
    fn test_partial_legend_and_margin() {
        let value = layout_json(Some(overrides(
            r#"{"legend": {"orientation": "v"}, "margin": {"t": 20}}"#,
        )));
        assert_eq!(value["legend"], json!({"x": 0.0, "y": -0.2, "orientation": "v"}));
        assert_eq!(value["margin"], json!({"l": 70, "r": 70, "t": 20, "b": 70}));
    }

    #[test]
    fn test_overrides_from_json() {
        let parsed = overrides(r#"{"barmode": "overlay", "xaxis": {"type": "category"}}"#);
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({"barmode": "overlay", "xaxis": {"type": "category"}})
        );

        let unknown = serde_json::from_str::<LayoutOverrides>(r#"{"hovermode": "x unified"}"#);
        assert!(unknown.is_err());
        let bad_enum = serde_json::from_str::<LayoutOverrides>(r#"{"barmode": "sideways"}"#);
        assert!(bad_enum.unwrap_err().to_string().contains("Unknown bar mode 'sideways'"));
    }

    #[test]
    fn test_to_plotly_layout() {
        let layout = build_layout(
            "T",
            "Y",
            "X",
            None,
            500,
            350,
            Some(overrides(r#"{"barmode": "stack"}"#)),
        );
        let value = serde_json::to_value(layout.to_plotly()).unwrap();
        assert_eq!(value["title"]["text"], json!("T"));
        assert_eq!(value["barmode"], json!("stack"));
        assert_eq!(value["yaxis"]["rangemode"], json!("tozero"));
        assert_eq!(value["width"], json!(500));
    }
}
