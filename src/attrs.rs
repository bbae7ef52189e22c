// Plotly attribute names for the plotly crate's enums, plus JSON merging.
//
// The plotly enums serialize to Plotly's wire names but cannot be read back,
// so override structs deserialize them through the adapters below.

use plotly::common::{Fill, Mode, Orientation};
use plotly::histogram::{Bins, HistNorm};
use plotly::layout::{AxisType, BarMode, RangeMode};
use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};

macro_rules! wire_enum {
    ($parse:ident, $de:ident, $ty:ident, $what:literal, {
        $($($name:literal)|+ => $variant:expr),+ $(,)?
    }) => {
        /// Parse a Plotly attribute value (case-insensitive)
        pub fn $parse(name: &str) -> Result<$ty, String> {
            match name.to_ascii_lowercase().as_str() {
                $($($name)|+ => Ok($variant),)+
                _ => Err(format!("Unknown {} '{}'", $what, name)),
            }
        }

        pub fn $de<'de, D>(deserializer: D) -> Result<Option<$ty>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|name| $parse(&name).map_err(de::Error::custom))
                .transpose()
        }
    };
}

wire_enum!(parse_orientation, orientation, Orientation, "orientation", {
    "h" | "horizontal" => Orientation::Horizontal,
    "v" | "vertical" => Orientation::Vertical,
});

wire_enum!(parse_axis_type, axis_type, AxisType, "axis type", {
    "-" | "auto" => AxisType::Default,
    "linear" => AxisType::Linear,
    "log" => AxisType::Log,
    "date" => AxisType::Date,
    "category" => AxisType::Category,
    "multicategory" => AxisType::MultiCategory,
});

wire_enum!(parse_range_mode, range_mode, RangeMode, "range mode", {
    "normal" => RangeMode::Normal,
    "tozero" => RangeMode::ToZero,
    "nonnegative" => RangeMode::NonNegative,
});

wire_enum!(parse_bar_mode, bar_mode, BarMode, "bar mode", {
    "stack" => BarMode::Stack,
    "group" => BarMode::Group,
    "overlay" => BarMode::Overlay,
    "relative" => BarMode::Relative,
});

wire_enum!(parse_fill, fill, Fill, "fill", {
    "none" => Fill::None,
    "tozeroy" => Fill::ToZeroY,
    "tozerox" => Fill::ToZeroX,
    "tonexty" => Fill::ToNextY,
    "tonextx" => Fill::ToNextX,
    "toself" => Fill::ToSelf,
    "tonext" => Fill::ToNext,
});

wire_enum!(parse_mode, mode, Mode, "mode", {
    "lines" => Mode::Lines,
    "markers" => Mode::Markers,
    "text" => Mode::Text,
    "lines+markers" => Mode::LinesMarkers,
    "lines+text" => Mode::LinesText,
    "markers+text" => Mode::MarkersText,
    "lines+markers+text" => Mode::LinesMarkersText,
    "none" => Mode::None,
});

// An empty histnorm is Plotly's count normalization
wire_enum!(parse_histnorm, histnorm, HistNorm, "histnorm", {
    "" | "count" => HistNorm::Default,
    "percent" => HistNorm::Percent,
    "probability" => HistNorm::Probability,
    "density" => HistNorm::Density,
    "probability density" => HistNorm::ProbabilityDensity,
});

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BinRange {
    start: f64,
    end: f64,
    size: f64,
}

pub fn bins<'de, D>(deserializer: D) -> Result<Option<Bins>, D::Error>
where
    D: Deserializer<'de>,
{
    let range = Option::<BinRange>::deserialize(deserializer)?;
    Ok(range.map(|r| Bins::new(r.start, r.end, r.size)))
}

/// Merge `over` into `base`: objects merge key by key, anything else replaces
pub fn merge_value(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => merge_map(base, over),
        (slot, value) => *slot = value,
    }
}

pub fn merge_map(base: &mut Map<String, Value>, over: Map<String, Value>) {
    for (key, value) in over {
        match base.get_mut(&key) {
            Some(slot) => merge_value(slot, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}
