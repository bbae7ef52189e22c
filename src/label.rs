// Label resolution: titles, per-series column lists and legend names

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column name or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    One(String),
    Many(Vec<String>),
}

impl ColumnSpec {
    /// Wrap-to-list: a single name becomes a one-element list
    pub fn columns(&self) -> Vec<String> {
        match self {
            ColumnSpec::One(name) => vec![name.clone()],
            ColumnSpec::Many(names) => names.clone(),
        }
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::One(name) => write!(f, "{}", name),
            ColumnSpec::Many(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::One(name.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::One(name)
    }
}

impl From<Vec<String>> for ColumnSpec {
    fn from(names: Vec<String>) -> Self {
        ColumnSpec::Many(names)
    }
}

impl From<Vec<&str>> for ColumnSpec {
    fn from(names: Vec<&str>) -> Self {
        ColumnSpec::Many(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for ColumnSpec {
    fn from(names: &[&str]) -> Self {
        ColumnSpec::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ColumnSpec {
    fn from(names: [&str; N]) -> Self {
        ColumnSpec::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Resolved titles and per-series bindings for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBundle {
    pub title: String,
    pub y_title: String,
    pub x_title: String,
    pub y_columns: Vec<String>,
    pub x_columns: Vec<String>,
    pub legend_names: Vec<String>,
}

impl LabelBundle {
    /// X column for series `idx`, falling back to the shared (first) x column
    pub fn x_column_at(&self, idx: usize) -> &str {
        self.x_columns
            .get(idx)
            .or_else(|| self.x_columns.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Legend name for series `idx`, falling back to its y column
    pub fn legend_name_at(&self, idx: usize) -> &str {
        self.legend_names
            .get(idx)
            .or_else(|| self.y_columns.get(idx))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Resolve titles and legend names, filling whatever the caller left out.
///
/// `y_title`/`x_title` default to the column spec itself, `title` to
/// `"{y_title} vs {x_title}"` and `legend_name` to `y`. Empty strings count
/// as absent.
pub fn resolve_label(
    y: &ColumnSpec,
    x: &ColumnSpec,
    title: Option<&str>,
    y_title: Option<&str>,
    x_title: Option<&str>,
    legend_name: Option<&ColumnSpec>,
) -> LabelBundle {
    let y_title = non_empty(y_title).unwrap_or_else(|| y.to_string());
    let x_title = non_empty(x_title).unwrap_or_else(|| x.to_string());
    let title = non_empty(title).unwrap_or_else(|| format!("{} vs {}", y_title, x_title));
    let legend_name = legend_name.unwrap_or(y);

    LabelBundle {
        title,
        y_title,
        x_title,
        y_columns: y.columns(),
        x_columns: x.columns(),
        legend_names: legend_name.columns(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_wraps_to_list() {
        let label = resolve_label(&"y".into(), &"x".into(), None, None, None, None);
        assert_eq!(label.y_columns, vec!["y"]);
        assert_eq!(label.x_columns, vec!["x"]);
        assert_eq!(label.legend_names, vec!["y"]);
    }

    #[test]
    fn test_default_titles() {
        let label = resolve_label(&"temp".into(), &"time".into(), None, None, None, None);
        assert_eq!(label.y_title, "temp");
        assert_eq!(label.x_title, "time");
        assert_eq!(label.title, "temp vs time");
    }

    #[test]
    fn test_explicit_titles_win() {
        let label = resolve_label(
            &"temp".into(),
            &"time".into(),
            Some("Weather"),
            Some("Temperature"),
            None,
            None,
        );
        assert_eq!(label.title, "Weather");
        assert_eq!(label.y_title, "Temperature");
        assert_eq!(label.x_title, "time");
    }

    #[test]
    fn test_title_built_from_custom_axis_titles() {
        let label = resolve_label(&"a".into(), &"b".into(), None, Some("A"), Some("B"), None);
        assert_eq!(label.title, "A vs B");
    }

    #[test]
    fn test_empty_title_falls_back() {
        let label = resolve_label(&"a".into(), &"b".into(), Some(""), Some(""), None, None);
        assert_eq!(label.y_title, "a");
        assert_eq!(label.title, "a vs b");
    }

    #[test]
    fn test_list_y_title_is_unjoined_list() {
        let label = resolve_label(&["a", "b"].into(), &"t".into(), None, None, None, None);
        assert_eq!(label.y_title, "[a, b]");
        assert_eq!(label.title, "[a, b] vs t");
    }

    #[test]
    fn test_shared_x_for_every_series() {
        let label = resolve_label(&["a", "b", "c"].into(), &"t".into(), None, None, None, None);
        for idx in 0..label.y_columns.len() {
            assert_eq!(label.x_column_at(idx), "t");
        }
    }

    #[test]
    fn test_per_series_x_by_index() {
        let y = ColumnSpec::from(["a", "b", "c"]);
        let label = resolve_label(&y, &["t1", "t2"].into(), None, None, None, None);
        assert_eq!(label.x_column_at(0), "t1");
        assert_eq!(label.x_column_at(1), "t2");
        assert_eq!(label.x_column_at(2), "t1");
    }

    #[test]
    fn test_short_legend_falls_back_to_y_column() {
        let legend: ColumnSpec = "first".into();
        let label = resolve_label(&["a", "b"].into(), &"t".into(), None, None, None, Some(&legend));
        assert_eq!(label.legend_name_at(0), "first");
        assert_eq!(label.legend_name_at(1), "b");
    }

    #[test]
    fn test_column_spec_deserializes_both_forms() {
        let one: ColumnSpec = serde_json::from_str(r#""a""#).unwrap();
        let many: ColumnSpec = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(one, ColumnSpec::One("a".to_string()));
        assert_eq!(many.columns(), vec!["a", "b"]);
    }
}
