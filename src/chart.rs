//! Chart specifications
//!
//! Serde structures mirroring the subset of the Plotly figure schema the views
//! use. A `ChartSpec` names the DOM element it mounts into and is handed to the
//! rendering sink as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GREEN: &str = "#10b981";
pub const BLUE: &str = "#3b82f6";
pub const PURPLE: &str = "#8b5cf6";
pub const AMBER: &str = "#f59e0b";
pub const RED: &str = "#ef4444";
pub const GRAY: &str = "#6b7280";
pub const CYAN: &str = "#06b6d4";
pub const ROYAL: &str = "#2563eb";

/// Click on a plotted element, as reported back by the rendering sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartClick {
    /// Mount id of the clicked chart
    pub mount: String,
    /// X value of the clicked point
    pub x: Value,
    #[serde(default)]
    pub series: Option<usize>,
}

impl ChartClick {
    pub fn new(mount: impl Into<String>, x: impl Into<Value>) -> Self {
        Self {
            mount: mount.into(),
            x: x.into(),
            series: None,
        }
    }
}

/// A complete chart for one mount point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Id of the element the chart is drawn into
    pub mount: String,
    pub data: Vec<Trace>,
    pub layout: Layout,
    pub config: DisplayConfig,
}

impl ChartSpec {
    pub fn new(mount: impl Into<String>, data: Vec<Trace>, layout: Layout) -> Self {
        Self {
            mount: mount.into(),
            data,
            layout,
            config: DisplayConfig::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

/// One data series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub name: String,
    pub x: Vec<Value>,
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

impl Trace {
    fn new(kind: TraceKind, name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>) -> Self {
        Self {
            kind,
            name: name.into(),
            x,
            y,
            mode: None,
            fill: None,
            marker: None,
            line: None,
            yaxis: None,
            hovertemplate: None,
        }
    }

    /// Line with point markers
    pub fn line(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>, color: &str) -> Self {
        let mut trace = Self::new(TraceKind::Scatter, name, x, y);
        trace.mode = Some("lines+markers".to_string());
        trace.line = Some(Line::solid(color, 2.0));
        trace.marker = Some(Marker::color(color));
        trace
    }

    /// Plain line without markers
    pub fn lines(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>, color: &str) -> Self {
        let mut trace = Self::new(TraceKind::Scatter, name, x, y);
        trace.mode = Some("lines".to_string());
        trace.line = Some(Line::solid(color, 2.0));
        trace
    }

    pub fn bar(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>, color: &str) -> Self {
        let mut trace = Self::new(TraceKind::Bar, name, x, y);
        trace.marker = Some(Marker::color(color));
        trace
    }

    /// Filled area down to zero
    pub fn area(name: impl Into<String>, x: Vec<Value>, y: Vec<Option<f64>>, color: &str) -> Self {
        let mut trace = Self::new(TraceKind::Scatter, name, x, y);
        trace.mode = Some("lines".to_string());
        trace.fill = Some("tozeroy".to_string());
        trace.line = Some(Line::solid(color, 2.0));
        trace
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.yaxis = Some("y2".to_string());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_hover(mut self, template: impl Into<String>) -> Self {
        self.hovertemplate = Some(template.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: MarkerColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Marker {
    pub fn color(color: &str) -> Self {
        Self {
            color: MarkerColor::Single(color.to_string()),
            size: None,
        }
    }

    pub fn per_point(colors: Vec<String>) -> Self {
        Self {
            color: MarkerColor::PerPoint(colors),
            size: None,
        }
    }

    pub fn sized(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl Line {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: Some("dash".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn date(title: impl Into<String>) -> Self {
        Self {
            kind: Some("date".to_string()),
            ..Self::titled(title)
        }
    }

    /// Category axis; keeps string keys from being reinterpreted as dates
    pub fn category(title: impl Into<String>) -> Self {
        Self {
            kind: Some("category".to_string()),
            ..Self::titled(title)
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some([min, max]);
        self
    }

    /// Right-hand axis overlaying the primary one
    pub fn secondary(title: impl Into<String>) -> Self {
        Self {
            side: Some("right".to_string()),
            overlaying: Some("y".to_string()),
            ..Self::titled(title)
        }
    }
}

/// Horizontal reference line spanning the plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub xref: String,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

impl Shape {
    pub fn horizontal(y: f64, line: Line) -> Self {
        Self {
            kind: "line".to_string(),
            xref: "paper".to_string(),
            x0: 0.0,
            x1: 1.0,
            y0: y,
            y1: y,
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub xref: String,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
}

impl Annotation {
    /// Label pinned to the right edge at height `y`
    pub fn right_edge(y: f64, text: impl Into<String>) -> Self {
        Self {
            xref: "paper".to_string(),
            x: 1.0,
            y,
            text: text.into(),
            showarrow: false,
            xanchor: Some("right".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    pub hovermode: String,
    pub showlegend: bool,
    pub height: u32,
}

impl Layout {
    pub fn new(title: impl Into<String>, xaxis: Axis, yaxis: Axis) -> Self {
        Self {
            title: title.into(),
            xaxis,
            yaxis,
            yaxis2: None,
            barmode: None,
            shapes: Vec::new(),
            annotations: Vec::new(),
            hovermode: "closest".to_string(),
            showlegend: false,
            height: 400,
        }
    }

    pub fn with_barmode(mut self, mode: &str) -> Self {
        self.barmode = Some(mode.to_string());
        self.showlegend = true;
        self
    }

    pub fn with_secondary_axis(mut self, axis: Axis) -> Self {
        self.yaxis2 = Some(axis);
        self.showlegend = true;
        self
    }

    pub fn with_legend(mut self) -> Self {
        self.showlegend = true;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }
}

/// Display options passed alongside the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            display_mode_bar: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_line_trace_shape() {
        let trace = Trace::line(
            "Sleep Score",
            vec![json!("2024-01-01")],
            vec![Some(80.0)],
            PURPLE,
        );
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "scatter",
                "name": "Sleep Score",
                "x": ["2024-01-01"],
                "y": [80.0],
                "mode": "lines+markers",
                "marker": {"color": PURPLE},
                "line": {"color": PURPLE, "width": 2.0}
            })
        );
    }

    #[test]
    fn test_layout_skips_empty_parts() {
        let layout = Layout::new("Steps", Axis::date("Date"), Axis::titled("Steps").with_range(0.0, 100.0));
        let value = serde_json::to_value(&layout).unwrap();
        assert!(value.get("shapes").is_none());
        assert!(value.get("yaxis2").is_none());
        assert_eq!(value["yaxis"]["range"], json!([0.0, 100.0]));
        assert_eq!(value["xaxis"]["type"], "date");
    }

    #[test]
    fn test_config_is_camel_case() {
        let spec = ChartSpec::new("chart", Vec::new(), Layout::new("", Axis::default(), Axis::default()));
        let value: Value = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(value["config"], json!({"responsive": true, "displayModeBar": false}));
    }
}
