//! Run quality chart adapter
//!
//! Maps a run's coverage and quality profiles into a declarative,
//! ECharts-compatible dual-axis line chart option. Pure: the same
//! profiles always produce the same option.

use serde::Serialize;

/// Ceiling of the quality axis (Phred)
pub const MAX_PHRED: f64 = 40.0;

pub const COVERAGE_SERIES: &str = "Depth of Coverage (x)";
pub const QUALITY_SERIES: &str = "Phred Quality Score";

const COVERAGE_COLOR: &str = "#3b82f6"; // Blue
const COVERAGE_AREA: &str = "rgba(59, 130, 246, 0.1)";
const QUALITY_COLOR: &str = "#10b981"; // Green

/// Result of adapting a pair of profiles
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "option", rename_all = "snake_case")]
pub enum ChartOutput {
    /// Nothing to plot; callers show a placeholder
    NoData,
    Chart(ChartOption),
}

impl ChartOutput {
    pub fn option(&self) -> Option<&ChartOption> {
        match self {
            ChartOutput::Chart(option) => Some(option),
            ChartOutput::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub tooltip: Tooltip,
    pub legend: Legend,
    pub grid: Grid,
    pub x_axis: CategoryAxis,
    pub y_axis: Vec<ValueAxis>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub trigger: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub data: Vec<String>,
    pub bottom: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub left: String,
    pub right: String,
    pub bottom: String,
    pub top: String,
    pub contain_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxis {
    #[serde(rename = "type")]
    pub kind: String,
    pub boundary_gap: bool,
    pub data: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    /// `None` is a gap in the line
    pub data: Vec<Option<f64>>,
    pub smooth: bool,
    pub item_style: ColorStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<ColorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStyle {
    pub color: String,
}

/// Build the coverage/quality chart for one run.
///
/// The x-axis is `1..=coverage.len()`, one point per index, no binning.
/// Quality is paired index-by-index with coverage: extra quality points
/// are dropped and missing ones are gaps. Non-finite values are gaps.
pub fn build_quality_chart(coverage: &[f64], quality: &[f64]) -> ChartOutput {
    if coverage.is_empty() {
        return ChartOutput::NoData;
    }

    let len = coverage.len();
    let x_axis: Vec<usize> = (1..=len).collect();

    let coverage_points: Vec<Option<f64>> = coverage.iter().copied().map(finite).collect();
    let quality_points: Vec<Option<f64>> = (0..len)
        .map(|i| quality.get(i).copied().and_then(finite))
        .collect();

    ChartOutput::Chart(ChartOption {
        tooltip: Tooltip {
            trigger: "axis".to_string(),
        },
        legend: Legend {
            data: vec![COVERAGE_SERIES.to_string(), QUALITY_SERIES.to_string()],
            bottom: 0,
        },
        grid: Grid {
            left: "3%".to_string(),
            right: "4%".to_string(),
            bottom: "15%".to_string(),
            top: "10%".to_string(),
            contain_label: true,
        },
        x_axis: CategoryAxis {
            kind: "category".to_string(),
            boundary_gap: false,
            data: x_axis,
        },
        y_axis: vec![
            ValueAxis {
                kind: "value".to_string(),
                name: "Coverage".to_string(),
                position: "left".to_string(),
                max: None,
            },
            ValueAxis {
                kind: "value".to_string(),
                name: "Quality".to_string(),
                position: "right".to_string(),
                max: Some(MAX_PHRED),
            },
        ],
        series: vec![
            LineSeries {
                name: COVERAGE_SERIES.to_string(),
                kind: "line".to_string(),
                y_axis_index: None,
                data: coverage_points,
                smooth: true,
                item_style: ColorStyle {
                    color: COVERAGE_COLOR.to_string(),
                },
                area_style: Some(ColorStyle {
                    color: COVERAGE_AREA.to_string(),
                }),
            },
            LineSeries {
                name: QUALITY_SERIES.to_string(),
                kind: "line".to_string(),
                y_axis_index: Some(1),
                data: quality_points,
                smooth: true,
                item_style: ColorStyle {
                    color: QUALITY_COLOR.to_string(),
                },
                area_style: None,
            },
        ],
    })
}

/// Whether the two profiles pair up index-for-index
pub fn profiles_aligned(coverage: &[f64], quality: &[f64]) -> bool {
    coverage.len() == quality.len()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
