//! Pure chart builders: activity log in, chart-ready series out.
//!
//! Nothing here touches I/O or shared state, and nothing here fails.
//! Malformed input degrades to defaults or empty series.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::colors::{darken_color, default_palette, hex_a, LEGEND_FALLBACK_COLOR};
use crate::dates::month_index;
use crate::models::{Activity, ChartData, Dataset, LabelPosition, LegendEntry, RingChart};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const RING_CUTOUT: &str = "72%";
/// How much darker a ring segment gets under the pointer
pub const RING_HOVER_DARKEN: f64 = 10.0;
pub const TOP_LEGEND_SIZE: usize = 3;

/// Label anchor geometry, in percent of the ring's bounding box
pub const LABEL_CENTER: (f64, f64) = (50.0, 50.0);
pub const LABEL_RADIUS: f64 = 38.0;

const SAVINGS_COLOR: &str = "#7B61FF";
const WASTE_LINE_COLOR: &str = "#FFA449";
/// Waste area fill, orange rather than a tint of the line color
const WASTE_FILL_COLOR: &str = "rgba(255, 165, 0, 0.25)";
const AREA_ALPHA: f64 = 0.25;
const LINE_TENSION: f64 = 0.35;

/// Round half up, matching how the dashboard has always rounded
pub(crate) fn percent_of(value: f64, total: f64) -> u32 {
    ((value / total) * 100.0 + 0.5).floor() as u32
}

/// Month-indexed waste and savings totals, trimmed to the last active month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub waste: Vec<f64>,
    pub saved: Vec<f64>,
}

pub fn build_monthly_series(activities: &[Activity]) -> MonthlySeries {
    let mut waste = [0.0_f64; 12];
    let mut saved = [0.0_f64; 12];

    for activity in activities {
        let Some(month) = month_index(activity.created_at.as_ref()) else {
            continue;
        };

        if activity.is_waste() {
            waste[month] += activity.quantity_or_default();
        } else if activity.is_full_save() {
            saved[month] += activity.quantity_or_default();
        }
    }

    let last_active = |series: &[f64]| series.iter().rposition(|v| *v > 0.0);
    let end = last_active(&waste[..])
        .max(last_active(&saved[..]))
        .map_or(MONTHS.len(), |idx| idx + 1);

    MonthlySeries {
        labels: MONTHS[..end].iter().map(|m| m.to_string()).collect(),
        waste: waste[..end].to_vec(),
        saved: saved[..end].to_vec(),
    }
}

fn area_dataset(label: &str, data: Vec<f64>, line_color: &str, fill_color: Option<String>) -> Dataset {
    Dataset {
        label: Some(label.to_string()),
        data,
        background_color: fill_color.into_iter().collect(),
        border_color: Some(line_color.to_string()),
        tension: Some(LINE_TENSION),
        fill: Some(true),
    }
}

/// Waste vs savings area chart; datasets are `Savings` then `Waste`
pub fn build_waste_vs_savings_data(activities: &[Activity]) -> ChartData {
    let series = build_monthly_series(activities);

    ChartData {
        labels: series.labels,
        datasets: vec![
            area_dataset(
                "Savings",
                series.saved,
                SAVINGS_COLOR,
                hex_a(SAVINGS_COLOR, AREA_ALPHA),
            ),
            area_dataset(
                "Waste",
                series.waste,
                WASTE_LINE_COLOR,
                Some(WASTE_FILL_COLOR.to_string()),
            ),
        ],
    }
}

/// Count waste records per category in first-seen order.
///
/// This is a record count, not a quantity sum. Colors are handed out by
/// position and never cycled, so extra categories get no color.
pub fn build_waste_by_category_chart(activities: &[Activity], colors: Option<&[String]>) -> ChartData {
    let palette = colors.map(<[String]>::to_vec).unwrap_or_else(default_palette);

    let mut labels: Vec<String> = Vec::new();
    let mut counts: Vec<f64> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for activity in activities.iter().filter(|a| a.is_waste()) {
        let category = activity.category_or_unknown();
        if let Some(&idx) = positions.get(category) {
            counts[idx] += 1.0;
            continue;
        }

        positions.insert(category.to_string(), labels.len());
        labels.push(category.to_string());
        counts.push(1.0);
    }

    let background_color = palette.into_iter().take(counts.len()).collect();

    ChartData {
        labels,
        datasets: vec![Dataset {
            data: counts,
            background_color,
            ..Default::default()
        }],
    }
}

/// Reshape chart data into a thick ring with no stroke.
///
/// Only the first dataset is used. Missing data becomes empty sequences.
pub fn style_as_ring(base: Option<&ChartData>) -> RingChart {
    let labels = base.map(|b| b.labels.clone()).unwrap_or_default();
    let first = base.and_then(|b| b.datasets.first());
    let background_color: Vec<String> = first.map(|ds| ds.background_color.clone()).unwrap_or_default();
    let hover_background_color = background_color
        .iter()
        .map(|color| darken_color(color, RING_HOVER_DARKEN))
        .collect();

    RingChart {
        labels,
        data: first.map(|ds| ds.data.clone()).unwrap_or_default(),
        background_color,
        hover_background_color,
        border_width: 0,
        border_radius: 0,
        cutout: RING_CUTOUT.to_string(),
    }
}

fn legend_entries(labels: &[String], data: &[f64], colors: Option<&[String]>) -> Vec<LegendEntry> {
    let palette = colors.map(<[String]>::to_vec).unwrap_or_else(default_palette);
    let sum: f64 = data.iter().sum();
    let total = if sum == 0.0 { 1.0 } else { sum };

    data.iter()
        .enumerate()
        .map(|(i, &value)| LegendEntry {
            label: labels.get(i).cloned().unwrap_or_default(),
            value,
            percentage: percent_of(value, total),
            color: palette
                .get(i)
                .cloned()
                .unwrap_or_else(|| LEGEND_FALLBACK_COLOR.to_string()),
        })
        .collect()
}

/// The three largest segments, biggest first. Ties keep their input order.
pub fn build_top3_legend(labels: &[String], data: &[f64], colors: Option<&[String]>) -> Vec<LegendEntry> {
    if labels.is_empty() || data.is_empty() {
        return Vec::new();
    }

    let mut entries = legend_entries(labels, data, colors);
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    entries.truncate(TOP_LEGEND_SIZE);
    entries
}

/// Every segment with a non-zero rounded share, in input order
pub fn build_full_legend(labels: &[String], data: &[f64], colors: Option<&[String]>) -> Vec<LegendEntry> {
    if labels.is_empty() || data.is_empty() {
        return Vec::new();
    }

    legend_entries(labels, data, colors)
        .into_iter()
        .filter(|entry| entry.percentage > 0)
        .collect()
}

/// Where to anchor the label of segment `index`.
///
/// Segments run clockwise from 12 o'clock; the anchor sits at the angular
/// midpoint of the segment, `LABEL_RADIUS` away from `LABEL_CENTER`.
pub fn label_position(index: usize, entries: &[LegendEntry]) -> Option<LabelPosition> {
    let current = entries.get(index)?;
    let preceding: f64 = entries[..index].iter().map(|e| f64::from(e.percentage)).sum();
    let midpoint = preceding + f64::from(current.percentage) / 2.0;
    let angle = (midpoint * 3.6 - 90.0).to_radians();

    Some(LabelPosition {
        x: LABEL_CENTER.0 + LABEL_RADIUS * angle.cos(),
        y: LABEL_CENTER.1 + LABEL_RADIUS * angle.sin(),
    })
}

/// Share of the largest segment, shown in the ring's hole
pub fn ring_center_percentage(values: &[f64]) -> Option<u32> {
    let total: f64 = values.iter().sum();
    if values.is_empty() || total == 0.0 {
        return None;
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(percent_of(max, total))
}

pub fn ring_tooltip_label(label: &str, value: f64, values: &[f64]) -> String {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return format!("{}: {} (0%)", label, value);
    }
    format!("{}: {} ({:.1}%)", label, value, (value / total) * 100.0)
}
