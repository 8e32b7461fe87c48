use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::debug;

use crate::activity_log::read_log;
use crate::charts::{
    build_full_legend, build_top3_legend, build_waste_by_category_chart,
    build_waste_vs_savings_data, label_position, ring_center_percentage, ring_tooltip_label,
    style_as_ring,
};
use crate::error::AppError;
use crate::models::{Activity, ChartData, QueryResult, WasteRing};
use crate::nudge::{leaderboard_nudge, waste_save_ratio};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity_log::append_to_log;
    use serde_json::Value;
    use tempfile::NamedTempFile;

    fn log_with(activities: &[Value]) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        for value in activities {
            let activity: Activity = serde_json::from_value(value.clone()).unwrap();
            append_to_log(temp_file.path(), &activity).unwrap();
        }
        temp_file
    }

    fn projector(temp_file: &NamedTempFile) -> DashboardProjector {
        DashboardProjector::new(temp_file.path(), None)
    }

    #[test]
    fn test_projector_reads_log() {
        let temp_file = log_with(&[
            json!({"activityType": "expFood", "category": "Dairy", "createdAt": "2024-02-10T12:00:00Z"}),
            json!({"activityType": "conFood", "note": "fully consumed", "createdAt": "2024-02-11T12:00:00Z"}),
        ]);

        let chart = projector(&temp_file).waste_vs_savings().unwrap();
        assert_eq!(chart.labels, vec!["Jan", "Feb"]);
        assert_eq!(chart.datasets[0].data, vec![0.0, 1.0]);
        assert_eq!(chart.datasets[1].data, vec![0.0, 1.0]);
    }

    #[test]
    fn test_waste_ring_payload() {
        let temp_file = log_with(&[
            json!({"activityType": "expFood", "category": "Dairy"}),
            json!({"activityType": "expFood", "category": "Dairy"}),
            json!({"activityType": "expFood", "category": "Dairy"}),
            json!({"activityType": "expFood", "category": "Produce"}),
        ]);

        let ring = projector(&temp_file).waste_ring().unwrap();
        assert_eq!(ring.ring.labels, vec!["Dairy", "Produce"]);
        assert_eq!(ring.ring.data, vec![3.0, 1.0]);
        assert_eq!(ring.top_legend[0].label, "Dairy");
        assert_eq!(ring.top_legend[0].percentage, 75);
        assert_eq!(ring.legend.len(), 2);
        assert_eq!(ring.label_positions.len(), ring.legend.len());
        assert_eq!(ring.center_percentage, Some(75));
        assert_eq!(ring.tooltips, vec!["Dairy: 3 (75.0%)", "Produce: 1 (25.0%)"]);
    }

    #[test]
    fn test_empty_log_projections() {
        let temp_file = NamedTempFile::new().unwrap();
        let projector = projector(&temp_file);

        assert_eq!(projector.waste_vs_savings().unwrap().labels.len(), 12);
        assert!(projector.waste_by_category().unwrap().labels.is_empty());

        let ring = projector.waste_ring().unwrap();
        assert!(ring.top_legend.is_empty());
        assert_eq!(ring.center_percentage, None);

        assert!(projector.nudge().unwrap().ends_with("Keep reducing waste to boost your Food Score."));
    }

    #[test]
    fn test_query_routing() {
        let temp_file = log_with(&[json!({"activityType": "expFood", "category": "Meat"})]);
        let projector = projector(&temp_file);

        let result = projector.query("show me the leaderboard nudge").unwrap();
        assert_eq!(result.result_type, "nudge");
        assert_eq!(result.data["ratio"], "1:0");

        let result = projector.query("waste by category").unwrap();
        assert_eq!(result.result_type, "chart");
        assert_eq!(result.data["labels"][0], "Meat");

        let result = projector.query("ring").unwrap();
        assert_eq!(result.result_type, "ring");

        let result = projector.query("monthly savings").unwrap();
        assert_eq!(result.result_type, "chart");

        let result = projector.query("anything else").unwrap();
        assert_eq!(result.result_type, "recent");
        assert_eq!(result.data["activities"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_palette() {
        let temp_file = log_with(&[json!({"activityType": "expFood", "category": "Meat"})]);
        let palette = vec!["#000000".to_string()];
        let projector = DashboardProjector::new(temp_file.path(), Some(palette.as_slice()));

        let chart = projector.waste_by_category().unwrap();
        assert_eq!(chart.datasets[0].background_color, palette);
    }
}

/// How many activities a fallback query returns
const RECENT_LIMIT: usize = 20;

/// Projects dashboard charts from the activity log.
/// Holds no state beyond the log location; every call re-reads the log.
pub struct DashboardProjector {
    log_path: PathBuf,
    palette: Option<Vec<String>>,
}

impl DashboardProjector {
    pub fn new(log_path: &Path, palette: Option<&[String]>) -> Self {
        Self {
            log_path: log_path.to_path_buf(),
            palette: palette.map(<[String]>::to_vec),
        }
    }

    pub fn activities(&self) -> Result<Vec<Activity>, AppError> {
        let activities = read_log(&self.log_path)?;
        debug!(count = activities.len(), "Loaded activities");
        Ok(activities)
    }

    pub fn waste_vs_savings(&self) -> Result<ChartData, AppError> {
        Ok(build_waste_vs_savings_data(&self.activities()?))
    }

    pub fn waste_by_category(&self) -> Result<ChartData, AppError> {
        Ok(build_waste_by_category_chart(&self.activities()?, self.palette.as_deref()))
    }

    pub fn waste_ring(&self) -> Result<WasteRing, AppError> {
        let base = self.waste_by_category()?;
        let ring = style_as_ring(Some(&base));
        let palette = self.palette.as_deref();

        let top_legend = build_top3_legend(&ring.labels, &ring.data, palette);
        let legend = build_full_legend(&ring.labels, &ring.data, palette);
        let label_positions = (0..legend.len())
            .filter_map(|idx| label_position(idx, &legend))
            .collect();
        let center_percentage = ring_center_percentage(&ring.data);
        let tooltips = ring
            .labels
            .iter()
            .zip(&ring.data)
            .map(|(label, &value)| ring_tooltip_label(label, value, &ring.data))
            .collect();

        Ok(WasteRing {
            ring,
            top_legend,
            legend,
            label_positions,
            center_percentage,
            tooltips,
        })
    }

    pub fn nudge(&self) -> Result<String, AppError> {
        Ok(leaderboard_nudge(&self.activities()?))
    }

    /// Route a free-text query to the matching projection
    pub fn query(&self, query: &str) -> Result<QueryResult, AppError> {
        let q = query.to_lowercase();

        let (result_type, data) = if q.contains("nudge") || q.contains("leaderboard") {
            let activities = self.activities()?;
            let stats = waste_save_ratio(&activities);
            (
                "nudge",
                json!({
                    "message": leaderboard_nudge(&activities),
                    "ratio": stats.ratio(),
                    "pctWasted": stats.pct_wasted,
                }),
            )
        } else if q.contains("ring") {
            ("ring", serde_json::to_value(self.waste_ring()?)?)
        } else if q.contains("category") {
            ("chart", serde_json::to_value(self.waste_by_category()?)?)
        } else if q.contains("saving") || q.contains("month") {
            ("chart", serde_json::to_value(self.waste_vs_savings()?)?)
        } else {
            let activities = self.activities()?;
            let skip = activities.len().saturating_sub(RECENT_LIMIT);
            let recent: Vec<Activity> = activities.into_iter().skip(skip).collect();
            ("recent", json!({ "activities": recent }))
        };

        Ok(QueryResult {
            query: query.to_string(),
            result_type: result_type.to_string(),
            data,
        })
    }
}
