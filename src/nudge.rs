//! Leaderboard coaching line built straight from the activity log.
//!
//! Unlike the monthly savings series, every consumption record counts as a
//! save here, whatever its note says. Both views are user-visible, so the
//! two definitions are kept as they are.

use crate::charts::percent_of;
use crate::models::Activity;

const TOP_WASTE_CATEGORIES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasteSaveRatio {
    pub waste: usize,
    pub save: usize,
    pub pct_wasted: u32,
}

impl WasteSaveRatio {
    /// `"{waste}:{save}"`
    pub fn ratio(&self) -> String {
        format!("{}:{}", self.waste, self.save)
    }
}

pub fn waste_save_ratio(activities: &[Activity]) -> WasteSaveRatio {
    let waste = activities.iter().filter(|a| a.is_waste()).count();
    let save = activities.iter().filter(|a| a.is_consumption()).count();
    let total = waste + save;

    WasteSaveRatio {
        waste,
        save,
        pct_wasted: if total > 0 {
            percent_of(waste as f64, total as f64)
        } else {
            0
        },
    }
}

/// Most-wasted categories by record count; ties go to the category seen first
pub fn top_waste_categories(activities: &[Activity], limit: usize) -> Vec<String> {
    let mut tally: Vec<(String, usize)> = Vec::new();

    for activity in activities.iter().filter(|a| a.is_waste()) {
        let category = activity.category_or_unknown();
        match tally.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => tally.push((category.to_string(), 1)),
        }
    }

    // sort_by is stable, so first-seen order breaks ties
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.into_iter().take(limit).map(|(name, _)| name).collect()
}

pub fn leaderboard_nudge(activities: &[Activity]) -> String {
    let stats = waste_save_ratio(activities);
    let top = top_waste_categories(activities, TOP_WASTE_CATEGORIES);

    let tail = if top.is_empty() {
        " Keep reducing waste to boost your Food Score.".to_string()
    } else {
        format!(" Try cutting down on {} to climb the leaderboard.", top.join(", "))
    };

    format!(
        "Your current waste-to-save ratio is {} ({}% wasted).{}",
        stats.ratio(),
        stats.pct_wasted,
        tail
    )
}
