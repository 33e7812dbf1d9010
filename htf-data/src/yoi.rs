//! Year-of-inflection (YOI) detection.
//!
//! The YOI marks the onset of rapid growth in flooding days. For each year
//! `y` with a full 21-year window, the series is sampled at `y - 10`, `y`
//! and `y + 10`:
//!
//! * `delta(y) = (x[y+10] - x[y]) - (x[y] - x[y-10])`, the acceleration
//! * `multiplier(y) = x[y+10] / x[y]`, the growth over the next decade
//!
//! Candidates are limited to years whose middle value lies in `(1, 50]`.
//! Both quantities are ranked (ties share their average rank) and the year
//! with the highest mean rank wins, earliest year first on ties.

use htf_core::unit::round_to;
use serde::Serialize;
use std::collections::BTreeMap;

/// Half width of the centered window, in years.
pub const HALF_WINDOW: i32 = 10;

/// Candidate years need a middle value strictly above this...
pub const MIN_MIDDLE_COUNT: f64 = 1.0;

/// ...and at most this.
pub const MAX_MIDDLE_COUNT: f64 = 50.0;

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct YoiResult {
    /// `[yoi - 10, yoi, yoi + 10]`
    pub years: [i32; 3],
    /// Series values at `years`.
    pub counts: [f64; 3],
    /// `x[yoi + 10] - x[yoi]`
    pub ten_year_increase: f64,
    /// `x[yoi + 10] / x[yoi]`, 2 decimals.
    pub ten_year_multiplier: f64,
}

impl YoiResult {
    pub fn year(&self) -> i32 {
        self.years[1]
    }
}

struct Candidate {
    year: i32,
    delta: f64,
    multiplier: f64,
}

/// Find the year of inflection in an annual `(year, value)` series.
///
/// `search_range` restricts the series to `[lo - 10, hi + 10]` first.
/// Returns `None` when no year qualifies (flat, saturated or too short a
/// series); that is an expected outcome, not a failure.
pub fn detect_yoi(series: &[(i32, f64)], search_range: Option<(i32, i32)>) -> Option<YoiResult> {
    let values: BTreeMap<i32, f64> = series
        .iter()
        .copied()
        .filter(|(year, value)| {
            value.is_finite()
                && search_range.map_or(true, |(lo, hi)| {
                    *year >= lo - HALF_WINDOW && *year <= hi + HALF_WINDOW
                })
        })
        .collect();

    let candidates: Vec<Candidate> = values
        .iter()
        .filter_map(|(year, x)| candidate(&values, *year, *x))
        .collect();
    if candidates.is_empty() {
        log::info!("[HTF] yoi: no candidate years in {} values", values.len());
        return None;
    }

    let delta_ranks = average_ranks(&candidates.iter().map(|c| c.delta).collect::<Vec<_>>());
    let multiplier_ranks =
        average_ranks(&candidates.iter().map(|c| c.multiplier).collect::<Vec<_>>());

    let mut best: Option<(usize, f64)> = None;
    for (i, (d, m)) in delta_ranks.iter().zip(multiplier_ranks.iter()).enumerate() {
        let rank = (d + m) / 2.0;
        if best.map_or(true, |(_, best_rank)| rank > best_rank) {
            best = Some((i, rank));
        }
    }
    let (best_index, _) = best?;
    let yoi = candidates[best_index].year;

    let before = *values.get(&(yoi - HALF_WINDOW))?;
    let middle = *values.get(&yoi)?;
    let after = *values.get(&(yoi + HALF_WINDOW))?;
    log::debug!("[HTF] yoi: {yoi} from {} candidates", candidates.len());

    Some(YoiResult {
        years: [yoi - HALF_WINDOW, yoi, yoi + HALF_WINDOW],
        counts: [before, middle, after],
        ten_year_increase: after - middle,
        ten_year_multiplier: round_to(after / middle, 2),
    })
}

fn candidate(values: &BTreeMap<i32, f64>, year: i32, middle: f64) -> Option<Candidate> {
    if !(middle > MIN_MIDDLE_COUNT && middle <= MAX_MIDDLE_COUNT) {
        return None;
    }
    let full_window = (year - HALF_WINDOW..=year + HALF_WINDOW).all(|y| values.contains_key(&y));
    if !full_window {
        return None;
    }
    let before = values.get(&(year - HALF_WINDOW))?;
    let after = values.get(&(year + HALF_WINDOW))?;
    let delta = (after - middle) - (middle - before);
    let multiplier = after / middle;
    (delta.is_finite() && multiplier.is_finite()).then_some(Candidate {
        year,
        delta,
        multiplier,
    })
}

/// Ascending 1-based ranks; tied values share the mean of their positions.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let shared = (start + end) as f64 / 2.0 + 1.0;
        for i in &order[start..=end] {
            ranks[*i] = shared;
        }
        start = end + 1;
    }
    ranks
}

/// Compare a recomputed inflection against the triple shipped with the
/// payload. A disagreement is logged; the caller keeps the recomputed value.
pub fn agrees_with_precomputed(recomputed: Option<&YoiResult>, precomputed: Option<[i32; 3]>) -> bool {
    let agrees = recomputed.map(|r| r.years) == precomputed;
    if !agrees {
        log::warn!(
            "[HTF] yoi: recomputed {:?} differs from precomputed {:?}",
            recomputed.map(|r| r.years),
            precomputed
        );
    }
    agrees
}
