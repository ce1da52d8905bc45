use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Records entered without an underwriter carry this marker.
pub const UW_SENTINEL: &str = "-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: String,
    pub code: String,
    pub date: String,
    pub uw: String,
    pub float_pct: Option<f64>,
    pub d1: Option<f64>,
    pub d2: Option<f64>,
    pub d3: Option<f64>,
    pub d4: Option<f64>,
    pub d5: Option<f64>,
    pub d6: Option<f64>,
    pub d7: Option<f64>,
}

impl StockRecord {
    pub fn day(&self, offset: usize) -> Option<f64> {
        match offset {
            1 => self.d1,
            2 => self.d2,
            3 => self.d3,
            4 => self.d4,
            5 => self.d5,
            6 => self.d6,
            7 => self.d7,
            _ => None,
        }
    }

    pub fn has_underwriter(&self) -> bool {
        !self.uw.is_empty() && self.uw != UW_SENTINEL
    }

    fn day_is_win(&self, offset: usize) -> bool {
        // Missing/non-numeric day values are never a win (and never an error).
        matches!(self.day(offset), Some(v) if v > 0.0)
    }
}

/// Per-underwriter tallies. Only created on first occurrence, so `count >= 1`
/// whenever an entry exists and win rates never divide by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UwStats {
    pub count: u64,
    /// Strict `> 0` wins for day offsets 1..=3.
    pub wins: [u64; 3],
}

impl UwStats {
    /// Fractional win rate for day offset 1..=3.
    pub fn win_rate(&self, offset: usize) -> f64 {
        self.wins[offset - 1] as f64 / self.count as f64
    }
}

/// Ranking and badges average two day offsets; the streak headline averages
/// three. The window is a parameter so each call site names which one it
/// means instead of hard-coding either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinWindow {
    TwoDay,
    ThreeDay,
}

impl WinWindow {
    pub fn days(self) -> usize {
        match self {
            WinWindow::TwoDay => 2,
            WinWindow::ThreeDay => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedUw {
    pub underwriter: String,
    pub count: u64,
    /// Percent, 0..=100, averaged over the ranking window.
    pub avg_win_rate: f64,
    pub win_rate_1: f64,
    pub win_rate_2: f64,
    pub badge: Badge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Strong,
    Moderate,
    Weak,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Strong => "strong",
            Badge::Moderate => "moderate",
            Badge::Weak => "weak",
        }
    }
}

/// Three tiers keyed on the 0..=100 average win rate. Selects a visual style
/// only; carries no other semantics.
pub fn classify_badge(avg_win_rate_pct: f64) -> Badge {
    if avg_win_rate_pct >= 90.0 {
        Badge::Strong
    } else if avg_win_rate_pct >= 80.0 {
        Badge::Moderate
    } else {
        Badge::Weak
    }
}

/// Group the snapshot by underwriter, counting records and strict-positive
/// day-1..3 outcomes. Sentinel/empty underwriters never become keys.
pub fn underwriter_stats(records: &[StockRecord]) -> HashMap<String, UwStats> {
    let mut stats: HashMap<String, UwStats> = HashMap::new();
    for rec in records {
        if !rec.has_underwriter() {
            continue;
        }
        let entry = stats.entry(rec.uw.clone()).or_default();
        entry.count += 1;
        for offset in 1..=3 {
            if rec.day_is_win(offset) {
                entry.wins[offset - 1] += 1;
            }
        }
    }
    stats
}

/// Ranked list for the Top Underwriter displays. Ordering: average win rate
/// over `window` descending, then count descending, then name ascending.
/// The name key makes ties deterministic instead of leaning on incidental
/// map iteration order.
pub fn rank_underwriters(stats: &HashMap<String, UwStats>, window: WinWindow) -> Vec<RankedUw> {
    let mut ranked: Vec<RankedUw> = stats
        .iter()
        .map(|(uw, s)| {
            let avg = (1..=window.days()).map(|d| s.win_rate(d)).sum::<f64>()
                / window.days() as f64
                * 100.0;
            RankedUw {
                underwriter: uw.clone(),
                count: s.count,
                avg_win_rate: avg,
                win_rate_1: s.win_rate(1) * 100.0,
                win_rate_2: s.win_rate(2) * 100.0,
                badge: classify_badge(avg),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.avg_win_rate
            .partial_cmp(&a.avg_win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.underwriter.cmp(&b.underwriter))
    });
    ranked
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Breadth {
    pub total: u64,
    pub green: u64,
    pub red: u64,
}

/// Headline counters: total records, day-1 gainers, day-1 losers.
/// Flat or non-numeric day-1 records count toward neither side.
pub fn market_breadth(records: &[StockRecord]) -> Breadth {
    let mut b = Breadth::default();
    for rec in records {
        b.total += 1;
        match rec.d1 {
            Some(v) if v > 0.0 => b.green += 1,
            Some(v) if v < 0.0 => b.red += 1,
            _ => {}
        }
    }
    b
}

#[derive(Debug, Clone, Serialize)]
pub struct StreakLeader {
    pub underwriter: String,
    /// Percent, three-day window.
    pub avg_win_rate: f64,
}

/// The streak card: among records whose d1..d6 are all strictly positive,
/// pick the underwriter with the best three-day average win rate across the
/// whole snapshot. Strict-improvement scan: the first qualifying underwriter
/// keeps exact ties.
pub fn top_streak_underwriter(records: &[StockRecord]) -> Option<StreakLeader> {
    let candidates: Vec<&str> = records
        .iter()
        .filter(|r| r.has_underwriter() && (1..=6).all(|d| matches!(r.day(d), Some(v) if v > 0.0)))
        .map(|r| r.uw.as_str())
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let stats = underwriter_stats(records);
    let mut best: Option<StreakLeader> = None;
    for uw in candidates {
        let Some(s) = stats.get(uw) else { continue };
        let avg = (1..=3).map(|d| s.win_rate(d)).sum::<f64>() / 3.0 * 100.0;
        if best.as_ref().map_or(true, |b| avg > b.avg_win_rate) {
            best = Some(StreakLeader {
                underwriter: uw.to_string(),
                avg_win_rate: avg,
            });
        }
    }
    best
}

/// Detail-modal rows for one underwriter, newest listing first.
pub fn records_for_underwriter(records: &[StockRecord], name: &str) -> Vec<StockRecord> {
    let mut out: Vec<StockRecord> = records.iter().filter(|r| r.uw == name).cloned().collect();
    out.sort_by(|a, b| cmp_date_desc(&a.date, &b.date));
    out
}

/// Distinct non-sentinel underwriter names for the filter dropdown.
pub fn underwriter_filter_options(records: &[StockRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .filter(|r| r.has_underwriter())
        .map(|r| r.uw.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

fn cmp_date_desc(a: &str, b: &str) -> std::cmp::Ordering {
    let pa = NaiveDate::parse_from_str(a, "%Y-%m-%d").ok();
    let pb = NaiveDate::parse_from_str(b, "%Y-%m-%d").ok();
    match (pa, pb) {
        (Some(da), Some(db)) => db.cmp(&da),
        // Unparseable dates fall back to reverse lexicographic order.
        _ => b.cmp(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(uw: &str, days: [Option<f64>; 7]) -> StockRecord {
        StockRecord {
            id: uuid::Uuid::new_v4().to_string(),
            code: "TEST".to_string(),
            date: "2024-01-01".to_string(),
            uw: uw.to_string(),
            float_pct: None,
            d1: days[0],
            d2: days[1],
            d3: days[2],
            d4: days[3],
            d5: days[4],
            d6: days[5],
            d7: days[6],
        }
    }

    fn rec3(uw: &str, d1: f64, d2: f64, d3: f64) -> StockRecord {
        rec(uw, [Some(d1), Some(d2), Some(d3), None, None, None, None])
    }

    #[test]
    fn worked_example_from_two_underwriters() {
        let records = vec![
            rec3("A", 5.0, -1.0, 2.0),
            rec3("A", 3.0, 4.0, -2.0),
            rec3("B", -1.0, -1.0, -1.0),
        ];

        let stats = underwriter_stats(&records);
        let a = stats.get("A").unwrap();
        assert_eq!(a.count, 2);
        assert_eq!(a.wins, [2, 1, 1]);

        let ranked = rank_underwriters(&stats, WinWindow::TwoDay);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].underwriter, "A");
        assert!((ranked[0].avg_win_rate - 75.0).abs() < 1e-9);
        assert_eq!(ranked[0].badge, Badge::Weak);
        assert_eq!(ranked[1].underwriter, "B");
        assert_eq!(ranked[1].avg_win_rate, 0.0);
        assert_eq!(ranked[1].badge, Badge::Weak);
    }

    #[test]
    fn sentinel_and_empty_underwriters_never_become_keys() {
        let records = vec![
            rec3("-", 9.0, 9.0, 9.0),
            rec3("", 9.0, 9.0, 9.0),
            rec3("A", 1.0, 1.0, 1.0),
        ];
        let stats = underwriter_stats(&records);
        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("A"));
    }

    #[test]
    fn missing_day_counts_toward_count_but_not_wins() {
        let records = vec![rec("A", [None, Some(2.0), None, None, None, None, None])];
        let stats = underwriter_stats(&records);
        let a = stats.get("A").unwrap();
        assert_eq!(a.count, 1);
        assert_eq!(a.wins, [0, 1, 0]);
    }

    #[test]
    fn zero_is_not_a_win() {
        let stats = underwriter_stats(&[rec3("A", 0.0, -0.0, 0.1)]);
        assert_eq!(stats.get("A").unwrap().wins, [0, 0, 1]);
    }

    #[test]
    fn wins_never_exceed_count() {
        let records = vec![
            rec3("A", 1.0, 2.0, 3.0),
            rec3("A", 4.0, 5.0, 6.0),
            rec3("A", -1.0, 0.5, 0.0),
        ];
        let stats = underwriter_stats(&records);
        let a = stats.get("A").unwrap();
        for w in a.wins {
            assert!(w <= a.count);
        }
    }

    #[test]
    fn empty_input_yields_empty_outputs() {
        let stats = underwriter_stats(&[]);
        assert!(stats.is_empty());
        assert!(rank_underwriters(&stats, WinWindow::TwoDay).is_empty());
        assert_eq!(market_breadth(&[]), Breadth::default());
        assert!(top_streak_underwriter(&[]).is_none());
    }

    #[test]
    fn ranking_is_stable_under_input_permutation() {
        let a = rec3("A", 5.0, -1.0, 2.0);
        let b = rec3("B", 3.0, 4.0, -2.0);
        let c = rec3("C", -1.0, 2.0, 1.0);
        let forward = vec![a.clone(), b.clone(), c.clone()];
        let backward = vec![c, b, a];

        let r1 = rank_underwriters(&underwriter_stats(&forward), WinWindow::TwoDay);
        let r2 = rank_underwriters(&underwriter_stats(&backward), WinWindow::TwoDay);
        let names1: Vec<_> = r1.iter().map(|r| r.underwriter.clone()).collect();
        let names2: Vec<_> = r2.iter().map(|r| r.underwriter.clone()).collect();
        assert_eq!(names1, names2);
    }

    #[test]
    fn ties_break_on_count_then_name() {
        // X and Y have identical win rates; X has more records.
        let records = vec![
            rec3("Y", 1.0, 1.0, 0.0),
            rec3("X", 1.0, 1.0, 0.0),
            rec3("X", 1.0, 1.0, 0.0),
            // Z ties Y on both rate and count; name ascending puts Y first.
            rec3("Z", 1.0, 1.0, 0.0),
        ];
        let ranked = rank_underwriters(&underwriter_stats(&records), WinWindow::TwoDay);
        let names: Vec<_> = ranked.iter().map(|r| r.underwriter.as_str()).collect();
        assert_eq!(names, ["X", "Y", "Z"]);
    }

    #[test]
    fn window_parameter_changes_the_average() {
        // wr1=1.0, wr2=1.0, wr3=0.0.
        let stats = underwriter_stats(&[rec3("A", 1.0, 1.0, -1.0)]);
        let two = rank_underwriters(&stats, WinWindow::TwoDay);
        let three = rank_underwriters(&stats, WinWindow::ThreeDay);
        assert!((two[0].avg_win_rate - 100.0).abs() < 1e-9);
        assert!((three[0].avg_win_rate - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn badge_thresholds() {
        assert_eq!(classify_badge(95.0), Badge::Strong);
        assert_eq!(classify_badge(90.0), Badge::Strong);
        assert_eq!(classify_badge(85.0), Badge::Moderate);
        assert_eq!(classify_badge(80.0), Badge::Moderate);
        assert_eq!(classify_badge(79.9), Badge::Weak);
        assert_eq!(classify_badge(0.0), Badge::Weak);
    }

    #[test]
    fn breadth_ignores_flat_and_missing_day_one() {
        let records = vec![
            rec3("A", 2.0, 0.0, 0.0),
            rec3("B", -3.0, 0.0, 0.0),
            rec3("C", 0.0, 0.0, 0.0),
            rec("D", [None, None, None, None, None, None, None]),
        ];
        let b = market_breadth(&records);
        assert_eq!(b, Breadth { total: 4, green: 1, red: 1 });
    }

    #[test]
    fn streak_requires_six_positive_days() {
        let all_six = rec(
            "A",
            [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), None],
        );
        let five_only = rec(
            "B",
            [Some(9.0), Some(9.0), Some(9.0), Some(9.0), Some(9.0), Some(0.0), None],
        );
        let leader = top_streak_underwriter(&[all_six, five_only]).unwrap();
        assert_eq!(leader.underwriter, "A");
        assert!((leader.avg_win_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn streak_uses_three_day_window_over_full_snapshot() {
        // A's streak record qualifies it, but its average includes the
        // losing record too: wr1=1.0, wr2=0.5, wr3=0.5 -> 66.67%.
        let records = vec![
            rec(
                "A",
                [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), None],
            ),
            rec3("A", 1.0, -1.0, -1.0),
        ];
        let leader = top_streak_underwriter(&records).unwrap();
        assert_eq!(leader.underwriter, "A");
        assert!((leader.avg_win_rate - 100.0 * 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn streak_sentinel_records_never_qualify() {
        let records = vec![rec(
            "-",
            [Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
        )];
        assert!(top_streak_underwriter(&records).is_none());
    }

    #[test]
    fn detail_records_sort_newest_first() {
        let mut early = rec3("A", 1.0, 1.0, 1.0);
        early.date = "2024-01-05".to_string();
        early.code = "OLD".to_string();
        let mut late = rec3("A", 1.0, 1.0, 1.0);
        late.date = "2024-03-01".to_string();
        late.code = "NEW".to_string();
        let other = rec3("B", 1.0, 1.0, 1.0);

        let out = records_for_underwriter(&[early, other, late], "A");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].code, "NEW");
        assert_eq!(out[1].code, "OLD");
    }

    #[test]
    fn filter_options_sorted_distinct_without_sentinel() {
        let records = vec![
            rec3("B", 0.0, 0.0, 0.0),
            rec3("A", 0.0, 0.0, 0.0),
            rec3("B", 0.0, 0.0, 0.0),
            rec3("-", 0.0, 0.0, 0.0),
        ];
        assert_eq!(underwriter_filter_options(&records), ["A", "B"]);
    }
}
