//! Historical check-in pattern analyzer.

use haven_core::is_within_window_ms;

use crate::risk_contract::{CheckinSnapshot, RiskSignal, RiskSignalSource};

/// Historical contribution never exceeds this regardless of how many
/// sub-conditions fire.
pub const HISTORY_CONTRIBUTION_CAP: f64 = 3.0;
/// Pattern analysis looks at this many most-recent check-ins.
pub const HISTORY_PATTERN_WINDOW: usize = 5;
/// Minimum history required before the analyzer contributes anything.
pub const HISTORY_MIN_ENTRIES: usize = 3;
/// Stored crisis scores above this mark a recent crisis event.
pub const HISTORY_CRISIS_SCORE_FLOOR: f64 = 5.0;

const SEVEN_DAYS_MS: u64 = 7 * 24 * 60 * 60 * 1_000;
const LOW_MOOD_CEILING: u8 = 2;
const LOW_AVERAGE_MOOD: f64 = 2.5;

/// Analyzes prior check-ins for sustained-low-mood and recent-crisis
/// patterns. Fewer than [`HISTORY_MIN_ENTRIES`] entries contribute zero, and
/// the total is hard-capped at [`HISTORY_CONTRIBUTION_CAP`].
pub fn extract_history_signal(history: &[CheckinSnapshot], now_unix_ms: u64) -> RiskSignal {
    if history.len() < HISTORY_MIN_ENTRIES {
        return RiskSignal::empty(RiskSignalSource::History);
    }

    let mut ordered = history.to_vec();
    ordered.sort_by_key(|checkin| checkin.timestamp_unix_ms);
    let recent_start = ordered.len().saturating_sub(HISTORY_PATTERN_WINDOW);
    let recent = &ordered[recent_start..];

    let mut contribution: f64 = 0.0;
    let mut evidence = Vec::new();

    let average_mood =
        recent.iter().map(|checkin| f64::from(checkin.mood)).sum::<f64>() / recent.len() as f64;
    if average_mood < LOW_AVERAGE_MOOD {
        contribution += 2.0;
        evidence.push(format!(
            "average mood {average_mood:.1} over last {} check-ins",
            recent.len()
        ));
    }

    let consecutive_low = recent
        .iter()
        .rev()
        .take_while(|checkin| checkin.mood <= LOW_MOOD_CEILING)
        .count();
    if consecutive_low >= 3 {
        contribution += 2.0;
        evidence.push(format!("{consecutive_low} consecutive low-mood check-ins"));
    }
    if consecutive_low >= 5 {
        contribution += 1.0;
    }

    let recent_crisis_events = ordered
        .iter()
        .filter(|checkin| {
            is_within_window_ms(checkin.timestamp_unix_ms, now_unix_ms, SEVEN_DAYS_MS)
                && checkin
                    .crisis_score
                    .is_some_and(|score| score > HISTORY_CRISIS_SCORE_FLOOR)
        })
        .count();
    if recent_crisis_events > 0 {
        contribution += 2.0;
        evidence.push(format!(
            "{recent_crisis_events} crisis-scored check-ins in the last 7 days"
        ));
    }
    if recent_crisis_events > 2 {
        contribution += 1.0;
    }

    RiskSignal {
        source: RiskSignalSource::History,
        contribution: contribution.min(HISTORY_CONTRIBUTION_CAP),
        evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_history_signal, HISTORY_CONTRIBUTION_CAP};
    use crate::risk_contract::CheckinSnapshot;

    const DAY_MS: u64 = 24 * 60 * 60 * 1_000;
    const NOW_MS: u64 = 30 * DAY_MS;

    fn checkin(days_ago: u64, mood: u8, crisis_score: Option<f64>) -> CheckinSnapshot {
        CheckinSnapshot {
            mood,
            timestamp_unix_ms: NOW_MS - days_ago * DAY_MS,
            crisis_score,
        }
    }

    #[test]
    fn unit_too_little_history_contributes_zero() {
        let history = vec![checkin(2, 1, None), checkin(1, 1, None)];
        let signal = extract_history_signal(&history, NOW_MS);
        assert_eq!(signal.contribution, 0.0);
        assert!(signal.evidence.is_empty());
    }

    #[test]
    fn functional_low_average_mood_contributes_two() {
        let history = vec![checkin(3, 2, None), checkin(2, 2, None), checkin(1, 3, None)];
        let signal = extract_history_signal(&history, NOW_MS);
        assert_eq!(signal.contribution, 2.0);
    }

    #[test]
    fn regression_contribution_never_exceeds_cap() {
        // Every sub-condition fires: five consecutive mood-1 check-ins, all
        // inside the 7-day window, three with stored crisis scores above 5.
        let history = vec![
            checkin(5, 1, Some(8.0)),
            checkin(4, 1, Some(7.0)),
            checkin(3, 1, Some(9.0)),
            checkin(2, 1, None),
            checkin(1, 1, None),
        ];
        let signal = extract_history_signal(&history, NOW_MS);
        assert_eq!(signal.contribution, HISTORY_CONTRIBUTION_CAP);
    }

    #[test]
    fn unit_old_crisis_scores_outside_window_are_ignored() {
        let history = vec![
            checkin(20, 4, Some(9.0)),
            checkin(15, 4, Some(8.0)),
            checkin(2, 4, None),
            checkin(1, 4, None),
        ];
        let signal = extract_history_signal(&history, NOW_MS);
        assert_eq!(signal.contribution, 0.0);
    }

    #[test]
    fn unit_consecutive_low_run_counts_from_most_recent() {
        // The break at the most recent check-in resets the run even though
        // three older ones were low.
        let history = vec![
            checkin(4, 1, None),
            checkin(3, 1, None),
            checkin(2, 1, None),
            checkin(1, 4, None),
        ];
        let signal = extract_history_signal(&history, NOW_MS);
        // Average over the window is (1+1+1+4)/4 = 1.75 < 2.5 so only the
        // average branch fires.
        assert_eq!(signal.contribution, 2.0);
    }
}
