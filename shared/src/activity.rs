use super::*;

use crate::types::ActivitySummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub pull_requests: u64,
    #[serde(default)]
    pub issues: u64,
    #[serde(default)]
    pub discord_messages: u64,
}

impl Activity {
    pub const fn new(commits: u64, pull_requests: u64, issues: u64, discord_messages: u64) -> Self {
        Self {
            commits,
            pull_requests,
            issues,
            discord_messages,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.commits == 0
            && self.pull_requests == 0
            && self.issues == 0
            && self.discord_messages == 0
    }

    pub fn score(&self) -> u32 {
        calculate_score(self)
    }
}

// The GitHub backend has no Discord data, so `discord_messages` stays zero here.
impl From<&ActivitySummary> for Activity {
    fn from(summary: &ActivitySummary) -> Self {
        Self {
            commits: summary.total_commits.unwrap_or_default(),
            pull_requests: summary.total_prs.unwrap_or_default(),
            issues: summary.total_issues.unwrap_or_default(),
            discord_messages: 0,
        }
    }
}

impl From<ActivitySummary> for Activity {
    fn from(summary: ActivitySummary) -> Self {
        Self::from(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_summary_fields_default_to_zero() {
        let summary: ActivitySummary =
            serde_json::from_str(r#"{ "total_commits": 12 }"#).unwrap();
        let activity = Activity::from(&summary);

        assert_eq!(activity, Activity::new(12, 0, 0, 0));
    }

    #[test]
    fn summary_extras_are_ignored() {
        let summary: ActivitySummary = serde_json::from_str(
            r#"{
                "total_commits": 120,
                "total_prs": 14,
                "total_issues": 3,
                "wallet_address": "QUBICABC",
                "languages": { "Rust": 90 },
                "time_range_days": 90
            }"#,
        )
        .unwrap();
        let activity = Activity::from(summary);

        assert_eq!(activity, Activity::new(120, 14, 3, 0));
        assert_eq!(activity.score(), 120 * 2 + 14 * 5 + 3 * 3);
    }

    #[test]
    fn discord_is_never_filled_from_github_summary() {
        let summary = ActivitySummary {
            total_commits: Some(1),
            total_prs: Some(1),
            total_issues: Some(1),
            ..Default::default()
        };

        assert_eq!(Activity::from(&summary).discord_messages, 0);
    }

    #[test]
    fn empty_activity() {
        assert!(Activity::default().is_empty());
        assert!(!Activity::new(0, 0, 0, 1).is_empty());
    }
}
