use strum::{Display, EnumIter};

use super::*;

pub use strum::IntoEnumIterator;

pub const MAX_SCORE: u32 = 1000;

pub const COMMIT_WEIGHT: u64 = 2;
pub const PULL_REQUEST_WEIGHT: u64 = 5;
pub const ISSUE_WEIGHT: u64 = 3;
// Discord messages count half a point each, rounded down.
pub const DISCORD_MESSAGE_DIVISOR: u64 = 2;

pub fn calculate_score(activity: &Activity) -> u32 {
    ScoreBreakdown::from(activity).total
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub commits: u64,
    pub pull_requests: u64,
    pub issues: u64,
    pub discord: u64,
    pub total: u32,
}

impl From<&Activity> for ScoreBreakdown {
    fn from(activity: &Activity) -> Self {
        let commits = activity.commits.saturating_mul(COMMIT_WEIGHT);
        let pull_requests = activity.pull_requests.saturating_mul(PULL_REQUEST_WEIGHT);
        let issues = activity.issues.saturating_mul(ISSUE_WEIGHT);
        let discord = activity.discord_messages / DISCORD_MESSAGE_DIVISOR;

        let raw = commits
            .saturating_add(pull_requests)
            .saturating_add(issues)
            .saturating_add(discord);
        let total = raw.min(MAX_SCORE as u64) as u32;

        Self {
            commits,
            pull_requests,
            issues,
            discord,
            total,
        }
    }
}

impl ScoreBreakdown {
    /// Whether the weighted sum went over [`MAX_SCORE`] and got clamped.
    pub fn is_capped(&self) -> bool {
        self.commits
            .saturating_add(self.pull_requests)
            .saturating_add(self.issues)
            .saturating_add(self.discord)
            > MAX_SCORE as u64
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Tier {
    #[strum(serialize = "Newcomer")]
    Newcomer,
    #[strum(serialize = "Junior Developer")]
    Junior,
    #[strum(serialize = "Mid Developer")]
    Mid,
    #[strum(serialize = "Senior Developer")]
    Senior,
    #[strum(serialize = "Elite Developer")]
    Elite,
}

impl Tier {
    pub const fn from_score(score: u32) -> Self {
        if score >= 800 {
            Self::Elite
        } else if score >= 600 {
            Self::Senior
        } else if score >= 400 {
            Self::Mid
        } else if score >= 200 {
            Self::Junior
        } else {
            Self::Newcomer
        }
    }

    pub const fn min_score(&self) -> u32 {
        match self {
            Self::Newcomer => 0,
            Self::Junior => 200,
            Self::Mid => 400,
            Self::Senior => 600,
            Self::Elite => 800,
        }
    }
}
