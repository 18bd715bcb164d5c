use super::model::GatedAction;
use chrono::{DateTime, Duration, Utc};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Prices, caps and reward sizes of the token economy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyPolicy {
    pub quiz_cost: i32,
    pub flashcard_cost: i32,
    pub free_use_cap: i32,
    pub daily_reward: i32,
    pub rating_reward: i32,
    pub ad_reward: i32,
    pub referrer_reward: i32,
    pub referred_reward: i32,
    pub daily_cooldown_hours: i64,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            quiz_cost: 3,
            flashcard_cost: 2,
            free_use_cap: 2,
            daily_reward: 5,
            rating_reward: 5,
            ad_reward: 1,
            referrer_reward: 10,
            referred_reward: 5,
            daily_cooldown_hours: 24,
        }
    }
}

impl EconomyPolicy {
    pub fn cost(&self, action: GatedAction) -> i32 {
        match action {
            GatedAction::Quiz => self.quiz_cost,
            GatedAction::Flashcard => self.flashcard_cost,
        }
    }

    pub fn daily_cooldown(&self) -> Duration {
        Duration::hours(self.daily_cooldown_hours)
    }

    /// Whole hours (rounded up) until the daily reward can be claimed again,
    /// or `None` when it is claimable now.
    pub fn daily_hours_remaining(
        &self,
        last_claimed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<i64> {
        let last = last_claimed_at?;
        let elapsed = now.signed_duration_since(last);
        let cooldown = self.daily_cooldown();
        if elapsed >= cooldown {
            return None;
        }

        let remaining_ms = (cooldown - elapsed).num_milliseconds();
        let hours = (remaining_ms + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
        // A timestamp in the future (clock skew) never reports more than one full window
        Some(hours.clamp(1, self.daily_cooldown_hours))
    }
}
