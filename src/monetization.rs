//! Simulated monetization: the ad banner, the rewarded ad and premium.
//!
//! Nothing here talks to an ad network or a store; the flows only flip the
//! flags in [`Settings`].

use crate::models::Settings;
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// How long the simulated rewarded video plays.
pub const REWARDED_AD_DURATION: Duration = Duration::from_secs(2);

const UNLOCK_HOURS: i64 = 24;

/// What the banner slot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdBanner {
    Hidden,
    Personalized,
    NonPersonalized,
}

impl AdBanner {
    pub fn for_settings(settings: &Settings) -> Self {
        if settings.is_premium {
            Self::Hidden
        } else if settings.personalized_ads {
            Self::Personalized
        } else {
            Self::NonPersonalized
        }
    }

    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Hidden => None,
            Self::Personalized => Some("Ad · Sponsored placeholder"),
            Self::NonPersonalized => Some("Ad · Sponsored placeholder (non-personalized)"),
        }
    }
}

/// Whether the rewarded-ad offer should be shown.
pub fn rewarded_ad_available(settings: &Settings) -> bool {
    !settings.is_premium
}

/// Expiry of an unlock granted at `now`.
pub fn unlock_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + chrono::Duration::hours(UNLOCK_HOURS)
}

/// Plays the simulated rewarded video and calls `on_reward` when it ends.
///
/// Dropping the returned ticker before then abandons the ad without a reward.
pub fn watch_rewarded_ad<F>(on_reward: F) -> Ticker
where
    F: FnOnce() + Send + 'static,
{
    Ticker::once(REWARDED_AD_DURATION, on_reward)
}
