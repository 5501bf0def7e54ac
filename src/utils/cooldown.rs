//! Earning limits and cooldowns, kept in one table so every endpoint agrees.

use crate::entities::profile_entity;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    Free,
    Vip,
    VipPlus,
}

impl MembershipTier {
    /// vip_until 已过期视为普通用户（后台任务清理前的窗口期）
    pub fn of(profile: &profile_entity::Model, now: DateTime<Utc>) -> Self {
        if let Some(until) = profile.vip_until
            && until < now
        {
            return MembershipTier::Free;
        }
        if profile.is_vip_plus {
            MembershipTier::VipPlus
        } else if profile.is_vip {
            MembershipTier::Vip
        } else {
            MembershipTier::Free
        }
    }

    pub fn is_vip(self) -> bool {
        self != MembershipTier::Free
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownAction {
    Scratch,
    Wheel,
    VipSlot,
}

pub struct CooldownRule {
    pub action: CooldownAction,
    pub base_secs: i64,
    /// VIP+ 冷却时间百分比
    pub vip_plus_percent: i64,
}

const DAY: i64 = 24 * 3600;

pub const COOLDOWNS: &[CooldownRule] = &[
    CooldownRule {
        action: CooldownAction::Scratch,
        base_secs: 3 * DAY,
        vip_plus_percent: 50,
    },
    CooldownRule {
        action: CooldownAction::Wheel,
        base_secs: 7 * DAY,
        vip_plus_percent: 50,
    },
    CooldownRule {
        action: CooldownAction::VipSlot,
        base_secs: DAY,
        vip_plus_percent: 100,
    },
];

pub fn cooldown_for(action: CooldownAction, tier: MembershipTier) -> Duration {
    let rule = COOLDOWNS
        .iter()
        .find(|r| r.action == action)
        .unwrap_or(&COOLDOWNS[0]);
    let secs = match tier {
        MembershipTier::VipPlus => rule.base_secs * rule.vip_plus_percent / 100,
        _ => rule.base_secs,
    };
    Duration::seconds(secs)
}

pub fn next_available_at(
    action: CooldownAction,
    tier: MembershipTier,
    last: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    last.map(|t| t + cooldown_for(action, tier))
}

/// 冷却中返回 RateLimited("cooldown")
pub fn ensure_ready(
    action: CooldownAction,
    tier: MembershipTier,
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    match next_available_at(action, tier, last) {
        Some(at) if at > now => Err(AppError::RateLimited("cooldown")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Rolling { secs: i64 },
    /// UTC 自然日
    CalendarDay,
}

impl RateWindow {
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RateWindow::Rolling { secs } => now - Duration::seconds(*secs),
            RateWindow::CalendarDay => start_of_day(now),
        }
    }
}

pub struct RateLimitRule {
    pub window: RateWindow,
    pub max: u64,
    pub code: &'static str,
}

impl RateLimitRule {
    pub fn check(&self, used: u64) -> AppResult<()> {
        if used >= self.max {
            return Err(AppError::RateLimited(self.code));
        }
        Ok(())
    }
}

pub const AD_VIEW_LIMITS: [RateLimitRule; 2] = [
    RateLimitRule {
        window: RateWindow::Rolling { secs: 3600 },
        max: 5,
        code: "hour_limit",
    },
    RateLimitRule {
        window: RateWindow::CalendarDay,
        max: 25,
        code: "day_limit",
    },
];

pub const POOL_WATCH_LIMIT: RateLimitRule = RateLimitRule {
    window: RateWindow::CalendarDay,
    max: 25,
    code: "day_limit",
};

/// 两次奖池投入的最小间隔
pub const POOL_CONTRIBUTION_SPACING: RateLimitRule = RateLimitRule {
    window: RateWindow::Rolling { secs: 1 },
    max: 1,
    code: "rate_limited",
};

pub const AD_VIEW_POINTS: i64 = 1;
pub const AD_VIEW_FIRST_OF_DAY_POINTS: i64 = 2;
pub const VIP_DAILY_CLAIM_POINTS: i64 = 10;

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_vip_plus_halves_game_cooldowns() {
        assert_eq!(
            cooldown_for(CooldownAction::Scratch, MembershipTier::Free),
            Duration::days(3)
        );
        assert_eq!(
            cooldown_for(CooldownAction::Scratch, MembershipTier::VipPlus),
            Duration::hours(36)
        );
        assert_eq!(
            cooldown_for(CooldownAction::Wheel, MembershipTier::VipPlus),
            Duration::hours(84)
        );
        assert_eq!(
            cooldown_for(CooldownAction::VipSlot, MembershipTier::VipPlus),
            Duration::days(1)
        );
    }

    #[test]
    fn test_ensure_ready() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert!(ensure_ready(CooldownAction::Scratch, MembershipTier::Free, None, now).is_ok());

        let last = now - Duration::days(2);
        let err = ensure_ready(CooldownAction::Scratch, MembershipTier::Free, Some(last), now)
            .unwrap_err();
        assert_eq!(err.wire_code(), "cooldown");

        // VIP+ 只需 36 小时
        assert!(
            ensure_ready(CooldownAction::Scratch, MembershipTier::VipPlus, Some(last), now).is_ok()
        );
    }

    #[test]
    fn test_rate_windows() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 30, 0).unwrap();
        assert_eq!(
            AD_VIEW_LIMITS[0].window.start(now),
            Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap()
        );
        assert_eq!(
            AD_VIEW_LIMITS[1].window.start(now),
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()
        );
        assert!(AD_VIEW_LIMITS[0].check(4).is_ok());
        assert_eq!(AD_VIEW_LIMITS[0].check(5).unwrap_err().wire_code(), "hour_limit");
        assert_eq!(AD_VIEW_LIMITS[1].check(25).unwrap_err().wire_code(), "day_limit");
    }

    #[test]
    fn test_same_utc_day() {
        let a = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        assert!(same_utc_day(a, b));
        assert!(!same_utc_day(b, c));
    }
}
