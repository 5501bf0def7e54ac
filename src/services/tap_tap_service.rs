use crate::database::is_unique_violation;
use crate::entities::{
    LedgerEntryKind, RewardStatus, leaderboard_history_entity as history,
    profile_entity as profiles, reward_entity as rewards, tap_tap_score_entity as scores,
};
use crate::error::{AppError, AppResult};
use crate::external::AdminNotifier;
use crate::models::{LeaderboardEntry, WeeklyWinnerResponse};
use crate::services::LedgerService;
use crate::utils::cooldown::MembershipTier;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const MAX_SCORE: i64 = 1000;
const LEADERBOARD_SIZE: usize = 10;
/// VIP+ 人数达到该值时奖品升级为礼品卡
const GIFT_CARD_MIN_VIP_PLUS: u64 = 5;
const FALLBACK_POINTS: i64 = 500;

/// ISO 周一 00:00 UTC
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days = i64::from(now.weekday().num_days_from_monday());
    (now.date_naive() - Duration::days(days))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

#[derive(Clone)]
pub struct TapTapService {
    pool: DatabaseConnection,
    notifier: AdminNotifier,
}

impl TapTapService {
    pub fn new(pool: DatabaseConnection, notifier: AdminNotifier) -> Self {
        Self { pool, notifier }
    }

    /// 仅 VIP+ 可提交
    pub async fn submit_score(&self, user_id: Uuid, score: i64) -> AppResult<LeaderboardEntry> {
        if !(0..=MAX_SCORE).contains(&score) {
            return Err(AppError::ValidationError(format!(
                "score must be between 0 and {MAX_SCORE}"
            )));
        }

        let profile = profiles::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        if MembershipTier::of(&profile, Utc::now()) != MembershipTier::VipPlus {
            return Err(AppError::NotVip);
        }

        let row = scores::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            score: Set(score),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        Ok(LeaderboardEntry {
            user_id,
            display_name: profile.display_name(),
            score: row.score,
            created_at: row.created_at,
        })
    }

    /// 本周排行（每人取最好成绩）
    pub async fn leaderboard(&self, now: DateTime<Utc>) -> AppResult<Vec<LeaderboardEntry>> {
        let start = week_start(now);
        self.best_scores(start, start + Duration::days(7), LEADERBOARD_SIZE)
            .await
    }

    pub async fn previous_week_winner(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WeeklyWinnerResponse>> {
        let prev = (week_start(now) - Duration::days(7)).iso_week();
        let row = history::Entity::find()
            .filter(history::Column::WeekYear.eq(prev.year()))
            .filter(history::Column::WeekNumber.eq(prev.week() as i32))
            .one(&self.pool)
            .await?;
        Ok(row.map(to_winner))
    }

    /// 结算上一周冠军，同一周只结算一次
    pub async fn settle_previous_week(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Option<WeeklyWinnerResponse>> {
        let end = week_start(now);
        let start = end - Duration::days(7);
        let week = start.iso_week();
        let (week_year, week_number) = (week.year(), week.week() as i32);

        let settled = history::Entity::find()
            .filter(history::Column::WeekYear.eq(week_year))
            .filter(history::Column::WeekNumber.eq(week_number))
            .count(&self.pool)
            .await?;
        if settled > 0 {
            return Ok(None);
        }

        let Some(best) = self.best_scores(start, end, 1).await?.into_iter().next() else {
            return Ok(None);
        };

        let vip_plus_count = profiles::Entity::find()
            .filter(profiles::Column::IsVipPlus.eq(true))
            .count(&self.pool)
            .await?;

        let now_ts = Utc::now();
        let txn = self.pool.begin().await?;
        let (prize_type, prize_label, status) = if vip_plus_count >= GIFT_CARD_MIN_VIP_PLUS {
            rewards::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(best.user_id),
                reward_type: Set("gift_card_10".to_string()),
                label: Set(Some("Carte cadeau 10€ (Tap-Tap)".to_string())),
                status: Set(RewardStatus::Pending),
                created_at: Set(now_ts),
                sent_at: Set(None),
            }
            .insert(&txn)
            .await?;
            ("gift_card", "Carte 10€", "a_envoyer")
        } else {
            LedgerService::credit(
                &txn,
                best.user_id,
                FALLBACK_POINTS,
                LedgerEntryKind::TapTapPrize,
                Some(format!("Tap-Tap semaine {week_number}")),
            )
            .await?;
            rewards::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(best.user_id),
                reward_type: Set("points_500".to_string()),
                label: Set(Some("500 points (Tap-Tap)".to_string())),
                status: Set(RewardStatus::Sent),
                created_at: Set(now_ts),
                sent_at: Set(Some(now_ts)),
            }
            .insert(&txn)
            .await?;
            ("points", "500 points", "attribue")
        };

        let res = history::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(best.user_id),
            display_name: Set(best.display_name.clone()),
            score: Set(best.score),
            week_year: Set(week_year),
            week_number: Set(week_number),
            prize_type: Set(prize_type.to_string()),
            prize_label: Set(prize_label.to_string()),
            status: Set(status.to_string()),
            created_at: Set(now_ts),
        }
        .insert(&txn)
        .await;
        let row = match res {
            Ok(row) => row,
            // 另一实例已结算
            Err(err) if is_unique_violation(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        txn.commit().await?;

        log::info!(
            "Tap-Tap week {week_year}-W{week_number} settled: user={} score={} prize={prize_type}",
            best.user_id,
            best.score
        );
        let subject = format!("Tap-Tap : gagnant semaine {week_number}");
        let html = format!(
            "<p>Gagnant : {} ({} points)</p><p>Lot : {prize_label}</p>",
            best.display_name, best.score
        );
        self.notifier.notify_admin(&subject, &html).await;

        Ok(Some(to_winner(row)))
    }

    /// 时间段内每人最好成绩，同分按先达成者排前
    async fn best_scores(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let rows = scores::Entity::find()
            .filter(scores::Column::CreatedAt.gte(start))
            .filter(scores::Column::CreatedAt.lt(end))
            .order_by_desc(scores::Column::Score)
            .order_by_asc(scores::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut seen = HashSet::new();
        let top: Vec<scores::Model> = rows
            .into_iter()
            .filter(|r| seen.insert(r.user_id))
            .take(limit)
            .collect();

        let ids: Vec<Uuid> = top.iter().map(|r| r.user_id).collect();
        let names: HashMap<Uuid, String> = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p.display_name()))
            .collect();

        Ok(top
            .into_iter()
            .map(|r| LeaderboardEntry {
                display_name: names.get(&r.user_id).cloned().unwrap_or_default(),
                user_id: r.user_id,
                score: r.score,
                created_at: r.created_at,
            })
            .collect())
    }
}

fn to_winner(m: history::Model) -> WeeklyWinnerResponse {
    WeeklyWinnerResponse {
        user_id: m.user_id,
        display_name: m.display_name,
        score: m.score,
        week_year: m.week_year,
        week_number: m.week_number,
        prize_type: m.prize_type,
        prize_label: m.prize_label,
        status: m.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_week_start_is_monday_midnight() {
        // 2025-03-13 是周四
        let now = Utc.with_ymd_and_hms(2025, 3, 13, 15, 30, 0).unwrap();
        assert_eq!(week_start(now), Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());

        let monday = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(week_start(monday), monday);
    }
}
