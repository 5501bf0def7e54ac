//! Background scheduled tasks.
//!
//! VIP expiry, the season rollover and the weekly Tap-Tap settlement all run
//! hourly. Each job is idempotent, so a restart or a second instance is harmless.
//! Call `spawn_all` once during startup.

use crate::services::{SeasonService, TapTapService, VipService};
use crate::error::AppError;
use chrono::Utc;
use std::time::Duration;

const HOURLY: Duration = Duration::from_secs(3600);

/// Spawn all background tasks. Detaches via `tokio::spawn`; does not block.
pub fn spawn_all(vip_service: VipService, season_service: SeasonService, tap_tap_service: TapTapService) {
    // 会员过期检查
    {
        let svc = vip_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.expire_memberships(Utc::now()).await {
                    Ok(n) if n > 0 => log::info!("Expired memberships processed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire memberships: {e:?}"),
                }
                tokio::time::sleep(HOURLY).await;
            }
        });
    }

    // 赛季检查
    {
        let svc = season_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.check_season(Utc::now()).await {
                    Ok(check) if check.reset => {
                        log::info!("Season rolled over to {}", check.season.name)
                    }
                    Ok(_) => {}
                    // 尚未创建任何赛季
                    Err(AppError::Missing(_)) => log::debug!("No active season to check"),
                    Err(e) => log::error!("Failed to check season: {e:?}"),
                }
                tokio::time::sleep(HOURLY).await;
            }
        });
    }

    // Tap-Tap 每周结算
    {
        let svc = tap_tap_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.settle_previous_week(Utc::now()).await {
                    Ok(Some(w)) => log::info!(
                        "Tap-Tap weekly winner recorded: {} ({}-W{})",
                        w.display_name,
                        w.week_year,
                        w.week_number
                    ),
                    Ok(None) => {}
                    Err(e) => log::error!("Failed to settle Tap-Tap week: {e:?}"),
                }
                tokio::time::sleep(HOURLY).await;
            }
        });
    }
}
