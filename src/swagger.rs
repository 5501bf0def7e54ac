use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{LedgerEntryKind, PrizeStatus, RewardStatus};
use crate::handlers;
use crate::middlewares::SESSION_COOKIE;
use crate::models::*;
use crate::utils::cooldown::MembershipTier;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        // 浏览器端使用会话 cookie
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::get_transactions,
        handlers::user::get_my_tickets,
        handlers::user::get_my_rewards,
        handlers::user::claim_daily,
        handlers::user::update_points,
        handlers::user::reward_ad_view,
        handlers::prize::list_prizes,
        handlers::prize::participate,
        handlers::prize::list_winners,
        handlers::reward_pool::list_pools,
        handlers::reward_pool::watch,
        handlers::reward_pool::participate,
        handlers::reward_pool::purchase,
        handlers::referral::apply_referral,
        handlers::game::scratch,
        handlers::game::wheel,
        handlers::game::wheel_rescue,
        handlers::game::vip_slot,
        handlers::game::submit_tap_tap_score,
        handlers::game::tap_tap_leaderboard,
        handlers::game::tap_tap_previous_winner,
        handlers::subscription::create_checkout,
        handlers::subscription::create_portal,
        handlers::season::check_season,
        handlers::admin::list_users,
        handlers::admin::update_user,
        handlers::admin::pending_rewards,
        handlers::admin::mark_reward_sent,
        handlers::admin::send_test_email,
        handlers::admin::list_pools,
        handlers::admin::create_pool,
        handlers::admin::delete_pool,
        handlers::admin::delete_pool_by_body,
        handlers::admin::list_prizes,
        handlers::admin::create_prize,
        handlers::admin::delete_prize,
        handlers::admin::mark_prize_shipped,
        handlers::admin::draw_winner,
        handlers::admin::pick_winner,
        handlers::admin::ticket_statistics,
        handlers::admin::vip_plus_count,
        handlers::admin::get_grades,
        handlers::admin::update_grades,
        handlers::admin::reset_season,
    ),
    components(
        schemas(
            ApiErrorResponse,
            ApiError,
            OkResponse,
            PaginationParams,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            AuthResponse,
            ProfileResponse,
            UpdateProfileRequest,
            LedgerEntryResponse,
            LedgerEntryKind,
            BalanceResponse,
            MembershipTier,
            PrizeResponse,
            PrizeStatus,
            TicketResponse,
            ParticipateResponse,
            CreatePrizeRequest,
            DrawResultResponse,
            WinnerResponse,
            AdminPrizeResponse,
            RewardPoolResponse,
            PoolIdRequest,
            PoolParticipateRequest,
            PoolWatchResponse,
            PoolParticipateResponse,
            PoolPurchaseResponse,
            CreatePoolRequest,
            RewardResponse,
            RewardStatus,
            PendingRewardResponse,
            MarkSentRequest,
            TestEmailRequest,
            ApplyReferralRequest,
            ApplyReferralResponse,
            AdViewResponse,
            ScratchResponse,
            WheelRequest,
            WheelResponse,
            WheelRescueResponse,
            SlotResponse,
            UpdatePointsRequest,
            UpdatePointsResponse,
            ClaimDailyResponse,
            SubmitScoreRequest,
            LeaderboardEntry,
            WeeklyWinnerResponse,
            SubscriptionPlan,
            CheckoutRequest,
            CheckoutResponse,
            SeasonResponse,
            SeasonCheckResponse,
            AdminUserResponse,
            AdminUpdateUserRequest,
            AdminUserPatch,
            PrizeTicketCount,
            TicketStatistics,
            VipPlusCountResponse,
            GradeSettings,
            PrizeIdRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "Profile, ledger and daily bonus API"),
        (name = "earning", description = "Ad view rewards API"),
        (name = "games", description = "Scratch card, wheel, slot and Tap-Tap API"),
        (name = "prizes", description = "Prize draw API"),
        (name = "rewards-pools", description = "Community reward pools API"),
        (name = "referral", description = "Referral API"),
        (name = "subscription", description = "VIP subscription API"),
        (name = "seasons", description = "Season API"),
        (name = "admin", description = "Back-office API"),
    ),
    info(
        title = "BK'reward Backend API",
        version = "1.0.0",
        description = "BK'reward rewards and points REST API documentation"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_admin_and_public_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/prizes"));
        assert!(doc.paths.paths.contains_key("/admin/prizes/{id}/draw"));
        assert!(doc.paths.paths.contains_key("/games/tap-tap/leaderboard"));
    }
}
