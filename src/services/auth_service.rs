use crate::entities::profile_entity as profiles;
use crate::error::{AppError, AppResult};
use crate::external::AdminNotifier;
use crate::models::*;
use crate::services::ReferralService;
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr, TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    /// 注册即成为管理员的邮箱
    bootstrap_emails: Vec<String>,
    notifier: AdminNotifier,
    site_url: String,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        bootstrap_emails: Vec<String>,
        notifier: AdminNotifier,
        site_url: String,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            bootstrap_emails,
            notifier,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let referral_code = generate_unique_referral_code(&txn).await?;
        let id = Uuid::new_v4();
        profiles::ActiveModel {
            id: Set(id),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            first_name: Set(clean_optional(request.first_name)),
            last_name: Set(clean_optional(request.last_name)),
            points: Set(0),
            is_admin: Set(self.bootstrap_emails.contains(&email)),
            is_vip: Set(false),
            is_vip_plus: Set(false),
            vip_until: Set(None),
            vip_plan: Set(None),
            stripe_customer_id: Set(None),
            stripe_subscription_id: Set(None),
            last_claim_date: Set(None),
            last_scratch_at: Set(None),
            last_wheel_at: Set(None),
            last_vip_slot_at: Set(None),
            pending_rescue_bet: Set(None),
            referral_code: Set(referral_code),
            referred_by: Set(None),
            address: Set(None),
            postal_code: Set(None),
            city: Set(None),
            password_reset_nonce: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            // 邮箱唯一性以唯一索引为准，并发注册也只有一个成功
            if is_email_conflict(&err) {
                AppError::Conflict("email_taken")
            } else {
                err.into()
            }
        })?;

        // 注册时填写的推荐码与 /referral/apply 规则一致
        if let Some(code) = request.referral_code.as_deref()
            && !code.trim().is_empty()
        {
            ReferralService::apply_in(&txn, id, code).await?;
        }
        txn.commit().await?;

        log::info!("New profile registered: {id}");
        let profile = profiles::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        self.issue_tokens(profile)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let profile = profiles::Entity::find()
            .filter(profiles::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &profile.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        self.issue_tokens(profile)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let profile = profiles::Entity::find_by_id(claims.user_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        self.issue_tokens(profile)
    }

    /// 发送重置密码邮件；邮箱不存在时同样返回成功
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<()> {
        let email = normalize_email(&request.email)?;
        let Some(profile) = profiles::Entity::find()
            .filter(profiles::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
        else {
            log::info!("Password reset requested for unknown email");
            return Ok(());
        };

        // 新随机数让之前发出的链接全部失效
        let nonce = reset_nonce();
        profiles::Entity::update_many()
            .col_expr(profiles::Column::PasswordResetNonce, Expr::value(nonce.as_str()))
            .filter(profiles::Column::Id.eq(profile.id))
            .exec(&self.pool)
            .await?;

        let token = self
            .jwt_service
            .generate_reset_token(profile.id, &profile.email, &nonce)?;
        let link = format!("{}/auth/reset-password?token={token}", self.site_url);
        let html = format!(
            "<p>Bonjour {},</p>\
             <p>Pour choisir un nouveau mot de passe, cliquez sur le lien ci-dessous \
             (valable une heure) :</p>\
             <p><a href=\"{link}\">Réinitialiser mon mot de passe</a></p>\
             <p>Si vous n'êtes pas à l'origine de cette demande, ignorez cet email.</p>",
            profile.display_name()
        );
        if let Err(e) = self
            .notifier
            .send(&profile.email, "Réinitialisation de votre mot de passe BK'reward", &html)
            .await
        {
            log::error!("Failed to send password reset email to {}: {e}", profile.id);
        }
        Ok(())
    }

    /// 使用重置令牌设置新密码，令牌只能用一次
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        let claims = self
            .jwt_service
            .verify_reset_token(&request.token)
            .map_err(|_| AppError::Rejected("invalid_reset_token"))?;
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Rejected("invalid_reset_token"))?;
        let nonce = claims.nonce.unwrap_or_default();
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;
        let res = profiles::Entity::update_many()
            .col_expr(profiles::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                profiles::Column::PasswordResetNonce,
                Expr::value(Option::<String>::None),
            )
            .col_expr(profiles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profiles::Column::Id.eq(user_id))
            .filter(profiles::Column::PasswordResetNonce.eq(nonce))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::Rejected("invalid_reset_token"));
        }

        log::info!("Password reset for profile {user_id}");
        Ok(())
    }

    fn issue_tokens(&self, profile: profiles::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(profile.id, &profile.email)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(profile.id, &profile.email)?;

        Ok(AuthResponse {
            user: profile.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

/// 邮箱唯一索引冲突（Postgres 报索引名，SQLite 报列名，都包含 email）
fn is_email_conflict(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email"))
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
