use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Utc; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use bkreward_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{AdminNotifier, LogNotifier, NotificationSink, ResendMailer, StripeService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 外部服务：未配置 Resend 时邮件只写日志
    let stripe_service = StripeService::new(config.stripe.clone());
    let sink: Arc<dyn NotificationSink> = match ResendMailer::from_config(&config.resend) {
        Some(mailer) => Arc::new(mailer),
        None => {
            log::warn!("Resend API key not configured, emails will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let notifier = AdminNotifier::new(sink, config.app.admin_notification_email.clone());

    // 创建服务
    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        config.app.bootstrap_emails.clone(),
        notifier.clone(),
        config.app.site_url.clone(),
    );
    let ledger_service = LedgerService::new(pool.clone());
    let profile_service = ProfileService::new(pool.clone());
    let settings_service = SettingsService::new(pool.clone());
    let referral_service = ReferralService::new(pool.clone());
    let earning_service = EarningService::new(pool.clone());
    let vip_service = VipService::new(pool.clone());
    let prize_service = PrizeService::new(pool.clone());
    let draw_service = DrawService::new(pool.clone(), notifier.clone());
    let reward_pool_service = RewardPoolService::new(pool.clone());
    let tap_tap_service = TapTapService::new(pool.clone(), notifier.clone());
    let season_service = SeasonService::new(pool.clone());
    let subscription_service = SubscriptionService::new(
        pool.clone(),
        stripe_service,
        config.app.site_url.clone(),
    );
    let admin_service = AdminService::new(pool.clone(), Arc::new(RoleAuthorizer), notifier);

    match admin_service
        .bootstrap_admins(&config.app.bootstrap_emails)
        .await
    {
        Ok(n) if n > 0 => log::info!("Promoted {n} bootstrap admin account(s)"),
        Ok(_) => {}
        Err(e) => log::error!("Failed to promote bootstrap admins: {:?}", e),
    }

    // 启动后台定时任务
    tasks::spawn_all(
        vip_service.clone(),
        season_service.clone(),
        tap_tap_service.clone(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(earning_service.clone()))
            .app_data(web::Data::new(vip_service.clone()))
            .app_data(web::Data::new(prize_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(reward_pool_service.clone()))
            .app_data(web::Data::new(tap_tap_service.clone()))
            .app_data(web::Data::new(season_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
