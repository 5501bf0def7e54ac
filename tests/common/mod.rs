// Shared helpers for the integration tests: an in-memory SQLite database
// migrated with the production migrations, plus small row factories.
#![allow(dead_code)]

use async_trait::async_trait;
use bkreward_backend::AppResult;
use bkreward_backend::entities::{PrizeStatus, prize_entity as prizes, profile_entity as profiles};
use bkreward_backend::external::{AdminNotifier, NotificationSink};
use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Set};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Helper: fresh in-memory database with every migration applied.
///
/// A single connection keeps the whole pool on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to SQLite in-memory");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// 文件型 SQLite（WAL），多连接下事务真正并发执行
pub struct FileDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

/// Helper: migrated file database shared by a pool of `connections`.
///
/// WAL is switched on through a bootstrap connection first; the mode is stored
/// in the file, so every pooled connection opened afterwards uses it. sqlx
/// applies a 5 s busy timeout to each connection.
pub async fn setup_file_db(connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("bkreward-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let mut options = ConnectOptions::new(url.clone());
    options.max_connections(1).sqlx_logging(false);
    let bootstrap = Database::connect(options)
        .await
        .expect("Failed to create SQLite file");
    bootstrap
        .execute_unprepared("PRAGMA journal_mode=WAL")
        .await
        .expect("Failed to enable WAL");
    Migrator::up(&bootstrap, None)
        .await
        .expect("Failed to run migrations");
    bootstrap.close().await.expect("Failed to close bootstrap connection");

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(connections)
        .min_connections(connections)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to SQLite file");
    FileDb { db, path }
}

pub struct ProfileSeed {
    pub points: i64,
    pub with_address: bool,
    pub vip_until: Option<DateTime<Utc>>,
    pub vip_plus: bool,
}

impl Default for ProfileSeed {
    fn default() -> Self {
        Self {
            points: 0,
            with_address: true,
            vip_until: None,
            vip_plus: false,
        }
    }
}

pub async fn create_profile(db: &DatabaseConnection, seed: ProfileSeed) -> profiles::Model {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let short = id.simple().to_string();
    let address = |v: &str| seed.with_address.then(|| v.to_string());

    profiles::ActiveModel {
        id: Set(id),
        email: Set(format!("{}@example.com", &short[..12])),
        password_hash: Set("not-a-real-hash".to_string()),
        first_name: Set(Some("Alice".to_string())),
        last_name: Set(Some("Martin".to_string())),
        points: Set(seed.points),
        is_admin: Set(false),
        is_vip: Set(seed.vip_until.is_some()),
        is_vip_plus: Set(seed.vip_plus),
        vip_until: Set(seed.vip_until),
        vip_plan: Set(None),
        stripe_customer_id: Set(None),
        stripe_subscription_id: Set(None),
        last_claim_date: Set(None),
        last_scratch_at: Set(None),
        last_wheel_at: Set(None),
        last_vip_slot_at: Set(None),
        pending_rescue_bet: Set(None),
        referral_code: Set(short[..8].to_uppercase()),
        referred_by: Set(None),
        address: Set(address("12 rue de la Paix")),
        postal_code: Set(address("75002")),
        city: Set(address("Paris")),
        password_reset_nonce: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert profile")
}

pub async fn create_prize(
    db: &DatabaseConnection,
    points_per_ticket: i64,
    target_tickets: i64,
    current_tickets: i64,
) -> prizes::Model {
    let now = Utc::now();
    prizes::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Casque audio".to_string()),
        image_url: Set(None),
        points_per_ticket: Set(points_per_ticket),
        target_tickets: Set(target_tickets),
        current_tickets: Set(current_tickets),
        status: Set(PrizeStatus::EnCours),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert prize")
}

pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// 记录所有发出的邮件
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().expect("notifier mutex poisoned").push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

pub fn recording_notifier() -> (Arc<RecordingNotifier>, AdminNotifier) {
    let sink = Arc::new(RecordingNotifier::default());
    let notifier = AdminNotifier::new(sink.clone(), Some("admin@bkreward.test".to_string()));
    (sink, notifier)
}
