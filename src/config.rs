use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub resend: ResendConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// STRIPE_PRICE_ID_HEBDO
    #[serde(default)]
    pub price_id_weekly: Option<String>,
    /// STRIPE_PRICE_ID_MENSUEL
    #[serde(default)]
    pub price_id_monthly: Option<String>,
    #[serde(default)]
    pub price_id_vip_plus: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: default_from_email(),
        }
    }
}

fn default_from_email() -> String {
    "BK'reward <onboarding@resend.dev>".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// 管理员通知邮箱（开奖、每周冠军、测试邮件）
    #[serde(default)]
    pub admin_notification_email: Option<String>,
    /// 启动时提升为管理员的邮箱
    #[serde(default)]
    pub bootstrap_emails: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            admin_notification_email: None,
            bootstrap_emails: Vec::new(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(anyhow!("cannot read config file {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> anyhow::Result<Self> {
        toml::from_str(config_str).context("failed to parse config file")
    }

    fn from_env() -> anyhow::Result<Self> {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL")
            .ok_or_else(|| anyhow!("DATABASE_URL is not set and no config.toml was found"))?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                refresh_token_expires_in: get_env_parse("JWT_REFRESH_EXPIRES_IN", 2_592_000i64),
            },
            stripe: StripeConfig::default(),
            resend: ResendConfig::default(),
            app: AppConfig::default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }

        // Stripe
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("STRIPE_PRICE_ID_HEBDO") {
            self.stripe.price_id_weekly = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_PRICE_ID_MENSUEL") {
            self.stripe.price_id_monthly = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_PRICE_ID_VIP_PLUS") {
            self.stripe.price_id_vip_plus = Some(v);
        }

        // Resend
        if let Ok(v) = env::var("RESEND_API_KEY")
            && !v.is_empty()
        {
            self.resend.api_key = Some(v);
        }
        if let Ok(v) = env::var("RESEND_FROM_EMAIL") {
            self.resend.from_email = v;
        }

        // 站点地址：SITE_URL 优先，其次 NEXT_PUBLIC_SITE_URL
        if let Ok(v) = env::var("SITE_URL").or_else(|_| env::var("NEXT_PUBLIC_SITE_URL")) {
            self.app.site_url = v;
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.app.admin_notification_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_BOOTSTRAP_EMAILS") {
            self.app.bootstrap_emails = parse_email_list(&v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let raw = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgres://localhost/bkreward"
max_connections = 5

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120
"#;
        let config = Config::parse(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.app.site_url, "http://localhost:3000");
        assert!(config.resend.api_key.is_none());
        assert!(config.stripe.price_id_weekly.is_none());
        assert!(config.app.bootstrap_emails.is_empty());
    }

    #[test]
    fn test_parse_full_toml() {
        let raw = r#"
[server]
host = "0.0.0.0"
port = 8080

[database]
url = "postgres://localhost/bkreward"
max_connections = 10

[jwt]
secret = "s"
access_token_expires_in = 60
refresh_token_expires_in = 120

[stripe]
secret_key = "sk_test"
webhook_secret = "whsec"
price_id_weekly = "price_w"
price_id_monthly = "price_m"

[app]
site_url = "https://bkreward.fr"
admin_notification_email = "admin@bkreward.fr"
bootstrap_emails = ["admin@bkreward.fr"]
"#;
        let config = Config::parse(raw).unwrap();
        assert_eq!(config.stripe.price_id_weekly.as_deref(), Some("price_w"));
        assert!(config.stripe.price_id_vip_plus.is_none());
        assert_eq!(config.app.site_url, "https://bkreward.fr");
        assert_eq!(config.app.bootstrap_emails, vec!["admin@bkreward.fr"]);
    }

    #[test]
    fn test_parse_email_list() {
        assert_eq!(
            parse_email_list(" A@x.fr, ,b@y.fr "),
            vec!["a@x.fr".to_string(), "b@y.fr".to_string()]
        );
    }
}
