use std::time::Duration;

pub struct Config {
    pub bot_token: String,

    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub minio_region: String,

    pub expiry_hours: u64,
    pub port: u16,

    pub sentry_dsn: Option<String>,
}

fn get_env(env: &'static str) -> String {
    std::env::var(env).unwrap_or_else(|_| panic!("Cannot get the {} env variable", env))
}

fn get_env_or(env: &'static str, default: &str) -> String {
    std::env::var(env).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn load() -> Config {
        Config {
            bot_token: get_env("BOT_TOKEN"),

            minio_endpoint: get_env("MINIO_ENDPOINT"),
            minio_bucket: get_env("MINIO_BUCKET"),
            minio_access_key: get_env("MINIO_ACCESS_KEY"),
            minio_secret_key: get_env("MINIO_SECRET_KEY"),
            minio_region: get_env_or("MINIO_REGION", "us-east-1"),

            expiry_hours: get_env_or("EXPIRY_HOURS", "24").parse().unwrap(),
            port: get_env_or("PORT", "8000").parse().unwrap(),

            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        }
    }

    /// Validity window of generated download links.
    pub fn link_ttl(&self) -> Duration {
        Duration::from_secs(self.expiry_hours * 3600)
    }
}
