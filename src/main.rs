use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::Command;
use crate::config::Config;
use crate::services::{
    storage::{build_client, S3Storage},
    telegram::TelegramFetcher,
    UploadRelay,
};

mod bot;
mod config;
mod services;
mod views;

async fn start_app(config: Arc<Config>) {
    let bot = Bot::new(config.bot_token.clone());

    let client = build_client(&config).await;
    let storage = S3Storage::new(client, config.minio_bucket.clone(), config.link_ttl());

    if let Err(err) = storage.ensure_bucket().await {
        warn!("Bucket check failed, uploads may not work: {err}");
    }

    info!(
        "Expired objects are removed by the lifecycle rule on bucket {}, not by this process",
        config.minio_bucket
    );

    let relay = Arc::new(UploadRelay::new(
        TelegramFetcher::new(bot.clone()),
        storage,
    ));

    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Could not register bot commands: {err}");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    let app_router = views::get_router(config.clone());

    info!("Start webserver on {addr}...");

    tokio::spawn(async move {
        axum::serve(listener, app_router).await.unwrap();
    });

    info!("Start dispatcher...");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![config.clone(), relay])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error from the update listener",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn main() {
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::load());

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    };
    let _guard = sentry::init((config.sentry_dsn.clone(), options));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(start_app(config));
}
