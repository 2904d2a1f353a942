use clap::Parser;
use turn_notifier::domain::ports::ChatGateway;
use turn_notifier::utils::error::{BotError, ErrorSeverity, Result};
use turn_notifier::utils::{logger, validation::Validate};
use turn_notifier::{
    BotConfig, ChromeSessionFactory, DiscordGateway, DryRunGateway, Notifier, PageFetcher,
    PlayerDirectory, TurnWatcher,
};

#[tokio::main]
async fn main() {
    // 沒有 .env 檔時直接使用環境變數
    let _ = dotenvy::dotenv();
    let config = BotConfig::parse();

    if config.json_logs {
        logger::init_json_logger(&config.log_level);
    } else {
        logger::init_cli_logger(&config.log_level);
    }

    tracing::info!("Starting turn-notifier");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ turn-notifier stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    tracing::info!("👋 turn-notifier exited cleanly");
}

fn exit_code(e: &BotError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(config: &BotConfig) -> Result<()> {
    let directory = PlayerDirectory::from_file(&config.players_file)?;

    let factory = ChromeSessionFactory::new(config.browser_endpoint.clone(), config.element_wait());
    let fetcher = PageFetcher::connect(factory, config.fetch_settings()).await?;

    if config.dry_run {
        // 沒設定目的地時仍用一個假目的地，讓訊息出現在日誌中
        let targets = if config.notification_targets.is_empty() {
            vec![0]
        } else {
            config.notification_targets.clone()
        };
        watch(config, fetcher, Notifier::new(DryRunGateway, targets), directory).await
    } else {
        let gateway = DiscordGateway::new(&config.discord_token, &config.discord_api_base)?;
        let notifier = Notifier::new(gateway, config.notification_targets.clone());
        watch(config, fetcher, notifier, directory).await
    }
}

async fn watch<G: ChatGateway>(
    config: &BotConfig,
    fetcher: PageFetcher<ChromeSessionFactory>,
    notifier: Notifier<G>,
    directory: PlayerDirectory,
) -> Result<()> {
    let mut watcher = TurnWatcher::new(fetcher, notifier, directory, config.check_interval());

    if config.once {
        if let Some(report) = watcher.run_once().await? {
            tracing::info!("✅ Check finished: {:?}", report.decision);
        }
        return Ok(());
    }

    watcher
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
