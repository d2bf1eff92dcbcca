use clap::Parser;
use steamworks_shim::config::{CliConfig, Command};
use steamworks_shim::core::platform;
use steamworks_shim::utils::error::ErrorCategory;
use steamworks_shim::utils::{logger, validation::Validate};
use steamworks_shim::{
    CallbackEvent, FriendFlags, ShimConfig, ShimError, SteamCallback, Steamworks,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let mut config = match &cli.config {
        Some(path) => match ShimConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                std::process::exit(exit_code(&e));
            }
        },
        None => ShimConfig::default(),
    };
    cli.apply_to(&mut config);

    if cli.json_logs || config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("Starting steamworks-shim");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(exit_code(&e));
    }

    if config.overlay_options().is_some() {
        tracing::warn!("[overlay] is applied by hosts that attach a desktop shell; the CLI has none");
    }

    if let Err(e) = run(&cli.command, &config).await {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(exit_code(&e));
    }

    Ok(())
}

fn exit_code(e: &ShimError) -> i32 {
    match e.category() {
        ErrorCategory::Configuration => 2,
        ErrorCategory::Platform => 3,
        ErrorCategory::Sdk => 4,
        ErrorCategory::Host | ErrorCategory::Io => 1,
    }
}

async fn run(command: &Command, config: &ShimConfig) -> steamworks_shim::Result<()> {
    match command {
        Command::Platform => {
            let artifact = platform::current()?;
            println!("{}", artifact.resolve(&config.dist_dir()).display());
        }
        Command::RestartCheck => {
            let steam = load(config)?;
            let app_id = config.app_id().ok_or_else(|| ShimError::ConfigError {
                message: "restart-check needs --app-id or steam.app_id".to_string(),
            })?;
            let restart = steam.restart_app_if_necessary(app_id);
            println!("{}", restart);
        }
        Command::Friends { flags, json } => {
            let steam = load(config)?;
            let client = steam.init(config.app_id())?;
            let friends = client.friends();
            let list = friends.get_friends(FriendFlags::from(*flags))?;

            for friend in &list {
                let persona = friends.persona_name(friend.steam_id)?;
                if persona != friend.name {
                    tracing::warn!(
                        "Persona name mismatch for {}: expected {}, got {}",
                        friend.steam_id,
                        friend.name,
                        persona
                    );
                }
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for friend in &list {
                    println!("{}\t{}", friend.steam_id, friend.name);
                }
                println!("✅ {} friends", list.len());
            }
        }
        Command::Screenshot {
            hook,
            trigger,
            add,
            thumbnail,
            width,
            height,
        } => {
            let steam = load(config)?;
            let client = steam.init(config.app_id())?;
            let screenshots = client.screenshots();

            if let Some(hook) = hook {
                screenshots.hook_screenshots(*hook)?;
            }
            println!("hooked: {}", screenshots.is_screenshots_hooked()?);

            if *trigger {
                screenshots.trigger_screenshot()?;
                println!("📸 Screenshot triggered");
            }

            if let (Some(path), Some(width), Some(height)) = (add, width, height) {
                let handle = screenshots.add_screenshot_to_library(
                    path,
                    thumbnail.as_deref(),
                    *width,
                    *height,
                )?;
                println!("📁 Added {} as handle {}", path.display(), handle.0);
            }
        }
        Command::Pump { seconds } => {
            let steam = load(config)?;
            let client = steam.init(config.app_id())?;
            let handles: Vec<_> = SteamCallback::ALL
                .into_iter()
                .map(|kind| {
                    client.callbacks().register(kind, |event: &CallbackEvent| {
                        tracing::info!(
                            "📨 {:?} ({} bytes) at {}",
                            event.kind,
                            event.data.len(),
                            event.received_at_ms
                        );
                    })
                })
                .collect();

            tracing::info!("Pumping callbacks for {}s", seconds);
            tokio::time::sleep(Duration::from_secs(*seconds)).await;

            for handle in handles {
                handle.disconnect();
            }
        }
    }

    Ok(())
}

fn load(config: &ShimConfig) -> steamworks_shim::Result<Steamworks> {
    Ok(Steamworks::load(config.dist_dir())?.with_pump_interval(config.pump_interval()))
}
