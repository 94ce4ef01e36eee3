use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use volbot::execution::{Controller, LoggingSink, SyntheticBarProvider, TracingTradeLog};
use volbot::models::{Event, TickEvent};
use volbot::BotConfig;

#[derive(Parser, Debug)]
#[command(name = "volbot", about = "Automated trading decision engine (dry run)")]
struct Cli {
    /// Config file name, without extension; VOLBOT_* env vars override it
    #[arg(long, default_value = "volbot")]
    config: String,

    /// Seed for the synthetic bar provider
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Starting account balance until the first balance event arrives
    #[arg(long, default_value_t = 1000.0)]
    balance: f64,

    /// Milliseconds between synthetic ticks
    #[arg(long, default_value_t = 1000)]
    tick_interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let cfg = BotConfig::load(&cli.config)?;

    tracing::info!("volbot starting (dry run)");
    tracing::info!("  Symbol: {}", cfg.symbol);
    tracing::info!("  Risk per trade: {}%", cfg.risk_fraction * 100.0);
    tracing::info!("  Cooldown: {}s", cfg.cooldown_secs);
    tracing::info!("  Daily stop loss: {}%", cfg.daily_stop_loss_pct);
    tracing::info!("  Sessions: {:?}", cfg.sessions);
    tracing::info!("  Stealth mode: {}", cfg.stealth_mode);
    tracing::info!("  Volatility protection: {}", cfg.volatility_protection);

    let (tx, mut rx) = mpsc::channel::<Event>(256);

    // The broker handshake would deliver this; in a dry run we inject it
    tx.send(Event::Authorized).await?;

    let producer = {
        let symbol = cfg.symbol.clone();
        let tx = tx.clone();
        let interval_ms = cli.tick_interval_ms;
        let seed = cli.seed;
        tokio::spawn(async move {
            tick_producer(tx, symbol, seed, interval_ms).await;
        })
    };

    let mut controller = Controller::new(
        cfg,
        cli.balance,
        LoggingSink,
        SyntheticBarProvider::new(cli.seed, 100.0),
        TracingTradeLog,
    );

    let engine = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = controller.handle_event(event) {
                tracing::error!("event handling failed: {}", e);
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        result = producer => {
            tracing::error!("tick producer exited: {:?}", result);
        }
        result = engine => {
            tracing::error!("engine loop exited: {:?}", result);
        }
    }

    tracing::info!("volbot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volbot=info".into()),
        )
        .init();
}

/// Feed the event stream with a synthetic quote walk.
async fn tick_producer(
    tx: mpsc::Sender<Event>,
    symbol: String,
    seed: u64,
    interval_ms: u64,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut quote = 100.0_f64;
    let mut ticker = tokio::time::interval(tokio::time::Duration::from_millis(interval_ms));

    loop {
        ticker.tick().await;
        quote *= 1.0 + rng.gen_range(-0.005..0.005);

        let event = Event::Tick(TickEvent {
            symbol: symbol.clone(),
            quote,
            timestamp: chrono::Utc::now(),
        });
        if tx.send(event).await.is_err() {
            break;
        }
    }
}
