//! DeepBook Grid Planner Binary
//!
//! Plans a grid ladder for a DeepBook pool and lists pools or balance managers.
//!
//! ## Setup
//!
//! 1. Create a `config.toml`:
//!    ```toml
//!    [network]
//!    env = "mainnet"
//!    owner_address = "0x..."
//!
//!    [pool]
//!    key = "SUI_USDC"
//!
//!    [grid]
//!    min_price = 3.0
//!    max_price = 4.0
//!    levels = 10
//!    total_capital = 1000.0
//!    ```
//!
//! 2. Optionally override values in `.env` or the environment
//!    (`APP_NETWORK__ENV=testnet`, `APP_POOL__KEY=DEEP_SUI`).
//!
//! 3. Run:
//!    ```bash
//!    cargo run --bin deepbook_grid -- plan --config config.toml --out plan.json
//!    cargo run --bin deepbook_grid -- pools
//!    cargo run --bin deepbook_grid -- managers
//!    ```

use std::path::Path;
use std::process;

use log::{error, info};

use deepbook_grid::config::Settings;
use deepbook_grid::deepbook::IndexerGateway;
use deepbook_grid::GridPlanner;

const USAGE: &str =
    "usage: deepbook_grid <plan|pools|managers> [--config <path>] [--out <file>]";

struct Args {
    command: String,
    config_path: String,
    out: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let command = args.next().ok_or_else(|| USAGE.to_string())?;
    let mut config_path = "config.toml".to_string();
    let mut out = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--config" | "-c" => {
                config_path = args.next().ok_or("--config needs a path")?;
            }
            "--out" | "-o" => {
                out = Some(args.next().ok_or("--out needs a path")?);
            }
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        }
    }

    Ok(Args {
        command,
        config_path,
        out,
    })
}

#[tokio::main]
async fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(2);
        }
    };

    let env_file = dotenvy::dotenv().ok();

    if !Path::new(&args.config_path).exists() {
        eprintln!(
            "Config file '{}' not found. Please create one.",
            args.config_path
        );
        process::exit(1);
    }

    let settings = match Settings::new(&args.config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log.level))
        .init();
    match env_file {
        Some(path) => info!("Loaded environment from: {}", path.display()),
        None => info!("No .env file found, using system environment variables"),
    }

    if let Err(e) = run(args, settings).await {
        error!("{e}");
        process::exit(1);
    }
}

async fn run(args: Args, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = IndexerGateway::from_settings(&settings)?;
    let planner = GridPlanner::new(settings, gateway)?;
    let settings = planner.settings();
    info!(
        "Running '{}' against pool {} on {}",
        args.command, settings.pool.key, settings.network.env
    );

    match args.command.as_str() {
        "plan" => {
            let plan = planner.plan().await?;
            if let Some(out) = &args.out {
                plan.save_to_file(out)?;
                info!("Plan {} saved to {}", plan.id, out);
            }
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        "pools" => {
            let pools = planner.list_pools().await?;
            println!("{}", serde_json::to_string_pretty(&pools)?);
        }
        "managers" => {
            let ids = planner.list_balance_managers().await?;
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        other => return Err(format!("unknown command '{other}'\n{USAGE}").into()),
    }

    Ok(())
}
