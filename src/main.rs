//! feedbot - A Discord bot managing guild subscriptions to RSS feeds.
//!
//! This is the main entry point of feedbot, the command layer letting guild
//! administrators manage which feeds are delivered to which channels.
//!
//! # Overview
//!
//! feedbot listens to guild messages. A message addressed to the bot, either by
//! mentioning it or with the `/feed:` prefix, is parsed as a command, checked
//! against the author's permissions and executed against the subscription
//! storage. Replies are posted in the channel the command came from.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! discord:
//!   token: "your-bot-token"
//!   operator_id: 123456789012345678
//!   request_timeout: 10
//! ```
//!
//! Any value can be overridden with a `FEEDBOT_` environment variable:
//!
//! ```bash
//! export FEEDBOT_DISCORD__TOKEN="your-bot-token"
//! ```
//!
//! # Usage
//!
//! ```bash
//! feedbot --config config.yaml --data ./feedbot-data
//! ```
//!
//! # Bot Commands
//!
//! - `/feed:help` - Display help information
//! - `/feed:add <uri> [channel]` - Subscribe a channel to a feed
//! - `/feed:remove <id>` - Delete a subscription
//! - `/feed:list` - List the guild configuration and subscriptions
//! - `/feed:set <channel|contact|embed|webhook> ...` - Change settings
//!
//! Every command except `help` requires the **ADMINISTRATOR** permission.
//!
//! # Architecture
//!
//! - [`bot`] - Wiring of storage, Discord client and command dispatch
//! - [`commands`] - Command recognition, authorization and execution
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`discord`] - Serenity event handler and platform lookups
//! - [`settings`] - Contact and on/off/inherit setting values
//! - [`store`] - Feed, subscription and guild configuration storage
//! - [`utils`] - Discord argument token parsing
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::backtrace::Backtrace;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod discord;
mod settings;
mod store;
mod utils;

/// Command-line arguments for feedbot.
///
/// # Examples
///
/// ```bash
/// feedbot --config config.yaml --data ./feedbot-data
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// See the [`config`] module for the expected format.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// The directory holds `feedbot.json`, the feeds, subscriptions and guild
    /// configurations. It is created when missing.
    #[arg(short, long)]
    data: String,
}

/// Logs panics, with their location and a backtrace, through the logger.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        error!("{}\n{}", panic, Backtrace::force_capture());
    }));
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);
    install_panic_hook();

    info!("Starting feedbot {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let bot = match Bot::new(config, args).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to initialize bot: {}", e);
            return;
        }
    };

    if let Err(e) = bot.start().await {
        error!("Discord client stopped: {}", e);
    }
}
