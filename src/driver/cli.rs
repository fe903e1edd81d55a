//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Parser, Subcommand};

/// 組織ダッシュボードのAPIサーバー
#[derive(Parser, Debug, Clone)]
#[command(name = "orgdash")]
#[command(about = "Organization dashboard API server", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, default_value = "./config/orgdash.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Override the port from the config file
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Insert sample products (existing ids are kept)
    Seed,
}
