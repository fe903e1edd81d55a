//! Orgdash - Organization Dashboard API
//!
//! 組織の部署・メンバー・活動期間・実績・商品を管理するAPIサーバー

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;

use orgdash::adapter::config::Config;
use orgdash::driver::{self, Args};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    driver::run(config, args).await
}
