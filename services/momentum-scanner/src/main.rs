//! Momentum Scanner - one-shot scan of the market-cap leaders
//!
//! 1. Loads settings (file, environment)
//! 2. Fetches the top markets and selects momentum candidates
//! 3. Asks the reasoning service to judge each candidate
//! 4. Prints trade plans and failures

use std::sync::Arc;
use tracing::{error, info, warn};

use data_retrieval::CoinGeckoClient;
use momentum_scanner::{GeminiClient, ScanReport, ScanStatus, Scanner, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Momentum Scanner...");

    let settings = Settings::load()?;
    // Fail before any request if the credential is missing
    settings.credential()?;
    info!(
        "Risk {} per trade, R:R 1:{}, top {} coins, threshold {}%",
        settings.risk_amount, settings.rr_ratio, settings.coin_count, settings.momentum_threshold
    );

    let market = Arc::new(CoinGeckoClient::new(settings.coingecko_api_key.clone())?);
    let reasoning = Arc::new(GeminiClient::new(&settings.gemini_model)?);
    info!("✓ Clients initialized (model {})", reasoning.model());

    let scanner = Scanner::new(market, reasoning, &settings);

    let report = match scanner
        .scan(&settings, |p| {
            info!("Progress: {}/{} analyzed", p.analyzed, p.total);
        })
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("Scan aborted: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &ScanReport) {
    match report.status() {
        ScanStatus::NoCandidates => {
            println!("No candidates: nothing moved past the momentum threshold.");
        }
        ScanStatus::NoTrades => {
            println!(
                "Analyzed {} candidates, no valid setups found.",
                report.candidates
            );
        }
        ScanStatus::Trades => {
            println!(
                "Analyzed {} candidates: {} long, {} short.",
                report.candidates,
                report.longs.len(),
                report.shorts.len()
            );
        }
    }

    if !report.longs.is_empty() {
        println!("\n== LONG ==");
        for plan in &report.longs {
            println!("{}\n", plan);
        }
    }

    if !report.shorts.is_empty() {
        println!("\n== SHORT ==");
        for plan in &report.shorts {
            println!("{}\n", plan);
        }
    }

    for failure in &report.errors {
        warn!("Candidate failed: {}", failure);
        println!("error: {}", failure);
    }
}
