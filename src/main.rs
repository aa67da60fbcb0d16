// Scouting mission entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Build the engine (load + preprocess the dataset)
// 4. Run the candidate search and compute the squad baseline
// 5. Generate one report per candidate via the Claude API

use std::path::Path;

use anyhow::Context;
use tracing::{error, info, warn};

use scout_assistant::config;
use scout_assistant::engine::ScoutEngine;
use scout_assistant::llm::client::{ReportError, ScoutClient};
use scout_assistant::llm::prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (stderr, so stdout stays clean for reports)
    init_tracing()?;
    info!("Scout assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: dataset={}, role={}, max_age={}, min_potential={}",
        config.dataset.path,
        config.search.position,
        config.search.max_age,
        config.search.min_potential
    );

    // 3. Build the engine; schema errors abort here, nothing partial survives
    let engine = ScoutEngine::from_path(Path::new(&config.dataset.path))
        .context("failed to build the scout engine")?;
    info!(
        "Engine ready: {} named players",
        engine.list_player_names().len()
    );

    // 4. Candidate search and squad baseline
    let candidates = engine.find_candidates(
        &config.search.position,
        config.search.max_age,
        config.search.min_potential,
    );
    if candidates.is_empty() {
        println!(
            "No candidates matched role {} (age <= {}, potential >= {}).",
            config.search.position, config.search.max_age, config.search.min_potential
        );
        return Ok(());
    }

    let team_stats = engine.get_team_stats(&config.mission.squad);

    let client = ScoutClient::from_config(&config);
    match &client {
        ScoutClient::Active(_) => info!("LLM client initialized (API key configured)"),
        ScoutClient::Disabled => warn!("LLM client disabled (no API key); printing profiles only"),
    }

    // 5. One report per candidate
    let system = prompt::system_prompt();
    println!(
        "--- Scouting mission {} | role {} ---",
        chrono::Local::now().format("%Y-%m-%d %H:%M"),
        config.search.position
    );

    for candidate in &candidates {
        let snapshot = engine
            .get_player_snapshot(&candidate.short_name)
            .context("candidate vanished between search and snapshot")?;
        println!(
            "\nAnalyzing: {} (role {}, overall {}, potential {}, gap {:+.0})",
            snapshot.short_name,
            snapshot.player_positions,
            snapshot.overall,
            snapshot.potential,
            snapshot.potential_gap
        );

        let user_prompt =
            prompt::build_scout_report_prompt(&snapshot, &config.mission.weakness, &team_stats);
        match client.generate(&system, &user_prompt).await {
            Ok(report) => {
                println!("REPORT:\n{report}\n{}", "-".repeat(50));
            }
            Err(ReportError::NotConfigured) => {
                println!("(report skipped: LLM not configured)");
            }
            Err(e) => {
                error!("report generation failed for {}: {e}", snapshot.short_name);
                println!("(report failed: {e})");
            }
        }
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
