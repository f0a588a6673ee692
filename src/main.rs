use anyhow::Result;
use std::io::{self, BufRead};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use inductive_study::config::Config;
use inductive_study::display::StudyVisual;
use inductive_study::session::{SessionState, SubmitOutcome};
use inductive_study::{IgnoredReason, StudyService};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::load();

    // Logs go to stderr so stdout carries only the study
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    tracing::info!(
        model = %config.gemini.model,
        api_key = config.gemini.has_api_key(),
        "Configuration loaded"
    );

    let mut json = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => words.push(arg),
        }
    }

    let passage = if words.is_empty() {
        eprintln!("Enter a passage or topic (e.g. John 15:1-5):");
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end().to_string()
    } else {
        words.join(" ")
    };

    let service = StudyService::new(&config)?;

    if let SubmitOutcome::Ignored(IgnoredReason::EmptyPassage) = service.submit(&passage).await {
        eprintln!("Nothing to study: the passage is empty.");
        return Ok(ExitCode::from(2));
    }

    match service.state() {
        SessionState::Success(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                StudyVisual::display_record(&record);
            }
            Ok(ExitCode::SUCCESS)
        }
        SessionState::Error { message, .. } => {
            StudyVisual::display_error(&message);
            Ok(ExitCode::FAILURE)
        }
        state => {
            tracing::error!(phase = ?state.phase(), "Session ended in an unexpected phase");
            Ok(ExitCode::FAILURE)
        }
    }
}
