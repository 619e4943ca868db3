//! Replays an action log and summarizes the conversations it produces.

use std::process::ExitCode;

use paper_dialogue::adapters::storage::JsonlActionLog;
use paper_dialogue::config::AppConfig;
use paper_dialogue::domain::actions::ActionsAndConversations;
use paper_dialogue::ports::ActionLogStore;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] paper_dialogue::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] paper_dialogue::config::ValidationError),

    #[error(transparent)]
    ActionLog(#[from] paper_dialogue::ports::ActionLogError),

    #[error(transparent)]
    Replay(#[from] paper_dialogue::domain::actions::ReplayError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("paper-dialogue: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init_tracing()?;
    Ok(config)
}

async fn run(config: &AppConfig) -> Result<(), StartupError> {
    let log = JsonlActionLog::new(&config.storage.action_log_path);
    let recorded = log.load().await?;
    info!(
        path = %log.path().display(),
        actions = recorded.len(),
        "Loaded action log"
    );

    let registry = ActionsAndConversations::replay(recorded)?;
    for (name, conversation) in registry.snapshot() {
        let participants: Vec<&str> = conversation
            .participants()
            .iter()
            .map(|p| p.as_str())
            .collect();
        info!(
            conversation = %name,
            messages = conversation.len(),
            participants = %participants.join(", "),
            "Conversation replayed"
        );
    }
    Ok(())
}
