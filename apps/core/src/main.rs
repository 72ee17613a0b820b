// StressChat console entry point
// Classifies the opening message once, then keeps the conversation going

use anyhow::Context;
use std::process::ExitCode;
use stresschat_core::brain::{DialoguePolicy, EscalationPolicy};
use stresschat_core::classifier::{ModelLoader, StressClassifier};
use stresschat_core::config::AppConfig;
use stresschat_core::fs_manager::PortablePathManager;
use stresschat_core::models::AgeGroup;
use stresschat_core::{telemetry, ConversationState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{error, info};

type Input = Lines<BufReader<Stdin>>;

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?)
}

async fn run() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load().context("Invalid configuration")?;
    telemetry::init(&config).context("Failed to initialize logging")?;
    PortablePathManager::ensure_dirs(&[&config.model_dir])
        .context("Failed to create model directory")?;

    let classifier = StressClassifier::new(ModelLoader::new(config.model_dir.clone()));
    let warm = classifier.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || warm.warm_up()).await? {
        error!("Model unavailable: {}", e);
        eprintln!("{}", e.user_message());
        return Ok(ExitCode::FAILURE);
    }

    let policy = DialoguePolicy::with_escalation(EscalationPolicy {
        window: config.escalation_window,
        threshold: config.escalation_threshold,
    });

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let hint = prompt(&mut input, "Age group (teen/senior/other): ").await?;
    let age_group = AgeGroup::from_hint(hint.as_deref());

    let mut state = loop {
        let Some(text) = prompt(&mut input, "How are you feeling? ").await? else {
            return Ok(ExitCode::SUCCESS);
        };
        if text.trim().is_empty() {
            continue;
        }
        let begin_classifier = classifier.clone();
        let begin_policy = policy.clone();
        let result = tokio::task::spawn_blocking(move || {
            ConversationState::begin(&text, age_group, &begin_classifier, &begin_policy)
        })
        .await?;
        match result {
            Ok(state) => break state,
            Err(e) => {
                error!("Analysis failed: {}", e);
                eprintln!("{}", e.user_message());
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    println!(
        "Stress level: {} ({}% confidence)",
        state.stress_level(),
        state.confidence()
    );
    if let Some(opening) = state.history().last() {
        println!("{}", opening.text);
    }

    while let Some(line) = prompt(&mut input, "> ").await? {
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }
        println!("{}", state.reply(&line, &policy));
    }

    info!(
        conversation = %state.id(),
        user_turns = state.user_turns(),
        "Conversation ended"
    );
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
