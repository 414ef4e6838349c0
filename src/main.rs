use bulk_dispatch::adapters::recipients::{recipients_from_csv_path, recipients_from_list_file};
use bulk_dispatch::app::webhook::{verify_subscription, InboundText};
use bulk_dispatch::config::{CliConfig, Command};
use bulk_dispatch::utils::error::ErrorSeverity;
use bulk_dispatch::utils::{logger, validation::Validate};
use bulk_dispatch::{
    AutoReplyClassifier, AutoResponder, BatchRequest, BulkSendReport, DispatchError,
    OutboundMessage, RecipientId, Result, TomlConfig, WebhookPayload,
};
use clap::Parser;
use serde::Serialize;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting bulk-dispatch");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<TomlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::from_env()?,
    };

    // 套用命令列覆蓋設定
    if let Some(delay_ms) = cli.delay_ms {
        config.set_delay_ms(delay_ms);
        tracing::info!("🔧 Send delay overridden to: {}ms", delay_ms);
    }

    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: &TomlConfig) -> Result<()> {
    match command {
        Command::Send {
            recipients,
            recipients_file,
            message,
        } => {
            let recipients = match recipients_file {
                Some(path) => recipients_from_list_file(path)?,
                None => recipients
                    .iter()
                    .map(RecipientId::parse)
                    .collect::<Result<Vec<_>>>()?,
            };
            send_batch(config, recipients, message).await
        }
        Command::SendCsv { file, message } => {
            let parsed = recipients_from_csv_path(&file)?;
            if parsed.recipients.is_empty() {
                return Err(DispatchError::validation(
                    "No valid phone numbers found in CSV",
                ));
            }
            if parsed.skipped_rows > 0 {
                eprintln!(
                    "⚠️ {} row(s) in {} had no recipient value and were skipped",
                    parsed.skipped_rows, file
                );
            }
            send_batch(config, parsed.recipients, message).await
        }
        Command::Reply { from, text } => {
            let responder = AutoResponder::new(
                config.build_dispatcher()?,
                AutoReplyClassifier::default(),
            );
            let inbound = InboundText {
                from: RecipientId::parse(&from)?,
                body: text,
                message_id: None,
            };
            let outcome = responder.reply_to(&inbound).await?;
            print_json(&outcome)
        }
        Command::Webhook { payload } => {
            let body = std::fs::read_to_string(&payload)?;
            let payload = WebhookPayload::parse(&body)?;
            let responder = AutoResponder::new(
                config.build_dispatcher()?,
                AutoReplyClassifier::default(),
            );
            let outcomes = responder.handle_payload(&payload).await;
            print_json(&outcomes)
        }
        Command::Verify {
            mode,
            token,
            challenge,
        } => {
            let expected = config
                .verify_token()
                .ok_or_else(|| DispatchError::MissingConfigError {
                    field: "webhook.verify_token".to_string(),
                })?;
            match verify_subscription(
                mode.as_deref(),
                token.as_deref(),
                challenge.as_deref(),
                expected,
            ) {
                Some(challenge) => {
                    println!("{}", challenge);
                    Ok(())
                }
                None => Err(DispatchError::validation("Webhook verification failed")),
            }
        }
    }
}

async fn send_batch(config: &TomlConfig, recipients: Vec<RecipientId>, message: String) -> Result<()> {
    let dispatcher = config.build_dispatcher()?;
    let request = BatchRequest::new(recipients, OutboundMessage::new(message));
    let result = dispatcher.dispatch(request).await?;

    let report = BulkSendReport::from(&result);
    tracing::info!(
        "📊 Bulk messaging completed: {} total, {} successful, {} failed ({:?})",
        report.summary.total,
        report.summary.successful,
        report.summary.failed,
        result.finished_at - result.started_at
    );
    print_json(&report)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
