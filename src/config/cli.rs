use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "bulk-dispatch")]
#[command(about = "Rate-limited WhatsApp bulk sender and keyword auto-responder")]
pub struct CliConfig {
    /// Path to TOML configuration file (falls back to WHATSAPP_* environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the delay between sends, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Send one message to a list of recipients
    Send {
        #[arg(long, value_delimiter = ',', conflicts_with = "recipients_file")]
        recipients: Vec<String>,

        /// JSON file containing an array of recipient strings
        #[arg(long)]
        recipients_file: Option<String>,

        #[arg(short, long)]
        message: String,
    },

    /// Send one message to every recipient found in a CSV file
    SendCsv {
        #[arg(short, long)]
        file: String,

        #[arg(short, long)]
        message: String,
    },

    /// Auto-reply to a single inbound text
    Reply {
        #[arg(long)]
        from: String,

        #[arg(long)]
        text: String,
    },

    /// Replay an inbound webhook payload through the auto-responder
    Webhook {
        #[arg(long)]
        payload: String,
    },

    /// Answer a webhook subscription handshake
    Verify {
        #[arg(long)]
        mode: Option<String>,

        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        challenge: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_with_inline_recipients() {
        let cli = CliConfig::try_parse_from([
            "bulk-dispatch",
            "send",
            "--recipients",
            "111,222",
            "-m",
            "hello",
            "--delay-ms",
            "0",
        ])
        .unwrap();

        assert_eq!(cli.delay_ms, Some(0));
        match cli.command {
            Command::Send {
                recipients,
                recipients_file,
                message,
            } => {
                assert_eq!(recipients, vec!["111", "222"]);
                assert!(recipients_file.is_none());
                assert_eq!(message, "hello");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_recipients_and_file_conflict() {
        let result = CliConfig::try_parse_from([
            "bulk-dispatch",
            "send",
            "--recipients",
            "111",
            "--recipients-file",
            "list.json",
            "-m",
            "hello",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_send_csv() {
        let cli = CliConfig::try_parse_from([
            "bulk-dispatch",
            "--config",
            "dispatch.toml",
            "send-csv",
            "--file",
            "contacts.csv",
            "--message",
            "Sale today",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some("dispatch.toml"));
        assert!(matches!(cli.command, Command::SendCsv { .. }));
    }
}
