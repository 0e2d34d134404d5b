use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

fn parse_mood(value: &str) -> Result<u8, String> {
    let parsed = value
        .parse::<u8>()
        .map_err(|error| format!("failed to parse mood: {error}"))?;
    if !(1..=5).contains(&parsed) {
        return Err("mood must be in range 1..=5".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "haven",
    about = "Crisis risk assessment and escalation engine",
    version
)]
/// Public struct `HavenCliArgs` used across Haven components.
pub struct HavenCliArgs {
    #[command(subcommand)]
    pub command: HavenCliCommand,
}

#[derive(Debug, Subcommand)]
/// Enumerates supported `HavenCliCommand` values.
pub enum HavenCliCommand {
    /// Assess one user message and run the tier-appropriate escalation.
    Assess(AssessArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
/// Enumerates supported `CliAiMode` values.
pub enum CliAiMode {
    /// Skip the AI crisis-signal provider entirely.
    Off,
    /// Evaluate through the Gemini provider.
    Gemini,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
/// Enumerates supported `CliSmsMode` values.
pub enum CliSmsMode {
    /// Log guardian sends without contacting the provider.
    DryRun,
    /// Deliver guardian sends through the configured SMS provider.
    Provider,
}

#[derive(Debug, Args)]
/// Public struct `AssessArgs` used across Haven components.
pub struct AssessArgs {
    /// Message text to assess.
    #[arg(long)]
    pub text: String,

    /// Mood rating from 1 (very low) to 5 (great).
    #[arg(long, value_parser = parse_mood)]
    pub mood: u8,

    /// Path to the account record JSON.
    #[arg(long)]
    pub account_file: PathBuf,

    /// State directory holding the audit logs.
    #[arg(long, default_value = ".haven")]
    pub state_dir: PathBuf,

    /// Optional check-in history JSON: an array of
    /// {"mood", "timestamp_unix_ms", "crisis_score"?} rows.
    #[arg(long)]
    pub history_file: Option<PathBuf>,

    /// Optional voice analysis JSON:
    /// {"transcript", "detected_mood", "confidence"}.
    #[arg(long)]
    pub voice_file: Option<PathBuf>,

    /// AI crisis-signal provider mode.
    #[arg(long, value_enum, default_value_t = CliAiMode::Off)]
    pub ai_mode: CliAiMode,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Upper bound for one AI provider request.
    #[arg(long, default_value_t = 8_000, value_parser = parse_positive_u64)]
    pub ai_timeout_ms: u64,

    /// Guardian SMS delivery mode.
    #[arg(long, value_enum, default_value_t = CliSmsMode::DryRun)]
    pub sms_mode: CliSmsMode,

    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub twilio_auth_token: Option<String>,

    #[arg(long, env = "TWILIO_FROM_NUMBER")]
    pub twilio_from_number: Option<String>,

    /// Emit the assessment and dispatch report as JSON.
    #[arg(long)]
    pub json: bool,
}
