//! Operator entry point for the Haven crisis engine.

mod assess_command;
mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use haven_escalation::render_escalation_dispatch_report;
use haven_risk::render_crisis_assessment_report;

use crate::assess_command::execute_assess_command;
use crate::cli_args::{HavenCliArgs, HavenCliCommand};

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = HavenCliArgs::parse();

    match args.command {
        HavenCliCommand::Assess(assess_args) => {
            let report = execute_assess_command(&assess_args).await?;
            if assess_args.json {
                let rendered = serde_json::to_string_pretty(&report)
                    .context("failed to render assess report json")?;
                println!("{rendered}");
            } else {
                println!("{}", render_crisis_assessment_report(&report.assessment));
                println!("{}", render_escalation_dispatch_report(&report.dispatch));
            }
        }
    }

    Ok(())
}
