//! Parse command
//!
//! Usage: healthlog parse <TEXT> [--meds <LIST>]
//!
//! Prints the parsed command as JSON. With `--meds`, also validates it
//! against that medication list (`A(1), B(2)`, brackets optional).

use clap::Args;
use healthlog_core::model::{MedicationList, ParsedCommand};
use healthlog_core::{parse, validate, ValidationOutcome};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Message text, as it would arrive by SMS
    pub text: String,

    /// Current medication list to validate against
    #[arg(long)]
    pub meds: Option<String>,
}

#[derive(Debug, Serialize)]
struct ParseReport {
    command: ParsedCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationReport>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    reasons: Vec<String>,
}

/// Execute parse command
pub fn execute(args: ParseArgs) -> anyhow::Result<()> {
    let command = parse(&args.text);

    let validation = match args.meds.as_deref() {
        Some(raw) => {
            let current = MedicationList::parse_field(raw);
            let outcome = validate(&command, &current);
            Some(ValidationReport {
                valid: outcome.is_valid(),
                reasons: match outcome {
                    ValidationOutcome::Valid => Vec::new(),
                    ValidationOutcome::Invalid(reasons) => reasons,
                },
            })
        }
        None => None,
    };

    let report = ParseReport {
        command,
        validation,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
