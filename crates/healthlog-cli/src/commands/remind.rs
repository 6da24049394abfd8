//! Remind command
//!
//! Usage: healthlog remind [--dry-run]
//!
//! Meant to be run by an external scheduler at (or shortly after) each
//! checkpoint hour. Exits non-zero if the store read or the send fails.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use healthlog_core::model::UserId;
use healthlog_core::ops::{Messenger, RecordingMessenger, SystemClock};
use healthlog_core_types::RequestContext;
use healthlog_engine::{run_reminder, ReminderOutcome, ReminderSettings};
use healthlog_store::SqliteLogStore;

use crate::gateway::SmsGateway;

#[derive(Debug, Args)]
pub struct RemindArgs {
    /// Evaluate the policy without contacting the gateway
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute remind command
pub fn execute(config_path: Option<&Path>, args: RemindArgs) -> anyhow::Result<()> {
    let config = super::bootstrap(config_path)?;

    let store = SqliteLogStore::open(&config.store.db_path).with_context(|| {
        format!("open log store at {}", config.store.db_path.display())
    })?;
    let clock = SystemClock::from_offset_minutes(config.clock.utc_offset_minutes)?;
    let settings = ReminderSettings::new(UserId::new(config.reminder.recipient.expose().as_str()))
        .with_message(config.reminder.message.clone());

    let messenger: Box<dyn Messenger> = if args.dry_run {
        Box::new(RecordingMessenger::new())
    } else {
        Box::new(SmsGateway::from_config(&config.gateway)?)
    };

    let outcome = run_reminder(
        &RequestContext::new(),
        &store,
        messenger.as_ref(),
        &clock,
        &settings,
    )?;

    match outcome {
        ReminderOutcome::Sent if args.dry_run => println!("reminder due (dry run, not sent)"),
        ReminderOutcome::Sent => println!("reminder sent"),
        ReminderOutcome::OffCheckpoint => println!("not a checkpoint hour"),
        ReminderOutcome::AlreadyLogged => println!("already logged today"),
    }
    Ok(())
}
