//! Command Orchestrator: one inbound message in, one reply out
//!
//! Stages run in a fixed order and the first one that decides the reply
//! ends the chain: parse failure, help, see-meds, validate, then record or
//! report. A fault inside a stage is tagged with that stage and turned into
//! its fixed diagnostic; nothing is retried.

#![allow(clippy::result_large_err)]

use std::sync::Arc;
use std::time::Instant;

use healthlog_core::errors::{Stage, StageError, StageResultExt};
use healthlog_core::model::{CommitMode, ParsedCommand, RecordPlan, UserId};
use healthlog_core::ops::{read_current_meds, Clock, LogStore};
use healthlog_core::render::{
    current_meds_message, help_message, rejection_message, RECORDED_REPLY,
};
use healthlog_core::{compose, log_op_end, log_op_error, log_op_start, parse, validate};
use healthlog_core::{Result, ValidationOutcome};
use healthlog_core_types::RequestContext;

use crate::user_locks::UserLocks;

/// How a message was handled
#[derive(Debug, Clone)]
pub enum MessageOutcome {
    Help(String),
    CurrentMeds(String),
    Recorded(CommitMode),
    /// Validation reasons, already joined into the reply
    Rejected(String),
    Failed(StageError),
}

impl MessageOutcome {
    /// The single text sent back to the user
    pub fn reply(&self) -> String {
        match self {
            MessageOutcome::Help(text)
            | MessageOutcome::CurrentMeds(text)
            | MessageOutcome::Rejected(text) => text.clone(),
            MessageOutcome::Recorded(_) => RECORDED_REPLY.to_string(),
            MessageOutcome::Failed(err) => err.stage.diagnostic().to_string(),
        }
    }

    /// Short label used in log events
    pub fn label(&self) -> &'static str {
        match self {
            MessageOutcome::Help(_) => "help",
            MessageOutcome::CurrentMeds(_) => "see_meds",
            MessageOutcome::Recorded(CommitMode::Append) => "recorded",
            MessageOutcome::Recorded(CommitMode::Amend) => "amended",
            MessageOutcome::Rejected(_) => "rejected",
            MessageOutcome::Failed(_) => "failed",
        }
    }
}

/// Runs inbound messages against a shared log store
pub struct Orchestrator {
    store: Arc<dyn LogStore>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn LogStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: UserLocks::new(),
        }
    }

    /// Handle one message from `user`
    ///
    /// Blocking: store calls run on the calling thread.
    pub fn handle_message(
        &self,
        ctx: &RequestContext,
        user: &UserId,
        text: &str,
    ) -> MessageOutcome {
        let start = Instant::now();
        let user_id = user.masked();
        log_op_start!(
            "handle_message",
            request_id = %ctx.request_id,
            user_id = %user_id,
            body_len = text.len()
        );

        let outcome = match self.run_stages(user, text) {
            Ok(outcome) => outcome,
            Err(err) => {
                let err = StageError {
                    stage: err.stage,
                    error: err
                        .error
                        .with_user_id(user_id.clone())
                        .with_request_id(ctx.request_id.clone()),
                };
                log_op_error!(
                    "handle_message",
                    err.error.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    request_id = %ctx.request_id,
                    stage = err.stage.as_str()
                );
                MessageOutcome::Failed(err)
            }
        };

        if !matches!(outcome, MessageOutcome::Failed(_)) {
            log_op_end!(
                "handle_message",
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id,
                outcome = outcome.label()
            );
        }
        outcome
    }

    fn run_stages(&self, user: &UserId, text: &str) -> std::result::Result<MessageOutcome, StageError> {
        let cmd = parse(text);

        if cmd.flags.help {
            return Ok(MessageOutcome::Help(help_message()));
        }

        if cmd.flags.see_meds {
            let meds = read_current_meds(self.store.as_ref(), user).at_stage(Stage::SeeMeds)?;
            return Ok(MessageOutcome::CurrentMeds(current_meds_message(&meds)));
        }

        self.locks
            .with_user(user, || self.validate_and_commit(user, &cmd))
            .at_stage(Stage::Validate)?
    }

    /// Runs inside the user's exclusive section
    fn validate_and_commit(
        &self,
        user: &UserId,
        cmd: &ParsedCommand,
    ) -> std::result::Result<MessageOutcome, StageError> {
        let current = read_current_meds(self.store.as_ref(), user).at_stage(Stage::Validate)?;

        match validate(cmd, &current) {
            ValidationOutcome::Valid => {
                let plan = compose(cmd, &current, self.clock.today()).at_stage(Stage::Record)?;
                self.commit(user, &plan).at_stage(Stage::Record)?;
                Ok(MessageOutcome::Recorded(plan.mode))
            }
            ValidationOutcome::Invalid(reasons) => {
                tracing::debug!(reason_count = reasons.len(), "message rejected");
                let reply = rejection_message(&reasons).at_stage(Stage::Report)?;
                Ok(MessageOutcome::Rejected(reply))
            }
        }
    }

    fn commit(&self, user: &UserId, plan: &RecordPlan) -> Result<()> {
        match plan.mode {
            CommitMode::Append => self.store.insert_entry(user, &plan.entry),
            CommitMode::Amend => self.store.replace_top_entry(user, &plan.entry),
        }
    }
}
