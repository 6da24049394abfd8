use healthlog_core_types::RequestId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in log events and tests.
/// Kinds never reach the person texting in; they only ever see the fixed
/// diagnostic of the stage that failed (see [`Stage::diagnostic`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    InvalidEntryDate,
    NotFound,

    // Integration/IO
    Persistence,
    Serialization,
    ExternalService,
    Io,
    Config,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidEntryDate => "ERR_INVALID_ENTRY_DATE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    user_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            user_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the logical user whose log was being touched
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(user_id) = &self.user_id {
            write!(f, " (user_id: {})", user_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by the pure message pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthLogError {
    /// A record was composed from a command without exactly five ratings
    #[error("Expected 5 ratings, found {found}")]
    WrongRatingCount { found: usize },

    /// A stored entry date is not `YYYY-MM-DD`
    #[error("Invalid entry date: {raw}")]
    InvalidEntryDate { raw: String },

    /// A rejection was about to be relayed with no reasons in it
    #[error("Rejection carries no reasons")]
    EmptyRejection,
}

impl From<HealthLogError> for ExError {
    fn from(err: HealthLogError) -> Self {
        let message = err.to_string();
        match err {
            HealthLogError::WrongRatingCount { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_op("compose")
            }
            HealthLogError::InvalidEntryDate { .. } => {
                ExError::new(ExErrorKind::InvalidEntryDate).with_op("read_last_entry_date")
            }
            HealthLogError::EmptyRejection => {
                ExError::new(ExErrorKind::Internal).with_op("report")
            }
        }
        .with_message(message)
    }
}

/// Orchestrator stage a failure is attributed to
///
/// Order of the variants is the precedence order of the message pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Help,
    SeeMeds,
    Validate,
    Record,
    Report,
}

impl Stage {
    /// The single reply sent when this stage fails
    pub fn diagnostic(&self) -> &'static str {
        match self {
            Stage::Parse => "issue parsing",
            Stage::Help => "issue with help message",
            Stage::SeeMeds => "issue with showing meds",
            Stage::Validate => "issue validating",
            Stage::Record => "issue logging valid sms",
            Stage::Report => "issue logging invalid sms",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Help => "help",
            Stage::SeeMeds => "see_meds",
            Stage::Validate => "validate",
            Stage::Record => "record",
            Stage::Report => "report",
        }
    }
}

/// A failure tagged with the stage that produced it
#[derive(Error, Debug, Clone)]
#[error("{} stage failed: {error}", stage.as_str())]
pub struct StageError {
    pub stage: Stage,
    pub error: ExError,
}

impl StageError {
    pub fn new(stage: Stage, error: impl Into<ExError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Tag any fallible step with its stage
pub trait StageResultExt<T> {
    /// Attribute the error, if any, to `stage`
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in a [`StageError`].
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T, E: Into<ExError>> StageResultExt<T> for std::result::Result<T, E> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}
