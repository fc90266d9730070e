use pantryman_core_types::AttemptId;
use thiserror::Error;

/// Result type alias using PantryError
pub type Result<T> = std::result::Result<T, PantryError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (and tests) can match
/// on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Engine lifecycle
    /// The engine failed to open a storage root
    EngineInit,
    /// No engine handle is currently bound
    NotBound,

    // Storage classification
    /// A candidate root could not be read while classifying it
    ValidationInconclusive,
    /// A candidate root is non-empty and does not hold a usable dataset
    InvalidDataset,
    /// A previously granted external root can no longer be accessed
    PermissionLost,

    // Migration
    /// The dataset structure could not be created at the destination
    DestinationNotWritable,
    /// A single record failed to copy (recorded, never aborting)
    PerFileCopyFailure,
    /// The migration finished but did not meet the success policy
    MigrationPolicyUnmet,

    // Switch orchestration
    /// Another switch attempt is already in flight
    SwitchInFlight,
    /// The candidate is already the active root
    AlreadyActive,

    // Engine requests
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::EngineInit => "ERR_ENGINE_INIT",
            ExErrorKind::NotBound => "ERR_NOT_BOUND",
            ExErrorKind::ValidationInconclusive => "ERR_VALIDATION_INCONCLUSIVE",
            ExErrorKind::InvalidDataset => "ERR_INVALID_DATASET",
            ExErrorKind::PermissionLost => "ERR_PERMISSION_LOST",
            ExErrorKind::DestinationNotWritable => "ERR_DESTINATION_NOT_WRITABLE",
            ExErrorKind::PerFileCopyFailure => "ERR_PER_FILE_COPY_FAILURE",
            ExErrorKind::MigrationPolicyUnmet => "ERR_MIGRATION_POLICY_UNMET",
            ExErrorKind::SwitchInFlight => "ERR_SWITCH_IN_FLIGHT",
            ExErrorKind::AlreadyActive => "ERR_ALREADY_ACTIVE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind should be shown to the user as a blocking error
    /// rather than only logged.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::PerFileCopyFailure | ExErrorKind::PermissionLost
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus the operation, entity (a root, file or
/// ingredient name) and switch attempt it belongs to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    attempt_id: Option<AttemptId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            attempt_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (root path, file name, ingredient name)
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add switch attempt context
    pub fn with_attempt_id(mut self, attempt_id: AttemptId) -> Self {
        self.attempt_id = Some(attempt_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the switch attempt context, if any
    pub fn attempt_id(&self) -> Option<&AttemptId> {
        self.attempt_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
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
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for pantry and storage operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PantryError {
    // ===== Engine requests =====
    /// Ingredient not present in the bound dataset
    #[error("Ingredient not found: {name}")]
    IngredientNotFound { name: String },

    /// An ingredient with the same (case-sensitive) name already exists
    #[error("Ingredient already exists: {name}")]
    IngredientAlreadyExists { name: String },

    /// Name or category missing, or otherwise malformed input
    #[error("Invalid ingredient: {reason}")]
    InvalidIngredient { reason: String },

    // ===== Engine lifecycle =====
    #[error("Failed to open engine at {root}: {reason}")]
    EngineInit { root: String, reason: String },

    #[error("No engine is bound")]
    NotBound,

    // ===== Storage =====
    #[error("Access to granted storage {reference} was lost")]
    PermissionLost { reference: String },

    #[error("{root} does not hold a usable dataset: {reason}")]
    InvalidDataset { root: String, reason: String },

    #[error("Cannot classify {root}: {reason}")]
    ValidationInconclusive { root: String, reason: String },

    #[error("Cannot create dataset structure at {path}: {reason}")]
    DestinationNotWritable { path: String, reason: String },

    #[error("Failed to copy {name}: {reason}")]
    CopyFailed { name: String, reason: String },

    // ===== Switch orchestration =====
    #[error("A directory switch is already in progress")]
    SwitchInFlight,

    #[error("{root} is already the active data directory")]
    AlreadyActive { root: String },

    #[error("Migration did not meet the success policy: {reason}")]
    MigrationPolicyUnmet { reason: String },

    // ===== Generic Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from PantryError to ExError
impl From<PantryError> for ExError {
    fn from(err: PantryError) -> Self {
        let message = err.to_string();
        match err {
            PantryError::IngredientNotFound { name } => ExError::new(ExErrorKind::NotFound)
                .with_entity(name)
                .with_message(message),

            PantryError::IngredientAlreadyExists { name } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity(name)
                    .with_message(message)
            }

            PantryError::InvalidIngredient { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            PantryError::EngineInit { root, .. } => ExError::new(ExErrorKind::EngineInit)
                .with_entity(root)
                .with_message(message),

            PantryError::NotBound => ExError::new(ExErrorKind::NotBound).with_message(message),

            PantryError::PermissionLost { reference } => {
                ExError::new(ExErrorKind::PermissionLost)
                    .with_entity(reference)
                    .with_message(message)
            }

            PantryError::InvalidDataset { root, .. } => {
                ExError::new(ExErrorKind::InvalidDataset)
                    .with_entity(root)
                    .with_message(message)
            }

            PantryError::ValidationInconclusive { root, .. } => {
                ExError::new(ExErrorKind::ValidationInconclusive)
                    .with_entity(root)
                    .with_message(message)
            }

            PantryError::DestinationNotWritable { path, .. } => {
                ExError::new(ExErrorKind::DestinationNotWritable)
                    .with_entity(path)
                    .with_message(message)
            }

            PantryError::CopyFailed { name, .. } => {
                ExError::new(ExErrorKind::PerFileCopyFailure)
                    .with_entity(name)
                    .with_message(message)
            }

            PantryError::SwitchInFlight => {
                ExError::new(ExErrorKind::SwitchInFlight).with_message(message)
            }

            PantryError::AlreadyActive { root } => ExError::new(ExErrorKind::AlreadyActive)
                .with_entity(root)
                .with_message(message),

            PantryError::MigrationPolicyUnmet { .. } => {
                ExError::new(ExErrorKind::MigrationPolicyUnmet).with_message(message)
            }

            PantryError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PantryError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
