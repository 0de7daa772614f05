use lineage_core_types::RequestId;
use thiserror::Error;

/// Result type alias using LineageError
pub type Result<T> = std::result::Result<T, LineageError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers use to decide how to
/// surface a failure (not-found vs bad input vs infrastructure fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Precondition
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Integrity
    InvariantViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind is an expected caller-side condition rather than a fault
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidInput | ExErrorKind::NotFound | ExErrorKind::AlreadyExists
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context
/// (operation, family tree, character, request) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    character: Option<String>,
    tree: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            character: None,
            tree: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add character context
    pub fn with_character(mut self, name: impl Into<String>) -> Self {
        self.character = Some(name.into());
        self
    }

    /// Add family tree context
    pub fn with_tree(mut self, tree: impl Into<String>) -> Self {
        self.tree = Some(tree.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
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

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn tree(&self) -> Option<&str> {
        self.tree.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
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
        if let Some(character) = &self.character {
            write!(f, " (character: {})", character)?;
        }
        if let Some(tree) = &self.tree {
            write!(f, " (tree: {})", tree)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for genealogy operations
///
/// Rejected edits are not errors; see `ops::EditOutcome`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineageError {
    // ===== Not found =====
    /// Character does not exist in the store
    #[error("Character not found: {name}")]
    CharacterNotFound { name: String },

    /// Family tree does not exist in the store
    #[error("Family tree not found: {tree}")]
    FamilyTreeNotFound { tree: String },

    /// No relation edge between the two characters
    #[error("No relation between {from} and {to}")]
    RelationNotFound { from: String, to: String },

    /// Character exists but is not attached to the family tree
    #[error("Character {name} is not a member of family tree {tree}")]
    NotAMember { name: String, tree: String },

    // ===== Input =====
    /// Relation label outside the kinship/spousal vocabulary
    #[error("Invalid relation kind: {label}")]
    InvalidRelationKind { label: String },

    /// Entity already exists (CRUD layer helpers)
    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    // ===== Integrity =====
    /// A store read returned data that contradicts an engine invariant
    #[error("Inconsistent store state: {reason}")]
    InconsistentState { reason: String },

    // ===== Infrastructure =====
    /// Underlying store failure, propagated unchanged
    #[error("Store failure in {op}: {message}")]
    Store { op: String, message: String },

    /// Serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl LineageError {
    /// Build a store failure for the given primitive
    pub fn store(op: impl Into<String>, message: impl Into<String>) -> Self {
        LineageError::Store {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            LineageError::CharacterNotFound { .. }
            | LineageError::FamilyTreeNotFound { .. }
            | LineageError::RelationNotFound { .. }
            | LineageError::NotAMember { .. } => ExErrorKind::NotFound,
            LineageError::InvalidRelationKind { .. } => ExErrorKind::InvalidInput,
            LineageError::AlreadyExists { .. } => ExErrorKind::AlreadyExists,
            LineageError::InconsistentState { .. } => ExErrorKind::InvariantViolation,
            LineageError::Store { .. } => ExErrorKind::Persistence,
            LineageError::Serialization { .. } => ExErrorKind::Serialization,
        }
    }

    /// True for not-found / bad-input conditions the caller can act on
    pub fn is_precondition(&self) -> bool {
        self.kind().is_precondition()
    }
}

/// Conversion from LineageError to the canonical ExError
impl From<LineageError> for ExError {
    fn from(err: LineageError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            LineageError::CharacterNotFound { name } => ExError::new(kind)
                .with_character(name)
                .with_message(message),

            LineageError::FamilyTreeNotFound { tree } => {
                ExError::new(kind).with_tree(tree).with_message(message)
            }

            LineageError::RelationNotFound { from, .. } => ExError::new(kind)
                .with_character(from)
                .with_message(message),

            LineageError::NotAMember { name, tree } => ExError::new(kind)
                .with_character(name)
                .with_tree(tree)
                .with_message(message),

            LineageError::Store { op, .. } => {
                ExError::new(kind).with_op(op).with_message(message)
            }

            LineageError::InvalidRelationKind { .. }
            | LineageError::AlreadyExists { .. }
            | LineageError::InconsistentState { .. }
            | LineageError::Serialization { .. } => ExError::new(kind).with_message(message),
        }
    }
}

impl From<serde_json::Error> for LineageError {
    fn from(err: serde_json::Error) -> Self {
        LineageError::Serialization {
            message: err.to_string(),
        }
    }
}
