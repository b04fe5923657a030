use crate::value::VarType;

/// Alias for `Result<T, BagError>`.
pub type BagResult<T> = Result<T, BagError>;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors reported by a [`VariableBag`](crate::bag::VariableBag).
///
/// None of these are fatal to the runtime: callers treat them as
/// "property not applicable" and move on to the next property.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BagError {
    /// The named variable set does not exist in the bag.
    #[error("unknown variable set \"{0}\"")]
    UnknownSet(String),

    /// The variable is not declared in the given set.
    #[error("unknown variable \"{set}.{name}\"")]
    UnknownVariable {
        /// Variable set name.
        set: String,
        /// Variable name.
        name: String,
    },

    /// The variable exists with a different type than the one requested.
    #[error("type mismatch for \"{set}.{name}\": expected {expected}, found {found}")]
    TypeMismatch {
        /// Variable set name.
        set: String,
        /// Variable name.
        name: String,
        /// The type the caller asked for or tried to write.
        expected: VarType,
        /// The type actually declared.
        found: VarType,
    },

    /// The engine binding itself failed.
    #[error("narrative engine error: {0}")]
    Engine(String),
}

/// Errors that can occur when loading core data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed JSON input.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed validation.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
