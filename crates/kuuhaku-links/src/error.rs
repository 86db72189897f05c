//! Link subsystem error types.

use thiserror::Error;

/// Errors from the rule store, editor and rewriter.
#[derive(Error, Debug)]
pub enum LinkError {
    /// No rule at the given row.
    #[error("no rule at row {0}")]
    RowOutOfRange(usize),

    /// The test harness was given nothing to convert.
    #[error("テスト用URLを入力してください")]
    EmptyTestUrl,

    /// The grant does not cover saving the rule list.
    #[error("grant for '{0}' cannot save affiliate links")]
    WrongGrant(String),

    /// Option storage failed.
    #[error("option store error: {0}")]
    Options(#[from] kuuhaku_options::OptionsError),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
