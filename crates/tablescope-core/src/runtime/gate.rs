// crates/tablescope-core/src/runtime/gate.rs
// ============================================================================
// Module: Tablescope Statement Gate
// Description: Classification of free-form statement text.
// Purpose: Route only SELECT statements to the read path.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The gate inspects the leading keyword of user-entered SQL. Statements
//! starting with `select` take the read path; a `select count(*)` prefix takes
//! the scalar summary path; everything else is a write. Only the leading
//! keyword is lower-cased so string literals keep their case.
//!
//! Security posture: statement text is untrusted. The gate chooses a path; it
//! does not sanitize. Reads run on read-only connections where the store
//! supports them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Leading keyword of read-only statements.
const READ_KEYWORD: &str = "select";
/// Prefix of the scalar count form.
const COUNT_PREFIX: &str = "select count(*)";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Execution path chosen for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementClass {
    /// Row-returning SELECT.
    Read,
    /// `SELECT COUNT(*)` summarized as one scalar.
    Count,
    /// Anything else, run without a result set.
    Write,
}

/// Result of gating a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedStatement {
    /// Chosen path.
    pub class: StatementClass,
    /// Trimmed text with only the leading keyword lower-cased.
    pub normalized_text: String,
}

impl StatementClass {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Count => "count",
            Self::Write => "write",
        }
    }
}

impl ClassifiedStatement {
    /// Returns true for the read and count paths.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.class, StatementClass::Read | StatementClass::Count)
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies raw statement text.
#[must_use]
pub fn classify_statement(raw: &str) -> ClassifiedStatement {
    let trimmed = raw.trim();
    let keyword_end = trimmed
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .unwrap_or(trimmed.len());
    let (keyword, rest) = trimmed.split_at(keyword_end);
    let keyword = keyword.to_ascii_lowercase();
    let class = if keyword != READ_KEYWORD {
        StatementClass::Write
    } else if trimmed
        .get(..COUNT_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(COUNT_PREFIX))
    {
        StatementClass::Count
    } else {
        StatementClass::Read
    };
    ClassifiedStatement {
        class,
        normalized_text: format!("{keyword}{rest}"),
    }
}
