//! Error Classification
//!
//! Maps an error's name and message onto a category and severity by
//! case-insensitive keyword matching.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

// == Severity ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

// == Category ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Database,
    Validation,
    Network,
    Authentication,
    Authorization,
    BusinessLogic,
    System,
    UserInput,
}

impl ErrorCategory {
    /// Categories whose failures are usually transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Database | ErrorCategory::Network)
    }

    fn default_severity(&self) -> ErrorSeverity {
        match self {
            ErrorCategory::Database
            | ErrorCategory::Authentication
            | ErrorCategory::Authorization => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::System | ErrorCategory::BusinessLogic => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Validation | ErrorCategory::UserInput => ErrorSeverity::Low,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Database => "database",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Network => "network",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::BusinessLogic => "business_logic",
            ErrorCategory::System => "system",
            ErrorCategory::UserInput => "user_input",
        };
        f.write_str(name)
    }
}

// Checked in order; authorization precedes authentication because
// "unauthorized" contains "auth".
const CATEGORY_KEYWORDS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Authorization,
        &["unauthorized", "forbidden", "permission", "access denied", "not allowed"],
    ),
    (
        ErrorCategory::Authentication,
        &[
            "auth",
            "jwt",
            "invalid token",
            "token expired",
            "expired token",
            "credential",
            "login",
            "session expired",
        ],
    ),
    (
        ErrorCategory::Database,
        &["database", "supabase", "postgres", "pgrst", "sql", "relation", "query", "constraint"],
    ),
    (
        ErrorCategory::Network,
        &["network", "fetch", "timeout", "timed out", "connection", "econnrefused", "dns", "socket"],
    ),
    (
        ErrorCategory::Validation,
        &["validation", "invalid", "required", "schema"],
    ),
    (
        ErrorCategory::UserInput,
        &["input", "parse", "format", "malformed", "unexpected token", "syntax"],
    ),
    (
        ErrorCategory::BusinessLogic,
        &["business", "rule", "limit exceeded", "insufficient"],
    ),
];

const CRITICAL_KEYWORDS: &[&str] = &["fatal", "critical", "out of memory", "panic", "corrupt"];

// == Classify ==
/// Classifies an error by its name and message.
///
/// Falls back to `System` when no keyword matches. Severity follows the
/// category unless the text carries a critical keyword.
pub fn classify(name: &str, message: &str) -> (ErrorSeverity, ErrorCategory) {
    let haystack = format!("{} {}", name, message).to_lowercase();

    let category = CATEGORY_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| haystack.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(ErrorCategory::System);

    let severity = if CRITICAL_KEYWORDS.iter().any(|w| haystack.contains(w)) {
        ErrorSeverity::Critical
    } else {
        category.default_severity()
    };

    (severity, category)
}

// == Captured Error ==
/// Snapshot of an error: type name, message and cause chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedError {
    pub name: String,
    pub message: String,
    /// `source()` chain, outermost first, one cause per line
    pub stack: Option<String>,
}

impl CapturedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Captures a Rust error; the name is the last path segment of its type.
    pub fn from_error<E: StdError + 'static>(error: &E) -> Self {
        let full = std::any::type_name::<E>();
        let name = full
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or(full);

        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            name: name.to_string(),
            message: error.to_string(),
            stack: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }

    pub fn classify(&self) -> (ErrorSeverity, ErrorCategory) {
        classify(&self.name, &self.message)
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}
