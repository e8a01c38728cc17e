//! Unified error types for the booking engine.
//!
//! Every operation returns [`Result`]. Business-rule failures are detected before any
//! mutation; storage failures surface as [`Error::PersistenceFailure`]. Callers that need a
//! transport-neutral answer use [`Error::to_rejection`].

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Records the engine can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// An experience (missing or inactive)
    Experience,
    /// A slot (missing or attached to another experience)
    Slot,
    /// A booking reference
    Booking,
    /// A customer, looked up by email
    User,
    /// A promo code (missing or inactive)
    PromoCode,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Experience => "Experience",
            Self::Slot => "Slot",
            Self::Booking => "Booking",
            Self::User => "User",
            Self::PromoCode => "Promo code",
        };
        f.write_str(name)
    }
}

/// All failures the engine can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{resource} not found: {key}")]
    NotFound { resource: Resource, key: String },

    #[error("Insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity { requested: i32, available: i32 },

    #[error("Slot {slot_id} has already started and can no longer be booked")]
    SlotExpired { slot_id: i64 },

    #[error("Promo code {code} has expired")]
    PromoExpired { code: String },

    #[error("Promo code {code} usage limit reached")]
    UsageLimitReached { code: String },

    #[error("Minimum purchase amount of {minimum} required")]
    BelowMinimum { minimum: Decimal },

    #[error("Booking reference conflict after {attempts} attempts, please try again")]
    ReferenceConflict { attempts: u32 },

    #[error("Database error: {0}")]
    PersistenceFailure(#[from] sea_orm::DbErr),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    InsufficientCapacity,
    SlotExpired,
    Expired,
    UsageLimitReached,
    BelowMinimum,
    ReferenceConflict,
    PersistenceFailure,
}

/// Structured rejection handed to whatever sits in front of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

const OPAQUE_FAILURE_MESSAGE: &str = "The request could not be completed, please try again later";

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientCapacity { .. } => ErrorKind::InsufficientCapacity,
            Self::SlotExpired { .. } => ErrorKind::SlotExpired,
            Self::PromoExpired { .. } => ErrorKind::Expired,
            Self::UsageLimitReached { .. } => ErrorKind::UsageLimitReached,
            Self::BelowMinimum { .. } => ErrorKind::BelowMinimum,
            Self::ReferenceConflict { .. } => ErrorKind::ReferenceConflict,
            Self::PersistenceFailure(_) | Self::Config { .. } => ErrorKind::PersistenceFailure,
        }
    }

    /// Only a reference collision is safe to retry without caller changes.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ReferenceConflict { .. })
    }

    pub(crate) fn not_found(resource: Resource, key: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    /// Converts the error into a caller-facing rejection.
    ///
    /// Internal failures are logged here with their full diagnostic text and replaced by an
    /// opaque message.
    #[must_use]
    pub fn to_rejection(&self) -> Rejection {
        let kind = self.kind();
        let message = match self {
            Self::PersistenceFailure(_) | Self::Config { .. } => {
                error!(error = %self, "Internal failure while handling request");
                OPAQUE_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        Rejection {
            kind,
            message,
            retryable: self.is_retryable(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string);
                    format!("{field}: {msg}")
                })
            })
            .collect();
        messages.sort();

        let message = if messages.is_empty() {
            "Validation failed".to_string()
        } else {
            messages.join("; ")
        };

        Self::InvalidRequest { message }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
