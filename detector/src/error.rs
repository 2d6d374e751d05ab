// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Request-path fault taxonomy
//!
//! Four kinds of failure can reach a caller:
//! - `Validation`: the input is empty or whitespace-only
//! - `ArtifactUnavailable`: the vocabulary/classifier are not loaded
//! - `Inference`: the classifier failed or produced an unusable score
//! - `InvalidTarget`: an unknown counterfactual target was requested
//!
//! "No indicator found" and "label did not flip" are outcomes, not faults.

use thiserror::Error;

/// Shared `Result` alias for request-path operations.
pub type Result<T> = std::result::Result<T, DetectorError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("invalid input: {details}")]
    Validation { details: String },

    #[error("model artifacts unavailable: {details}")]
    ArtifactUnavailable { details: String },

    #[error("inference failed: {details}")]
    Inference { details: String },

    #[error("unknown counterfactual target '{value}' (expected flip, real or fake)")]
    InvalidTarget { value: String },
}

impl DetectorError {
    pub fn validation(details: impl Into<String>) -> Self {
        Self::Validation {
            details: details.into(),
        }
    }

    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::ArtifactUnavailable {
            details: details.into(),
        }
    }

    pub fn inference(details: impl Into<String>) -> Self {
        Self::Inference {
            details: details.into(),
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::ArtifactUnavailable { .. } => "artifact_unavailable",
            Self::Inference { .. } => "inference",
            Self::InvalidTarget { .. } => "invalid_target",
        }
    }

    /// HTTP status a transport layer should answer with
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::InvalidTarget { .. } => 422,
            Self::ArtifactUnavailable { .. } => 503,
            Self::Inference { .. } => 500,
        }
    }

    /// Whether the caller can fix the request and try again
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidTarget { .. })
    }
}
