//! # Error Handling for Search Requests
//!
//! Every failure surfaced by validation, compilation or execution of a search request
//! is a [`SearchError`]. Errors fall into two classes:
//!
//! - **Client errors** (422): the payload was rejected. The body carries a field-path
//!   keyed map of messages so callers can point at the offending input.
//! - **Server errors** (500): the resource is misconfigured, an operator slipped past
//!   validation, or the database failed. Details are logged with `tracing` and never
//!   sent to the caller.
//!
//! ```rust,ignore
//! async fn handler(State(db): State<DatabaseConnection>, Json(payload): Json<Value>)
//!     -> Result<Json<SearchResults<post::Model>>, SearchError>
//! {
//!     let config = SearchConfig::default();
//!     Ok(Json(PostResource::search(&db, &config, &payload).await?))
//! }
//! ```

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::allowed::DescriptorKind;
use crate::validation::ValidationErrors;

/// Errors produced while validating, compiling or running a search request.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// 422 - one or more request fields failed validation
    #[error("the given data was invalid ({} errors)", .0.len())]
    Validation(ValidationErrors),

    /// 422 - the filter tree nests deeper than the configured ceiling
    #[error("max nested depth {max} is exceeded (got {depth})")]
    NestedDepthExceeded { depth: usize, max: usize },

    /// 422 - the payload passed validation but could not be decoded
    #[error("malformed search request: {0}")]
    Malformed(#[source] serde_json::Error),

    /// 422 - a scope rejected the parameters it was given
    #[error("invalid arguments for scope '{name}': {reason}")]
    InvalidScopeArguments { name: String, reason: String },

    /// 500 - an operator reached the builder that the filter does not allow
    #[error("operator '{operator}' is not allowed for filter '{field}'")]
    OperatorNotAllowed { field: String, operator: String },

    /// 500 - an allowed filter is misconfigured
    #[error("invalid resource filter '{name}': {reason}")]
    InvalidResourceFilter { name: String, reason: String },

    /// 500 - an allowed scope is misconfigured
    #[error("invalid resource scope '{name}': {reason}")]
    InvalidResourceScope { name: String, reason: String },

    /// 500 - an allowed sort is misconfigured
    #[error("invalid resource sort '{name}': {reason}")]
    InvalidResourceSort { name: String, reason: String },

    /// 500 - a dotted path names a relation the resource does not define
    #[error("relation '{relation}' is not defined on resource '{resource}'")]
    UnknownRelation { resource: String, relation: String },

    /// 500 - the requested construct is not supported by the configured runtime
    #[error("{0}")]
    Unsupported(String),

    /// 500 - the query failed to execute
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl SearchError {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn operator_not_allowed(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::OperatorNotAllowed {
            field: field.into(),
            operator: operator.into(),
        }
    }

    pub fn invalid_filter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResourceFilter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_scope(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResourceScope {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_sort(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResourceSort {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create the configuration error matching a descriptor kind.
    pub fn misconfigured(kind: DescriptorKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        match kind {
            DescriptorKind::Filter => Self::invalid_filter(name, reason),
            DescriptorKind::Scope => Self::invalid_scope(name, reason),
            DescriptorKind::Sort => Self::invalid_sort(name, reason),
        }
    }

    pub fn invalid_scope_arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScopeArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_relation(resource: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::UnknownRelation {
            resource: resource.into(),
            relation: relation.into(),
        }
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Whether the caller's payload is at fault (as opposed to configuration or storage).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NestedDepthExceeded { .. }
                | Self::Malformed(_)
                | Self::InvalidScopeArguments { .. }
        )
    }

    /// Field-path keyed messages, when the error can be attributed to request fields.
    #[must_use]
    pub fn field_errors(&self) -> Option<BTreeMap<String, Vec<String>>> {
        match self {
            Self::Validation(errors) => Some(errors.to_map()),
            Self::NestedDepthExceeded { .. } => {
                Some(BTreeMap::from([("filters".to_string(), vec![self.user_message()])]))
            }
            Self::InvalidScopeArguments { .. } => {
                Some(BTreeMap::from([("scopes".to_string(), vec![self.user_message()])]))
            }
            _ => None,
        }
    }

    /// Message safe to send to callers.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "The given data was invalid.".to_string(),
            Self::NestedDepthExceeded { max, .. } => format!("Max nested depth {max} is exceeded"),
            Self::Malformed(_) => "The search request could not be decoded.".to_string(),
            Self::InvalidScopeArguments { name, reason } => {
                format!("Invalid parameters for scope '{name}': {reason}")
            }
            Self::Database(_) => "A database error occurred".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    fn log(&self) {
        if self.is_client_error() {
            tracing::debug!(error = %self, status = %self.status_code(), "search request rejected");
        } else if let Self::Database(internal) = self {
            tracing::error!(error = ?internal, "database error while searching");
        } else {
            tracing::error!(error = %self, "search resource misconfigured");
        }
    }
}

/// Error body sent to callers.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        self.log();

        let body = ErrorResponse {
            error: self.user_message(),
            errors: self.field_errors(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
