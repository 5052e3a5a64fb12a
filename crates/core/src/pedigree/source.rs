//! Upstream pedigree sources and the fetch-wrapping analysis entry point.
//!
//! Sources report failures as a structured [`FetchError`]. Sources that can
//! only produce free text go through [`FetchError::from_message`], which
//! classifies by substring and is a best-effort heuristic only.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::error::PedigreeError;
use crate::types::Generation;

use super::frequency::{prominent_ancestors, FrequencyEntry};
use super::node::AncestorNode;
use super::registry::Registry;

/// Why a pedigree could not be fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Pedigree not found")]
    NotFound,

    #[error("You are not authorized to view this pedigree")]
    Forbidden,

    #[error("You must be logged in to view this pedigree")]
    Unauthenticated,

    #[error("Failed to load pedigree: {0}")]
    Server(String),
}

impl FetchError {
    /// HTTP-like status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            FetchError::NotFound => 404,
            FetchError::Forbidden => 403,
            FetchError::Unauthenticated => 401,
            FetchError::Server(_) => 500,
        }
    }

    /// Classify a free-text error message.
    ///
    /// Checked in order: not found (404), forbidden (403), unauthenticated
    /// (401). Anything else is a server error carrying the message. A
    /// message that mentions e.g. "404" for unrelated reasons is
    /// misclassified.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if mentions(&["404", "not found"]) {
            FetchError::NotFound
        } else if mentions(&["403", "forbidden", "not authorized"]) {
            FetchError::Forbidden
        } else if mentions(&["401", "unauthorized", "unauthenticated", "not authenticated"]) {
            FetchError::Unauthenticated
        } else {
            FetchError::Server(message.to_string())
        }
    }
}

impl From<PedigreeError> for FetchError {
    fn from(e: PedigreeError) -> Self {
        match e {
            PedigreeError::AnimalNotFound(_) => FetchError::NotFound,
            other => FetchError::Server(other.to_string()),
        }
    }
}

/// Anything that can produce the pedigree tree of a rabbit.
pub trait PedigreeSource {
    /// Fetch the pedigree of `id` with up to `generations` generations of
    /// ancestors.
    fn fetch_pedigree(
        &self,
        id: &str,
        generations: Generation,
    ) -> Result<AncestorNode, FetchError>;
}

impl<F> PedigreeSource for F
where
    F: Fn(&str, Generation) -> Result<AncestorNode, FetchError>,
{
    fn fetch_pedigree(
        &self,
        id: &str,
        generations: Generation,
    ) -> Result<AncestorNode, FetchError> {
        self(id, generations)
    }
}

impl PedigreeSource for Registry {
    fn fetch_pedigree(
        &self,
        id: &str,
        generations: Generation,
    ) -> Result<AncestorNode, FetchError> {
        self.validate()?;
        Ok(self.ancestor_tree(id, generations)?)
    }
}

/// Discriminated outcome of a fetch-wrapping operation.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "status": 404}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure { error: String, status: u16 },
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    /// The payload of a successful result.
    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Failure { .. } => None,
        }
    }
}

impl<T> From<Result<T, FetchError>> for ActionResult<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => ActionResult::Success(data),
            Err(e) => ActionResult::Failure {
                error: e.to_string(),
                status: e.status(),
            },
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Success(data) => {
                let mut state = serializer.serialize_struct("ActionResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            ActionResult::Failure { error, status } => {
                let mut state = serializer.serialize_struct("ActionResult", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.serialize_field("status", status)?;
                state.end()
            }
        }
    }
}

/// Fetch the pedigree of `id` from `source` and rank its ancestors.
///
/// Fetch failures are returned as [`ActionResult::Failure`], never as a
/// Rust error.
pub fn fetch_prominent_ancestors<S: PedigreeSource + ?Sized>(
    source: &S,
    id: &str,
    generations: Generation,
) -> ActionResult<Vec<FrequencyEntry>> {
    let result = source.fetch_pedigree(id, generations).map(|root| prominent_ancestors(&root));
    if let Err(e) = &result {
        log::warn!("Could not fetch pedigree of '{}': {} ({})", id, e, e.status());
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(message: &'static str) -> impl Fn(&str, Generation) -> Result<AncestorNode, FetchError> {
        move |_: &str, _: Generation| Err(FetchError::from_message(message))
    }

    #[test]
    fn test_from_message_classification() {
        assert_eq!(FetchError::from_message("HTTP 404: no such rabbit"), FetchError::NotFound);
        assert_eq!(FetchError::from_message("Pedigree Not Found"), FetchError::NotFound);
        assert_eq!(FetchError::from_message("403 Forbidden"), FetchError::Forbidden);
        assert_eq!(FetchError::from_message("User not authorized"), FetchError::Forbidden);
        assert_eq!(FetchError::from_message("401 Unauthorized"), FetchError::Unauthenticated);
        assert_eq!(
            FetchError::from_message("connection reset"),
            FetchError::Server("connection reset".to_string())
        );
    }

    #[test]
    fn test_from_message_is_best_effort() {
        // An unrelated "404" still reads as not found.
        assert_eq!(
            FetchError::from_message("timeout after 404 ms"),
            FetchError::NotFound
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FetchError::NotFound.status(), 404);
        assert_eq!(FetchError::Forbidden.status(), 403);
        assert_eq!(FetchError::Unauthenticated.status(), 401);
        assert_eq!(FetchError::Server("x".into()).status(), 500);
    }

    #[test]
    fn test_fetch_success_ranks_ancestors() {
        let source = |id: &str, _: Generation| -> Result<AncestorNode, FetchError> {
            Ok(AncestorNode::new(id)
                .with_father(AncestorNode::new("S").with_father(AncestorNode::new("G")))
                .with_mother(AncestorNode::new("D").with_father(AncestorNode::new("G"))))
        };
        let result = fetch_prominent_ancestors(&source, "R", 3);
        assert!(result.is_success());
        let data = result.data().unwrap();
        assert_eq!(data[0].id, "G");
        assert_eq!(data[0].occurrences, 2);
    }

    #[test]
    fn test_fetch_failure_is_discriminated() {
        let result = fetch_prominent_ancestors(&failing("403 Forbidden"), "R", 3);
        assert_eq!(
            result,
            ActionResult::Failure {
                error: "You are not authorized to view this pedigree".to_string(),
                status: 403,
            }
        );
    }

    #[test]
    fn test_registry_source() {
        let registry = Registry::from_triples(&[
            ("1".to_string(), None, None),
            ("2".to_string(), Some("1".to_string()), None),
        ])
        .unwrap();
        let found = fetch_prominent_ancestors(&registry, "2", 3);
        assert_eq!(found.data().unwrap().len(), 1);

        let missing = fetch_prominent_ancestors(&registry, "9", 3);
        assert!(matches!(missing, ActionResult::Failure { status: 404, .. }));
    }

    #[test]
    fn test_invalid_registry_is_server_error() {
        let registry = Registry::from_triples(&[("1".to_string(), Some("1".to_string()), None)]).unwrap();
        let result = fetch_prominent_ancestors(&registry, "1", 3);
        assert!(matches!(result, ActionResult::Failure { status: 500, .. }));
    }

    #[test]
    fn test_serialize_action_result() {
        let ok: ActionResult<Vec<u32>> = ActionResult::Success(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "success": true, "data": [1, 2] })
        );

        let err: ActionResult<Vec<u32>> = Err(FetchError::Unauthenticated).into();
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "success": false,
                "error": "You must be logged in to view this pedigree",
                "status": 401
            })
        );
    }
}
