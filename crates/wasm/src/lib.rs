//! DenBlå-Angora pedigree functions for the browser.
//!
//! Every function takes and returns JSON strings so it can sit behind a
//! thin JavaScript binding. Tree input is the pedigree payload returned by
//! the registry backend.

use serde::Serialize;

use denbla_pedigree_core::pedigree::{
    build_grid, flatten, max_depth, prominent_ancestors, ActionResult, AncestorNode, FetchError,
    FrequencyEntry,
};

/// Depth of a pedigree tree.
#[derive(Serialize)]
pub struct DepthOutput {
    pub depth: usize,
}

fn parse_tree(tree_json: &str) -> Result<Option<AncestorNode>, String> {
    serde_json::from_str(tree_json).map_err(|e| format!("JSON parse error: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("JSON serialize error: {}", e))
}

/// Flatten a pedigree (JSON tree, or `null`) into a pre-order list of
/// ancestor summaries.
pub fn flatten_json(tree_json: &str) -> Result<String, String> {
    let tree = parse_tree(tree_json)?;
    let summaries: Vec<_> = flatten(tree.as_ref()).iter().map(|n| n.summary()).collect();
    to_json(&summaries)
}

/// Number of generations in a pedigree (JSON tree, or `null`).
pub fn max_depth_json(tree_json: &str) -> Result<String, String> {
    let tree = parse_tree(tree_json)?;
    to_json(&DepthOutput {
        depth: max_depth(tree.as_ref()),
    })
}

/// Rank the ancestors of a pedigree.
///
/// Always returns an `ActionResult` document. `fetch_error` carries the
/// error message from a failed backend fetch; when present it is
/// classified into a status code and `tree_json` is ignored. A `null` tree
/// is an empty pedigree and succeeds with no entries.
pub fn prominent_ancestors_json(tree_json: &str, fetch_error: Option<&str>) -> String {
    let fetched: Result<Vec<FrequencyEntry>, FetchError> = match fetch_error {
        Some(message) => Err(FetchError::from_message(message)),
        None => match parse_tree(tree_json) {
            Ok(Some(tree)) => Ok(prominent_ancestors(&tree)),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(FetchError::Server(e)),
        },
    };
    let result = ActionResult::from(fetched);

    // An ActionResult of strings and numbers always serializes.
    to_json(&result).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":{:?},"status":500}}"#, e)
    })
}

/// Lay out a pedigree (JSON tree, or `null`) as a grid covering
/// `generations` generations above the subject.
pub fn build_grid_json(tree_json: &str, generations: usize) -> Result<String, String> {
    let tree = parse_tree(tree_json)?;
    let grid = build_grid(tree.as_ref(), generations.saturating_add(1))
        .map_err(|e| format!("Grid error: {}", e))?;
    to_json(&grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "id": "4977-2041",
        "nickname": "Hermine",
        "father": { "id": "1111-2222", "father": { "id": "3333-4444" } },
        "mother": { "id": "5555-6666", "father": { "id": "3333-4444" } }
    }"#;

    #[test]
    fn test_flatten_json() {
        let result = flatten_json(TREE).unwrap();
        let list: Vec<serde_json::Value> = serde_json::from_str(&result).unwrap();
        let ids: Vec<&str> = list.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["4977-2041", "1111-2222", "3333-4444", "5555-6666", "3333-4444"]);
    }

    #[test]
    fn test_flatten_json_null() {
        assert_eq!(flatten_json("null").unwrap(), "[]");
        assert_eq!(max_depth_json("null").unwrap(), r#"{"depth":0}"#);
    }

    #[test]
    fn test_max_depth_json() {
        assert_eq!(max_depth_json(TREE).unwrap(), r#"{"depth":3}"#);
    }

    #[test]
    fn test_prominent_ancestors_json_success() {
        let result: serde_json::Value =
            serde_json::from_str(&prominent_ancestors_json(TREE, None)).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["data"][0]["id"], "3333-4444");
        assert_eq!(result["data"][0]["occurrences"], 2);
    }

    #[test]
    fn test_prominent_ancestors_json_fetch_failure() {
        let result: serde_json::Value =
            serde_json::from_str(&prominent_ancestors_json("", Some("Request failed: 401"))).unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["status"], 401);
        assert!(result.get("data").is_none());
    }

    #[test]
    fn test_prominent_ancestors_json_null_tree_is_empty() {
        let result: serde_json::Value =
            serde_json::from_str(&prominent_ancestors_json("null", None)).unwrap();
        assert_eq!(result, serde_json::json!({ "success": true, "data": [] }));
    }

    #[test]
    fn test_prominent_ancestors_json_bad_payload() {
        let result: serde_json::Value =
            serde_json::from_str(&prominent_ancestors_json("{not json", None)).unwrap();
        assert_eq!(result["status"], 500);
    }

    #[test]
    fn test_build_grid_json() {
        let result: serde_json::Value =
            serde_json::from_str(&build_grid_json(TREE, 2).unwrap()).unwrap();
        assert_eq!(result["nRows"], 4);
        assert_eq!(result["nColumns"], 3);
        assert_eq!(result["rows"][0][2]["node"]["id"], "3333-4444");
        assert_eq!(result["rows"][1][2]["kind"], "empty");
    }

    #[test]
    fn test_build_grid_json_too_many_generations() {
        assert!(build_grid_json(TREE, 40).is_err());
    }
}
