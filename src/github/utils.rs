// JSON payload helpers.

use serde_json::Value;

use crate::error::{ProdevError, Result};

/// Walk `path` through nested JSON objects.
///
/// Fails with `MissingKey` naming the first key that is absent or whose
/// parent is not an object.
pub fn access_nested_map<'a>(map: &'a Value, path: &[&str]) -> Result<&'a Value> {
    path.iter().try_fold(map, |current, key| {
        current
            .as_object()
            .and_then(|object| object.get(*key))
            .ok_or_else(|| ProdevError::MissingKey((*key).to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_nested_map() {
        let cases = [
            (json!({"a": 1}), vec!["a"], json!(1)),
            (json!({"a": {"b": 2}}), vec!["a"], json!({"b": 2})),
            (json!({"a": {"b": 2}}), vec!["a", "b"], json!(2)),
        ];

        for (map, path, expected) in cases {
            assert_eq!(access_nested_map(&map, &path).unwrap(), &expected);
        }
    }

    #[test]
    fn test_access_nested_map_missing() {
        let cases = [
            (json!({}), vec!["a"], "a"),
            (json!({"a": 1}), vec!["a", "b"], "b"),
        ];

        for (map, path, missing) in cases {
            match access_nested_map(&map, &path) {
                Err(ProdevError::MissingKey(key)) => assert_eq!(key, missing),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_path_returns_root() {
        let map = json!({"a": 1});
        assert_eq!(access_nested_map(&map, &[]).unwrap(), &map);
    }
}
