//! Test input resolution
//!
//! Fixture layout for a suite with `input: fixtures` and `output: expected`:
//!
//! ```text
//! fixtures/*.json                  common inputs
//! fixtures/<id>/input/*.json       inputs for transformation <id>, override common
//! expected/*.json                  expected outputs, matched by filename
//! expected/<id>/output/*.json      expected outputs for <id>, override common
//! ```
//!
//! With no suites, or no fixture files at all, a single `default-events`
//! test built from [`default_events`] is returned.

use crate::default_events::default_events;
use crate::error::FixtureError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tfsync_graph::{TestSuite, TransformationResource};
use tfsync_remote::TestDefinition;

/// Name of the synthetic test built from the sample-event catalogue
pub const DEFAULT_EVENTS_TEST: &str = "default-events";

const JSON_EXT: &str = ".json";

/// Resolve every test definition for `transformation`.
///
/// # Errors
///
/// Fails on unreadable directories or files and on malformed JSON; the
/// error names the suite and the file.
pub fn resolve_test_definitions(
    transformation: &TransformationResource,
) -> Result<Vec<TestDefinition>, FixtureError> {
    if transformation.tests.is_empty() {
        tracing::warn!(
            transformation = %transformation.id,
            "no test suites defined, using default events"
        );
        return Ok(vec![default_test_definition()]);
    }

    let mut definitions = Vec::new();
    for suite in &transformation.tests {
        let defs = suite_definitions(suite, &transformation.id).map_err(|e| FixtureError::Suite {
            suite: suite.name.clone(),
            source: Box::new(e),
        })?;
        definitions.extend(defs);
    }

    if definitions.is_empty() {
        tracing::warn!(
            transformation = %transformation.id,
            "no test fixtures found, using default events"
        );
        return Ok(vec![default_test_definition()]);
    }

    tracing::debug!(
        transformation = %transformation.id,
        count = definitions.len(),
        "resolved test definitions"
    );
    Ok(definitions)
}

/// The `default-events` test: every sample event, no expected output
#[must_use]
pub fn default_test_definition() -> TestDefinition {
    TestDefinition {
        name: DEFAULT_EVENTS_TEST.to_string(),
        input: default_events().into_values().collect(),
        ..TestDefinition::default()
    }
}

fn suite_definitions(
    suite: &TestSuite,
    transformation_id: &str,
) -> Result<Vec<TestDefinition>, FixtureError> {
    let Some(input_dir) = resolve_dir(&suite.spec_dir, &suite.input) else {
        return Ok(Vec::new());
    };
    let inputs = merge_files(&input_dir, &input_dir.join(transformation_id).join("input"))?;
    if inputs.is_empty() {
        tracing::debug!(suite = %suite.name, transformation = transformation_id, "no input files");
        return Ok(Vec::new());
    }

    let outputs = match suite
        .output
        .as_deref()
        .and_then(|o| resolve_dir(&suite.spec_dir, o))
    {
        Some(dir) => merge_files(&dir, &dir.join(transformation_id).join("output"))?,
        None => BTreeMap::new(),
    };

    inputs
        .iter()
        .map(|(filename, path)| -> Result<TestDefinition, FixtureError> {
            let expected_output = outputs.get(filename).map(|p| parse_json_file(p)).transpose()?;
            Ok(TestDefinition {
                name: format!("{}({})", suite.name, path.display()),
                input: parse_json_file(path)?,
                expected_output,
                ..TestDefinition::default()
            })
        })
        .collect()
}

/// Empty paths resolve to nothing; relative paths join onto `base`
fn resolve_dir(base: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(base.join(path))
    }
}

/// Common files overlaid with specific files, by filename
fn merge_files(common: &Path, specific: &Path) -> Result<BTreeMap<String, PathBuf>, FixtureError> {
    let mut merged = list_json_files(common)?;
    merged.extend(list_json_files(specific)?);
    Ok(merged)
}

/// `*.json` files directly inside `dir`; a missing directory yields none
fn list_json_files(dir: &Path) -> Result<BTreeMap<String, PathBuf>, FixtureError> {
    if !dir.is_dir() {
        return Ok(BTreeMap::new());
    }
    let list_err = |source| FixtureError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = BTreeMap::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if entry.file_type().map_err(list_err)?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase().ends_with(JSON_EXT) {
            files.insert(name, entry.path());
        }
    }
    Ok(files)
}

/// Parse a fixture file; a single non-array value becomes a one-element array
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid JSON.
pub fn parse_json_file(path: &Path) -> Result<Vec<Value>, FixtureError> {
    let data = std::fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_slice(&data).map_err(|source| FixtureError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match value {
        Value::Array(events) => events,
        single => vec![single],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, body: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    fn with_suite(suite: TestSuite) -> TransformationResource {
        TransformationResource::new("t1", "T1", "code").with_test(suite)
    }

    #[test]
    fn no_suites_uses_default_events() {
        let t = TransformationResource::new("t1", "T1", "code");
        let defs = resolve_test_definitions(&t).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, DEFAULT_EVENTS_TEST);
        assert_eq!(defs[0].input.len(), 4);
        assert!(defs[0].expected_output.is_none());
    }

    #[test]
    fn missing_input_dir_falls_back_to_default_events() {
        let tmp = TempDir::new().unwrap();
        let t = with_suite(TestSuite::new("suite", "missing").with_spec_dir(tmp.path()));
        let defs = resolve_test_definitions(&t).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, DEFAULT_EVENTS_TEST);
    }

    #[test]
    fn single_object_becomes_one_element_array() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/one.json", r#"{"type":"track"}"#);
        write(tmp.path(), "in/many.JSON", r#"[{"type":"page"},{"type":"screen"}]"#);
        write(tmp.path(), "in/notes.txt", "ignored");

        let t = with_suite(TestSuite::new("suite", "in").with_spec_dir(tmp.path()));
        let defs = resolve_test_definitions(&t).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].input.len(), 2);
        assert_eq!(defs[1].input, vec![json!({"type": "track"})]);
    }

    #[test]
    fn test_names_include_suite_and_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/event.json", "[]");
        let t = with_suite(TestSuite::new("Suite", "in").with_spec_dir(tmp.path()));
        let defs = resolve_test_definitions(&t).unwrap();
        let expected = format!("Suite({})", tmp.path().join("in").join("event.json").display());
        assert_eq!(defs[0].name, expected);
    }

    #[test]
    fn specific_input_overrides_common() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/event.json", r#"[{"source":"common"}]"#);
        write(tmp.path(), "in/other.json", r#"[{"source":"common-other"}]"#);
        write(tmp.path(), "in/t1/input/event.json", r#"[{"source":"specific"}]"#);

        let t = with_suite(TestSuite::new("suite", "in").with_spec_dir(tmp.path()));
        let defs = resolve_test_definitions(&t).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].input, vec![json!({"source": "specific"})]);
        assert!(defs[0].name.contains("input"));
        assert_eq!(defs[1].input, vec![json!({"source": "common-other"})]);
    }

    #[test]
    fn expected_output_matched_by_filename() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/a.json", "[1]");
        write(tmp.path(), "in/b.json", "[2]");
        write(tmp.path(), "out/a.json", "[10]");
        write(tmp.path(), "out/t1/output/b.json", "[20]");

        let t = with_suite(
            TestSuite::new("suite", "in")
                .with_output("out")
                .with_spec_dir(tmp.path()),
        );
        let defs = resolve_test_definitions(&t).unwrap();
        assert_eq!(defs[0].expected_output, Some(vec![json!(10)]));
        assert_eq!(defs[1].expected_output, Some(vec![json!(20)]));
    }

    #[test]
    fn absolute_input_ignores_spec_dir() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "abs/e.json", "[]");
        let t = with_suite(TestSuite::new("suite", tmp.path().join("abs")).with_spec_dir("/nonexistent"));
        let defs = resolve_test_definitions(&t).unwrap();
        assert_ne!(defs[0].name, DEFAULT_EVENTS_TEST);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "in/broken.json", "{not json");
        let t = with_suite(TestSuite::new("suite", "in").with_spec_dir(tmp.path()));
        let err = resolve_test_definitions(&t).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("broken.json"), "{text}");
        assert!(text.contains("suite"), "{text}");
    }

    #[test]
    fn subdirectories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("in/nested.json")).unwrap();
        write(tmp.path(), "in/real.json", "[]");
        let files = list_json_files(&tmp.path().join("in")).unwrap();
        assert_eq!(files.keys().cloned().collect::<Vec<_>>(), vec!["real.json".to_string()]);
    }
}
