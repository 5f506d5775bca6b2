//! Human-readable run report

use serde_json::Value;
use tfsync_core::{Summary, TestResults, TransformationTestWithDefinitions};
use tfsync_remote::{TestResult, TestRunStatus};

fn status_label(status: TestRunStatus) -> &'static str {
    match status {
        TestRunStatus::Pass => "PASS",
        TestRunStatus::Fail => "FAIL",
        TestRunStatus::Error => "ERROR",
    }
}

/// One line per test case and library, then a summary line.
///
/// With `verbose`, failed and errored cases are followed by indented
/// expected output, actual output and every error.
#[must_use]
pub fn render(results: &TestResults, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for t in &results.transformations {
        let subject = if t.result.name.is_empty() {
            &t.result.version_id
        } else {
            &t.result.name
        };
        let cases = &t.result.test_suite_result.results;
        if cases.is_empty() {
            let label = if t.result.pass { "PASS" } else { "FAIL" };
            lines.push(with_message(format!("{label} {subject}"), &t.result.message));
        }
        for case in cases {
            let mut line = format!("{} {subject} :: {}", status_label(case.status), case.name);
            if let Some(err) = case.errors.first() {
                line = with_message(line, &err.message);
            }
            lines.push(line);
            if verbose && case.status != TestRunStatus::Pass {
                lines.extend(case_detail(t, case));
            }
        }
    }
    for lib in &results.libraries {
        let label = if lib.pass { "PASS" } else { "FAIL" };
        let subject = if lib.handle_name.is_empty() {
            &lib.version_id
        } else {
            &lib.handle_name
        };
        lines.push(with_message(format!("{label} library {subject}"), &lib.message));
    }
    lines.push(summary_line(&results.summary()));
    lines
}

fn case_detail(t: &TransformationTestWithDefinitions, case: &TestResult) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(expected) = t
        .definition(&case.name)
        .and_then(|d| d.expected_output.as_ref())
    {
        lines.push(format!("    expected: {}", Value::Array(expected.clone())));
    }
    lines.push(format!(
        "    actual:   {}",
        Value::Array(case.actual_output.clone())
    ));
    for err in &case.errors {
        match &err.event {
            Some(event) => lines.push(format!("    error: {} (event: {event})", err.message)),
            None => lines.push(format!("    error: {}", err.message)),
        }
    }
    lines
}

fn with_message(line: String, message: &str) -> String {
    if message.is_empty() {
        line
    } else {
        format!("{line}: {message}")
    }
}

#[must_use]
pub fn summary_line(summary: &Summary) -> String {
    format!(
        "{} passed, {} failed, {} errored; libraries: {} passed, {} failed",
        summary.passed,
        summary.failed,
        summary.errored,
        summary.libraries_passed,
        summary.libraries_failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tfsync_remote::{
        LibraryTestResult, TestDefinition, TestError, TestSuiteRunResult, TransformationTestResult,
    };

    #[test]
    fn renders_cases_libraries_and_summary() {
        let results = TestResults {
            transformations: vec![TransformationTestWithDefinitions {
                result: TransformationTestResult {
                    name: "Enrich".into(),
                    test_suite_result: TestSuiteRunResult {
                        status: TestRunStatus::Fail,
                        results: vec![
                            TestResult {
                                name: "default-events".into(),
                                status: TestRunStatus::Pass,
                                ..TestResult::default()
                            },
                            TestResult {
                                name: "smoke(in/a.json)".into(),
                                status: TestRunStatus::Fail,
                                errors: vec![TestError {
                                    message: "output mismatch".into(),
                                    event: None,
                                }],
                                ..TestResult::default()
                            },
                        ],
                    },
                    ..TransformationTestResult::default()
                },
                definitions: Vec::new(),
            }],
            libraries: vec![LibraryTestResult {
                handle_name: "helpers".into(),
                pass: true,
                ..LibraryTestResult::default()
            }],
        };

        assert_eq!(
            render(&results, false),
            vec![
                "PASS Enrich :: default-events".to_string(),
                "FAIL Enrich :: smoke (in/a.json): output mismatch".to_string(),
                "PASS library helpers".to_string(),
                "1 passed, 1 failed, 0 errored; libraries: 1 passed, 0 failed".to_string(),
            ]
        );
    }

    #[test]
    fn empty_run_is_just_a_summary() {
        assert_eq!(render(&TestResults::default(), true).len(), 1);
    }

    #[test]
    fn verbose_shows_expected_and_actual_for_failures() {
        let results = TestResults {
            transformations: vec![TransformationTestWithDefinitions {
                result: TransformationTestResult {
                    name: "Enrich".into(),
                    test_suite_result: TestSuiteRunResult {
                        status: TestRunStatus::Fail,
                        results: vec![
                            TestResult {
                                name: "smoke(in/a.json)".into(),
                                status: TestRunStatus::Fail,
                                actual_output: vec![json!({"type": "track"})],
                                ..TestResult::default()
                            },
                            TestResult {
                                name: "smoke(in/b.json)".into(),
                                status: TestRunStatus::Error,
                                errors: vec![TestError {
                                    message: "boom".into(),
                                    event: Some(json!({"type": "page"})),
                                }],
                                ..TestResult::default()
                            },
                            TestResult {
                                name: "smoke(in/c.json)".into(),
                                status: TestRunStatus::Pass,
                                actual_output: vec![json!({"type": "screen"})],
                                ..TestResult::default()
                            },
                        ],
                    },
                    ..TransformationTestResult::default()
                },
                definitions: vec![TestDefinition {
                    name: "smoke(in/a.json)".into(),
                    input: vec![json!({"type": "track"})],
                    expected_output: Some(vec![json!({"enriched": true})]),
                    ..TestDefinition::default()
                }],
            }],
            libraries: Vec::new(),
        };

        assert_eq!(
            render(&results, true),
            vec![
                "FAIL Enrich :: smoke(in/a.json)".to_string(),
                r#"    expected: [{"enriched":true}]"#.to_string(),
                r#"    actual:   [{"type":"track"}]"#.to_string(),
                "ERROR Enrich :: smoke(in/b.json): boom".to_string(),
                "    actual:   []".to_string(),
                r#"    error: boom (event: {"type":"page"})"#.to_string(),
                "PASS Enrich :: smoke(in/c.json)".to_string(),
                "1 passed, 1 failed, 1 errored; libraries: 0 passed, 0 failed".to_string(),
            ]
        );
    }
}
