//! Aggregated outcome of a test run

use tfsync_remote::{LibraryTestResult, TestDefinition, TestRunStatus, TransformationTestResult};

/// A transformation result paired with the definitions that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformationTestWithDefinitions {
    /// Remote outcome for the transformation
    pub result: TransformationTestResult,
    /// Cases sent in the request, in request order
    pub definitions: Vec<TestDefinition>,
}

impl TransformationTestWithDefinitions {
    /// Definition sent under the case name `name`
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&TestDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// Per-case counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Cases that passed
    pub passed: usize,
    /// Cases whose output did not match
    pub failed: usize,
    /// Cases that raised an error
    pub errored: usize,
    /// Libraries whose compile check passed
    pub libraries_passed: usize,
    /// Libraries whose compile check failed
    pub libraries_failed: usize,
}

impl Summary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }
}

/// Everything a run reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestResults {
    /// Ordered by transformation URN
    pub transformations: Vec<TransformationTestWithDefinitions>,
    /// Library compile checks, without duplicates
    pub libraries: Vec<LibraryTestResult>,
}

impl TestResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty() && self.libraries.is_empty()
    }

    /// Whether any case failed or errored, or any result failed without cases
    #[must_use]
    pub fn has_failures(&self) -> bool {
        let transformation_failed = self.transformations.iter().any(|t| {
            let cases = &t.result.test_suite_result.results;
            if cases.is_empty() {
                !t.result.pass
            } else {
                cases.iter().any(|c| c.status != TestRunStatus::Pass)
            }
        });
        transformation_failed || self.libraries.iter().any(|l| !l.pass)
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for case in self
            .transformations
            .iter()
            .flat_map(|t| &t.result.test_suite_result.results)
        {
            match case.status {
                TestRunStatus::Pass => summary.passed += 1,
                TestRunStatus::Fail => summary.failed += 1,
                TestRunStatus::Error => summary.errored += 1,
            }
        }
        for lib in &self.libraries {
            if lib.pass {
                summary.libraries_passed += 1;
            } else {
                summary.libraries_failed += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfsync_remote::{TestResult, TestSuiteRunResult};

    fn transformation(statuses: &[TestRunStatus], pass: bool) -> TransformationTestWithDefinitions {
        TransformationTestWithDefinitions {
            result: TransformationTestResult {
                pass,
                test_suite_result: TestSuiteRunResult {
                    status: TestRunStatus::Pass,
                    results: statuses
                        .iter()
                        .map(|s| TestResult {
                            status: *s,
                            ..TestResult::default()
                        })
                        .collect(),
                },
                ..TransformationTestResult::default()
            },
            definitions: Vec::new(),
        }
    }

    #[test]
    fn all_passing_has_no_failures() {
        let results = TestResults {
            transformations: vec![transformation(&[TestRunStatus::Pass, TestRunStatus::Pass], true)],
            libraries: vec![LibraryTestResult {
                pass: true,
                ..LibraryTestResult::default()
            }],
        };
        assert!(!results.has_failures());
        let summary = results.summary();
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.libraries_passed, 1);
    }

    #[test]
    fn error_status_counts_as_failure() {
        let results = TestResults {
            transformations: vec![transformation(&[TestRunStatus::Pass, TestRunStatus::Error], true)],
            libraries: Vec::new(),
        };
        assert!(results.has_failures());
        assert_eq!(results.summary().errored, 1);
        assert_eq!(results.summary().total(), 2);
    }

    #[test]
    fn failed_result_without_cases_is_a_failure() {
        let results = TestResults {
            transformations: vec![transformation(&[], false)],
            libraries: Vec::new(),
        };
        assert!(results.has_failures());
    }

    #[test]
    fn failed_library_is_a_failure() {
        let results = TestResults {
            transformations: Vec::new(),
            libraries: vec![LibraryTestResult {
                pass: false,
                message: "syntax error".into(),
                ..LibraryTestResult::default()
            }],
        };
        assert!(results.has_failures());
        assert_eq!(results.summary().libraries_failed, 1);
    }

    #[test]
    fn definition_is_found_by_case_name() {
        let with_defs = TransformationTestWithDefinitions {
            definitions: vec![
                TestDefinition {
                    name: "a".into(),
                    ..TestDefinition::default()
                },
                TestDefinition {
                    name: "b".into(),
                    expected_output: Some(vec![serde_json::json!({"ok": true})]),
                    ..TestDefinition::default()
                },
            ],
            ..TransformationTestWithDefinitions::default()
        };
        assert!(with_defs.definition("b").is_some_and(|d| d.expected_output.is_some()));
        assert!(with_defs.definition("c").is_none());
    }
}
