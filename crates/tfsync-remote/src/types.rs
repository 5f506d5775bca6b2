//! Wire types for the transformations API
//!
//! All payloads are camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A transformation as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub id: String,
    #[serde(default)]
    pub version_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    /// Import names of the libraries this transformation uses
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub workspace_id: String,
    /// Local declared ID when the resource is managed by a project
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

/// A transformation library as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationLibrary {
    pub id: String,
    #[serde(default)]
    pub version_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub import_name: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_id: String,
}

/// Body for creating or updating a transformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationRequest {
    pub name: String,
    pub description: String,
    pub code: String,
    pub language: String,
    pub external_id: String,
}

/// Body for creating or updating a library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRequest {
    pub name: String,
    pub description: String,
    pub code: String,
    pub language: String,
    pub external_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransformationList {
    #[serde(default)]
    pub(crate) transformations: Vec<Transformation>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LibraryList {
    #[serde(default)]
    pub(crate) libraries: Vec<TransformationLibrary>,
}

/// One test case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub input: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationTestInput {
    pub version_id: String,
    pub test_suite: Vec<TestDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTestInput {
    pub version_id: String,
}

/// Ephemeral test run across unpublished versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchTestRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<TransformationTestInput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryTestInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishTransformation {
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_suite: Vec<TestDefinition>,
}

/// Marks staged versions live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchPublishRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<PublishTransformation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryTestInput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestRunStatus {
    #[default]
    Pass,
    Fail,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,
}

/// Result of one test case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: TestRunStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actual_output: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<TestError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuiteRunResult {
    pub status: TestRunStatus,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

/// Result for one transformation's suite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationTestResult {
    pub id: String,
    pub name: String,
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    pub pass: bool,
    #[serde(rename = "testResult", default)]
    pub test_suite_result: TestSuiteRunResult,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Compile check result for a library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTestResult {
    pub handle_name: String,
    pub version_id: String,
    pub pass: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<TransformationTestResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTestResponse {
    pub pass: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub validation_output: ValidationOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPublishResponse {
    pub published: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub validation_output: ValidationOutput,
}
