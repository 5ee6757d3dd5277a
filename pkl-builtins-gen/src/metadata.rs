//! Metadata schema and per-fragment extraction from Pkl reflection output.
//!
//! The reflection script renders a module as JSON shaped like
//! `{"moduleClass": {"properties": {"<name>": {"annotations": [...]}}}}`.
//! Only the first declared property is inspected: by convention each
//! builtin fragment declares its builtin definition first.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Documentation metadata for one builtin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Name of the first property declared by the fragment.
    pub name: String,
    /// Documentation category, e.g. `Python`.
    #[serde(default)]
    pub category: String,
    /// Human-readable description of the builtin.
    #[serde(default)]
    pub description: String,
    /// Hints for detecting projects the builtin applies to.
    #[serde(default)]
    pub project_indicators: Vec<ProjectIndicator>,
}

/// A project detection hint, passed through without interpretation.
///
/// Indicators usually carry optional `file`, `glob` and `contains` strings,
/// but the element is kept exactly as reflected, including unknown keys,
/// `null` fields and non-object values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectIndicator(Value);

impl ProjectIndicator {
    /// Wraps a reflected indicator value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// The indicator exactly as reflected.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Exact path whose existence marks a project, when given as a string.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.string_field("file")
    }

    /// Glob that must match at least one file, when given as a string.
    #[must_use]
    pub fn glob(&self) -> Option<&str> {
        self.string_field("glob")
    }

    /// Text that `file` must contain, when given as a string.
    #[must_use]
    pub fn contains(&self) -> Option<&str> {
        self.string_field("contains")
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for ProjectIndicator {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Why a fragment produced no metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The reflection command could not be started.
    #[error("failed to run reflection: {0}")]
    Spawn(String),
    /// The reflection command outlived its deadline.
    #[error("reflection timed out after {0:?}")]
    Timeout(Duration),
    /// The reflection command exited unsuccessfully.
    #[error("reflection exited with status {code:?}: {stderr}")]
    NonZeroExit {
        /// Exit code, absent when killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// Standard output was not UTF-8.
    #[error("reflection output is not UTF-8")]
    InvalidUtf8,
    /// Standard output was not JSON.
    #[error("reflection output is not JSON: {0}")]
    InvalidJson(String),
    /// The JSON lacks a `moduleClass.properties` mapping.
    #[error("reflection output lacks moduleClass.properties")]
    MissingProperties,
    /// The module declares no properties.
    #[error("module declares no properties")]
    NoProperties,
    /// The first property could not be read.
    #[error("property `{0}` has malformed annotations")]
    MalformedProperty(String),
}

#[derive(Debug, Deserialize)]
struct ReflectedModule {
    #[serde(rename = "moduleClass")]
    module_class: Option<ReflectedClass>,
}

#[derive(Debug, Deserialize)]
struct ReflectedClass {
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct ReflectedProperty {
    #[serde(default)]
    annotations: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct Annotation {
    category: Option<Value>,
    description: Option<Value>,
    project_indicators: Option<Value>,
}

/// Builds a metadata entry from the reflection JSON of one fragment.
///
/// Annotations are applied in list order, so when several annotations set
/// the same field the last one wins. `category` and `description` are taken
/// only from string values and `project_indicators` from any list, whose
/// elements are kept verbatim; anything else leaves the field unchanged.
///
/// # Errors
///
/// Returns a [`SkipReason`] when the JSON is invalid or does not describe a
/// module with at least one readable property.
pub fn extract_entry(json: &str) -> Result<MetadataEntry, SkipReason> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| SkipReason::InvalidJson(err.to_string()))?;
    let module: ReflectedModule =
        serde_json::from_value(value).map_err(|_| SkipReason::MissingProperties)?;
    let properties = module
        .module_class
        .and_then(|class| class.properties)
        .ok_or(SkipReason::MissingProperties)?;
    let (name, raw_property) = properties.into_iter().next().ok_or(SkipReason::NoProperties)?;
    let property: ReflectedProperty = serde_json::from_value(raw_property)
        .map_err(|_| SkipReason::MalformedProperty(name.clone()))?;

    let mut entry = MetadataEntry {
        name,
        ..MetadataEntry::default()
    };
    for annotation in property
        .annotations
        .unwrap_or_default()
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|raw| serde_json::from_value::<Annotation>(raw).ok())
    {
        apply_annotation(&mut entry, annotation);
    }
    Ok(entry)
}

fn apply_annotation(entry: &mut MetadataEntry, annotation: Annotation) {
    if let Some(Value::String(category)) = annotation.category {
        entry.category = category;
    }
    if let Some(Value::String(description)) = annotation.description {
        entry.description = description;
    }
    match annotation.project_indicators {
        Some(Value::Array(indicators)) => {
            entry.project_indicators = indicators.into_iter().map(ProjectIndicator::new).collect();
        }
        Some(other) => {
            tracing::debug!(value = %other, "ignoring project indicators that are not a list");
        }
        None => {}
    }
}
