use serde_json::Value;

use crate::report::error::ParseError;

// ============================================================================
// Fixed extraction paths in an Apifox JSON report
// ============================================================================

pub const SUITE_NAME: &str = "collection.name";
pub const REPORT_URL: &str = "collection.testReportInfoUrlPath";
pub const STATS_TOTAL: &str = "result.stats.requests.total";
pub const STATS_FAILED: &str = "result.stats.requests.failed";
pub const STEPS: &str = "result.steps";
pub const FAILURES: &str = "result.failures";

/// Display name used when a report carries no collection name.
pub const UNNAMED_SUITE: &str = "None";

/// Walk a dotted object path. Returns `None` for absent keys, JSON `null`,
/// or a non-object somewhere along the way.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let found = path
        .split('.')
        .try_fold(root, |node, key| node.as_object()?.get(key))?;
    if found.is_null() { None } else { Some(found) }
}

/// Name of a JSON value's kind, for error messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a required non-negative integer.
pub fn require_count(root: &Value, path: &'static str) -> Result<u64, ParseError> {
    let value = lookup(root, path).ok_or(ParseError::Missing { path })?;
    value.as_u64().ok_or(ParseError::WrongType {
        path,
        expected: "non-negative integer",
        found: kind(value),
    })
}

// ============================================================================
// Report document view
// ============================================================================

/// Aggregate request counts of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub failed: u64,
}

/// One executed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub endpoint_path: &'a str,
}

/// One assertion-level failure, referencing a step by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureEntry<'a> {
    pub step_ref: Option<&'a str>,
    pub error_message: &'a str,
}

/// Typed read-only accessors over a decoded report.
///
/// Display-only fields (`suite_name`, `report_urls`, `steps`) are lenient and
/// never fail. Counts are strict. `failures` is strict about its container
/// shape but lenient per entry.
#[derive(Debug, Clone, Copy)]
pub struct ReportDocument<'a> {
    root: &'a Value,
}

impl<'a> ReportDocument<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn stats(&self) -> Result<Stats, ParseError> {
        Ok(Stats {
            total: require_count(self.root, STATS_TOTAL)?,
            failed: require_count(self.root, STATS_FAILED)?,
        })
    }

    pub fn suite_name(&self) -> &'a str {
        lookup(self.root, SUITE_NAME)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_SUITE)
    }

    /// A single string yields one URL, an array yields its string elements.
    pub fn report_urls(&self) -> Vec<String> {
        match lookup(self.root, REPORT_URL) {
            Some(Value::String(url)) => vec![url.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Steps that carry an id, a name and an endpoint path. Anything else is
    /// left out of the index rather than failing the report.
    pub fn steps(&self) -> Vec<Step<'a>> {
        let Some(items) = lookup(self.root, STEPS).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|step| {
                Some(Step {
                    id: lookup(step, "id")?.as_str()?,
                    name: lookup(step, "name")?.as_str()?,
                    endpoint_path: lookup(step, "metaInfo.httpApiPath")?.as_str()?,
                })
            })
            .collect()
    }

    /// Failure entries in report order. An absent list is empty; a list of
    /// the wrong type is an error.
    pub fn failures(&self) -> Result<Vec<FailureEntry<'a>>, ParseError> {
        let items = match lookup(self.root, FAILURES) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ParseError::WrongType {
                    path: FAILURES,
                    expected: "array",
                    found: kind(other),
                });
            }
        };
        Ok(items
            .iter()
            .map(|entry| FailureEntry {
                step_ref: lookup(entry, "cursor.ref").and_then(Value::as_str),
                error_message: lookup(entry, "error.message")
                    .and_then(Value::as_str)
                    .unwrap_or_default(),
            })
            .collect())
    }
}
