use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ============================================================================
// Failure records: one per failing case name
// ============================================================================

/// Failure detail for one case name, merged across every failure entry that
/// resolved to that name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailureRecord {
    /// Collection the case belongs to
    pub suite_name: String,

    /// HTTP path under test
    pub endpoint_path: String,

    /// Error messages joined by `\n` in encounter order
    pub error_text: String,
}

impl FailureRecord {
    pub fn new(suite_name: &str, endpoint_path: &str, message: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            endpoint_path: endpoint_path.to_string(),
            error_text: message.to_string(),
        }
    }

    /// Append another message on a new line.
    pub fn append(&mut self, message: &str) {
        self.error_text.push('\n');
        self.error_text.push_str(message);
    }

    /// Error messages in the order they were recorded.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.error_text.split('\n')
    }
}

/// Case name → [`FailureRecord`], iterated in first-insertion order.
///
/// Recording a name that already exists appends to its error text and leaves
/// the suite name and endpoint path of the first occurrence in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureMap {
    entries: Vec<(String, FailureRecord)>,
    index: HashMap<String, usize>,
}

impl FailureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, case_name: &str) -> Option<&FailureRecord> {
        self.index.get(case_name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, case_name: &str) -> bool {
        self.index.contains_key(case_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FailureRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn case_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Record one failure occurrence for `case_name`.
    pub fn record(&mut self, case_name: &str, suite_name: &str, endpoint_path: &str, message: &str) {
        match self.index.get(case_name) {
            Some(&i) => self.entries[i].1.append(message),
            None => self.insert_new(
                case_name.to_string(),
                FailureRecord::new(suite_name, endpoint_path, message),
            ),
        }
    }

    /// Fold another map into this one using the same append rule as `record`.
    pub fn merge(&mut self, other: FailureMap) {
        for (case_name, record) in other.entries {
            match self.index.get(&case_name) {
                Some(&i) => self.entries[i].1.append(&record.error_text),
                None => self.insert_new(case_name, record),
            }
        }
    }

    fn insert_new(&mut self, case_name: String, record: FailureRecord) {
        self.index.insert(case_name.clone(), self.entries.len());
        self.entries.push((case_name, record));
    }
}

impl Serialize for FailureMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (case_name, record) in &self.entries {
            map.serialize_entry(case_name, record)?;
        }
        map.end()
    }
}

// ============================================================================
// Parsed report: the derived result of one document
// ============================================================================

/// Counts, failure detail and report links extracted from one report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParsedReport {
    pub suite_name: String,
    pub total: u64,
    pub failed: u64,
    pub failures: FailureMap,
    pub report_urls: Vec<String>,
}

impl ParsedReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
