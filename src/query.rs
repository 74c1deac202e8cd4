//! Read-only queries over the table. Everything except `search_by_id`
//! scans `snapshot()`, so results come back in physical slot order unless
//! a query says otherwise.

use std::str::FromStr;

use probe_table_lib::{FixedHashTable, Lookup};
use serde::Serialize;

use crate::error::AttendanceError;
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(AttendanceError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// One record visited by a name scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameSearch {
    pub matches: Vec<Record>,
    pub checked: Vec<CheckedEntry>,
}

/// Optional substring filters, ANDed together. Blank filters are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
}

impl DynamicFilter {
    pub fn id(mut self, query: impl Into<String>) -> Self {
        self.id = Some(query.into());
        self
    }

    pub fn name(mut self, query: impl Into<String>) -> Self {
        self.name = Some(query.into());
        self
    }

    pub fn department(mut self, query: impl Into<String>) -> Self {
        self.department = Some(query.into());
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        field_matches(self.id.as_deref(), &record.id.to_string())
            && field_matches(self.name.as_deref(), &record.name)
            && field_matches(self.department.as_deref(), &record.department)
    }
}

fn field_matches(query: Option<&str>, value: &str) -> bool {
    match query.map(str::trim) {
        None | Some("") => true,
        Some(q) => contains_ignore_case(value, q),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn search_by_id(table: &FixedHashTable<Record>, id: i64) -> Lookup<Record> {
    table.lookup(id)
}

/// Case-insensitive substring scan over names, recording every record
/// checked whether or not it matched.
pub fn search_by_name(table: &FixedHashTable<Record>, query: &str) -> NameSearch {
    let query = query.trim();
    let mut result = NameSearch::default();
    for record in table.snapshot() {
        result.checked.push(CheckedEntry {
            id: record.id,
            name: record.name.clone(),
        });
        if contains_ignore_case(&record.name, query) {
            result.matches.push(record);
        }
    }
    result
}

pub fn dynamic_search(table: &FixedHashTable<Record>, filter: &DynamicFilter) -> Vec<Record> {
    table
        .snapshot()
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect()
}

/// Stable sort by percentage; ties keep snapshot order in both directions.
pub fn sort_by_percentage(table: &FixedHashTable<Record>, order: SortOrder) -> Vec<Record> {
    let mut records = table.snapshot();
    match order {
        SortOrder::Ascending => records
            .sort_by(|a, b| a.attendance_percentage.total_cmp(&b.attendance_percentage)),
        SortOrder::Descending => records
            .sort_by(|a, b| b.attendance_percentage.total_cmp(&a.attendance_percentage)),
    }
    records
}

pub fn filter_above_threshold(table: &FixedHashTable<Record>, percent: f64) -> Vec<Record> {
    table
        .snapshot()
        .into_iter()
        .filter(|r| r.attendance_percentage >= percent)
        .collect()
}
