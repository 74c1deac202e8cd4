use probe_table_lib::FixedHashTable;

use crate::config::{REPORT_DEPARTMENT_WIDTH, REPORT_NAME_WIDTH};
use crate::error::{AttendanceError, Result};
use crate::query::filter_above_threshold;
use crate::record::Record;

pub const REPORT_HEADERS: [&str; 5] = ["ID", "Name", "Department", "Attendance %", "Hash Index"];

/// Tabular export of every record at or above a percentage threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdReport {
    pub percent: f64,
    pub rows: Vec<[String; 5]>,
}

impl ThresholdReport {
    pub fn build(table: &FixedHashTable<Record>, percent: f64) -> Self {
        let rows = filter_above_threshold(table, percent)
            .iter()
            .map(|r| {
                [
                    r.id.to_string(),
                    truncate(&r.name, REPORT_NAME_WIDTH),
                    truncate(&r.department, REPORT_DEPARTMENT_WIDTH),
                    format!("{:.1}", r.attendance_percentage),
                    r.hash_index.to_string(),
                ]
            })
            .collect();
        Self { percent, rows }
    }

    pub fn title(&self) -> String {
        format!("Employees with attendance >= {}%", self.percent)
    }

    pub fn filename(&self) -> String {
        format!("employees_{}_percent.csv", self.percent)
    }

    /// Title line, header row, then one row per record.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        wtr.write_record([self.title()])?;
        wtr.write_record(REPORT_HEADERS)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner().map_err(|e| {
            let source = std::io::Error::new(e.error().kind(), e.error().to_string());
            AttendanceError::io("<report>", source)
        })
    }
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}
