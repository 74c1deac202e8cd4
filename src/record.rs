use probe_table_lib::Keyed;
use serde::{Deserialize, Serialize};

/// One employee's attendance, as stored in the table and persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub attendance: u32,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub attendance_percentage: f64,
    /// `id mod capacity` at insert time. Descriptive only; lookups rehash.
    #[serde(default)]
    pub hash_index: usize,
}

impl Record {
    /// Builds a record and derives its percentage and hash label.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        department: impl Into<String>,
        attendance: u32,
        total_days: u32,
        capacity: usize,
    ) -> Self {
        Record {
            id,
            name: name.into(),
            department: department.into(),
            attendance,
            total_days,
            attendance_percentage: attendance_percentage(attendance, total_days),
            hash_index: id.rem_euclid(capacity.max(1) as i64) as usize,
        }
    }
}

/// `attendance / total_days * 100` rounded to one decimal, halves to even,
/// or 0.0 when `total_days` is 0.
pub fn attendance_percentage(attendance: u32, total_days: u32) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    let pct = attendance as f64 / total_days as f64 * 100.0;
    (pct * 10.0).round_ties_even() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub id: i64,
    pub name: String,
    pub attendance_percentage: f64,
}

impl Keyed for Record {
    type Summary = SlotSummary;

    fn key(&self) -> i64 {
        self.id
    }

    fn summary(&self) -> SlotSummary {
        SlotSummary {
            id: self.id,
            name: self.name.clone(),
            attendance_percentage: self.attendance_percentage,
        }
    }
}

// --- Raw Input ---

/// A loosely typed cell from an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer view of the cell. Floats truncate toward zero, booleans are
    /// 0/1, text must be an integer after trimming.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Bool(b) => Some(i64::from(*b)),
            FieldValue::Float(f) if f.is_finite() => {
                let truncated = f.trunc();
                if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    Some(truncated as i64)
                } else {
                    None
                }
            }
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Trimmed text view; `Null` reads as empty.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

/// An unvalidated input row; `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub id: Option<FieldValue>,
    pub name: Option<FieldValue>,
    pub department: Option<FieldValue>,
    pub attendance: Option<FieldValue>,
    pub total_days: Option<FieldValue>,
}

impl RawRow {
    pub fn new(id: impl Into<FieldValue>) -> Self {
        RawRow {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<FieldValue>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn department(mut self, department: impl Into<FieldValue>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn attendance(mut self, attendance: impl Into<FieldValue>) -> Self {
        self.attendance = Some(attendance.into());
        self
    }

    pub fn total_days(mut self, total_days: impl Into<FieldValue>) -> Self {
        self.total_days = Some(total_days.into());
        self
    }

    /// Sets a field by its (case-insensitive) column name. Unknown columns
    /// are ignored.
    pub fn set(&mut self, column: &str, value: FieldValue) {
        match column.trim().to_ascii_lowercase().as_str() {
            "id" => self.id = Some(value),
            "name" => self.name = Some(value),
            "department" => self.department = Some(value),
            "attendance" => self.attendance = Some(value),
            "total_days" => self.total_days = Some(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(attendance_percentage(2, 3), 66.7);
        assert_eq!(attendance_percentage(1, 3), 33.3);
        assert_eq!(attendance_percentage(20, 20), 100.0);
        assert_eq!(attendance_percentage(5, 0), 0.0);
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(attendance_percentage(1, 16), 6.2);
        assert_eq!(attendance_percentage(3, 16), 18.8);
        assert_eq!(attendance_percentage(5, 16), 31.2);
        assert_eq!(attendance_percentage(7, 16), 43.8);
    }

    #[test]
    fn hash_label_is_non_negative() {
        let record = Record::new(-3, "Ann", "CSE", 1, 2, 20);
        assert_eq!(record.hash_index, 17);
        assert_eq!(record.attendance_percentage, 50.0);
    }

    #[test]
    fn integer_views_of_cells() {
        assert_eq!(FieldValue::from(" 12 ").as_integer(), Some(12));
        assert_eq!(FieldValue::Float(12.9).as_integer(), Some(12));
        assert_eq!(FieldValue::Float(f64::NAN).as_integer(), None);
        assert_eq!(FieldValue::from("12.5").as_integer(), None);
        assert_eq!(FieldValue::Bool(true).as_integer(), Some(1));
        assert_eq!(FieldValue::Null.as_integer(), None);
    }

    #[test]
    fn set_matches_columns_case_insensitively() {
        let mut row = RawRow::default();
        row.set(" Total_Days ", FieldValue::Int(10));
        row.set("NAME", FieldValue::from("Go Lin"));
        row.set("salary", FieldValue::Int(1));
        assert_eq!(row.total_days, Some(FieldValue::Int(10)));
        assert_eq!(row.name, Some(FieldValue::from("Go Lin")));
    }

    #[test]
    fn snake_case_keys_on_the_wire() {
        let record = Record::new(7, "Ann", "CSE", 9, 10, 5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["attendance_percentage"], 90.0);
        assert_eq!(json["hash_index"], 2);
        assert_eq!(json["total_days"], 10);
    }
}
