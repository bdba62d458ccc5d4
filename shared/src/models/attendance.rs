//! Staff attendance model

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub phone: String,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
}

/// Per-employee status counts for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub half_day: u32,
    pub leave: u32,
}

impl AttendanceSummary {
    /// Count an employee's records that fall in `month`'s calendar month
    pub fn for_month(records: &[AttendanceRecord], employee_id: &str, month: NaiveDate) -> Self {
        let mut summary = Self::default();
        for record in records.iter().filter(|r| {
            r.employee_id == employee_id
                && r.date.year() == month.year()
                && r.date.month() == month.month()
        }) {
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::HalfDay => summary.half_day += 1,
                AttendanceStatus::Leave => summary.leave += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.half_day + self.leave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(employee: &str, day: u32, month: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee.to_string(),
            date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            status,
            check_in_time: None,
            check_out_time: None,
        }
    }

    #[test]
    fn test_summary_for_month() {
        let records = vec![
            record("1", 1, 3, AttendanceStatus::Present),
            record("1", 2, 3, AttendanceStatus::HalfDay),
            record("1", 3, 3, AttendanceStatus::Absent),
            record("1", 28, 2, AttendanceStatus::Present),
            record("2", 1, 3, AttendanceStatus::Leave),
        ];
        let month = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let s = AttendanceSummary::for_month(&records, "1", month);
        assert_eq!(s, AttendanceSummary { present: 1, absent: 1, half_day: 1, leave: 0 });
        assert_eq!(s.total(), 3);

        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"half-day\"");
    }
}
