//! Monthly staff attendance report

use chrono::NaiveDate;
use khanaval_printer::ReceiptLayout;
use shared::models::{AttendanceRecord, AttendanceSummary, Employee};

use super::DocumentOptions;
use crate::utils::time::format_month;

const COUNT_COL: usize = 3;

/// Present / absent / half-day / leave counts per employee for `month`
pub fn attendance_report(
    employees: &[Employee],
    records: &[AttendanceRecord],
    month: NaiveDate,
    opts: &DocumentOptions,
) -> String {
    let name_col = opts.width.saturating_sub(4 * (COUNT_COL + 1));
    let mut l = ReceiptLayout::new(opts.width);

    l.line("ATTENDANCE REPORT");
    l.center(&opts.restaurant_name);
    l.center(&format_month(month));
    l.eq_sep();
    l.columns(&[
        ("NAME", name_col),
        ("P", COUNT_COL),
        ("A", COUNT_COL),
        ("H", COUNT_COL),
        ("L", COUNT_COL),
    ]);
    l.dash_sep();

    let mut totals = AttendanceSummary::default();
    for employee in employees {
        let s = AttendanceSummary::for_month(records, &employee.id, month);
        totals.present += s.present;
        totals.absent += s.absent;
        totals.half_day += s.half_day;
        totals.leave += s.leave;

        let name = format!("{} ({})", employee.name, employee.role);
        let counts = [s.present, s.absent, s.half_day, s.leave].map(|n| n.to_string());
        l.columns(&[
            (name.as_str(), name_col),
            (counts[0].as_str(), COUNT_COL),
            (counts[1].as_str(), COUNT_COL),
            (counts[2].as_str(), COUNT_COL),
            (counts[3].as_str(), COUNT_COL),
        ]);
    }

    l.dash_sep();
    l.pair("Staff:", &employees.len().to_string());
    l.pair("Days marked:", &totals.total().to_string());
    l.line("P=Present A=Absent H=Half-day L=Leave");

    l.finalize()
}
