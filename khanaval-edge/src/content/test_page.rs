//! Printer test page

use chrono::{DateTime, Utc};
use khanaval_printer::ReceiptLayout;
use shared::models::PrinterConfig;

use super::DocumentOptions;
use crate::utils::time::{format_date, format_time};

/// Short identification page; line width follows the printer's paper
pub fn test_page(printer: &PrinterConfig, now: DateTime<Utc>, opts: &DocumentOptions) -> String {
    let mut l = ReceiptLayout::new(printer.paper_width.columns());

    l.line("TEST PRINT");
    l.eq_sep();
    l.line(&opts.restaurant_name);
    l.line(&format!("Printer: {}", printer.name));
    l.line(&format!("Type: {}", printer.connection_type));
    l.line(&format!("Paper: {}", printer.paper_width.as_str()));
    l.line(&format!("Time: {}", format_time(now, opts.timezone)));
    l.line(&format!("Date: {}", format_date(now, opts.timezone)));
    l.eq_sep();
    l.wrapped("If you can read this, your printer is working correctly!");

    l.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;
    use shared::models::{PaperWidth, PrinterLocation};

    #[test]
    fn test_page_lines() {
        let printer = PrinterConfig::bluetooth("Kitchen BT", "AA:BB", PrinterLocation::Kitchen)
            .with_paper_width(PaperWidth::Mm58);
        let text = test_page(&printer, fixtures::order().created_at, &fixtures::options());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "TEST PRINT",
                "================================",
                "JAYESH MACHHI KHANAVAL",
                "Printer: Kitchen BT",
                "Type: bluetooth",
                "Paper: 58mm",
                "Time: 12:35",
                "Date: 16/10/2026",
                "================================",
                "If you can read this, your",
                "printer is working correctly!",
            ]
        );
    }
}
