use chrono::NaiveDate;

use crate::ReceiptFields;

pub const EXPORT_HEADERS: [&str; 4] = ["Date", "Merchant", "Description", "Total"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// CSV; fields containing the delimiter, quotes, or newlines get
    /// quote-wrapped with internal quotes doubled.
    Comma,
    /// TSV; no escaping, intended for clipboard paste into a spreadsheet.
    Tab,
}

impl Delimiter {
    fn as_str(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
        }
    }
}

/// Header row plus one row per record, in store order.
pub fn to_delimited_text(records: &[ReceiptFields], delimiter: Delimiter) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(records.len() + 1);
    rows.push(EXPORT_HEADERS.iter().map(|h| (*h).to_string()).collect());
    for record in records {
        rows.push(vec![
            record.date.clone(),
            record.merchant.clone(),
            record.description.clone(),
            format_total(record.total),
        ]);
    }

    rows.into_iter()
        .map(|row| {
            let cells: Vec<String> = match delimiter {
                Delimiter::Comma => row.iter().map(|cell| escape_csv(cell)).collect(),
                Delimiter::Tab => row,
            };
            cells.join(delimiter.as_str())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic date-stamped export name.
pub fn export_filename(date: NaiveDate) -> String {
    format!("receipts-{}.csv", date.format("%Y-%m-%d"))
}

// f64 Display is the shortest round-trip form: 12.0 renders "12", -4.5
// stays "-4.5".
fn format_total(total: f64) -> String {
    format!("{total}")
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
