use pretty_assertions::assert_eq;
use receipt_engine::{
    archival_filename, export_filename, to_delimited_text, Delimiter, ReceiptFields,
};

fn fields(merchant: &str, total: f64) -> ReceiptFields {
    ReceiptFields {
        date: "2024-03-01".to_string(),
        merchant: merchant.to_string(),
        description: "coffee".to_string(),
        total,
        card_last4: None,
    }
}

#[test]
fn csv_quotes_fields_containing_the_delimiter() {
    let records = vec![fields("Acme, Inc.", -4.5)];
    let csv = to_delimited_text(&records, Delimiter::Comma);

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Date,Merchant,Description,Total"));
    assert_eq!(lines.next(), Some("2024-03-01,\"Acme, Inc.\",coffee,-4.5"));
    assert_eq!(lines.next(), None);
}

#[test]
fn csv_doubles_internal_quotes() {
    let records = vec![fields("The \"Best\" Deli", 10.0)];
    let csv = to_delimited_text(&records, Delimiter::Comma);
    assert!(csv.contains("\"The \"\"Best\"\" Deli\""));
}

#[test]
fn tsv_performs_no_escaping() {
    let records = vec![fields("Acme, Inc.", -4.5)];
    let tsv = to_delimited_text(&records, Delimiter::Tab);

    assert_eq!(
        tsv,
        "Date\tMerchant\tDescription\tTotal\n2024-03-01\tAcme, Inc.\tcoffee\t-4.5"
    );
}

#[test]
fn whole_totals_render_without_decimals() {
    let records = vec![fields("Acme", 12.0)];
    let csv = to_delimited_text(&records, Delimiter::Comma);
    assert!(csv.ends_with("2024-03-01,Acme,coffee,12"));
}

#[test]
fn export_filename_is_date_stamped() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(export_filename(date), "receipts-2024-03-01.csv");
}

#[test]
fn archival_filename_strips_punctuation_and_rounds_amount() {
    let record = ReceiptFields {
        date: "2024-03-01".to_string(),
        merchant: "Joe's Café!".to_string(),
        description: "lunch".to_string(),
        total: 12.4,
        card_last4: None,
    };
    // Accented letters fall outside the letters-and-whitespace rule; the
    // extension is copied verbatim, case included.
    assert_eq!(
        archival_filename(&record, "scan.PDF"),
        "2024-03-01_Joes_Caf_$12.PDF"
    );
}

#[test]
fn archival_filename_appends_card_suffix_when_present() {
    let record = ReceiptFields {
        date: "2024-03-01".to_string(),
        merchant: "Acme".to_string(),
        description: "tools".to_string(),
        total: -37.8,
        card_last4: Some("4242".to_string()),
    };
    // Refund amounts archive under their absolute value.
    assert_eq!(
        archival_filename(&record, "receipt.jpeg"),
        "2024-03-01_Acme_$38_4242.jpeg"
    );
}

#[test]
fn archival_filename_falls_back_to_unknown_merchant() {
    let record = ReceiptFields {
        date: "2024-03-01".to_string(),
        merchant: "123 ***".to_string(),
        description: String::new(),
        total: 5.0,
        card_last4: None,
    };
    assert_eq!(archival_filename(&record, "img"), "2024-03-01_Unknown_$5");
}

#[test]
fn empty_store_exports_header_only() {
    assert_eq!(
        to_delimited_text(&[], Delimiter::Comma),
        "Date,Merchant,Description,Total"
    );
}
