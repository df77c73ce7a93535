use crate::ReceiptFields;

/// Archival name for the original file, built from its extracted data:
/// `<date>_<SanitizedMerchant>_$<AbsRoundedTotal>[_<card_last4>][.<ext>]`.
/// The extension is copied verbatim from the original name's final
/// dot-segment, case included.
pub fn archival_filename(fields: &ReceiptFields, original_name: &str) -> String {
    let merchant = sanitize_merchant(&fields.merchant);
    let amount = fields.total.abs().round() as i64;

    let mut name = format!("{}_{}_${}", fields.date, merchant, amount);
    if let Some(last4) = &fields.card_last4 {
        name.push('_');
        name.push_str(last4);
    }
    if let Some(dot) = original_name.rfind('.') {
        name.push_str(&original_name[dot..]);
    }
    name
}

/// Keeps ASCII letters and whitespace only, then joins the surviving words
/// with single underscores. Empty results become `Unknown`.
fn sanitize_merchant(input: &str) -> String {
    let letters_and_spaces: String = input
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    let joined = letters_and_spaces
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if joined.is_empty() {
        "Unknown".to_string()
    } else {
        joined
    }
}
