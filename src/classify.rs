// Student-letting and web-availability predicates
//
// Both predicates must pass before a record reaches the mapper. Failures are
// counted as skipped by the import loop, never raised as errors.
use crate::xml::{self, XmlValue};

// Marketing text scanned for letting keywords: letting type, market segment,
// description and title, lowercased, missing fields contributing nothing.
fn classification_text(record: &XmlValue) -> String {
    [
        xml::get_text(record, "property.letting_type"),
        xml::get_text(record, "property.market"),
        xml::get_text(record, "property.description"),
        xml::get_text(record, "property.title"),
    ]
    .iter()
    .map(|field| field.unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

pub fn bedroom_count(record: &XmlValue) -> u32 {
    xml::get_text(record, "property.bedrooms")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

// The strict variant only honors the "student" keyword and the bedroom-count
// heuristic; the permissive one additionally accepts generic letting wording.
pub fn is_student_letting(record: &XmlValue, strict: bool) -> bool {
    let text = classification_text(record);

    if text.contains("student") {
        return true;
    }
    if !strict && (text.contains("letting") || text.contains("to let")) {
        return true;
    }

    bedroom_count(record) >= 3
}

// web_status absent, empty, "0" or "100" means the property may be published.
pub fn is_web_available(record: &XmlValue) -> bool {
    match xml::get_text(record, "property.web_status") {
        None => true,
        Some(status) => {
            let status = status.trim();
            status.is_empty() || status == "0" || status == "100"
        }
    }
}
