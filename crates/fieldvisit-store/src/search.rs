//! History search over visit records.

use fieldvisit_protocol::VisitRecord;

/// Case-insensitive match of a term against name, address, and order number.
///
/// An empty (or whitespace-only) term matches every record.
pub fn matches_search(record: &VisitRecord, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [&record.business_name, &record.address, &record.order_number]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
