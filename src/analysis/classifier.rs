//! One-shot record classification.
//!
//! Applied when an analyzer is constructed: query text is lower-cased,
//! each record gets its first-matching brand group (configured order wins)
//! and the brand/important flags. Records without query text keep default
//! flags; classification never fails a run.

use crate::config::matcher::CompiledTaxonomy;
use crate::core::Record;

/// Annotate a raw batch. Recomputes every flag from scratch, so running it
/// over an already-classified batch yields the same result.
pub fn classify_records(mut records: Vec<Record>, taxonomy: &CompiledTaxonomy) -> Vec<Record> {
    for record in &mut records {
        match record.query.take() {
            Some(query) => {
                let lower = query.to_lowercase();
                record.matched_brand = taxonomy.classify_group(&lower).map(str::to_string);
                record.is_brand = record.matched_brand.is_some();
                record.is_important = taxonomy.is_important(&lower);
                record.query = Some(lower);
            }
            None => {
                record.matched_brand = None;
                record.is_brand = false;
                record.is_important = false;
            }
        }
    }
    records
}
