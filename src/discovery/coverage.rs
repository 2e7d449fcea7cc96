//! Field coverage over a finished model
//!
//! Coverage is the share of a class's instances in which a field was
//! present. Unlike `required`, which only reflects the first instance, it is
//! a corpus-wide signal. Compute it once, after all discovery for the run.

use super::types::ClassDef;

/// Attach `field.occurrence_count / class.occurrence_count` to every field
pub fn compute_coverage<'a>(classes: impl IntoIterator<Item = &'a mut ClassDef>) {
    for class in classes {
        let total = class.occurrence_count() as f64;
        for field in class.fields_mut() {
            let ratio = if total > 0.0 {
                field.occurrence_count() as f64 / total
            } else {
                0.0
            };
            field.set_coverage(ratio);
        }
    }
}

/// Remove coverage ratios so counts can be refined further
pub(crate) fn clear_coverage<'a>(classes: impl IntoIterator<Item = &'a mut ClassDef>) {
    for class in classes {
        for field in class.fields_mut() {
            field.clear_coverage();
        }
    }
}
