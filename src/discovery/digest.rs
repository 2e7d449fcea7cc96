//! Class identifiers derived from field and source names

use super::error::{DiscoveryError, Result};

/// Derives a class identifier from the name of the field (or source) that
/// introduced it.
///
/// Classes are merged by the identifier this returns, so swapping the
/// implementation changes which objects end up sharing a class.
pub trait IdDigester {
    /// Digest `name` into a class identifier. Fails on an empty name.
    fn digest(&self, name: &str) -> Result<String>;
}

/// Singularize-then-capitalize naming
///
/// Strips one trailing `s` from names longer than one character and
/// upper-cases the first character of what remains. `addresses` becomes
/// `Addresse` and `status` becomes `Statu`; identifiers downstream depend on
/// exactly this output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluralStripDigester;

impl IdDigester for PluralStripDigester {
    fn digest(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(DiscoveryError::invalid("id cannot be empty"));
        }

        let singular = if name.chars().count() > 1 {
            name.strip_suffix('s').unwrap_or(name)
        } else {
            name
        };

        let mut chars = singular.chars();
        let digested = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Ok(digested)
    }
}

/// Digest a name with the default [`PluralStripDigester`]
pub fn digest_id(name: &str) -> Result<String> {
    PluralStripDigester.digest(name)
}
