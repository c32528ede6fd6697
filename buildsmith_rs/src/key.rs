//! Order-independent identity keys for build selections.

use itertools::Itertools;
use thiserror::Error;

use crate::item::ItemDescriptor;

/// Separator between sorted item ids inside a canonical key.
pub const KEY_DELIMITER: &str = "-";

/// Raised when an item id cannot be parsed into the numeric total order
/// used for canonicalization. Never fatal at engine level: the sampler
/// discards the affected draw and retries.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("item id '{id}' is not numeric and cannot be canonicalized")]
pub struct MalformedItemId {
    pub id: String,
}

/// Build the canonical key for a selection of items: ids parsed as
/// integers, sorted ascending, joined with [`KEY_DELIMITER`].
///
/// Two selections receive the same key iff they contain the same set of
/// item ids, regardless of draw order.
pub fn canonical_key<'a, I>(items: I) -> Result<String, MalformedItemId>
where
    I: IntoIterator<Item = &'a ItemDescriptor>,
{
    let mut ids = Vec::new();
    for item in items {
        let id: u32 = item
            .id
            .parse()
            .map_err(|_| MalformedItemId { id: item.id.clone() })?;
        ids.push(id);
    }
    Ok(ids.into_iter().sorted().join(KEY_DELIMITER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ItemDescriptor {
        ItemDescriptor::new(id, format!("Item {id}"), 100)
    }

    #[test]
    fn key_is_order_independent() {
        let a = [item("3089"), item("1001"), item("3153")];
        let b = [item("1001"), item("3153"), item("3089")];
        let key_a = canonical_key(a.iter()).expect("numeric ids");
        let key_b = canonical_key(b.iter()).expect("numeric ids");
        assert_eq!(key_a, key_b);
        assert_eq!(key_a, "1001-3089-3153");
    }

    #[test]
    fn keys_differ_for_different_sets() {
        let a = [item("1001"), item("3089")];
        let b = [item("1001"), item("3153")];
        assert_ne!(
            canonical_key(a.iter()).unwrap(),
            canonical_key(b.iter()).unwrap()
        );
    }

    #[test]
    fn sorts_numerically_not_lexically() {
        // "999" < "1001" numerically even though it sorts after as a string.
        let selection = [item("1001"), item("999")];
        assert_eq!(canonical_key(selection.iter()).unwrap(), "999-1001");
    }

    #[test]
    fn malformed_id_is_reported() {
        let selection = [item("1001"), item("ornn-upgrade")];
        let err = canonical_key(selection.iter()).unwrap_err();
        assert_eq!(err.id, "ornn-upgrade");
    }
}
