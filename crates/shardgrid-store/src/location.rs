//! Label lookup and location identity.
//!
//! A location ID is the concatenation of a store's label values for a
//! caller-chosen list of keys (e.g., `["zone", "rack"]`). Two replicas of
//! the same data should never share a location ID.

use shard_core::StoreLabel;

/// Value of the first label with the given key, or `""` if none.
///
/// Keys may repeat; the first match wins.
pub fn label_value<'a>(labels: &'a [StoreLabel], key: &str) -> &'a str {
    labels
        .iter()
        .find(|label| label.key == key)
        .map(|label| label.value.as_str())
        .unwrap_or("")
}

/// Concatenate label values for `keys`, in order.
///
/// Returns `""` if any key has no (or an empty) value: a store's location
/// is either fully known or unknown. An empty `keys` list also yields `""`.
pub fn location_id<S: AsRef<str>>(labels: &[StoreLabel], keys: &[S]) -> String {
    let mut id = String::new();
    for key in keys {
        let value = label_value(labels, key.as_ref());
        if value.is_empty() {
            return String::new();
        }
        id.push_str(value);
    }
    id
}
