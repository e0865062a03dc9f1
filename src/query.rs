//! URL query-string composition for the companion library filters.
//!
//! Pure functions: given the current query string and a change request,
//! produce the next query string. The UI debounces before applying; that
//! is not this module's concern.

use url::form_urlencoded;

/// Sentinel value meaning "no filter" for a category key.
pub const ALL_SENTINEL: &str = "all";

/// A requested change to the current query parameters.
#[derive(Debug, Clone)]
pub enum FilterChange {
    /// Upsert one key. Setting a key to [`ALL_SENTINEL`] removes it.
    Set { key: String, value: String },
    /// Remove the listed keys.
    Remove { keys: Vec<String> },
}

/// Parse a query string into ordered key/value pairs.
fn parse(params: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(params.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Serialize pairs back into a query string.
fn serialize(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Upsert `key=value`, preserving the position of an existing key.
pub fn set_param(params: &str, key: &str, value: &str) -> String {
    let mut pairs = parse(params);

    if let Some(existing) = pairs.iter_mut().find(|(k, _)| k == key) {
        existing.1 = value.to_string();
    } else {
        pairs.push((key.to_string(), value.to_string()));
    }

    serialize(&pairs)
}

/// Remove every pair whose key is in `keys`.
pub fn remove_params(params: &str, keys: &[&str]) -> String {
    let pairs: Vec<(String, String)> = parse(params)
        .into_iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .collect();

    serialize(&pairs)
}

/// Apply one change request to the current query string.
pub fn apply(params: &str, change: &FilterChange) -> String {
    match change {
        FilterChange::Set { key, value } if value == ALL_SENTINEL => {
            remove_params(params, &[key.as_str()])
        }
        FilterChange::Set { key, value } => set_param(params, key, value),
        FilterChange::Remove { keys } => {
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            remove_params(params, &refs)
        }
    }
}
