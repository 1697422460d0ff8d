//! Attribute maps shared by nodes and text runs.
//!
//! A `null` value inside an update means "remove this key".

use serde_json::Value;
use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, Value>;

/// Merge `other` over `base`.
///
/// With `keep_null` set, `null` entries survive the merge so the result can
/// itself be used as an update. Otherwise they remove the key.
pub fn compose_attributes(base: &Attributes, other: &Attributes, keep_null: bool) -> Attributes {
    let mut composed = base.clone();
    for (key, value) in other {
        if value.is_null() && !keep_null {
            composed.remove(key);
        } else {
            composed.insert(key.clone(), value.clone());
        }
    }
    composed
}

/// Build the update that undoes applying `attributes` over `base`.
pub fn invert_attributes(attributes: &Attributes, base: &Attributes) -> Attributes {
    let mut inverted = Attributes::new();
    for (key, value) in attributes {
        match base.get(key) {
            Some(previous) if previous != value => {
                inverted.insert(key.clone(), previous.clone());
            }
            Some(_) => {}
            None => {
                inverted.insert(key.clone(), Value::Null);
            }
        }
    }
    inverted
}
