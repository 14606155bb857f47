//! Partitioning records into ranking groups.
//!
//! Groups are returned in order of first appearance so that output and tie
//! order are reproducible.
use std::collections::HashMap;

use crate::types::{InputRecord, RawValue};

/// Hashable form of a raw group value.
///
/// Numbers are stored as canonical bit patterns: every NaN is one key and
/// `-0.0` equals `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Bool(bool),
    Number(u64),
    Text(String),
    List(Vec<KeyValue>),
    /// Canonical JSON of a structured cell. Distinct from `Text` with the same characters.
    Object(String),
    /// Null nested inside a list. A top-level null maps to `GroupKey::Ungrouped`.
    Null,
}

impl KeyValue {
    fn from_raw(raw: &RawValue) -> Self {
        match raw {
            RawValue::Null => KeyValue::Null,
            RawValue::Bool(b) => KeyValue::Bool(*b),
            RawValue::Number(n) => KeyValue::Number(canonical_bits(*n)),
            RawValue::Text(s) => KeyValue::Text(s.clone()),
            RawValue::List(values) => KeyValue::List(values.iter().map(KeyValue::from_raw).collect()),
            RawValue::Object(json) => KeyValue::Object(json.clone()),
        }
    }
}

fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0_f64.to_bits()
    } else {
        n.to_bits()
    }
}

/// Identity of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Records with no group value, or every record when grouping is disabled.
    /// Never equal to any real key, including `""`, `0` and `false`.
    Ungrouped,
    Value(KeyValue),
}

impl GroupKey {
    pub fn for_record(record: &InputRecord, grouping_enabled: bool) -> Self {
        if !grouping_enabled {
            return GroupKey::Ungrouped;
        }
        match &record.group_value {
            None | Some(RawValue::Null) => GroupKey::Ungrouped,
            Some(raw) => GroupKey::Value(KeyValue::from_raw(raw)),
        }
    }
}

/// A group and its members, in input order.
#[derive(Debug)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub members: Vec<&'a InputRecord>,
}

/// Split records into groups, ordered by first appearance of each key.
pub fn partition(records: &[InputRecord], grouping_enabled: bool) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut key_to_idx: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let key = GroupKey::for_record(record, grouping_enabled);
        let idx = match key_to_idx.get(&key) {
            Some(&idx) => idx,
            None => {
                key_to_idx.insert(key.clone(), groups.len());
                groups.push(Group { key, members: Vec::new() });
                groups.len() - 1
            }
        };
        groups[idx].members.push(record);
    }

    groups
}
