//! Coupon set mutations
//!
//! A cart's coupon set is an ordered list of codes; order is evaluation
//! order. Mutations only compute the resulting list here. Validation and
//! persistence happen in the manager.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Change requested on a cart's coupon set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "codes", rename_all = "snake_case")]
pub enum CouponMutation {
    /// Install `codes` as the whole set (initial application)
    Apply(Vec<String>),
    /// Add `codes` after the existing ones
    Append(Vec<String>),
    /// Discard the existing set and install `codes`
    Replace(Vec<String>),
    /// Delete the named codes; unknown codes are ignored
    Remove(Vec<String>),
    /// Delete every code
    RemoveAll,
}

impl CouponMutation {
    pub fn name(&self) -> &'static str {
        match self {
            CouponMutation::Apply(_) => "apply",
            CouponMutation::Append(_) => "append",
            CouponMutation::Replace(_) => "replace",
            CouponMutation::Remove(_) => "remove",
            CouponMutation::RemoveAll => "remove_all",
        }
    }

    /// Removals never fail validation
    pub fn is_removal(&self) -> bool {
        matches!(self, CouponMutation::Remove(_) | CouponMutation::RemoveAll)
    }

    /// Ordered code list after applying the mutation to `current`
    ///
    /// Repeated codes are kept so validation can report them.
    pub fn resulting_codes(&self, current: &[String]) -> Vec<String> {
        match self {
            CouponMutation::Apply(codes) | CouponMutation::Replace(codes) => normalize(codes),
            CouponMutation::Append(codes) => {
                let mut result = current.to_vec();
                result.extend(normalize(codes));
                result
            }
            CouponMutation::Remove(codes) => {
                let removed: HashSet<String> = normalize(codes).into_iter().collect();
                current
                    .iter()
                    .filter(|c| !removed.contains(*c))
                    .cloned()
                    .collect()
            }
            CouponMutation::RemoveAll => vec![],
        }
    }
}

/// Trim codes and drop blanks; codes are otherwise case-sensitive
fn normalize(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Union of two sets, destination codes first
///
/// A code present in both keeps its destination position.
pub fn merge_codes(destination: &[String], source: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    destination
        .iter()
        .chain(source.iter())
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}
