//! Collection membership predicates.
//!
//! Every predicate is a pure function of the collection and the candidate.
//! An asset belongs to a collection when all asset-level predicates pass:
//!
//! 1. **Unit-name prefix**: trimmed unit name starts with a trimmed prefix
//!    (case-sensitive). An empty prefix list always passes.
//! 2. **Excluded id**: the asset id is not listed in `excluded_asset_ids`.
//! 3. **Id threshold**: `asset_id > asset_id_greater_than`.
//! 4. **Include name**: the name contains one of `include_name_contains`
//!    (case-insensitive). An empty list always passes.
//! 5. **Exclude name**: the name contains none of `exclude_name_contains`
//!    (case-insensitive). Only applied when the list is non-empty.
//!
//! Holder exclusion is checked separately per balance row.

use crate::types::{Collection, CreatedAsset};

/// Whether a created asset belongs to `collection`.
pub fn matches_asset(collection: &Collection, asset: &CreatedAsset) -> bool {
    matches_unit_name_prefix(&collection.unit_name_prefixes, &asset.unit_name)
        && !is_excluded_asset(&collection.excluded_asset_ids, asset.asset_id)
        && is_asset_id_greater_than(collection.asset_id_greater_than, asset.asset_id)
        && name_contains_any(&collection.include_name_contains, &asset.name)
        && (collection.exclude_name_contains.is_empty()
            || !name_contains_any(&collection.exclude_name_contains, &asset.name))
}

/// Whether balances held by `address` are ignored for `collection`.
pub fn is_excluded_holder(collection: &Collection, address: &str) -> bool {
    collection
        .excluded_holder_addresses
        .iter()
        .any(|excluded| excluded == address)
}

pub fn matches_unit_name_prefix(prefixes: &[String], unit_name: &str) -> bool {
    if prefixes.is_empty() {
        return true;
    }
    let unit_name = unit_name.trim();
    prefixes
        .iter()
        .any(|prefix| unit_name.starts_with(prefix.trim()))
}

pub fn is_excluded_asset(excluded: &[u64], asset_id: u64) -> bool {
    excluded.contains(&asset_id)
}

pub fn is_asset_id_greater_than(threshold: u64, asset_id: u64) -> bool {
    asset_id > threshold
}

/// Case-insensitive substring match. An empty needle list matches
/// everything.
pub fn name_contains_any(needles: &[String], name: &str) -> bool {
    if needles.is_empty() {
        return true;
    }
    let name = name.to_lowercase();
    needles
        .iter()
        .any(|needle| name.contains(&needle.to_lowercase()))
}
