use std::collections::BTreeMap;

/// Absolute volume per phase.
pub type PhaseVolumeMap = BTreeMap<String, f64>;
/// Moles per phase.
pub type MolarMap = BTreeMap<String, f64>;
/// Moles per element.
pub type ElementalMap = BTreeMap<String, f64>;

pub fn total(amounts: &BTreeMap<String, f64>) -> f64 {
    amounts.values().sum()
}

/// Divides every value by the sum of all values.
///
/// A map whose values sum to zero normalizes to an empty map.
pub fn normalize(amounts: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let sum = total(amounts);
    if sum == 0.0 {
        return BTreeMap::new();
    }
    amounts
        .iter()
        .map(|(key, value)| (key.clone(), value / sum))
        .collect()
}

/// Adds every entry of `other` into `target`, creating missing keys.
pub fn accumulate(target: &mut BTreeMap<String, f64>, other: &BTreeMap<String, f64>) {
    for (key, value) in other {
        *target.entry(key.clone()).or_insert(0.0) += value;
    }
}
