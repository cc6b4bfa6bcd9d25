// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Resource arithmetic: `FixedPoint` quantities and `ResourceSet` vectors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::constants::RESOURCE_UNIT_SCALING;

/// Fixed-point representation for fractional resource quantities.
///
/// Resources can be fractional (e.g., 0.5 CPU). The value is stored as
/// `value * RESOURCE_UNIT_SCALING` so that add/subtract/compare are exact.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedPoint(i64);

impl FixedPoint {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(RESOURCE_UNIT_SCALING as i64);
    pub const MAX: Self = Self(i64::MAX);
    pub const MIN: Self = Self(i64::MIN);

    /// Create from a double value (multiply by scaling factor).
    ///
    /// Out-of-range values and infinities saturate; NaN maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        // Float-to-int `as` casts saturate at the i64 bounds.
        Self((value * RESOURCE_UNIT_SCALING as f64).round() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / RESOURCE_UNIT_SCALING as f64
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamp into `[lo, hi]`. `hi` wins if the bounds cross.
    pub fn clamp_to(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }
}

// Arithmetic saturates at the representable bounds.

impl std::ops::Add for FixedPoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for FixedPoint {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for FixedPoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::SubAssign for FixedPoint {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({})", self.to_f64())
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

/// A set of named, non-negative resource quantities.
///
/// A missing name means zero of that resource. Zero entries are never
/// stored, so two sets describing the same quantities compare equal.
/// Names are kept ordered which makes the set usable as a map key
/// (e.g. when aggregating demand by shape) and its rendering stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceSet {
    resources: BTreeMap<String, FixedPoint>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a map of resource name → double value. Non-positive
    /// quantities are dropped.
    pub fn from_map(map: &HashMap<String, f64>) -> Self {
        Self {
            resources: map
                .iter()
                .filter(|(_, v)| **v > 0.0)
                .map(|(k, v)| (k.clone(), FixedPoint::from_f64(*v)))
                .filter(|(_, v)| v.is_positive())
                .collect(),
        }
    }

    /// Get the quantity of a resource (zero when absent).
    pub fn get(&self, resource: &str) -> FixedPoint {
        self.resources
            .get(resource)
            .copied()
            .unwrap_or(FixedPoint::ZERO)
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.resources.contains_key(resource)
    }

    /// Set the quantity of a resource. Zero or negative removes it.
    pub fn set(&mut self, resource: impl Into<String>, value: FixedPoint) {
        let resource = resource.into();
        if value.is_positive() {
            self.resources.insert(resource, value);
        } else {
            self.resources.remove(&resource);
        }
    }

    /// Remove a resource entirely, returning its previous quantity.
    pub fn remove(&mut self, resource: &str) -> Option<FixedPoint> {
        self.resources.remove(resource)
    }

    /// Add resources from another set.
    pub fn add(&mut self, other: &ResourceSet) {
        for (name, amount) in &other.resources {
            let entry = self
                .resources
                .entry(name.clone())
                .or_insert(FixedPoint::ZERO);
            *entry += *amount;
        }
    }

    /// Subtract resources of another set. Entries that reach zero or
    /// below are dropped.
    pub fn subtract(&mut self, other: &ResourceSet) {
        for (name, amount) in &other.resources {
            if let Some(entry) = self.resources.get_mut(name) {
                *entry -= *amount;
                if !entry.is_positive() {
                    self.resources.remove(name);
                }
            }
        }
    }

    /// Check if this set has at least the resources in `other`.
    pub fn is_superset_of(&self, other: &ResourceSet) -> bool {
        other
            .resources
            .iter()
            .all(|(name, amount)| self.get(name) >= *amount)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Number of distinct resource types.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Iterate over (name, quantity) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FixedPoint)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Convert to a map of resource name → double.
    pub fn to_map(&self) -> HashMap<String, f64> {
        self.resources
            .iter()
            .map(|(k, v)| (k.clone(), v.to_f64()))
            .collect()
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, amount)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {amount}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_arithmetic() {
        let a = FixedPoint::from_f64(1.5);
        let b = FixedPoint::from_f64(0.5);
        assert_eq!((a + b).to_f64(), 2.0);
        assert_eq!((a - b).to_f64(), 1.0);
    }

    #[test]
    fn test_fixed_point_precision() {
        // 0.0001 is the smallest representable unit (1/10000)
        let tiny = FixedPoint::from_f64(0.0001);
        assert_eq!(tiny.raw(), 1);
        assert!(!tiny.is_zero());
        // 0.1 + 0.2 is exact in fixed point
        assert_eq!(
            FixedPoint::from_f64(0.1) + FixedPoint::from_f64(0.2),
            FixedPoint::from_f64(0.3)
        );
    }

    #[test]
    fn test_fixed_point_saturates() {
        assert_eq!(FixedPoint::from_f64(1e16), FixedPoint::MAX);
        assert_eq!(FixedPoint::from_f64(f64::INFINITY), FixedPoint::MAX);
        assert_eq!(FixedPoint::from_f64(f64::NEG_INFINITY), FixedPoint::MIN);
        assert_eq!(FixedPoint::from_f64(f64::NAN), FixedPoint::ZERO);

        let four = FixedPoint::from_f64(4.0);
        assert_eq!(FixedPoint::MAX + four, FixedPoint::MAX);
        assert_eq!(FixedPoint::MIN - four, FixedPoint::MIN);
        let mut x = four;
        x += FixedPoint::MAX;
        assert_eq!(x, FixedPoint::MAX);
        x -= four;
        assert_eq!(x + four, FixedPoint::MAX);
    }

    #[test]
    fn test_clamp_to() {
        let four = FixedPoint::from_f64(4.0);
        assert_eq!(FixedPoint::from_f64(7.0).clamp_to(FixedPoint::ZERO, four), four);
        assert_eq!(
            FixedPoint::from_f64(-1.0).clamp_to(FixedPoint::ZERO, four),
            FixedPoint::ZERO
        );
        assert_eq!(
            FixedPoint::from_f64(2.5).clamp_to(FixedPoint::ZERO, four),
            FixedPoint::from_f64(2.5)
        );
    }

    #[test]
    fn test_from_map_drops_non_positive() {
        let set = ResourceSet::from_map(&HashMap::from([
            ("CPU".to_string(), 2.0),
            ("GPU".to_string(), 0.0),
            ("custom".to_string(), -1.0),
        ]));
        assert_eq!(set.len(), 1);
        assert!(set.contains("CPU"));
        assert!(!set.contains("GPU"));
    }

    #[test]
    fn test_resource_set_superset() {
        let mut available = ResourceSet::new();
        available.set("CPU", FixedPoint::from_f64(4.0));
        available.set("GPU", FixedPoint::from_f64(2.0));

        let mut required = ResourceSet::new();
        required.set("CPU", FixedPoint::from_f64(2.0));
        required.set("GPU", FixedPoint::from_f64(1.0));
        assert!(available.is_superset_of(&required));

        required.set("GPU", FixedPoint::from_f64(3.0));
        assert!(!available.is_superset_of(&required));

        // A resource the node does not have at all.
        let mut exotic = ResourceSet::new();
        exotic.set("TPU", FixedPoint::from_f64(0.5));
        assert!(!available.is_superset_of(&exotic));
    }

    #[test]
    fn test_resource_set_add_subtract() {
        let mut a = ResourceSet::new();
        a.set("CPU", FixedPoint::from_f64(2.0));

        let mut b = ResourceSet::new();
        b.set("CPU", FixedPoint::from_f64(1.0));
        b.set("memory", FixedPoint::from_f64(1024.0));

        a.add(&b);
        assert_eq!(a.get("CPU").to_f64(), 3.0);
        assert_eq!(a.get("memory").to_f64(), 1024.0);

        a.subtract(&b);
        assert_eq!(a.get("CPU").to_f64(), 2.0);
        // memory becomes zero and is removed
        assert!(!a.contains("memory"));
    }

    #[test]
    fn test_equal_sets_hash_equal() {
        use std::collections::HashSet;
        let mut a = ResourceSet::new();
        a.set("CPU", FixedPoint::from_f64(1.0));
        a.set("GPU", FixedPoint::from_f64(1.0));
        let mut b = ResourceSet::new();
        b.set("GPU", FixedPoint::from_f64(1.0));
        b.set("CPU", FixedPoint::from_f64(1.0));
        let set: HashSet<ResourceSet> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        let mut a = ResourceSet::new();
        a.set("GPU", FixedPoint::from_f64(1.0));
        a.set("CPU", FixedPoint::from_f64(0.5));
        assert_eq!(a.to_string(), "{CPU: 0.5, GPU: 1}");
    }
}
