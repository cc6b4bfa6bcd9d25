// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Per-node resource ledger: total capacity paired with what is still free.
//!
//! Every mutation keeps `0 <= available[r] <= total[r]` for every resource
//! `r`. Requests that cannot be honored without breaking that invariant are
//! either rejected (acquire) or clamped (release, capacity changes).

use std::collections::HashMap;
use std::fmt;

use ray_common::scheduling::{FixedPoint, ResourceSet};

/// Total and available resources of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeResources {
    total: ResourceSet,
    available: ResourceSet,
}

impl NodeResources {
    /// A freshly registered node has everything available.
    pub fn new(total: ResourceSet) -> Self {
        Self {
            available: total.clone(),
            total,
        }
    }

    pub fn total(&self) -> &ResourceSet {
        &self.total
    }

    pub fn available(&self) -> &ResourceSet {
        &self.available
    }

    /// Check if resources are available for the given request.
    pub fn is_available(&self, request: &ResourceSet) -> bool {
        self.available.is_superset_of(request)
    }

    /// Deduct `required` from the available resources.
    ///
    /// All-or-nothing: if any single resource is short, nothing changes and
    /// `false` is returned.
    pub fn acquire(&mut self, required: &ResourceSet) -> bool {
        if !self.is_available(required) {
            return false;
        }
        self.available.subtract(required);
        true
    }

    /// Return `acquired` to the available resources, capped at the total.
    ///
    /// Returns `true` if any amount had to be clamped away.
    pub fn release(&mut self, acquired: &ResourceSet) -> bool {
        let mut clamped = false;
        for (name, amount) in acquired.iter() {
            let total = self.total.get(name);
            let wanted = self.available.get(name) + amount;
            let value = wanted.clamp_to(FixedPoint::ZERO, total);
            clamped |= value != wanted;
            self.available.set(name, value);
        }
        clamped
    }

    /// Replace the available resources wholesale.
    ///
    /// Quantities are clamped into `[0, total]`; names the node has no
    /// capacity for are dropped.
    pub fn set_available(&mut self, resources: &ResourceSet) {
        let mut available = ResourceSet::new();
        for (name, amount) in resources.iter() {
            available.set(name, amount.clamp_to(FixedPoint::ZERO, self.total.get(name)));
        }
        self.available = available;
    }

    /// Set the capacity of each named resource and shift its available amount
    /// by the same delta, clamped into `[0, new_total]`.
    pub fn update_capacity(&mut self, changed_resources: &HashMap<String, f64>) {
        for (name, capacity) in changed_resources {
            let new_total = FixedPoint::from_f64(capacity.max(0.0));
            let old_total = self.total.get(name);
            let new_available = (self.available.get(name) + (new_total - old_total))
                .clamp_to(FixedPoint::ZERO, new_total);
            self.total.set(name.as_str(), new_total);
            self.available.set(name.as_str(), new_available);
        }
    }

    /// Forget the named resources entirely.
    pub fn delete(&mut self, resource_names: &[String]) {
        for name in resource_names {
            self.total.remove(name);
            self.available.remove(name);
        }
    }

    /// Whether `0 <= available <= total` holds for every resource.
    pub fn is_consistent(&self) -> bool {
        self.available
            .iter()
            .all(|(name, amount)| !amount.is_negative() && amount <= self.total.get(name))
    }
}

impl fmt::Display for NodeResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{total: {}, available: {}}}",
            self.total, self.available
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(entries: &[(&str, f64)]) -> ResourceSet {
        let mut s = ResourceSet::new();
        for (name, amount) in entries {
            s.set(*name, FixedPoint::from_f64(*amount));
        }
        s
    }

    #[test]
    fn test_new_node_fully_available() {
        let node = NodeResources::new(set(&[("CPU", 4.0), ("GPU", 1.0)]));
        assert_eq!(node.total(), node.available());
        assert!(node.is_consistent());
    }

    #[test]
    fn test_acquire_is_all_or_nothing() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0), ("GPU", 1.0)]));
        assert!(!node.acquire(&set(&[("CPU", 1.0), ("GPU", 2.0)])));
        assert_eq!(node.available(), &set(&[("CPU", 4.0), ("GPU", 1.0)]));

        assert!(node.acquire(&set(&[("CPU", 1.0), ("GPU", 1.0)])));
        assert_eq!(node.available(), &set(&[("CPU", 3.0)]));
        assert!(!node.is_available(&set(&[("GPU", 1.0)])));
    }

    #[test]
    fn test_acquire_unknown_resource_fails() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0)]));
        assert!(!node.acquire(&set(&[("TPU", 1.0)])));
        assert!(node.acquire(&ResourceSet::new()));
        assert_eq!(node.available(), &set(&[("CPU", 4.0)]));
    }

    #[test]
    fn test_release_clamps_to_total() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0)]));
        assert!(node.acquire(&set(&[("CPU", 3.0)])));
        assert!(!node.release(&set(&[("CPU", 1.0)])));
        assert_eq!(node.available().get("CPU").to_f64(), 2.0);

        assert!(node.release(&set(&[("CPU", 3.0)])));
        assert_eq!(node.available().get("CPU").to_f64(), 4.0);

        // Resources the node never had stay at zero.
        assert!(node.release(&set(&[("GPU", 1.0)])));
        assert!(!node.available().contains("GPU"));
        assert!(node.is_consistent());
    }

    #[test]
    fn test_update_capacity_shifts_available() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0)]));
        assert!(node.acquire(&set(&[("CPU", 3.0)])));

        // Grow: available grows by the same delta.
        node.update_capacity(&HashMap::from([("CPU".to_string(), 8.0)]));
        assert_eq!(node.total().get("CPU").to_f64(), 8.0);
        assert_eq!(node.available().get("CPU").to_f64(), 5.0);

        // Shrink below what is in use: available floors at zero.
        node.update_capacity(&HashMap::from([("CPU".to_string(), 2.0)]));
        assert_eq!(node.total().get("CPU").to_f64(), 2.0);
        assert!(node.available().get("CPU").is_zero());

        // A brand new resource starts fully available.
        node.update_capacity(&HashMap::from([("custom".to_string(), 3.0)]));
        assert_eq!(node.available().get("custom").to_f64(), 3.0);
        assert!(node.is_consistent());
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let mut node = NodeResources::new(set(&[("memory", 4.0)]));
        assert!(node.acquire(&set(&[("memory", 1.0)])));

        // Over-release far beyond the representable range clamps to total.
        assert!(node.release(&set(&[("memory", 1e16)])));
        assert_eq!(node.available().get("memory").to_f64(), 4.0);

        node.update_capacity(&HashMap::from([("memory".to_string(), 1e16)]));
        assert_eq!(node.total().get("memory"), FixedPoint::MAX);
        assert_eq!(node.available().get("memory"), FixedPoint::MAX);
        assert!(!node.release(&set(&[("memory", 1.0)])));
        assert_eq!(node.available().get("memory"), FixedPoint::MAX);

        node.update_capacity(&HashMap::from([("memory".to_string(), f64::INFINITY)]));
        assert_eq!(node.total().get("memory"), FixedPoint::MAX);
        node.update_capacity(&HashMap::from([("memory".to_string(), f64::NAN)]));
        assert!(!node.total().contains("memory"));
        assert!(!node.available().contains("memory"));

        node.update_capacity(&HashMap::from([("memory".to_string(), 4.0)]));
        assert_eq!(node.available().get("memory").to_f64(), 4.0);
        assert!(node.is_consistent());
    }

    #[test]
    fn test_set_available_clamps() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0), ("GPU", 2.0)]));
        node.set_available(&set(&[("CPU", 10.0), ("TPU", 1.0)]));
        assert_eq!(node.available(), &set(&[("CPU", 4.0)]));
        assert!(node.is_consistent());
    }

    #[test]
    fn test_delete_resources() {
        let mut node = NodeResources::new(set(&[("CPU", 4.0), ("custom", 1.0)]));
        node.delete(&["custom".to_string(), "missing".to_string()]);
        assert_eq!(node.total(), &set(&[("CPU", 4.0)]));
        assert_eq!(node.available(), &set(&[("CPU", 4.0)]));
    }

    #[test]
    fn test_display() {
        let node = NodeResources::new(set(&[("CPU", 2.0)]));
        assert_eq!(node.to_string(), "{total: {CPU: 2}, available: {CPU: 2}}");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Acquire(f64, f64),
        Release(f64, f64),
        Capacity(f64),
        SetAvailable(f64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let amount = 0.0..10.0f64;
        prop_oneof![
            (amount.clone(), amount.clone()).prop_map(|(c, g)| Op::Acquire(c, g)),
            (amount.clone(), amount.clone()).prop_map(|(c, g)| Op::Release(c, g)),
            amount.clone().prop_map(Op::Capacity),
            amount.prop_map(Op::SetAvailable),
        ]
    }

    proptest! {
        #[test]
        fn prop_available_stays_within_total(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut node = NodeResources::new(set(&[("CPU", 4.0), ("GPU", 2.0)]));
            for op in ops {
                match op {
                    Op::Acquire(c, g) => { node.acquire(&set(&[("CPU", c), ("GPU", g)])); }
                    Op::Release(c, g) => { node.release(&set(&[("CPU", c), ("GPU", g)])); }
                    Op::Capacity(c) => node.update_capacity(&HashMap::from([("CPU".to_string(), c)])),
                    Op::SetAvailable(g) => node.set_available(&set(&[("GPU", g)])),
                }
                prop_assert!(node.is_consistent());
            }
        }

        #[test]
        fn prop_acquire_then_release_restores(c in 0.0..4.0f64, g in 0.0..2.0f64, used in 0.0..2.0f64) {
            let mut node = NodeResources::new(set(&[("CPU", 4.0), ("GPU", 2.0)]));
            node.acquire(&set(&[("CPU", used)]));
            let before = node.available().clone();
            let request = set(&[("CPU", c), ("GPU", g)]);
            if node.acquire(&request) {
                node.release(&request);
                prop_assert_eq!(node.available(), &before);
            } else {
                prop_assert_eq!(node.available(), &before);
            }
        }
    }
}
