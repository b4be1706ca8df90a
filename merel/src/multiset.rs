/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};
use serde::{Serialize, Deserialize};
use shared::dictionary::Dictionary;

/// One solution row: a mapping from variable name to a dictionary-encoded
/// term id. Unbound variables are absent, never null-valued. The id is
/// assigned by the owning `SolutionSet` and stays stable for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    id: usize,
    values: HashMap<String, u32>,
}

impl Binding {
    fn new(id: usize, values: HashMap<String, u32>) -> Self {
        Binding { id, values }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn value(&self, variable: &str) -> Option<u32> {
        self.values.get(variable).copied()
    }

    /// Open-world join compatibility: every variable bound by both
    /// solutions must carry the same term; a variable unbound on either
    /// side never conflicts.
    pub fn is_compatible_with(&self, other: &Binding) -> bool {
        self.values.iter().all(|(variable, term)| {
            match other.value(variable) {
                Some(other_term) => other_term == *term,
                None => true,
            }
        })
    }
}

/// An ordered collection of solutions plus the variables that appear in
/// any of them. Ids are handed out densely at insertion and never reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    variables: BTreeSet<String>,
    bindings: Vec<Binding>,
    next_id: usize,
}

impl SolutionSet {
    pub fn new() -> Self {
        SolutionSet::default()
    }

    /// Inserts a solution and returns the id assigned to it.
    pub fn add(&mut self, values: HashMap<String, u32>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        for variable in values.keys() {
            self.variables.insert(variable.clone());
        }
        self.bindings.push(Binding::new(id, values));
        id
    }

    /// Ids are positions: the set hands them out densely and never
    /// removes a binding, so lookup is a direct index.
    pub fn binding(&self, id: usize) -> Option<&Binding> {
        let binding = self.bindings.get(id)?;
        debug_assert_eq!(binding.id, id);
        Some(binding)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn binding_ids(&self) -> Vec<usize> {
        self.bindings.iter().map(|b| b.id).collect()
    }

    /// Decodes the solutions into displayable rows.
    pub fn to_rows(&self, dictionary: &Dictionary) -> Vec<BTreeMap<String, String>> {
        self.bindings
            .iter()
            .map(|binding| {
                binding
                    .values
                    .iter()
                    .map(|(variable, term)| {
                        let lexical = dictionary.decode(*term).unwrap_or("unknown");
                        (variable.clone(), lexical.to_string())
                    })
                    .collect()
            })
            .collect()
    }
}

/// A solution multiset with its two degenerate forms kept apart:
/// `Identity` (one solution, no variables, trivially true) and `Null`
/// (zero solutions signalling an undefined evaluation upstream). An
/// empty `Solutions` set is a legitimately false result and must not be
/// confused with `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Multiset {
    Identity,
    Null,
    Solutions(SolutionSet),
}

impl Multiset {
    pub fn empty() -> Self {
        Multiset::Solutions(SolutionSet::new())
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Multiset::Identity)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Multiset::Null)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Multiset::Identity => false,
            Multiset::Null => true,
            Multiset::Solutions(set) => set.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Multiset::Identity => 1,
            Multiset::Null => 0,
            Multiset::Solutions(set) => set.len(),
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        match self {
            Multiset::Identity | Multiset::Null => BTreeSet::new(),
            Multiset::Solutions(set) => set.variables().clone(),
        }
    }

    pub fn binding(&self, id: usize) -> Option<&Binding> {
        match self {
            Multiset::Identity | Multiset::Null => None,
            Multiset::Solutions(set) => set.binding(id),
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        match self {
            Multiset::Identity | Multiset::Null => &[],
            Multiset::Solutions(set) => set.bindings(),
        }
    }

    pub fn binding_ids(&self) -> Vec<usize> {
        match self {
            Multiset::Identity | Multiset::Null => Vec::new(),
            Multiset::Solutions(set) => set.binding_ids(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(v, t)| (v.to_string(), *t)).collect()
    }

    #[test]
    fn ids_are_assigned_densely_and_never_reused() {
        let mut set = SolutionSet::new();
        let a = set.add(solution(&[("x", 1)]));
        let b = set.add(solution(&[("x", 2)]));
        assert_eq!((a, b), (0, 1));
        assert_eq!(set.binding(1).and_then(|b| b.value("x")), Some(2));
        assert_eq!(set.binding(7), None);
    }

    #[test]
    fn binding_lookup_is_positional() {
        let mut set = SolutionSet::new();
        for term in 0..100u32 {
            set.add(solution(&[("x", term)]));
        }
        // Every handed-out id resolves to the binding carrying that id,
        // however many solutions share a term on some other variable.
        for id in set.binding_ids() {
            let binding = set.binding(id).unwrap();
            assert_eq!(binding.id(), id);
            assert_eq!(binding.value("x"), Some(id as u32));
        }
        assert_eq!(set.binding(set.len()), None);
    }

    #[test]
    fn schema_collects_variables_from_every_solution() {
        let mut set = SolutionSet::new();
        set.add(solution(&[("x", 1)]));
        set.add(solution(&[("y", 2)]));
        let vars: Vec<&String> = set.variables().iter().collect();
        assert_eq!(vars.len(), 2);
        assert!(set.variables().contains("x"));
        assert!(set.variables().contains("y"));
    }

    #[test]
    fn compatibility_treats_unbound_as_wildcard() {
        let mut set = SolutionSet::new();
        set.add(solution(&[("x", 1), ("y", 2)]));
        set.add(solution(&[("x", 1)]));
        set.add(solution(&[("x", 3), ("y", 2)]));
        let full = set.binding(0).unwrap();
        let partial = set.binding(1).unwrap();
        let clashing = set.binding(2).unwrap();

        assert!(full.is_compatible_with(partial));
        assert!(partial.is_compatible_with(full));
        assert!(!full.is_compatible_with(clashing));
        assert!(partial.is_compatible_with(clashing));
    }

    #[test]
    fn null_and_empty_stay_distinguishable() {
        let null = Multiset::Null;
        let empty = Multiset::empty();
        assert!(null.is_null());
        assert!(!empty.is_null());
        assert!(null.is_empty());
        assert!(empty.is_empty());
        assert_ne!(null, empty);
    }

    #[test]
    fn identity_has_one_solution_and_no_variables() {
        let identity = Multiset::Identity;
        assert_eq!(identity.len(), 1);
        assert!(!identity.is_empty());
        assert!(identity.variables().is_empty());
    }
}
