/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::{BTreeSet, HashMap};
use rayon::prelude::*;
use shared::dictionary::Dictionary;
use shared::triple::Triple;

// Above this many triples the scan goes through rayon.
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// The storage collaborator evaluation reads from. Pattern evaluation and
/// existence tests never mutate it; mutation lives on the concrete types.
pub trait Dataset {
    fn dictionary(&self) -> &Dictionary;

    /// Triples of the default graph matching the given constants, in a
    /// deterministic order. `None` positions match anything.
    fn triples_matching(&self, s: Option<u32>, p: Option<u32>, o: Option<u32>) -> Vec<Triple>;

    /// Same lookup scoped to one named graph.
    fn graph_triples_matching(
        &self,
        graph: u32,
        s: Option<u32>,
        p: Option<u32>,
        o: Option<u32>,
    ) -> Vec<Triple>;

    fn contains_graph(&self, graph: u32) -> bool;

    fn graph_names(&self) -> Vec<u32>;
}

fn scan(triples: &BTreeSet<Triple>, s: Option<u32>, p: Option<u32>, o: Option<u32>) -> Vec<Triple> {
    let matches = |t: &Triple| {
        s.map_or(true, |v| t.subject == v)
            && p.map_or(true, |v| t.predicate == v)
            && o.map_or(true, |v| t.object == v)
    };
    if triples.len() > PARALLEL_SCAN_THRESHOLD {
        triples.par_iter().filter(|t| matches(t)).copied().collect()
    } else {
        triples.iter().filter(|t| matches(t)).copied().collect()
    }
}

/// In-memory dataset: a default graph plus named graphs, with the
/// dictionary owned alongside the triples.
#[derive(Debug, Default, Clone)]
pub struct MemoryDataset {
    pub dictionary: Dictionary,
    triples: BTreeSet<Triple>,
    graphs: HashMap<u32, BTreeSet<Triple>>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        MemoryDataset::default()
    }

    pub fn add_triple(&mut self, triple: Triple) {
        self.triples.insert(triple);
    }

    pub fn add_triple_parts(&mut self, subject: &str, predicate: &str, object: &str) {
        let triple = Triple {
            subject: self.dictionary.encode(subject),
            predicate: self.dictionary.encode(predicate),
            object: self.dictionary.encode(object),
        };
        self.triples.insert(triple);
    }

    /// Registers a named graph (possibly empty) and returns its id.
    pub fn insert_graph(&mut self, name: &str) -> u32 {
        let id = self.dictionary.encode(name);
        self.graphs.entry(id).or_default();
        id
    }

    pub fn add_graph_triple_parts(
        &mut self,
        graph: &str,
        subject: &str,
        predicate: &str,
        object: &str,
    ) {
        let triple = Triple {
            subject: self.dictionary.encode(subject),
            predicate: self.dictionary.encode(predicate),
            object: self.dictionary.encode(object),
        };
        let id = self.dictionary.encode(graph);
        self.graphs.entry(id).or_default().insert(triple);
    }

    pub fn remove_graph(&mut self, graph: u32) -> bool {
        self.graphs.remove(&graph).is_some()
    }
}

impl Dataset for MemoryDataset {
    fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn triples_matching(&self, s: Option<u32>, p: Option<u32>, o: Option<u32>) -> Vec<Triple> {
        scan(&self.triples, s, p, o)
    }

    fn graph_triples_matching(
        &self,
        graph: u32,
        s: Option<u32>,
        p: Option<u32>,
        o: Option<u32>,
    ) -> Vec<Triple> {
        match self.graphs.get(&graph) {
            Some(triples) => scan(triples, s, p, o),
            None => Vec::new(),
        }
    }

    fn contains_graph(&self, graph: u32) -> bool {
        self.graphs.contains_key(&graph)
    }

    fn graph_names(&self) -> Vec<u32> {
        let mut names: Vec<u32> = self.graphs.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Forwarding decorator that narrows every default-graph lookup to one
/// active named graph of the wrapped dataset. Owns the inner dataset
/// outright; callers reach it back through `into_inner`.
pub struct GraphScopedDataset<D: Dataset> {
    inner: D,
    active: u32,
}

impl<D: Dataset> GraphScopedDataset<D> {
    pub fn new(inner: D, active: u32) -> Self {
        GraphScopedDataset { inner, active }
    }

    pub fn active_graph(&self) -> u32 {
        self.active
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Dataset> Dataset for GraphScopedDataset<D> {
    fn dictionary(&self) -> &Dictionary {
        self.inner.dictionary()
    }

    fn triples_matching(&self, s: Option<u32>, p: Option<u32>, o: Option<u32>) -> Vec<Triple> {
        self.inner.graph_triples_matching(self.active, s, p, o)
    }

    fn graph_triples_matching(
        &self,
        graph: u32,
        s: Option<u32>,
        p: Option<u32>,
        o: Option<u32>,
    ) -> Vec<Triple> {
        self.inner.graph_triples_matching(graph, s, p, o)
    }

    fn contains_graph(&self, graph: u32) -> bool {
        self.inner.contains_graph(graph)
    }

    fn graph_names(&self) -> Vec<u32> {
        self.inner.graph_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> MemoryDataset {
        let mut db = MemoryDataset::new();
        db.add_triple_parts("ex:john", "ex:knows", "ex:jane");
        db.add_triple_parts("ex:john", "ex:name", "John");
        db.add_triple_parts("ex:jane", "ex:name", "Jane");
        db.add_graph_triple_parts("ex:g1", "ex:jane", "ex:knows", "ex:john");
        db
    }

    #[test]
    fn matching_by_each_position() {
        let db = setup();
        let john = db.dictionary.id("ex:john").unwrap();
        let name = db.dictionary.id("ex:name").unwrap();

        assert_eq!(db.triples_matching(Some(john), None, None).len(), 2);
        assert_eq!(db.triples_matching(None, Some(name), None).len(), 2);
        assert_eq!(db.triples_matching(None, None, None).len(), 3);
        assert_eq!(db.triples_matching(Some(name), None, None).len(), 0);
    }

    #[test]
    fn named_graphs_are_separate() {
        let mut db = setup();
        let g1 = db.dictionary.id("ex:g1").unwrap();
        let jane = db.dictionary.id("ex:jane").unwrap();

        assert!(db.contains_graph(g1));
        assert_eq!(db.graph_triples_matching(g1, Some(jane), None, None).len(), 1);
        assert_eq!(db.graph_triples_matching(9999, None, None, None).len(), 0);

        assert!(db.remove_graph(g1));
        assert!(!db.contains_graph(g1));
    }

    #[test]
    fn scoped_dataset_forwards_to_active_graph() {
        let mut db = setup();
        let g1 = db.insert_graph("ex:g1");
        let scoped = GraphScopedDataset::new(db, g1);

        // Default-graph lookups now see only the named graph's triple.
        assert_eq!(scoped.triples_matching(None, None, None).len(), 1);
        assert_eq!(scoped.active_graph(), g1);

        let db = scoped.into_inner();
        assert_eq!(db.triples_matching(None, None, None).len(), 3);
    }
}
