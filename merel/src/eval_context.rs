/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::sync::Arc;
use log::debug;
use shared::terms::{Term, TriplePattern};
use crate::algebra::GraphPattern;
use crate::dataset::Dataset;
use crate::errors::EvaluationError;
use crate::multiset::{Multiset, SolutionSet};

/// Carries the current input multiset through one expression evaluation
/// and evaluates sub-algebras against the dataset. The input slot is
/// shared mutable state: `evaluate` overwrites it with the produced
/// multiset, so callers that need the original must save and restore it
/// around the call.
pub struct EvaluationContext<'a> {
    dataset: &'a dyn Dataset,
    input: Arc<Multiset>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(dataset: &'a dyn Dataset, input: Arc<Multiset>) -> Self {
        EvaluationContext { dataset, input }
    }

    pub fn dataset(&self) -> &'a dyn Dataset {
        self.dataset
    }

    pub fn input(&self) -> &Arc<Multiset> {
        &self.input
    }

    pub fn set_input(&mut self, input: Arc<Multiset>) {
        self.input = input;
    }

    /// Evaluates a graph pattern to a solution multiset. Usable
    /// recursively; the result also becomes the context's new input.
    pub fn evaluate(&mut self, pattern: &GraphPattern) -> Result<Arc<Multiset>, EvaluationError> {
        let result = Arc::new(self.evaluate_pattern(pattern)?);
        debug!(
            "evaluated graph pattern to {} solution(s)",
            result.len()
        );
        self.input = Arc::clone(&result);
        Ok(result)
    }

    fn evaluate_pattern(&self, pattern: &GraphPattern) -> Result<Multiset, EvaluationError> {
        let graph = match &pattern.graph {
            Some(Term::Constant(id)) => {
                if !self.dataset.contains_graph(*id) {
                    debug!("graph <{}> not in dataset, result is the null multiset", id);
                    return Ok(Multiset::Null);
                }
                Some(*id)
            }
            Some(Term::Variable(name)) => {
                return Err(EvaluationError::PatternFailed(format!(
                    "graph position ?{} must be a constant term",
                    name
                )));
            }
            None => None,
        };

        if pattern.patterns.is_empty() {
            return Ok(Multiset::Identity);
        }

        let mut rows: Vec<HashMap<String, u32>> = vec![HashMap::new()];
        for triple_pattern in &pattern.patterns {
            rows = self.join_pattern(graph, triple_pattern, rows);
            if rows.is_empty() {
                break;
            }
        }

        let mut set = SolutionSet::new();
        for row in rows {
            set.add(row);
        }
        Ok(Multiset::Solutions(set))
    }

    fn join_pattern(
        &self,
        graph: Option<u32>,
        triple_pattern: &TriplePattern,
        rows: Vec<HashMap<String, u32>>,
    ) -> Vec<HashMap<String, u32>> {
        let (s, p, o) = triple_pattern;
        let mut joined = Vec::new();
        for row in rows {
            let sq = constrain(s, &row);
            let pq = constrain(p, &row);
            let oq = constrain(o, &row);
            let matches = match graph {
                Some(g) => self.dataset.graph_triples_matching(g, sq, pq, oq),
                None => self.dataset.triples_matching(sq, pq, oq),
            };
            for triple in matches {
                let mut extended = row.clone();
                if bind(s, triple.subject, &mut extended)
                    && bind(p, triple.predicate, &mut extended)
                    && bind(o, triple.object, &mut extended)
                {
                    joined.push(extended);
                }
            }
        }
        joined
    }
}

/// Turns a pattern position into a lookup constraint: constants and
/// already-bound variables constrain the scan, fresh variables do not.
fn constrain(term: &Term, row: &HashMap<String, u32>) -> Option<u32> {
    match term {
        Term::Constant(id) => Some(*id),
        Term::Variable(name) => row.get(name).copied(),
    }
}

/// Binds a variable position, rejecting the row when the variable is
/// already bound to a different term (repeated variables in one pattern).
fn bind(term: &Term, value: u32, row: &mut HashMap<String, u32>) -> bool {
    match term {
        Term::Variable(name) => match row.get(name) {
            Some(existing) => *existing == value,
            None => {
                row.insert(name.clone(), value);
                true
            }
        },
        Term::Constant(_) => true,
    }
}
