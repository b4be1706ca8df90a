/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeSet;
use std::fmt;
use shared::terms::{Term, TriplePattern};

/// A basic graph pattern, optionally scoped to one named graph.
/// This is the sub-algebra an existence test evaluates.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPattern {
    pub graph: Option<Term>,
    pub patterns: Vec<TriplePattern>,
}

impl GraphPattern {
    pub fn new(patterns: Vec<TriplePattern>) -> Self {
        GraphPattern { graph: None, patterns }
    }

    pub fn with_graph(graph: Term, patterns: Vec<TriplePattern>) -> Self {
        GraphPattern { graph: Some(graph), patterns }
    }

    /// Every variable the pattern mentions, graph position included.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        if let Some(Term::Variable(name)) = &self.graph {
            vars.insert(name.clone());
        }
        for (s, p, o) in &self.patterns {
            for term in [s, p, o] {
                if let Term::Variable(name) = term {
                    vars.insert(name.clone());
                }
            }
        }
        vars
    }

}

impl fmt::Display for GraphPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        if let Some(g) = &self.graph {
            write!(f, " GRAPH {} {{", g)?;
        }
        for (s, p, o) in &self.patterns {
            write!(f, " {} {} {} .", s, p, o)?;
        }
        if self.graph.is_some() {
            write!(f, " }}")?;
        }
        write!(f, " }}")
    }
}
