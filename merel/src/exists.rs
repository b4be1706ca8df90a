/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cell::RefCell;
use std::sync::Arc;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::algebra::GraphPattern;
use crate::errors::EvaluationError;
use crate::eval_context::EvaluationContext;
use crate::multiset::Multiset;

/// EXISTS / NOT EXISTS over a correlated graph pattern, answered with an
/// indexed semi-join instead of the naive pairwise scan.
///
/// The cache is keyed on the identity of the current input multiset
/// (pointer plus cardinality) and is rebuilt whenever that identity
/// changes. It belongs to this one expression node; a node shared across
/// threads must be cloned per thread, which also resets the cache.
#[derive(Debug)]
pub struct ExistsExpression {
    pattern: GraphPattern,
    must_exist: bool,
    cache: RefCell<Option<ExistsCache>>,
}

#[derive(Debug)]
struct ExistsCache {
    fingerprint: (usize, usize),
    inner: Arc<Multiset>,
    join_vars: Vec<String>,
    matched: FxHashSet<usize>,
}

impl Clone for ExistsExpression {
    fn clone(&self) -> Self {
        // The memo belongs to one evaluation thread; clones start cold.
        ExistsExpression {
            pattern: self.pattern.clone(),
            must_exist: self.must_exist,
            cache: RefCell::new(None),
        }
    }
}

impl PartialEq for ExistsExpression {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.must_exist == other.must_exist
    }
}

impl ExistsExpression {
    pub fn new(pattern: GraphPattern, must_exist: bool) -> Self {
        ExistsExpression {
            pattern,
            must_exist,
            cache: RefCell::new(None),
        }
    }

    pub fn pattern(&self) -> &GraphPattern {
        &self.pattern
    }

    pub fn must_exist(&self) -> bool {
        self.must_exist
    }

    pub fn functor(&self) -> &'static str {
        if self.must_exist {
            "EXISTS"
        } else {
            "NOT EXISTS"
        }
    }

    /// Answers the existence test for one solution of the context's
    /// current input multiset.
    pub fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        binding_id: usize,
    ) -> Result<bool, EvaluationError> {
        let fingerprint = (Arc::as_ptr(ctx.input()) as *const () as usize, ctx.input().len());

        {
            let borrowed = self.cache.borrow();
            if let Some(cache) = borrowed.as_ref() {
                if cache.fingerprint == fingerprint {
                    return Ok(self.answer(cache, binding_id));
                }
            }
        }

        // Drop the stale epoch first so a failed rebuild retries cleanly.
        self.cache.replace(None);
        let cache = self.rebuild(ctx, fingerprint)?;
        let answer = self.answer(&cache, binding_id);
        self.cache.replace(Some(cache));
        Ok(answer)
    }

    fn answer(&self, cache: &ExistsCache, binding_id: usize) -> bool {
        // Identity carries one unconstrained solution: a match for everyone.
        if cache.inner.is_identity() {
            return self.must_exist;
        }
        // Null and empty alike mean nobody has a match.
        if cache.inner.is_null() || cache.inner.is_empty() {
            return !self.must_exist;
        }
        // Disjoint schemas: a non-empty inner result is compatible with
        // every outer solution, uniformly.
        if cache.join_vars.is_empty() {
            return self.must_exist;
        }
        let matched = cache.matched.contains(&binding_id);
        if self.must_exist {
            matched
        } else {
            !matched
        }
    }

    /// Evaluates the inner pattern once for the current input epoch and
    /// builds the semi-join index. O(n + m·k) for n outer solutions, m
    /// inner solutions and average candidate-set size k.
    fn rebuild(
        &self,
        ctx: &mut EvaluationContext<'_>,
        fingerprint: (usize, usize),
    ) -> Result<ExistsCache, EvaluationError> {
        let outer = Arc::clone(ctx.input());
        debug!(
            "rebuilding {} memo for an input of {} solution(s)",
            self.functor(),
            outer.len()
        );

        // Sub-algebra evaluation overwrites the context input; put the
        // original back before anything else can observe it.
        let inner = ctx.evaluate(&self.pattern)?;
        ctx.set_input(Arc::clone(&outer));

        let outer_vars = outer.variables();
        let inner_vars = inner.variables();
        let join_vars: Vec<String> = outer_vars.intersection(&inner_vars).cloned().collect();

        let mut matched: FxHashSet<usize> = FxHashSet::default();

        let degenerate = inner.is_identity() || inner.is_null() || inner.is_empty();
        if !degenerate && !join_vars.is_empty() {
            // One index per join variable over the outer multiset: term to
            // solution ids, plus the ids that leave the variable unbound.
            let mut values: Vec<FxHashMap<u32, Vec<usize>>> = Vec::with_capacity(join_vars.len());
            let mut unbound: Vec<Vec<usize>> = Vec::with_capacity(join_vars.len());
            for _ in &join_vars {
                values.push(FxHashMap::default());
                unbound.push(Vec::new());
            }
            for binding in outer.bindings() {
                for (i, var) in join_vars.iter().enumerate() {
                    match binding.value(var) {
                        Some(term) => values[i].entry(term).or_default().push(binding.id()),
                        None => unbound[i].push(binding.id()),
                    }
                }
            }

            let all_ids = outer.binding_ids();

            // Single pass over the inner result, intersecting candidate
            // outer ids across the join variables.
            for inner_binding in inner.bindings() {
                let mut candidates: Option<Vec<usize>> = None;
                let mut dead_end = false;

                for (i, var) in join_vars.iter().enumerate() {
                    let term = match inner_binding.value(var) {
                        // Unbound on the inner side matches every outer
                        // solution, so it never narrows the intersection.
                        None => continue,
                        Some(term) => term,
                    };
                    let contribution: FxHashSet<usize> = values[i]
                        .get(&term)
                        .into_iter()
                        .flatten()
                        .copied()
                        .chain(unbound[i].iter().copied())
                        .collect();
                    if contribution.is_empty() {
                        dead_end = true;
                        break;
                    }
                    match candidates.as_mut() {
                        None => candidates = Some(contribution.into_iter().collect()),
                        Some(ids) => {
                            ids.retain(|id| contribution.contains(id));
                            if ids.is_empty() {
                                dead_end = true;
                                break;
                            }
                        }
                    }
                }
                if dead_end {
                    continue;
                }

                // All join variables unbound on the inner side: everyone
                // is a candidate.
                let candidates = candidates.unwrap_or_else(|| all_ids.clone());

                // Exact compatibility check over every variable both
                // solutions bind; already-matched ids are settled for this
                // epoch and are never re-examined.
                for id in candidates {
                    if matched.contains(&id) {
                        continue;
                    }
                    if let Some(outer_binding) = outer.binding(id) {
                        if outer_binding.is_compatible_with(inner_binding) {
                            matched.insert(id);
                        }
                    }
                }
            }
        }

        Ok(ExistsCache {
            fingerprint,
            inner,
            join_vars,
            matched,
        })
    }
}
