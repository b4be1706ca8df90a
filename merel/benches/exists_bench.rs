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
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use merel::dataset::MemoryDataset;
use merel::eval_context::EvaluationContext;
use merel::expression::Expression;
use merel::algebra::GraphPattern;
use merel::multiset::{Multiset, SolutionSet};
use shared::terms::Term;
use shared::triple::Triple;

const PERSONS: u32 = 5_000;
const COMPANIES: u32 = 200;
const OUTER_SOLUTIONS: usize = 1_000;

struct Fixture {
    dataset: MemoryDataset,
    input: Arc<Multiset>,
    ids: Vec<usize>,
    pattern: GraphPattern,
}

fn build_fixture() -> Fixture {
    let mut rng = StdRng::seed_from_u64(42);
    let mut dataset = MemoryDataset::new();

    let works_for = dataset.dictionary.encode("ex:worksFor");
    let persons: Vec<u32> = (0..PERSONS)
        .map(|i| dataset.dictionary.encode(&format!("ex:person{}", i)))
        .collect();
    let companies: Vec<u32> = (0..COMPANIES)
        .map(|i| dataset.dictionary.encode(&format!("ex:company{}", i)))
        .collect();

    let mut employer = HashMap::new();
    for &person in &persons {
        let company = companies[rng.gen_range(0..companies.len())];
        dataset.add_triple(Triple::new(person, works_for, company));
        employer.insert(person, company);
    }

    // Half the outer solutions carry the correct employer, the other
    // half a random one, so the semi-join has work on both outcomes.
    let mut outer = SolutionSet::new();
    let mut ids = Vec::with_capacity(OUTER_SOLUTIONS);
    for i in 0..OUTER_SOLUTIONS {
        let person = persons[rng.gen_range(0..persons.len())];
        let company = if i % 2 == 0 {
            employer[&person]
        } else {
            companies[rng.gen_range(0..companies.len())]
        };
        let mut values = HashMap::new();
        values.insert("person".to_string(), person);
        values.insert("company".to_string(), company);
        ids.push(outer.add(values));
    }

    let pattern = GraphPattern::new(vec![(
        Term::Variable("person".to_string()),
        Term::Constant(works_for),
        Term::Variable("company".to_string()),
    )]);

    Fixture {
        dataset,
        input: Arc::new(Multiset::Solutions(outer)),
        ids,
        pattern,
    }
}

fn bench_exists_cold(c: &mut Criterion) {
    let fixture = build_fixture();
    c.bench_function("exists cold semi-join", |b| {
        b.iter(|| {
            // A fresh expression rebuilds the index and matched set.
            let exists = Expression::exists(fixture.pattern.clone());
            let mut ctx =
                EvaluationContext::new(&fixture.dataset, Arc::clone(&fixture.input));
            let mut matched = 0usize;
            for &id in &fixture.ids {
                if let Ok(value) = exists.evaluate(&mut ctx, id) {
                    if value == merel::expression::EvalValue::Boolean(true) {
                        matched += 1;
                    }
                }
            }
            black_box(matched)
        })
    });
}

fn bench_exists_warm(c: &mut Criterion) {
    let fixture = build_fixture();
    let exists = Expression::exists(fixture.pattern.clone());
    let mut ctx = EvaluationContext::new(&fixture.dataset, Arc::clone(&fixture.input));
    // Populate the per-epoch cache once before measuring.
    let _ = exists.evaluate(&mut ctx, fixture.ids[0]);
    c.bench_function("exists warm per-solution probe", |b| {
        b.iter(|| {
            let mut matched = 0usize;
            for &id in &fixture.ids {
                if let Ok(value) = exists.evaluate(&mut ctx, id) {
                    if value == merel::expression::EvalValue::Boolean(true) {
                        matched += 1;
                    }
                }
            }
            black_box(matched)
        })
    });
}

criterion_group!(benches, bench_exists_cold, bench_exists_warm);
criterion_main!(benches);
