/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Raised when an expression cannot produce a value for a solution.
/// Always fatal to the current `evaluate` call; evaluation never
/// substitutes a default value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("variable ?{0} is not bound in this solution")]
    UnboundVariable(String),

    #[error("no solution with id {0} in the current input multiset")]
    UnknownBinding(usize),

    #[error("expected a {expected} value but got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("{0} requires an argument but none was supplied")]
    MissingArgument(&'static str),

    #[error("argument of {0} has a type the function does not accept")]
    InvalidArgument(&'static str),

    #[error("division by zero")]
    DivisionByZero,

    #[error("graph pattern evaluation failed: {0}")]
    PatternFailed(String),
}

/// Raised when a tree rewrite returns a replacement whose shape is
/// incompatible with the node being rebuilt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("transformer produced a {found} node where a {expected} was required")]
    ShapeMismatch {
        expected: &'static str,
        found: String,
    },
}

/// Raised synchronously at build time for invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("a chained handler needs at least {minimum} sinks, got {got}")]
    TooFewHandlers { minimum: usize, got: usize },

    #[error("all sinks of a chained handler must be distinct instances")]
    DuplicateHandler,

    #[error("{0} requires an argument expression at construction")]
    MissingArgument(&'static str),
}
