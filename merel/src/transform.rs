/*
 * Copyright © 2026 Volodymyr Kadzhaia
 * Copyright © 2026 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::errors::TransformError;
use crate::expression::Expression;

/// A rewrite hook applied to every child of an expression node when the
/// tree is rebuilt, e.g. by an optimizer pass. Implementations decide
/// whether to recurse via `Expression::transform` or to replace a
/// subtree wholesale.
pub trait ExpressionTransformer {
    fn transform(&self, expression: &Expression) -> Result<Expression, TransformError>;
}

/// Closure-backed transformer for one-off rewrite passes.
pub struct FnTransformer<F>
where
    F: Fn(&Expression) -> Result<Expression, TransformError>,
{
    rewrite: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&Expression) -> Result<Expression, TransformError>,
{
    pub fn new(rewrite: F) -> Self {
        FnTransformer { rewrite }
    }
}

impl<F> ExpressionTransformer for FnTransformer<F>
where
    F: Fn(&Expression) -> Result<Expression, TransformError>,
{
    fn transform(&self, expression: &Expression) -> Result<Expression, TransformError> {
        (self.rewrite)(expression)
    }
}

/// Leaves every node untouched while still exercising the full rebuild
/// path; useful as the base of recursive rewrites.
pub struct IdentityTransformer;

impl ExpressionTransformer for IdentityTransformer {
    fn transform(&self, expression: &Expression) -> Result<Expression, TransformError> {
        expression.transform(self)
    }
}
