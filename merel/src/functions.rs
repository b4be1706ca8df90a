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
use crate::errors::{ConstructionError, EvaluationError, TransformError};
use crate::eval_context::EvaluationContext;
use crate::expression::{EvalValue, Expression};
use crate::transform::ExpressionTransformer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFunctionKind {
    Contains,
    StrStarts,
    StrEnds,
    UCase,
    LCase,
    StrLen,
}

impl StringFunctionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            StringFunctionKind::Contains => "CONTAINS",
            StringFunctionKind::StrStarts => "STRSTARTS",
            StringFunctionKind::StrEnds => "STRENDS",
            StringFunctionKind::UCase => "UCASE",
            StringFunctionKind::LCase => "LCASE",
            StringFunctionKind::StrLen => "STRLEN",
        }
    }

    fn requires_argument(&self) -> bool {
        matches!(
            self,
            StringFunctionKind::Contains
                | StringFunctionKind::StrStarts
                | StringFunctionKind::StrEnds
        )
    }
}

/// A string function over a primary expression and an optional argument
/// expression. The argument must be string-valued; whether it may be
/// absent is fixed per kind at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct StringFunction {
    kind: StringFunctionKind,
    expr: Box<Expression>,
    arg: Option<Box<Expression>>,
}

impl StringFunction {
    pub fn new(
        kind: StringFunctionKind,
        expr: Expression,
        arg: Option<Expression>,
    ) -> Result<Self, ConstructionError> {
        if kind.requires_argument() && arg.is_none() {
            return Err(ConstructionError::MissingArgument(kind.keyword()));
        }
        Ok(StringFunction {
            kind,
            expr: Box::new(expr),
            arg: arg.map(Box::new),
        })
    }

    pub fn kind(&self) -> StringFunctionKind {
        self.kind
    }

    pub fn keyword(&self) -> &'static str {
        self.kind.keyword()
    }

    pub fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        binding_id: usize,
    ) -> Result<EvalValue, EvaluationError> {
        let primary = self.expr.evaluate(ctx, binding_id)?;
        let argument = match &self.arg {
            Some(arg) => Some(arg.evaluate(ctx, binding_id)?),
            None => None,
        };
        let dictionary = ctx.dataset().dictionary();

        let input = match &primary {
            EvalValue::Str(_) | EvalValue::Term(_) => primary.lexical(dictionary)?,
            other => {
                return Err(EvaluationError::TypeMismatch {
                    expected: "string literal",
                    found: other.type_name().to_string(),
                });
            }
        };

        match argument {
            None => {
                if self.kind.requires_argument() {
                    return Err(EvaluationError::MissingArgument(self.keyword()));
                }
                self.apply_unary(&input)
            }
            Some(value) => {
                // The argument position only accepts string-typed values.
                let arg = match &value {
                    EvalValue::Str(_) | EvalValue::Term(_) => value.lexical(dictionary)?,
                    _ => return Err(EvaluationError::InvalidArgument(self.keyword())),
                };
                self.apply_binary(&input, &arg)
            }
        }
    }

    fn apply_unary(&self, input: &str) -> Result<EvalValue, EvaluationError> {
        match self.kind {
            StringFunctionKind::UCase => Ok(EvalValue::Str(input.to_uppercase())),
            StringFunctionKind::LCase => Ok(EvalValue::Str(input.to_lowercase())),
            StringFunctionKind::StrLen => Ok(EvalValue::Numeric(input.chars().count() as f64)),
            _ => Err(EvaluationError::MissingArgument(self.keyword())),
        }
    }

    fn apply_binary(&self, input: &str, arg: &str) -> Result<EvalValue, EvaluationError> {
        match self.kind {
            StringFunctionKind::Contains => Ok(EvalValue::Boolean(input.contains(arg))),
            StringFunctionKind::StrStarts => Ok(EvalValue::Boolean(input.starts_with(arg))),
            StringFunctionKind::StrEnds => Ok(EvalValue::Boolean(input.ends_with(arg))),
            // The single-argument kinds take no argument at all.
            _ => Err(EvaluationError::InvalidArgument(self.keyword())),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = self.expr.free_variables();
        if let Some(arg) = &self.arg {
            vars.extend(arg.free_variables());
        }
        vars
    }

    pub fn transform(
        &self,
        transformer: &dyn ExpressionTransformer,
    ) -> Result<Expression, TransformError> {
        let expr = Box::new(transformer.transform(&self.expr)?);
        let arg = match &self.arg {
            Some(arg) => Some(Box::new(transformer.transform(arg)?)),
            None => None,
        };
        Ok(Expression::StringFunction(StringFunction {
            kind: self.kind,
            expr,
            arg,
        }))
    }
}

impl fmt::Display for StringFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}({}, {})", self.keyword(), self.expr, arg),
            None => write!(f, "{}({})", self.keyword(), self.expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrigKind {
    Sin,
    Cos,
    Tan,
    Cosecant,
    Secant,
    Cotangent,
}

impl TrigKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TrigKind::Sin => "SIN",
            TrigKind::Cos => "COS",
            TrigKind::Tan => "TAN",
            TrigKind::Cosecant => "COSEC",
            TrigKind::Secant => "SEC",
            TrigKind::Cotangent => "COTAN",
        }
    }
}

/// Unary trigonometric leaf over a numeric-valued expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TrigFunction {
    kind: TrigKind,
    expr: Box<Expression>,
}

impl TrigFunction {
    pub fn new(kind: TrigKind, expr: Expression) -> Self {
        TrigFunction {
            kind,
            expr: Box::new(expr),
        }
    }

    pub fn kind(&self) -> TrigKind {
        self.kind
    }

    pub fn keyword(&self) -> &'static str {
        self.kind.keyword()
    }

    pub fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        binding_id: usize,
    ) -> Result<EvalValue, EvaluationError> {
        let value = self.expr.evaluate(ctx, binding_id)?;
        let n = value.as_numeric(ctx.dataset().dictionary())?;
        let result = match self.kind {
            TrigKind::Sin => n.sin(),
            TrigKind::Cos => n.cos(),
            TrigKind::Tan => n.tan(),
            TrigKind::Cosecant => 1.0 / n.sin(),
            TrigKind::Secant => 1.0 / n.cos(),
            TrigKind::Cotangent => 1.0 / n.tan(),
        };
        Ok(EvalValue::Numeric(result))
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        self.expr.free_variables()
    }

    pub fn transform(
        &self,
        transformer: &dyn ExpressionTransformer,
    ) -> Result<Expression, TransformError> {
        Ok(Expression::Trig(TrigFunction {
            kind: self.kind,
            expr: Box::new(transformer.transform(&self.expr)?),
        }))
    }
}

impl fmt::Display for TrigFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.keyword(), self.expr)
    }
}
