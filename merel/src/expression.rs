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
use shared::dictionary::Dictionary;
use crate::algebra::GraphPattern;
use crate::errors::{EvaluationError, TransformError};
use crate::eval_context::EvaluationContext;
use crate::exists::ExistsExpression;
use crate::functions::{StringFunction, TrigFunction};
use crate::transform::ExpressionTransformer;

/// A value produced by evaluating an expression for one solution.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    /// A dictionary-encoded RDF term.
    Term(u32),
    Boolean(bool),
    Numeric(f64),
    Str(String),
}

impl EvalValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::Term(_) => "term",
            EvalValue::Boolean(_) => "boolean",
            EvalValue::Numeric(_) => "numeric",
            EvalValue::Str(_) => "string",
        }
    }

    /// Lexical form of the value, decoding terms through the dictionary.
    pub fn lexical(&self, dictionary: &Dictionary) -> Result<String, EvaluationError> {
        match self {
            EvalValue::Str(s) => Ok(s.clone()),
            EvalValue::Term(id) => dictionary
                .decode(*id)
                .map(|s| s.to_string())
                .ok_or(EvaluationError::TypeMismatch {
                    expected: "known term",
                    found: format!("unregistered term id {}", id),
                }),
            EvalValue::Boolean(b) => Ok(b.to_string()),
            EvalValue::Numeric(n) => Ok(n.to_string()),
        }
    }

    pub fn as_numeric(&self, dictionary: &Dictionary) -> Result<f64, EvaluationError> {
        let lexical = match self {
            EvalValue::Numeric(n) => return Ok(*n),
            EvalValue::Boolean(_) => {
                return Err(EvaluationError::TypeMismatch {
                    expected: "numeric",
                    found: "boolean".to_string(),
                });
            }
            other => other.lexical(dictionary)?,
        };
        lexical
            .parse::<f64>()
            .map_err(|_| EvaluationError::TypeMismatch {
                expected: "numeric",
                found: format!("\"{}\"", lexical),
            })
    }

    /// SPARQL effective boolean value, with the engine's usual
    /// parse-number-first fallback for plain literals.
    pub fn effective_boolean(&self, dictionary: &Dictionary) -> Result<bool, EvaluationError> {
        match self {
            EvalValue::Boolean(b) => Ok(*b),
            EvalValue::Numeric(n) => Ok(*n != 0.0),
            EvalValue::Str(s) => Ok(boolean_of_lexical(s)),
            EvalValue::Term(_) => {
                let lexical = self.lexical(dictionary)?;
                Ok(boolean_of_lexical(&lexical))
            }
        }
    }
}

fn boolean_of_lexical(lexical: &str) -> bool {
    match lexical {
        "true" => true,
        "false" => false,
        other => match other.parse::<f64>() {
            Ok(n) => n != 0.0,
            Err(_) => !other.is_empty(),
        },
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Term(id) => write!(f, "<{}>", id),
            EvalValue::Boolean(b) => write!(f, "{}", b),
            EvalValue::Numeric(n) => write!(f, "{}", n),
            EvalValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

/// The closed expression-tree variant. Every node evaluates against one
/// solution of the context's input multiset and can be rebuilt through a
/// transformer without losing its functor or flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(EvalValue),
    Variable(String),
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    StringFunction(StringFunction),
    Trig(TrigFunction),
    Exists(ExistsExpression),
    /// A graph pattern carried as an expression, used as the dispatch
    /// vehicle when existence nodes are rewritten.
    Pattern(GraphPattern),
}

impl Expression {
    pub fn variable(name: &str) -> Self {
        Expression::Variable(name.to_string())
    }

    pub fn exists(pattern: GraphPattern) -> Self {
        Expression::Exists(ExistsExpression::new(pattern, true))
    }

    pub fn not_exists(pattern: GraphPattern) -> Self {
        Expression::Exists(ExistsExpression::new(pattern, false))
    }

    /// Computes this node's value for one solution. Referentially
    /// transparent for a fixed (context, id) pair; the existence variant
    /// memoizes per input-multiset epoch.
    pub fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        binding_id: usize,
    ) -> Result<EvalValue, EvaluationError> {
        match self {
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Variable(name) => {
                let binding = ctx
                    .input()
                    .binding(binding_id)
                    .ok_or(EvaluationError::UnknownBinding(binding_id))?;
                binding
                    .value(name)
                    .map(EvalValue::Term)
                    .ok_or_else(|| EvaluationError::UnboundVariable(name.clone()))
            }
            Expression::Compare { op, lhs, rhs } => {
                let left = lhs.evaluate(ctx, binding_id)?;
                let right = rhs.evaluate(ctx, binding_id)?;
                let dictionary = ctx.dataset().dictionary();
                Ok(EvalValue::Boolean(compare_values(
                    &left, &right, *op, dictionary,
                )?))
            }
            Expression::Arithmetic { op, lhs, rhs } => {
                let left = lhs.evaluate(ctx, binding_id)?;
                let right = rhs.evaluate(ctx, binding_id)?;
                let dictionary = ctx.dataset().dictionary();
                let l = left.as_numeric(dictionary)?;
                let r = right.as_numeric(dictionary)?;
                let result = match op {
                    ArithmeticOp::Add => l + r,
                    ArithmeticOp::Subtract => l - r,
                    ArithmeticOp::Multiply => l * r,
                    ArithmeticOp::Divide => {
                        if r == 0.0 {
                            return Err(EvaluationError::DivisionByZero);
                        }
                        l / r
                    }
                };
                Ok(EvalValue::Numeric(result))
            }
            Expression::And(lhs, rhs) => {
                let left = lhs.evaluate(ctx, binding_id)?;
                if !left.effective_boolean(ctx.dataset().dictionary())? {
                    return Ok(EvalValue::Boolean(false));
                }
                let right = rhs.evaluate(ctx, binding_id)?;
                let value = right.effective_boolean(ctx.dataset().dictionary())?;
                Ok(EvalValue::Boolean(value))
            }
            Expression::Or(lhs, rhs) => {
                let left = lhs.evaluate(ctx, binding_id)?;
                if left.effective_boolean(ctx.dataset().dictionary())? {
                    return Ok(EvalValue::Boolean(true));
                }
                let right = rhs.evaluate(ctx, binding_id)?;
                let value = right.effective_boolean(ctx.dataset().dictionary())?;
                Ok(EvalValue::Boolean(value))
            }
            Expression::Not(inner) => {
                let value = inner.evaluate(ctx, binding_id)?;
                let b = value.effective_boolean(ctx.dataset().dictionary())?;
                Ok(EvalValue::Boolean(!b))
            }
            Expression::StringFunction(func) => func.evaluate(ctx, binding_id),
            Expression::Trig(func) => func.evaluate(ctx, binding_id),
            Expression::Exists(exists) => {
                exists.evaluate(ctx, binding_id).map(EvalValue::Boolean)
            }
            Expression::Pattern(_) => Err(EvaluationError::TypeMismatch {
                expected: "scalar expression",
                found: "graph pattern".to_string(),
            }),
        }
    }

    /// The exact set of variables this expression references. Planners
    /// rely on there being no false negatives.
    pub fn free_variables(&self) -> BTreeSet<String> {
        match self {
            Expression::Constant(_) => BTreeSet::new(),
            Expression::Variable(name) => {
                let mut vars = BTreeSet::new();
                vars.insert(name.clone());
                vars
            }
            Expression::Compare { lhs, rhs, .. } | Expression::Arithmetic { lhs, rhs, .. } => {
                let mut vars = lhs.free_variables();
                vars.extend(rhs.free_variables());
                vars
            }
            Expression::And(lhs, rhs) | Expression::Or(lhs, rhs) => {
                let mut vars = lhs.free_variables();
                vars.extend(rhs.free_variables());
                vars
            }
            Expression::Not(inner) => inner.free_variables(),
            Expression::StringFunction(func) => func.free_variables(),
            Expression::Trig(func) => func.free_variables(),
            Expression::Exists(exists) => exists.pattern().variables(),
            Expression::Pattern(pattern) => pattern.variables(),
        }
    }

    pub fn functor(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "CONST",
            Expression::Variable(_) => "VAR",
            Expression::Compare { op, .. } => op.symbol(),
            Expression::Arithmetic { op, .. } => op.symbol(),
            Expression::And(..) => "&&",
            Expression::Or(..) => "||",
            Expression::Not(_) => "!",
            Expression::StringFunction(func) => func.keyword(),
            Expression::Trig(func) => func.keyword(),
            Expression::Exists(exists) => exists.functor(),
            Expression::Pattern(_) => "PATTERN",
        }
    }

    /// Applies a rewriter to every child and reconstructs an equivalent
    /// node. Existence nodes dispatch their pattern through
    /// `Expression::Pattern` and demand a pattern back.
    pub fn transform(
        &self,
        transformer: &dyn ExpressionTransformer,
    ) -> Result<Expression, TransformError> {
        match self {
            Expression::Constant(_) | Expression::Variable(_) | Expression::Pattern(_) => {
                Ok(self.clone())
            }
            Expression::Compare { op, lhs, rhs } => Ok(Expression::Compare {
                op: *op,
                lhs: Box::new(transformer.transform(lhs)?),
                rhs: Box::new(transformer.transform(rhs)?),
            }),
            Expression::Arithmetic { op, lhs, rhs } => Ok(Expression::Arithmetic {
                op: *op,
                lhs: Box::new(transformer.transform(lhs)?),
                rhs: Box::new(transformer.transform(rhs)?),
            }),
            Expression::And(lhs, rhs) => Ok(Expression::And(
                Box::new(transformer.transform(lhs)?),
                Box::new(transformer.transform(rhs)?),
            )),
            Expression::Or(lhs, rhs) => Ok(Expression::Or(
                Box::new(transformer.transform(lhs)?),
                Box::new(transformer.transform(rhs)?),
            )),
            Expression::Not(inner) => Ok(Expression::Not(Box::new(
                transformer.transform(inner)?,
            ))),
            Expression::StringFunction(func) => func.transform(transformer),
            Expression::Trig(func) => func.transform(transformer),
            Expression::Exists(exists) => {
                let carrier = Expression::Pattern(exists.pattern().clone());
                match transformer.transform(&carrier)? {
                    Expression::Pattern(pattern) => Ok(Expression::Exists(
                        ExistsExpression::new(pattern, exists.must_exist()),
                    )),
                    other => Err(TransformError::ShapeMismatch {
                        expected: "graph pattern",
                        found: other.functor().to_string(),
                    }),
                }
            }
        }
    }
}

fn compare_values(
    left: &EvalValue,
    right: &EvalValue,
    op: CompareOp,
    dictionary: &Dictionary,
) -> Result<bool, EvaluationError> {
    // Numeric comparison when both sides parse as numbers, lexical
    // comparison otherwise.
    let ordering = match (left.as_numeric(dictionary), right.as_numeric(dictionary)) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).ok_or(EvaluationError::TypeMismatch {
            expected: "comparable numeric",
            found: "NaN".to_string(),
        })?,
        _ => {
            let l = left.lexical(dictionary)?;
            let r = right.lexical(dictionary)?;
            l.cmp(&r)
        }
    };
    Ok(match op {
        CompareOp::Eq => ordering.is_eq(),
        CompareOp::Ne => !ordering.is_eq(),
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Ge => ordering.is_ge(),
    })
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "?{}", name),
            Expression::Compare { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.symbol(), rhs)
            }
            Expression::Arithmetic { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.symbol(), rhs)
            }
            Expression::And(lhs, rhs) => write!(f, "({} && {})", lhs, rhs),
            Expression::Or(lhs, rhs) => write!(f, "({} || {})", lhs, rhs),
            Expression::Not(inner) => write!(f, "(!{})", inner),
            Expression::StringFunction(func) => write!(f, "{}", func),
            Expression::Trig(func) => write!(f, "{}", func),
            Expression::Exists(exists) => {
                write!(f, "{} {}", exists.functor(), exists.pattern())
            }
            Expression::Pattern(pattern) => write!(f, "{}", pattern),
        }
    }
}
