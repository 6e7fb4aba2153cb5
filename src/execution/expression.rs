//! Expressions used by guards, tests, assignments and belief-query filters.

use std::cmp::Ordering;
use std::fmt;

use crate::path::Path;
use crate::term::{Atom, Literal, Term};

use super::context::Context;
use super::error::{ExecutionError, ExecutionResult};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// An evaluable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(Term),
    Variable(Path),
    Compare(CompareOp, Box<Expression>, Box<Expression>),
    Arithmetic(ArithmeticOp, Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    /// True if some belief unifies with the (allocated) literal.
    BeliefExists(Literal),
}

impl Expression {
    pub fn constant(value: impl Into<Term>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn var(name: impl Into<Path>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn compare(op: CompareOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Compare(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn arithmetic(op: ArithmeticOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Arithmetic(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Expression, rhs: Expression) -> Self {
        Expression::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expression, rhs: Expression) -> Self {
        Expression::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    /// Variables read by this expression.
    pub fn variables(&self) -> Vec<Path> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut Vec<Path>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(name) => {
                if !found.contains(name) {
                    found.push(name.clone());
                }
            }
            Expression::Compare(_, lhs, rhs)
            | Expression::Arithmetic(_, lhs, rhs)
            | Expression::And(lhs, rhs)
            | Expression::Or(lhs, rhs) => {
                lhs.collect_variables(found);
                rhs.collect_variables(found);
            }
            Expression::Not(inner) => inner.collect_variables(found),
            Expression::BeliefExists(literal) => {
                for var in literal.variables() {
                    if !found.contains(var.name()) {
                        found.push(var.name().clone());
                    }
                }
            }
        }
    }

    /// Evaluate to a term.
    pub fn evaluate(&self, context: &Context<'_>) -> ExecutionResult<Term> {
        match self {
            Expression::Constant(value) => Ok(value.clone()),
            Expression::Variable(name) => Ok(context.value(name)?.clone()),
            Expression::Compare(op, lhs, rhs) => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                compare(*op, &lhs, &rhs, context).map(Term::from)
            }
            Expression::Arithmetic(op, lhs, rhs) => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                arithmetic(*op, &lhs, &rhs, context)
            }
            Expression::And(lhs, rhs) => {
                Ok(Term::from(lhs.evaluate_bool(context)? && rhs.evaluate_bool(context)?))
            }
            Expression::Or(lhs, rhs) => {
                Ok(Term::from(lhs.evaluate_bool(context)? || rhs.evaluate_bool(context)?))
            }
            Expression::Not(inner) => Ok(Term::from(!inner.evaluate_bool(context)?)),
            Expression::BeliefExists(literal) => {
                let pattern = context.allocate(literal);
                Ok(Term::from(context.agent().beliefbase().exists(&pattern)))
            }
        }
    }

    /// Evaluate and require a boolean.
    pub fn evaluate_bool(&self, context: &Context<'_>) -> ExecutionResult<bool> {
        match self.evaluate(context)? {
            Term::Atom(Atom::Bool(value)) => Ok(value),
            other => Err(fault(format!("{other} is not a boolean"), context)),
        }
    }
}

fn fault(message: String, context: &Context<'_>) -> ExecutionError {
    ExecutionError::Expression {
        message,
        context: context.dump(),
    }
}

fn compare(op: CompareOp, lhs: &Term, rhs: &Term, context: &Context<'_>) -> ExecutionResult<bool> {
    let ordering = match (lhs, rhs) {
        (Term::Atom(a), Term::Atom(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => match (a, b) {
                (Atom::Str(x), Atom::Str(y)) => Some(x.cmp(y)),
                _ => None,
            },
        },
        _ => None,
    };
    match op {
        CompareOp::Eq => Ok(ordering.map_or_else(|| lhs == rhs, Ordering::is_eq)),
        CompareOp::Ne => Ok(ordering.map_or_else(|| lhs != rhs, Ordering::is_ne)),
        _ => {
            let ordering = ordering
                .ok_or_else(|| fault(format!("cannot order {lhs} and {rhs}"), context))?;
            Ok(match op {
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Le => ordering.is_le(),
                CompareOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    }
}

fn arithmetic(
    op: ArithmeticOp,
    lhs: &Term,
    rhs: &Term,
    context: &Context<'_>,
) -> ExecutionResult<Term> {
    match (lhs, rhs) {
        (Term::Atom(Atom::Int(a)), Term::Atom(Atom::Int(b))) => {
            let result = match op {
                ArithmeticOp::Add => a.checked_add(*b),
                ArithmeticOp::Sub => a.checked_sub(*b),
                ArithmeticOp::Mul => a.checked_mul(*b),
                ArithmeticOp::Div => a.checked_div(*b),
            };
            result
                .map(Term::from)
                .ok_or_else(|| fault(format!("integer overflow or division by zero in {a} {op} {b}"), context))
        }
        (Term::Atom(a), Term::Atom(b)) => {
            let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                return Err(fault(format!("{lhs} {op} {rhs} is not numeric"), context));
            };
            let result = match op {
                ArithmeticOp::Add => x + y,
                ArithmeticOp::Sub => x - y,
                ArithmeticOp::Mul => x * y,
                ArithmeticOp::Div => x / y,
            };
            if result.is_finite() {
                Ok(Term::from(result))
            } else {
                Err(fault(format!("{lhs} {op} {rhs} is not finite"), context))
            }
        }
        _ => Err(fault(format!("{lhs} {op} {rhs} is not numeric"), context)),
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        };
        write!(f, "{symbol}")
    }
}
