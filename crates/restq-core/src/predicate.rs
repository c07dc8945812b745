//! Predicate compiler and evaluator.
//!
//! Filter rules are compiled against a [`SchemaDescriptor`] into a small
//! predicate AST. Compilation resolves every field and coerces every literal
//! up front, so evaluation never fails and never touches rule text.

use std::cmp::Ordering;

use restq_proto::{Combinator, FilterGroup, FilterRule, Operator, QueryRequest, Value};

use crate::error::Error;
use crate::schema::{FieldRef, SchemaDescriptor};
use crate::search::SearchPredicate;

/// Comparison applied by a [`Predicate::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn from_operator(operator: Operator) -> Option<CompareOp> {
        match operator {
            Operator::Equal => Some(CompareOp::Eq),
            Operator::NotEqual => Some(CompareOp::Ne),
            Operator::Greater => Some(CompareOp::Gt),
            Operator::GreaterOrEqual => Some(CompareOp::Ge),
            Operator::Less => Some(CompareOp::Lt),
            Operator::LessOrEqual => Some(CompareOp::Le),
            Operator::IsNull | Operator::IsNotNull => None,
        }
    }

    /// Apply the comparison to a record value and a coerced literal.
    pub fn apply(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            CompareOp::Eq => values_equal(actual, expected),
            CompareOp::Ne => !values_equal(actual, expected),
            CompareOp::Gt => compare_values(actual, expected).is_some_and(|o| o.is_gt()),
            CompareOp::Ge => compare_values(actual, expected).is_some_and(|o| o.is_ge()),
            CompareOp::Lt => compare_values(actual, expected).is_some_and(|o| o.is_lt()),
            CompareOp::Le => compare_values(actual, expected).is_some_and(|o| o.is_le()),
        }
    }
}

/// A compiled, schema-resolved boolean expression over one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record.
    Always,
    /// Compare a field with a literal already coerced to the field's kind.
    Compare {
        field: FieldRef,
        op: CompareOp,
        value: Value,
    },
    /// Field is null.
    IsNull(FieldRef),
    /// Field is not null.
    IsNotNull(FieldRef),
    /// Free-text search over a set of text fields.
    Search(SearchPredicate),
    /// Every child matches.
    And(Vec<Predicate>),
    /// At least one child matches.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction of two predicates, dropping `Always` operands.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Always, p) | (p, Predicate::Always) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, q) => Predicate::And(vec![p, q]),
        }
    }

    /// Whether this predicate matches everything.
    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Evaluate against a record.
    pub fn matches<T>(&self, schema: &SchemaDescriptor<T>, record: &T) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Compare { field, op, value } => op.apply(&schema.read(field, record), value),
            Predicate::IsNull(field) => schema.read(field, record).is_null(),
            Predicate::IsNotNull(field) => !schema.read(field, record).is_null(),
            Predicate::Search(search) => search.matches(schema, record),
            Predicate::And(children) => children.iter().all(|p| p.matches(schema, record)),
            Predicate::Or(children) => children.iter().any(|p| p.matches(schema, record)),
        }
    }

    /// Number of leaf nodes, for plan logging.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::Always => 0,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::leaf_count).sum()
            }
            _ => 1,
        }
    }
}

/// Compiles filter rules against one schema.
pub struct PredicateCompiler<'a, T> {
    schema: &'a SchemaDescriptor<T>,
}

impl<'a, T> PredicateCompiler<'a, T> {
    /// Create a new compiler for a schema.
    pub fn new(schema: &'a SchemaDescriptor<T>) -> Self {
        Self { schema }
    }

    /// Compile a single rule.
    pub fn compile_rule(&self, rule: &FilterRule) -> Result<Predicate, Error> {
        let field = self.schema.resolve(&rule.field)?;

        let op = match CompareOp::from_operator(rule.operator) {
            Some(op) => op,
            None if rule.operator == Operator::IsNull => return Ok(Predicate::IsNull(field)),
            None => return Ok(Predicate::IsNotNull(field)),
        };

        let literal = rule.value.as_deref().ok_or_else(|| Error::MissingRequiredValue {
            field: rule.field.clone(),
            operator: rule.operator,
        })?;

        let kind = self.schema.descriptor(&field).kind();
        let value = Value::from_literal(kind, literal).ok_or_else(|| Error::LiteralTypeMismatch {
            field: rule.field.clone(),
            kind,
            literal: literal.to_string(),
        })?;

        Ok(Predicate::Compare { field, op, value })
    }

    /// Compile a group; an empty group compiles to `None`.
    pub fn compile_group(&self, group: &FilterGroup) -> Result<Option<Predicate>, Error> {
        let mut children = group
            .rules
            .iter()
            .map(|rule| self.compile_rule(rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(match group.combinator() {
                Combinator::And => Predicate::And(children),
                Combinator::Or => Predicate::Or(children),
            }),
        })
    }

    /// Compile both groups of a request as `(AND-group) OR (OR-group)`.
    ///
    /// An empty group drops out of the disjunction; with both empty the
    /// result is [`Predicate::Always`]. Every rule of both groups is
    /// validated before anything is returned.
    pub fn compile_filters(&self, request: &QueryRequest) -> Result<Predicate, Error> {
        let required = self.compile_group(request.filters())?;
        let inclusive = self.compile_group(request.inclusive())?;

        Ok(match (required, inclusive) {
            (Some(required), Some(inclusive)) => Predicate::Or(vec![required, inclusive]),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => Predicate::Always,
        })
    }
}

/// Check if two values are equal, widening across numeric types.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int64(a), Value::Int64(b)) => a == b,
        (Value::Float64(a), Value::Float64(b)) => a == b,
        (Value::Int64(a), Value::Float64(b)) => (*a as f64) == *b,
        (Value::Float64(a), Value::Int64(b)) => *a == (*b as f64),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
        (Value::Uuid(a), Value::Uuid(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => false,
    }
}

/// Compare two values, returning their ordering if comparable.
///
/// Null is not comparable with anything.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
        (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
