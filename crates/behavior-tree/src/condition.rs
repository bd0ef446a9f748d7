//! Applicability conditions.
//!
//! Every node owns a [`Condition`] that gates whether it may run at all. The
//! condition is checked before the node's own applicability logic, on every
//! evaluation, against the caller's input snapshot.
//!
//! Conditions compose with AND/OR/XOR groups and NOT. Groups always start
//! from two operands, so an empty group cannot be built.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitXor, Not};

/// A caller-defined predicate over the input snapshot.
///
/// Implement this for stateful or named predicates; plain closures can use
/// [`Condition::delegate`] instead.
pub trait Predicate<I>: Send + Sync {
    /// Returns `true` if the predicate holds for `input`.
    fn check(&self, input: &I) -> bool;
}

type CheckFn<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// A boolean predicate gating node applicability.
pub enum Condition<I> {
    /// Always holds. The default for every node.
    True,
    /// Never holds.
    False,
    /// Negates the inner condition.
    Not(Box<Condition<I>>),
    /// Holds if every operand holds. Stops at the first failing operand.
    And(Group<I>),
    /// Holds if any operand holds. Stops at the first passing operand.
    Or(Group<I>),
    /// Holds if an odd number of operands hold. Checks every operand.
    Xor(Group<I>),
    /// Adapts an external function.
    Delegate(Delegate<I>),
    /// A caller-defined [`Predicate`].
    Custom(Box<dyn Predicate<I>>),
}

impl<I> Condition<I> {
    /// Checks the condition against `input`.
    pub fn check(&self, input: &I) -> bool {
        match self {
            Condition::True => true,
            Condition::False => false,
            Condition::Not(inner) => !inner.check(input),
            Condition::And(group) => group.operands.iter().all(|c| c.check(input)),
            Condition::Or(group) => group.operands.iter().any(|c| c.check(input)),
            // Parity over all operands; no short-circuit is possible.
            Condition::Xor(group) => group
                .operands
                .iter()
                .fold(false, |acc, c| acc ^ c.check(input)),
            Condition::Delegate(delegate) => delegate.check(input),
            Condition::Custom(predicate) => predicate.check(input),
        }
    }

    /// Builds an AND group from two seed operands.
    pub fn and(lhs: Condition<I>, rhs: Condition<I>) -> Self {
        Condition::And(Group::new(lhs, rhs))
    }

    /// Builds an OR group from two seed operands.
    pub fn or(lhs: Condition<I>, rhs: Condition<I>) -> Self {
        Condition::Or(Group::new(lhs, rhs))
    }

    /// Builds an XOR group from two seed operands.
    pub fn xor(lhs: Condition<I>, rhs: Condition<I>) -> Self {
        Condition::Xor(Group::new(lhs, rhs))
    }

    /// Wraps `inner` in a NOT.
    pub fn negate(inner: Condition<I>) -> Self {
        Condition::Not(Box::new(inner))
    }

    /// Adapts a closure into a condition.
    pub fn delegate<F>(check: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        Condition::Delegate(Delegate::new(check))
    }

    /// Wraps a caller-defined predicate.
    pub fn custom<P>(predicate: P) -> Self
    where
        P: Predicate<I> + 'static,
    {
        Condition::Custom(Box::new(predicate))
    }

    /// Returns the operand group if this is an AND, OR or XOR condition.
    pub fn group_mut(&mut self) -> Option<&mut Group<I>> {
        match self {
            Condition::And(group) | Condition::Or(group) | Condition::Xor(group) => Some(group),
            _ => None,
        }
    }
}

impl<I> Default for Condition<I> {
    fn default() -> Self {
        Condition::True
    }
}

impl<I> fmt::Debug for Condition<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::True => f.write_str("True"),
            Condition::False => f.write_str("False"),
            Condition::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Condition::And(group) => f.debug_tuple("And").field(&group.operands).finish(),
            Condition::Or(group) => f.debug_tuple("Or").field(&group.operands).finish(),
            Condition::Xor(group) => f.debug_tuple("Xor").field(&group.operands).finish(),
            Condition::Delegate(delegate) => fmt::Debug::fmt(delegate, f),
            Condition::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Operands of an AND, OR or XOR condition.
///
/// Only constructible from two seed operands; more can be pushed afterwards.
pub struct Group<I> {
    operands: Vec<Condition<I>>,
}

impl<I> Group<I> {
    fn new(lhs: Condition<I>, rhs: Condition<I>) -> Self {
        Self {
            operands: vec![lhs, rhs],
        }
    }

    /// Appends another operand.
    pub fn push(&mut self, operand: Condition<I>) {
        self.operands.push(operand);
    }

    /// Number of operands. Always at least two.
    pub fn len(&self) -> usize {
        self.operands.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    /// Iterates over the operands in check order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition<I>> {
        self.operands.iter()
    }
}

/// A condition backed by an external function.
///
/// An unset delegate never holds.
pub struct Delegate<I> {
    check: Option<CheckFn<I>>,
}

impl<I> Delegate<I> {
    /// Wraps `check`.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Some(Box::new(check)),
        }
    }

    /// Replaces the wrapped function.
    pub fn set<F>(&mut self, check: F)
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Box::new(check));
    }

    /// Returns `true` if a function is installed.
    pub fn is_set(&self) -> bool {
        self.check.is_some()
    }

    fn check(&self, input: &I) -> bool {
        self.check.as_ref().is_some_and(|check| check(input))
    }
}

impl<I> Default for Delegate<I> {
    fn default() -> Self {
        Self { check: None }
    }
}

impl<I> fmt::Debug for Delegate<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("set", &self.is_set())
            .finish()
    }
}

// Operator sugar. Chaining the same operator extends one flat group, so
// `a & b & c` is a single three-operand AND.

impl<I> BitAnd for Condition<I> {
    type Output = Condition<I>;

    fn bitand(self, rhs: Condition<I>) -> Condition<I> {
        match self {
            Condition::And(mut group) => {
                group.push(rhs);
                Condition::And(group)
            }
            lhs => Condition::and(lhs, rhs),
        }
    }
}

impl<I> BitOr for Condition<I> {
    type Output = Condition<I>;

    fn bitor(self, rhs: Condition<I>) -> Condition<I> {
        match self {
            Condition::Or(mut group) => {
                group.push(rhs);
                Condition::Or(group)
            }
            lhs => Condition::or(lhs, rhs),
        }
    }
}

impl<I> BitXor for Condition<I> {
    type Output = Condition<I>;

    fn bitxor(self, rhs: Condition<I>) -> Condition<I> {
        match self {
            Condition::Xor(mut group) => {
                group.push(rhs);
                Condition::Xor(group)
            }
            lhs => Condition::xor(lhs, rhs),
        }
    }
}

impl<I> Not for Condition<I> {
    type Output = Condition<I>;

    fn not(self) -> Condition<I> {
        Condition::negate(self)
    }
}
