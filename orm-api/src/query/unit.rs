//! The base query fragment and text-joining helpers

use crate::args::{flatten_args_of, Args, HasArgs};

/// Anything that renders to SQL text.
pub trait Representable {
    fn repr(&self) -> &str;
}

/// A fragment of SQL text with its bound args.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    repr: String,
    args: Args,
}

impl Unit {
    pub fn new(repr: impl Into<String>, args: Args) -> Self {
        Self {
            repr: repr.into(),
            args,
        }
    }

    /// A fragment without args.
    pub fn of(repr: impl Into<String>) -> Self {
        Self::new(repr, Args::empty())
    }

    /// Joins the present parts with newlines, flattening their args in order.
    pub fn joined_lines(parts: &[Option<&dyn Fragment>]) -> Self {
        let repr = join_with_lines(parts.iter().copied());
        let args = flatten_args_of(parts.iter().copied());
        Self::new(repr, args)
    }

    pub fn repr(&self) -> &str {
        &self.repr
    }

    pub fn args(&self) -> &Args {
        &self.args
    }
}

impl Representable for Unit {
    fn repr(&self) -> &str {
        &self.repr
    }
}

impl HasArgs for Unit {
    fn args(&self) -> &Args {
        &self.args
    }
}

/// Text plus args; implemented by every query building block.
pub trait Fragment: Representable + HasArgs {}

impl<T: Representable + HasArgs> Fragment for T {}

pub fn join_with_commas<'a, I, R>(items: I) -> String
where
    I: IntoIterator<Item = &'a R>,
    R: Representable + ?Sized + 'a,
{
    items
        .into_iter()
        .map(Representable::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn join_with_lines<'a, I, R>(items: I) -> String
where
    I: IntoIterator<Item = Option<&'a R>>,
    R: Representable + ?Sized + 'a,
{
    items
        .into_iter()
        .flatten()
        .map(|item| item.repr().trim())
        .filter(|repr| !repr.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_joined_lines_skip_missing_parts() {
        let a = Unit::new("SELECT x", Args::of([1]));
        let b = Unit::new("FROM t", Args::of([2]));
        let joined = Unit::joined_lines(&[Some(&a), None, Some(&b)]);
        assert_eq!(joined.repr(), "SELECT x\nFROM t");
        assert_eq!(joined.args().as_list(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_join_with_commas() {
        let units = [Unit::of("a"), Unit::of("b")];
        assert_eq!(join_with_commas(units.iter()), "a, b");
    }
}
