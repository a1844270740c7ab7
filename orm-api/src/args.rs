//! Argument binding algebra
//!
//! [`Args`] is the ordered list of values parallel to the `?` placeholders of a query.
//! It keeps two views:
//!
//! - the *internal* list, which may hold [`UnresolvedArg`] placeholders to be filled
//!   in later from a runtime context;
//! - the *external* list, used for statement binding, where every placeholder is
//!   replaced by its default value.
//!
//! Homogeneous int or long batches are stored packed; the choice is made once by the
//! factory call and never widened implicitly.

use crate::error::{QueryError, QueryResult};
use crate::query::TermType;
use crate::value::Value;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// UNRESOLVED ARGS
// ============================================================================

/// A named placeholder for a value known only at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedArg {
    name: String,
    default_value: Value,
}

impl UnresolvedArg {
    pub fn new(name: impl Into<String>, default_value: Value) -> Self {
        Self {
            name: name.into(),
            default_value,
        }
    }

    /// Placeholder whose default is derived from the term type.
    pub fn of_type(name: impl Into<String>, term_type: TermType) -> Self {
        Self::new(name, Self::default_value_for_type(term_type))
    }

    pub fn default_value_for_type(term_type: TermType) -> Value {
        match term_type {
            TermType::Number => Value::Int(0),
            TermType::Bool => Value::Bool(false),
            TermType::String => Value::String(String::new()),
            TermType::Time | TermType::Wildcard => Value::Null,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }
}

/// One slot of the internal args list.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Unresolved(UnresolvedArg),
}

impl Arg {
    fn external(&self) -> Value {
        match self {
            Arg::Value(value) => value.clone(),
            Arg::Unresolved(unresolved) => unresolved.default_value.clone(),
        }
    }
}

impl<T: Into<Value>> From<T> for Arg {
    fn from(value: T) -> Self {
        Arg::Value(value.into())
    }
}

impl From<UnresolvedArg> for Arg {
    fn from(value: UnresolvedArg) -> Self {
        Arg::Unresolved(value)
    }
}

// ============================================================================
// BINDING SEAM
// ============================================================================

/// Destination of positional parameters, typically a prepared statement.
///
/// Positions are 1-based.
pub trait ParamSink {
    type Error;

    fn set_value(&mut self, position: usize, value: &Value) -> Result<(), Self::Error>;

    fn set_int(&mut self, position: usize, value: i32) -> Result<(), Self::Error> {
        self.set_value(position, &Value::Int(value))
    }

    fn set_long(&mut self, position: usize, value: i64) -> Result<(), Self::Error> {
        self.set_value(position, &Value::Long(value))
    }
}

/// Anything that carries bound args: terms, clauses, whole statements.
pub trait HasArgs {
    fn args(&self) -> &Args;
}

impl HasArgs for Args {
    fn args(&self) -> &Args {
        self
    }
}

// ============================================================================
// ARGS
// ============================================================================

/// The internal representation picked by the factory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsType {
    Generic,
    Ints,
    Longs,
}

#[derive(Debug)]
enum Repr {
    Generic { internal: Vec<Arg>, external: Vec<Value> },
    Ints(Vec<i32>),
    Longs(Vec<i64>),
}

static EMPTY: Lazy<Args> = Lazy::new(|| Args::generic(Vec::new()));

/// Immutable ordered list of query arguments. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct Args(Arc<Repr>);

impl Args {
    fn generic(internal: Vec<Arg>) -> Self {
        let external = internal.iter().map(Arg::external).collect();
        Self(Arc::new(Repr::Generic { internal, external }))
    }

    /// The shared empty instance.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    pub fn of<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let internal: Vec<Arg> = items.into_iter().map(Into::into).collect();
        if internal.is_empty() {
            return Self::empty();
        }
        Self::generic(internal)
    }

    pub fn single(item: impl Into<Arg>) -> Self {
        Self::generic(vec![item.into()])
    }

    pub fn of_ints(values: impl Into<Vec<i32>>) -> Self {
        Self(Arc::new(Repr::Ints(values.into())))
    }

    pub fn of_longs(values: impl Into<Vec<i64>>) -> Self {
        Self(Arc::new(Repr::Longs(values.into())))
    }

    /// Fully resolved args: internal and external views are the same list.
    pub fn resolved(values: Vec<Value>) -> Self {
        let internal = values.iter().cloned().map(Arg::Value).collect();
        Self(Arc::new(Repr::Generic {
            internal,
            external: values,
        }))
    }

    pub fn concat(lhs: &Args, rhs: &Args) -> Self {
        if rhs.is_empty() {
            return lhs.clone();
        }
        if lhs.is_empty() {
            return rhs.clone();
        }
        match (&*lhs.0, &*rhs.0) {
            (Repr::Ints(a), Repr::Ints(b)) => Self::of_ints([a.as_slice(), b.as_slice()].concat()),
            (Repr::Longs(a), Repr::Longs(b)) => {
                Self::of_longs([a.as_slice(), b.as_slice()].concat())
            }
            _ => {
                let mut internal = lhs.internal();
                internal.extend(rhs.internal());
                Self::generic(internal)
            }
        }
    }

    pub fn args_type(&self) -> ArgsType {
        match &*self.0 {
            Repr::Generic { .. } => ArgsType::Generic,
            Repr::Ints(_) => ArgsType::Ints,
            Repr::Longs(_) => ArgsType::Longs,
        }
    }

    pub fn len(&self) -> usize {
        match &*self.0 {
            Repr::Generic { internal, .. } => internal.len(),
            Repr::Ints(values) => values.len(),
            Repr::Longs(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The external view: placeholders replaced by their defaults.
    pub fn as_list(&self) -> Vec<Value> {
        match &*self.0 {
            Repr::Generic { external, .. } => external.clone(),
            Repr::Ints(values) => values.iter().copied().map(Value::Int).collect(),
            Repr::Longs(values) => values.iter().copied().map(Value::Long).collect(),
        }
    }

    /// The internal view, placeholders included.
    pub fn internal(&self) -> Vec<Arg> {
        match &*self.0 {
            Repr::Generic { internal, .. } => internal.clone(),
            Repr::Ints(values) => values.iter().map(|v| Arg::Value(Value::Int(*v))).collect(),
            Repr::Longs(values) => values.iter().map(|v| Arg::Value(Value::Long(*v))).collect(),
        }
    }

    pub fn is_all_resolved(&self) -> bool {
        match &*self.0 {
            Repr::Generic { internal, .. } => {
                internal.iter().all(|arg| matches!(arg, Arg::Value(_)))
            }
            Repr::Ints(_) | Repr::Longs(_) => true,
        }
    }

    /// Unresolved placeholders keyed by their 1-based position.
    pub fn unresolved_args(&self) -> Vec<(usize, &UnresolvedArg)> {
        match &*self.0 {
            Repr::Generic { internal, .. } => internal
                .iter()
                .enumerate()
                .filter_map(|(i, arg)| match arg {
                    Arg::Unresolved(unresolved) => Some((i + 1, unresolved)),
                    Arg::Value(_) => None,
                })
                .collect(),
            Repr::Ints(_) | Repr::Longs(_) => Vec::new(),
        }
    }

    /// Whether both handles share the same storage.
    pub fn ptr_eq(lhs: &Args, rhs: &Args) -> bool {
        Arc::ptr_eq(&lhs.0, &rhs.0)
    }

    /// Binds the external view starting right after `index`; returns the next index.
    pub fn set_prepared_params<S>(&self, sink: &mut S, index: usize) -> Result<usize, S::Error>
    where
        S: ParamSink + ?Sized,
    {
        match &*self.0 {
            Repr::Generic { external, .. } => {
                for (i, value) in external.iter().enumerate() {
                    sink.set_value(index + i + 1, value)?;
                }
            }
            Repr::Ints(values) => {
                for (i, value) in values.iter().enumerate() {
                    sink.set_int(index + i + 1, *value)?;
                }
            }
            Repr::Longs(values) => {
                for (i, value) in values.iter().enumerate() {
                    sink.set_long(index + i + 1, *value)?;
                }
            }
        }
        Ok(index + self.len())
    }

    /// Replaces every placeholder with the value stored under its name.
    ///
    /// The map must hold exactly one entry per placeholder and its keys must equal the
    /// placeholder names. Without placeholders the same instance is returned.
    pub fn resolve_by_name(&self, resolved: &HashMap<String, Value>) -> QueryResult<Args> {
        let unresolved = self.unresolved_args();
        if unresolved.len() != resolved.len() {
            return Err(QueryError::ResolutionSizeMismatch {
                internal: unresolved.len(),
                provided: resolved.len(),
            });
        }

        let expected: BTreeSet<&str> = unresolved.iter().map(|(_, arg)| arg.name()).collect();
        let provided: BTreeSet<&str> = resolved.keys().map(String::as_str).collect();
        if expected != provided {
            return Err(QueryError::ResolutionKeysMismatch {
                expected: expected.into_iter().map(str::to_string).collect(),
                provided: provided.into_iter().map(str::to_string).collect(),
            });
        }

        if unresolved.is_empty() {
            return Ok(self.clone());
        }

        let internal = self
            .internal()
            .into_iter()
            .map(|arg| match arg {
                Arg::Unresolved(unresolved) => resolved
                    .get(unresolved.name())
                    .cloned()
                    .map_or(Arg::Unresolved(unresolved), Arg::Value),
                value => value,
            })
            .collect();
        Ok(Self::generic(internal))
    }

    /// Replaces the placeholders, in declaration order, with the given values.
    ///
    /// The list size must equal the number of placeholders. Without placeholders the
    /// same instance is returned.
    pub fn resolve_by_ordered_list(&self, resolved: &[Value]) -> QueryResult<Args> {
        let unresolved = self.unresolved_args();
        if unresolved.len() != resolved.len() {
            return Err(QueryError::ResolutionSizeMismatch {
                internal: unresolved.len(),
                provided: resolved.len(),
            });
        }

        if unresolved.is_empty() {
            return Ok(self.clone());
        }
        if unresolved.len() == self.len() {
            return Ok(Self::resolved(resolved.to_vec()));
        }

        let mut values = resolved.iter();
        let internal = self
            .internal()
            .into_iter()
            .map(|arg| match arg {
                Arg::Unresolved(unresolved) => values
                    .next()
                    .cloned()
                    .map_or(Arg::Unresolved(unresolved), Arg::Value),
                value => value,
            })
            .collect();
        Ok(Self::generic(internal))
    }
}

impl Default for Args {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Args {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (Repr::Generic { internal: a, .. }, Repr::Generic { internal: b, .. }) => a == b,
            (Repr::Ints(a), Repr::Ints(b)) => a == b,
            (Repr::Longs(a), Repr::Longs(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Args")
            .field(&self.args_type())
            .field(&self.internal())
            .finish()
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .internal()
            .iter()
            .map(|arg| match arg {
                Arg::Value(value) => value.to_string(),
                Arg::Unresolved(unresolved) => format!("<{}>", unresolved.name()),
            })
            .collect();
        write!(f, "[{}]", items.join(", "))
    }
}

/// Concatenates the args of every present item, in order.
pub fn flatten_args_of<'a, I, A>(items: I) -> Args
where
    I: IntoIterator<Item = Option<&'a A>>,
    A: HasArgs + ?Sized + 'a,
{
    items
        .into_iter()
        .flatten()
        .fold(Args::empty(), |acc, item| Args::concat(&acc, item.args()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(usize, Value)>,
    }

    impl ParamSink for Recorder {
        type Error = std::convert::Infallible;

        fn set_value(&mut self, position: usize, value: &Value) -> Result<(), Self::Error> {
            self.calls.push((position, value.clone()));
            Ok(())
        }
    }

    fn unresolved(name: &str) -> Arg {
        Arg::Unresolved(UnresolvedArg::of_type(name, TermType::Number))
    }

    #[test]
    fn test_empty_is_shared() {
        assert!(Args::ptr_eq(&Args::empty(), &Args::empty()));
        assert!(Args::ptr_eq(&Args::of(Vec::<Value>::new()), &Args::empty()));
        assert_eq!(Args::empty().len(), 0);
    }

    #[test]
    fn test_concat_keeps_packed_representation() {
        let ints = Args::concat(&Args::of_ints([1, 2]), &Args::of_ints([3, 4]));
        assert_eq!(ints.args_type(), ArgsType::Ints);
        assert_eq!(
            ints.as_list(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );

        let mixed = Args::concat(&Args::of_ints([1]), &Args::of_longs([2]));
        assert_eq!(mixed.args_type(), ArgsType::Generic);
        assert_eq!(mixed.as_list(), vec![Value::Int(1), Value::Long(2)]);

        let generic = Args::concat(&Args::of_ints([1]), &Args::of(["a"]));
        assert_eq!(generic.args_type(), ArgsType::Generic);
    }

    #[test]
    fn test_external_view_hides_placeholders() {
        let args = Args::of(vec![Arg::from(1), unresolved("U"), Arg::from("x")]);
        assert!(!args.is_all_resolved());
        assert_eq!(
            args.as_list(),
            vec![Value::Int(1), Value::Int(0), Value::String("x".to_string())]
        );
        let positions: Vec<usize> = args.unresolved_args().iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, vec![2]);
    }

    #[test]
    fn test_set_prepared_params_returns_next_index() {
        let mut sink = Recorder::default();
        let next = Args::of(["a", "b"]).set_prepared_params(&mut sink, 1).unwrap();
        assert_eq!(next, 3);
        assert_eq!(
            sink.calls,
            vec![
                (2, Value::String("a".to_string())),
                (3, Value::String("b".to_string()))
            ]
        );
    }

    #[test]
    fn test_set_prepared_params_packed_longs() {
        let mut sink = Recorder::default();
        let next = Args::of_longs([7, 8]).set_prepared_params(&mut sink, 0).unwrap();
        assert_eq!(next, 2);
        assert_eq!(sink.calls, vec![(1, Value::Long(7)), (2, Value::Long(8))]);
    }

    #[test]
    fn test_resolve_by_name() {
        let args = Args::of(vec![Arg::from(1), unresolved("A"), unresolved("B")]);
        let map = HashMap::from([
            ("A".to_string(), Value::Int(10)),
            ("B".to_string(), Value::Int(20)),
        ]);
        let resolved = args.resolve_by_name(&map).unwrap();
        assert!(resolved.is_all_resolved());
        assert_eq!(
            resolved.as_list(),
            vec![Value::Int(1), Value::Int(10), Value::Int(20)]
        );
        // Source untouched
        assert!(!args.is_all_resolved());
    }

    #[test]
    fn test_resolve_by_name_key_mismatch() {
        let args = Args::of(vec![unresolved("A")]);
        let map = HashMap::from([("B".to_string(), Value::Int(1))]);
        let err = args.resolve_by_name(&map).unwrap_err();
        assert!(matches!(err, QueryError::ResolutionKeysMismatch { .. }));
    }

    #[test]
    fn test_resolve_by_name_duplicate_placeholders_need_distinct_keys() {
        let args = Args::of(vec![unresolved("A"), unresolved("A")]);
        let map = HashMap::from([("A".to_string(), Value::Int(1))]);
        let err = args.resolve_by_name(&map).unwrap_err();
        assert_eq!(
            err,
            QueryError::ResolutionSizeMismatch {
                internal: 2,
                provided: 1
            }
        );
    }

    #[test]
    fn test_resolve_without_placeholders_is_identity() {
        let args = Args::of([1, 2]);
        assert!(Args::ptr_eq(&args.resolve_by_ordered_list(&[]).unwrap(), &args));
        assert!(Args::ptr_eq(&args.resolve_by_name(&HashMap::new()).unwrap(), &args));

        let ints = Args::of_ints([1, 2]);
        assert!(Args::ptr_eq(&ints.resolve_by_ordered_list(&[]).unwrap(), &ints));
    }

    #[test]
    fn test_resolve_by_ordered_list_mixed() {
        let args = Args::of(vec![unresolved("A"), Arg::from(5), unresolved("B")]);
        let resolved = args
            .resolve_by_ordered_list(&[Value::Int(1), Value::Int(1)])
            .unwrap();
        assert_eq!(
            resolved.as_list(),
            vec![Value::Int(1), Value::Int(5), Value::Int(1)]
        );
    }

    #[test]
    fn test_resolve_by_ordered_list_all_placeholders() {
        let args = Args::of(vec![unresolved("A"), unresolved("B")]);
        let resolved = args
            .resolve_by_ordered_list(&[Value::Int(3), Value::Int(4)])
            .unwrap();
        assert_eq!(resolved, Args::resolved(vec![Value::Int(3), Value::Int(4)]));
    }

    #[test]
    fn test_resolve_by_ordered_list_size_mismatch() {
        let args = Args::of(vec![unresolved("A")]);
        assert!(args.resolve_by_ordered_list(&[]).is_err());
        assert!(args
            .resolve_by_ordered_list(&[Value::Int(1), Value::Int(2)])
            .is_err());
    }

    #[test]
    fn test_equality_compares_representation() {
        assert_eq!(Args::of([1, 2]), Args::of([1, 2]));
        assert_ne!(Args::of([1, 2]), Args::of_ints([1, 2]));
    }

    #[test]
    fn test_flatten_skips_missing_items() {
        let a = Args::of([1]);
        let b = Args::of(["x"]);
        let flat = flatten_args_of([Some(&a as &dyn HasArgs), None, Some(&b as &dyn HasArgs)]);
        assert_eq!(flat.as_list(), vec![Value::Int(1), Value::String("x".to_string())]);
    }

    #[test]
    fn test_display_marks_placeholders() {
        let args = Args::of(vec![Arg::from(1), unresolved("U")]);
        assert_eq!(args.to_string(), "[1, <U>]");
    }
}
