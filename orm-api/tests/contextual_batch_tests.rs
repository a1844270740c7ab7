//! Deferred args resolved once per element of a batch

use orm_api::{BoolTerm, Contextual, HasArgs, SelectWhere, Term, TermType, Value, Where};
use orm_test_utils::assertions::{assert_binds, assert_sql};
use orm_test_utils::{init_test_tracing, MockStatement};
use std::collections::HashMap;

fn user_id() -> Term {
    Term::column("user_id", TermType::Number)
}

fn where_user() -> Where {
    Where::of(BoolTerm::eq(&user_id(), &Term::unresolved("U", TermType::Number)).unwrap())
}

#[test]
fn test_ordered_list_resolver_takes_first_of_batch() {
    init_test_tracing();
    let contextual: Contextual<Where, Vec<i32>> =
        Contextual::resolving_by_ordered_list(where_user(), |batch: &Vec<i32>| vec![Value::Int(batch[0])]);

    let args = contextual.resolve_query_args(&vec![11, 12]).unwrap();
    assert_eq!(args.as_list(), vec![Value::Int(11)]);
    let args = contextual.resolve_query_args(&vec![11, 12, 13]).unwrap();
    assert_eq!(args.as_list(), vec![Value::Int(11)]);
}

#[test]
fn test_unresolved_query_binds_the_type_default() {
    let contextual: Contextual<Where, i32> =
        Contextual::resolving_by_ordered_list(where_user(), |id: &i32| vec![Value::Int(*id)]);
    assert_sql(contextual.query(), "WHERE user_id = ?");
    assert_binds(contextual.query().args(), &[Value::Int(0)]);
    assert!(!contextual.query().args().is_all_resolved());
}

#[test]
fn test_one_query_serves_a_whole_batch() {
    let query = SelectWhere::builder("song")
        .select(Term::column("id", TermType::Number))
        .where_(
            Where::and(&[
                BoolTerm::eq(&user_id(), &Term::unresolved("user", TermType::Number)).unwrap(),
                BoolTerm::gt(
                    &Term::column("rating", TermType::Number),
                    &Term::unresolved("min_rating", TermType::Number),
                )
                .unwrap(),
            ])
            .unwrap(),
        )
        .build()
        .unwrap();
    let contextual: Contextual<SelectWhere, (i64, i32)> =
        Contextual::resolving_by_name(query, |(user, rating): &(i64, i32)| {
            HashMap::from([
                ("user".to_string(), Value::Long(*user)),
                ("min_rating".to_string(), Value::Int(*rating)),
            ])
        });

    let mut statement = MockStatement::new();
    for context in [(1, 3), (2, 4)] {
        statement.clear();
        let args = contextual.resolve_query_args(&context).unwrap();
        args.set_prepared_params(&mut statement, 0).unwrap();
        assert_eq!(
            statement.values(),
            vec![Value::Long(context.0), Value::Int(context.1)]
        );
    }
}

#[test]
fn test_resolver_with_wrong_keys_fails() {
    let contextual: Contextual<Where, ()> = Contextual::resolving_by_name(where_user(), |_: &()| {
        HashMap::from([("V".to_string(), Value::Int(1))])
    });
    let err = contextual.resolve_query_args(&()).unwrap_err();
    assert!(err.to_string().contains("keys don't match"));
}
