use criterion::{criterion_group, criterion_main, Criterion};
use orm_api::{Args, BoolTerm, HasArgs, ParamSink, Representable, SelectWhere, Term, TermType, Value, Where};
use std::collections::HashMap;
use std::convert::Infallible;
use std::hint::black_box;

struct NullSink;

impl ParamSink for NullSink {
    type Error = Infallible;

    fn set_value(&mut self, position: usize, value: &Value) -> Result<(), Infallible> {
        black_box((position, value));
        Ok(())
    }
}

fn bench_args_concat(c: &mut Criterion) {
    let lhs = Args::of_ints((0..64).collect::<Vec<i32>>());
    let rhs = Args::of_ints((64..128).collect::<Vec<i32>>());

    c.bench_function("args/concat_ints", |b| {
        b.iter(|| black_box(Args::concat(black_box(&lhs), black_box(&rhs)).len()));
    });

    c.bench_function("args/set_prepared_params", |b| {
        let args = Args::concat(&lhs, &rhs);
        b.iter(|| black_box(args.set_prepared_params(&mut NullSink, 0)));
    });
}

fn bench_resolve_by_name(c: &mut Criterion) {
    let column = Term::column("id", TermType::Number);
    let terms: Vec<BoolTerm> = (0..16)
        .map(|i| BoolTerm::eq(&column, &Term::unresolved(format!("p{i}"), TermType::Number)))
        .collect::<Result<_, _>>()
        .expect("bool terms");
    let where_ = Where::or(&terms).expect("where");
    let values: HashMap<String, Value> =
        (0..16).map(|i| (format!("p{i}"), Value::Int(i))).collect();

    c.bench_function("args/resolve_by_name_16", |b| {
        b.iter(|| black_box(where_.args().resolve_by_name(black_box(&values)).expect("resolve")));
    });
}

fn bench_select_build(c: &mut Criterion) {
    c.bench_function("query/select_where_build", |b| {
        b.iter(|| {
            let id = Term::column("id", TermType::Number);
            let query = SelectWhere::builder("user")
                .select(id.clone())
                .select(Term::column("name", TermType::String))
                .where_(Where::of(BoolTerm::gt(&id, &Term::int_var(black_box(10))).expect("gt")))
                .build()
                .expect("select");
            black_box(query.repr().len());
        });
    });
}

criterion_group!(benches, bench_args_concat, bench_resolve_by_name, bench_select_build);
criterion_main!(benches);
