//! Property tests: the interpreter and the compiled form agree on random
//! expressions and bindings.

use express_parser::Expression;
use proptest::prelude::*;

fn expr_source() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0u32..100).prop_map(|n| n.to_string()),
        (0u32..1000).prop_map(|n| format!("{}.{}", n / 10, n % 10)),
        prop::sample::select(vec!["a", "b", "c"]).prop_map(String::from),
    ];
    leaf.prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec!['+', '-', '*', '/', '^']),
                inner.clone()
            )
                .prop_map(|(l, op, r)| format!("{}{}{}", l, op, r)),
            inner.clone().prop_map(|e| format!("({})", e)),
            inner.prop_map(|e| format!("-({})", e)),
        ]
    })
}

fn same(x: f64, y: f64) -> bool {
    (x.is_nan() && y.is_nan()) || x.to_bits() == y.to_bits()
}

proptest! {
    #[test]
    fn compiled_matches_interpreted(
        source in expr_source(),
        values in proptest::collection::vec(-10.0f64..10.0, 3),
    ) {
        let mut expr = Expression::new(&source).unwrap();
        let names: Vec<String> = expr.arguments().map(|(n, _)| n.to_string()).collect();
        for (name, value) in names.iter().zip(&values) {
            expr.set_argument(name, *value).unwrap();
        }
        expr.compile();
        let interpreted = expr.evaluate();
        let compiled = expr.evaluate_compiled().unwrap();
        prop_assert!(same(interpreted, compiled), "{}: {} vs {}", source, interpreted, compiled);
    }

    #[test]
    fn call_matches_stored_arguments(
        source in expr_source(),
        values in proptest::collection::vec(-10.0f64..10.0, 3),
    ) {
        let mut expr = Expression::new(&source).unwrap();
        let names: Vec<String> = expr.arguments().map(|(n, _)| n.to_string()).collect();
        let slice = &values[..names.len()];
        for (name, value) in names.iter().zip(slice) {
            expr.set_argument(name, *value).unwrap();
        }
        expr.compile();
        let direct = expr.call(slice).unwrap();
        let stored = expr.evaluate_compiled().unwrap();
        prop_assert!(same(direct, stored), "{}: {} vs {}", source, direct, stored);
    }

    #[test]
    fn clone_does_not_leak_arguments(
        source in expr_source(),
        value in -10.0f64..10.0,
    ) {
        let expr = Expression::new(&source).unwrap();
        let before = expr.evaluate();
        let mut copy = expr.clone();
        let names: Vec<String> = copy.arguments().map(|(n, _)| n.to_string()).collect();
        for name in &names {
            copy.set_argument(name, value).unwrap();
        }
        prop_assert!(same(expr.evaluate(), before));
    }
}
