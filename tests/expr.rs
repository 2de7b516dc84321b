use symcore::{CasError, Context, Raw, Sign};

#[test]
fn canonicalization_is_idempotent() {
    let ctx = Context::new();
    let cases = vec![
        ctx.expr("Add", vec![ctx.symbol("x"), ctx.int(1), ctx.symbol("y")]),
        ctx.expr("Add", vec![ctx.int(2), ctx.int(3)]),
        ctx.expr(
            "Multiply",
            vec![ctx.int(1), ctx.expr("Add", vec![ctx.symbol("b"), ctx.symbol("a")])],
        ),
        ctx.dictionary(vec![
            ("b".to_string(), ctx.int(2)),
            ("a".to_string(), ctx.int(1)),
        ]),
    ];
    for e in cases {
        let once = e.to_canonical();
        let twice = once.to_canonical();
        assert!(once.is(&twice), "canonical not idempotent for {e}: {once} vs {twice}");
        assert!(once.is_canonical());
    }
}

#[test]
fn canonical_sorts_commutative_operands() {
    let ctx = Context::new();
    let e = ctx.expr("Add", vec![ctx.symbol("y"), ctx.symbol("x"), ctx.int(1)]);
    let canonical = e.to_canonical();
    let expected = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x"), ctx.symbol("y")]);
    assert!(canonical.is(&expected), "got {canonical}");
    // The structural form is untouched.
    assert_eq!(e.ops().map(|ops| ops.len()), Some(3));
    assert!(e.ops().unwrap()[0].is(&ctx.symbol("y")));
}

#[test]
fn canonical_folds_constants() {
    let ctx = Context::new();
    let e = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x"), ctx.int(2)]);
    let expected = ctx.expr("Add", vec![ctx.int(3), ctx.symbol("x")]);
    assert!(e.to_canonical().is(&expected));

    // An all-constant sum collapses to the constant.
    let e = ctx.expr("Add", vec![ctx.int(2), ctx.int(3)]);
    assert!(e.to_canonical().is(&ctx.int(5)));

    // Folding to the identity drops it.
    let e = ctx.expr("Add", vec![ctx.int(0), ctx.symbol("x")]);
    assert!(e.to_canonical().is(&ctx.symbol("x")));
    let e = ctx.expr("Multiply", vec![ctx.int(1), ctx.symbol("x")]);
    assert!(e.to_canonical().is(&ctx.symbol("x")));
}

#[test]
fn structural_identity_crosses_numeric_cases() {
    let ctx = Context::new();
    assert!(ctx.int(1).is(&ctx.rational(1, 1)));
    assert!(ctx.int(1).is(&ctx.float(1.0)));
    assert!(!ctx.int(1).is(&ctx.float(1.5)));
    // Hashes agree wherever identity does.
    assert_eq!(ctx.int(1).structural_hash(), ctx.float(1.0).structural_hash());

    let a = ctx.expr("Add", vec![ctx.symbol("x"), ctx.rational(2, 1)]);
    let b = ctx.expr("Add", vec![ctx.symbol("x"), ctx.int(2)]);
    assert!(a.is(&b));
    assert_eq!(a.structural_hash(), b.structural_hash());
}

#[test]
fn accessors_are_read_only_views() {
    let ctx = Context::new();
    let e = ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]);
    assert_eq!(e.operator(), Some("Power"));
    assert_eq!(e.ops().map(|ops| ops.len()), Some(2));
    assert_eq!(e.symbol(), None);
    assert!(e.numeric_value().is_none());
    assert!(e.has("x"));
    assert!(e.has("Power"));
    assert!(!e.has("y"));

    let s = ctx.string("title");
    assert_eq!(s.string(), Some("title"));
    assert_eq!(ctx.int(3).sgn(), Some(Sign::Positive));
}

#[test]
fn boxing_recurses_through_raw_input() {
    let ctx = Context::new();
    let raw = Raw::Operator(
        "Add".to_string(),
        vec![
            Raw::Int(1),
            Raw::Ratio(1, 2),
            Raw::Operator("Negate".to_string(), vec![Raw::Symbol("x".to_string())]),
        ],
    );
    let boxed = ctx.boxed(raw).expect("boxing");
    assert_eq!(boxed.operator(), Some("Add"));
    let ops = boxed.ops().unwrap();
    assert!(ops[0].is(&ctx.int(1)));
    assert!(ops[1].is(&ctx.rational(1, 2)));
    assert_eq!(ops[2].operator(), Some("Negate"));
}

#[test]
fn dictionary_keys_must_be_string_or_symbol() {
    let ctx = Context::new();
    let good = Raw::Dictionary(vec![
        (Raw::Str("lhs".to_string()), Raw::Int(1)),
        (Raw::Symbol("rhs".to_string()), Raw::Int(2)),
    ]);
    let boxed = ctx.boxed(good).expect("string and symbol keys");
    assert_eq!(boxed.dictionary().map(|pairs| pairs.len()), Some(2));

    let bad = Raw::Dictionary(vec![(Raw::Int(1), Raw::Int(2))]);
    let err = ctx.boxed(bad).expect_err("numeric key");
    assert!(matches!(err, CasError::InvalidConstruction(_)), "got {err:?}");
}

#[test]
fn malformed_decimal_literals_fail_fast() {
    let ctx = Context::new();
    let err = ctx.decimal("not-a-number").expect_err("parse failure");
    assert!(matches!(err, CasError::InvalidConstruction(_)));
    assert!(ctx.decimal("1.25").is_ok());
}

#[test]
fn late_binding_resolves_without_changing_identity() {
    let ctx = Context::new();
    let x = ctx.symbol("x");
    assert!(x.value().is(&x));
    assert_eq!(x.sgn(), None);

    ctx.bind("x", ctx.int(-5));
    assert!(x.value().is(&ctx.int(-5)));
    assert_eq!(x.sgn(), Some(Sign::Negative));
    // The node itself is still the symbol it always was.
    assert_eq!(x.symbol(), Some("x"));
    assert!(x.is(&ctx.symbol("x")));
}

#[test]
fn non_finite_raw_input_boxes_sentinels() {
    let ctx = Context::new();
    let nan = ctx.boxed(Raw::Float(f64::NAN)).expect("NaN boxes");
    assert_eq!(nan.sgn(), None);
    let inf = ctx.boxed(Raw::Ratio(1, 0)).expect("1/0 boxes");
    assert_eq!(inf.sgn(), Some(Sign::Positive));
}
