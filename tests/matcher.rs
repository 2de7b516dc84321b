use symcore::{Context, Expr, MatchOptions, NumericValue, Substitution, match_expr};

fn relaxed() -> MatchOptions {
    MatchOptions::default()
}

fn exact() -> MatchOptions {
    MatchOptions::strict()
}

fn expect_binding(subst: &Substitution, name: &str, expected: &Expr) {
    let bound = subst
        .get(name)
        .unwrap_or_else(|| panic!("no binding for {name} in {subst:?}"));
    assert!(
        bound.is(expected),
        "binding mismatch for {name}: got {bound}, expected {expected}"
    );
}

#[test]
fn reflexivity_in_exact_mode() {
    let ctx = Context::new();
    let cases = vec![
        ctx.int(42),
        ctx.rational(2, 3),
        ctx.symbol("x"),
        ctx.string("hello"),
        ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x")]),
        ctx.expr(
            "Power",
            vec![ctx.expr("Add", vec![ctx.symbol("x"), ctx.int(1)]), ctx.int(2)],
        ),
        ctx.dictionary(vec![("k".to_string(), ctx.int(1))]),
    ];
    for e in cases {
        let subst = match_expr(&e, &e, &exact())
            .unwrap_or_else(|| panic!("match({e}, {e}) failed in exact mode"));
        assert!(subst.is_empty(), "expected empty substitution for {e}");
    }
}

#[test]
fn universal_capture() {
    let ctx = Context::new();
    let pattern = ctx.symbol("_a");
    let cases = vec![
        ctx.int(5),
        ctx.symbol("y"),
        ctx.expr("Multiply", vec![ctx.symbol("x"), ctx.int(2)]),
    ];
    for e in cases {
        let subst = match_expr(&e, &pattern, &exact()).expect("wildcard matches anything");
        expect_binding(&subst, "a", &e);
    }
}

#[test]
fn anonymous_wildcards_capture_nothing() {
    let ctx = Context::new();
    let pattern = ctx.expr("Power", vec![ctx.symbol("_"), ctx.symbol("_")]);
    let candidate = ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]);
    let subst = match_expr(&candidate, &pattern, &exact()).expect("anonymous match");
    assert!(subst.is_empty());
}

#[test]
fn zero_length_sequence_binds_identity() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("___rest")]);
    let candidate = ctx.expr("Add", vec![ctx.int(1)]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("zero-length sequence");
    expect_binding(&subst, "rest", &ctx.int(0));

    let pattern = ctx.expr("Multiply", vec![ctx.symbol("x"), ctx.symbol("___rest")]);
    let candidate = ctx.expr("Multiply", vec![ctx.symbol("x")]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("product identity");
    expect_binding(&subst, "rest", &ctx.int(1));
}

#[test]
fn multi_capture_sequence_preserves_order() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("___rest")]);
    let candidate = ctx.expr("Add", vec![ctx.int(1), ctx.int(2), ctx.int(3)]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("multi capture");
    expect_binding(&subst, "rest", &ctx.expr("Add", vec![ctx.int(2), ctx.int(3)]));
}

#[test]
fn singleton_sequence_binds_bare_operand() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("__rest")]);
    let candidate = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x")]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("singleton capture");
    expect_binding(&subst, "rest", &ctx.symbol("x"));
}

#[test]
fn one_or_more_sequence_needs_an_operand() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("__rest")]);
    let candidate = ctx.expr("Add", vec![ctx.int(1)]);
    assert!(match_expr(&candidate, &pattern, &exact()).is_none());
}

#[test]
fn sequence_boundary_backtracks() {
    let ctx = Context::new();
    // The span must grow past the first 5 for the trailing 5 to match.
    let pattern = ctx.expr(
        "List",
        vec![ctx.symbol("___front"), ctx.symbol("_x"), ctx.int(5)],
    );
    let candidate = ctx.expr(
        "List",
        vec![ctx.int(1), ctx.int(5), ctx.int(9), ctx.int(5)],
    );
    let subst = match_expr(&candidate, &pattern, &exact()).expect("boundary search");
    expect_binding(&subst, "x", &ctx.int(9));
    expect_binding(
        &subst,
        "front",
        &ctx.expr("Sequence", vec![ctx.int(1), ctx.int(5)]),
    );
}

#[test]
fn commutative_order_independence() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.int(1)]);
    let candidate = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x")]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("commutative match");
    expect_binding(&subst, "a", &ctx.symbol("x"));
}

#[test]
fn permutation_search_can_be_disabled() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.int(1)]);
    let candidate = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x")]);
    let options = MatchOptions { match_permutations: false, ..MatchOptions::strict() };
    assert!(match_expr(&candidate, &pattern, &options).is_none());
    // In pattern order the linear walk still succeeds.
    let aligned = ctx.expr("Add", vec![ctx.symbol("x"), ctx.int(1)]);
    assert!(match_expr(&aligned, &pattern, &options).is_some());
}

#[test]
fn permutation_budget_bounds_the_search() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.int(1)]);
    let candidate = ctx.expr("Add", vec![ctx.int(1), ctx.symbol("x")]);
    let options = MatchOptions { permutation_budget: 0, ..MatchOptions::default() };
    assert!(match_expr(&candidate, &pattern, &options).is_none());
    // Linear matching is untouched by the budget.
    let pattern = ctx.expr("Power", vec![ctx.symbol("_b"), ctx.symbol("_e")]);
    let candidate = ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]);
    assert!(match_expr(&candidate, &pattern, &options).is_some());
}

#[test]
fn consistency_of_repeated_names() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.symbol("_a")]);
    let rejected = ctx.expr("Add", vec![ctx.int(2), ctx.int(3)]);
    assert!(match_expr(&rejected, &pattern, &relaxed()).is_none());

    let accepted = ctx.expr("Add", vec![ctx.int(5), ctx.int(5)]);
    let subst = match_expr(&accepted, &pattern, &relaxed()).expect("consistent repeat");
    expect_binding(&subst, "a", &ctx.int(5));
}

#[test]
fn consistency_spans_nesting() {
    let ctx = Context::new();
    let pattern = ctx.expr(
        "Add",
        vec![
            ctx.expr("Power", vec![ctx.symbol("_a"), ctx.int(2)]),
            ctx.symbol("_a"),
        ],
    );
    let good = ctx.expr(
        "Add",
        vec![
            ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]),
            ctx.symbol("x"),
        ],
    );
    let subst = match_expr(&good, &pattern, &exact()).expect("nested consistency");
    expect_binding(&subst, "a", &ctx.symbol("x"));

    let bad = ctx.expr(
        "Add",
        vec![
            ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]),
            ctx.symbol("y"),
        ],
    );
    assert!(match_expr(&bad, &pattern, &exact()).is_none());
}

#[test]
fn string_literals_match_exactly() {
    let ctx = Context::new();
    assert!(match_expr(&ctx.string("abc"), &ctx.string("abc"), &relaxed()).is_some());
    assert!(match_expr(&ctx.string("abc"), &ctx.string("abd"), &relaxed()).is_none());
}

#[test]
fn numeric_tolerance_is_relaxed_only() {
    let ctx = Context::new();
    let pattern = ctx.int(1);
    let near = ctx.float(1.0 + 1e-12);
    assert!(match_expr(&near, &pattern, &relaxed()).is_some());
    assert!(match_expr(&near, &pattern, &exact()).is_none());
    let far = ctx.float(1.01);
    assert!(match_expr(&far, &pattern, &relaxed()).is_none());

    let wide = MatchOptions { numeric_tolerance: 0.1, ..MatchOptions::default() };
    assert!(match_expr(&far, &pattern, &wide).is_some());
}

#[test]
fn operator_position_wildcard_captures_the_name() {
    let ctx = Context::new();
    let pattern = ctx.expr("_op", vec![ctx.symbol("_a"), ctx.symbol("_b")]);
    let candidate = ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]);
    let subst = match_expr(&candidate, &pattern, &exact()).expect("operator capture");
    expect_binding(&subst, "op", &ctx.symbol("Power"));
    expect_binding(&subst, "a", &ctx.symbol("x"));
    expect_binding(&subst, "b", &ctx.int(2));
}

#[test]
fn variant_matching_in_relaxed_mode_only() {
    let ctx = Context::new();
    let pattern = ctx.expr("Square", vec![ctx.symbol("_a")]);
    let candidate = ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("square variant");
    expect_binding(&subst, "a", &ctx.symbol("x"));
    assert!(match_expr(&candidate, &pattern, &exact()).is_none());
}

#[test]
fn variant_table_covers_canonical_identities() {
    let ctx = Context::new();
    // x matches a + b through x = 0 + x.
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.symbol("_b")]);
    let subst = match_expr(&ctx.symbol("x"), &pattern, &relaxed()).expect("degenerate sum");
    assert!(subst.contains("a") && subst.contains("b"));

    // a - b matches a + (-b).
    let pattern = ctx.expr(
        "Add",
        vec![ctx.symbol("_a"), ctx.expr("Negate", vec![ctx.symbol("_b")])],
    );
    let candidate = ctx.expr("Subtract", vec![ctx.symbol("p"), ctx.symbol("q")]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("subtract variant");
    expect_binding(&subst, "a", &ctx.symbol("p"));
    expect_binding(&subst, "b", &ctx.symbol("q"));

    // e^x matches Exp(x), both directions.
    let pattern = ctx.expr("Exp", vec![ctx.symbol("_a")]);
    let candidate = ctx.expr("Power", vec![ctx.symbol("ExponentialE"), ctx.symbol("t")]);
    let subst = match_expr(&candidate, &pattern, &relaxed()).expect("exp variant");
    expect_binding(&subst, "a", &ctx.symbol("t"));
    let pattern = ctx.expr("Power", vec![ctx.symbol("ExponentialE"), ctx.symbol("_a")]);
    let candidate = ctx.expr("Exp", vec![ctx.symbol("t")]);
    assert!(match_expr(&candidate, &pattern, &relaxed()).is_some());
}

#[test]
fn variants_do_not_self_expand() {
    let ctx = Context::new();
    // Would need two levels: x -> 0 + x -> 0 + (1 * x).
    let pattern = ctx.expr(
        "Add",
        vec![
            ctx.int(0),
            ctx.expr("Multiply", vec![ctx.int(1), ctx.symbol("_a")]),
        ],
    );
    assert!(match_expr(&ctx.symbol("x"), &pattern, &relaxed()).is_none());
}

#[test]
fn recursive_mode_probes_subexpressions() {
    let ctx = Context::new();
    let pattern = ctx.expr("Power", vec![ctx.symbol("_b"), ctx.symbol("_e")]);
    let candidate = ctx.expr(
        "Add",
        vec![
            ctx.int(1),
            ctx.expr(
                "Multiply",
                vec![ctx.int(3), ctx.expr("Power", vec![ctx.symbol("x"), ctx.int(2)])],
            ),
        ],
    );
    assert!(match_expr(&candidate, &pattern, &exact()).is_none());
    let options = MatchOptions { recursive: true, ..MatchOptions::strict() };
    let subst = match_expr(&candidate, &pattern, &options).expect("recursive probe");
    expect_binding(&subst, "b", &ctx.symbol("x"));
    expect_binding(&subst, "e", &ctx.int(2));
}

#[test]
fn seeded_substitution_constrains_the_match() {
    let ctx = Context::new();
    let pattern = ctx.expr("Add", vec![ctx.symbol("_a"), ctx.symbol("_b")]);
    let candidate = ctx.expr("Add", vec![ctx.int(5), ctx.int(7)]);

    let mut seed = Substitution::new();
    seed.bind("a".to_string(), ctx.int(7));
    let options = MatchOptions { substitution: Some(seed), ..MatchOptions::strict() };
    let subst = match_expr(&candidate, &pattern, &options).expect("seed steers the match");
    expect_binding(&subst, "a", &ctx.int(7));
    expect_binding(&subst, "b", &ctx.int(5));

    let mut seed = Substitution::new();
    seed.bind("a".to_string(), ctx.int(6));
    let options = MatchOptions { substitution: Some(seed), ..MatchOptions::strict() };
    assert!(match_expr(&candidate, &pattern, &options).is_none());
}

#[test]
fn dictionary_values_match_structurally() {
    let ctx = Context::new();
    let pattern = ctx.dictionary(vec![
        ("lhs".to_string(), ctx.symbol("_a")),
        ("rhs".to_string(), ctx.int(1)),
    ]);
    let candidate = ctx.dictionary(vec![
        ("lhs".to_string(), ctx.symbol("x")),
        ("rhs".to_string(), ctx.int(1)),
    ]);
    let subst = match_expr(&candidate, &pattern, &exact()).expect("dictionary match");
    expect_binding(&subst, "a", &ctx.symbol("x"));

    let missing = ctx.dictionary(vec![("lhs".to_string(), ctx.symbol("x"))]);
    assert!(match_expr(&missing, &pattern, &exact()).is_none());
}

#[test]
fn numbers_match_across_tower_cases() {
    let ctx = Context::new();
    // Exact identity regardless of stored case, even in exact mode.
    let pattern = ctx.number(NumericValue::ratio(1, 1));
    assert!(match_expr(&ctx.int(1), &pattern, &exact()).is_some());
    let pattern = ctx.rational(5, 2);
    let candidate = ctx.decimal("2.5").expect("decimal literal");
    assert!(match_expr(&candidate, &pattern, &exact()).is_some());
}

#[test]
fn custom_commutative_operators_join_the_search() {
    let ctx = Context::new();
    let pattern = ctx.expr("Union", vec![ctx.symbol("_a"), ctx.symbol("s")]);
    let candidate = ctx.expr("Union", vec![ctx.symbol("s"), ctx.symbol("t")]);
    assert!(match_expr(&candidate, &pattern, &exact()).is_none());
    ctx.declare_commutative("Union", None);
    let subst = match_expr(&candidate, &pattern, &exact()).expect("declared commutative");
    expect_binding(&subst, "a", &ctx.symbol("t"));
}
