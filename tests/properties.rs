use formula_substitution as fsub;
use fsub::{EvalContext, Segment};
use proptest::prelude::*;

proptest! {
    // Text without a "{=" marker passes through substitution untouched,
    // whatever the context holds.
    #[test]
    fn substitution_is_identity_without_placeholders(
        text in "[ -~]{0,60}".prop_filter("no placeholder start", |s| !s.contains("{=")),
        x in -1000f64..1000f64,
    ) {
        let ctx: EvalContext = [("x", x)].into_iter().collect();
        prop_assert_eq!(fsub::substitute(&text, &ctx).unwrap(), text);
    }

    // Re-scanning the same text always yields the same segment sequence.
    #[test]
    fn scanning_is_restartable(text in "[ -~]{0,80}") {
        let first: Vec<Segment<'_>> = fsub::scan(&text).collect();
        let second: Vec<Segment<'_>> = fsub::scan(&text).collect();
        prop_assert_eq!(first, second);
    }

    // Scanner segments concatenate back to the original text.
    #[test]
    fn segments_cover_the_input(text in "[ -~]{0,80}") {
        let mut rebuilt = String::new();
        for segment in fsub::scan(&text) {
            match segment {
                Segment::Literal(s) | Segment::Unterminated(s) => rebuilt.push_str(s),
                Segment::Expression(body) => {
                    rebuilt.push_str("{=");
                    rebuilt.push_str(body);
                    rebuilt.push('}');
                }
            }
        }
        prop_assert_eq!(rebuilt, text);
    }

    // Integer arithmetic over literals matches ordinary evaluation.
    #[test]
    fn literal_sums_evaluate_exactly(a in -10_000i32..10_000, b in -10_000i32..10_000) {
        let text = format!("{{={a}+{b}}}");
        let want = (i64::from(a) + i64::from(b)) as f64;
        let out = fsub::substitute(&text, &EvalContext::new()).unwrap();
        prop_assert_eq!(out, want.to_string());
    }

    // A bound wildcard substitutes to the same text as its literal value.
    #[test]
    fn bound_wildcard_matches_literal(v in -1000i32..1000) {
        let ctx: EvalContext = [("x", f64::from(v))].into_iter().collect();
        let with_var = fsub::substitute("{=x*2}", &ctx).unwrap();
        let with_lit = fsub::substitute(&format!("{{={v}*2}}"), &EvalContext::new()).unwrap();
        prop_assert_eq!(with_var, with_lit);
    }
}
