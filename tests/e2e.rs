use formula_substitution as fsub;
use fsub::EvalContext;
use pretty_assertions::assert_eq;

#[test]
fn test_question_text_with_wildcards_and_formula() {
    let ctx: EvalContext = [("a", 3.0), ("b", 4.0)].into_iter().collect();
    let text = "What is the hypotenuse for legs {a} and {b}? Answer: {=sqrt(a^2+b^2)}";
    let out = fsub::substitute(text, &ctx).unwrap();
    assert_eq!(
        out,
        "What is the hypotenuse for legs {a} and {b}? Answer: 5"
    );
}

#[test]
fn test_grading_pipeline_presubstitutes_wildcards() {
    // The grading path replaces {name} references first, then substitutes
    // formulas over the prepared text.
    let ctx: EvalContext = [("x", 5.0)].into_iter().collect();
    let prepared = fsub::replace_wildcards("{x} doubled is {={x}*2}", &ctx);
    assert_eq!(prepared, "5 doubled is {=5*2}");
    let out = fsub::substitute(&prepared, &EvalContext::new()).unwrap();
    assert_eq!(out, "5 doubled is 10");
}

#[test]
fn test_multiple_placeholders_left_to_right() {
    let out = fsub::substitute("a{=1+1}b{=2+2}c", &EvalContext::new()).unwrap();
    assert_eq!(out, "a2b4c");
}

#[test]
fn test_plain_wildcard_is_not_a_formula() {
    let ctx: EvalContext = [("x", 9.0)].into_iter().collect();
    let out = fsub::substitute("{x} vs {=x+1}", &ctx).unwrap();
    assert_eq!(out, "{x} vs 10");
}

#[test]
fn test_no_placeholders_is_identity() {
    let text = "Nothing to do here, not even {this}.";
    assert_eq!(fsub::substitute(text, &EvalContext::new()).unwrap(), text);
}

#[test]
fn test_lenient_preview_keeps_going_after_an_error() {
    let out = fsub::substitute_lenient("{=nope(1)} then {=6/3}", &EvalContext::new());
    assert_eq!(out, "invalid expression 'nope(1)': unknown function 'nope' then 2");
}

#[test]
fn test_validate_accepts_a_well_formed_question() {
    let text = "Compute {=sqrt(4)} and {=pow(x,2)} plus {=pi()*2}.";
    assert!(fsub::validate(text).is_ok());
}

#[test]
fn test_engine_is_reusable_across_texts() {
    let engine = fsub::Engine::with_builtins();
    let ctx: EvalContext = [("x", 2.0)].into_iter().collect();
    assert_eq!(engine.substitute("{=x*10}", &ctx).unwrap(), "20");
    assert_eq!(engine.substitute("{=x-2}", &ctx).unwrap(), "0");
}
