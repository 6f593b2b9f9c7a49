use assert_approx_eq::assert_approx_eq;
use bytebeat_core::config::{DivisionByZero, EvalConfig, TruncationPolicy};
use bytebeat_core::error::{BytebeatError, EvalError, Rejection};
use bytebeat_core::eval::{Evaluator, Samples, domain};
use bytebeat_core::render::quantize;
use bytebeat_core::syntax::Construct;
use bytebeat_core::synth::{SynthRequest, synthesize};
use bytebeat_core::{evaluate, validate, validate_and_evaluate};
use pretty_assertions::assert_eq;

fn reference(t: u32) -> u32 {
    (t.wrapping_mul((t >> 9) | (t >> 13)) & 16) & 255
}

#[test]
fn classic_expression_matches_direct_substitution() {
    let out = validate_and_evaluate("(t * (t >> 9 | t >> 13) & 16) & 255", 5).unwrap();
    let expected: Vec<u32> = (0..5).map(reference).collect();
    assert_eq!(out, Samples::Int(expected));
}

#[test]
fn classic_expression_over_a_long_domain() {
    let n = 100_000;
    let out = validate_and_evaluate("(t * (t >> 9 | t >> 13) & 16) & 255", n).unwrap();
    let ints = out.as_int().unwrap();
    assert_eq!(ints.len(), n);
    for (t, &v) in ints.iter().enumerate() {
        assert_eq!(v, reference(t as u32), "t = {t}");
    }
}

#[test]
fn truncated_expression_is_a_syntax_error() {
    assert!(matches!(validate("t + "), Err(Rejection::Syntax { .. })));
}

#[test]
fn method_call_on_module_is_disallowed() {
    match validate("os.system(t)") {
        Err(Rejection::DisallowedCall { name, .. }) => assert!(name.starts_with("os")),
        other => panic!("expected DisallowedCall, got {other:?}"),
    }
}

#[test]
fn conditional_is_unsupported() {
    assert!(matches!(
        validate("t if t > 5 else 0"),
        Err(Rejection::Unsupported {
            construct: Construct::Conditional,
            ..
        })
    ));
}

#[test]
fn sine_matches_direct_computation() {
    let out = validate_and_evaluate("sin(t) * 127 + 128", 3).unwrap();
    let v = out.as_float().unwrap();
    for (t, &x) in v.iter().enumerate() {
        assert_approx_eq!(x, (t as f64).sin() * 127.0 + 128.0);
    }
}

#[test]
fn division_by_zero_is_consistent() {
    let first = validate_and_evaluate("t / 0", 10).unwrap();
    let second = validate_and_evaluate("t / 0", 10).unwrap();
    assert_eq!(first, Samples::Int(vec![0; 10]));
    assert_eq!(first, second);

    let strict = Evaluator::new(EvalConfig {
        division_by_zero: DivisionByZero::Fail,
        ..EvalConfig::default()
    });
    let expr = validate("t / 0").unwrap();
    for _ in 0..2 {
        assert_eq!(
            strict.evaluate(&expr, &domain(10).unwrap()),
            Err(EvalError::ArithmeticPolicyViolation {
                operator: "/",
                index: 0
            })
        );
    }
}

#[test]
fn unknown_identifiers_are_disallowed_names() {
    for source in ["x", "t + foo", "sin(T)", "time * 2", "__builtins__"] {
        assert!(
            matches!(validate(source), Err(Rejection::DisallowedName { .. })),
            "{source}"
        );
    }
}

#[test]
fn unknown_functions_are_disallowed_calls() {
    for source in ["eval(t)", "floor(t)", "print(t)", "t + exec(1)", "open(t)"] {
        assert!(
            matches!(validate(source), Err(Rejection::DisallowedCall { .. })),
            "{source}"
        );
    }
}

#[test]
fn forbidden_constructs_are_unsupported() {
    for source in [
        "t < 5",
        "t and 1",
        "not t",
        "lambda: t",
        "t.real",
        "t[0]",
        "'abc'",
        "[t]",
        "(t, t)",
        "{t: 1}",
        "[t for t in t]",
    ] {
        assert!(
            matches!(validate(source), Err(Rejection::Unsupported { .. })),
            "{source}"
        );
    }
}

#[test]
fn assignments_and_statements_are_unsupported() {
    for source in ["t = 5", "t += 1", "import os", "(t := 5)", "for x in t: pass", "t; t"] {
        assert!(
            matches!(validate(source), Err(Rejection::Unsupported { .. })),
            "{source}"
        );
    }
}

#[test]
fn evaluation_is_deterministic() {
    let expr = validate("(t * 5 & t >> 7) | (t * 3 & t >> 10) + sqrt(t) * 2").unwrap();
    let t = domain(50_000).unwrap();
    assert_eq!(evaluate(&expr, &t).unwrap(), evaluate(&expr, &t).unwrap());
}

#[test]
fn result_length_equals_domain_length() {
    for source in ["t", "42", "sin(t)", "max(t, 100) % 7", "-t >> 3"] {
        for n in [0, 1, 8000, 8001] {
            let out = validate_and_evaluate(source, n).unwrap();
            assert_eq!(out.len(), n, "{source} over {n}");
        }
    }
}

#[test]
fn largest_domain_is_accepted() {
    let out = validate_and_evaluate("t & 255", bytebeat_core::config::MAX_SAMPLES).unwrap();
    assert_eq!(out.len(), 5_760_000);
    assert_eq!(out.get(5_759_999), Some(f64::from(5_759_999u32 & 255)));
}

#[test]
fn float_modulo_takes_the_divisor_sign() {
    let out = validate_and_evaluate("(t - 3.0) % 2.0", 3).unwrap();
    assert_eq!(out, Samples::Float(vec![1.0, 0.0, 1.0]));
    let out = validate_and_evaluate("-1.5 % 2.0", 1).unwrap();
    assert_eq!(out, Samples::Float(vec![0.5]));
}

#[test]
fn long_operator_chains_are_rejected_not_overflowed() {
    for source in [
        format!("t{}", "+t".repeat(100_000)),
        format!("t{}", "*2|t".repeat(50_000)),
        format!("sin{}", "(t)".repeat(100_000)),
        format!("t{}", ".real".repeat(100_000)),
        format!("t{}", " or t".repeat(100_000)),
    ] {
        assert!(
            matches!(validate(&source), Err(Rejection::Syntax { .. })),
            "{}",
            &source[..20]
        );
    }
    let source = format!("t{}", "+t".repeat(150));
    assert_eq!(validate_and_evaluate(&source, 3).unwrap(), Samples::Int(vec![0, 151, 302]));
}

#[test]
fn integer_results_wrap_at_32_bits() {
    let out = validate_and_evaluate("t * 4294967295", 3).unwrap();
    assert_eq!(out, Samples::Int(vec![0, u32::MAX, u32::MAX - 1]));
}

#[test]
fn truncation_policy_is_explicit() {
    let out = validate_and_evaluate("t * 100", 4).unwrap();
    assert_eq!(quantize(&out, TruncationPolicy::Wrap), vec![0, 100, 200, 44]);
    assert_eq!(quantize(&out, TruncationPolicy::Clamp), vec![0, 100, 200, 255]);
}

#[test]
fn synthesis_end_to_end() {
    let request = SynthRequest::new("t * (t >> 5 | t >> 8)", 8000, 2.0);
    let waveform = synthesize(&request, &EvalConfig::default()).unwrap();
    assert_eq!(waveform.shape(), [1, 1, 16_000]);
    assert!(waveform.peak() > 0.0);

    let wav = waveform.to_wav().unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(wav.len(), 44 + 16_000 * 2);
}

#[test]
fn synthesis_rejects_out_of_range_requests() {
    let request = SynthRequest::new("t", 4000, 2.0);
    assert!(matches!(
        synthesize(&request, &EvalConfig::default()),
        Err(BytebeatError::InvalidRequest(_))
    ));
}
