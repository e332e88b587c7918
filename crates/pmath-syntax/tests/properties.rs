use pmath_syntax::{GroupOptions, SpanArray, flatten, materialize, parse_str};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,3}",
        "[0-9]{1,3}",
        Just("\"s t\"".to_string()),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        let operator = prop::sample::select(vec!["+", "-", "*", "/", "^", ",", ";", "->", "==", "&&"]);
        prop_oneof![
            (inner.clone(), operator, inner.clone()).prop_map(|(a, op, b)| format!("{a}{op}{b}")),
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("{{{e}}}")),
            (inner.clone(), inner.clone()).prop_map(|(f, x)| format!("{f}[{x}]")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a} {b}")),
        ]
    })
}

/// Expressions glued with blanks, line breaks and stray quotes, so that some
/// strings run unterminated into trailing whitespace.
fn source() -> impl Strategy<Value = String> {
    let glue = prop::sample::select(vec![" ", "\n", "\"", " \"", "+\"", "*\"\n", "\" ", "\"a \n"]);
    prop::collection::vec((expression(), glue), 1..4)
        .prop_map(|parts| parts.into_iter().map(|(e, g)| format!("{e}{g}")).collect())
}

/// Every span as `(start, end)`.
fn all_spans(spans: &SpanArray) -> Vec<(usize, usize)> {
    (0..spans.len())
        .flat_map(|pos| spans.chain_at(pos).map(move |span| (pos, spans.end(span))))
        .collect()
}

proptest! {
    #[test]
    fn spans_cover_the_text_and_never_cross(input in source()) {
        let (units, result) = parse_str(&input);
        prop_assert_eq!(result.spans.len(), units.len());
        if let Some(last) = units.len().checked_sub(1) {
            prop_assert!(result.spans.is_token_end(last));
        }

        let spans = all_spans(&result.spans);
        for &(start, end) in &spans {
            prop_assert!(start <= end && end < units.len());
            for &(other_start, other_end) in &spans {
                if start < other_start && other_start <= end {
                    prop_assert!(other_end <= end, "{:?} crosses {:?}", (start, end), (other_start, other_end));
                }
            }
        }
    }

    #[test]
    fn flatten_restores_text_and_token_ends(input in expression()) {
        let (units, result) = parse_str(&input);
        let options = GroupOptions { parseable: false };
        let node = materialize(&result.spans, &units, &options, &mut ());

        let (text, spans) = flatten(&node, &mut ());
        prop_assert_eq!(&text, &units);
        for pos in 0..text.len() {
            prop_assert_eq!(spans.is_token_end(pos), result.spans.is_token_end(pos), "at {}", pos);
        }
    }

    #[test]
    fn materialize_is_deterministic(input in expression()) {
        let (units, result) = parse_str(&input);
        let options = GroupOptions::default();
        let first = materialize(&result.spans, &units, &options, &mut ());
        let second = materialize(&result.spans, &units, &options, &mut ());
        prop_assert_eq!(first, second);
    }
}
