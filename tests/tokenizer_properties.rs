//! Structural properties of the tokenizer and the deferred renderer,
//! checked over a fixed corpus of templates

use std::collections::HashMap;

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use named_fmt::{
    render, render_deferred, render_with_config, tokenize, Delimiters, MalformedTemplate,
    MissingKeyPolicy, RenderConfig, TokenKind,
};

const ESCAPE_ONLY: &[&str] = &[
    "",
    "plain text",
    "{{",
    "}}",
    "{{}}",
    "}}{{",
    "a {{b}} c",
    "{{{{nested}}}}",
    "naïve {{ünïcödé}} ✓",
];

const WELL_FORMED: &[&str] = &[
    "Hello {name}!",
    "{a}{b}{c}",
    "{{literal}} {x}",
    "{x:000} and {y:F2}",
    "{{{x}}}",
    "{}",
    "{:}",
    "{a:b:c}",
    "tail}}",
    "ünï {cödé} ✓",
];

/// Undo `{{` / `}}` escaping outside parameters
fn collapse_escapes(template: &str) -> String {
    template.replace("{{", "{").replace("}}", "}")
}

#[test]
fn test_escape_only_templates_round_trip() {
    let empty: HashMap<String, String> = HashMap::new();
    for template in ESCAPE_ONLY {
        let out = render(template, &empty).expect("Should render");
        assert_eq!(out, collapse_escapes(template), "template {:?}", template);
    }
}

#[test]
fn test_tokens_reconstruct_template() {
    for template in WELL_FORMED {
        let mut rebuilt = String::new();
        for token in tokenize(template, Delimiters::default()) {
            rebuilt.push_str(token.expect("Should tokenize").value());
        }

        let expected = if template.contains("{{") || template.contains("}}") {
            // Parameters never contain braces, so collapsing the whole
            // template only touches the escaped text
            let config = RenderConfig::new().with_policy(MissingKeyPolicy::Ignore);
            let empty: HashMap<String, String> = HashMap::new();
            render_with_config(template, &empty, &config).expect("Should render")
        } else {
            template.to_string()
        };
        assert_eq!(rebuilt, expected, "template {:?}", template);
    }
}

#[test]
fn test_key_splitting_rejoins() {
    for template in WELL_FORMED {
        for token in tokenize(template, Delimiters::default()) {
            let token = token.expect("Should tokenize");
            if token.kind != TokenKind::Parameter {
                continue;
            }
            let rejoined = match token.key_and_format() {
                (key, Some(format)) => format!("{}:{}", key, format),
                (key, None) => key.to_string(),
            };
            assert_eq!(rejoined, token.inner());
        }
    }
}

#[test]
fn test_deferred_placeholders_are_contiguous() {
    let config = RenderConfig::new().with_fallback("-");
    let empty: HashMap<String, String> = HashMap::new();

    for template in WELL_FORMED {
        let composite = render_deferred(template, &empty, &config).expect("Should render");

        let indices: Vec<usize> = tokenize(&composite.format, Delimiters::default())
            .map(|token| token.expect("Composite should tokenize"))
            .filter(|token| token.kind == TokenKind::Parameter)
            .map(|token| {
                token
                    .key_and_format()
                    .0
                    .parse()
                    .expect("Placeholder should be an index")
            })
            .collect();

        let expected: Vec<usize> = (0..composite.values.len()).collect();
        assert_eq!(indices, expected, "template {:?}", template);
    }
}

#[test]
fn test_tokenizer_stops_after_error() {
    let mut tokens = tokenize("ok {a} } {b}", Delimiters::default());
    assert_eq!(tokens.next().map(|t| t.map(|t| t.value())), Some(Ok("ok ")));
    assert_eq!(tokens.next().map(|t| t.map(|t| t.value())), Some(Ok("{a}")));
    // Pending text before a stray close is dropped with the error
    assert_eq!(
        tokens.next().map(|t| t.map(|t| t.value())),
        Some(Err(MalformedTemplate::UnexpectedCloseBrace { position: 7 }))
    );
    assert!(tokens.next().is_none());
    assert!(tokens.next().is_none());
}

#[test]
fn test_token_stream_shape() {
    let summary: Vec<String> = tokenize("a{{b}} {c:F2}!", Delimiters::default())
        .map(|token| {
            let token = token.expect("Should tokenize");
            format!("{:?}@{}:{:?}", token.kind, token.start(), token.value())
        })
        .collect();

    assert_snapshot!(summary.join("\n"), @r#"
    Text@0:"a{"
    Text@3:"b}"
    Text@6:" "
    Parameter@7:"{c:F2}"
    Text@13:"!"
    "#);
}
