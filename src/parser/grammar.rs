//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{lex, Token};

/// Parse template source into an AST
pub fn parse(input: &str) -> Result<Document, Vec<ParseError>> {
    let len = input.len();

    let tokens = lex(input).map_err(|spans| {
        spans
            .into_iter()
            .map(unclosed_tag)
            .collect::<Vec<_>>()
    })?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Error for input the lexer could not turn into a complete tag
fn unclosed_tag(span: std::ops::Range<usize>) -> ParseError {
    ParseError::Syntax {
        span,
        message: "Unclosed tag".to_string(),
        expected: vec!["'}}'".to_string()],
    }
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let text = select! {
        Token::Text(s) => Node::Text(s),
        Token::Brace => Node::Text("{".to_string()),
    };

    let variable = select! {
        Token::Variable(name) => Node::Variable { name, escape: true },
        Token::Unescaped(name) => Node::Variable { name, escape: false },
    };

    let partial = select! {
        Token::Partial(name) => Node::Partial(name),
    };

    let section_open = select! {
        Token::SectionOpen(name) => (name, false),
        Token::InvertedOpen(name) => (name, true),
    };

    let section_close = select! {
        Token::SectionClose(name) => name,
    };

    let node = recursive(|node| {
        // A section must be closed by a tag carrying the same name
        let section = section_open
            .then(node.repeated().collect::<Vec<_>>())
            .then(section_close)
            .try_map(|(((name, inverted), children), closing), span| {
                if closing == name {
                    Ok(Node::Section {
                        name,
                        inverted,
                        children,
                    })
                } else {
                    Err(Rich::custom(
                        span,
                        format!("section '{}' closed by '{}'", name, closing),
                    ))
                }
            });

        choice((text, variable, partial, section))
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
            .boxed()
    });

    node.repeated()
        .collect()
        .then_ignore(end())
        .map(|nodes| Document { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;

    #[test]
    fn test_parse_text_and_variables() {
        let doc = parse("Hello {{name}} and {{{html}}}").expect("Should parse");
        let nodes: Vec<_> = doc.nodes.into_iter().map(|n| n.node).collect();
        assert_eq!(
            nodes,
            vec![
                Node::Text("Hello ".to_string()),
                Node::Variable {
                    name: "name".to_string(),
                    escape: true
                },
                Node::Text(" and ".to_string()),
                Node::Variable {
                    name: "html".to_string(),
                    escape: false
                },
            ]
        );
    }

    #[test]
    fn test_parse_nested_sections() {
        let doc = parse("{{#items}}{{^hidden}}{{name}}{{/hidden}}{{/items}}").expect("Should parse");
        assert_eq!(doc.nodes.len(), 1);
        match &doc.nodes[0].node {
            Node::Section {
                name,
                inverted,
                children,
            } => {
                assert_eq!(name, "items");
                assert!(!inverted);
                assert_eq!(children.len(), 1);
                assert!(matches!(
                    &children[0].node,
                    Node::Section { inverted: true, .. }
                ));
            }
            other => panic!("Expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_section() {
        let doc = parse("{{#a}}{{/a}}").expect("Should parse");
        assert!(matches!(
            &doc.nodes[0].node,
            Node::Section { children, .. } if children.is_empty()
        ));
    }

    #[test]
    fn test_parse_partial_names() {
        let doc = parse("{{> header}}{{#list}}{{> item}}{{/list}}").expect("Should parse");
        assert_eq!(doc.partial_names(), vec!["header", "item"]);
    }

    #[test]
    fn test_parse_lone_braces_are_text() {
        let doc = parse("a { b }").expect("Should parse");
        let text: String = doc
            .nodes
            .iter()
            .map(|n| match &n.node {
                Node::Text(s) => s.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(text, "a { b }");
    }

    #[test]
    fn test_span_of_section() {
        let doc = parse("x{{#a}}y{{/a}}").expect("Should parse");
        assert_eq!(doc.nodes[1].span, 1..14);
    }

    #[test]
    fn test_mismatched_close_is_error() {
        let errors = parse("{{#a}}x{{/b}}").expect_err("Should fail");
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| matches!(e, ParseError::Syntax { .. })));
    }

    #[test]
    fn test_unclosed_section_is_error() {
        assert!(parse("{{#a}}x").is_err());
    }

    #[test]
    fn test_stray_close_is_error() {
        assert!(parse("x{{/a}}").is_err());
    }

    #[test]
    fn test_set_delimiter_is_error() {
        assert!(parse("{{=<% %>=}}").is_err());
    }

    #[test]
    fn test_unclosed_tag_is_error() {
        let errors = parse("Hello {{name").expect_err("Should fail");
        assert!(matches!(
            &errors[0],
            ParseError::Syntax { span, message, .. } if span.start == 6 && message == "Unclosed tag"
        ));
    }

    #[test]
    fn test_malformed_tags_are_errors() {
        for source in ["x{{{y}}z", "{{! a } b }}", "a {{ b", "if (a) {{ ok }", "{{#a}b}} tail"] {
            assert!(parse(source).is_err(), "{:?} should not parse", source);
        }
    }
}
