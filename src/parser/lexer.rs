//! Lexer for mustache template source using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Tags (whitespace around the sigil and the name is not significant)
    #[regex(r"\{\{[ \t\r\n]*#[^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    SectionOpen(String),
    #[regex(r"\{\{[ \t\r\n]*\^[^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    InvertedOpen(String),
    #[regex(r"\{\{[ \t\r\n]*/[^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    SectionClose(String),
    #[regex(r"\{\{[ \t\r\n]*>[^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    Partial(String),

    // Unescaped variables: triple mustache or ampersand
    #[regex(r"\{\{\{[^}]*\}\}\}", |lex| tag_name(lex.slice(), 3))]
    #[regex(r"\{\{[ \t\r\n]*&[^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    Unescaped(String),

    // Set-delimiter tags are recognised so the grammar can reject them
    #[regex(r"\{\{[ \t\r\n]*=[^}]*\}\}")]
    SetDelimiter,

    #[regex(r"\{\{[ \t\r\n]*[^ \t\r\n}#^/>!&{=][^}]*\}\}", |lex| tag_name(lex.slice(), 2))]
    Variable(String),

    // A lone brace that does not start a complete tag is literal text
    #[token("{")]
    Brace,

    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    Text(String),

    // Comments (skip)
    #[regex(r"\{\{[ \t\r\n]*![^}]*\}\}", logos::skip)]
    Comment,
}

/// Name inside a tag, without braces, sigil or surrounding whitespace
fn tag_name(slice: &str, braces: usize) -> String {
    let inner = slice[braces..slice.len() - braces].trim();
    inner
        .strip_prefix(|c: char| matches!(c, '#' | '^' | '/' | '>' | '&'))
        .unwrap_or(inner)
        .trim()
        .to_string()
}

/// Lex input string into tokens with spans
///
/// Input that opens a tag without completing it (an unclosed `{{`, or a `}`
/// inside a tag or comment) is not a token; its spans are returned as the error.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Vec<Span>> {
    let mut tokens = Vec::new();
    let mut invalid = Vec::new();

    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => invalid.push(span),
        }
    }

    if invalid.is_empty() {
        Ok(tokens)
    } else {
        Err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_text_and_variable() {
        assert_eq!(
            tokens("Hi {{name}}!"),
            vec![
                Token::Text("Hi ".to_string()),
                Token::Variable("name".to_string()),
                Token::Text("!".to_string()),
            ]
        );
    }

    #[test]
    fn test_section_tags_with_spaces() {
        assert_eq!(
            tokens("{{ #Data }}{{ . }}{{ /Data }}"),
            vec![
                Token::SectionOpen("Data".to_string()),
                Token::Variable(".".to_string()),
                Token::SectionClose("Data".to_string()),
            ]
        );
    }

    #[test]
    fn test_inverted_and_partial() {
        assert_eq!(
            tokens("{{^empty}}{{> site/header}}{{/empty}}"),
            vec![
                Token::InvertedOpen("empty".to_string()),
                Token::Partial("site/header".to_string()),
                Token::SectionClose("empty".to_string()),
            ]
        );
    }

    #[test]
    fn test_unescaped_forms() {
        assert_eq!(
            tokens("{{{content}}}{{& content }}"),
            vec![
                Token::Unescaped("content".to_string()),
                Token::Unescaped("content".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens("a{{! note }}b"),
            vec![Token::Text("a".to_string()), Token::Text("b".to_string())]
        );
    }

    #[test]
    fn test_set_delimiter_recognised() {
        assert_eq!(tokens("{{=<% %>=}}"), vec![Token::SetDelimiter]);
    }

    #[test]
    fn test_lone_braces_are_text() {
        assert_eq!(
            tokens("if (a) { b }"),
            vec![
                Token::Text("if (a) ".to_string()),
                Token::Brace,
                Token::Text(" b }".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag_is_error() {
        let spans = lex("Hello {{name").expect_err("Should fail");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 6);
    }

    #[test]
    fn test_brace_inside_tag_is_error() {
        assert!(lex("{{#a}b}} tail").is_err());
        assert!(lex("{{! a } b }}").is_err());
        assert!(lex("x{{{y}}z").is_err());
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("ab{{c}}")
            .unwrap()
            .into_iter()
            .map(|(_, s)| s)
            .collect();
        assert_eq!(spans, vec![0..2, 2..7]);
    }
}
