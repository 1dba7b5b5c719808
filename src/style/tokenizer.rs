//! logos-based stylesheet tokenizer.
//!
//! `#name` is a single [`Token::Hash`] token; the parser reads it as an id in
//! selectors and as a color in values. Block comments are skipped.

use logos::Logos;

/// Stylesheet token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    /// `#id` or `#rrggbb`.
    #[regex(r"#[a-zA-Z0-9_-]+")]
    Hash,

    /// Number with an optional unit: `4`, `-1.5em`, `10px`, `50%`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?([a-z]+|%)?")]
    Number,

    /// Double- or single-quoted string.
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Str,

    /// Identifier, including vendor-prefixed ones like `-gilt-icon-source`.
    #[regex(r"-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("*")]
    Star,

    #[token(">")]
    GreaterThan,
}

/// A token with its text and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub line: u32,
    /// Byte offset of the token start.
    pub start: usize,
    /// Byte offset one past the token end.
    pub end: usize,
}

/// Tokenize stylesheet text. Unlexable input is returned as `Err` with the
/// offending line.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, u32> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(input.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |offset: usize| match line_starts.binary_search(&offset) {
        Ok(line) => line as u32 + 1,
        Err(next) => next as u32,
    };

    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        let line = line_of(span.start);
        let token = result.map_err(|_| line)?;
        tokens.push(Spanned {
            token,
            text: input[span.clone()].to_owned(),
            line,
            start: span.start,
            end: span.end,
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds("{ } : ; , . * >"),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::Colon,
                Token::Semicolon,
                Token::Comma,
                Token::Dot,
                Token::Star,
                Token::GreaterThan,
            ]
        );
    }

    #[test]
    fn hash_numbers_idents() {
        let tokens = tokenize("#main #ff0000 10px -1.5em -gilt-icon-source 'Sans'").unwrap();
        let pairs: Vec<_> = tokens.iter().map(|s| (s.token, s.text.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (Token::Hash, "#main"),
                (Token::Hash, "#ff0000"),
                (Token::Number, "10px"),
                (Token::Number, "-1.5em"),
                (Token::Ident, "-gilt-icon-source"),
                (Token::Str, "'Sans'"),
            ]
        );
    }

    #[test]
    fn line_numbers() {
        let tokens = tokenize("a\n\nb {\n  color: red;\n}").unwrap();
        let lines: Vec<_> = tokens.iter().map(|s| (s.text.as_str(), s.line)).collect();
        assert_eq!(
            lines,
            vec![
                ("a", 1),
                ("b", 3),
                ("{", 3),
                ("color", 4),
                (":", 4),
                ("red", 4),
                (";", 4),
                ("}", 5),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("a /* b { } */ c"), vec![Token::Ident, Token::Ident]);
    }

    #[test]
    fn bad_input_reports_line() {
        assert_eq!(tokenize("a {\n @ }"), Err(2));
    }
}
