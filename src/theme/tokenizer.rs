//! logos-based tokenizer for theme sources.
//!
//! Longest match wins, so `#3a8dff` lexes as [`Token::HexColor`] and `12.5`
//! as one [`Token::Number`]. `//` comments run to the end of the line.

use logos::Logos;

/// Theme source token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    #[regex(r#""[^"\n]*""#)]
    StringLiteral,

    /// Integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Keywords, kind names, style keys, `true`/`false`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
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

    #[token("*")]
    Star,
}

/// A lexed token with its source text and 1-based line.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub line: usize,
}

/// Tokenize `input`. Characters that fail to lex are returned as `Err(line)`.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, (usize, String)> {
    let mut out = Vec::new();
    let mut line = 1;
    let mut scanned = 0;
    for (result, span) in Token::lexer(input).spanned() {
        line += input[scanned..span.start].matches('\n').count();
        scanned = span.start;
        let text = &input[span];
        match result {
            Ok(token) => out.push(Spanned {
                token,
                text: text.to_string(),
                line,
            }),
            Err(()) => return Err((line, text.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            tokens("{ } : ; , *"),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::Colon,
                Token::Semicolon,
                Token::Comma,
                Token::Star,
            ]
        );
    }

    #[test]
    fn values() {
        assert_eq!(
            tokens(r##"#3A8DFF 12 -4 1.5 "Segoe UI" true"##),
            vec![
                Token::HexColor,
                Token::Number,
                Token::Number,
                Token::Number,
                Token::StringLiteral,
                Token::Ident,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens("// header\nButton // trailing"), vec![Token::Ident]);
    }

    #[test]
    fn lines_are_tracked() {
        let toks = tokenize("a\n\nb\nc").unwrap();
        let lines: Vec<usize> = toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn bad_character_reports_line() {
        assert_eq!(tokenize("a\n@").unwrap_err(), (2, "@".to_string()));
    }
}
