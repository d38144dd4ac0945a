//! Recursive descent parser for theme sources.
//!
//! ```text
//! theme "ocean" {
//!     * { foreground: #F5F7FA; font_family: "Segoe UI"; }
//!     Button, CheckButton { background: #3A8DFF; padding: 4; }
//! }
//! ```
//!
//! Keys and kinds are checked here for spelling only; the store checks types.

use crate::config::value::{Color, Value};
use crate::error::{Error, Result};
use crate::widget::kind::WidgetKind;

use super::store::{Selector, Theme};
use super::tokenizer::{tokenize, Spanned, Token};

/// Parse every `theme` block in `input`.
pub fn parse_themes(input: &str) -> Result<Vec<Theme>> {
    let tokens = tokenize(input).map_err(|(line, text)| Error::ThemeParse {
        line,
        message: format!("unexpected character '{text}'"),
    })?;
    let mut parser = Parser { tokens, cursor: 0 };
    let mut themes = Vec::new();
    while !parser.is_eof() {
        themes.push(parser.parse_theme()?);
    }
    Ok(themes)
}

struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::ThemeParse {
            line: self.line(),
            message: message.into(),
        }
    }

    fn advance(&mut self) -> Result<Spanned> {
        let tok = self
            .tokens
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.cursor += 1;
        Ok(tok)
    }

    fn expect(&mut self, expected: Token) -> Result<Spanned> {
        match self.peek() {
            Some(tok) if tok.token == expected => self.advance(),
            Some(tok) => Err(self.error(format!("expected {expected:?}, got '{}'", tok.text))),
            None => Err(self.error(format!("expected {expected:?}, got end of input"))),
        }
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek().is_some_and(|t| t.token == token) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn parse_theme(&mut self) -> Result<Theme> {
        let keyword = self.expect(Token::Ident)?;
        if keyword.text != "theme" {
            self.cursor -= 1;
            return Err(self.error(format!("expected 'theme', got '{}'", keyword.text)));
        }
        let name = self.expect(Token::StringLiteral)?;
        let mut theme = Theme::new(unquote(&name.text));
        self.expect(Token::BraceOpen)?;
        while !self.eat(Token::BraceClose) {
            if self.is_eof() {
                return Err(self.error("unterminated theme block"));
            }
            self.parse_rule(&mut theme)?;
        }
        Ok(theme)
    }

    fn parse_rule(&mut self, theme: &mut Theme) -> Result<()> {
        let mut selectors = vec![self.parse_selector()?];
        while self.eat(Token::Comma) {
            selectors.push(self.parse_selector()?);
        }
        self.expect(Token::BraceOpen)?;
        while !self.eat(Token::BraceClose) {
            let key = self.expect(Token::Ident)?.text;
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            if !self.eat(Token::Semicolon) && self.peek().is_some_and(|t| t.token != Token::BraceClose) {
                return Err(self.error("expected ';' after declaration"));
            }
            for &selector in &selectors {
                theme.insert(selector, key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn parse_selector(&mut self) -> Result<Selector> {
        if self.eat(Token::Star) {
            return Ok(Selector::Any);
        }
        let tok = self.expect(Token::Ident)?;
        WidgetKind::from_name(&tok.text)
            .map(Selector::Kind)
            .ok_or_else(|| Error::ThemeParse {
                line: tok.line,
                message: format!("unknown widget kind '{}'", tok.text),
            })
    }

    fn parse_value(&mut self) -> Result<Value> {
        let tok = self.advance()?;
        let bad = |what: &str| Error::ThemeParse {
            line: tok.line,
            message: format!("invalid {what} '{}'", tok.text),
        };
        match tok.token {
            Token::HexColor => Color::from_hex(&tok.text)
                .map(Value::Color)
                .ok_or_else(|| bad("color")),
            Token::Number if tok.text.contains('.') => {
                tok.text.parse().map(Value::Float).map_err(|_| bad("number"))
            }
            Token::Number => tok.text.parse().map(Value::Int).map_err(|_| bad("number")),
            Token::StringLiteral => Ok(Value::Text(unquote(&tok.text).to_string())),
            Token::Ident if tok.text == "true" => Ok(Value::Bool(true)),
            Token::Ident if tok.text == "false" => Ok(Value::Bool(false)),
            _ => Err(bad("value")),
        }
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}
