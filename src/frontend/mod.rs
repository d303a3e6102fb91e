//! Expression front end: delimiter handling, lexing and parsing

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::Expr;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;

use crate::error::Result;

/// Trim the expression and drop one enclosing `{` ... `}` pair.
/// The braces are only removed when both are present.
pub fn strip_delimiters(expression: &str) -> &str {
    let trimmed = expression.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(trimmed)
}

/// Parse a single expression starting at offset 0. Anything after a
/// complete expression is ignored.
pub fn parse(expression: &str) -> Result<Expr> {
    let tokens = Lexer::new(expression).tokenize();
    log::trace!("Lexed {} tokens from '{}'", tokens.len(), expression);
    Parser::new(tokens).parse_expression()
}
