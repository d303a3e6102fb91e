//! Lexical analysis for template expressions
//!
//! Produces the token stream for the ES2021 expression grammar. Lexing errors do
//! not abort tokenization outright: the failure is emitted as a final
//! [`TokenType::Invalid`] token so the parser only fails if it actually reaches it.

use crate::error::{Result, ScanError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    True,
    False,
    Null,
    This,
    Super,
    Typeof,
    Void,
    Delete,
    New,
    Function,
    In,
    Instanceof,
    Reserved(String), // Keywords that can never start or continue an expression

    // Punctuation
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Comma,        // ,
    Colon,        // :
    Semicolon,    // ;
    Dot,          // .
    Ellipsis,     // ...
    Question,     // ?
    QuestionDot,  // ?.
    Arrow,        // =>

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    StarStar,   // **
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --

    // Comparison
    Less,           // <
    Greater,        // >
    LessEqual,      // <=
    GreaterEqual,   // >=
    EqualEqual,     // ==
    NotEqual,       // !=
    StrictEqual,    // ===
    StrictNotEqual, // !==

    // Bitwise and logical
    ShiftLeft,          // <<
    ShiftRight,         // >>
    UnsignedShiftRight, // >>>
    Ampersand,          // &
    Pipe,               // |
    Caret,              // ^
    Bang,               // !
    Tilde,              // ~
    AmpAmp,             // &&
    PipePipe,           // ||
    QuestionQuestion,   // ??

    /// `=` and every compound assignment operator, e.g. `+=`, `??=`
    Assign(String),

    // Literals
    Identifier(String),
    Number(f64),
    BigInt(String),
    String(String),
    RegExp { pattern: String, flags: String },

    // Template pieces, each holding its cooked text
    Template(String),       // `text` with no substitutions
    TemplateHead(String),   // `text${
    TemplateMiddle(String), // }text${
    TemplateTail(String),   // }text`

    // Special
    Invalid(String),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
    /// A line terminator separates this token from the previous one
    pub newline_before: bool,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::True => write!(f, "true"),
            TokenType::False => write!(f, "false"),
            TokenType::Null => write!(f, "null"),
            TokenType::This => write!(f, "this"),
            TokenType::Super => write!(f, "super"),
            TokenType::Typeof => write!(f, "typeof"),
            TokenType::Void => write!(f, "void"),
            TokenType::Delete => write!(f, "delete"),
            TokenType::New => write!(f, "new"),
            TokenType::Function => write!(f, "function"),
            TokenType::In => write!(f, "in"),
            TokenType::Instanceof => write!(f, "instanceof"),
            TokenType::Reserved(word) => write!(f, "keyword '{}'", word),
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBracket => write!(f, "["),
            TokenType::RightBracket => write!(f, "]"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Dot => write!(f, "."),
            TokenType::Ellipsis => write!(f, "..."),
            TokenType::Question => write!(f, "?"),
            TokenType::QuestionDot => write!(f, "?."),
            TokenType::Arrow => write!(f, "=>"),
            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Star => write!(f, "*"),
            TokenType::StarStar => write!(f, "**"),
            TokenType::Slash => write!(f, "/"),
            TokenType::Percent => write!(f, "%"),
            TokenType::PlusPlus => write!(f, "++"),
            TokenType::MinusMinus => write!(f, "--"),
            TokenType::Less => write!(f, "<"),
            TokenType::Greater => write!(f, ">"),
            TokenType::LessEqual => write!(f, "<="),
            TokenType::GreaterEqual => write!(f, ">="),
            TokenType::EqualEqual => write!(f, "=="),
            TokenType::NotEqual => write!(f, "!="),
            TokenType::StrictEqual => write!(f, "==="),
            TokenType::StrictNotEqual => write!(f, "!=="),
            TokenType::ShiftLeft => write!(f, "<<"),
            TokenType::ShiftRight => write!(f, ">>"),
            TokenType::UnsignedShiftRight => write!(f, ">>>"),
            TokenType::Ampersand => write!(f, "&"),
            TokenType::Pipe => write!(f, "|"),
            TokenType::Caret => write!(f, "^"),
            TokenType::Bang => write!(f, "!"),
            TokenType::Tilde => write!(f, "~"),
            TokenType::AmpAmp => write!(f, "&&"),
            TokenType::PipePipe => write!(f, "||"),
            TokenType::QuestionQuestion => write!(f, "??"),
            TokenType::Assign(op) => write!(f, "{}", op),
            TokenType::Identifier(name) => write!(f, "identifier({})", name),
            TokenType::Number(n) => write!(f, "number({})", n),
            TokenType::BigInt(digits) => write!(f, "bigint({}n)", digits),
            TokenType::String(s) => write!(f, "string(\"{}\")", s),
            TokenType::RegExp { pattern, flags } => write!(f, "regexp(/{}/{})", pattern, flags),
            TokenType::Template(_) => write!(f, "template"),
            TokenType::TemplateHead(_) => write!(f, "template head"),
            TokenType::TemplateMiddle(_) => write!(f, "'}}' in template"),
            TokenType::TemplateTail(_) => write!(f, "template tail"),
            TokenType::Invalid(message) => write!(f, "invalid token ({})", message),
            TokenType::Eof => write!(f, "end of input"),
        }
    }
}

impl TokenType {
    /// Source spelling of keyword tokens, which are valid property names after `.`
    pub fn keyword_text(&self) -> Option<&str> {
        let text = match self {
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Null => "null",
            TokenType::This => "this",
            TokenType::Super => "super",
            TokenType::Typeof => "typeof",
            TokenType::Void => "void",
            TokenType::Delete => "delete",
            TokenType::New => "new",
            TokenType::Function => "function",
            TokenType::In => "in",
            TokenType::Instanceof => "instanceof",
            TokenType::Reserved(word) => word.as_str(),
            _ => return None,
        };
        Some(text)
    }

    /// Whether a `/` following this token starts a regular expression
    fn allows_regex_after(&self) -> bool {
        !matches!(
            self,
            TokenType::Identifier(_)
                | TokenType::Number(_)
                | TokenType::BigInt(_)
                | TokenType::String(_)
                | TokenType::Template(_)
                | TokenType::TemplateTail(_)
                | TokenType::RegExp { .. }
                | TokenType::True
                | TokenType::False
                | TokenType::Null
                | TokenType::This
                | TokenType::Super
                | TokenType::RightParen
                | TokenType::RightBracket
                | TokenType::RightBrace
                | TokenType::PlusPlus
                | TokenType::MinusMinus
        )
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    regex_allowed: bool,
    // One entry per unclosed `{`; true when it opened a template substitution
    open_braces: Vec<bool>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            regex_allowed: true,
            open_braces: Vec::new(),
        }
    }

    fn parse_error(&self, message: impl Into<String>) -> ScanError {
        ScanError::parse(self.line, self.column, message)
    }

    /// Tokenize the whole input. Always ends with `Eof` or `Invalid`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut after_dot = false;

        loop {
            let newline_before = match self.skip_trivia() {
                Ok(newline) => newline,
                Err(e) => {
                    let (line, column) = match &e {
                        ScanError::Parse { line, column, .. } => (*line, *column),
                        _ => (self.line, self.column),
                    };
                    tokens.push(invalid_token(e, line, column));
                    break;
                }
            };

            if self.is_at_end() {
                tokens.push(Token {
                    token_type: TokenType::Eof,
                    line: self.line,
                    column: self.column,
                    newline_before,
                });
                break;
            }

            let start_line = self.line;
            let start_column = self.column;
            match self.next_token() {
                Ok(token_type) => {
                    // `x.return / y` divides: a keyword after `.` is a property name
                    let property_name = after_dot && token_type.keyword_text().is_some();
                    self.regex_allowed = !property_name && token_type.allows_regex_after();
                    after_dot = matches!(token_type, TokenType::Dot | TokenType::QuestionDot);
                    tokens.push(Token {
                        token_type,
                        line: start_line,
                        column: start_column,
                        newline_before,
                    });
                }
                Err(e) => {
                    tokens.push(invalid_token(e, start_line, start_column));
                    break;
                }
            }
        }

        tokens
    }

    /// Skip whitespace and comments; reports whether a line terminator was crossed
    fn skip_trivia(&mut self) -> Result<bool> {
        let mut newline = false;

        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                newline = true;
                self.advance();
            } else if ch.is_whitespace() || ch == '\u{feff}' {
                self.advance();
            } else if ch == '/' && self.peek_next() == Some('/') {
                while let Some(c) = self.peek() {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.advance();
                }
            } else if ch == '/' && self.peek_next() == Some('*') {
                let (line, column) = (self.line, self.column);
                self.advance();
                self.advance();
                loop {
                    match self.peek() {
                        Some('*') if self.peek_next() == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(c) => {
                            if is_line_terminator(c) {
                                newline = true;
                            }
                            self.advance();
                        }
                        None => {
                            return Err(ScanError::parse(line, column, "Unterminated comment"));
                        }
                    }
                }
            } else {
                break;
            }
        }

        Ok(newline)
    }

    fn next_token(&mut self) -> Result<TokenType> {
        let ch = self.advance();

        let token_type = match ch {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            '{' => {
                self.open_braces.push(false);
                TokenType::LeftBrace
            }
            '}' => {
                if self.open_braces.pop() == Some(true) {
                    self.read_template_span(false)?
                } else {
                    TokenType::RightBrace
                }
            }
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            ';' => TokenType::Semicolon,
            '~' => TokenType::Tilde,
            '.' => {
                if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.read_number(ch)?
                } else if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenType::Ellipsis
                } else {
                    TokenType::Dot
                }
            }
            '?' => {
                if self.peek() == Some('.') && !self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                    TokenType::QuestionDot
                } else if self.peek() == Some('?') {
                    self.advance();
                    if self.match_char('=') {
                        TokenType::Assign("??=".to_string())
                    } else {
                        TokenType::QuestionQuestion
                    }
                } else {
                    TokenType::Question
                }
            }
            '=' => {
                if self.match_char('>') {
                    TokenType::Arrow
                } else if self.match_char('=') {
                    if self.match_char('=') {
                        TokenType::StrictEqual
                    } else {
                        TokenType::EqualEqual
                    }
                } else {
                    TokenType::Assign("=".to_string())
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        TokenType::StrictNotEqual
                    } else {
                        TokenType::NotEqual
                    }
                } else {
                    TokenType::Bang
                }
            }
            '+' => {
                if self.match_char('+') {
                    TokenType::PlusPlus
                } else if self.match_char('=') {
                    TokenType::Assign("+=".to_string())
                } else {
                    TokenType::Plus
                }
            }
            '-' => {
                if self.match_char('-') {
                    TokenType::MinusMinus
                } else if self.match_char('=') {
                    TokenType::Assign("-=".to_string())
                } else {
                    TokenType::Minus
                }
            }
            '*' => {
                if self.match_char('*') {
                    if self.match_char('=') {
                        TokenType::Assign("**=".to_string())
                    } else {
                        TokenType::StarStar
                    }
                } else if self.match_char('=') {
                    TokenType::Assign("*=".to_string())
                } else {
                    TokenType::Star
                }
            }
            '/' => {
                if self.regex_allowed {
                    self.read_regex()?
                } else if self.match_char('=') {
                    TokenType::Assign("/=".to_string())
                } else {
                    TokenType::Slash
                }
            }
            '%' => {
                if self.match_char('=') {
                    TokenType::Assign("%=".to_string())
                } else {
                    TokenType::Percent
                }
            }
            '<' => {
                if self.match_char('<') {
                    if self.match_char('=') {
                        TokenType::Assign("<<=".to_string())
                    } else {
                        TokenType::ShiftLeft
                    }
                } else if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                }
            }
            '>' => {
                if self.match_char('>') {
                    if self.match_char('>') {
                        if self.match_char('=') {
                            TokenType::Assign(">>>=".to_string())
                        } else {
                            TokenType::UnsignedShiftRight
                        }
                    } else if self.match_char('=') {
                        TokenType::Assign(">>=".to_string())
                    } else {
                        TokenType::ShiftRight
                    }
                } else if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            '&' => {
                if self.match_char('&') {
                    if self.match_char('=') {
                        TokenType::Assign("&&=".to_string())
                    } else {
                        TokenType::AmpAmp
                    }
                } else if self.match_char('=') {
                    TokenType::Assign("&=".to_string())
                } else {
                    TokenType::Ampersand
                }
            }
            '|' => {
                if self.match_char('|') {
                    if self.match_char('=') {
                        TokenType::Assign("||=".to_string())
                    } else {
                        TokenType::PipePipe
                    }
                } else if self.match_char('=') {
                    TokenType::Assign("|=".to_string())
                } else {
                    TokenType::Pipe
                }
            }
            '^' => {
                if self.match_char('=') {
                    TokenType::Assign("^=".to_string())
                } else {
                    TokenType::Caret
                }
            }
            '"' | '\'' => TokenType::String(self.read_string(ch)?),
            '`' => self.read_template_span(true)?,
            c if c.is_ascii_digit() => self.read_number(c)?,
            c if is_identifier_start(c) => {
                let word = self.read_identifier(c)?;
                identify_keyword_or_identifier(word)
            }
            '\\' => {
                return Err(self.parse_error("Unicode escapes in identifiers are not supported"));
            }
            _ => {
                return Err(self.parse_error(format!("Unexpected character '{}'", ch)));
            }
        };

        Ok(token_type)
    }

    fn advance(&mut self) -> char {
        if self.position < self.input.len() {
            let ch = self.input[self.position];
            self.position += 1;
            if ch == '\n' || ch == '\u{2028}' || ch == '\u{2029}' {
                self.line += 1;
                self.column = 1;
            } else if ch == '\r' {
                if self.peek() != Some('\n') {
                    self.line += 1;
                    self.column = 1;
                }
            } else {
                self.column += 1;
            }
            ch
        } else {
            '\0'
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn read_identifier(&mut self, first_char: char) -> Result<String> {
        let mut word = String::new();
        word.push(first_char);

        while let Some(ch) = self.peek() {
            if is_identifier_part(ch) {
                word.push(ch);
                self.advance();
            } else if ch == '\\' {
                return Err(self.parse_error("Unicode escapes in identifiers are not supported"));
            } else {
                break;
            }
        }

        Ok(word)
    }

    fn read_number(&mut self, first_char: char) -> Result<TokenType> {
        if first_char == '0' {
            let radix = match self.peek() {
                Some('x') | Some('X') => Some(16),
                Some('o') | Some('O') => Some(8),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                let digits = self.read_digits(radix);
                if digits.is_empty() {
                    return Err(self.parse_error("Expected number in radix literal"));
                }
                if self.match_char('n') {
                    self.ensure_number_boundary()?;
                    return Ok(TokenType::BigInt(digits));
                }
                self.ensure_number_boundary()?;
                let value = digits.chars().fold(0.0_f64, |acc, d| {
                    acc * f64::from(radix) + f64::from(d.to_digit(radix).unwrap_or(0))
                });
                return Ok(TokenType::Number(value));
            }
        }

        let mut text = String::new();
        let mut is_integer = true;

        if first_char == '.' {
            text.push_str("0.");
            is_integer = false;
            text.push_str(&self.read_digits(10));
        } else {
            text.push(first_char);
            text.push_str(&self.read_digits(10));
            if self.peek() == Some('.') {
                self.advance();
                is_integer = false;
                text.push('.');
                text.push_str(&self.read_digits(10));
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let exponent_follows = match self.peek_next() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self
                    .input
                    .get(self.position + 2)
                    .map_or(false, |c| c.is_ascii_digit()),
                _ => false,
            };
            if !exponent_follows {
                return Err(self.parse_error("Invalid exponent in number literal"));
            }
            is_integer = false;
            text.push(self.advance());
            if matches!(self.peek(), Some('+') | Some('-')) {
                text.push(self.advance());
            }
            text.push_str(&self.read_digits(10));
        }

        if is_integer && self.match_char('n') {
            self.ensure_number_boundary()?;
            return Ok(TokenType::BigInt(text));
        }

        self.ensure_number_boundary()?;
        text.parse::<f64>()
            .map(TokenType::Number)
            .map_err(|_| self.parse_error(format!("Invalid number literal '{}'", text)))
    }

    /// Digits of the given radix with `_` separators removed
    fn read_digits(&mut self, radix: u32) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                digits.push(ch);
                self.advance();
            } else if ch == '_' && self.peek_next().map_or(false, |c| c.is_digit(radix)) {
                self.advance();
            } else {
                break;
            }
        }
        digits
    }

    fn ensure_number_boundary(&self) -> Result<()> {
        match self.peek() {
            Some(c) if is_identifier_start(c) || c.is_ascii_digit() => {
                Err(self.parse_error("Identifier directly after number"))
            }
            _ => Ok(()),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(self.parse_error("Unterminated string literal")),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut value)?;
                }
                Some(ch) if ch == '\n' || ch == '\r' => {
                    return Err(self.parse_error("Unterminated string literal"));
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Decode one escape sequence; the backslash is already consumed
    fn read_escape(&mut self, value: &mut String) -> Result<()> {
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Err(self.parse_error("Unterminated escape sequence")),
        };
        self.advance();

        match ch {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !self.peek().map_or(false, |c| c.is_ascii_digit()) => value.push('\0'),
            'x' => {
                let code = self.read_hex_digits(2)?;
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'u' => {
                let code = if self.match_char('{') {
                    let mut hex = String::new();
                    while let Some(c) = self.peek() {
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                        self.advance();
                    }
                    if !self.match_char('}') || hex.is_empty() {
                        return Err(self.parse_error("Invalid Unicode escape sequence"));
                    }
                    u32::from_str_radix(&hex, 16)
                        .map_err(|_| self.parse_error("Invalid Unicode escape sequence"))?
                } else {
                    self.read_hex_digits(4)?
                };
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            '\r' => {
                self.match_char('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => value.push(other),
        }

        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => return Err(self.parse_error("Invalid hexadecimal escape sequence")),
            }
        }
        Ok(code)
    }

    /// Template text up to the next `${` or closing backtick. `opening` is true
    /// right after a backtick and false after the `}` that ends a substitution.
    fn read_template_span(&mut self, opening: bool) -> Result<TokenType> {
        let mut cooked = String::new();

        loop {
            match self.peek() {
                None => return Err(self.parse_error("Unterminated template literal")),
                Some('`') => {
                    self.advance();
                    return Ok(if opening {
                        TokenType::Template(cooked)
                    } else {
                        TokenType::TemplateTail(cooked)
                    });
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut cooked)?;
                }
                Some('$') if self.peek_next() == Some('{') => {
                    self.advance();
                    self.advance();
                    self.open_braces.push(true);
                    return Ok(if opening {
                        TokenType::TemplateHead(cooked)
                    } else {
                        TokenType::TemplateMiddle(cooked)
                    });
                }
                Some(ch) => {
                    cooked.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Regular expression literal body and flags; the opening slash is already consumed
    fn read_regex(&mut self) -> Result<TokenType> {
        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            let ch = match self.peek() {
                Some(ch) if !is_line_terminator(ch) => ch,
                _ => return Err(self.parse_error("Unterminated regular expression")),
            };
            self.advance();

            match ch {
                '\\' => {
                    pattern.push(ch);
                    match self.peek() {
                        Some(next) if !is_line_terminator(next) => {
                            self.advance();
                            pattern.push(next);
                        }
                        _ => return Err(self.parse_error("Unterminated regular expression")),
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(ch);
                }
                ']' => {
                    in_class = false;
                    pattern.push(ch);
                }
                '/' if !in_class => break,
                _ => pattern.push(ch),
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if is_identifier_part(ch) {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(TokenType::RegExp { pattern, flags })
    }
}

/// Terminal token carrying a lexing failure
fn invalid_token(error: ScanError, line: usize, column: usize) -> Token {
    let message = match error {
        ScanError::Parse { message, .. } => message,
        other => other.to_string(),
    };
    Token {
        token_type: TokenType::Invalid(message),
        line,
        column,
        newline_before: false,
    }
}

fn identify_keyword_or_identifier(word: String) -> TokenType {
    match word.as_str() {
        "true" => TokenType::True,
        "false" => TokenType::False,
        "null" => TokenType::Null,
        "this" => TokenType::This,
        "super" => TokenType::Super,
        "typeof" => TokenType::Typeof,
        "void" => TokenType::Void,
        "delete" => TokenType::Delete,
        "new" => TokenType::New,
        "function" => TokenType::Function,
        "in" => TokenType::In,
        "instanceof" => TokenType::Instanceof,
        "break" | "case" | "catch" | "class" | "const" | "continue" | "debugger" | "default"
        | "do" | "else" | "enum" | "export" | "extends" | "finally" | "for" | "if" | "import"
        | "return" | "switch" | "throw" | "try" | "var" | "while" | "with" => {
            TokenType::Reserved(word)
        }
        _ => TokenType::Identifier(word),
    }
}

/// True for words that lex as keywords rather than identifiers
pub fn is_keyword(word: &str) -> bool {
    !matches!(
        identify_keyword_or_identifier(word.to_string()),
        TokenType::Identifier(_)
    )
}

fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_alphanumeric() || ch == '\u{200c}' || ch == '\u{200d}'
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
