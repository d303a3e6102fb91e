//! Recursive descent parser for template expressions
//!
//! Parses a single ES2021 expression. Function bodies written as statement
//! blocks are stepped over by brace matching and never parsed.

use crate::core::constants::MAX_EXPRESSION_DEPTH;
use crate::error::{Result, ScanError};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Token, TokenType};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token {
                token_type: TokenType::Eof,
                line: 1,
                column: 1,
                newline_before: false,
            });
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parse one expression from the current position. Tokens after it are left
    /// unread, but the token immediately following must have lexed cleanly.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        let expr = self.parse_sequence()?;
        if matches!(self.peek().token_type, TokenType::Invalid(_)) {
            return Err(self.error_at_current("Unexpected input"));
        }
        Ok(expr)
    }

    /// Parse an expression that must cover the whole token stream
    pub fn parse_complete(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self.error_at_current(format!(
                "Unexpected {} after expression",
                self.peek().token_type
            )));
        }
        Ok(expr)
    }

    fn parse_sequence(&mut self) -> Result<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenType::Comma) {
            return Ok(first);
        }

        let mut children = vec![first];
        while self.match_token(&TokenType::Comma) {
            children.push(self.parse_assignment()?);
        }

        Ok(Expr::Other {
            kind: OtherKind::Sequence,
            children,
        })
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> Result<Expr> {
        let target = self.parse_conditional()?;

        if let TokenType::Assign(operator) = &self.peek().token_type {
            let operator = operator.clone();
            self.advance();
            let value = self.parse_assignment()?;
            return Ok(Expr::Other {
                kind: OtherKind::Assignment { operator },
                children: vec![target, value],
            });
        }

        Ok(target)
    }

    /// Parse conditional expression: test ? consequent : alternate
    fn parse_conditional(&mut self) -> Result<Expr> {
        let test = self.parse_binary(1)?;

        if self.match_token(&TokenType::Question) {
            let consequent = self.parse_assignment()?;
            self.consume(TokenType::Colon, "Expected ':' in conditional expression")?;
            let alternate = self.parse_assignment()?;

            Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            })
        } else {
            Ok(test)
        }
    }

    /// Precedence climbing over every left-associative infix operator
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_exponent()?;

        while let Some((precedence, operator)) = infix_operator(&self.peek().token_type) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;

            left = match operator {
                InfixOperator::Binary(operator) => Expr::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                InfixOperator::Logical(operator) => Expr::Logical {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    /// `**` binds tighter than every other infix operator and is right-associative
    fn parse_exponent(&mut self) -> Result<Expr> {
        let base = self.parse_unary()?;

        if self.match_token(&TokenType::StarStar) {
            let exponent = self.nested(Self::parse_exponent)?;
            return Ok(Expr::Binary {
                operator: BinaryOperator::Exponent,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }

        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let operator = match &self.peek().token_type {
            TokenType::Bang => Some(UnaryOperator::Not),
            TokenType::Tilde => Some(UnaryOperator::BitNot),
            TokenType::Plus => Some(UnaryOperator::Plus),
            TokenType::Minus => Some(UnaryOperator::Minus),
            TokenType::Typeof => Some(UnaryOperator::Typeof),
            TokenType::Void => Some(UnaryOperator::Void),
            TokenType::Delete => Some(UnaryOperator::Delete),
            _ => None,
        };

        if let Some(operator) = operator {
            self.advance();
            let argument = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                operator,
                argument: Box::new(argument),
            });
        }

        if let Some(operator) = self.update_operator() {
            self.advance();
            let argument = self.nested(Self::parse_unary)?;
            return Ok(Expr::Other {
                kind: OtherKind::Update {
                    operator,
                    prefix: true,
                },
                children: vec![argument],
            });
        }

        let expr = self.parse_call_member()?;

        // No line terminator is allowed before a postfix operator
        if !self.peek().newline_before {
            if let Some(operator) = self.update_operator() {
                self.advance();
                return Ok(Expr::Other {
                    kind: OtherKind::Update {
                        operator,
                        prefix: false,
                    },
                    children: vec![expr],
                });
            }
        }

        Ok(expr)
    }

    fn update_operator(&self) -> Option<String> {
        match self.peek().token_type {
            TokenType::PlusPlus => Some("++".to_string()),
            TokenType::MinusMinus => Some("--".to_string()),
            _ => None,
        }
    }

    fn parse_call_member(&mut self) -> Result<Expr> {
        let base = if self.check(&TokenType::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_member_suffix(base, true)
    }

    /// Member accesses, optional chains, calls and tagged templates after `object`
    fn parse_member_suffix(&mut self, mut object: Expr, allow_calls: bool) -> Result<Expr> {
        loop {
            match &self.peek().token_type {
                TokenType::Dot => {
                    self.advance();
                    let name = self.parse_member_name()?;
                    object = Expr::Member {
                        object: Box::new(object),
                        property: Box::new(Expr::Identifier(name)),
                        computed: false,
                        optional: false,
                    };
                }
                TokenType::QuestionDot if allow_calls => {
                    self.advance();
                    object = match &self.peek().token_type {
                        TokenType::LeftParen => {
                            let arguments = self.parse_arguments()?;
                            Expr::Call {
                                callee: Box::new(object),
                                arguments,
                                optional: true,
                            }
                        }
                        TokenType::LeftBracket => {
                            self.advance();
                            let property = self.parse_sequence()?;
                            self.consume(TokenType::RightBracket, "Expected ']' after computed member")?;
                            Expr::Member {
                                object: Box::new(object),
                                property: Box::new(property),
                                computed: true,
                                optional: true,
                            }
                        }
                        _ => {
                            let name = self.parse_member_name()?;
                            Expr::Member {
                                object: Box::new(object),
                                property: Box::new(Expr::Identifier(name)),
                                computed: false,
                                optional: true,
                            }
                        }
                    };
                }
                TokenType::LeftBracket => {
                    self.advance();
                    let property = self.parse_sequence()?;
                    self.consume(TokenType::RightBracket, "Expected ']' after computed member")?;
                    object = Expr::Member {
                        object: Box::new(object),
                        property: Box::new(property),
                        computed: true,
                        optional: false,
                    };
                }
                TokenType::LeftParen if allow_calls => {
                    let arguments = self.parse_arguments()?;
                    object = Expr::Call {
                        callee: Box::new(object),
                        arguments,
                        optional: false,
                    };
                }
                TokenType::Template(_) | TokenType::TemplateHead(_) => {
                    let template = self.parse_template_literal()?;
                    object = Expr::Other {
                        kind: OtherKind::TaggedTemplate,
                        children: vec![object, template],
                    };
                }
                _ => break,
            }
        }

        Ok(object)
    }

    /// Property name after `.` or `?.`; keywords are allowed
    fn parse_member_name(&mut self) -> Result<String> {
        let name = match &self.peek().token_type {
            TokenType::Identifier(name) => name.clone(),
            other => match other.keyword_text() {
                Some(word) => word.to_string(),
                None => {
                    return Err(self.error_at_current(format!(
                        "Expected property name after '.', got {}",
                        other
                    )))
                }
            },
        };
        self.advance();
        Ok(name)
    }

    fn parse_new(&mut self) -> Result<Expr> {
        self.nested(|parser| {
            parser.consume(TokenType::New, "Expected 'new'")?;

            if parser.match_token(&TokenType::Dot) {
                return match &parser.peek().token_type {
                    TokenType::Identifier(name) if name == "target" => {
                        parser.advance();
                        Ok(Expr::Other {
                            kind: OtherKind::MetaProperty,
                            children: Vec::new(),
                        })
                    }
                    _ => Err(parser.error_at_current("Expected 'target' after 'new.'")),
                };
            }

            let callee = if parser.check(&TokenType::New) {
                parser.parse_new()?
            } else {
                parser.parse_primary()?
            };
            let callee = parser.parse_member_suffix(callee, false)?;

            let mut children = vec![callee];
            if parser.check(&TokenType::LeftParen) {
                children.extend(parser.parse_arguments()?);
            }

            Ok(Expr::Other {
                kind: OtherKind::New,
                children,
            })
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        self.consume(TokenType::LeftParen, "Expected '(' before arguments")?;

        let mut arguments = Vec::new();
        while !self.check(&TokenType::RightParen) {
            if self.match_token(&TokenType::Ellipsis) {
                let argument = self.parse_assignment()?;
                arguments.push(Expr::Other {
                    kind: OtherKind::Spread,
                    children: vec![argument],
                });
            } else {
                arguments.push(self.parse_assignment()?);
            }

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.consume(TokenType::RightParen, "Expected ')' after arguments")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match &self.peek().token_type {
            TokenType::Identifier(name) => {
                let name = name.clone();

                if name == "async" {
                    if let Some(function) = self.try_parse_async()? {
                        return Ok(function);
                    }
                }

                if self.peek_at(1).token_type == TokenType::Arrow && !self.peek_at(1).newline_before {
                    self.advance();
                    self.advance();
                    return self.parse_arrow_body(vec![Pattern::Identifier(name)], false);
                }

                self.advance();
                Ok(Expr::Identifier(name))
            }
            TokenType::Number(n) => {
                let value = *n;
                self.advance();
                Ok(Expr::Literal(Literal::Number(value)))
            }
            TokenType::BigInt(digits) => {
                let value = digits.clone();
                self.advance();
                Ok(Expr::Literal(Literal::BigInt(value)))
            }
            TokenType::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr::Literal(Literal::String(value)))
            }
            TokenType::RegExp { pattern, flags } => {
                let literal = Literal::RegExp {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                };
                self.advance();
                Ok(Expr::Literal(literal))
            }
            TokenType::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            TokenType::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            TokenType::Null => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenType::This => {
                self.advance();
                Ok(Expr::Other {
                    kind: OtherKind::This,
                    children: Vec::new(),
                })
            }
            TokenType::Super => {
                self.advance();
                Ok(Expr::Other {
                    kind: OtherKind::Super,
                    children: Vec::new(),
                })
            }
            TokenType::Template(_) | TokenType::TemplateHead(_) => self.parse_template_literal(),
            TokenType::LeftParen => self.parse_parenthesized(false),
            TokenType::LeftBracket => self.parse_array_literal(),
            TokenType::LeftBrace => self.parse_object_literal(),
            TokenType::Function => self.parse_function_expression(false),
            TokenType::Reserved(word) => {
                let message = format!("Unexpected keyword '{}'", word);
                Err(self.error_at_current(message))
            }
            other => {
                let message = format!("Unexpected {}", other);
                Err(self.error_at_current(message))
            }
        }
    }

    /// `async x => ...`, `async (...) => ...` and `async function`; returns
    /// `None` when `async` is just an identifier
    fn try_parse_async(&mut self) -> Result<Option<Expr>> {
        let next = self.peek_at(1);
        if next.newline_before {
            return Ok(None);
        }

        match &next.token_type {
            TokenType::Function => {
                self.advance();
                self.parse_function_expression(true).map(Some)
            }
            TokenType::Identifier(param) if self.peek_at(2).token_type == TokenType::Arrow => {
                let param = param.clone();
                self.advance();
                self.advance();
                self.advance();
                self.parse_arrow_body(vec![Pattern::Identifier(param)], true)
                    .map(Some)
            }
            TokenType::LeftParen if self.arrow_follows_paren(self.current + 1) => {
                self.advance();
                self.parse_parenthesized(true).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Parenthesized expression or the parameter list of an arrow function
    fn parse_parenthesized(&mut self, is_async: bool) -> Result<Expr> {
        if self.arrow_follows_paren(self.current) {
            let params = self.parse_parameters()?;
            self.consume(TokenType::Arrow, "Expected '=>' after parameters")?;
            return self.parse_arrow_body(params, is_async);
        }

        self.consume(TokenType::LeftParen, "Expected '('")?;
        let expr = self.parse_sequence()?;
        self.consume(TokenType::RightParen, "Expected ')' after expression")?;
        Ok(expr)
    }

    /// Whether the parenthesized group opening at `index` is followed by `=>`
    fn arrow_follows_paren(&self, index: usize) -> bool {
        if self.tokens.get(index).map(|t| &t.token_type) != Some(&TokenType::LeftParen) {
            return false;
        }

        let mut depth = 0usize;
        for (offset, token) in self.tokens[index..].iter().enumerate() {
            match token.token_type {
                TokenType::LeftParen | TokenType::LeftBracket | TokenType::LeftBrace => depth += 1,
                TokenType::RightParen | TokenType::RightBracket | TokenType::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self
                            .tokens
                            .get(index + offset + 1)
                            .map_or(false, |next| {
                                next.token_type == TokenType::Arrow && !next.newline_before
                            });
                    }
                }
                TokenType::Eof | TokenType::Invalid(_) => return false,
                _ => {}
            }
        }

        false
    }

    fn parse_arrow_body(&mut self, params: Vec<Pattern>, is_async: bool) -> Result<Expr> {
        let body = if self.check(&TokenType::LeftBrace) {
            self.skip_block()?;
            FunctionBody::Block
        } else {
            FunctionBody::Expression(Box::new(self.parse_assignment()?))
        };

        Ok(Expr::Function(Box::new(Function {
            name: None,
            params,
            body,
            is_arrow: true,
            is_async,
        })))
    }

    fn parse_function_expression(&mut self, is_async: bool) -> Result<Expr> {
        self.consume(TokenType::Function, "Expected 'function'")?;
        self.match_token(&TokenType::Star);

        let name = match &self.peek().token_type {
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };

        let params = self.parse_parameters()?;
        self.skip_block()?;

        Ok(Expr::Function(Box::new(Function {
            name,
            params,
            body: FunctionBody::Block,
            is_arrow: false,
            is_async,
        })))
    }

    /// Step over a `{ ... }` statement block without parsing it
    fn skip_block(&mut self) -> Result<()> {
        self.consume(TokenType::LeftBrace, "Expected '{' before function body")?;

        let mut depth = 1usize;
        while depth > 0 {
            match &self.peek().token_type {
                TokenType::LeftBrace => depth += 1,
                TokenType::RightBrace => depth -= 1,
                TokenType::Eof | TokenType::Invalid(_) => {
                    return Err(self.error_at_current("Unterminated function body"));
                }
                _ => {}
            }
            self.advance();
        }

        Ok(())
    }

    fn parse_parameters(&mut self) -> Result<Vec<Pattern>> {
        self.consume(TokenType::LeftParen, "Expected '(' before parameters")?;

        let mut params = Vec::new();
        while !self.check(&TokenType::RightParen) {
            if self.match_token(&TokenType::Ellipsis) {
                let target = self.parse_binding_target()?;
                params.push(Pattern::Rest(Box::new(target)));
                break;
            }

            params.push(self.parse_binding_element()?);

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.consume(TokenType::RightParen, "Expected ')' after parameters")?;
        Ok(params)
    }

    /// Binding target with an optional `= default`
    fn parse_binding_element(&mut self) -> Result<Pattern> {
        let target = self.parse_binding_target()?;

        if self.check_plain_assign() {
            self.advance();
            let default = self.parse_assignment()?;
            return Ok(Pattern::Default {
                target: Box::new(target),
                default: Box::new(default),
            });
        }

        Ok(target)
    }

    fn parse_binding_target(&mut self) -> Result<Pattern> {
        match &self.peek().token_type {
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(Pattern::Identifier(name))
            }
            TokenType::LeftBracket => self.nested(Self::parse_array_pattern),
            TokenType::LeftBrace => self.nested(Self::parse_object_pattern),
            other => {
                let message = format!("Unexpected {} in parameter list", other);
                Err(self.error_at_current(message))
            }
        }
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern> {
        self.consume(TokenType::LeftBracket, "Expected '['")?;

        let mut elements = Vec::new();
        loop {
            if self.match_token(&TokenType::RightBracket) {
                break;
            }
            if self.match_token(&TokenType::Comma) {
                elements.push(None);
                continue;
            }
            if self.match_token(&TokenType::Ellipsis) {
                let target = self.parse_binding_target()?;
                elements.push(Some(Pattern::Rest(Box::new(target))));
                self.consume(TokenType::RightBracket, "Expected ']' after rest element")?;
                break;
            }

            elements.push(Some(self.parse_binding_element()?));
            if !self.check(&TokenType::RightBracket) {
                self.consume(TokenType::Comma, "Expected ',' or ']' in array pattern")?;
            }
        }

        Ok(Pattern::Array(elements))
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern> {
        self.consume(TokenType::LeftBrace, "Expected '{'")?;

        let mut properties = Vec::new();
        while !self.check(&TokenType::RightBrace) {
            if self.match_token(&TokenType::Ellipsis) {
                properties.push(PatternProperty::Rest(self.parse_binding_target()?));
            } else {
                let (key, shorthand) = self.parse_property_key()?;
                let value = if self.match_token(&TokenType::Colon) {
                    self.parse_binding_element()?
                } else if let Some(name) = shorthand {
                    let target = Pattern::Identifier(name);
                    if self.check_plain_assign() {
                        self.advance();
                        let default = self.parse_assignment()?;
                        Pattern::Default {
                            target: Box::new(target),
                            default: Box::new(default),
                        }
                    } else {
                        target
                    }
                } else {
                    return Err(self.error_at_current("Expected ':' in object pattern"));
                };
                properties.push(PatternProperty::KeyValue { key, value });
            }

            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.consume(TokenType::RightBrace, "Expected '}' after object pattern")?;
        Ok(Pattern::Object(properties))
    }

    fn parse_array_literal(&mut self) -> Result<Expr> {
        self.consume(TokenType::LeftBracket, "Expected '['")?;

        let mut elements = Vec::new();
        loop {
            if self.match_token(&TokenType::RightBracket) {
                break;
            }
            if self.match_token(&TokenType::Comma) {
                elements.push(None);
                continue;
            }

            let element = if self.match_token(&TokenType::Ellipsis) {
                Expr::Other {
                    kind: OtherKind::Spread,
                    children: vec![self.parse_assignment()?],
                }
            } else {
                self.parse_assignment()?
            };
            elements.push(Some(element));

            if !self.check(&TokenType::RightBracket) {
                self.consume(TokenType::Comma, "Expected ',' or ']' in array literal")?;
            }
        }

        Ok(Expr::Array { elements })
    }

    fn parse_object_literal(&mut self) -> Result<Expr> {
        self.consume(TokenType::LeftBrace, "Expected '{'")?;

        let mut properties = Vec::new();
        while !self.check(&TokenType::RightBrace) {
            properties.push(self.parse_object_member()?);
            if !self.match_token(&TokenType::Comma) {
                break;
            }
        }

        self.consume(TokenType::RightBrace, "Expected '}' after object literal")?;
        Ok(Expr::Object { properties })
    }

    fn parse_object_member(&mut self) -> Result<ObjectProperty> {
        if self.match_token(&TokenType::Ellipsis) {
            return Ok(ObjectProperty::Spread(self.parse_assignment()?));
        }

        let mut kind = PropertyKind::Init;
        let mut is_async = false;
        if let TokenType::Identifier(word) = &self.peek().token_type {
            let modifier = match word.as_str() {
                "get" => Some(PropertyKind::Get),
                "set" => Some(PropertyKind::Set),
                "async" => Some(PropertyKind::Method),
                _ => None,
            };
            if let Some(modifier) = modifier {
                if self.property_name_follows() {
                    self.advance();
                    is_async = modifier == PropertyKind::Method;
                    kind = modifier;
                }
            }
        }
        let generator = self.match_token(&TokenType::Star);

        let (key, shorthand) = self.parse_property_key()?;

        if self.check(&TokenType::LeftParen) {
            let params = self.parse_parameters()?;
            self.skip_block()?;
            let name = match &key {
                PropertyKey::Static(name) => Some(name.clone()),
                PropertyKey::Computed(_) => None,
            };
            let kind = if kind == PropertyKind::Init {
                PropertyKind::Method
            } else {
                kind
            };
            return Ok(ObjectProperty::KeyValue {
                key,
                value: Expr::Function(Box::new(Function {
                    name,
                    params,
                    body: FunctionBody::Block,
                    is_arrow: false,
                    is_async,
                })),
                kind,
                shorthand: false,
            });
        }

        if kind != PropertyKind::Init || generator {
            return Err(self.error_at_current("Expected '(' after method name"));
        }

        if self.match_token(&TokenType::Colon) {
            let value = self.parse_assignment()?;
            return Ok(ObjectProperty::KeyValue {
                key,
                value,
                kind,
                shorthand: false,
            });
        }

        if let Some(name) = shorthand {
            let mut value = Expr::Identifier(name);
            // `{ a = 1 }` only makes sense as a destructuring target
            if self.check_plain_assign() {
                self.advance();
                let default = self.parse_assignment()?;
                value = Expr::Other {
                    kind: OtherKind::Assignment {
                        operator: "=".to_string(),
                    },
                    children: vec![value, default],
                };
            }
            return Ok(ObjectProperty::KeyValue {
                key,
                value,
                kind,
                shorthand: true,
            });
        }

        Err(self.error_at_current("Expected ':' after property name"))
    }

    /// Property key plus the shorthand binding name when the key is a plain identifier
    fn parse_property_key(&mut self) -> Result<(PropertyKey, Option<String>)> {
        let key = match &self.peek().token_type {
            TokenType::Identifier(name) => {
                let name = name.clone();
                self.advance();
                return Ok((PropertyKey::Static(name.clone()), Some(name)));
            }
            TokenType::String(s) => PropertyKey::Static(s.clone()),
            TokenType::Number(n) => PropertyKey::Static(n.to_string()),
            TokenType::BigInt(digits) => PropertyKey::Static(digits.clone()),
            TokenType::LeftBracket => {
                self.advance();
                let key = self.parse_assignment()?;
                self.consume(TokenType::RightBracket, "Expected ']' after computed key")?;
                return Ok((PropertyKey::Computed(Box::new(key)), None));
            }
            other => match other.keyword_text() {
                Some(word) => PropertyKey::Static(word.to_string()),
                None => {
                    let message = format!("Unexpected {} in property name", other);
                    return Err(self.error_at_current(message));
                }
            },
        };
        self.advance();
        Ok((key, None))
    }

    /// After `get`, `set` or `async`: is the next token another property name?
    fn property_name_follows(&self) -> bool {
        let next = &self.peek_at(1).token_type;
        matches!(
            next,
            TokenType::Identifier(_)
                | TokenType::String(_)
                | TokenType::Number(_)
                | TokenType::BigInt(_)
                | TokenType::LeftBracket
                | TokenType::Star
        ) || next.keyword_text().is_some()
    }

    /// Template literal from its head token through the matching tail
    fn parse_template_literal(&mut self) -> Result<Expr> {
        let mut quasis = Vec::new();
        let mut children = Vec::new();

        match &self.peek().token_type {
            TokenType::Template(cooked) => {
                quasis.push(cooked.clone());
                self.advance();
            }
            TokenType::TemplateHead(cooked) => {
                quasis.push(cooked.clone());
                self.advance();
                loop {
                    children.push(self.parse_sequence()?);
                    match &self.peek().token_type {
                        TokenType::TemplateMiddle(cooked) => {
                            quasis.push(cooked.clone());
                            self.advance();
                        }
                        TokenType::TemplateTail(cooked) => {
                            quasis.push(cooked.clone());
                            self.advance();
                            break;
                        }
                        _ => {
                            return Err(
                                self.error_at_current("Expected '}' after template substitution")
                            );
                        }
                    }
                }
            }
            other => {
                let message = format!("Expected template literal, got {}", other);
                return Err(self.error_at_current(message));
            }
        }

        Ok(Expr::Other {
            kind: OtherKind::TemplateLiteral { quasis },
            children,
        })
    }

    /// Run `parse` one nesting level deeper, failing past the depth limit
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(self.error_at_current("Expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn check_plain_assign(&self) -> bool {
        matches!(&self.peek().token_type, TokenType::Assign(op) if op == "=")
    }

    fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: &TokenType) -> bool {
        &self.peek().token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        let index = self.current;
        if !self.is_terminal() {
            self.current += 1;
        }
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn is_terminal(&self) -> bool {
        matches!(self.peek().token_type, TokenType::Eof | TokenType::Invalid(_))
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(format!("{}, got {}", message, self.peek().token_type)))
        }
    }

    /// Error at the current token; a lexing failure reports its own message
    fn error_at_current(&self, message: impl Into<String>) -> ScanError {
        let token = self.peek();
        match &token.token_type {
            TokenType::Invalid(lex_message) => {
                ScanError::parse(token.line, token.column, lex_message.clone())
            }
            _ => ScanError::parse(token.line, token.column, message),
        }
    }
}

fn infix_operator(token_type: &TokenType) -> Option<(u8, InfixOperator)> {
    use InfixOperator::{Binary, Logical};

    let entry = match token_type {
        TokenType::QuestionQuestion => (1, Logical(LogicalOperator::Nullish)),
        TokenType::PipePipe => (1, Logical(LogicalOperator::Or)),
        TokenType::AmpAmp => (2, Logical(LogicalOperator::And)),
        TokenType::Pipe => (3, Binary(BinaryOperator::BitOr)),
        TokenType::Caret => (4, Binary(BinaryOperator::BitXor)),
        TokenType::Ampersand => (5, Binary(BinaryOperator::BitAnd)),
        TokenType::EqualEqual => (6, Binary(BinaryOperator::Equal)),
        TokenType::NotEqual => (6, Binary(BinaryOperator::NotEqual)),
        TokenType::StrictEqual => (6, Binary(BinaryOperator::StrictEqual)),
        TokenType::StrictNotEqual => (6, Binary(BinaryOperator::StrictNotEqual)),
        TokenType::Less => (7, Binary(BinaryOperator::Less)),
        TokenType::LessEqual => (7, Binary(BinaryOperator::LessEqual)),
        TokenType::Greater => (7, Binary(BinaryOperator::Greater)),
        TokenType::GreaterEqual => (7, Binary(BinaryOperator::GreaterEqual)),
        TokenType::In => (7, Binary(BinaryOperator::In)),
        TokenType::Instanceof => (7, Binary(BinaryOperator::Instanceof)),
        TokenType::ShiftLeft => (8, Binary(BinaryOperator::ShiftLeft)),
        TokenType::ShiftRight => (8, Binary(BinaryOperator::ShiftRight)),
        TokenType::UnsignedShiftRight => (8, Binary(BinaryOperator::UnsignedShiftRight)),
        TokenType::Plus => (9, Binary(BinaryOperator::Add)),
        TokenType::Minus => (9, Binary(BinaryOperator::Subtract)),
        TokenType::Star => (10, Binary(BinaryOperator::Multiply)),
        TokenType::Slash => (10, Binary(BinaryOperator::Divide)),
        TokenType::Percent => (10, Binary(BinaryOperator::Remainder)),
        _ => return None,
    };

    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse(source: &str) -> Result<Expr> {
        let mut parser = Parser::new(Lexer::new(source).tokenize());
        parser.parse_expression()
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::identifier(name))
    }

    #[test]
    fn test_parse_call_and_binary() {
        let expr = parse("Number(price) * quantity").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                operator: BinaryOperator::Multiply,
                left: Box::new(Expr::Call {
                    callee: ident("Number"),
                    arguments: vec![Expr::identifier("price")],
                    optional: false,
                }),
                right: ident("quantity"),
            }
        );
    }

    #[test]
    fn test_operator_precedence() {
        let expr = parse("a + b * c").unwrap();
        match &expr {
            Expr::Binary {
                operator: BinaryOperator::Add,
                right,
                ..
            } => assert!(matches!(
                **right,
                Expr::Binary {
                    operator: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("Expected addition, got {:?}", other),
        }

        let expr = parse("a || b && c").unwrap();
        match &expr {
            Expr::Logical {
                operator: LogicalOperator::Or,
                right,
                ..
            } => assert!(matches!(
                **right,
                Expr::Logical {
                    operator: LogicalOperator::And,
                    ..
                }
            )),
            other => panic!("Expected logical or, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associative_subtraction() {
        let expr = parse("a - b - c").unwrap();
        match &expr {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(**left, Expr::Binary { .. }));
                assert_eq!(**right, Expr::identifier("c"));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let expr = parse("a ** b ** c").unwrap();
        match &expr {
            Expr::Binary {
                operator: BinaryOperator::Exponent,
                left,
                right,
            } => {
                assert_eq!(**left, Expr::identifier("a"));
                assert!(matches!(
                    **right,
                    Expr::Binary {
                        operator: BinaryOperator::Exponent,
                        ..
                    }
                ));
            }
            other => panic!("Expected exponent, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional() {
        let expr = parse("price > 0 ? price : 0").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));
    }

    #[test]
    fn test_member_chain() {
        let expr = parse("a.b[c]?.d(e)").unwrap();
        match &expr {
            Expr::Call {
                callee, arguments, ..
            } => {
                assert_eq!(*arguments, vec![Expr::identifier("e")]);
                match &**callee {
                    Expr::Member {
                        property,
                        computed: false,
                        optional: true,
                        ..
                    } => assert_eq!(**property, Expr::identifier("d")),
                    other => panic!("Expected optional member, got {:?}", other),
                }
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_member_names() {
        let expr = parse("config.default.new").unwrap();
        assert!(matches!(expr, Expr::Member { computed: false, .. }));
    }

    #[test]
    fn test_single_param_arrow() {
        let expr = parse("x => x + y").unwrap();
        match &expr {
            Expr::Function(function) => {
                assert!(function.is_arrow);
                assert_eq!(function.params, vec![Pattern::Identifier("x".to_string())]);
                assert!(matches!(function.body, FunctionBody::Expression(_)));
            }
            other => panic!("Expected arrow function, got {:?}", other),
        }
    }

    #[test]
    fn test_destructuring_arrow_params() {
        let expr = parse("(a, { b, c = d }, [e, , f], ...rest) => a").unwrap();
        match &expr {
            Expr::Function(function) => {
                let mut names = Vec::new();
                for param in &function.params {
                    param.bound_names(&mut names);
                }
                assert_eq!(names, vec!["a", "b", "c", "e", "f", "rest"]);
            }
            other => panic!("Expected arrow function, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_is_not_arrow() {
        let expr = parse("(a + b) * c").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary {
                operator: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_block_bodied_functions() {
        let expr = parse("() => { return x; }").unwrap();
        match &expr {
            Expr::Function(function) => assert_eq!(function.body, FunctionBody::Block),
            other => panic!("Expected arrow function, got {:?}", other),
        }

        let expr = parse("items.map(function square(n) { return n * n; })").unwrap();
        match &expr {
            Expr::Call { arguments, .. } => match &arguments[0] {
                Expr::Function(function) => {
                    assert_eq!(function.name.as_deref(), Some("square"));
                    assert!(!function.is_arrow);
                }
                other => panic!("Expected function expression, got {:?}", other),
            },
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_async_arrows() {
        let expr = parse("async (x) => x").unwrap();
        assert!(matches!(expr, Expr::Function(ref f) if f.is_async && f.is_arrow));

        let expr = parse("async x => x").unwrap();
        assert!(matches!(expr, Expr::Function(ref f) if f.is_async));

        // Plain call of a function named `async`
        let expr = parse("async(x)").unwrap();
        assert!(matches!(expr, Expr::Call { .. }));
    }

    #[test]
    fn test_object_literal_members() {
        let expr =
            parse("{ a: 1, [k]: v, b, 'c d': 2, 3: 4, ...rest, m() { return 1 }, get z() { return 2 } }")
                .unwrap();
        match &expr {
            Expr::Object { properties } => {
                assert_eq!(properties.len(), 8);
                assert!(matches!(
                    &properties[1],
                    ObjectProperty::KeyValue {
                        key: PropertyKey::Computed(_),
                        ..
                    }
                ));
                assert!(matches!(
                    &properties[2],
                    ObjectProperty::KeyValue { shorthand: true, .. }
                ));
                assert!(matches!(
                    &properties[4],
                    ObjectProperty::KeyValue { key: PropertyKey::Static(k), .. } if k == "3"
                ));
                assert!(matches!(&properties[5], ObjectProperty::Spread(_)));
                assert!(matches!(
                    &properties[6],
                    ObjectProperty::KeyValue {
                        kind: PropertyKind::Method,
                        ..
                    }
                ));
                assert!(matches!(
                    &properties[7],
                    ObjectProperty::KeyValue {
                        kind: PropertyKind::Get,
                        ..
                    }
                ));
            }
            other => panic!("Expected object literal, got {:?}", other),
        }
    }

    #[test]
    fn test_get_as_plain_key() {
        let expr = parse("{ get: 1, set }").unwrap();
        match &expr {
            Expr::Object { properties } => assert_eq!(properties.len(), 2),
            other => panic!("Expected object literal, got {:?}", other),
        }
    }

    #[test]
    fn test_array_holes_and_spread() {
        let expr = parse("[a, , ...b]").unwrap();
        match &expr {
            Expr::Array { elements } => {
                assert_eq!(elements.len(), 3);
                assert!(elements[1].is_none());
                assert!(matches!(
                    &elements[2],
                    Some(Expr::Other {
                        kind: OtherKind::Spread,
                        ..
                    })
                ));
            }
            other => panic!("Expected array literal, got {:?}", other),
        }
    }

    #[test]
    fn test_template_literal_substitutions() {
        let expr = parse("`${a}-${b.c}`").unwrap();
        match &expr {
            Expr::Other {
                kind: OtherKind::TemplateLiteral { quasis },
                children,
            } => {
                assert_eq!(*quasis, vec!["", "-", ""]);
                assert_eq!(children.len(), 2);
            }
            other => panic!("Expected template literal, got {:?}", other),
        }
    }

    #[test]
    fn test_new_and_sequence() {
        let expr = parse("new Date(ts).getFullYear(), other").unwrap();
        match &expr {
            Expr::Other {
                kind: OtherKind::Sequence,
                children,
            } => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], Expr::Call { .. }));
            }
            other => panic!("Expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_update_and_assignment() {
        let expr = parse("total += count++").unwrap();
        match &expr {
            Expr::Other {
                kind: OtherKind::Assignment { operator },
                children,
            } => {
                assert_eq!(operator, "+=");
                assert!(matches!(
                    &children[1],
                    Expr::Other {
                        kind: OtherKind::Update { prefix: false, .. },
                        ..
                    }
                ));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_regex_literal_primary() {
        let expr = parse("/\\d+/.test(code)").unwrap();
        assert!(matches!(expr, Expr::Call { .. }));
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        assert_eq!(parse("price }").unwrap(), Expr::identifier("price"));
        assert_eq!(parse("a b").unwrap(), Expr::identifier("a"));
        assert_eq!(parse("a b #").unwrap(), Expr::identifier("a"));
    }

    #[test]
    fn test_lex_error_right_after_expression_fails() {
        let err = parse("a #").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("a +").is_err());
        assert!(parse("(a").is_err());
        assert!(parse("return x").is_err());
        assert!(parse("() => { x").is_err());
        assert!(parse("{ a: }").is_err());
    }

    #[test]
    fn test_error_position() {
        match parse("a + )") {
            Err(ScanError::Parse { line, column, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 5);
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_complete_rejects_trailing_tokens() {
        let mut parser = Parser::new(Lexer::new("a b").tokenize());
        assert!(parser.parse_complete().is_err());
    }

    #[test]
    fn test_template_substitutions_parse_in_place() {
        let expr = parse("`${ `${a}` }${b}` + c").unwrap();
        match &expr {
            Expr::Binary { left, .. } => match &**left {
                Expr::Other {
                    kind: OtherKind::TemplateLiteral { quasis },
                    children,
                } => {
                    assert_eq!(*quasis, vec!["", "", ""]);
                    assert!(matches!(
                        children[0],
                        Expr::Other {
                            kind: OtherKind::TemplateLiteral { .. },
                            ..
                        }
                    ));
                    assert_eq!(children[1], Expr::identifier("b"));
                }
                other => panic!("Expected template literal, got {:?}", other),
            },
            other => panic!("Expected binary, got {:?}", other),
        }

        let expr = parse("tag`a${x}b`").unwrap();
        assert!(matches!(
            expr,
            Expr::Other {
                kind: OtherKind::TaggedTemplate,
                ..
            }
        ));

        assert!(parse("`${a b}`").is_err());
        assert!(parse("`${a").is_err());
    }

    #[test]
    fn test_keyword_member_followed_by_division() {
        let expr = parse("row.new / total").unwrap();
        match &expr {
            Expr::Binary {
                operator: BinaryOperator::Divide,
                left,
                right,
            } => {
                assert!(matches!(**left, Expr::Member { computed: false, .. }));
                assert_eq!(**right, Expr::identifier("total"));
            }
            other => panic!("Expected division, got {:?}", other),
        }
    }

    fn wrapped(open: &str, inner: &str, close: &str, times: usize) -> String {
        format!("{}{}{}", open.repeat(times), inner, close.repeat(times))
    }

    fn assert_too_deep(source: &str) {
        match parse(source) {
            Err(err) => assert!(err.to_string().contains("nested too deeply"), "{}", err),
            Ok(expr) => panic!("Expected nesting error, got {:?}", expr.node_kind()),
        }
    }

    #[test]
    fn test_one_level_per_nesting_construct() {
        // The expression itself takes the first level
        let allowed = MAX_EXPRESSION_DEPTH - 1;
        let cases = [
            ("(", ")"),
            ("[", "]"),
            ("f(", ")"),
            ("{ k: ", " }"),
            ("c ? ", " : d"),
            ("`${", "}`"),
            ("!", ""),
            ("a ** ", ""),
        ];

        for (open, close) in cases {
            let source = wrapped(open, "x", close, allowed);
            assert!(parse(&source).is_ok(), "{} nested {} times", open, allowed);
            assert_too_deep(&wrapped(open, "x", close, allowed + 1));
        }

        let arrows = format!("{}x", "p => ".repeat(allowed));
        assert!(parse(&arrows).is_ok());
        assert_too_deep(&format!("{}x", "p => ".repeat(allowed + 1)));
    }

    #[test]
    fn test_flat_chains_are_not_nesting() {
        let sum = (0..20_000).map(|i| format!("x{}", i)).collect::<Vec<_>>().join(" + ");
        assert!(parse(&sum).is_ok());

        let path = format!("root{}", ".field".repeat(20_000));
        assert!(parse(&path).is_ok());

        let calls = format!("f{}", "(a)[b]".repeat(10_000));
        assert!(parse(&calls).is_ok());
    }

    #[test]
    fn test_hostile_nesting_is_an_error() {
        assert_too_deep(&wrapped("`${", "a", "}`", 1000));
        assert_too_deep(&wrapped("(", "a", ")", 100_000));
        assert_too_deep(&format!("{}a", "-".repeat(100_000)));
        assert_too_deep(&format!("({}) => 1", wrapped("[", "a", "]", 1000)));
    }
}
