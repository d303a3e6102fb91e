//! Abstract syntax tree for template expressions

use std::fmt;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    Literal(Literal),

    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `&&`, `||` and `??`
    Logical {
        operator: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary {
        operator: UnaryOperator,
        argument: Box<Expr>,
    },

    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    /// `object.property` or `object[property]`; the property of a
    /// non-computed access is an `Identifier` holding the field label
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        optional: bool,
    },

    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },

    /// Array literal; holes are `None`
    Array {
        elements: Vec<Option<Expr>>,
    },

    Object {
        properties: Vec<ObjectProperty>,
    },

    Function(Box<Function>),

    /// Every production without a dedicated variant
    Other {
        kind: OtherKind,
        children: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    BigInt(String),
    String(String),
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    In,
    Instanceof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    BitNot,
    Plus,
    Minus,
    Typeof,
    Void,
    Delete,
}

/// Productions routed through [`Expr::Other`]
#[derive(Debug, Clone, PartialEq)]
pub enum OtherKind {
    /// `a, b, c`
    Sequence,
    /// children: target, value
    Assignment { operator: String },
    Update { operator: String, prefix: bool },
    /// `...argument` in array literals and call arguments
    Spread,
    /// children: callee, then the arguments
    New,
    /// children: one per substitution
    TemplateLiteral { quasis: Vec<String> },
    /// children: tag, template
    TaggedTemplate,
    This,
    Super,
    /// `new.target`
    MetaProperty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    KeyValue {
        key: PropertyKey,
        value: Expr,
        kind: PropertyKind,
        shorthand: bool,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier, string or numeric key written literally
    Static(String),
    /// `[expression]`
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Method,
    Get,
    Set,
}

/// Function literal: an arrow or a `function` expression
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Pattern>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Expression(Box<Expr>),
    /// Statement block; skipped by the parser and never analyzed
    Block,
}

/// Binding pattern in a parameter list
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Identifier(String),
    Object(Vec<PatternProperty>),
    Array(Vec<Option<Pattern>>),
    Rest(Box<Pattern>),
    Default {
        target: Box<Pattern>,
        default: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternProperty {
    KeyValue { key: PropertyKey, value: Pattern },
    Rest(Pattern),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    /// Short node-kind label for diagnostics
    pub fn node_kind(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "Identifier",
            Expr::Literal(_) => "Literal",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Logical { .. } => "LogicalExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Conditional { .. } => "ConditionalExpression",
            Expr::Member { .. } => "MemberExpression",
            Expr::Call { .. } => "CallExpression",
            Expr::Array { .. } => "ArrayExpression",
            Expr::Object { .. } => "ObjectExpression",
            Expr::Function(function) if function.is_arrow => "ArrowFunctionExpression",
            Expr::Function(_) => "FunctionExpression",
            Expr::Other { kind, .. } => kind.node_kind(),
        }
    }
}

impl Drop for Expr {
    // Chains like `a + b + …` and `a.b.…` build deep left spines; children are
    // moved onto a heap stack so dropping a tree never recurses along them
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.detach_children(&mut pending);
        }
    }
}

impl Expr {
    /// Move every direct sub-expression into `out`, leaving leaves in place
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Expr::Identifier(_) | Expr::Literal(_) | Expr::Function(_) => {}
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                out.push(take_boxed(left));
                out.push(take_boxed(right));
            }
            Expr::Unary { argument, .. } => out.push(take_boxed(argument)),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                out.push(take_boxed(test));
                out.push(take_boxed(consequent));
                out.push(take_boxed(alternate));
            }
            Expr::Member {
                object, property, ..
            } => {
                out.push(take_boxed(object));
                out.push(take_boxed(property));
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                out.push(take_boxed(callee));
                out.append(arguments);
            }
            Expr::Array { elements } => out.extend(elements.drain(..).flatten()),
            Expr::Object { properties } => {
                for property in properties.drain(..) {
                    match property {
                        ObjectProperty::KeyValue { key, value, .. } => {
                            if let PropertyKey::Computed(key) = key {
                                out.push(*key);
                            }
                            out.push(value);
                        }
                        ObjectProperty::Spread(argument) => out.push(argument),
                    }
                }
            }
            Expr::Other { children, .. } => out.append(children),
        }
    }
}

fn take_boxed(slot: &mut Box<Expr>) -> Expr {
    std::mem::replace(slot.as_mut(), Expr::Literal(Literal::Null))
}

impl OtherKind {
    pub fn node_kind(&self) -> &'static str {
        match self {
            OtherKind::Sequence => "SequenceExpression",
            OtherKind::Assignment { .. } => "AssignmentExpression",
            OtherKind::Update { .. } => "UpdateExpression",
            OtherKind::Spread => "SpreadElement",
            OtherKind::New => "NewExpression",
            OtherKind::TemplateLiteral { .. } => "TemplateLiteral",
            OtherKind::TaggedTemplate => "TaggedTemplateExpression",
            OtherKind::This => "ThisExpression",
            OtherKind::Super => "Super",
            OtherKind::MetaProperty => "MetaProperty",
        }
    }
}

impl Pattern {
    /// Every name this pattern binds, in source order
    pub fn bound_names(&self, names: &mut Vec<String>) {
        match self {
            Pattern::Identifier(name) => names.push(name.clone()),
            Pattern::Object(properties) => {
                for property in properties {
                    match property {
                        PatternProperty::KeyValue { value, .. } => value.bound_names(names),
                        PatternProperty::Rest(rest) => rest.bound_names(names),
                    }
                }
            }
            Pattern::Array(elements) => {
                for element in elements.iter().flatten() {
                    element.bound_names(names);
                }
            }
            Pattern::Rest(inner) => inner.bound_names(names),
            Pattern::Default { target, .. } => target.bound_names(names),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::In => "in",
            BinaryOperator::Instanceof => "instanceof",
        };
        write!(f, "{}", text)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "&&"),
            LogicalOperator::Or => write!(f, "||"),
            LogicalOperator::Nullish => write!(f, "??"),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "!"),
            UnaryOperator::BitNot => write!(f, "~"),
            UnaryOperator::Plus => write!(f, "+"),
            UnaryOperator::Minus => write!(f, "-"),
            UnaryOperator::Typeof => write!(f, "typeof"),
            UnaryOperator::Void => write!(f, "void"),
            UnaryOperator::Delete => write!(f, "delete"),
        }
    }
}
