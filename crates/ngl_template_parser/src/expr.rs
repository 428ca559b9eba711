//! Template expression AST.
//!
//! Expressions in bindings, interpolations and block parameters are parsed
//! into [`TemplateExpr`] trees. Names with no explicit receiver are reads
//! from the [`TemplateExprKind::ImplicitReceiver`], which stands for the
//! component instance or, when shadowed, a template-local variable.

use ngl_source::Span;
use serde::{Deserialize, Serialize};

/// An expression with its span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateExpr {
    /// The expression kind.
    pub kind: TemplateExprKind,
    /// Source span.
    pub span: Span,
}

/// Template expression kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TemplateExprKind {
    /// The implicit component context a bare name is read from.
    ImplicitReceiver,
    /// Explicit `this`.
    ThisReceiver,
    /// `receiver.name`, or a bare `name` on the implicit receiver.
    PropertyRead {
        /// The object being read from.
        receiver: Box<TemplateExpr>,
        /// The property name.
        name: String,
        /// Span of the name alone.
        name_span: Span,
    },
    /// `receiver?.name`.
    SafePropertyRead {
        /// The object being read from.
        receiver: Box<TemplateExpr>,
        /// The property name.
        name: String,
        /// Span of the name alone.
        name_span: Span,
    },
    /// `receiver[key]`.
    KeyedRead {
        /// The object being read from.
        receiver: Box<TemplateExpr>,
        /// The key.
        key: Box<TemplateExpr>,
    },
    /// `receiver?.[key]`.
    SafeKeyedRead {
        /// The object being read from.
        receiver: Box<TemplateExpr>,
        /// The key.
        key: Box<TemplateExpr>,
    },
    /// `receiver.name = value` (event bindings only).
    PropertyWrite {
        /// The object being written to.
        receiver: Box<TemplateExpr>,
        /// The property name.
        name: String,
        /// Span of the name alone.
        name_span: Span,
        /// The assigned value.
        value: Box<TemplateExpr>,
    },
    /// `receiver[key] = value` (event bindings only).
    KeyedWrite {
        /// The object being written to.
        receiver: Box<TemplateExpr>,
        /// The key.
        key: Box<TemplateExpr>,
        /// The assigned value.
        value: Box<TemplateExpr>,
    },
    /// `receiver(args)`; a method call when `receiver` is a property read.
    Call {
        /// The called expression.
        receiver: Box<TemplateExpr>,
        /// The arguments.
        args: Vec<TemplateExpr>,
    },
    /// `receiver?.(args)`.
    SafeCall {
        /// The called expression.
        receiver: Box<TemplateExpr>,
        /// The arguments.
        args: Vec<TemplateExpr>,
    },
    /// A binary or logical operation.
    Binary {
        /// The operator.
        op: TemplateBinaryOp,
        /// Left operand.
        left: Box<TemplateExpr>,
        /// Right operand.
        right: Box<TemplateExpr>,
    },
    /// Unary `-x` / `+x`.
    Unary {
        /// `-` or `+`.
        op: char,
        /// The operand.
        expr: Box<TemplateExpr>,
    },
    /// `!x`.
    PrefixNot(Box<TemplateExpr>),
    /// `typeof x`.
    TypeofExpr(Box<TemplateExpr>),
    /// `void x`.
    VoidExpr(Box<TemplateExpr>),
    /// `x!`.
    NonNullAssert(Box<TemplateExpr>),
    /// `condition ? true_exp : false_exp`.
    Conditional {
        /// The condition.
        condition: Box<TemplateExpr>,
        /// Value when true.
        true_exp: Box<TemplateExpr>,
        /// Value when false.
        false_exp: Box<TemplateExpr>,
    },
    /// `exp | name:arg1:arg2`.
    BindingPipe {
        /// The piped value.
        exp: Box<TemplateExpr>,
        /// The pipe name.
        name: String,
        /// Span of the pipe name.
        name_span: Span,
        /// Extra pipe arguments.
        args: Vec<TemplateExpr>,
    },
    /// A string, number, boolean, `null` or `undefined` literal.
    LiteralPrimitive(LiteralValue),
    /// `[a, b]`.
    LiteralArray(Vec<TemplateExpr>),
    /// `{ key: value }`.
    LiteralMap(Vec<LiteralMapEntry>),
    /// `` `a ${b}` ``.
    TemplateLiteral {
        /// The literal chunks.
        quasis: Vec<String>,
        /// The substitutions.
        exprs: Vec<TemplateExpr>,
    },
    /// `(expr)`.
    Parenthesized(Box<TemplateExpr>),
    /// `a; b` in event bindings.
    Chain(Vec<TemplateExpr>),
    /// An empty binding such as `[x]=""`.
    Empty,
}

/// A literal primitive value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// A string literal (cooked).
    Str(String),
    /// A number literal (raw text).
    Number(String),
    /// `true` / `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
}

/// One `key: value` entry of a literal map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteralMapEntry {
    /// The key.
    pub key: String,
    /// Whether the key was written as a string.
    pub quoted: bool,
    /// The value (a read of `key` for shorthand entries).
    pub value: TemplateExpr,
}

/// Binary operators of the template expression language.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateBinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `**`
    Exp,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `in`
    In,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Nullish,
}

impl TemplateBinaryOp {
    /// Maps operator text to an operator.
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "**" => Self::Exp,
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "===" => Self::StrictEq,
            "!==" => Self::StrictNotEq,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::LtEq,
            ">=" => Self::GtEq,
            "in" => Self::In,
            "&&" => Self::And,
            "||" => Self::Or,
            "??" => Self::Nullish,
            _ => return None,
        })
    }

    /// Binding power as (left, right).
    pub(crate) fn binding_power(self) -> (u8, u8) {
        match self {
            Self::Or => (1, 2),
            Self::And => (3, 4),
            Self::Nullish => (5, 6),
            Self::Eq | Self::NotEq | Self::StrictEq | Self::StrictNotEq => (7, 8),
            Self::Lt | Self::Gt | Self::LtEq | Self::GtEq | Self::In => (9, 10),
            Self::Add | Self::Sub => (11, 12),
            Self::Mul | Self::Div | Self::Rem => (13, 14),
            Self::Exp => (16, 15),
        }
    }
}

impl TemplateExpr {
    /// Creates an expression node.
    pub fn new(kind: TemplateExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns `true` for the implicit receiver and explicit `this`.
    pub fn is_component_receiver(&self) -> bool {
        matches!(
            self.kind,
            TemplateExprKind::ImplicitReceiver | TemplateExprKind::ThisReceiver
        )
    }

    /// Returns the literal value if this is a primitive literal.
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match &self.kind {
            TemplateExprKind::LiteralPrimitive(value) => Some(value),
            _ => None,
        }
    }

    /// Calls `f` on each direct sub-expression.
    pub fn for_each_child(&self, mut f: impl FnMut(&TemplateExpr)) {
        match &self.kind {
            TemplateExprKind::ImplicitReceiver
            | TemplateExprKind::ThisReceiver
            | TemplateExprKind::LiteralPrimitive(_)
            | TemplateExprKind::Empty => {}
            TemplateExprKind::PropertyRead { receiver, .. }
            | TemplateExprKind::SafePropertyRead { receiver, .. } => f(receiver),
            TemplateExprKind::KeyedRead { receiver, key }
            | TemplateExprKind::SafeKeyedRead { receiver, key } => {
                f(receiver);
                f(key);
            }
            TemplateExprKind::PropertyWrite { receiver, value, .. } => {
                f(receiver);
                f(value);
            }
            TemplateExprKind::KeyedWrite {
                receiver,
                key,
                value,
            } => {
                f(receiver);
                f(key);
                f(value);
            }
            TemplateExprKind::Call { receiver, args }
            | TemplateExprKind::SafeCall { receiver, args } => {
                f(receiver);
                args.iter().for_each(f);
            }
            TemplateExprKind::Binary { left, right, .. } => {
                f(left);
                f(right);
            }
            TemplateExprKind::Unary { expr, .. }
            | TemplateExprKind::PrefixNot(expr)
            | TemplateExprKind::TypeofExpr(expr)
            | TemplateExprKind::VoidExpr(expr)
            | TemplateExprKind::NonNullAssert(expr)
            | TemplateExprKind::Parenthesized(expr) => f(expr),
            TemplateExprKind::Conditional {
                condition,
                true_exp,
                false_exp,
            } => {
                f(condition);
                f(true_exp);
                f(false_exp);
            }
            TemplateExprKind::BindingPipe { exp, args, .. } => {
                f(exp);
                args.iter().for_each(f);
            }
            TemplateExprKind::LiteralArray(items) | TemplateExprKind::Chain(items) => {
                items.iter().for_each(f)
            }
            TemplateExprKind::LiteralMap(entries) => entries.iter().for_each(|e| f(&e.value)),
            TemplateExprKind::TemplateLiteral { exprs, .. } => exprs.iter().for_each(f),
        }
    }
}
