//! AST node types for the TypeScript parser.
//!
//! Only the parts of the language the lint rules look at are modelled in
//! detail: imports, classes with decorators and members, statements and
//! expressions. Type annotations are kept as opaque [`Span`]s and interface,
//! type alias, enum and ambient declarations become [`Item::Skipped`].

use ngl_source::Span;
use serde::{Deserialize, Serialize};

/// An identifier with its source span.
///
/// Private names keep their leading `#`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// The identifier text.
    pub name: String,
    /// The source span of the identifier.
    pub span: Span,
}

impl Ident {
    /// Returns the name without a leading `#`.
    pub fn bare_name(&self) -> &str {
        self.name.strip_prefix('#').unwrap_or(&self.name)
    }

    /// Returns `true` for `#name` identifiers.
    pub fn is_private_name(&self) -> bool {
        self.name.starts_with('#')
    }
}

/// A parsed source file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Program {
    /// Top-level items in source order.
    pub items: Vec<Item>,
    /// Span of the whole file.
    pub span: Span,
}

impl Program {
    /// Iterates over every class declaration at the top level.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            _ => None,
        })
    }

    /// Iterates over every import declaration.
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Import(import) => Some(import),
            _ => None,
        })
    }

    /// Returns the first import of the given module specifier.
    pub fn import_from(&self, module: &str) -> Option<&ImportDecl> {
        self.imports().find(|i| i.source == module && !i.type_only)
    }
}

/// A top-level item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Item {
    /// `import ... from '...'`.
    Import(ImportDecl),
    /// A class declaration, possibly exported.
    Class(ClassDecl),
    /// Any other statement.
    Stmt(Stmt),
    /// Type-only or ambient declarations and re-exports, kept as a span.
    Skipped(Span),
}

/// An import declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportDecl {
    /// `import type { ... }`.
    pub type_only: bool,
    /// The default import binding.
    pub default: Option<Ident>,
    /// The `* as ns` binding.
    pub namespace: Option<Ident>,
    /// Named specifiers inside `{ ... }`.
    pub named: Vec<ImportSpecifier>,
    /// Span of the `{ ... }` group, if present.
    pub named_span: Option<Span>,
    /// The module specifier, unquoted.
    pub source: String,
    /// Span of the quoted module specifier.
    pub source_span: Span,
    /// Span of the whole declaration.
    pub span: Span,
}

impl ImportDecl {
    /// Returns `true` if `name` is imported under its own name.
    pub fn imports_name(&self, name: &str) -> bool {
        self.named.iter().any(|s| s.imported.name == name)
    }
}

/// One `imported as local` specifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// The exported name.
    pub imported: Ident,
    /// The local binding (same as `imported` without `as`).
    pub local: Ident,
    /// Span of the full specifier.
    pub span: Span,
}

/// A decorator such as `@Component({...})` or `@Input()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Decorator {
    /// The decorator expression after `@`.
    pub expr: Expr,
    /// Span including the `@`.
    pub span: Span,
}

impl Decorator {
    /// The name being applied: `Component` for `@Component({...})`,
    /// `Input` for `@core.Input()`.
    pub fn name(&self) -> Option<&str> {
        let callee = match &self.expr.kind {
            ExprKind::Call { callee, .. } => callee,
            _ => &self.expr,
        };
        match &callee.kind {
            ExprKind::Ident(id) => Some(&id.name),
            ExprKind::Member { property, .. } => Some(&property.name),
            _ => None,
        }
    }

    /// The call arguments, when the decorator is invoked.
    pub fn args(&self) -> &[Expr] {
        match &self.expr.kind {
            ExprKind::Call { args, .. } => args,
            _ => &[],
        }
    }
}

/// A class member or declaration modifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ModifierKind {
    /// `public`
    Public,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// `static`
    Static,
    /// `readonly`
    Readonly,
    /// `abstract`
    Abstract,
    /// `override`
    Override,
    /// `declare`
    Declare,
    /// `accessor`
    Accessor,
    /// `async`
    Async,
}

impl ModifierKind {
    /// Looks up a modifier keyword.
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "public" => Self::Public,
            "private" => Self::Private,
            "protected" => Self::Protected,
            "static" => Self::Static,
            "readonly" => Self::Readonly,
            "abstract" => Self::Abstract,
            "override" => Self::Override,
            "declare" => Self::Declare,
            "accessor" => Self::Accessor,
            "async" => Self::Async,
            _ => return None,
        })
    }
}

/// A modifier keyword with its span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Which modifier.
    pub kind: ModifierKind,
    /// Where it is written.
    pub span: Span,
}

/// Helpers over a modifier list.
pub trait ModifierList {
    /// Returns `true` if the list contains `kind`.
    fn has(&self, kind: ModifierKind) -> bool;
    /// Returns the span of `kind`, if present.
    fn span_of(&self, kind: ModifierKind) -> Option<Span>;
}

impl ModifierList for [Modifier] {
    fn has(&self, kind: ModifierKind) -> bool {
        self.iter().any(|m| m.kind == kind)
    }

    fn span_of(&self, kind: ModifierKind) -> Option<Span> {
        self.iter().find(|m| m.kind == kind).map(|m| m.span)
    }
}

/// A class declaration or class expression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Decorators applied to the class.
    pub decorators: Vec<Decorator>,
    /// `export` / `export default`.
    pub exported: bool,
    /// `abstract class`.
    pub is_abstract: bool,
    /// The class name (absent for anonymous class expressions).
    pub name: Option<Ident>,
    /// The `extends` expression.
    pub extends: Option<Expr>,
    /// Names listed after `implements`.
    pub implements: Vec<Ident>,
    /// Byte offset just past the last token of the class header (name, type
    /// parameters, heritage clauses), where a new clause can be inserted.
    pub header_end: u32,
    /// Class members in source order.
    pub members: Vec<ClassMember>,
    /// Span of the `{ ... }` body.
    pub body_span: Span,
    /// Span from the first decorator or `class` keyword to the closing brace.
    pub span: Span,
}

impl ClassDecl {
    /// Returns the decorator with the given name.
    pub fn decorator(&self, name: &str) -> Option<&Decorator> {
        self.decorators.iter().find(|d| d.name() == Some(name))
    }

    /// Returns the constructor, if declared.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Constructor(ctor) => Some(ctor),
            _ => None,
        })
    }

    /// Iterates over property declarations.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Iterates over methods and accessors.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(m) => Some(m),
            _ => None,
        })
    }
}

/// A member of a class body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ClassMember {
    /// A field declaration.
    Property(PropertyDecl),
    /// A method, getter or setter.
    Method(MethodDecl),
    /// The constructor.
    Constructor(Constructor),
    /// `static { ... }`.
    StaticBlock(Block),
    /// Index signatures and stray semicolons.
    Other(Span),
}

/// The key of an object or class member.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PropKey {
    /// `name`
    Ident(Ident),
    /// `#name`
    Private(Ident),
    /// `'name'`
    Str {
        /// The cooked string value.
        value: String,
        /// Span of the quoted literal.
        span: Span,
    },
    /// `0`
    Num {
        /// The literal text.
        raw: String,
        /// Span of the literal.
        span: Span,
    },
    /// `[expr]`
    Computed(Box<Expr>, Span),
}

impl PropKey {
    /// The static name of the key without a leading `#`, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(id) | PropKey::Private(id) => Some(id.bare_name()),
            PropKey::Str { value, .. } => Some(value),
            PropKey::Num { raw, .. } => Some(raw),
            PropKey::Computed(..) => None,
        }
    }

    /// The static name of the key as written, keeping a leading `#`.
    ///
    /// `#count` and `count` are different members of one class.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(id) | PropKey::Private(id) => Some(&id.name),
            _ => self.name(),
        }
    }

    /// Span of the key as written.
    pub fn span(&self) -> Span {
        match self {
            PropKey::Ident(id) | PropKey::Private(id) => id.span,
            PropKey::Str { span, .. } | PropKey::Num { span, .. } | PropKey::Computed(_, span) => {
                *span
            }
        }
    }

    /// Returns `true` for `#name` keys.
    pub fn is_private_name(&self) -> bool {
        matches!(self, PropKey::Private(_))
    }
}

/// A class field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyDecl {
    /// Decorators such as `@Input()`.
    pub decorators: Vec<Decorator>,
    /// Modifiers before the key.
    pub modifiers: Vec<Modifier>,
    /// The field name.
    pub key: PropKey,
    /// `name?:`
    pub optional: bool,
    /// `name!:`
    pub definite: bool,
    /// The type annotation text span.
    pub type_ann: Option<Span>,
    /// The initializer.
    pub value: Option<Expr>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// The flavour of a method-like member.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MethodKind {
    /// A plain method.
    Method,
    /// `get name()`.
    Getter,
    /// `set name(v)`.
    Setter,
}

/// A method or accessor in a class body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Decorators such as `@HostListener(...)`.
    pub decorators: Vec<Decorator>,
    /// Modifiers before the key.
    pub modifiers: Vec<Modifier>,
    /// Method, getter or setter.
    pub kind: MethodKind,
    /// The method name.
    pub key: PropKey,
    /// Parameters and body.
    pub function: Function,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A class constructor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constructor {
    /// Modifiers before `constructor`.
    pub modifiers: Vec<Modifier>,
    /// Parameters, including parameter properties.
    pub params: Vec<Param>,
    /// The body (absent for overload signatures).
    pub body: Option<Block>,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A function, method or arrow function parameter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Param {
    /// Parameter decorators (`@Inject(TOKEN)`, `@Optional()`).
    pub decorators: Vec<Decorator>,
    /// Modifiers turning a constructor parameter into a property.
    pub modifiers: Vec<Modifier>,
    /// `...rest`.
    pub rest: bool,
    /// The binding.
    pub pattern: Pattern,
    /// `name?`.
    pub optional: bool,
    /// Span of the type annotation text.
    pub type_ann: Option<Span>,
    /// Default value.
    pub default: Option<Expr>,
    /// Span of the whole parameter, decorators included.
    pub span: Span,
}

/// A binding target in parameters and variable declarations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Pattern {
    /// A plain name.
    Ident(Ident),
    /// `{ a, b: c }` or `[a, b]`, with every bound name collected.
    Destructure {
        /// Names introduced by the pattern.
        names: Vec<Ident>,
        /// Span of the pattern.
        span: Span,
    },
}

impl Pattern {
    /// Span of the pattern.
    pub fn span(&self) -> Span {
        match self {
            Pattern::Ident(id) => id.span,
            Pattern::Destructure { span, .. } => *span,
        }
    }

    /// Returns the name for a plain binding.
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Pattern::Ident(id) => Some(id),
            Pattern::Destructure { .. } => None,
        }
    }
}

/// Parameters and body of a function-like construct.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Function {
    /// The name of a function declaration or named function expression.
    pub name: Option<Ident>,
    /// Parameters.
    pub params: Vec<Param>,
    /// The body; absent for overloads and abstract methods.
    pub body: Option<FunctionBody>,
    /// `=>` functions keep the enclosing `this`.
    pub is_arrow: bool,
    /// `async`.
    pub is_async: bool,
    /// `function*`.
    pub is_generator: bool,
    /// Span of the return type annotation.
    pub return_type: Option<Span>,
    /// Span of the whole function.
    pub span: Span,
}

/// A function body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FunctionBody {
    /// `{ ... }`
    Block(Block),
    /// The expression body of an arrow function.
    Expr(Box<Expr>),
}

/// A `{ ... }` statement list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Statements in order.
    pub stmts: Vec<Stmt>,
    /// Span including the braces.
    pub span: Span,
}

/// A statement with its span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stmt {
    /// The statement kind.
    pub kind: StmtKind,
    /// Source span.
    pub span: Span,
}

/// `var`, `let` or `const`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VarKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

/// A variable declaration list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VarDecl {
    /// The declaration keyword.
    pub kind: VarKind,
    /// The declarators.
    pub declarators: Vec<Declarator>,
    /// Span of the declaration.
    pub span: Span,
}

/// One `pattern = init` declarator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Declarator {
    /// The binding.
    pub pattern: Pattern,
    /// Span of the type annotation text.
    pub type_ann: Option<Span>,
    /// The initializer.
    pub init: Option<Expr>,
    /// Span of the declarator.
    pub span: Span,
}

/// The head of a `for...in` / `for...of` loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ForHead {
    /// `for (const x of ...)`
    Var(VarDecl),
    /// `for (this.x of ...)`
    Expr(Expr),
}

/// The initializer of a classic `for` loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ForInit {
    /// `let i = 0`
    Var(VarDecl),
    /// `i = 0`
    Expr(Expr),
}

/// A `case`/`default` clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitchCase {
    /// The case expression; `None` for `default`.
    pub test: Option<Expr>,
    /// Statements of the clause.
    pub body: Vec<Stmt>,
    /// Span of the clause.
    pub span: Span,
}

/// A `catch` clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatchClause {
    /// The bound error, if any.
    pub param: Option<Pattern>,
    /// The handler body.
    pub body: Block,
}

/// Statement kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StmtKind {
    /// An expression statement.
    Expr(Expr),
    /// A variable declaration.
    Var(VarDecl),
    /// `return expr?`.
    Return(Option<Expr>),
    /// `if (test) consequent else alternate`.
    If {
        /// The condition.
        test: Expr,
        /// The then-branch.
        consequent: Box<Stmt>,
        /// The else-branch.
        alternate: Option<Box<Stmt>>,
    },
    /// A nested block.
    Block(Block),
    /// `for (init; test; update) body`.
    For {
        /// Loop initializer.
        init: Option<ForInit>,
        /// Loop condition.
        test: Option<Expr>,
        /// Step expression.
        update: Option<Expr>,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `for (left of right)` / `for (left in right)`.
    ForOf {
        /// Loop binding.
        left: ForHead,
        /// Iterated expression.
        right: Expr,
        /// `true` for `in`, `false` for `of`.
        is_in: bool,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `while (test) body`.
    While {
        /// Loop condition.
        test: Expr,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `do body while (test)`.
    DoWhile {
        /// Loop body.
        body: Box<Stmt>,
        /// Loop condition.
        test: Expr,
    },
    /// `switch (discriminant) { cases }`.
    Switch {
        /// The switched-on value.
        discriminant: Expr,
        /// The clauses.
        cases: Vec<SwitchCase>,
    },
    /// `throw expr`.
    Throw(Expr),
    /// `try { } catch { } finally { }`.
    Try {
        /// The protected block.
        block: Block,
        /// The `catch` clause.
        handler: Option<CatchClause>,
        /// The `finally` block.
        finalizer: Option<Block>,
    },
    /// `break label?`.
    Break,
    /// `continue label?`.
    Continue,
    /// `label: body`.
    Labeled {
        /// The label.
        label: Ident,
        /// The labelled statement.
        body: Box<Stmt>,
    },
    /// A function declaration.
    Function(Box<Function>),
    /// A nested class declaration.
    Class(Box<ClassDecl>),
    /// `;`, `debugger` and skipped type-level declarations.
    Empty,
    /// A statement that failed to parse.
    Error,
}

/// Assignment operators.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `%=`
    Rem,
    /// `**=`
    Exp,
    /// `<<=`
    Shl,
    /// `>>=`
    Shr,
    /// `>>>=`
    UShr,
    /// `&=`
    BitAnd,
    /// `|=`
    BitOr,
    /// `^=`
    BitXor,
    /// `&&=`
    And,
    /// `||=`
    Or,
    /// `??=`
    Nullish,
}

impl AssignOp {
    /// The binary operator text of a compound assignment (`+` for `+=`).
    pub fn binary_text(self) -> Option<&'static str> {
        Some(match self {
            AssignOp::Assign => return None,
            AssignOp::Add => "+",
            AssignOp::Sub => "-",
            AssignOp::Mul => "*",
            AssignOp::Div => "/",
            AssignOp::Rem => "%",
            AssignOp::Exp => "**",
            AssignOp::Shl => "<<",
            AssignOp::Shr => ">>",
            AssignOp::UShr => ">>>",
            AssignOp::BitAnd => "&",
            AssignOp::BitOr => "|",
            AssignOp::BitXor => "^",
            AssignOp::And => "&&",
            AssignOp::Or => "||",
            AssignOp::Nullish => "??",
        })
    }
}

/// Binary and logical operators.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `??`
    Nullish,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
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
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `instanceof`
    Instanceof,
    /// `in`
    In,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
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
}

impl BinaryOp {
    /// Returns `true` for `&&`, `||` and `??`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish)
    }
}

/// Prefix unary operators.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `~`
    BitNot,
    /// `typeof`
    Typeof,
    /// `void`
    Void,
    /// `delete`
    Delete,
}

/// `++` or `--`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UpdateOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// A property in an object literal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObjectProp {
    /// `key: value`
    KeyValue {
        /// The key.
        key: PropKey,
        /// The value.
        value: Expr,
        /// Span of the property.
        span: Span,
    },
    /// `name`
    Shorthand(Ident),
    /// `...expr`
    Spread(Expr, Span),
    /// `key() { }`, `get key() { }`, `set key(v) { }`
    Method {
        /// The key.
        key: PropKey,
        /// Method, getter or setter.
        kind: MethodKind,
        /// The method.
        function: Box<Function>,
        /// Span of the property.
        span: Span,
    },
}

impl ObjectProp {
    /// The static key name of the property.
    pub fn key_name(&self) -> Option<&str> {
        match self {
            ObjectProp::KeyValue { key, .. } | ObjectProp::Method { key, .. } => key.name(),
            ObjectProp::Shorthand(id) => Some(&id.name),
            ObjectProp::Spread(..) => None,
        }
    }
}

/// One literal chunk of a template literal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateQuasi {
    /// The text with escapes decoded.
    pub cooked: String,
    /// The text as written.
    pub raw: String,
    /// Span of the raw text (between delimiters).
    pub span: Span,
}

/// An expression with its span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    /// The expression kind.
    pub kind: ExprKind,
    /// Source span.
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    /// A name.
    Ident(Ident),
    /// `this`
    This,
    /// `super`
    Super,
    /// A numeric literal (raw text).
    Number(String),
    /// A string literal.
    Str {
        /// The cooked value.
        value: String,
        /// Whether the cooked value equals the raw text.
        verbatim: bool,
    },
    /// A template literal.
    Template {
        /// Literal chunks (`exprs.len() + 1` of them).
        quasis: Vec<TemplateQuasi>,
        /// Substitutions.
        exprs: Vec<Expr>,
    },
    /// `` tag`...` ``
    TaggedTemplate {
        /// The tag function.
        tag: Box<Expr>,
        /// The template literal.
        quasi: Box<Expr>,
    },
    /// A regular expression literal.
    Regex(String),
    /// `true` / `false`.
    Bool(bool),
    /// `null`
    Null,
    /// `[a, ...b]` (holes are omitted).
    Array(Vec<Expr>),
    /// `{ ... }`
    Object(Vec<ObjectProp>),
    /// `...expr` in array literals and argument lists.
    Spread(Box<Expr>),
    /// `object.property` / `object?.property`.
    Member {
        /// The accessed object.
        object: Box<Expr>,
        /// The property name (private names keep their `#`).
        property: Ident,
        /// `?.`
        optional: bool,
    },
    /// `object[index]`.
    Index {
        /// The accessed object.
        object: Box<Expr>,
        /// The computed key.
        index: Box<Expr>,
        /// `?.[`
        optional: bool,
    },
    /// `callee(args)`.
    Call {
        /// The function being called.
        callee: Box<Expr>,
        /// The arguments.
        args: Vec<Expr>,
        /// `callee?.()`.
        optional: bool,
        /// Span of explicit type arguments `<T>`.
        type_args: Option<Span>,
    },
    /// `new callee(args)`.
    New {
        /// The constructor.
        callee: Box<Expr>,
        /// The arguments (empty without parentheses).
        args: Vec<Expr>,
    },
    /// A prefix unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// `++x`, `x--`.
    Update {
        /// The operator.
        op: UpdateOp,
        /// Prefix form.
        prefix: bool,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary or logical operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `target op= value`.
    Assign {
        /// The operator.
        op: AssignOp,
        /// The assigned place.
        target: Box<Expr>,
        /// The assigned value.
        value: Box<Expr>,
    },
    /// `test ? consequent : alternate`.
    Conditional {
        /// The condition.
        test: Box<Expr>,
        /// Value when true.
        consequent: Box<Expr>,
        /// Value when false.
        alternate: Box<Expr>,
    },
    /// An arrow function or function expression.
    Function(Box<Function>),
    /// A class expression.
    Class(Box<ClassDecl>),
    /// `(expr)`.
    Paren(Box<Expr>),
    /// `a, b`.
    Sequence(Vec<Expr>),
    /// `expr as T`, `expr satisfies T`, `<T>expr`.
    TypeAssertion {
        /// The asserted expression.
        expr: Box<Expr>,
        /// Span of the type text.
        type_span: Span,
    },
    /// `expr!`.
    NonNull(Box<Expr>),
    /// `await expr`.
    Await(Box<Expr>),
    /// `yield expr?`.
    Yield(Option<Box<Expr>>),
    /// `new.target`, `import.meta`.
    MetaProperty,
    /// An expression that failed to parse.
    Error,
}

impl Expr {
    /// Creates an expression node.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strips parentheses, non-null assertions and type assertions.
    pub fn unwrap_transparent(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => inner.unwrap_transparent(),
            ExprKind::TypeAssertion { expr, .. } => expr.unwrap_transparent(),
            _ => self,
        }
    }

    /// Returns the identifier name for `ExprKind::Ident`.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(id) => Some(&id.name),
            _ => None,
        }
    }

    /// Returns the value of a string literal or a template literal without
    /// substitutions.
    pub fn as_static_string(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Str { value, .. } => Some(value),
            ExprKind::Template { quasis, exprs } if exprs.is_empty() => {
                quasis.first().map(|q| q.cooked.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_source::FileId;

    fn sp(a: u32, b: u32) -> Span {
        Span::new(FileId::from_raw(0), a, b)
    }

    fn ident(name: &str) -> Ident {
        Ident {
            name: name.to_string(),
            span: sp(0, name.len() as u32),
        }
    }

    #[test]
    fn private_name_helpers() {
        let id = ident("#count");
        assert!(id.is_private_name());
        assert_eq!(id.bare_name(), "count");
        assert_eq!(PropKey::Private(id.clone()).name(), Some("count"));
        assert_eq!(PropKey::Private(id).member_name(), Some("#count"));
    }

    #[test]
    fn decorator_name_through_call_and_member() {
        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(ExprKind::Ident(ident("Component")), sp(1, 10))),
                args: vec![],
                optional: false,
                type_args: None,
            },
            sp(1, 12),
        );
        let deco = Decorator {
            expr: call,
            span: sp(0, 12),
        };
        assert_eq!(deco.name(), Some("Component"));
        assert!(deco.args().is_empty());
    }

    #[test]
    fn unwrap_transparent_strips_wrappers() {
        let inner = Expr::new(ExprKind::This, sp(1, 5));
        let wrapped = Expr::new(
            ExprKind::NonNull(Box::new(Expr::new(ExprKind::Paren(Box::new(inner)), sp(0, 6)))),
            sp(0, 7),
        );
        assert!(matches!(wrapped.unwrap_transparent().kind, ExprKind::This));
    }

    #[test]
    fn modifier_list() {
        let mods = vec![Modifier {
            kind: ModifierKind::Private,
            span: sp(0, 7),
        }];
        assert!(mods.has(ModifierKind::Private));
        assert!(!mods.has(ModifierKind::Readonly));
        assert_eq!(mods.span_of(ModifierKind::Private), Some(sp(0, 7)));
    }

    #[test]
    fn compound_assign_text() {
        assert_eq!(AssignOp::Add.binary_text(), Some("+"));
        assert_eq!(AssignOp::Assign.binary_text(), None);
    }
}
