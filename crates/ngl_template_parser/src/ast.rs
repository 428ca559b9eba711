//! Template node types.
//!
//! Every node kind is a variant of [`TemplateNode`]; traversals match on it
//! exhaustively. Spans point into the template's file once the template has
//! been relocated (see [`crate::Relocate`]).

use crate::expr::TemplateExpr;
use crate::expr_parser::TemplateBindings;
use ngl_source::Span;
use serde::{Deserialize, Serialize};

/// A parsed template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Top-level nodes.
    pub nodes: Vec<TemplateNode>,
    /// Span of the whole template text.
    pub span: Span,
}

/// A template node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TemplateNode {
    /// `<name ...>...</name>`.
    Element(Element),
    /// Static text.
    Text(Text),
    /// Text containing `{{ }}` interpolations.
    BoundText(BoundText),
    /// `<!-- ... -->`.
    Comment(Span),
    /// `@if (...) { } @else if (...) { } @else { }`.
    IfBlock(IfBlock),
    /// `@for (item of items; track ...) { } @empty { }`.
    ForBlock(ForBlock),
    /// `@switch (...) { @case (...) { } @default { } }`.
    SwitchBlock(SwitchBlock),
    /// `@defer (...) { } @placeholder { } @loading { } @error { }`.
    DeferBlock(DeferBlock),
    /// `@let name = expr;`.
    LetDeclaration(LetDeclaration),
}

/// An HTML element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name as written.
    pub name: String,
    /// Span of the tag name in the start tag.
    pub name_span: Span,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Span of the start tag, `<` through `>`.
    pub start_span: Span,
    /// Span of the end tag, if written.
    pub end_span: Option<Span>,
    /// Span of the whole element.
    pub span: Span,
}

/// The syntactic form of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// `name="value"`, possibly with interpolation.
    Static,
    /// `[name]="expr"` / `bind-name="expr"`.
    Property,
    /// `(name)="handler"` / `on-name="handler"`.
    Event,
    /// `[(name)]="expr"` / `bindon-name="expr"`.
    TwoWay,
    /// `*name="microsyntax"`.
    Structural,
    /// `#name` / `ref-name`.
    Reference,
    /// `let-name="key"` on `<ng-template>`.
    Let,
}

/// An attribute value as written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Text between the quotes.
    pub text: String,
    /// Span of the text between the quotes.
    pub span: Span,
    /// The quote character, if quoted.
    pub quote: Option<char>,
}

/// The parsed meaning of an attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeBinding {
    /// Nothing to evaluate.
    None,
    /// A property or two-way binding expression.
    Expr(TemplateExpr),
    /// An event handler.
    Action(TemplateExpr),
    /// Interpolations in a static attribute.
    Interpolation(Vec<TemplateExpr>),
    /// Structural directive microsyntax.
    Template(TemplateBindings),
}

/// An attribute in a start tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The syntactic form.
    pub kind: AttributeKind,
    /// The target name without binding punctuation (`value` for `[value]`).
    pub name: String,
    /// Span of the name as written, punctuation included.
    pub name_span: Span,
    /// The value, if any.
    pub value: Option<AttributeValue>,
    /// The parsed value.
    pub binding: AttributeBinding,
    /// Span of the whole attribute, quotes included.
    pub span: Span,
}

/// Static text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The text as written.
    pub value: String,
    /// Source span.
    pub span: Span,
}

/// Text with interpolations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundText {
    /// The text as written.
    pub value: String,
    /// The interpolated expressions in order.
    pub exprs: Vec<TemplateExpr>,
    /// Source span.
    pub span: Span,
}

/// `@if` with its `@else if` / `@else` branches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfBlock {
    /// Branches in order; the last one has no condition for `@else`.
    pub branches: Vec<IfBranch>,
    /// Span of the whole chain.
    pub span: Span,
}

/// One branch of an `@if` chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfBranch {
    /// The condition, absent for `@else`.
    pub condition: Option<TemplateExpr>,
    /// The `as alias` name.
    pub alias: Option<String>,
    /// Branch content.
    pub children: Vec<TemplateNode>,
    /// Span of the branch.
    pub span: Span,
}

/// `@for` with its optional `@empty` block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForBlock {
    /// The loop item name.
    pub item: String,
    /// The iterated expression.
    pub expression: TemplateExpr,
    /// The `track` expression.
    pub track: Option<TemplateExpr>,
    /// Names from `let i = $index, ...`.
    pub context_aliases: Vec<String>,
    /// Loop body.
    pub children: Vec<TemplateNode>,
    /// The `@empty` content.
    pub empty: Option<Vec<TemplateNode>>,
    /// Span of the whole block.
    pub span: Span,
}

/// `@switch`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchBlock {
    /// The switched expression.
    pub expression: TemplateExpr,
    /// `@case` and `@default` blocks in order.
    pub cases: Vec<SwitchCase>,
    /// Span of the whole block.
    pub span: Span,
}

/// `@case (expr)` or `@default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// The case value, absent for `@default`.
    pub expression: Option<TemplateExpr>,
    /// Case content.
    pub children: Vec<TemplateNode>,
    /// Span of the case.
    pub span: Span,
}

/// `@defer` with its connected blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeferBlock {
    /// Expressions of `when` / `prefetch when` / `hydrate when` triggers.
    pub triggers: Vec<TemplateExpr>,
    /// Deferred content.
    pub children: Vec<TemplateNode>,
    /// `@placeholder` content.
    pub placeholder: Option<Vec<TemplateNode>>,
    /// `@loading` content.
    pub loading: Option<Vec<TemplateNode>>,
    /// `@error` content.
    pub error: Option<Vec<TemplateNode>>,
    /// Span of the whole block.
    pub span: Span,
}

/// `@let name = value;`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LetDeclaration {
    /// The declared name.
    pub name: String,
    /// The value expression.
    pub value: TemplateExpr,
    /// Source span.
    pub span: Span,
}

impl Template {
    /// Visits every element in document order.
    pub fn for_each_element<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        for_each_element_in(&self.nodes, f);
    }

    /// Collects every element in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.for_each_element(&mut |el| out.push(el));
        out
    }
}

fn for_each_element_in<'a>(nodes: &'a [TemplateNode], f: &mut impl FnMut(&'a Element)) {
    for node in nodes {
        if let TemplateNode::Element(el) = node {
            f(el);
        }
        for children in node.child_lists() {
            for_each_element_in(children, f);
        }
    }
}

impl TemplateNode {
    /// Returns every child list of this node: element children, block
    /// branches and connected blocks.
    pub fn child_lists(&self) -> Vec<&[TemplateNode]> {
        match self {
            TemplateNode::Element(el) => vec![el.children.as_slice()],
            TemplateNode::Text(_)
            | TemplateNode::BoundText(_)
            | TemplateNode::Comment(_)
            | TemplateNode::LetDeclaration(_) => Vec::new(),
            TemplateNode::IfBlock(block) => block
                .branches
                .iter()
                .map(|b| b.children.as_slice())
                .collect(),
            TemplateNode::ForBlock(block) => {
                let mut lists = vec![block.children.as_slice()];
                lists.extend(block.empty.as_deref());
                lists
            }
            TemplateNode::SwitchBlock(block) => {
                block.cases.iter().map(|c| c.children.as_slice()).collect()
            }
            TemplateNode::DeferBlock(block) => {
                let mut lists = vec![block.children.as_slice()];
                lists.extend(block.placeholder.as_deref());
                lists.extend(block.loading.as_deref());
                lists.extend(block.error.as_deref());
                lists
            }
        }
    }

    /// Source span of the node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Element(el) => el.span,
            TemplateNode::Text(t) => t.span,
            TemplateNode::BoundText(t) => t.span,
            TemplateNode::Comment(span) => *span,
            TemplateNode::IfBlock(b) => b.span,
            TemplateNode::ForBlock(b) => b.span,
            TemplateNode::SwitchBlock(b) => b.span,
            TemplateNode::DeferBlock(b) => b.span,
            TemplateNode::LetDeclaration(d) => d.span,
        }
    }
}

impl Element {
    /// Returns the first attribute of the given kind and name.
    pub fn attribute(&self, kind: AttributeKind, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.kind == kind && a.name == name)
    }

    /// Template-local names this element introduces for its content:
    /// structural directive locals and `let-` variables.
    pub fn template_locals(&self) -> Vec<&str> {
        let mut locals = Vec::new();
        for attr in &self.attributes {
            match (&attr.kind, &attr.binding) {
                (AttributeKind::Structural, AttributeBinding::Template(bindings)) => {
                    locals.extend(bindings.locals.iter().map(String::as_str));
                }
                (AttributeKind::Let, _) => locals.push(attr.name.as_str()),
                _ => {}
            }
        }
        locals
    }

    /// Reference names (`#ref`) declared on this element.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|a| a.kind == AttributeKind::Reference)
            .map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_template;
    use ngl_source::FileId;

    #[test]
    fn elements_are_visited_in_document_order_through_blocks() {
        let template = parse_template(
            "<a></a>@if (x) { <b></b> } @else { <c><d/></c> }@for (i of l; track i) { } @empty { <e/> }",
            FileId::from_raw(0),
        )
        .unwrap();
        let names: Vec<_> = template.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn template_locals_and_references() {
        let template = parse_template(
            r#"<ng-template let-row #tpl><li *ngFor="let item of items; index as i"></li></ng-template>"#,
            FileId::from_raw(0),
        )
        .unwrap();
        let elements = template.elements();
        assert_eq!(elements[0].template_locals(), ["row"]);
        assert_eq!(elements[0].references().collect::<Vec<_>>(), ["tpl"]);
        assert_eq!(elements[1].template_locals(), ["item", "i"]);
    }
}
