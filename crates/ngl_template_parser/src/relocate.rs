//! Moving parsed templates into the coordinates of an enclosing file.
//!
//! Inline templates are parsed on their own and then shifted so that every
//! span points at the template literal inside the component source.

use crate::ast::*;
use crate::expr::{TemplateExpr, TemplateExprKind};
use crate::expr_parser::TemplateBindings;
use ngl_source::{FileId, Span};

/// Shifts every span in a tree by `delta` bytes and re-homes it in `file`.
pub trait Relocate {
    /// Relocates `self` in place.
    fn relocate(&mut self, file: FileId, delta: u32);
}

impl Relocate for Span {
    fn relocate(&mut self, file: FileId, delta: u32) {
        *self = self.shifted(file, delta);
    }
}

impl<T: Relocate> Relocate for Vec<T> {
    fn relocate(&mut self, file: FileId, delta: u32) {
        for item in self {
            item.relocate(file, delta);
        }
    }
}

impl<T: Relocate> Relocate for Option<T> {
    fn relocate(&mut self, file: FileId, delta: u32) {
        if let Some(inner) = self {
            inner.relocate(file, delta);
        }
    }
}

impl<T: Relocate> Relocate for Box<T> {
    fn relocate(&mut self, file: FileId, delta: u32) {
        (**self).relocate(file, delta);
    }
}

impl Relocate for Template {
    fn relocate(&mut self, file: FileId, delta: u32) {
        self.nodes.relocate(file, delta);
        self.span.relocate(file, delta);
    }
}

impl Relocate for TemplateNode {
    fn relocate(&mut self, file: FileId, delta: u32) {
        match self {
            TemplateNode::Element(el) => el.relocate(file, delta),
            TemplateNode::Text(text) => text.span.relocate(file, delta),
            TemplateNode::BoundText(text) => {
                text.exprs.relocate(file, delta);
                text.span.relocate(file, delta);
            }
            TemplateNode::Comment(span) => span.relocate(file, delta),
            TemplateNode::IfBlock(block) => {
                for branch in &mut block.branches {
                    branch.condition.relocate(file, delta);
                    branch.children.relocate(file, delta);
                    branch.span.relocate(file, delta);
                }
                block.span.relocate(file, delta);
            }
            TemplateNode::ForBlock(block) => {
                block.expression.relocate(file, delta);
                block.track.relocate(file, delta);
                block.children.relocate(file, delta);
                block.empty.relocate(file, delta);
                block.span.relocate(file, delta);
            }
            TemplateNode::SwitchBlock(block) => {
                block.expression.relocate(file, delta);
                for case in &mut block.cases {
                    case.expression.relocate(file, delta);
                    case.children.relocate(file, delta);
                    case.span.relocate(file, delta);
                }
                block.span.relocate(file, delta);
            }
            TemplateNode::DeferBlock(block) => {
                block.triggers.relocate(file, delta);
                block.children.relocate(file, delta);
                block.placeholder.relocate(file, delta);
                block.loading.relocate(file, delta);
                block.error.relocate(file, delta);
                block.span.relocate(file, delta);
            }
            TemplateNode::LetDeclaration(decl) => {
                decl.value.relocate(file, delta);
                decl.span.relocate(file, delta);
            }
        }
    }
}

impl Relocate for Element {
    fn relocate(&mut self, file: FileId, delta: u32) {
        self.name_span.relocate(file, delta);
        self.attributes.relocate(file, delta);
        self.children.relocate(file, delta);
        self.start_span.relocate(file, delta);
        self.end_span.relocate(file, delta);
        self.span.relocate(file, delta);
    }
}

impl Relocate for Attribute {
    fn relocate(&mut self, file: FileId, delta: u32) {
        self.name_span.relocate(file, delta);
        if let Some(value) = &mut self.value {
            value.span.relocate(file, delta);
        }
        match &mut self.binding {
            AttributeBinding::None => {}
            AttributeBinding::Expr(expr) | AttributeBinding::Action(expr) => {
                expr.relocate(file, delta)
            }
            AttributeBinding::Interpolation(exprs) => exprs.relocate(file, delta),
            AttributeBinding::Template(bindings) => bindings.relocate(file, delta),
        }
        self.span.relocate(file, delta);
    }
}

impl Relocate for TemplateBindings {
    fn relocate(&mut self, file: FileId, delta: u32) {
        self.exprs.relocate(file, delta);
    }
}

impl Relocate for TemplateExpr {
    fn relocate(&mut self, file: FileId, delta: u32) {
        self.span.relocate(file, delta);
        match &mut self.kind {
            TemplateExprKind::ImplicitReceiver
            | TemplateExprKind::ThisReceiver
            | TemplateExprKind::LiteralPrimitive(_)
            | TemplateExprKind::Empty => {}
            TemplateExprKind::PropertyRead {
                receiver,
                name_span,
                ..
            }
            | TemplateExprKind::SafePropertyRead {
                receiver,
                name_span,
                ..
            } => {
                receiver.relocate(file, delta);
                name_span.relocate(file, delta);
            }
            TemplateExprKind::KeyedRead { receiver, key }
            | TemplateExprKind::SafeKeyedRead { receiver, key } => {
                receiver.relocate(file, delta);
                key.relocate(file, delta);
            }
            TemplateExprKind::PropertyWrite {
                receiver,
                name_span,
                value,
                ..
            } => {
                receiver.relocate(file, delta);
                name_span.relocate(file, delta);
                value.relocate(file, delta);
            }
            TemplateExprKind::KeyedWrite {
                receiver,
                key,
                value,
            } => {
                receiver.relocate(file, delta);
                key.relocate(file, delta);
                value.relocate(file, delta);
            }
            TemplateExprKind::Call { receiver, args }
            | TemplateExprKind::SafeCall { receiver, args } => {
                receiver.relocate(file, delta);
                args.relocate(file, delta);
            }
            TemplateExprKind::Binary { left, right, .. } => {
                left.relocate(file, delta);
                right.relocate(file, delta);
            }
            TemplateExprKind::Unary { expr, .. }
            | TemplateExprKind::PrefixNot(expr)
            | TemplateExprKind::TypeofExpr(expr)
            | TemplateExprKind::VoidExpr(expr)
            | TemplateExprKind::NonNullAssert(expr)
            | TemplateExprKind::Parenthesized(expr) => expr.relocate(file, delta),
            TemplateExprKind::Conditional {
                condition,
                true_exp,
                false_exp,
            } => {
                condition.relocate(file, delta);
                true_exp.relocate(file, delta);
                false_exp.relocate(file, delta);
            }
            TemplateExprKind::BindingPipe {
                exp,
                name_span,
                args,
                ..
            } => {
                exp.relocate(file, delta);
                name_span.relocate(file, delta);
                args.relocate(file, delta);
            }
            TemplateExprKind::LiteralArray(items) | TemplateExprKind::Chain(items) => {
                items.relocate(file, delta)
            }
            TemplateExprKind::LiteralMap(entries) => {
                for entry in entries {
                    entry.value.relocate(file, delta);
                }
            }
            TemplateExprKind::TemplateLiteral { exprs, .. } => exprs.relocate(file, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_template;

    #[test]
    fn every_span_moves_into_the_host_file() {
        let text = r#"<ion-item [button]="user().name | upper">{{ a?.b }}</ion-item>"#;
        let host = FileId::from_raw(7);
        let mut template = parse_template(text, FileId::from_raw(0)).unwrap();
        let original = template.clone();
        template.relocate(host, 100);

        assert_eq!(template.span, Span::new(host, 100, 100 + text.len() as u32));
        let el = &template.elements()[0];
        let before = &original.elements()[0];
        assert_eq!(el.name_span.start, before.name_span.start + 100);
        assert_eq!(el.name_span.file, host);
        let AttributeBinding::Expr(expr) = &el.attributes[0].binding else { panic!("expr") };
        let AttributeBinding::Expr(old) = &before.attributes[0].binding else { panic!("expr") };
        assert_eq!(expr.span.start, old.span.start + 100);
        let TemplateExprKind::BindingPipe { name_span, .. } = &expr.kind else { panic!("pipe") };
        assert_eq!(&text[(name_span.start - 100) as usize..(name_span.end - 100) as usize], "upper");
        let TemplateNode::BoundText(bound) = &el.children[0] else { panic!("bound text") };
        assert_eq!(bound.exprs[0].span.file, host);
    }

    #[test]
    fn zero_delta_only_rehomes() {
        let mut template = parse_template("<a></a>", FileId::from_raw(0)).unwrap();
        template.relocate(FileId::from_raw(3), 0);
        assert_eq!(template.span, Span::new(FileId::from_raw(3), 0, 7));
    }
}
