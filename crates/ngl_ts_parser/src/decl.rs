//! Declaration parsing: decorators, classes and their members, functions,
//! parameters and binding patterns.

use crate::ast::*;
use crate::parser::TsParser;
use crate::token::TsToken;
use ngl_source::Span;

impl TsParser<'_> {
    /// Parses zero or more decorators.
    pub(crate) fn parse_decorators(&mut self) -> Vec<Decorator> {
        let mut decorators = Vec::new();
        while self.at(TsToken::At) {
            let start = self.current_span();
            self.advance();
            let expr = self.parse_decorator_expr();
            decorators.push(Decorator {
                span: start.to(expr.span),
                expr,
            });
        }
        decorators
    }

    /// Parses the expression after `@`: a dotted name, optionally called.
    fn parse_decorator_expr(&mut self) -> Expr {
        if self.at(TsToken::LeftParen) {
            let start = self.current_span();
            self.advance();
            let inner = self.parse_expr();
            self.expect(TsToken::RightParen);
            return Expr::new(ExprKind::Paren(Box::new(inner)), start.to(self.prev_span()));
        }
        let id = self.expect_identifier_name();
        let mut expr = Expr::new(ExprKind::Ident(id.clone()), id.span);
        while self.at(TsToken::Dot) {
            self.advance();
            let property = self.expect_identifier_name();
            let span = expr.span.to(property.span);
            expr = Expr::new(
                ExprKind::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                },
                span,
            );
        }
        let type_args = self.try_type_args();
        if self.at(TsToken::LeftParen) {
            let args = self.parse_arguments();
            let span = expr.span.to(self.prev_span());
            expr = Expr::new(
                ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                    optional: false,
                    type_args,
                },
                span,
            );
        }
        expr
    }

    /// Parses a class declaration or expression, starting at `abstract` or `class`.
    pub(crate) fn parse_class_decl(&mut self, decorators: Vec<Decorator>, exported: bool) -> ClassDecl {
        let start = decorators
            .first()
            .map(|d| d.span)
            .unwrap_or_else(|| self.current_span());
        let is_abstract = self.eat_contextual("abstract");
        self.expect(TsToken::Class);

        let name = if self.at(TsToken::Identifier) && !self.at_contextual("implements") {
            Some(self.take_ident())
        } else {
            None
        };
        self.skip_type_params();

        let extends = if self.eat(TsToken::Extends) {
            let expr = self.parse_heritage_expr();
            self.skip_type_params();
            Some(expr)
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.eat_contextual("implements") {
            loop {
                let first = self.expect_ident();
                let mut name = first.name;
                let mut span = first.span;
                while self.eat(TsToken::Dot) {
                    let part = self.expect_identifier_name();
                    name.push('.');
                    name.push_str(&part.name);
                    span = span.to(part.span);
                }
                self.skip_type_params();
                implements.push(Ident { name, span });
                if !self.eat(TsToken::Comma) {
                    break;
                }
            }
        }
        let header_end = self.prev_span().end;

        let body_start = self.current_span();
        self.expect(TsToken::LeftBrace);
        let mut members = Vec::new();
        while !self.at(TsToken::RightBrace) && !self.at_eof() {
            let before = self.pos;
            members.push(self.parse_class_member());
            if self.pos == before {
                self.error(&format!("unexpected `{}` in class body", self.current_text()));
                self.advance();
            }
        }
        self.expect(TsToken::RightBrace);
        let body_span = body_start.to(self.prev_span());

        ClassDecl {
            decorators,
            exported,
            is_abstract,
            name,
            extends,
            implements,
            header_end,
            members,
            body_span,
            span: start.to(self.prev_span()),
        }
    }

    /// Parses the expression after `extends`: a member chain with optional calls.
    fn parse_heritage_expr(&mut self) -> Expr {
        let mut expr = self.parse_primary_expr();
        loop {
            match self.current() {
                TsToken::Dot => {
                    self.advance();
                    let property = self.expect_identifier_name();
                    let span = expr.span.to(property.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                            optional: false,
                        },
                        span,
                    );
                }
                TsToken::LeftParen => {
                    let args = self.parse_arguments();
                    let span = expr.span.to(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                            optional: false,
                            type_args: None,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        expr
    }

    /// Returns `true` if the current identifier is used as a modifier rather
    /// than as the member name itself (`readonly = 1` declares a field named
    /// `readonly`).
    fn at_member_modifier(&self) -> bool {
        if !self.at(TsToken::Identifier) || ModifierKind::from_text(self.current_text()).is_none() {
            return false;
        }
        let next = self.peek_token(1);
        if next.newline_before && self.current_text() != "readonly" {
            return false;
        }
        next.kind.is_identifier_name()
            || matches!(
                next.kind,
                TsToken::PrivateName
                    | TsToken::String
                    | TsToken::Number
                    | TsToken::LeftBracket
                    | TsToken::Star
                    | TsToken::LeftBrace
                    | TsToken::DotDotDot
            )
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        while self.at_member_modifier() {
            if self.at_contextual("static") && self.peek_kind(1) == TsToken::LeftBrace {
                break;
            }
            if let Some(kind) = ModifierKind::from_text(self.current_text()) {
                modifiers.push(Modifier {
                    kind,
                    span: self.current_span(),
                });
            }
            self.advance();
        }
        modifiers
    }

    /// Parses one member of a class body.
    fn parse_class_member(&mut self) -> ClassMember {
        if self.at(TsToken::Semicolon) {
            let span = self.current_span();
            self.advance();
            return ClassMember::Other(span);
        }

        let start = self.current_span();
        let decorators = self.parse_decorators();
        let modifiers = self.parse_modifiers();

        if self.at_contextual("static") && self.peek_kind(1) == TsToken::LeftBrace {
            self.advance();
            return ClassMember::StaticBlock(self.parse_block());
        }

        if self.at_contextual("constructor") && self.peek_kind(1) == TsToken::LeftParen {
            self.advance();
            let params = self.parse_params();
            let body = if self.at(TsToken::LeftBrace) {
                Some(self.parse_block())
            } else {
                self.eat_semicolon();
                None
            };
            return ClassMember::Constructor(Constructor {
                modifiers,
                params,
                body,
                span: start.to(self.prev_span()),
            });
        }

        // Index signature: `[key: string]: T;`
        if self.at(TsToken::LeftBracket)
            && self.peek_kind(1) == TsToken::Identifier
            && self.peek_kind(2) == TsToken::Colon
        {
            self.skip_balanced();
            if self.eat(TsToken::Colon) {
                self.skip_type(false);
            }
            self.eat_semicolon();
            return ClassMember::Other(start.to(self.prev_span()));
        }

        let mut kind = MethodKind::Method;
        if (self.at_contextual("get") || self.at_contextual("set"))
            && !matches!(
                self.peek_kind(1),
                TsToken::LeftParen
                    | TsToken::Eq
                    | TsToken::Semicolon
                    | TsToken::Colon
                    | TsToken::Question
                    | TsToken::Bang
                    | TsToken::Lt
                    | TsToken::RightBrace
            )
        {
            kind = if self.current_text() == "get" {
                MethodKind::Getter
            } else {
                MethodKind::Setter
            };
            self.advance();
        }
        let is_generator = self.eat(TsToken::Star);
        let key = self.parse_prop_key();
        let optional = self.eat(TsToken::Question);

        if self.at(TsToken::LeftParen) || self.at(TsToken::Lt) {
            let is_async = modifiers.has(ModifierKind::Async);
            let function = self.parse_function_rest(None, is_async, is_generator, start);
            return ClassMember::Method(MethodDecl {
                decorators,
                modifiers,
                kind,
                key,
                function,
                span: start.to(self.prev_span()),
            });
        }

        let definite = self.eat(TsToken::Bang);
        let type_ann = if self.eat(TsToken::Colon) {
            Some(self.skip_type(false))
        } else {
            None
        };
        let value = if self.eat(TsToken::Eq) {
            Some(self.parse_assignment_expr())
        } else {
            None
        };
        self.eat_semicolon();
        ClassMember::Property(PropertyDecl {
            decorators,
            modifiers,
            key,
            optional,
            definite,
            type_ann,
            value,
            span: start.to(self.prev_span()),
        })
    }

    /// Parses an object or class member key.
    pub(crate) fn parse_prop_key(&mut self) -> PropKey {
        match self.current() {
            TsToken::PrivateName => PropKey::Private(self.take_ident()),
            TsToken::String => {
                let span = self.current_span();
                let text = self.current_text();
                let value = crate::lexer::cook(text.get(1..text.len().saturating_sub(1)).unwrap_or(""));
                self.advance();
                PropKey::Str { value, span }
            }
            TsToken::Number => {
                let span = self.current_span();
                let raw = self.current_text().to_string();
                self.advance();
                PropKey::Num { raw, span }
            }
            TsToken::LeftBracket => {
                let start = self.current_span();
                self.advance();
                let expr = self.parse_assignment_expr();
                self.expect(TsToken::RightBracket);
                PropKey::Computed(Box::new(expr), start.to(self.prev_span()))
            }
            k if k.is_identifier_name() => PropKey::Ident(self.take_ident()),
            _ => {
                self.expected("property name");
                PropKey::Ident(Ident {
                    name: "<missing>".to_string(),
                    span: self.current_span(),
                })
            }
        }
    }

    /// Parses type parameters, parameters, return type and body of a
    /// non-arrow function whose name (if any) was already consumed.
    pub(crate) fn parse_function_rest(
        &mut self,
        name: Option<Ident>,
        is_async: bool,
        is_generator: bool,
        start: Span,
    ) -> Function {
        self.skip_type_params();
        let params = self.parse_params();
        let return_type = if self.eat(TsToken::Colon) {
            Some(self.skip_type(false))
        } else {
            None
        };
        let body = if self.at(TsToken::LeftBrace) {
            Some(FunctionBody::Block(self.parse_block()))
        } else {
            self.eat_semicolon();
            None
        };
        Function {
            name,
            params,
            body,
            is_arrow: false,
            is_async,
            is_generator,
            return_type,
            span: start.to(self.prev_span()),
        }
    }

    /// Parses a parenthesized parameter list.
    pub(crate) fn parse_params(&mut self) -> Vec<Param> {
        self.expect(TsToken::LeftParen);
        let mut params = Vec::new();
        while !self.at(TsToken::RightParen) && !self.at_eof() {
            let before = self.pos;
            params.push(self.parse_param());
            if self.pos == before || !self.eat(TsToken::Comma) {
                break;
            }
        }
        self.expect(TsToken::RightParen);
        params
    }

    fn parse_param(&mut self) -> Param {
        let start = self.current_span();
        let decorators = self.parse_decorators();
        let mut modifiers = Vec::new();
        while self.at(TsToken::Identifier)
            && matches!(
                self.current_text(),
                "public" | "private" | "protected" | "readonly" | "override"
            )
            && (self.peek_kind(1).is_identifier_name()
                || matches!(self.peek_kind(1), TsToken::LeftBrace | TsToken::LeftBracket))
        {
            if let Some(kind) = ModifierKind::from_text(self.current_text()) {
                modifiers.push(Modifier {
                    kind,
                    span: self.current_span(),
                });
            }
            self.advance();
        }
        let rest = self.eat(TsToken::DotDotDot);
        let pattern = self.parse_binding_pattern();
        let optional = self.eat(TsToken::Question);
        let type_ann = if self.eat(TsToken::Colon) {
            Some(self.skip_type(false))
        } else {
            None
        };
        let default = if self.eat(TsToken::Eq) {
            Some(self.parse_assignment_expr())
        } else {
            None
        };
        Param {
            decorators,
            modifiers,
            rest,
            pattern,
            optional,
            type_ann,
            default,
            span: start.to(self.prev_span()),
        }
    }

    /// Parses a binding: a name or an object/array destructuring pattern.
    pub(crate) fn parse_binding_pattern(&mut self) -> Pattern {
        match self.current() {
            TsToken::LeftBrace | TsToken::LeftBracket => {
                let start = self.current_span();
                let mut names = Vec::new();
                self.collect_pattern_names(&mut names);
                Pattern::Destructure {
                    names,
                    span: start.to(self.prev_span()),
                }
            }
            k if k.is_identifier_name() => Pattern::Ident(self.take_ident()),
            _ => {
                self.expected("binding name");
                Pattern::Ident(Ident {
                    name: "<missing>".to_string(),
                    span: self.current_span(),
                })
            }
        }
    }

    fn collect_pattern_names(&mut self, names: &mut Vec<Ident>) {
        match self.current() {
            TsToken::LeftBrace => {
                self.advance();
                while !self.at(TsToken::RightBrace) && !self.at_eof() {
                    let before = self.pos;
                    if self.eat(TsToken::DotDotDot) {
                        self.collect_pattern_names(names);
                    } else {
                        let key = self.parse_prop_key();
                        if self.eat(TsToken::Colon) {
                            self.collect_pattern_names(names);
                        } else if let PropKey::Ident(id) = key {
                            names.push(id);
                        }
                        if self.eat(TsToken::Eq) {
                            self.parse_assignment_expr();
                        }
                    }
                    if self.pos == before || !self.eat(TsToken::Comma) {
                        break;
                    }
                }
                self.expect(TsToken::RightBrace);
            }
            TsToken::LeftBracket => {
                self.advance();
                while !self.at(TsToken::RightBracket) && !self.at_eof() {
                    if self.eat(TsToken::Comma) {
                        continue;
                    }
                    let before = self.pos;
                    self.eat(TsToken::DotDotDot);
                    self.collect_pattern_names(names);
                    if self.eat(TsToken::Eq) {
                        self.parse_assignment_expr();
                    }
                    if self.pos == before || !self.eat(TsToken::Comma) {
                        break;
                    }
                }
                self.expect(TsToken::RightBracket);
            }
            k if k.is_identifier_name() => names.push(self.take_ident()),
            _ => self.expected("binding name"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse_source;
    use ngl_diagnostics::DiagnosticSink;
    use ngl_source::FileId;

    fn parse_class(source: &str) -> ClassDecl {
        let sink = DiagnosticSink::new();
        let program = parse_source(source, FileId::from_raw(0), &sink);
        let errors = sink.take_all();
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        let class = program.classes().next().cloned().expect("class");
        class
    }

    #[test]
    fn property_members_with_modifiers() {
        let class = parse_class(
            "class A {\n\
               private readonly count = signal<number>(0);\n\
               protected static override label?: string;\n\
               #secret = 1;\n\
               @Input() name!: string;\n\
               readonly = true;\n\
             }",
        );
        let props: Vec<_> = class.properties().collect();
        assert_eq!(props.len(), 5);
        assert!(props[0].modifiers.has(ModifierKind::Private));
        assert!(props[0].modifiers.has(ModifierKind::Readonly));
        assert_eq!(props[0].key.name(), Some("count"));
        assert!(props[1].optional);
        assert!(props[1].modifiers.has(ModifierKind::Static));
        assert!(props[2].key.is_private_name());
        assert_eq!(props[3].decorators.len(), 1);
        assert!(props[3].definite);
        assert_eq!(props[4].key.name(), Some("readonly"));
        assert!(props[4].modifiers.is_empty());
    }

    #[test]
    fn methods_accessors_and_constructor() {
        let class = parse_class(
            "class A {\n\
               constructor(private readonly http: HttpClient, @Inject(TOKEN) cfg: Config) {}\n\
               get total(): number { return 1; }\n\
               set total(v: number) {}\n\
               async load<T>(id: string): Promise<T> { return null as any; }\n\
               ngOnInit(): void {}\n\
               static { init(); }\n\
               [key: string]: unknown;\n\
             }",
        );
        let ctor = class.constructor().unwrap();
        assert_eq!(ctor.params.len(), 2);
        assert!(ctor.params[0].modifiers.has(ModifierKind::Readonly));
        assert_eq!(ctor.params[1].decorators.len(), 1);
        assert!(ctor.params[1].modifiers.is_empty());
        let methods: Vec<_> = class.methods().collect();
        assert_eq!(methods.len(), 4);
        assert_eq!(methods[0].kind, MethodKind::Getter);
        assert_eq!(methods[1].kind, MethodKind::Setter);
        assert!(methods[2].function.is_async);
        assert_eq!(methods[3].key.name(), Some("ngOnInit"));
        assert!(class
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::StaticBlock(_))));
    }

    #[test]
    fn heritage_clauses_and_header_end() {
        let src = "export class A<T> extends Base<T> implements OnInit, ng.OnDestroy {}";
        let class = parse_class(src);
        assert!(class.extends.is_some());
        assert_eq!(class.implements.len(), 2);
        assert_eq!(class.implements[1].name, "ng.OnDestroy");
        assert_eq!(&src[..class.header_end as usize], "export class A<T> extends Base<T> implements OnInit, ng.OnDestroy");
    }

    #[test]
    fn destructuring_params_collect_names() {
        let class = parse_class("class A { f({ a, b: { c }, ...d }: X, [e, , f = 1]: Y) {} }");
        let method = class.methods().next().unwrap();
        let names: Vec<String> = method
            .function
            .params
            .iter()
            .flat_map(|p| match &p.pattern {
                Pattern::Destructure { names, .. } => names.iter().map(|n| n.name.clone()).collect(),
                Pattern::Ident(id) => vec![id.name.clone()],
            })
            .collect();
        assert_eq!(names, ["a", "c", "d", "e", "f"]);
    }

    #[test]
    fn decorator_with_member_callee() {
        let class = parse_class("@core.Component({}) class A {}");
        assert_eq!(class.decorators[0].name(), Some("Component"));
        assert_eq!(class.decorators[0].args().len(), 1);
    }
}
