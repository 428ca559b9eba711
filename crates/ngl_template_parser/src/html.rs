//! Parser for template markup: elements, attributes, text, comments and
//! control-flow blocks.
//!
//! Elements close implicitly when an ancestor's end tag, the enclosing
//! block's `}` or the end of input is reached. Whitespace-only text is
//! dropped.

use crate::ast::*;
use crate::error::TemplateParseError;
use crate::expr::TemplateExpr;
use crate::expr_parser::{
    find_interpolation_end, parse_action, parse_binding, parse_interpolation,
    parse_template_bindings,
};
use ngl_source::{FileId, Span};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const BLOCK_NAMES: &[&str] = &[
    "if", "else", "for", "empty", "switch", "case", "default", "defer", "placeholder", "loading",
    "error", "let",
];

enum Container {
    Element(String),
    Block,
}

/// A block's `@name (params) {` header.
struct BlockHeader {
    name: String,
    params: Vec<(String, u32)>,
    start: usize,
}

pub(crate) struct HtmlParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    file: FileId,
    open: Vec<Container>,
}

impl<'a> HtmlParser<'a> {
    pub(crate) fn new(text: &'a str, file: FileId) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            file,
            open: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Template, TemplateParseError> {
        let nodes = self.parse_nodes()?;
        Ok(Template {
            nodes,
            span: Span::new(self.file, 0, self.text.len() as u32),
        })
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_at(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.text[self.pos..].starts_with(s)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.file, start as u32, end as u32)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn in_block(&self) -> bool {
        self.open.iter().any(|c| matches!(c, Container::Block))
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while !self.eof() && pred(self.peek()) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Parses sibling nodes up to the end of input, an end tag of an open
    /// element, or the `}` of an open block. The terminator is not consumed.
    fn parse_nodes(&mut self) -> Result<Vec<TemplateNode>, TemplateParseError> {
        let mut nodes = Vec::new();
        while !self.eof() {
            if self.starts_with("</") {
                let name = self.peek_end_tag_name();
                let is_open = self.open.iter().any(
                    |c| matches!(c, Container::Element(open) if open.eq_ignore_ascii_case(name)),
                );
                if is_open {
                    break;
                }
                return Err(TemplateParseError::UnexpectedClosingTag {
                    name: name.to_string(),
                    offset: self.pos as u32,
                });
            }
            if self.starts_with("<!--") {
                let start = self.pos;
                let end = self.text[self.pos..].find("-->").ok_or(TemplateParseError::Unterminated {
                    what: "comment",
                    offset: start as u32,
                })?;
                self.pos += end + 3;
                nodes.push(TemplateNode::Comment(self.span(start, self.pos)));
            } else if self.starts_with("<!") {
                let end = self.text[self.pos..].find('>').ok_or(TemplateParseError::Unterminated {
                    what: "declaration",
                    offset: self.pos as u32,
                })?;
                self.pos += end + 1;
            } else if self.peek() == b'<' && self.peek_at(1).is_ascii_alphabetic() {
                nodes.push(TemplateNode::Element(self.parse_element()?));
            } else if self.peek() == b'}' && self.in_block() {
                break;
            } else if let Some(name) = self.block_name_at_cursor() {
                if let Some(node) = self.parse_block(name)? {
                    nodes.push(node);
                }
            } else {
                self.parse_text(&mut nodes)?;
            }
        }
        Ok(nodes)
    }

    fn peek_end_tag_name(&self) -> &'a str {
        let rest = &self.text[self.pos + 2..];
        let len = rest
            .bytes()
            .position(|b| !is_tag_name_char(b))
            .unwrap_or(rest.len());
        &rest[..len]
    }

    fn parse_text(&mut self, nodes: &mut Vec<TemplateNode>) -> Result<(), TemplateParseError> {
        let start = self.pos;
        while !self.eof() {
            if self.starts_with("{{") {
                let body = self.pos + 2;
                let close = find_interpolation_end(&self.text[body..]).ok_or(
                    TemplateParseError::Unterminated {
                        what: "interpolation",
                        offset: self.pos as u32,
                    },
                )?;
                self.pos = body + close + 2;
                continue;
            }
            let b = self.peek();
            let stop = (b == b'<' && (self.peek_at(1).is_ascii_alphabetic() || matches!(self.peek_at(1), b'/' | b'!')))
                || (b == b'}' && self.in_block())
                || (b == b'@' && self.pos > start && self.block_name_at_cursor().is_some());
            if stop {
                break;
            }
            self.pos += 1;
            while !self.eof() && !self.text.is_char_boundary(self.pos) {
                self.pos += 1;
            }
        }
        if self.pos == start {
            // A lone `@` that does not start a known block.
            self.pos += 1;
        }
        let value = &self.text[start..self.pos];
        if value.trim().is_empty() {
            return Ok(());
        }
        let span = self.span(start, self.pos);
        match parse_interpolation(value, self.file, start as u32)? {
            Some(exprs) => nodes.push(TemplateNode::BoundText(BoundText {
                value: value.to_string(),
                exprs,
                span,
            })),
            None => nodes.push(TemplateNode::Text(Text {
                value: value.to_string(),
                span,
            })),
        }
        Ok(())
    }

    // ========================================================================
    // Elements
    // ========================================================================

    fn parse_element(&mut self) -> Result<Element, TemplateParseError> {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        let name = self.read_while(is_tag_name_char).to_string();
        let name_span = self.span(name_start, self.pos);

        let mut attributes = Vec::new();
        let self_closing = loop {
            self.skip_whitespace();
            if self.eof() {
                return Err(TemplateParseError::Unterminated {
                    what: "start tag",
                    offset: start as u32,
                });
            }
            if self.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if self.peek() == b'>' {
                self.pos += 1;
                break false;
            }
            if let Some(attr) = self.parse_attribute()? {
                attributes.push(attr);
            }
        };
        let start_span = self.span(start, self.pos);

        let lower = name.to_ascii_lowercase();
        let mut children = Vec::new();
        let mut end_span = None;
        if !self_closing && !VOID_ELEMENTS.contains(&lower.as_str()) {
            if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
                let close = format!("</{lower}");
                let rel = self.text[self.pos..]
                    .to_ascii_lowercase()
                    .find(&close)
                    .unwrap_or(self.text.len() - self.pos);
                let text_start = self.pos;
                self.pos += rel;
                let value = &self.text[text_start..self.pos];
                if !value.trim().is_empty() {
                    children.push(TemplateNode::Text(Text {
                        value: value.to_string(),
                        span: self.span(text_start, self.pos),
                    }));
                }
            } else {
                self.open.push(Container::Element(name.clone()));
                let parsed = self.parse_nodes();
                self.open.pop();
                children = parsed?;
            }
            if self.starts_with("</") && self.peek_end_tag_name().eq_ignore_ascii_case(&name) {
                let end_start = self.pos;
                let close = self.text[self.pos..].find('>').ok_or(TemplateParseError::Unterminated {
                    what: "end tag",
                    offset: end_start as u32,
                })?;
                self.pos += close + 1;
                end_span = Some(self.span(end_start, self.pos));
            }
        }

        Ok(Element {
            name,
            name_span,
            attributes,
            children,
            start_span,
            end_span,
            span: self.span(start, self.pos),
        })
    }

    fn parse_attribute(&mut self) -> Result<Option<Attribute>, TemplateParseError> {
        let start = self.pos;
        while !self.eof() {
            let b = self.peek();
            if b.is_ascii_whitespace()
                || b == b'='
                || b == b'>'
                || b == b'"'
                || b == b'\''
                || (b == b'/' && self.peek_at(1) == b'>')
            {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            // Stray `=` or quote.
            self.pos += 1;
            return Ok(None);
        }
        let raw_name = &self.text[start..self.pos];
        let name_span = self.span(start, self.pos);

        let after_name = self.pos;
        self.skip_whitespace();
        let value = if self.peek() == b'=' {
            self.pos += 1;
            self.skip_whitespace();
            Some(self.parse_attribute_value()?)
        } else {
            self.pos = after_name;
            None
        };

        let (kind, name) = classify_attribute(raw_name);
        let binding = match (&kind, &value) {
            (_, None) => AttributeBinding::None,
            (AttributeKind::Property | AttributeKind::TwoWay, Some(v)) => {
                AttributeBinding::Expr(parse_binding(&v.text, self.file, v.span.start)?)
            }
            (AttributeKind::Event, Some(v)) => {
                AttributeBinding::Action(parse_action(&v.text, self.file, v.span.start)?)
            }
            (AttributeKind::Structural, Some(v)) => {
                AttributeBinding::Template(parse_template_bindings(&v.text, self.file, v.span.start)?)
            }
            (AttributeKind::Static, Some(v)) => {
                match parse_interpolation(&v.text, self.file, v.span.start)? {
                    Some(exprs) => AttributeBinding::Interpolation(exprs),
                    None => AttributeBinding::None,
                }
            }
            (AttributeKind::Reference | AttributeKind::Let, Some(_)) => AttributeBinding::None,
        };

        Ok(Some(Attribute {
            kind,
            name: name.to_string(),
            name_span,
            value,
            binding,
            span: self.span(start, self.pos),
        }))
    }

    fn parse_attribute_value(&mut self) -> Result<AttributeValue, TemplateParseError> {
        let quote = self.peek();
        if quote == b'"' || quote == b'\'' {
            let open = self.pos;
            self.pos += 1;
            let start = self.pos;
            let len = self.text[start..]
                .find(quote as char)
                .ok_or(TemplateParseError::Unterminated {
                    what: "attribute value",
                    offset: open as u32,
                })?;
            self.pos = start + len + 1;
            return Ok(AttributeValue {
                text: self.text[start..start + len].to_string(),
                span: self.span(start, start + len),
                quote: Some(quote as char),
            });
        }
        let start = self.pos;
        let text = self.read_while(|b| !b.is_ascii_whitespace() && b != b'>').to_string();
        Ok(AttributeValue {
            text,
            span: self.span(start, self.pos),
            quote: None,
        })
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Returns the block name if the cursor is at `@name` for a known block.
    fn block_name_at_cursor(&self) -> Option<&'static str> {
        if self.peek() != b'@' {
            return None;
        }
        let rest = &self.text[self.pos + 1..];
        let len = rest
            .bytes()
            .position(|b| !b.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let word = &rest[..len];
        BLOCK_NAMES.iter().copied().find(|name| *name == word)
    }

    fn parse_block(&mut self, name: &str) -> Result<Option<TemplateNode>, TemplateParseError> {
        let start = self.pos;
        match name {
            "if" => self.parse_if_block().map(Some),
            "for" => self.parse_for_block().map(Some),
            "switch" => self.parse_switch_block().map(Some),
            "defer" => self.parse_defer_block().map(Some),
            "let" => self.parse_let_declaration().map(Some),
            other => Err(TemplateParseError::InvalidBlock {
                name: other.to_string(),
                message: "no preceding block to connect to".to_string(),
                offset: start as u32,
            }),
        }
    }

    fn parse_block_header(&mut self) -> Result<BlockHeader, TemplateParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut name = self.read_while(|b| b.is_ascii_alphabetic()).to_string();
        if name == "else" {
            let save = self.pos;
            self.skip_whitespace();
            if self.starts_with("if") && !self.peek_at(2).is_ascii_alphanumeric() {
                self.pos += 2;
                name = "else if".to_string();
            } else {
                self.pos = save;
            }
        }
        self.skip_whitespace();
        let mut params = Vec::new();
        if self.peek() == b'(' {
            let open = self.pos;
            let close = find_matching_paren(self.text, open).ok_or(TemplateParseError::Unterminated {
                what: "block parameters",
                offset: open as u32,
            })?;
            params = split_params(&self.text[open + 1..close], (open + 1) as u32);
            self.pos = close + 1;
            self.skip_whitespace();
        }
        if self.peek() != b'{' {
            return Err(TemplateParseError::InvalidBlock {
                name,
                message: "expected `{`".to_string(),
                offset: start as u32,
            });
        }
        self.pos += 1;
        Ok(BlockHeader {
            name,
            params,
            start,
        })
    }

    /// Parses block content after `{` through the closing `}`.
    fn parse_block_body(&mut self, header: &BlockHeader) -> Result<Vec<TemplateNode>, TemplateParseError> {
        self.open.push(Container::Block);
        let parsed = self.parse_nodes();
        self.open.pop();
        let children = parsed?;
        if self.peek() != b'}' {
            return Err(TemplateParseError::UnclosedBlock {
                name: header.name.clone(),
                offset: header.start as u32,
            });
        }
        self.pos += 1;
        Ok(children)
    }

    /// If the next non-whitespace input is `@name` for one of `names`,
    /// consumes the whitespace and returns the name.
    fn connected_block(&mut self, names: &[&str]) -> Option<&'static str> {
        let save = self.pos;
        self.skip_whitespace();
        match self.block_name_at_cursor() {
            Some(name) if names.contains(&name) => Some(name),
            _ => {
                self.pos = save;
                None
            }
        }
    }

    fn parse_if_block(&mut self) -> Result<TemplateNode, TemplateParseError> {
        let start = self.pos;
        let mut branches = Vec::new();
        let header = self.parse_block_header()?;
        branches.push(self.parse_if_branch(header)?);
        while self.connected_block(&["else"]).is_some() {
            let header = self.parse_block_header()?;
            let is_else = header.name == "else";
            branches.push(self.parse_if_branch(header)?);
            if is_else {
                break;
            }
        }
        Ok(TemplateNode::IfBlock(IfBlock {
            branches,
            span: self.span(start, self.pos),
        }))
    }

    fn parse_if_branch(&mut self, header: BlockHeader) -> Result<IfBranch, TemplateParseError> {
        let mut condition = None;
        let mut alias = None;
        if header.name != "else" {
            let Some((text, offset)) = header.params.first() else {
                return Err(self.invalid(&header, "missing condition"));
            };
            condition = Some(parse_binding(text, self.file, *offset)?);
            for (param, _) in &header.params[1..] {
                match param.strip_prefix("as") {
                    Some(rest) if rest.starts_with(char::is_whitespace) => {
                        alias = Some(rest.trim().to_string());
                    }
                    _ => return Err(self.invalid(&header, "unknown parameter")),
                }
            }
        } else if !header.params.is_empty() {
            return Err(self.invalid(&header, "`@else` takes no parameters"));
        }
        let children = self.parse_block_body(&header)?;
        Ok(IfBranch {
            condition,
            alias,
            children,
            span: self.span(header.start, self.pos),
        })
    }

    fn parse_for_block(&mut self) -> Result<TemplateNode, TemplateParseError> {
        let start = self.pos;
        let header = self.parse_block_header()?;
        let Some((first, first_offset)) = header.params.first() else {
            return Err(self.invalid(&header, "missing loop expression"));
        };
        let item_len = first
            .bytes()
            .position(|b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'$'))
            .unwrap_or(first.len());
        let item = first[..item_len].to_string();
        let rest = &first[item_len..];
        let trimmed = rest.trim_start();
        let Some(after_of) = trimmed.strip_prefix("of") else {
            return Err(self.invalid(&header, "expected `item of expression`"));
        };
        if item.is_empty() || !after_of.starts_with(char::is_whitespace) {
            return Err(self.invalid(&header, "expected `item of expression`"));
        }
        let expr_offset = first_offset + (first.len() - after_of.len()) as u32;
        let expression = parse_binding(after_of, self.file, expr_offset)?;

        let mut track = None;
        let mut context_aliases = Vec::new();
        for (param, offset) in &header.params[1..] {
            if let Some(rest) = param.strip_prefix("track") {
                let rest_offset = offset + 5;
                track = Some(parse_binding(rest, self.file, rest_offset)?);
            } else if let Some(rest) = param.strip_prefix("let") {
                for alias in rest.split(',') {
                    let name = alias.split('=').next().unwrap_or("").trim();
                    if !name.is_empty() {
                        context_aliases.push(name.to_string());
                    }
                }
            } else {
                return Err(self.invalid(&header, "unknown parameter"));
            }
        }
        let children = self.parse_block_body(&header)?;
        let empty = match self.connected_block(&["empty"]) {
            Some(_) => {
                let header = self.parse_block_header()?;
                Some(self.parse_block_body(&header)?)
            }
            None => None,
        };
        Ok(TemplateNode::ForBlock(ForBlock {
            item,
            expression,
            track,
            context_aliases,
            children,
            empty,
            span: self.span(start, self.pos),
        }))
    }

    fn parse_switch_block(&mut self) -> Result<TemplateNode, TemplateParseError> {
        let start = self.pos;
        let header = self.parse_block_header()?;
        let Some((text, offset)) = header.params.first() else {
            return Err(self.invalid(&header, "missing expression"));
        };
        let expression = parse_binding(text, self.file, *offset)?;
        let mut cases = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eof() {
                return Err(TemplateParseError::UnclosedBlock {
                    name: header.name,
                    offset: header.start as u32,
                });
            }
            if self.peek() == b'}' {
                self.pos += 1;
                break;
            }
            if self.starts_with("<!--") {
                let end = self.text[self.pos..].find("-->").ok_or(TemplateParseError::Unterminated {
                    what: "comment",
                    offset: self.pos as u32,
                })?;
                self.pos += end + 3;
                continue;
            }
            match self.block_name_at_cursor() {
                Some("case") | Some("default") => {
                    let case_header = self.parse_block_header()?;
                    let expression = if case_header.name == "case" {
                        let Some((text, offset)) = case_header.params.first() else {
                            return Err(self.invalid(&case_header, "missing case value"));
                        };
                        Some(parse_binding(text, self.file, *offset)?)
                    } else {
                        None
                    };
                    let children = self.parse_block_body(&case_header)?;
                    cases.push(SwitchCase {
                        expression,
                        children,
                        span: self.span(case_header.start, self.pos),
                    });
                }
                _ => {
                    return Err(self.invalid(
                        &header,
                        "`@switch` can only contain `@case` and `@default` blocks",
                    ))
                }
            }
        }
        Ok(TemplateNode::SwitchBlock(SwitchBlock {
            expression,
            cases,
            span: self.span(start, self.pos),
        }))
    }

    fn parse_defer_block(&mut self) -> Result<TemplateNode, TemplateParseError> {
        let start = self.pos;
        let header = self.parse_block_header()?;
        let mut triggers = Vec::new();
        self.collect_when_triggers(&header, &mut triggers)?;
        let children = self.parse_block_body(&header)?;
        let mut block = DeferBlock {
            triggers,
            children,
            placeholder: None,
            loading: None,
            error: None,
            span: Span::DUMMY,
        };
        while let Some(name) = self.connected_block(&["placeholder", "loading", "error"]) {
            let header = self.parse_block_header()?;
            let body = Some(self.parse_block_body(&header)?);
            match name {
                "placeholder" => block.placeholder = body,
                "loading" => block.loading = body,
                _ => block.error = body,
            }
        }
        block.span = self.span(start, self.pos);
        Ok(TemplateNode::DeferBlock(block))
    }

    fn collect_when_triggers(
        &self,
        header: &BlockHeader,
        triggers: &mut Vec<TemplateExpr>,
    ) -> Result<(), TemplateParseError> {
        for (param, offset) in &header.params {
            let mut words = param.split_whitespace();
            let first = words.next().unwrap_or("");
            let second = words.next().unwrap_or("");
            let prefixed = matches!(first, "prefetch" | "hydrate") && second == "when";
            if first != "when" && !prefixed {
                continue;
            }
            let Some(at) = param.find("when") else { continue };
            let expr_text = &param[at + 4..];
            triggers.push(parse_binding(expr_text, self.file, offset + (at + 4) as u32)?);
        }
        Ok(())
    }

    fn parse_let_declaration(&mut self) -> Result<TemplateNode, TemplateParseError> {
        let start = self.pos;
        self.pos += "@let".len();
        self.skip_whitespace();
        let name = self
            .read_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
            .to_string();
        self.skip_whitespace();
        if name.is_empty() || self.peek() != b'=' {
            return Err(TemplateParseError::InvalidBlock {
                name: "let".to_string(),
                message: "expected `name = expression`".to_string(),
                offset: start as u32,
            });
        }
        self.pos += 1;
        let value_start = self.pos;
        let end = find_statement_end(self.text, value_start).ok_or(TemplateParseError::Unterminated {
            what: "@let declaration",
            offset: start as u32,
        })?;
        let value = parse_binding(&self.text[value_start..end], self.file, value_start as u32)?;
        self.pos = end + 1;
        Ok(TemplateNode::LetDeclaration(LetDeclaration {
            name,
            value,
            span: self.span(start, self.pos),
        }))
    }

    fn invalid(&self, header: &BlockHeader, message: &str) -> TemplateParseError {
        TemplateParseError::InvalidBlock {
            name: header.name.clone(),
            message: message.to_string(),
            offset: header.start as u32,
        }
    }
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

/// Splits an attribute name into its binding kind and target name.
fn classify_attribute(raw: &str) -> (AttributeKind, &str) {
    let strip = |prefix: &str, suffix: &str| {
        raw.strip_prefix(prefix)
            .and_then(|r| r.strip_suffix(suffix))
    };
    if let Some(name) = strip("[(", ")]") {
        return (AttributeKind::TwoWay, name);
    }
    if let Some(name) = strip("[", "]") {
        return (AttributeKind::Property, name);
    }
    if let Some(name) = strip("(", ")") {
        return (AttributeKind::Event, name);
    }
    let prefixed = [
        ("*", AttributeKind::Structural),
        ("#", AttributeKind::Reference),
        ("bindon-", AttributeKind::TwoWay),
        ("bind-", AttributeKind::Property),
        ("on-", AttributeKind::Event),
        ("ref-", AttributeKind::Reference),
        ("let-", AttributeKind::Let),
    ];
    for (prefix, kind) in prefixed {
        if let Some(name) = raw.strip_prefix(prefix) {
            if !name.is_empty() {
                return (kind, name);
            }
        }
    }
    (AttributeKind::Static, raw)
}

/// Finds the `)` matching the `(` at `open`, skipping quoted strings.
fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Finds the `;` ending a `@let` value, skipping strings and brackets.
fn find_statement_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => return Some(i),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Splits block parameters on top-level `;`, trimming each one. Offsets are
/// those of the trimmed text.
fn split_params(text: &str, offset: u32) -> Vec<(String, u32)> {
    let bytes = text.as_bytes();
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut seg_start = 0usize;
    let push = |from: usize, to: usize, params: &mut Vec<(String, u32)>| {
        let seg = &text[from..to];
        let lead = seg.len() - seg.trim_start().len();
        let trimmed = seg.trim();
        if !trimmed.is_empty() {
            params.push((trimmed.to_string(), offset + (from + lead) as u32));
        }
    };
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => {
                    push(seg_start, i, &mut params);
                    seg_start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }
    push(seg_start, bytes.len(), &mut params);
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_template;

    fn file() -> FileId {
        FileId::from_raw(0)
    }

    fn parse(text: &str) -> Template {
        parse_template(text, file()).unwrap()
    }

    fn slice<'a>(text: &'a str, span: Span) -> &'a str {
        &text[span.start as usize..span.end as usize]
    }

    #[test]
    fn element_with_attributes() {
        let text = r#"<ion-item button="true" lines=full [disabled]="busy" (click)="save()" #item>Hi</ion-item>"#;
        let template = parse(text);
        let TemplateNode::Element(el) = &template.nodes[0] else { panic!("element") };
        assert_eq!(el.name, "ion-item");
        assert_eq!(el.attributes.len(), 5);
        let button = el.attribute(AttributeKind::Static, "button").unwrap();
        assert_eq!(slice(text, button.span), r#"button="true""#);
        assert_eq!(slice(text, button.value.as_ref().unwrap().span), "true");
        let lines = el.attribute(AttributeKind::Static, "lines").unwrap();
        assert_eq!(lines.value.as_ref().unwrap().quote, None);
        let disabled = el.attribute(AttributeKind::Property, "disabled").unwrap();
        assert!(matches!(disabled.binding, AttributeBinding::Expr(_)));
        let click = el.attribute(AttributeKind::Event, "click").unwrap();
        assert!(matches!(click.binding, AttributeBinding::Action(_)));
        assert_eq!(el.references().collect::<Vec<_>>(), ["item"]);
        assert!(el.end_span.is_some());
        assert!(matches!(el.children[0], TemplateNode::Text(_)));
    }

    #[test]
    fn valueless_attribute_span() {
        let text = "<ion-progress-bar value></ion-progress-bar>";
        let template = parse(text);
        let TemplateNode::Element(el) = &template.nodes[0] else { panic!("element") };
        let attr = &el.attributes[0];
        assert_eq!(slice(text, attr.span), "value");
        assert!(attr.value.is_none());
    }

    #[test]
    fn void_and_self_closing_elements() {
        let template = parse("<div><input type=text><br/><span/></div>");
        let TemplateNode::Element(div) = &template.nodes[0] else { panic!("element") };
        assert_eq!(div.children.len(), 3);
    }

    #[test]
    fn interpolation_in_text_and_attribute() {
        let text = r#"<p title="Hi {{ name }}">Count: {{ count }}</p>"#;
        let template = parse(text);
        let TemplateNode::Element(p) = &template.nodes[0] else { panic!("element") };
        assert!(matches!(p.attributes[0].binding, AttributeBinding::Interpolation(ref e) if e.len() == 1));
        let TemplateNode::BoundText(bound) = &p.children[0] else { panic!("bound text") };
        assert_eq!(slice(text, bound.exprs[0].span), "count");
    }

    #[test]
    fn interpolation_may_contain_angle_brackets_and_braces() {
        let template = parse("@if (a) { {{ a < b ? '}' : c }} }");
        let TemplateNode::IfBlock(block) = &template.nodes[0] else { panic!("if") };
        assert!(matches!(block.branches[0].children[0], TemplateNode::BoundText(_)));
    }

    #[test]
    fn if_else_chain() {
        let text = "@if (user(); as u) { <a/> } @else if (guest) { <b/> } @else { <c/> }";
        let template = parse(text);
        assert_eq!(template.nodes.len(), 1);
        let TemplateNode::IfBlock(block) = &template.nodes[0] else { panic!("if") };
        assert_eq!(block.branches.len(), 3);
        assert_eq!(block.branches[0].alias.as_deref(), Some("u"));
        assert_eq!(slice(text, block.branches[0].condition.as_ref().unwrap().span), "user()");
        assert!(block.branches[2].condition.is_none());
    }

    #[test]
    fn for_block() {
        let text = "@for (item of items(); track item.id; let i = $index, odd = $odd) { {{ item }} } @empty { none }";
        let template = parse(text);
        let TemplateNode::ForBlock(block) = &template.nodes[0] else { panic!("for") };
        assert_eq!(block.item, "item");
        assert_eq!(slice(text, block.expression.span), "items()");
        assert_eq!(slice(text, block.track.as_ref().unwrap().span), "item.id");
        assert_eq!(block.context_aliases, ["i", "odd"]);
        assert!(block.empty.is_some());
    }

    #[test]
    fn switch_block() {
        let text = "@switch (mode) { @case (modes.a) { A } <!-- x --> @case (modes.b) { B } @default { D } }";
        let template = parse(text);
        let TemplateNode::SwitchBlock(block) = &template.nodes[0] else { panic!("switch") };
        assert_eq!(slice(text, block.expression.span), "mode");
        assert_eq!(block.cases.len(), 3);
        assert!(block.cases[2].expression.is_none());
    }

    #[test]
    fn defer_block() {
        let text = "@defer (on viewport; when ready) { <x/> } @placeholder (minimum 500ms) { p } @loading { l } @error { e }";
        let template = parse(text);
        let TemplateNode::DeferBlock(block) = &template.nodes[0] else { panic!("defer") };
        assert_eq!(block.triggers.len(), 1);
        assert_eq!(slice(text, block.triggers[0].span), "ready");
        assert!(block.placeholder.is_some() && block.loading.is_some() && block.error.is_some());
    }

    #[test]
    fn let_declaration() {
        let text = "@let total = price() * qty; <p>{{ total }}</p>";
        let template = parse(text);
        let TemplateNode::LetDeclaration(decl) = &template.nodes[0] else { panic!("let") };
        assert_eq!(decl.name, "total");
        assert_eq!(slice(text, decl.value.span), "price() * qty");
    }

    #[test]
    fn implicit_close_by_ancestor_end_tag() {
        let template = parse("<ul><li>a<li>b</ul>");
        let TemplateNode::Element(ul) = &template.nodes[0] else { panic!("element") };
        assert!(ul.end_span.is_some());
        assert_eq!(ul.children.len(), 1);
    }

    #[test]
    fn structural_directive() {
        let template = parse(r#"<li *ngFor="let item of items; let i = index">{{ item }}</li>"#);
        let TemplateNode::Element(li) = &template.nodes[0] else { panic!("element") };
        assert_eq!(li.attributes[0].kind, AttributeKind::Structural);
        assert_eq!(li.attributes[0].name, "ngFor");
        assert_eq!(li.template_locals(), ["item", "i"]);
    }

    #[test]
    fn stray_at_and_braces_are_text() {
        let template = parse("mail me @ home {x}");
        assert!(matches!(template.nodes[0], TemplateNode::Text(_)));
    }

    #[test]
    fn errors() {
        assert!(matches!(
            parse_template("<div></span>", file()),
            Err(TemplateParseError::UnexpectedClosingTag { .. })
        ));
        assert!(matches!(
            parse_template("@if (a) { <p>", file()),
            Err(TemplateParseError::UnclosedBlock { .. })
        ));
        assert!(matches!(
            parse_template("@else { }", file()),
            Err(TemplateParseError::InvalidBlock { .. })
        ));
        assert!(matches!(
            parse_template("<a [x]=\"1 +\"></a>", file()),
            Err(TemplateParseError::Expression { .. })
        ));
        assert!(matches!(
            parse_template("<a title=\"x></a>", file()),
            Err(TemplateParseError::Unterminated { .. })
        ));
    }

    #[test]
    fn classify() {
        assert_eq!(classify_attribute("[(ngModel)]"), (AttributeKind::TwoWay, "ngModel"));
        assert_eq!(classify_attribute("[attr.aria-label]"), (AttributeKind::Property, "attr.aria-label"));
        assert_eq!(classify_attribute("on-click"), (AttributeKind::Event, "click"));
        assert_eq!(classify_attribute("let-row"), (AttributeKind::Let, "row"));
        assert_eq!(classify_attribute("lines"), (AttributeKind::Static, "lines"));
    }

    #[test]
    fn split_params_offsets() {
        let params = split_params(" item of items ; track item.id ", 10);
        assert_eq!(params, [("item of items".to_string(), 11), ("track item.id".to_string(), 27)]);
    }
}
