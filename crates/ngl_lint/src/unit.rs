//! Loading a TypeScript file and the templates of its components.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ngl_diagnostics::{DiagnosticSink, SuggestedFix};
use ngl_source::fs::resolve_relative;
use ngl_source::{FileId, FileSystem, SourceDb, Span};
use ngl_template_parser::{parse_template, Relocate, Template};
use ngl_ts_parser::ast::{ClassDecl, Expr, ExprKind, Program};
use tracing::{debug, warn};

use crate::helpers::{component_metadata, is_component, metadata_value};

/// Where a component template came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// A string literal in the `template` metadata property.
    Inline {
        /// Span of the literal, quotes included.
        literal: Span,
        /// Whether the cooked text equals the raw text, so template offsets
        /// map one-to-one onto the literal.
        verbatim: bool,
    },
    /// A file named by `templateUrl`.
    External {
        /// The template file.
        file: FileId,
        /// Its resolved path.
        path: PathBuf,
    },
}

/// The parsed template of one component class.
#[derive(Debug)]
pub struct ComponentTemplate {
    /// Span of the owning class declaration.
    pub class_span: Span,
    /// The template, with spans in the file that holds its text.
    pub template: Template,
    /// Where the text came from.
    pub origin: TemplateOrigin,
}

impl ComponentTemplate {
    /// The file template spans point into.
    pub fn file(&self) -> FileId {
        match &self.origin {
            TemplateOrigin::Inline { literal, .. } => literal.file,
            TemplateOrigin::External { file, .. } => *file,
        }
    }

    /// Whether template spans are exact source positions.
    pub fn is_fixable(&self) -> bool {
        !matches!(self.origin, TemplateOrigin::Inline { verbatim: false, .. })
    }

    /// The span to report a template problem at.
    ///
    /// Inline templates with escape sequences report at the whole literal.
    pub fn report_span(&self, span: Span) -> Span {
        match &self.origin {
            TemplateOrigin::Inline {
                literal,
                verbatim: false,
            } => *literal,
            _ => span,
        }
    }

    /// Passes `fix` through when template spans are exact.
    pub fn fix(&self, fix: SuggestedFix) -> Option<SuggestedFix> {
        self.is_fixable().then_some(fix)
    }
}

/// One TypeScript file ready for linting.
#[derive(Debug)]
pub struct LintUnit {
    /// The TypeScript file.
    pub file: FileId,
    /// Its path.
    pub path: PathBuf,
    /// The parsed file.
    pub program: Program,
    /// Templates of the `@Component` classes that have one.
    pub templates: Vec<ComponentTemplate>,
    texts: HashMap<FileId, Arc<str>>,
}

impl LintUnit {
    /// Parses `file` and the templates of its components.
    ///
    /// Lexer and parser errors go to `sink`. A template that cannot be read
    /// or parsed is logged and left out; the class is still checked by the
    /// code-side rules.
    pub fn load(
        source_db: &mut SourceDb,
        fs: &dyn FileSystem,
        file: FileId,
        sink: &DiagnosticSink,
    ) -> Self {
        let (path, text): (PathBuf, Arc<str>) = {
            let source = source_db.get_file(file);
            (source.path.clone(), Arc::from(source.content.as_str()))
        };
        let program = ngl_ts_parser::parse_source(&text, file, sink);

        let mut texts = HashMap::new();
        texts.insert(file, Arc::clone(&text));
        let mut templates = Vec::new();
        for class in program.classes().filter(|c| is_component(c)) {
            if let Some(template) = load_template(class, &path, source_db, fs, &mut texts) {
                templates.push(template);
            }
        }
        debug!(path = %path.display(), templates = templates.len(), "loaded lint unit");

        Self {
            file,
            path,
            program,
            templates,
            texts,
        }
    }

    /// The text of the TypeScript file.
    pub fn source(&self) -> &str {
        self.texts.get(&self.file).map_or("", |t| &**t)
    }

    /// The source text under `span`, in the TypeScript file or a template.
    pub fn text(&self, span: Span) -> &str {
        self.texts
            .get(&span.file)
            .and_then(|t| t.get(span.start as usize..span.end as usize))
            .unwrap_or("")
    }

    /// Top-level classes decorated with `@Component`.
    pub fn components(&self) -> impl Iterator<Item = &ClassDecl> {
        self.program.classes().filter(|c| is_component(c))
    }

    /// The template of `class`, if it has one that loaded.
    pub fn template_of(&self, class: &ClassDecl) -> Option<&ComponentTemplate> {
        self.templates.iter().find(|t| t.class_span == class.span)
    }

    /// Leading whitespace of the line `span` starts on.
    pub fn indentation_at(&self, span: Span) -> &str {
        let text = self.texts.get(&span.file).map_or("", |t| &**t);
        let offset = (span.start as usize).min(text.len());
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = &text[line_start..];
        let width = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..width]
    }
}

fn load_template(
    class: &ClassDecl,
    ts_path: &Path,
    source_db: &mut SourceDb,
    fs: &dyn FileSystem,
    texts: &mut HashMap<FileId, Arc<str>>,
) -> Option<ComponentTemplate> {
    let metadata = component_metadata(class)?;
    let class_name = class.name.as_ref().map_or("<anonymous>", |n| n.name.as_str());

    if let Some(expr) = metadata_value(metadata, "template") {
        let Some((text, content_start, verbatim)) = inline_text(expr) else {
            warn!(class = class_name, "inline template is not a plain string literal; skipped");
            return None;
        };
        let mut template = match parse_template(&text, expr.span.file) {
            Ok(t) => t,
            Err(err) => {
                warn!(class = class_name, offset = err.offset(), error = %err, "failed to parse inline template");
                return None;
            }
        };
        template.relocate(expr.span.file, content_start);
        return Some(ComponentTemplate {
            class_span: class.span,
            template,
            origin: TemplateOrigin::Inline {
                literal: expr.span,
                verbatim,
            },
        });
    }

    let url = metadata_value(metadata, "templateUrl")?.as_static_string()?;
    let path = resolve_relative(ts_path, url);
    let file = match source_db.load_file(fs, &path) {
        Ok(file) => file,
        Err(err) => {
            warn!(class = class_name, path = %path.display(), error = %err, "failed to read template");
            return None;
        }
    };
    let text: Arc<str> = Arc::from(source_db.get_file(file).content.as_str());
    let template = match parse_template(&text, file) {
        Ok(t) => t,
        Err(err) => {
            warn!(path = %path.display(), offset = err.offset(), error = %err, "failed to parse template");
            return None;
        }
    };
    texts.insert(file, text);
    Some(ComponentTemplate {
        class_span: class.span,
        template,
        origin: TemplateOrigin::External { file, path },
    })
}

/// The cooked text of an inline template, the offset of its first character
/// in the file, and whether cooked equals raw.
fn inline_text(expr: &Expr) -> Option<(String, u32, bool)> {
    match &expr.kind {
        ExprKind::Str { value, verbatim } => Some((value.clone(), expr.span.start + 1, *verbatim)),
        ExprKind::Template { quasis, exprs } if exprs.is_empty() => {
            let quasi = quasis.first()?;
            Some((quasi.cooked.clone(), quasi.span.start, quasi.cooked == quasi.raw))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngl_source::MemoryFileSystem;
    use ngl_template_parser::TemplateNode;

    fn load(source: &str, fs: &MemoryFileSystem) -> (SourceDb, LintUnit, DiagnosticSink) {
        let mut db = SourceDb::new();
        let file = db.add_source("/app/src/home.page.ts", source.to_string());
        let sink = DiagnosticSink::new();
        let unit = LintUnit::load(&mut db, fs, file, &sink);
        (db, unit, sink)
    }

    #[test]
    fn inline_template_is_relocated_into_the_ts_file() {
        let src = "@Component({ template: `<p>{{ count }}</p>` })\nexport class A {}\n";
        let (_, unit, sink) = load(src, &MemoryFileSystem::new());
        assert!(sink.is_empty());
        assert_eq!(unit.templates.len(), 1);
        let template = &unit.templates[0];
        assert!(template.is_fixable());
        assert_eq!(template.file(), unit.file);
        let TemplateNode::Element(p) = &template.template.nodes[0] else {
            panic!("element")
        };
        assert_eq!(unit.text(p.span), "<p>{{ count }}</p>");
    }

    #[test]
    fn quoted_inline_template() {
        let src = "@Component({ template: '<ion-item></ion-item>' })\nclass A {}\n";
        let (_, unit, _) = load(src, &MemoryFileSystem::new());
        let el = &unit.templates[0].template.elements()[0];
        assert_eq!(unit.text(el.span), "<ion-item></ion-item>");
    }

    #[test]
    fn escaped_inline_template_reports_at_literal() {
        let src = "@Component({ template: '<p title=\\'x\\'>{{ a }}</p>' })\nclass A {}\n";
        let (_, unit, _) = load(src, &MemoryFileSystem::new());
        let template = &unit.templates[0];
        assert!(!template.is_fixable());
        let TemplateOrigin::Inline { literal, .. } = template.origin else {
            panic!("inline")
        };
        assert_eq!(template.report_span(Span::DUMMY), literal);
    }

    #[test]
    fn external_template_resolved_relative_to_class_file() {
        let fs = MemoryFileSystem::new()
            .with_file("/app/src/home.page.html", "<ion-content></ion-content>");
        let src = "@Component({ templateUrl: './home.page.html' })\nclass A {}\n";
        let (db, unit, _) = load(src, &fs);
        let template = &unit.templates[0];
        let TemplateOrigin::External { file, path } = &template.origin else {
            panic!("external")
        };
        assert_eq!(path, Path::new("/app/src/home.page.html"));
        assert_eq!(db.get_file(*file).content, "<ion-content></ion-content>");
        let el = &template.template.elements()[0];
        assert_eq!(unit.text(el.name_span), "ion-content");
    }

    #[test]
    fn missing_or_broken_templates_are_skipped() {
        let src = "@Component({ templateUrl: './gone.html' })\nclass A {}\n\
                   @Component({ template: '<p>{{ a </p>' })\nclass B {}\n";
        let (_, unit, sink) = load(src, &MemoryFileSystem::new());
        assert!(unit.templates.is_empty());
        assert!(sink.is_empty());
        assert_eq!(unit.components().count(), 2);
    }

    #[test]
    fn non_components_have_no_template() {
        let src = "@Injectable()\nclass S {}\nclass Plain {}\n";
        let (_, unit, _) = load(src, &MemoryFileSystem::new());
        assert_eq!(unit.components().count(), 0);
        assert!(unit.templates.is_empty());
    }

    #[test]
    fn indentation_of_line() {
        let src = "class A {\n    constructor() {}\n}\n";
        let (_, unit, _) = load(src, &MemoryFileSystem::new());
        let at = src.find("constructor").unwrap() as u32;
        assert_eq!(unit.indentation_at(Span::point(unit.file, at)), "    ");
    }
}
