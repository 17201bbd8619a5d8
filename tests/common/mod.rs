use std::collections::HashMap;

use chic_intercept::diagnostics::{FileId, SourceFiles, Span};
use chic_intercept::intercept::{CallBinder, CallScope, InvocationShape, NameBinding};
use chic_intercept::pathmap::PathMap;
use chic_intercept::symbols::{MethodId, MethodSymbol, MethodTable};
use chic_intercept::tokens::{Token, TokenKind};
use chic_intercept::Compilation;

const KEYWORDS: &[&str] = &["class", "nameof", "new", "return", "var"];

// Minimal lexer for fixtures: identifiers/keywords, line comments,
// whitespace runs, and single-character punctuation. Token spans are what
// the position locator addresses, so they must be byte-exact.
#[allow(dead_code)]
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        let mut end = start + ch.len_utf8();
        if ch.is_alphanumeric() || ch == '_' {
            while let Some(&(idx, next)) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    chars.next();
                    end = idx + next.len_utf8();
                } else {
                    break;
                }
            }
            let text = &source[start..end];
            let kind = if ch.is_ascii_digit() {
                TokenKind::NumberLiteral
            } else if KEYWORDS.contains(&text) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, text, Span::new(start, end)));
        } else if ch.is_whitespace() {
            while let Some(&(idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    chars.next();
                    end = idx + next.len_utf8();
                } else {
                    break;
                }
            }
            tokens.push(Token::new(
                TokenKind::Whitespace,
                &source[start..end],
                Span::new(start, end),
            ));
        } else if ch == '/' && matches!(chars.peek(), Some(&(_, '/'))) {
            while let Some(&(idx, next)) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
                end = idx + next.len_utf8();
            }
            tokens.push(Token::new(
                TokenKind::Comment,
                &source[start..end],
                Span::new(start, end),
            ));
        } else {
            tokens.push(Token::new(
                TokenKind::Punctuation(ch),
                &source[start..end],
                Span::new(start, end),
            ));
        }
    }
    tokens
}

/// Binder stub backed by explicit per-offset bindings.
#[derive(Default)]
pub struct MapBinder {
    bindings: HashMap<(FileId, usize), NameBinding>,
    derivations: Vec<(String, String)>,
}

#[allow(dead_code)]
impl MapBinder {
    pub fn bind(&mut self, file: FileId, offset: usize, binding: NameBinding) {
        self.bindings.insert((file, offset), binding);
    }

    pub fn bind_ordinary(&mut self, file: FileId, offset: usize, target: MethodId) {
        self.bind_ordinary_in_scope(file, offset, target, CallScope::default());
    }

    pub fn bind_ordinary_in_scope(
        &mut self,
        file: FileId,
        offset: usize,
        target: MethodId,
        scope: CallScope,
    ) {
        self.bind(
            file,
            offset,
            NameBinding::Invocation(InvocationShape::Ordinary { target, scope }),
        );
    }

    pub fn add_derivation(&mut self, derived: impl Into<String>, base: impl Into<String>) {
        self.derivations.push((derived.into(), base.into()));
    }
}

impl CallBinder for MapBinder {
    fn bind_name(&self, file: FileId, span: Span) -> NameBinding {
        self.bindings
            .get(&(file, span.start))
            .cloned()
            .unwrap_or(NameBinding::NotInvoked)
    }

    fn is_derived_from(&self, candidate: &str, base: &str) -> bool {
        candidate == base
            || self
                .derivations
                .iter()
                .any(|(derived, parent)| derived == candidate && parent == base)
    }
}

/// A compilation under construction: files, symbols, bindings, path map.
#[derive(Default)]
pub struct Fixture {
    pub files: SourceFiles,
    pub path_map: PathMap,
    pub methods: MethodTable,
    pub binder: MapBinder,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, source: &str) -> FileId {
        let tokens = lex(source);
        self.files.add_file(path, source, tokens)
    }

    pub fn add_method(&mut self, method: MethodSymbol) -> MethodId {
        self.methods.add(method)
    }

    /// Register an ordinary bound call at the only occurrence of `name`
    /// in the file, returning the byte offset of the name's start.
    pub fn bind_call(&mut self, file: FileId, name: &str, target: MethodId) -> usize {
        let offset = self.name_offset(file, name);
        self.binder.bind_ordinary(file, offset, target);
        offset
    }

    /// Byte offset of the only occurrence of `name` in the file.
    pub fn name_offset(&self, file: FileId, name: &str) -> usize {
        let source = self
            .files
            .get(file)
            .unwrap_or_else(|| panic!("unknown file {file:?}"))
            .source();
        let first = source
            .find(name)
            .unwrap_or_else(|| panic!("`{name}` not present in fixture source"));
        assert_eq!(
            source[first + name.len()..].find(name),
            None,
            "`{name}` occurs more than once; bind by explicit offset instead"
        );
        first
    }

    pub fn compilation(&self) -> Compilation<'_> {
        Compilation {
            files: &self.files,
            path_map: &self.path_map,
            methods: &self.methods,
        }
    }
}

/// Codes of the diagnostics in emission order.
#[allow(dead_code)]
pub fn codes(resolution: &chic_intercept::Resolution) -> Vec<String> {
    resolution
        .diagnostics
        .iter()
        .map(|diagnostic| {
            diagnostic
                .code
                .as_ref()
                .map(|code| code.code.clone())
                .unwrap_or_default()
        })
        .collect()
}
