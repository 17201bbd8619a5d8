//! Compilation-wide registry of validated interceptions.
//!
//! Duplicate detection is deliberately two-phase: every validated pair is
//! collected first, and conflicts are decided only once the whole
//! compilation has been processed, so the first declaration of a conflict
//! is reported alongside the later ones and the outcome does not depend
//! on discovery order.

use std::collections::BTreeMap;

use crate::diagnostics::{DiagnosticSink, FileId, Label, LineCol, Span};
use crate::intercept::diagnostics::{self, codes};
use crate::symbols::{MethodId, MethodTable};

/// Identity of a call site: the file and the byte offset of the first
/// character of the invoked name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSiteKey {
    pub file: FileId,
    pub offset: usize,
}

/// One validated (call site, interceptor) pair awaiting finalization.
#[derive(Clone, Debug)]
pub struct Registration {
    pub key: CallSiteKey,
    pub position: LineCol,
    pub target: MethodId,
    pub interceptor: MethodId,
    /// Declaration site, for conflict diagnostics.
    pub declaration_span: Span,
}

/// Collect-then-finalize arena of registrations.
#[derive(Debug, Default)]
pub struct InterceptionRegistry {
    registrations: Vec<Registration>,
}

impl InterceptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Group registrations by call-site identity; singleton groups become
    /// map entries, larger groups report every member as a duplicate and
    /// contribute nothing to the map.
    #[must_use]
    pub fn finalize(self, methods: &MethodTable, sink: &mut DiagnosticSink) -> InterceptionMap {
        let mut groups: BTreeMap<CallSiteKey, Vec<Registration>> = BTreeMap::new();
        for registration in self.registrations {
            groups.entry(registration.key).or_default().push(registration);
        }

        let mut entries = BTreeMap::new();
        for (key, group) in groups {
            if let [single] = group.as_slice() {
                entries.insert(key, single.interceptor);
                continue;
            }
            for registration in &group {
                let target_name = methods
                    .get(registration.target)
                    .map_or_else(|| "<unknown>".to_string(), |method| method.display_name());
                let mut diagnostic = diagnostics::error(
                    codes::DUPLICATE_INTERCEPTOR,
                    format!(
                        "call to `{target_name}` at line {}, character {} is intercepted by {} declarations",
                        registration.position.line,
                        registration.position.column,
                        group.len()
                    ),
                    Some(registration.declaration_span),
                );
                for other in &group {
                    if other.declaration_span != registration.declaration_span {
                        diagnostic = diagnostic.with_secondary(Label::secondary(
                            other.declaration_span,
                            "conflicting interception declared here",
                        ));
                    }
                }
                sink.push(diagnostic);
            }
        }
        InterceptionMap { entries }
    }
}

/// Finalized artifact handed to code generation: the conflict-free subset
/// of call sites and their chosen interceptors.
#[derive(Clone, Debug, Default)]
pub struct InterceptionMap {
    entries: BTreeMap<CallSiteKey, MethodId>,
}

impl InterceptionMap {
    /// The interceptor for the call whose invoked name starts at `offset`
    /// in `file`, when one was registered.
    #[must_use]
    pub fn interceptor_for(&self, file: FileId, offset: usize) -> Option<MethodId> {
        self.entries.get(&CallSiteKey { file, offset }).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CallSiteKey, MethodId)> + '_ {
        self.entries.iter().map(|(key, method)| (*key, *method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::MethodSymbol;

    fn registration(offset: usize, interceptor: usize, span_start: usize) -> Registration {
        Registration {
            key: CallSiteKey {
                file: FileId(0),
                offset,
            },
            position: LineCol { line: 1, column: offset + 1 },
            target: MethodId(0),
            interceptor: MethodId(interceptor),
            declaration_span: Span::new(span_start, span_start + 10),
        }
    }

    fn methods() -> MethodTable {
        let mut table = MethodTable::new();
        table.add(MethodSymbol::ordinary("Target"));
        table
    }

    #[test]
    fn single_registrations_reach_the_map() {
        let mut registry = InterceptionRegistry::new();
        registry.record(registration(4, 1, 100));
        let mut sink = DiagnosticSink::new("intercept");
        let map = registry.finalize(&methods(), &mut sink);
        assert!(sink.is_empty());
        assert_eq!(map.interceptor_for(FileId(0), 4), Some(MethodId(1)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn conflicts_report_every_declaration_and_register_nothing() {
        let mut registry = InterceptionRegistry::new();
        registry.record(registration(4, 1, 100));
        registry.record(registration(4, 2, 200));
        registry.record(registration(4, 3, 300));
        let mut sink = DiagnosticSink::new("intercept");
        let map = registry.finalize(&methods(), &mut sink);

        let diagnostics = sink.into_vec();
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|diagnostic| {
            diagnostic.code.as_ref().map(|code| code.code.as_str()) == Some("ICP0401")
        }));
        // Each report points at the two competing declarations.
        assert!(diagnostics
            .iter()
            .all(|diagnostic| diagnostic.secondary_labels.len() == 2));
        assert_eq!(map.interceptor_for(FileId(0), 4), None);
        assert!(map.is_empty());
    }

    #[test]
    fn conflicts_do_not_leak_across_call_sites() {
        let mut registry = InterceptionRegistry::new();
        registry.record(registration(4, 1, 100));
        registry.record(registration(4, 2, 200));
        registry.record(registration(90, 3, 300));
        let mut sink = DiagnosticSink::new("intercept");
        let map = registry.finalize(&methods(), &mut sink);
        assert_eq!(sink.into_vec().len(), 2);
        assert_eq!(map.interceptor_for(FileId(0), 90), Some(MethodId(3)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn repeated_attribute_on_one_method_is_still_a_duplicate() {
        let mut registry = InterceptionRegistry::new();
        // Same interceptor, same call site, two physical declarations.
        registry.record(registration(4, 1, 100));
        registry.record(registration(4, 1, 140));
        let mut sink = DiagnosticSink::new("intercept");
        let map = registry.finalize(&methods(), &mut sink);
        assert_eq!(sink.into_vec().len(), 2);
        assert!(map.is_empty());
    }
}
