//! Call-site interception resolution.
//!
//! One deterministic pass over an immutable, fully-bound compilation
//! snapshot: each `@intercepts` declaration is resolved to a call site
//! (path → position → classification), its interceptor validated against
//! the bound target, and the surviving pairs reduced into the final
//! call-site → interceptor map. Failures never abort the pass; every
//! diagnostic is collected and surfaced together.

pub mod classify;
pub mod diagnostics;
pub mod locate;
pub mod location;
pub mod paths;
pub mod registry;
pub mod validate;

use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticSink, FileId, SourceFiles, Span, Suggestion};
use crate::pathmap::PathMap;
use crate::symbols::{MethodId, MethodTable};

pub use classify::{
    CallBinder, CallScope, CallSite, ClassificationError, InvocationShape, NameBinding,
};
pub use locate::PositionError;
pub use location::{ChecksumError, InterceptableLocation, interceptable_location};
pub use paths::PathError;
pub use registry::{CallSiteKey, InterceptionMap, InterceptionRegistry, Registration};
pub use validate::{
    CompatibilityOutcome, Mismatch, ParamPosition, SoftMismatch, SoftMismatchKind,
};

use classify::classify;
use diagnostics::codes;
use locate::{locate, locate_offset};
use location::resolve_checksum;
use paths::resolve;
use validate::validate;

/// How a declaration addresses its target call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationSpec {
    /// Path/line/character addressing. `path: None` models a null
    /// literal in the annotation.
    Path {
        path: Option<String>,
        line: i32,
        character: i32,
    },
    /// Durable checksum addressing (see [`location`]).
    Checksum { version: i32, data: String },
}

/// One `@intercepts` annotation, as attribute decoding discovered it.
#[derive(Clone, Debug)]
pub struct InterceptionDeclaration {
    pub interceptor: MethodId,
    pub target: LocationSpec,
    /// Span of the annotation itself, for diagnostics.
    pub site: Span,
    /// Interception never crosses compilation boundaries: declarations
    /// observed through metadata or attribute inheritance are inert.
    pub declared_in_compilation: bool,
}

impl InterceptionDeclaration {
    #[must_use]
    pub fn at_path(
        interceptor: MethodId,
        path: impl Into<String>,
        line: i32,
        character: i32,
        site: Span,
    ) -> Self {
        Self {
            interceptor,
            target: LocationSpec::Path {
                path: Some(path.into()),
                line,
                character,
            },
            site,
            declared_in_compilation: true,
        }
    }

    #[must_use]
    pub fn at_checksum(interceptor: MethodId, version: i32, data: impl Into<String>, site: Span) -> Self {
        Self {
            interceptor,
            target: LocationSpec::Checksum {
                version,
                data: data.into(),
            },
            site,
            declared_in_compilation: true,
        }
    }

    #[must_use]
    pub fn from_metadata(mut self) -> Self {
        self.declared_in_compilation = false;
        self
    }
}

/// Immutable inputs of the pass.
#[derive(Clone, Copy, Debug)]
pub struct Compilation<'a> {
    pub files: &'a SourceFiles,
    pub path_map: &'a PathMap,
    pub methods: &'a MethodTable,
}

/// Result of the pass: the conflict-free map plus the diagnostic stream,
/// in declaration order followed by registry conflicts.
#[derive(Debug)]
pub struct Resolution {
    pub map: InterceptionMap,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// The interceptor for the invocation whose name starts at `offset`
    /// in `file`, when one survived resolution.
    #[must_use]
    pub fn interceptor_for(&self, file: FileId, offset: usize) -> Option<MethodId> {
        self.map.interceptor_for(file, offset)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity.is_error())
    }
}

/// Resolve every interception declaration in the compilation.
#[must_use]
pub fn resolve_interceptions(
    compilation: &Compilation<'_>,
    declarations: &[InterceptionDeclaration],
    binder: &dyn CallBinder,
) -> Resolution {
    let mut sink = DiagnosticSink::new("intercept");
    let mut registry = InterceptionRegistry::new();

    for declaration in declarations {
        if !declaration.declared_in_compilation {
            trace!(interceptor = declaration.interceptor.0, "skipping metadata declaration");
            continue;
        }
        process_declaration(compilation, declaration, binder, &mut sink, &mut registry);
    }

    debug!(
        declarations = declarations.len(),
        registrations = registry.len(),
        "finalizing interception registry"
    );
    let map = registry.finalize(compilation.methods, &mut sink);
    debug!(interceptions = map.len(), errors = sink.error_count(), "interception pass complete");

    Resolution {
        map,
        diagnostics: sink.into_vec(),
    }
}

fn process_declaration(
    compilation: &Compilation<'_>,
    declaration: &InterceptionDeclaration,
    binder: &dyn CallBinder,
    sink: &mut DiagnosticSink,
    registry: &mut InterceptionRegistry,
) {
    let site = Some(declaration.site);

    // Address the declared location down to a name token.
    let located = match &declaration.target {
        LocationSpec::Path {
            path,
            line,
            character,
        } => {
            let file_id = match resolve(compilation.files, compilation.path_map, path.as_deref()) {
                Ok(file_id) => file_id,
                Err(error) => {
                    sink.push(path_diagnostic(&error, declaration.site));
                    return;
                }
            };
            let Some(file) = compilation.files.get(file_id) else {
                return;
            };
            match locate(file, *line, *character) {
                Ok(token) => Some((file, token)),
                Err(error) => {
                    sink.push(position_diagnostic(&error, declaration.site));
                    None
                }
            }
        }
        LocationSpec::Checksum { version, data } => {
            match resolve_checksum(compilation.files, *version, data) {
                Ok((file_id, offset)) => {
                    let Some(file) = compilation.files.get(file_id) else {
                        return;
                    };
                    if file.line_col(offset).is_none() {
                        sink.push(diagnostics::error(
                            codes::INVALID_CHECKSUM_LOCATION,
                            "interception location data is malformed".to_string(),
                            site,
                        ));
                        None
                    } else {
                        match locate_offset(file, offset) {
                            Ok(token) => Some((file, token)),
                            Err(error) => {
                                sink.push(position_diagnostic(&error, declaration.site));
                                None
                            }
                        }
                    }
                }
                Err(error) => {
                    sink.push(diagnostics::error(
                        codes::INVALID_CHECKSUM_LOCATION,
                        error.to_string(),
                        site,
                    ));
                    None
                }
            }
        }
    };
    let Some((file, token)) = located else {
        return;
    };

    let call_site = match classify(binder, file, token) {
        Ok(call_site) => call_site,
        Err(error) => {
            let code = match error {
                ClassificationError::NameNotInvoked { .. } => codes::NAME_NOT_INVOKED,
                ClassificationError::MustBeOrdinaryMethod { .. } => codes::MUST_BE_ORDINARY_CALL,
            };
            sink.push(diagnostics::error(code, error.to_string(), site));
            return;
        }
    };

    let Some(interceptor) = compilation.methods.get(declaration.interceptor) else {
        trace!(interceptor = declaration.interceptor.0, "interceptor symbol missing from table");
        return;
    };
    let Some(target) = compilation.methods.get(call_site.target) else {
        trace!(target = call_site.target.0, "target symbol missing from table");
        return;
    };

    let interceptor_name = interceptor.display_name();
    match validate(interceptor, target, &call_site.scope, binder) {
        CompatibilityOutcome::Incompatible(mismatch) => {
            sink.push(hard_mismatch_diagnostic(
                &mismatch,
                &interceptor_name,
                declaration.site,
            ));
        }
        CompatibilityOutcome::CompatibleWithWarning(warnings) => {
            for warning in &warnings {
                sink.push(soft_mismatch_diagnostic(
                    warning,
                    &interceptor_name,
                    declaration.site,
                ));
            }
            record(registry, &call_site, declaration);
        }
        CompatibilityOutcome::Compatible => {
            record(registry, &call_site, declaration);
        }
    }
}

fn record(
    registry: &mut InterceptionRegistry,
    call_site: &CallSite,
    declaration: &InterceptionDeclaration,
) {
    registry.record(Registration {
        key: CallSiteKey {
            file: call_site.file,
            offset: call_site.span.start,
        },
        position: call_site.position,
        target: call_site.target,
        interceptor: declaration.interceptor,
        declaration_span: declaration.site,
    });
}

fn path_diagnostic(error: &PathError, site: Span) -> Diagnostic {
    let code = match error {
        PathError::NullPath => codes::NULL_PATH,
        PathError::NotFound { .. } => codes::PATH_NOT_FOUND,
        PathError::NotFoundWithCandidate { .. } => codes::PATH_NOT_FOUND_WITH_CANDIDATE,
        PathError::UnmappedPath { .. } => codes::UNMAPPED_PATH,
        PathError::AmbiguousPath { .. } => codes::AMBIGUOUS_PATH,
    };
    let diagnostic = diagnostics::error(code, error.to_string(), Some(site));
    match error {
        PathError::NotFoundWithCandidate { candidate, .. } => diagnostic.with_suggestion(
            Suggestion::new(
                format!("use `{candidate}`"),
                Some(site),
                Some(candidate.clone()),
            ),
        ),
        PathError::UnmappedPath { mapped, .. } => diagnostic.with_suggestion(Suggestion::new(
            format!("use `{mapped}`"),
            Some(site),
            Some(mapped.clone()),
        )),
        _ => diagnostic,
    }
}

fn position_diagnostic(error: &PositionError, site: Span) -> Diagnostic {
    let code = match error {
        PositionError::NonPositive => codes::POSITION_NOT_POSITIVE,
        PositionError::LineOutOfRange { .. } => codes::LINE_OUT_OF_RANGE,
        PositionError::CharacterOutOfRange { .. } => codes::CHARACTER_OUT_OF_RANGE,
        PositionError::NotANameToken { .. } => codes::NOT_A_NAME_TOKEN,
        PositionError::NotTokenStart { .. } => codes::NOT_TOKEN_START,
    };
    let diagnostic = diagnostics::error(code, error.to_string(), Some(site));
    if let PositionError::NotTokenStart {
        line, character, ..
    } = error
    {
        diagnostic.with_suggestion(Suggestion::new(
            format!("use line {line}, character {character}"),
            Some(site),
            None,
        ))
    } else {
        diagnostic
    }
}

fn hard_mismatch_diagnostic(mismatch: &Mismatch, interceptor: &str, site: Span) -> Diagnostic {
    let code = match mismatch {
        Mismatch::MustBeOrdinary => codes::INTERCEPTOR_MUST_BE_ORDINARY,
        Mismatch::ContainingTypeCannotBeGeneric => codes::CONTAINING_TYPE_GENERIC,
        Mismatch::ArityNotCompatible { .. } => codes::ARITY_NOT_COMPATIBLE,
        Mismatch::MustHaveMatchingThisParameter => codes::THIS_PARAMETER_MISMATCH,
        Mismatch::ScopedMismatch => codes::SCOPED_MISMATCH,
        Mismatch::SignatureMismatch { .. } => codes::SIGNATURE_MISMATCH,
        Mismatch::NotAccessible => codes::NOT_ACCESSIBLE,
        Mismatch::CannotUseUnmanagedCallersOnly => codes::UNMANAGED_CALLERS_ONLY,
    };
    diagnostics::error(code, format!("`{interceptor}`: {mismatch}"), Some(site))
}

fn soft_mismatch_diagnostic(warning: &SoftMismatch, interceptor: &str, site: Span) -> Diagnostic {
    let (code, detail) = match warning.kind {
        SoftMismatchKind::Nullability => (
            codes::NULLABILITY_MISMATCH,
            format!("nullability of {} differs from the intercepted method", warning.position),
        ),
        SoftMismatchKind::Dynamic => (
            codes::DYNAMIC_MISMATCH,
            format!("{} differs from the intercepted method by `dynamic`", warning.position),
        ),
        SoftMismatchKind::TupleNames => (
            codes::TUPLE_NAME_MISMATCH,
            format!(
                "tuple element names of {} differ from the intercepted method",
                warning.position
            ),
        ),
    };
    diagnostics::warning(code, format!("`{interceptor}`: {detail}"), Some(site))
}
