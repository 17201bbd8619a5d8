//! Classification of a located name token as an interceptable call.
//!
//! The binder has already resolved every invocation in the compilation;
//! this module only asks it what the located name means and rejects the
//! forms that cannot be intercepted (delegate calls, local functions,
//! constructor invocations, pattern-based implicit calls, and names that
//! are never invoked at all, such as `nameof` arguments).

use std::fmt;

use crate::diagnostics::{FileId, LineCol, SourceFile, Span};
use crate::symbols::MethodId;
use crate::tokens::Token;

/// Where a call occurs, for accessibility evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallScope {
    pub package: Option<String>,
    pub namespace: Option<String>,
    pub enclosing_type: Option<String>,
}

impl CallScope {
    #[must_use]
    pub fn in_type(
        package: Option<&str>,
        namespace: Option<&str>,
        enclosing_type: Option<&str>,
    ) -> Self {
        Self {
            package: package.map(str::to_string),
            namespace: namespace.map(str::to_string),
            enclosing_type: enclosing_type.map(str::to_string),
        }
    }
}

/// Syntactic/semantic form of an invocation, as the binder reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationShape {
    /// An ordinary instance, static, or extension method call.
    Ordinary { target: MethodId, scope: CallScope },
    Delegate,
    LocalFunction,
    FunctionPointer,
    EventAccessor,
    Constructor,
    /// Deconstruct/Dispose/iteration members invoked implicitly by
    /// pattern-based syntax.
    ImplicitPattern,
}

/// What a name token means, as the binder reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameBinding {
    Invocation(InvocationShape),
    /// The name identifies something that is never invoked here.
    NotInvoked,
}

/// Host seam: bound-name lookup plus the type relations the
/// accessibility check needs. The relation defaults treat type names
/// nominally, which suits flat test models.
pub trait CallBinder {
    /// What does the name token spanning `span` in `file` mean?
    fn bind_name(&self, file: FileId, span: Span) -> NameBinding;

    /// Whether `candidate` is the same as or derives from `base`.
    fn is_derived_from(&self, candidate: &str, base: &str) -> bool {
        candidate == base
    }

    fn same_type(&self, left: &str, right: &str) -> bool {
        left == right
    }
}

/// Failure modes of call-site classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassificationError {
    NameNotInvoked { name: String },
    MustBeOrdinaryMethod { name: String },
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::NameNotInvoked { name } => {
                write!(f, "`{name}` is not being invoked at the target position")
            }
            ClassificationError::MustBeOrdinaryMethod { name } => write!(
                f,
                "`{name}` is invoked, but only ordinary method calls can be intercepted"
            ),
        }
    }
}

/// The resolved, language-level invocation an interception targets.
/// Identity for uniqueness purposes is `(file, span.start)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub file: FileId,
    pub position: LineCol,
    pub span: Span,
    pub target: MethodId,
    pub scope: CallScope,
}

/// Classify a located name token, recovering the statically bound target.
///
/// # Errors
///
/// Returns a [`ClassificationError`] when the name is not invoked or the
/// invocation is not an ordinary method call.
pub fn classify(
    binder: &dyn CallBinder,
    file: &SourceFile,
    token: &Token,
) -> Result<CallSite, ClassificationError> {
    let span = Span::in_file(file.id, token.span.start, token.span.end);
    match binder.bind_name(file.id, span) {
        NameBinding::Invocation(InvocationShape::Ordinary { target, scope }) => {
            let position = file.line_col(token.span.start).unwrap_or(LineCol {
                line: 1,
                column: 1,
            });
            Ok(CallSite {
                file: file.id,
                position,
                span,
                target,
                scope,
            })
        }
        NameBinding::Invocation(_) => Err(ClassificationError::MustBeOrdinaryMethod {
            name: token.lexeme.clone(),
        }),
        NameBinding::NotInvoked => Err(ClassificationError::NameNotInvoked {
            name: token.lexeme.clone(),
        }),
    }
}
