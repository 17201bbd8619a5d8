//! Signature and eligibility validation of interceptor methods.
//!
//! Checks run in a fixed order and short-circuit on the first hard
//! mismatch; soft mismatches accumulate across every axis and downgrade
//! the outcome to a warning without blocking registration.

use std::fmt;

use crate::accessibility::{AccessContext, check_access};
use crate::intercept::classify::{CallBinder, CallScope};
use crate::symbols::{MethodKind, MethodSymbol, Nullability, TypeRef};

/// Hard reasons an interceptor is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    MustBeOrdinary,
    ContainingTypeCannotBeGeneric,
    ArityNotCompatible { required: usize, actual: usize },
    MustHaveMatchingThisParameter,
    ScopedMismatch,
    SignatureMismatch { detail: String },
    NotAccessible,
    CannotUseUnmanagedCallersOnly,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MustBeOrdinary => write!(f, "interceptor must be an ordinary method"),
            Mismatch::ContainingTypeCannotBeGeneric => {
                write!(f, "interceptor cannot be declared in a generic type")
            }
            Mismatch::ArityNotCompatible { required, actual } => write!(
                f,
                "interceptor declares {actual} type parameter{}, but the intercepted call requires 0 or {required}",
                if *actual == 1 { "" } else { "s" }
            ),
            Mismatch::MustHaveMatchingThisParameter => write!(
                f,
                "interceptor must have a `this` parameter matching the intercepted method"
            ),
            Mismatch::ScopedMismatch => write!(
                f,
                "interceptor differs from the intercepted method in `scoped` modifiers"
            ),
            Mismatch::SignatureMismatch { detail } => {
                write!(f, "signature does not match the intercepted method: {detail}")
            }
            Mismatch::NotAccessible => {
                write!(f, "interceptor is not accessible at the call site")
            }
            Mismatch::CannotUseUnmanagedCallersOnly => write!(
                f,
                "a method restricted to unmanaged callers cannot intercept managed calls"
            ),
        }
    }
}

/// Which part of the signature a soft mismatch concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamPosition {
    Receiver,
    Parameter(usize),
    Return,
}

impl fmt::Display for ParamPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamPosition::Receiver => write!(f, "the `this` parameter"),
            ParamPosition::Parameter(index) => write!(f, "parameter {}", index + 1),
            ParamPosition::Return => write!(f, "the return type"),
        }
    }
}

/// Tolerated differences that warn without blocking registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoftMismatchKind {
    Nullability,
    Dynamic,
    TupleNames,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftMismatch {
    pub kind: SoftMismatchKind,
    pub position: ParamPosition,
}

/// Outcome of validating one interceptor against one call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompatibilityOutcome {
    Compatible,
    CompatibleWithWarning(Vec<SoftMismatch>),
    Incompatible(Mismatch),
}

impl CompatibilityOutcome {
    #[must_use]
    pub fn registers(&self) -> bool {
        !matches!(self, CompatibilityOutcome::Incompatible(_))
    }
}

/// Validate `interceptor` against the statically bound `target` of a
/// classified call site.
#[must_use]
pub fn validate(
    interceptor: &MethodSymbol,
    target: &MethodSymbol,
    scope: &CallScope,
    binder: &dyn CallBinder,
) -> CompatibilityOutcome {
    let mut warnings = Vec::new();

    if let Some(mismatch) = check_shape(interceptor, target) {
        return CompatibilityOutcome::Incompatible(mismatch);
    }
    if interceptor.has_generic_container() {
        return CompatibilityOutcome::Incompatible(Mismatch::ContainingTypeCannotBeGeneric);
    }
    if let Some(mismatch) = check_arity(interceptor, target) {
        return CompatibilityOutcome::Incompatible(mismatch);
    }
    if let Some(mismatch) = check_receiver(interceptor, target, &mut warnings) {
        return CompatibilityOutcome::Incompatible(mismatch);
    }
    if let Some(mismatch) = check_parameters(interceptor, target, &mut warnings) {
        return CompatibilityOutcome::Incompatible(mismatch);
    }
    if interceptor.unmanaged_callers_only {
        return CompatibilityOutcome::Incompatible(Mismatch::CannotUseUnmanagedCallersOnly);
    }
    if !is_accessible(interceptor, scope, binder) {
        return CompatibilityOutcome::Incompatible(Mismatch::NotAccessible);
    }

    if warnings.is_empty() {
        CompatibilityOutcome::Compatible
    } else {
        CompatibilityOutcome::CompatibleWithWarning(warnings)
    }
}

/// The interceptor must be an ordinary method; abstract declarations are
/// reachable only when the intercepted target dispatches virtually.
fn check_shape(interceptor: &MethodSymbol, target: &MethodSymbol) -> Option<Mismatch> {
    if interceptor.kind != MethodKind::Ordinary {
        return Some(Mismatch::MustBeOrdinary);
    }
    if interceptor.modifiers.is_abstract && !target.modifiers.dispatches_virtually() {
        return Some(Mismatch::MustBeOrdinary);
    }
    None
}

fn check_arity(interceptor: &MethodSymbol, target: &MethodSymbol) -> Option<Mismatch> {
    let required = target.combined_generic_arity();
    let actual = interceptor.arity;
    if actual == 0 || actual == required {
        None
    } else {
        Some(Mismatch::ArityNotCompatible { required, actual })
    }
}

fn check_receiver(
    interceptor: &MethodSymbol,
    target: &MethodSymbol,
    warnings: &mut Vec<SoftMismatch>,
) -> Option<Mismatch> {
    match (interceptor.receiver.as_ref(), target.receiver.as_ref()) {
        (None, None) => None,
        (Some(ours), Some(theirs)) => {
            match compare_types(&ours.ty, &theirs.ty) {
                TypeDiff::Hard => return Some(Mismatch::MustHaveMatchingThisParameter),
                TypeDiff::Soft(kinds) => {
                    warnings.extend(kinds.into_iter().map(|kind| SoftMismatch {
                        kind,
                        position: ParamPosition::Receiver,
                    }));
                }
                TypeDiff::Same => {}
            }
            if ours.ref_kind != theirs.ref_kind {
                return Some(Mismatch::MustHaveMatchingThisParameter);
            }
            if ours.scoped != theirs.scoped {
                return Some(Mismatch::ScopedMismatch);
            }
            None
        }
        _ => Some(Mismatch::MustHaveMatchingThisParameter),
    }
}

fn check_parameters(
    interceptor: &MethodSymbol,
    target: &MethodSymbol,
    warnings: &mut Vec<SoftMismatch>,
) -> Option<Mismatch> {
    if interceptor.parameters.len() != target.parameters.len() {
        return Some(Mismatch::SignatureMismatch {
            detail: format!(
                "expected {} parameter{}, found {}",
                target.parameters.len(),
                if target.parameters.len() == 1 { "" } else { "s" },
                interceptor.parameters.len()
            ),
        });
    }

    for (index, (ours, theirs)) in interceptor
        .parameters
        .iter()
        .zip(target.parameters.iter())
        .enumerate()
    {
        if ours.ref_kind != theirs.ref_kind {
            return Some(Mismatch::SignatureMismatch {
                detail: format!("parameter {} differs in its by-reference binding", index + 1),
            });
        }
        // `params` presence never matters here; expansion-form checking
        // belongs to the binder.
        match compare_types(&ours.ty, &theirs.ty) {
            TypeDiff::Hard => {
                return Some(Mismatch::SignatureMismatch {
                    detail: format!("parameter {} has a different type", index + 1),
                });
            }
            TypeDiff::Soft(kinds) => {
                warnings.extend(kinds.into_iter().map(|kind| SoftMismatch {
                    kind,
                    position: ParamPosition::Parameter(index),
                }));
            }
            TypeDiff::Same => {}
        }
    }

    match compare_types(&interceptor.return_type, &target.return_type) {
        TypeDiff::Hard => Some(Mismatch::SignatureMismatch {
            detail: "the return type differs".to_string(),
        }),
        TypeDiff::Soft(kinds) => {
            warnings.extend(kinds.into_iter().map(|kind| SoftMismatch {
                kind,
                position: ParamPosition::Return,
            }));
            None
        }
        TypeDiff::Same => None,
    }
}

fn is_accessible(interceptor: &MethodSymbol, scope: &CallScope, binder: &dyn CallBinder) -> bool {
    let owner = interceptor.owner_type().unwrap_or(interceptor.name.as_str());
    let ctx = AccessContext::for_type(
        scope.package.as_deref(),
        scope.enclosing_type.as_deref(),
        scope.namespace.as_deref(),
    );
    check_access(
        interceptor.visibility,
        owner,
        interceptor.owner_package.as_deref(),
        interceptor.owner_namespace.as_deref(),
        &ctx,
        |left, right| binder.same_type(left, right),
        |candidate, base| binder.is_derived_from(candidate, base),
    )
    .allowed
}

/// Joined result of structural type comparison.
enum TypeDiff {
    Same,
    Soft(Vec<SoftMismatchKind>),
    Hard,
}

impl TypeDiff {
    fn merge(self, other: TypeDiff) -> TypeDiff {
        match (self, other) {
            (TypeDiff::Hard, _) | (_, TypeDiff::Hard) => TypeDiff::Hard,
            (TypeDiff::Same, other) | (other, TypeDiff::Same) => other,
            (TypeDiff::Soft(mut left), TypeDiff::Soft(right)) => {
                left.extend(right);
                TypeDiff::Soft(left)
            }
        }
    }
}

/// Structural comparison with the tolerance lattice: platform-integer
/// spellings are identical, `dynamic` against `object` warns, tuple
/// element names warn, nullability annotation differences warn, anything
/// else is a hard mismatch.
fn compare_types(ours: &TypeRef, theirs: &TypeRef) -> TypeDiff {
    if let (Some(left), Some(right)) = (ours.as_native_int(), theirs.as_native_int()) {
        return if left == right {
            TypeDiff::Same
        } else {
            TypeDiff::Hard
        };
    }

    match (ours, theirs) {
        (TypeRef::Dynamic, TypeRef::Dynamic) => TypeDiff::Same,
        (TypeRef::Dynamic, other) | (other, TypeRef::Dynamic) => {
            if is_object(other) {
                TypeDiff::Soft(vec![SoftMismatchKind::Dynamic])
            } else {
                TypeDiff::Hard
            }
        }
        (
            TypeRef::Named {
                name: our_name,
                args: our_args,
                nullability: our_nullability,
            },
            TypeRef::Named {
                name: their_name,
                args: their_args,
                nullability: their_nullability,
            },
        ) => {
            if our_name != their_name || our_args.len() != their_args.len() {
                return TypeDiff::Hard;
            }
            let mut diff = compare_nullability(*our_nullability, *their_nullability);
            for (ours, theirs) in our_args.iter().zip(their_args.iter()) {
                diff = diff.merge(compare_types(ours, theirs));
            }
            diff
        }
        (TypeRef::Tuple(our_elements), TypeRef::Tuple(their_elements)) => {
            if our_elements.len() != their_elements.len() {
                return TypeDiff::Hard;
            }
            let mut diff = TypeDiff::Same;
            let mut names_differ = false;
            for (ours, theirs) in our_elements.iter().zip(their_elements.iter()) {
                if ours.name != theirs.name {
                    names_differ = true;
                }
                diff = diff.merge(compare_types(&ours.ty, &theirs.ty));
            }
            if names_differ {
                diff = diff.merge(TypeDiff::Soft(vec![SoftMismatchKind::TupleNames]));
            }
            diff
        }
        (TypeRef::TypeParam(ours), TypeRef::TypeParam(theirs)) => {
            if ours == theirs {
                TypeDiff::Same
            } else {
                TypeDiff::Hard
            }
        }
        _ => TypeDiff::Hard,
    }
}

fn compare_nullability(ours: Nullability, theirs: Nullability) -> TypeDiff {
    match (ours, theirs) {
        (Nullability::Oblivious, _) | (_, Nullability::Oblivious) => TypeDiff::Same,
        (left, right) if left == right => TypeDiff::Same,
        _ => TypeDiff::Soft(vec![SoftMismatchKind::Nullability]),
    }
}

fn is_object(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::Named { name, args, .. } if args.is_empty() && name == "object")
}
