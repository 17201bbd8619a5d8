//! Resolution of declared file paths against the compilation's files.
//!
//! A declared path matches a file through the configured path map when one
//! is present; otherwise absolute paths compare slash-insensitively and
//! relative paths compare literally. Near misses produce structured hints
//! instead of a bare not-found.

use std::fmt;

use crate::diagnostics::{FileId, SourceFiles};
use crate::pathmap::PathMap;

/// Failure modes of declared-path resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The declaration carried a null or empty path literal.
    NullPath,
    NotFound {
        path: String,
    },
    /// No exact match, but exactly one file is a plausible intent.
    NotFoundWithCandidate {
        path: String,
        candidate: String,
    },
    /// The declaration used a physical path where the mapped spelling was
    /// expected.
    UnmappedPath {
        path: String,
        mapped: String,
    },
    /// Two or more distinct files reduce to the declared path.
    AmbiguousPath {
        path: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NullPath => {
                write!(f, "interception target path must be a non-empty string")
            }
            PathError::NotFound { path } => {
                write!(f, "file `{path}` is not part of the compilation")
            }
            PathError::NotFoundWithCandidate { path, candidate } => write!(
                f,
                "file `{path}` is not part of the compilation; did you mean `{candidate}`?"
            ),
            PathError::UnmappedPath { path, mapped } => write!(
                f,
                "file `{path}` matches a source file only before path mapping; use `{mapped}`"
            ),
            PathError::AmbiguousPath { path } => write!(
                f,
                "path `{path}` resolves to multiple files in the compilation"
            ),
        }
    }
}

/// Resolve a declared path literal to a file in the compilation.
///
/// # Errors
///
/// Returns a [`PathError`] describing why the path failed to resolve; see
/// the variant documentation for each condition.
pub fn resolve(
    files: &SourceFiles,
    map: &PathMap,
    declared: Option<&str>,
) -> Result<FileId, PathError> {
    let Some(declared) = declared.filter(|path| !path.is_empty()) else {
        return Err(PathError::NullPath);
    };

    let mapped: Vec<String> = files
        .iter()
        .map(|file| map.apply(file.path()).into_owned())
        .collect();

    let exact: Vec<FileId> = files
        .iter()
        .zip(mapped.iter())
        .filter(|(_, candidate)| paths_equal(map, declared, candidate))
        .map(|(file, _)| file.id)
        .collect();
    match exact.as_slice() {
        [single] => return Ok(*single),
        [] => {}
        _ => {
            return Err(PathError::AmbiguousPath {
                path: declared.to_string(),
            });
        }
    }

    // With a map configured, a declared path that names the physical file
    // gets pointed at the mapped spelling it should have used.
    if !map.is_empty() {
        for file in files {
            if normalize_slashes(file.path()) == normalize_slashes(declared) {
                return Err(PathError::UnmappedPath {
                    path: declared.to_string(),
                    mapped: map.apply(file.path()).into_owned(),
                });
            }
        }
    }

    if let Some(candidate) = close_candidate(map, declared, &mapped) {
        return Err(PathError::NotFoundWithCandidate {
            path: declared.to_string(),
            candidate,
        });
    }

    Err(PathError::NotFound {
        path: declared.to_string(),
    })
}

/// Equality rule for the exact-match pass. Under a map, comparison is
/// literal against the mapped candidate; without one, absolute paths are
/// slash-insensitive and relative paths are literal.
fn paths_equal(map: &PathMap, declared: &str, candidate: &str) -> bool {
    if !map.is_empty() {
        return declared == candidate;
    }
    if is_absolute(declared) || is_absolute(candidate) {
        normalize_slashes(declared) == normalize_slashes(candidate)
    } else {
        declared == candidate
    }
}

/// A unique near miss: the same mapped path modulo slash direction, the
/// declared path run through the map itself, or a unique suffix of one
/// candidate at a separator boundary.
fn close_candidate(map: &PathMap, declared: &str, mapped: &[String]) -> Option<String> {
    let normalized = normalize_slashes(declared);
    let slash_matches: Vec<&String> = mapped
        .iter()
        .filter(|candidate| normalize_slashes(candidate) == normalized)
        .collect();
    if let [single] = slash_matches.as_slice() {
        return Some((*single).clone());
    }

    if !map.is_empty() {
        let remapped = map.apply(declared);
        let remapped_matches: Vec<&String> = mapped
            .iter()
            .filter(|candidate| normalize_slashes(candidate) == normalize_slashes(&remapped))
            .collect();
        if let [single] = remapped_matches.as_slice() {
            return Some((*single).clone());
        }
    }

    let suffix_matches: Vec<&String> = mapped
        .iter()
        .filter(|candidate| has_path_suffix(candidate, &normalized))
        .collect();
    if let [single] = suffix_matches.as_slice() {
        return Some((*single).clone());
    }

    None
}

/// Whether `candidate` ends with `suffix` at a directory boundary.
fn has_path_suffix(candidate: &str, suffix: &str) -> bool {
    let candidate = normalize_slashes(candidate);
    let Some(rest) = candidate.strip_suffix(suffix) else {
        return false;
    };
    !rest.is_empty() && rest.ends_with('/')
}

fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

fn is_absolute(path: &str) -> bool {
    let mut chars = path.chars();
    match chars.next() {
        Some('/' | '\\') => true,
        Some(drive) if drive.is_ascii_alphabetic() => {
            chars.next() == Some(':') && matches!(chars.next(), Some('/' | '\\'))
        }
        _ => false,
    }
}
