#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::perf, clippy::suspicious)] // Catch correctness + perf + suspicious patterns early.
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Call-site interception resolution for the Chic compiler front-end.
//!
//! Given the compilation's source files, the binder's method symbols, and
//! the `@intercepts` declarations discovered during attribute decoding,
//! the engine decides for every method invocation whether code generation
//! must silently redirect it to a compatible replacement method, and
//! produces the diagnostics for every declaration that cannot take
//! effect.

pub mod accessibility;
pub mod diagnostics;
pub mod intercept;
pub mod pathmap;
pub mod symbols;
pub mod tokens;

pub use intercept::{
    CallBinder, CallScope, CallSite, Compilation, InterceptionDeclaration, InterceptionMap,
    LocationSpec, Resolution, resolve_interceptions,
};
pub use pathmap::{PathMap, PathMapEntry};
