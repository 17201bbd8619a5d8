use crate::diagnostics::{Diagnostic, DiagnosticCode, Span};

pub mod codes {
    pub const NULL_PATH: &str = "ICP0001";
    pub const PATH_NOT_FOUND: &str = "ICP0002";
    pub const PATH_NOT_FOUND_WITH_CANDIDATE: &str = "ICP0003";
    pub const UNMAPPED_PATH: &str = "ICP0004";
    pub const AMBIGUOUS_PATH: &str = "ICP0005";

    pub const POSITION_NOT_POSITIVE: &str = "ICP0101";
    pub const LINE_OUT_OF_RANGE: &str = "ICP0102";
    pub const CHARACTER_OUT_OF_RANGE: &str = "ICP0103";
    pub const NOT_A_NAME_TOKEN: &str = "ICP0104";
    pub const NOT_TOKEN_START: &str = "ICP0105";

    pub const NAME_NOT_INVOKED: &str = "ICP0201";
    pub const MUST_BE_ORDINARY_CALL: &str = "ICP0202";

    pub const INTERCEPTOR_MUST_BE_ORDINARY: &str = "ICP0301";
    pub const CONTAINING_TYPE_GENERIC: &str = "ICP0302";
    pub const ARITY_NOT_COMPATIBLE: &str = "ICP0303";
    pub const THIS_PARAMETER_MISMATCH: &str = "ICP0304";
    pub const SCOPED_MISMATCH: &str = "ICP0305";
    pub const SIGNATURE_MISMATCH: &str = "ICP0306";
    pub const NOT_ACCESSIBLE: &str = "ICP0307";
    pub const UNMANAGED_CALLERS_ONLY: &str = "ICP0308";

    pub const DUPLICATE_INTERCEPTOR: &str = "ICP0401";
    pub const INVALID_CHECKSUM_LOCATION: &str = "ICP0402";

    pub const NULLABILITY_MISMATCH: &str = "ICP0501";
    pub const DYNAMIC_MISMATCH: &str = "ICP0502";
    pub const TUPLE_NAME_MISMATCH: &str = "ICP0503";
}

#[must_use]
pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Diagnostic {
    let mut message = message.into();
    if !message.starts_with('[') {
        message = format!("[{code}] {message}");
    }
    Diagnostic::error(message, span)
        .with_code(DiagnosticCode::new(code.to_string(), Some("intercept".into())))
}

#[must_use]
pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Diagnostic {
    let mut message = message.into();
    if !message.starts_with('[') {
        message = format!("[{code}] {message}");
    }
    Diagnostic::warning(message, span)
        .with_code(DiagnosticCode::new(code.to_string(), Some("intercept".into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_prefix_code_and_stamp_category() {
        let diagnostic = error(codes::PATH_NOT_FOUND, "file `a.chic` is not part of the compilation", None);
        assert_eq!(
            diagnostic.message,
            "[ICP0002] file `a.chic` is not part of the compilation"
        );
        let code = diagnostic.code.unwrap();
        assert_eq!(code.code, "ICP0002");
        assert_eq!(code.category.as_deref(), Some("intercept"));
    }

    #[test]
    fn bracketed_messages_are_not_double_prefixed() {
        let diagnostic = warning(codes::TUPLE_NAME_MISMATCH, "[ICP0503] names differ", None);
        assert_eq!(diagnostic.message, "[ICP0503] names differ");
    }
}
