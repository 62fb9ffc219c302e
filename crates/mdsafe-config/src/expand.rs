//! Environment variable expansion for configuration paths.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// An unset `${VAR}` without default is an error naming `field`. Strings
/// without `${` are returned unchanged, so bare `$` in paths is literal.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that could not be resolved.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDSAFE_EXPAND_DIR", "/srv/html");
        }
        let result = expand_env("${MDSAFE_EXPAND_DIR}/out", "export.output_dir").unwrap();
        assert_eq!(result, "/srv/html/out");
        unsafe {
            std::env::remove_var("MDSAFE_EXPAND_DIR");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDSAFE_EXPAND_UNSET");
        }
        let result = expand_env("${MDSAFE_EXPAND_UNSET:-print.css}", "export.stylesheet").unwrap();
        assert_eq!(result, "print.css");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDSAFE_EXPAND_MISSING");
        }
        let err = expand_env("${MDSAFE_EXPAND_MISSING}", "export.output_dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in export.output_dir: ${MDSAFE_EXPAND_MISSING} not set"
        );
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("styles/print.css", "f").unwrap(), "styles/print.css");
        assert_eq!(expand_env("$HOME/out", "f").unwrap(), "$HOME/out");
    }
}
