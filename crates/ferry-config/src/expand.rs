//! Environment variable expansion for configuration strings.
//!
//! Supports `${VAR}` (errors if unset) and `${VAR:-default}` (falls back to
//! the default if unset). Expansion is a single pass; expanded values are
//! never re-scanned.

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// `field` names the configuration field being expanded and is only used in
/// error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: "unterminated ${ reference".to_owned(),
            });
        };

        let expr = &after[..end];
        let (name, default) = match expr.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (expr, None),
        };

        match std::env::var(name) {
            Ok(v) => out.push_str(&v),
            Err(_) => match default {
                Some(d) => out.push_str(d),
                None => {
                    return Err(ConfigError::EnvVar {
                        field: field.to_owned(),
                        message: format!("${{{name}}} not set"),
                    });
                }
            },
        }

        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Each test uses a unique variable name so parallel tests don't race.

    #[test]
    fn test_no_references_passes_through() {
        let result = expand_env("plain value", "field").unwrap();
        assert_eq!(result, "plain value");
    }

    #[test]
    fn test_expands_set_variable() {
        unsafe { std::env::set_var("FERRY_TEST_EXPAND_SET", "abc123") };
        let result = expand_env("key=${FERRY_TEST_EXPAND_SET}", "field").unwrap();
        assert_eq!(result, "key=abc123");
    }

    #[test]
    fn test_expands_multiple_references() {
        unsafe {
            std::env::set_var("FERRY_TEST_EXPAND_A", "one");
            std::env::set_var("FERRY_TEST_EXPAND_B", "two");
        }
        let result =
            expand_env("${FERRY_TEST_EXPAND_A};${FERRY_TEST_EXPAND_B}", "field").unwrap();
        assert_eq!(result, "one;two");
    }

    #[test]
    fn test_unset_variable_errors() {
        let result = expand_env("${FERRY_TEST_EXPAND_UNSET}", "stores.media.connection_string");
        let err = result.unwrap_err();
        let ConfigError::EnvVar { field, message } = err else {
            panic!("expected EnvVar error, got {err:?}");
        };
        assert_eq!(field, "stores.media.connection_string");
        assert_eq!(message, "${FERRY_TEST_EXPAND_UNSET} not set");
    }

    #[test]
    fn test_unset_variable_with_default() {
        let result = expand_env("${FERRY_TEST_EXPAND_DEF:-fallback}", "field").unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_set_variable_ignores_default() {
        unsafe { std::env::set_var("FERRY_TEST_EXPAND_PREF", "actual") };
        let result = expand_env("${FERRY_TEST_EXPAND_PREF:-fallback}", "field").unwrap();
        assert_eq!(result, "actual");
    }

    #[test]
    fn test_unterminated_reference_errors() {
        let result = expand_env("${FERRY_TEST_OOPS", "field");
        assert!(matches!(result, Err(ConfigError::EnvVar { .. })));
    }

    #[test]
    fn test_empty_default() {
        let result = expand_env("${FERRY_TEST_EXPAND_EMPTYDEF:-}", "field").unwrap();
        assert_eq!(result, "");
    }
}
