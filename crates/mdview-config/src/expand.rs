//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expand braced environment variable references in `value`.
///
/// An unset variable without a default is an error naming `field`. Bare
/// `$VAR` is left alone so URLs and paths containing `$` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    };

    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        }),
    }
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDVIEW_EXPAND_SET", "kroki.internal");
        }
        let result = expand_env("https://${MDVIEW_EXPAND_SET}:8000", "diagrams.kroki_url").unwrap();
        assert_eq!(result, "https://kroki.internal:8000");
        unsafe {
            std::env::remove_var("MDVIEW_EXPAND_SET");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDVIEW_EXPAND_UNSET");
        }
        let result = expand_env("${MDVIEW_EXPAND_UNSET:-/srv/docs}", "images.base_path").unwrap();
        assert_eq!(result, "/srv/docs");
    }

    #[test]
    fn test_unset_without_default_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDVIEW_EXPAND_MISSING");
        }
        let err = expand_env("${MDVIEW_EXPAND_MISSING}", "render.asset_dir").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("MDVIEW_EXPAND_MISSING"));
        assert!(message.contains("render.asset_dir"));
    }

    #[test]
    fn test_plain_values_unchanged() {
        assert_eq!(expand_env("https://kroki.io", "f").unwrap(), "https://kroki.io");
        assert_eq!(expand_env("/docs/$HOME", "f").unwrap(), "/docs/$HOME");
    }
}
