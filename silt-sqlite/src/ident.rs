//! Identifier safety for untrusted collection names.
//!
//! Collection names come straight from callers and end up in DDL and query
//! text, where the engine cannot bind them as parameters. Names are therefore
//! checked against a strict allow-list and rejected outright rather than
//! escaped: `[A-Za-z_][A-Za-z0-9_]*`, with the engine's reserved `sqlite_`
//! prefix refused as well.

use silt_core::error::{StoreError, StoreResult};

/// Validates and quotes untrusted identifiers for direct use in SQL text.
pub(crate) struct IdentGuard;

impl IdentGuard {
    /// Validates a collection name against the allow-list.
    ///
    /// Returns the name unchanged on success so call sites can chain.
    pub(crate) fn collection(name: &str) -> StoreResult<&str> {
        let mut chars = name.chars();
        let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');

        if !head_ok
            || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            || name.starts_with("sqlite_")
        {
            return Err(StoreError::InvalidCollectionName(name.to_string()));
        }

        Ok(name)
    }

    /// Validates a collection name and double-quotes it for SQL text.
    pub(crate) fn quoted(name: &str) -> StoreResult<String> {
        Ok(format!("\"{}\"", Self::collection(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass() {
        for name in ["pets", "Pets", "_staging", "audit_log2"] {
            assert_eq!(IdentGuard::collection(name).unwrap(), name);
        }
    }

    #[test]
    fn hostile_names_are_rejected() {
        for name in [
            "",
            "2pets",
            "pets; DROP TABLE pets",
            "pets\"",
            "pets name",
            "p-ets",
            "sqlite_master",
        ] {
            assert!(matches!(
                IdentGuard::collection(name),
                Err(StoreError::InvalidCollectionName(_))
            ));
        }
    }

    #[test]
    fn quoting_wraps_the_validated_name() {
        assert_eq!(IdentGuard::quoted("pets").unwrap(), "\"pets\"");
    }
}
