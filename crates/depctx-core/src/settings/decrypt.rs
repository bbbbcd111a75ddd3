//! Decryption of credentials declared in settings

use crate::{Error, Result};
use std::path::Path;

/// Turns a possibly encrypted settings value into plain text.
///
/// `id` names the server or proxy the value belongs to and `security` is the
/// settings-security file, if one is configured.
pub trait SettingsDecrypter: Send + Sync {
    fn decrypt(&self, id: &str, value: &str, security: Option<&Path>) -> Result<String>;
}

/// Whether `value` uses the `{...}` encrypted form
pub fn is_encrypted(value: &str) -> bool {
    let value = value.trim();
    value.len() >= 2 && value.starts_with('{') && value.ends_with('}') && !value.starts_with("\\{")
}

/// Passes plain values through and rejects encrypted ones.
///
/// No cipher is available, so any `{...}` value fails to decrypt. A leading
/// `\{` escapes a literal brace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDecrypter;

impl SettingsDecrypter for PlainTextDecrypter {
    fn decrypt(&self, id: &str, value: &str, security: Option<&Path>) -> Result<String> {
        if let Some(escaped) = value.strip_prefix("\\{") {
            return Ok(format!("{{{escaped}"));
        }
        if !is_encrypted(value) {
            return Ok(value.to_string());
        }
        let message = match security {
            Some(path) if path.is_file() => {
                format!("no cipher available for master password in {}", path.display())
            }
            Some(path) => format!("settings security file {} not found", path.display()),
            None => "no settings security file configured".to_string(),
        };
        Err(Error::Decryption {
            id: id.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("secret", false)]
    #[case("{COQLCE6DU6GtcS5P=}", true)]
    #[case("\\{literal}", false)]
    #[case("{", false)]
    fn encrypted_form(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_encrypted(value), expected);
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(
            PlainTextDecrypter.decrypt("server", "secret", None).unwrap(),
            "secret"
        );
        assert_eq!(
            PlainTextDecrypter.decrypt("server", "\\{literal}", None).unwrap(),
            "{literal}"
        );
    }

    #[test]
    fn encrypted_values_fail_with_entry_id() {
        let err = PlainTextDecrypter
            .decrypt("corp", "{abc=}", Some(Path::new("/nowhere/settings-security.toml")))
            .unwrap_err();
        assert!(matches!(err, Error::Decryption { ref id, .. } if id == "corp"));
        assert!(err.to_string().contains("not found"));
    }
}
