use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

use crate::OAuthError;

const STATE_BYTES: usize = 32;

/// Generates an anti-CSRF `state` value from the operating system RNG.
pub(crate) fn generate_state() -> Result<String, OAuthError> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| OAuthError::OsRng {
            message: err.to_string(),
        })?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Constant-time comparison of the stored and received `state` values.
pub(crate) fn states_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::{generate_state, states_match};

    #[test]
    fn generates_url_safe_state() {
        let state = generate_state().unwrap();
        assert_eq!(state.len(), 43);
        assert!(!state.contains('='), "state should be unpadded");
        assert!(!state.contains('+'), "state should be url safe");
        assert!(!state.contains('/'), "state should be url safe");
    }

    #[test]
    fn successive_states_differ() {
        assert_ne!(generate_state().unwrap(), generate_state().unwrap());
    }

    #[test]
    fn compares_states() {
        assert!(states_match("abc", "abc"));
        assert!(!states_match("abc", "abd"));
        assert!(!states_match("abc", "abcd"));
        assert!(!states_match("abc", ""));
    }
}
