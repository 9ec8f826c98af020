//! Static bearer-token authentication for `/api` routes.

pub(crate) mod middleware;

use sha2::{Digest, Sha256};

/// Configured API token, held only as its SHA-256 digest.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ApiToken {
    digest: [u8; 32],
}

impl ApiToken {
    /// Blank tokens are treated as unset.
    pub(crate) fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        (!raw.is_empty()).then(|| Self {
            digest: digest(raw),
        })
    }

    pub(crate) fn matches(&self, candidate: &str) -> bool {
        let candidate = digest(candidate);

        // Compare every byte so timing does not reveal the matching prefix.
        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0_u8, |diff, (left, right)| diff | (left ^ right))
            == 0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(..)")
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_configured_token() {
        let token = ApiToken::from_raw("ss_secret");

        assert!(token.as_ref().is_some_and(|t| t.matches("ss_secret")));
        assert!(token.as_ref().is_some_and(|t| !t.matches("ss_secreT")));
    }

    #[test]
    fn blank_token_is_unset() {
        assert!(ApiToken::from_raw("  ").is_none());
    }

    #[test]
    fn debug_hides_digest() {
        let token = ApiToken::from_raw("ss_secret");

        assert_eq!(format!("{token:?}"), "Some(ApiToken(..))");
    }
}
