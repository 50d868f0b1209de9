//! Upload token generation.
//!
//! Tokens are opaque capability strings embedded in the customer's upload
//! URL. 32 alphanumeric characters carry ~190 bits of entropy, so no
//! store-side uniqueness probe is needed; the upload_tokens primary key is
//! the backstop.

use rand::Rng;

/// Length of the generated token string.
const TOKEN_LENGTH: usize = 32;

/// Generate a new random upload token.
pub fn generate_upload_token() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length() {
        assert_eq!(generate_upload_token().len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = generate_upload_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_upload_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
