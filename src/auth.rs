//! Shared-secret check for pool access.

use crate::pool::IndexPool;

/// Whether the presented token matches the pool's configured secret.
///
/// A pure function of the pool and the token: no side effects, no rate
/// limiting, no lockout. The caller resolves the pool first, so an unknown
/// resource never reaches this check.
pub fn check_token(pool: &IndexPool, presented: &str) -> bool {
    pool.secret() == presented
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_token_passes() {
        let pool = IndexPool::fresh("p", 1, "supersecret1");
        assert!(check_token(&pool, "supersecret1"));
    }

    #[test]
    fn test_wrong_token_fails() {
        let pool = IndexPool::fresh("p", 1, "supersecret1");
        assert!(!check_token(&pool, "wrong_pass"));
        assert!(!check_token(&pool, ""));
        assert!(!check_token(&pool, "supersecret1 "));
    }
}
