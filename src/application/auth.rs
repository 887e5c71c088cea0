use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::access::Requester;
use crate::domain::errors::DomainError;
use crate::domain::ports::Store;

/// Tokens are stored only as the hex SHA-256 of their value.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Resolves bearer tokens to the user behind them.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn Store>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn authenticate(&self, token: &str) -> Result<Requester, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::Unauthorized);
        }
        let token_hash = hash_token(token);
        self.store
            .unit_of_work(|uow| uow.find_requester_by_token_hash(&token_hash))?
            .ok_or(DomainError::Unauthorized)
    }
}
