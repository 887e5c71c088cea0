use diesel::prelude::*;

use crate::domain::access::Requester;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::schema::users;

use super::models::UserIdentityRow;
use super::store::DieselUnitOfWork;

impl UserRepository for DieselUnitOfWork<'_> {
    fn find_requester_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<Requester>, DomainError> {
        let row = users::table
            .filter(users::token_hash.eq(token_hash))
            .select(UserIdentityRow::as_select())
            .first(self.conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Requester {
            user_id: row.id,
            role: row.role.parse()?,
        }))
    }
}
