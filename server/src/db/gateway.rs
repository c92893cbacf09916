//! `PostgreSQL` implementation of the data gateway.

use async_trait::async_trait;
use sqlx::PgPool;

use super::queries;
use crate::gateway::{DataGateway, Filter, GatewayError, Patch, Record, Table};

/// Data gateway backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataGateway for PgGateway {
    async fn insert(&self, record: Record) -> Result<Record, GatewayError> {
        let stored = match &record {
            Record::Announcement(a) => {
                Record::Announcement(queries::insert_announcement(&self.pool, a).await?)
            }
            Record::Message(m) => Record::Message(queries::insert_message(&self.pool, m).await?),
            // Users are provisioned elsewhere
            Record::User(_) => {
                return Err(GatewayError::Unsupported {
                    table: Table::Users.as_str(),
                    column: "insert",
                })
            }
        };
        Ok(stored)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, GatewayError> {
        check_supported(table, filter, patch)?;
        Ok(queries::update_rows(&self.pool, table, filter, patch).await?)
    }

    async fn select_one(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<Record>, GatewayError> {
        match (table, filter) {
            (Table::Users, Filter::Username(username)) => {
                let user = queries::find_user_by_username(&self.pool, username).await?;
                Ok(user.map(Record::User))
            }
            _ => Err(GatewayError::Unsupported {
                table: table.as_str(),
                column: filter.column(),
            }),
        }
    }
}

/// Reject filter/patch combinations that do not belong to the table.
pub fn check_supported(table: Table, filter: &Filter, patch: &Patch) -> Result<(), GatewayError> {
    if !filter.applies_to(table) {
        return Err(GatewayError::Unsupported {
            table: table.as_str(),
            column: filter.column(),
        });
    }
    if !patch.applies_to(table) {
        return Err(GatewayError::Unsupported {
            table: table.as_str(),
            column: patch.column(),
        });
    }
    Ok(())
}
