use async_trait::async_trait;
use sqlx::PgPool;

use daytrip_core::member::MemberRecord;
use daytrip_core::repository::{MemberRepository, StoreError};

use crate::map_err;

pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO members (name, email, password_hash) VALUES ($1, $2, $3)")
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, StoreError> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT id, name, email, password_hash FROM members WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(row.map(|r| MemberRecord {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
        }))
    }
}
