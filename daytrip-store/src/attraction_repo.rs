use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use daytrip_core::attraction::{Attraction, PAGE_SIZE};
use daytrip_core::repository::{AttractionRepository, StoreError};

use crate::map_err;

pub struct PgAttractionRepository {
    pool: PgPool,
}

impl PgAttractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AttractionRow {
    id: i64,
    name: String,
    category: String,
    description: String,
    address: String,
    transport: String,
    mrt: Option<String>,
    lat: f64,
    lng: f64,
    images: serde_json::Value,
}

impl AttractionRow {
    fn into_attraction(self) -> Attraction {
        Attraction {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            address: self.address,
            transport: self.transport,
            mrt: self.mrt,
            lat: self.lat,
            lng: self.lng,
            images: serde_json::from_value(self.images).unwrap_or_default(),
        }
    }
}

const COLUMNS: &str =
    "id, name, category, description, address, transport, mrt, lat, lng, images";

#[async_trait]
impl AttractionRepository for PgAttractionRepository {
    async fn list(
        &self,
        page: u32,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Vec<Attraction>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM attractions WHERE 1=1"
        ));
        if let Some(category) = category {
            qb.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(keyword) = keyword {
            // Keyword hits the MRT station exactly or the name as infix.
            qb.push(" AND (mrt = ")
                .push_bind(keyword.to_string())
                .push(" OR name LIKE '%' || ")
                .push_bind(keyword.to_string())
                .push(" || '%')");
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(PAGE_SIZE as i64)
            .push(" OFFSET ")
            .push_bind(page as i64 * PAGE_SIZE as i64);

        let rows = qb
            .build_query_as::<AttractionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(rows.into_iter().map(AttractionRow::into_attraction).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Attraction>, StoreError> {
        let row = sqlx::query_as::<_, AttractionRow>(&format!(
            "SELECT {COLUMNS} FROM attractions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(row.map(AttractionRow::into_attraction))
    }

    async fn exists(&self, id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM attractions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT category FROM attractions GROUP BY category ORDER BY COUNT(id) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn mrts(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT mrt FROM attractions WHERE mrt IS NOT NULL \
             GROUP BY mrt ORDER BY COUNT(id) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}
