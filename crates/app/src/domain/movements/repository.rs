//! Movements Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    movements::records::{MovementKind, MovementRecord, MovementUuid},
    products::{
        records::ProductUuid,
        repository::{to_column, try_get_count},
    },
};

const CREATE_MOVEMENT_SQL: &str = include_str!("sql/create_movement.sql");
const LIST_PRODUCT_MOVEMENTS_SQL: &str = include_str!("sql/list_product_movements.sql");

/// Movement row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MovementEntry {
    pub uuid: MovementUuid,
    pub product: ProductUuid,
    pub kind: MovementKind,
    pub quantity: u64,
    pub applied_quantity: u64,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgMovementsRepository;

impl PgMovementsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_movement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: MovementEntry,
    ) -> Result<MovementRecord, sqlx::Error> {
        query_as::<Postgres, MovementRecord>(CREATE_MOVEMENT_SQL)
            .bind(entry.uuid.into_uuid())
            .bind(entry.product.into_uuid())
            .bind(entry.kind.as_str())
            .bind(to_column("quantity", entry.quantity)?)
            .bind(to_column("applied_quantity", entry.applied_quantity)?)
            .bind(entry.notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_product_movements(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<MovementRecord>, sqlx::Error> {
        query_as::<Postgres, MovementRecord>(LIST_PRODUCT_MOVEMENTS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for MovementRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;

        let kind = kind
            .parse::<MovementKind>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: MovementUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            kind,
            quantity: try_get_count(row, "quantity")?,
            applied_quantity: try_get_count(row, "applied_quantity")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
