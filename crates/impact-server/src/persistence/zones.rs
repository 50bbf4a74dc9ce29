//! Conflict zone persistence.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use impact_core::{parse_polygon, BoundingBox, ConflictZone};
use sqlx::SqlitePool;
use tracing::warn;

/// Upsert a zone into the database.
pub async fn upsert_zone(pool: &SqlitePool, zone: &ConflictZone) -> Result<()> {
    let geometry = serde_json::to_string(&zone.polygon)?;
    let bounding_box = zone
        .bounding_box
        .map(|bbox| serde_json::to_string(&bbox))
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO conflict_zones (id, name, severity, start_date, end_date, geometry, bounding_box, description, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            name = ?2, severity = ?3, start_date = ?4, end_date = ?5,
            geometry = ?6, bounding_box = ?7, description = ?8,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&zone.id)
    .bind(&zone.name)
    .bind(i64::from(zone.severity))
    .bind(zone.start_time.to_rfc3339())
    .bind(zone.end_time.map(|t| t.to_rfc3339()))
    .bind(&geometry)
    .bind(bounding_box)
    .bind(&zone.description)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every zone. Unparseable geometry is replaced by `fallback_ring`;
/// rows with unreadable dates are skipped.
pub async fn load_all_zones(pool: &SqlitePool, fallback_ring: &[[f64; 2]]) -> Result<Vec<ConflictZone>> {
    let rows = sqlx::query_as::<_, ZoneRow>(
        "SELECT id, name, severity, start_date, end_date, geometry, bounding_box, description FROM conflict_zones ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut zones = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id.clone();
        match row.into_zone(fallback_ring) {
            Ok(zone) => zones.push(zone),
            Err(err) => warn!("Skipping conflict zone {}: {:#}", id, err),
        }
    }
    Ok(zones)
}

pub async fn count_zones(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conflict_zones")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Delete a zone by ID.
pub async fn delete_zone(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM conflict_zones WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct ZoneRow {
    id: String,
    name: String,
    severity: i64,
    start_date: String,
    end_date: Option<String>,
    geometry: String,
    bounding_box: Option<String>,
    description: String,
}

impl ZoneRow {
    fn into_zone(self, fallback_ring: &[[f64; 2]]) -> Result<ConflictZone> {
        let start_time = parse_timestamp(&self.start_date).context("start_date")?;
        let end_time = self
            .end_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .context("end_date")?;

        let polygon = parse_polygon(&self.geometry).unwrap_or_else(|err| {
            warn!("Zone {} geometry unusable ({}), using fallback ring", self.id, err);
            fallback_ring.to_vec()
        });

        let bounding_box = self
            .bounding_box
            .as_deref()
            .and_then(|raw| serde_json::from_str::<BoundingBox>(raw).ok());

        Ok(ConflictZone {
            id: self.id,
            name: self.name,
            severity: u8::try_from(self.severity).unwrap_or(1),
            start_time,
            end_time,
            polygon,
            bounding_box,
            description: self.description,
        })
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD` date taken as midnight UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("unreadable timestamp '{}'", raw))?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("unreadable timestamp '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::init_database;
    use impact_core::{ReferenceDataset, FALLBACK_ZONE_RING};

    #[tokio::test]
    async fn zones_survive_a_round_trip() {
        let db = init_database(":memory:", 1).await.unwrap();
        let data = ReferenceDataset::builtin();
        for zone in data.zones() {
            upsert_zone(db.pool(), zone).await.unwrap();
        }
        upsert_zone(db.pool(), &data.zones()[0]).await.unwrap();

        let loaded = load_all_zones(db.pool(), &FALLBACK_ZONE_RING).await.unwrap();
        assert_eq!(loaded, data.zones());
    }

    #[tokio::test]
    async fn bad_geometry_falls_back_to_default_ring() {
        let db = init_database(":memory:", 1).await.unwrap();
        sqlx::query(
            "INSERT INTO conflict_zones (id, name, severity, start_date, geometry) VALUES ('x', 'Broken', 2, '2022-03-01', 'not a polygon')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO conflict_zones (id, name, severity, start_date, geometry) VALUES ('y', 'Wkt', 1, '2023-01-01T00:00:00Z', 'POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let loaded = load_all_zones(db.pool(), &FALLBACK_ZONE_RING).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].polygon, FALLBACK_ZONE_RING.to_vec());
        assert!(loaded[0].end_time.is_none());
        assert_eq!(loaded[1].polygon[1], [2.0, 1.0]);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = init_database(":memory:", 1).await.unwrap();
        let data = ReferenceDataset::builtin();
        upsert_zone(db.pool(), &data.zones()[1]).await.unwrap();
        assert!(delete_zone(db.pool(), "2").await.unwrap());
        assert!(!delete_zone(db.pool(), "2").await.unwrap());
        assert_eq!(count_zones(db.pool()).await.unwrap(), 0);
    }
}
