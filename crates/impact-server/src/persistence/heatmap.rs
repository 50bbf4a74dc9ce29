//! Heatmap cell persistence, keyed on (period, grid cell).

use anyhow::Result;
use impact_core::{HeatmapPoint, Period};
use sqlx::SqlitePool;

/// Upsert points in one transaction. Points sharing a cell overwrite each
/// other; the last one wins.
pub async fn upsert_heatmap_points(pool: &SqlitePool, points: &[HeatmapPoint]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for point in points {
        sqlx::query(
            r#"
            INSERT INTO heatmap_data (period, grid_cell, lat, lng, intensity, flight_count, avg_detour_km)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(period, grid_cell) DO UPDATE SET
                lat = ?3, lng = ?4, intensity = ?5, flight_count = ?6, avg_detour_km = ?7
            "#,
        )
        .bind(point.period.as_str())
        .bind(point.grid_cell())
        .bind(point.lat)
        .bind(point.lng)
        .bind(point.intensity)
        .bind(i64::from(point.flight_count))
        .bind(point.avg_detour_km)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn load_heatmap_points(pool: &SqlitePool, period: Period) -> Result<Vec<HeatmapPoint>> {
    let rows = sqlx::query_as::<_, HeatmapRow>(
        "SELECT period, lat, lng, intensity, flight_count, avg_detour_km FROM heatmap_data WHERE period = ?1 ORDER BY grid_cell",
    )
    .bind(period.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(HeatmapPoint::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct HeatmapRow {
    period: String,
    lat: f64,
    lng: f64,
    intensity: f64,
    flight_count: i64,
    avg_detour_km: f64,
}

impl TryFrom<HeatmapRow> for HeatmapPoint {
    type Error = anyhow::Error;

    fn try_from(row: HeatmapRow) -> Result<Self> {
        Ok(HeatmapPoint {
            lat: row.lat,
            lng: row.lng,
            period: row.period.parse()?,
            intensity: row.intensity,
            flight_count: u32::try_from(row.flight_count).unwrap_or(0),
            avg_detour_km: row.avg_detour_km,
        })
    }
}
