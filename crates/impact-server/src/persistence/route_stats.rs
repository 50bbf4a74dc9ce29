//! Route statistics persistence, keyed on (origin, destination, period).

use anyhow::Result;
use impact_core::{Period, RouteImpactRecord};
use sqlx::SqlitePool;

/// Insert or replace the record for its key.
pub async fn upsert_route_stat(pool: &SqlitePool, record: &RouteImpactRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO route_statistics (
            origin_iata, destination_iata, period, avg_distance_km, avg_flight_time_minutes,
            avg_detour_km, total_extra_fuel_liters, total_co2_impact_tons, total_flights, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, CURRENT_TIMESTAMP)
        ON CONFLICT(origin_iata, destination_iata, period) DO UPDATE SET
            avg_distance_km = ?4, avg_flight_time_minutes = ?5, avg_detour_km = ?6,
            total_extra_fuel_liters = ?7, total_co2_impact_tons = ?8, total_flights = ?9,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&record.origin_iata)
    .bind(&record.destination_iata)
    .bind(record.period.as_str())
    .bind(record.avg_distance_km)
    .bind(record.avg_flight_time_minutes)
    .bind(record.avg_detour_km)
    .bind(record.total_extra_fuel_liters)
    .bind(record.total_co2_impact_tons)
    .bind(i64::from(record.total_flights))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_route_stat(
    pool: &SqlitePool,
    origin: &str,
    destination: &str,
    period: Period,
) -> Result<Option<RouteImpactRecord>> {
    let row = sqlx::query_as::<_, RouteStatRow>(
        r#"
        SELECT origin_iata, destination_iata, period, avg_distance_km, avg_flight_time_minutes,
               avg_detour_km, total_extra_fuel_liters, total_co2_impact_tons, total_flights
        FROM route_statistics
        WHERE origin_iata = ?1 AND destination_iata = ?2 AND period = ?3
        "#,
    )
    .bind(origin)
    .bind(destination)
    .bind(period.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(RouteImpactRecord::try_from).transpose()
}

/// All records for a period, largest detour first.
pub async fn load_route_stats(pool: &SqlitePool, period: Period) -> Result<Vec<RouteImpactRecord>> {
    let rows = sqlx::query_as::<_, RouteStatRow>(
        r#"
        SELECT origin_iata, destination_iata, period, avg_distance_km, avg_flight_time_minutes,
               avg_detour_km, total_extra_fuel_liters, total_co2_impact_tons, total_flights
        FROM route_statistics
        WHERE period = ?1
        ORDER BY avg_detour_km DESC
        "#,
    )
    .bind(period.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RouteImpactRecord::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct RouteStatRow {
    origin_iata: String,
    destination_iata: String,
    period: String,
    avg_distance_km: f64,
    avg_flight_time_minutes: f64,
    avg_detour_km: f64,
    total_extra_fuel_liters: f64,
    total_co2_impact_tons: f64,
    total_flights: i64,
}

impl TryFrom<RouteStatRow> for RouteImpactRecord {
    type Error = anyhow::Error;

    fn try_from(row: RouteStatRow) -> Result<Self> {
        Ok(RouteImpactRecord {
            origin_iata: row.origin_iata,
            destination_iata: row.destination_iata,
            period: row.period.parse()?,
            avg_distance_km: row.avg_distance_km,
            avg_flight_time_minutes: row.avg_flight_time_minutes,
            avg_detour_km: row.avg_detour_km,
            total_extra_fuel_liters: row.total_extra_fuel_liters,
            total_co2_impact_tons: row.total_co2_impact_tons,
            total_flights: u32::try_from(row.total_flights).unwrap_or(0),
        })
    }
}
