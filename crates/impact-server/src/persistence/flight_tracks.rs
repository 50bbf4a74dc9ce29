//! Flight track persistence.

use anyhow::Result;
use chrono::{DateTime, Utc};
use impact_core::{FlightTrack, Period};
use sqlx::SqlitePool;

/// Insert tracks in a single transaction.
pub async fn insert_flight_tracks(pool: &SqlitePool, tracks: &[FlightTrack]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for track in tracks {
        let route = serde_json::to_string(&track.route)?;
        sqlx::query(
            r#"
            INSERT INTO flight_tracks (
                flight_number, origin_iata, destination_iata, period, departure_time, route,
                distance_km, flight_time_minutes, detour_km, extra_fuel_liters, co2_impact_tons
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&track.flight_number)
        .bind(&track.origin_iata)
        .bind(&track.destination_iata)
        .bind(track.period.as_str())
        .bind(track.departure_time.to_rfc3339())
        .bind(&route)
        .bind(track.distance_km)
        .bind(track.flight_time_minutes)
        .bind(track.detour_km)
        .bind(track.extra_fuel_liters)
        .bind(track.co2_impact_tons)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn count_flight_tracks(pool: &SqlitePool, period: Period) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flight_tracks WHERE period = ?1")
        .bind(period.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn load_flight_tracks(pool: &SqlitePool, period: Period) -> Result<Vec<FlightTrack>> {
    let rows = sqlx::query_as::<_, FlightTrackRow>(
        r#"
        SELECT flight_number, origin_iata, destination_iata, period, departure_time, route,
               distance_km, flight_time_minutes, detour_km, extra_fuel_liters, co2_impact_tons
        FROM flight_tracks
        WHERE period = ?1
        ORDER BY id
        "#,
    )
    .bind(period.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(FlightTrack::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct FlightTrackRow {
    flight_number: String,
    origin_iata: String,
    destination_iata: String,
    period: String,
    departure_time: String,
    route: String,
    distance_km: f64,
    flight_time_minutes: f64,
    detour_km: f64,
    extra_fuel_liters: f64,
    co2_impact_tons: f64,
}

impl TryFrom<FlightTrackRow> for FlightTrack {
    type Error = anyhow::Error;

    fn try_from(row: FlightTrackRow) -> Result<Self> {
        let departure_time = DateTime::parse_from_rfc3339(&row.departure_time)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(FlightTrack {
            flight_number: row.flight_number,
            origin_iata: row.origin_iata,
            destination_iata: row.destination_iata,
            period: row.period.parse()?,
            departure_time,
            route: serde_json::from_str(&row.route)?,
            distance_km: row.distance_km,
            flight_time_minutes: row.flight_time_minutes,
            detour_km: row.detour_km,
            extra_fuel_liters: row.extra_fuel_liters,
            co2_impact_tons: row.co2_impact_tons,
        })
    }
}
