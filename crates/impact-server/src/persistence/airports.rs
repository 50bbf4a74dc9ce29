//! Airport directory persistence.

use anyhow::Result;
use impact_core::{Airport, GeoPoint};
use sqlx::SqlitePool;

pub async fn upsert_airport(pool: &SqlitePool, airport: &Airport) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO airports (iata_code, name, city, country, lat, lon)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(iata_code) DO UPDATE SET
            name = ?2, city = ?3, country = ?4, lat = ?5, lon = ?6
        "#,
    )
    .bind(&airport.iata)
    .bind(&airport.name)
    .bind(&airport.city)
    .bind(&airport.country)
    .bind(airport.location.map(|p| p.lat))
    .bind(airport.location.map(|p| p.lon))
    .execute(pool)
    .await?;

    Ok(())
}

/// All airports ordered by IATA code.
pub async fn load_all_airports(pool: &SqlitePool) -> Result<Vec<Airport>> {
    let rows = sqlx::query_as::<_, AirportRow>(
        "SELECT iata_code, name, city, country, lat, lon FROM airports ORDER BY iata_code",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Airport::from).collect())
}

pub async fn count_airports(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM airports")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    iata_code: String,
    name: String,
    city: String,
    country: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            iata: row.iata_code,
            name: row.name,
            city: row.city,
            country: row.country,
            location: match (row.lat, row.lon) {
                (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
                _ => None,
            },
        }
    }
}
