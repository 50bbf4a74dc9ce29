//! In-memory state store using DashMap, written through to SQLite.

use anyhow::Result;
use dashmap::DashMap;
use impact_core::{
    Airport, AirportLookup, ConflictZone, HeatmapConfig, ImpactConfig, ImpactError,
    PeriodWindows, ReferenceDataset, SampleConfig, StatsAggregator, StatsConfig, ZoneRegistry,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;
use crate::persistence::{self, Database};

/// Application state: reference directories plus the analysis settings.
pub struct AppState {
    db: Option<Database>,
    config: Config,
    airports: DashMap<String, Airport>,
    zones: DashMap<String, ConflictZone>,
    reference: Arc<ReferenceDataset>,
    windows: PeriodWindows,
    impact: ImpactConfig,
    stats: StatsAggregator,
    heatmap: HeatmapConfig,
    samples: SampleConfig,
    /// Held while sample flights are seeded
    seed_lock: Mutex<()>,
}

impl AppState {
    /// State without a store, preloaded with the built-in reference data.
    pub fn new(config: Config) -> Self {
        let state = Self::build(None, config);
        for airport in state.reference.airports() {
            state.airports.insert(airport.iata.clone(), airport.clone());
        }
        for zone in state.reference.zones() {
            state.zones.insert(zone.id.clone(), zone.clone());
        }
        state
    }

    /// State backed by `db`. Call [`AppState::load_from_database`] before serving.
    pub fn with_database(db: Database, config: Config) -> Self {
        Self::build(Some(db), config)
    }

    fn build(db: Option<Database>, config: Config) -> Self {
        let reference = Arc::new(ReferenceDataset::builtin());
        Self {
            db,
            windows: PeriodWindows::default().with_during_end(config.during_end),
            config,
            airports: DashMap::new(),
            zones: DashMap::new(),
            stats: StatsAggregator::new(StatsConfig::default(), reference.clone()),
            reference,
            impact: ImpactConfig::default(),
            heatmap: HeatmapConfig::default(),
            samples: SampleConfig::default(),
            seed_lock: Mutex::new(()),
        }
    }

    /// Seed an empty store with the reference data, then load the
    /// directories into memory.
    pub async fn load_from_database(&self) -> Result<()> {
        let Some(pool) = self.pool() else {
            return Ok(());
        };

        if self.config.seed_reference {
            if persistence::airports::count_airports(pool).await? == 0 {
                for airport in self.reference.airports() {
                    persistence::airports::upsert_airport(pool, airport).await?;
                }
                info!("Seeded {} reference airports", self.reference.airports().len());
            }
            if persistence::zones::count_zones(pool).await? == 0 {
                for zone in self.reference.zones() {
                    persistence::zones::upsert_zone(pool, zone).await?;
                }
                info!("Seeded {} reference conflict zones", self.reference.zones().len());
            }
        }

        let airports = persistence::airports::load_all_airports(pool).await?;
        self.airports.clear();
        for airport in airports {
            self.airports.insert(airport.iata.clone(), airport);
        }

        let zones = persistence::zones::load_all_zones(pool, self.reference.fallback_ring()).await?;
        self.zones.clear();
        for zone in zones {
            self.zones.insert(zone.id.clone(), zone);
        }

        info!(
            "Loaded {} airports and {} conflict zones",
            self.airports.len(),
            self.zones.len()
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> Option<&SqlitePool> {
        self.db.as_ref().map(Database::pool)
    }

    /// Pool, or `UpstreamUnavailable` when the server runs without a store.
    pub fn require_pool(&self) -> Result<&SqlitePool, ImpactError> {
        self.pool()
            .ok_or_else(|| ImpactError::UpstreamUnavailable("no database configured".to_string()))
    }

    pub fn seed_lock(&self) -> &Mutex<()> {
        &self.seed_lock
    }

    pub fn reference(&self) -> &ReferenceDataset {
        &self.reference
    }

    pub fn windows(&self) -> PeriodWindows {
        self.windows
    }

    pub fn impact_config(&self) -> &ImpactConfig {
        &self.impact
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn heatmap_config(&self) -> &HeatmapConfig {
        &self.heatmap
    }

    pub fn sample_config(&self) -> &SampleConfig {
        &self.samples
    }

    /// All airports ordered by IATA code.
    pub fn get_airports(&self) -> Vec<Airport> {
        let mut airports: Vec<Airport> = self.airports.iter().map(|r| r.value().clone()).collect();
        airports.sort_by(|a, b| a.iata.cmp(&b.iata));
        airports
    }

    pub fn get_zone(&self, id: &str) -> Option<ConflictZone> {
        self.zones.get(id).map(|r| r.value().clone())
    }

    /// Snapshot of the current zones, ordered by id.
    pub fn zone_registry(&self) -> ZoneRegistry {
        let mut zones: Vec<ConflictZone> = self.zones.iter().map(|r| r.value().clone()).collect();
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        ZoneRegistry::new(zones, self.windows)
    }

    /// Store the zone, then refresh the in-memory copy.
    pub async fn upsert_zone(&self, zone: ConflictZone) -> Result<()> {
        if let Some(pool) = self.pool() {
            persistence::zones::upsert_zone(pool, &zone).await?;
        }
        self.zones.insert(zone.id.clone(), zone);
        Ok(())
    }

    /// Remove the zone. Returns `false` when it did not exist.
    pub async fn remove_zone(&self, id: &str) -> Result<bool> {
        let stored = match self.pool() {
            Some(pool) => persistence::zones::delete_zone(pool, id).await?,
            None => false,
        };
        let cached = self.zones.remove(id).is_some();
        Ok(stored || cached)
    }
}

impl AirportLookup for AppState {
    fn get_airport(&self, iata: &str) -> Option<Airport> {
        self.airports.get(iata).map(|r| r.value().clone())
    }
}
