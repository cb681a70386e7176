use metrics_exporter_prometheus::PrometheusHandle;
use rentcheck::config::MarketConfig;
use rentcheck::identity::AnonymousUserId;
use rentcheck::market::{
    CsvMarketRentTable, InMemoryMarketRentCache, MarketRentError, MarketRentLookup,
};
use rentcheck::persona::Persona;
use rentcheck::submissions::{
    RecordId, RentInputRecord, RepositoryError, ScoreRecord, SubmissionRepository,
    SubmissionService,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub type CsvMarketLookup = MarketRentLookup<CsvMarketRentTable, InMemoryMarketRentCache>;

/// Shared handles injected into every route.
#[derive(Clone)]
pub struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) submissions: Arc<SubmissionService<InMemorySubmissionRepository>>,
    pub(crate) market: Option<Arc<CsvMarketLookup>>,
    pub(crate) default_persona: Persona,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, default_persona: Persona) -> Self {
        let repository = Arc::new(InMemorySubmissionRepository::default());
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            submissions: Arc::new(SubmissionService::new(repository)),
            market: None,
            default_persona,
        }
    }

    pub fn with_market(mut self, lookup: CsvMarketLookup) -> Self {
        self.market = Some(Arc::new(lookup));
        self
    }

    pub fn readiness(&self) -> Arc<AtomicBool> {
        self.readiness.clone()
    }
}

/// Builds the cache-backed lookup when a market rent CSV is configured.
pub(crate) fn load_market_lookup(
    config: &MarketConfig,
) -> Result<Option<CsvMarketLookup>, MarketRentError> {
    let Some(path) = config.rent_csv.as_ref() else {
        return Ok(None);
    };

    let table = CsvMarketRentTable::from_path(path)?;
    if table.is_empty() {
        warn!(path = %path.display(), "market rent table has no rows, every lookup will miss");
    } else {
        info!(path = %path.display(), zip_codes = table.len(), "market rent table loaded");
    }
    Ok(Some(MarketRentLookup::new(
        Arc::new(table),
        Arc::new(InMemoryMarketRentCache::default()),
    )))
}

#[derive(Default)]
struct Tables {
    inputs: HashMap<RecordId, RentInputRecord>,
    scores: HashMap<RecordId, ScoreRecord>,
}

#[derive(Default, Clone)]
pub struct InMemorySubmissionRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemorySubmissionRepository {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert_input(&self, record: RentInputRecord) -> Result<RentInputRecord, RepositoryError> {
        let mut guard = self.tables()?;
        if guard.inputs.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.inputs.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord, RepositoryError> {
        let mut guard = self.tables()?;
        if guard.scores.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if !guard.inputs.contains_key(&record.rent_input_id) {
            return Err(RepositoryError::DanglingInput(record.rent_input_id));
        }
        guard.scores.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_score(&self, id: &RecordId) -> Result<Option<ScoreRecord>, RepositoryError> {
        Ok(self.tables()?.scores.get(id).cloned())
    }

    fn fetch_input(&self, id: &RecordId) -> Result<Option<RentInputRecord>, RepositoryError> {
        Ok(self.tables()?.inputs.get(id).cloned())
    }

    fn scores_for_user(
        &self,
        user_id: &AnonymousUserId,
    ) -> Result<Vec<ScoreRecord>, RepositoryError> {
        Ok(self
            .tables()?
            .scores
            .values()
            .filter(|record| record.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect())
    }
}
