use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::Settings;
use crate::deepbook::{DeepBookGateway, PoolInfo};
use crate::grid::{
    compute_grid_levels, price_step, GridError, GridLevel, GridParameters, GridResult, GridSummary,
};
use crate::helpers::Network;
use crate::journal::{StepJournal, StepStatus};

/// Where the current price of a plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// `grid.current_price` from the configuration
    Configured,
    /// Pool mid price read through the gateway
    PoolMid,
}

/// A computed ladder with its context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub network: Network,
    pub pool_key: String,
    pub price_source: PriceSource,
    pub parameters: GridParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_step: Option<f64>,
    pub levels: Vec<GridLevel>,
    pub summary: GridSummary,
}

impl GridPlan {
    /// Save plan to JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> GridResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load plan from JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> GridResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn log_journal(journal: &StepJournal) {
    match journal.path() {
        Some(path) => info!("Journaling steps to {}", path.display()),
        None => debug!("Step journal disabled"),
    }
}

/// Drives the calculator from settings and a DeepBook gateway
pub struct GridPlanner<G: DeepBookGateway> {
    settings: Settings,
    gateway: G,
    journal: StepJournal,
}

impl<G: DeepBookGateway> GridPlanner<G> {
    /// Create a planner; fails if the settings do not validate
    pub fn new(settings: Settings, gateway: G) -> GridResult<Self> {
        settings.validate()?;
        let journal = StepJournal::new(settings.journal.path.as_ref().map(PathBuf::from));
        log_journal(&journal);
        Ok(Self {
            settings,
            gateway,
            journal,
        })
    }

    /// Builder: override the journal built from settings
    pub fn with_journal(mut self, journal: StepJournal) -> Self {
        log_journal(&journal);
        self.journal = journal;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Journal failures never fail the plan
    fn journal_step(&self, run_id: Uuid, step: &str, status: StepStatus, detail: Value) {
        if let Err(e) = self.journal.record(run_id, step, status, detail) {
            warn!("Failed to journal step '{}': {}", step, e);
        }
    }

    /// Record the outcome of `result` and pass it through
    fn track<T>(
        &self,
        run_id: Uuid,
        step: &str,
        result: GridResult<T>,
        detail: impl FnOnce(&T) -> Value,
    ) -> GridResult<T> {
        match &result {
            Ok(value) => self.journal_step(run_id, step, StepStatus::Ok, detail(value)),
            Err(e) => self.journal_step(
                run_id,
                step,
                StepStatus::Failed,
                json!({ "error": e.to_string() }),
            ),
        }
        result
    }

    /// Configured price if set, else the pool mid price
    async fn resolve_current_price(&self) -> GridResult<(f64, PriceSource)> {
        if let Some(price) = self.settings.grid.current_price {
            debug!("Using configured current price {}", price);
            return Ok((price, PriceSource::Configured));
        }

        let pool_key = &self.settings.pool.key;
        info!("Fetching mid price for {}...", pool_key);
        let price = self.gateway.mid_price(pool_key).await?;
        if !price.is_finite() || price <= 0.0 {
            return Err(GridError::Gateway(format!(
                "invalid mid price {price} for {pool_key}"
            )));
        }
        Ok((price, PriceSource::PoolMid))
    }

    /// Resolve the current price, compute the ladder and summarize it
    pub async fn plan(&self) -> GridResult<GridPlan> {
        let run_id = Uuid::new_v4();
        let network = self.settings.network()?;
        let pool_key = self.settings.pool.key.clone();
        info!("Planning grid {} for {} on {}", run_id, pool_key, network);

        let resolved = self.resolve_current_price().await;
        let (current_price, price_source) =
            self.track(run_id, "resolve_price", resolved, |r: &(f64, PriceSource)| {
                json!({ "pool": pool_key, "price": r.0, "source": r.1 })
            })?;
        info!("Current price for {}: {} ({:?})", pool_key, current_price, price_source);

        let parameters = self.settings.grid_parameters(current_price);
        let validated = parameters.validate();
        self.track(run_id, "validate_parameters", validated, |_| {
            json!({
                "min_price": parameters.min_price,
                "max_price": parameters.max_price,
                "levels": parameters.levels,
            })
        })?;

        let levels = compute_grid_levels(&parameters);
        let summary = GridSummary::from_levels(&levels);
        self.journal_step(
            run_id,
            "compute_levels",
            StepStatus::Ok,
            serde_json::to_value(summary)?,
        );
        info!(
            "Computed {} levels: {} bids / {} asks, notional {:.2} of capital {:.2}",
            summary.num_levels(),
            summary.num_bids,
            summary.num_asks,
            summary.total_notional,
            parameters.total_capital
        );
        for level in &levels {
            debug!(
                "  {:>4} {:>14.6} x {:.2}",
                level.side.as_str(),
                level.price,
                level.quantity
            );
        }

        Ok(GridPlan {
            id: run_id,
            created_at: Utc::now(),
            network,
            pool_key,
            price_source,
            price_step: price_step(&parameters),
            parameters,
            levels,
            summary,
        })
    }

    /// All pools known to the gateway
    pub async fn list_pools(&self) -> GridResult<Vec<PoolInfo>> {
        let run_id = Uuid::new_v4();
        let pools = self.gateway.pools().await;
        let pools = self.track(run_id, "list_pools", pools, |p| json!({ "count": p.len() }))?;
        info!("Found {} pools", pools.len());
        Ok(pools)
    }

    /// Balance managers of the configured owner
    pub async fn list_balance_managers(&self) -> GridResult<Vec<String>> {
        let run_id = Uuid::new_v4();
        let owner = match &self.settings.network.owner_address {
            Some(owner) => owner.clone(),
            None => {
                self.journal_step(run_id, "list_balance_managers", StepStatus::Skipped, Value::Null);
                return Err(GridError::InvalidConfig(
                    "network.owner_address is required to list balance managers".into(),
                ));
            }
        };

        info!("Looking up balance managers for {}...", owner);
        let ids = self.gateway.balance_manager_ids(&owner).await;
        let ids = self.track(run_id, "list_balance_managers", ids, |ids| {
            json!({ "owner": owner, "count": ids.len() })
        })?;
        if ids.is_empty() {
            warn!("No balance managers found for {}", owner);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridSection, JournalConfig, LogConfig, NetworkConfig, PoolConfig};
    use crate::deepbook::mock::MockGateway;
    use crate::grid::OrderSide;

    fn settings(current_price: Option<f64>) -> Settings {
        Settings {
            network: NetworkConfig {
                env: "testnet".into(),
                fullnode_url: None,
                indexer_url: None,
                deepbook_package: None,
                owner_address: Some("0xabc".into()),
                private_key: None,
            },
            pool: PoolConfig {
                key: "SUI_USDC".into(),
                balance_manager: Some("0xbeef".into()),
            },
            grid: GridSection {
                min_price: 10.0,
                max_price: 20.0,
                levels: 5,
                total_capital: 1000.0,
                current_price,
            },
            log: LogConfig::default(),
            journal: JournalConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_plan_uses_pool_mid_price() {
        let gateway = MockGateway::new().with_mid_price("SUI_USDC", 15.0);
        let planner = GridPlanner::new(settings(None), gateway).unwrap();

        let plan = planner.plan().await.unwrap();
        assert_eq!(plan.price_source, PriceSource::PoolMid);
        assert_eq!(plan.pool_key, "SUI_USDC");
        assert_eq!(plan.network, Network::Testnet);
        assert_eq!(plan.levels.len(), 5);
        assert_eq!(plan.summary.num_bids, 2);
        assert_eq!(plan.summary.num_asks, 3);
        assert!((plan.price_step.unwrap() - 2.5).abs() < 1e-9);
        assert_eq!(plan.parameters.account_reference.as_deref(), Some("0xbeef"));
        assert_eq!(planner.gateway.mid_price_calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_price_skips_gateway() {
        let planner = GridPlanner::new(settings(Some(11.0)), MockGateway::new()).unwrap();

        let plan = planner.plan().await.unwrap();
        assert_eq!(plan.price_source, PriceSource::Configured);
        assert_eq!(plan.levels[0].side, OrderSide::Bid);
        assert!(plan.levels[1..].iter().all(|l| l.side == OrderSide::Ask));
        assert_eq!(planner.gateway.mid_price_calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces() {
        let gateway = MockGateway::new().with_mid_price("SUI_USDC", 15.0);
        gateway.set_should_fail(true).await;
        let planner = GridPlanner::new(settings(None), gateway).unwrap();

        assert!(matches!(planner.plan().await, Err(GridError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_invalid_band_fails_fast() {
        let mut s = settings(Some(15.0));
        s.grid.max_price = 5.0;
        let planner = GridPlanner::new(s, MockGateway::new()).unwrap();

        assert!(matches!(
            planner.plan().await,
            Err(GridError::InvalidParameters(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let mut s = settings(None);
        s.pool.key = String::new();
        assert!(GridPlanner::new(s, MockGateway::new()).is_err());
    }

    #[test]
    fn test_journal_path_comes_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let journal_path = dir.path().join("steps.jsonl");
        let mut s = settings(Some(15.0));
        s.journal.path = Some(journal_path.to_string_lossy().into_owned());

        let planner = GridPlanner::new(s, MockGateway::new()).unwrap();
        assert_eq!(planner.settings().pool.key, "SUI_USDC");
        assert_eq!(planner.journal.path(), Some(journal_path.as_path()));

        let planner = planner.with_journal(StepJournal::disabled());
        assert!(planner.journal.path().is_none());
    }

    #[tokio::test]
    async fn test_steps_are_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let journal = StepJournal::new(Some(dir.path().join("steps.jsonl")));
        let gateway = MockGateway::new().with_mid_price("SUI_USDC", 15.0);
        let planner = GridPlanner::new(settings(None), gateway)
            .unwrap()
            .with_journal(journal.clone());

        let plan = planner.plan().await.unwrap();

        let records = journal.read_all().unwrap();
        let steps: Vec<&str> = records.iter().map(|r| r.step.as_str()).collect();
        assert_eq!(steps, vec!["resolve_price", "validate_parameters", "compute_levels"]);
        assert!(records.iter().all(|r| r.run_id == plan.id));
        assert!(records.iter().all(|r| r.status == StepStatus::Ok));
    }

    #[tokio::test]
    async fn test_failed_step_is_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let journal = StepJournal::new(Some(dir.path().join("steps.jsonl")));
        let planner = GridPlanner::new(settings(None), MockGateway::new())
            .unwrap()
            .with_journal(journal.clone());

        // No mid price configured for the pool
        assert!(planner.plan().await.is_err());

        let records = journal.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, StepStatus::Failed);
        assert!(records[0].detail["error"].as_str().unwrap().contains("SUI_USDC"));
    }

    #[tokio::test]
    async fn test_list_balance_managers() {
        let gateway = MockGateway::new();
        gateway.add_manager("0xabc", "0xmanager1").await;
        gateway.add_manager("0xabc", "0xmanager2").await;
        gateway.add_manager("0xdef", "0xother").await;
        let planner = GridPlanner::new(settings(None), gateway).unwrap();

        let ids = planner.list_balance_managers().await.unwrap();
        assert_eq!(ids, vec!["0xmanager1".to_string(), "0xmanager2".to_string()]);
    }

    #[tokio::test]
    async fn test_list_balance_managers_requires_owner() {
        let mut s = settings(None);
        s.network.owner_address = None;
        let planner = GridPlanner::new(s, MockGateway::new()).unwrap();

        assert!(matches!(
            planner.list_balance_managers().await,
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_plan_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let planner = GridPlanner::new(settings(Some(15.0)), MockGateway::new()).unwrap();

        let plan = planner.plan().await.unwrap();
        plan.save_to_file(&path).unwrap();
        let loaded = GridPlan::load_from_file(&path).unwrap();

        assert_eq!(loaded.id, plan.id);
        assert_eq!(loaded.levels.len(), plan.levels.len());
        for (a, b) in loaded.levels.iter().zip(&plan.levels) {
            assert_eq!(a.side, b.side);
            assert!((a.price - b.price).abs() < 1e-9);
            assert!((a.quantity - b.quantity).abs() < 1e-9);
        }
    }
}
