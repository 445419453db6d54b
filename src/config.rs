// JSON configuration: sheet locations, default budgets and the refresh time.
use crate::budget::{is_placeholder, BudgetSeed};
use crate::error::{Error, Result};
use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dashboard configuration, read from a JSON file. Every field is optional in
/// the file and falls back to `Config::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the exported sheets.
    pub data_dir: PathBuf,
    /// Sheet file name per platform, relative to `data_dir`.
    pub sheets: BTreeMap<Platform, String>,
    /// Budget sheet file name per platform and month code (`JAN`..`DEC`).
    pub budget_sheets: BTreeMap<Platform, BTreeMap<String, String>>,
    /// Budget used for a platform when no sheet is assigned.
    pub default_budgets: BTreeMap<Platform, Vec<BudgetSeed>>,
    /// Year the pacing month selector refers to.
    pub reference_year: i32,
    pub refresh_hour: u32,
    pub refresh_minute: u32,
    /// Number of categories in the category chart.
    pub top_categories: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sheets: Platform::ALL
                .iter()
                .map(|p| (*p, format!("{}.csv", p)))
                .collect(),
            budget_sheets: BTreeMap::new(),
            default_budgets: BTreeMap::from([
                (Platform::TikTok, default_seeds(1_500_000.0)),
                (Platform::Facebook, default_seeds(400_000.0)),
            ]),
            reference_year: 2026,
            refresh_hour: 12,
            refresh_minute: 0,
            top_categories: 10,
        }
    }
}

// An even split over the largest product lines, 80% primary pool.
fn default_seeds(total: f64) -> Vec<BudgetSeed> {
    let codes = ["L3", "L4", "L10", "L6"];
    let each = total / codes.len() as f64;
    codes
        .iter()
        .map(|code| BudgetSeed {
            code: code.to_string(),
            primary: each * 0.8,
            secondary: each * 0.2,
            sale: 0.6,
            review: 0.3,
            branding: 0.1,
        })
        .collect()
}

impl Config {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let data = fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_hour > 23 || self.refresh_minute > 59 {
            return Err(Error::Config(format!(
                "refresh time {}:{:02} is not a valid time of day",
                self.refresh_hour, self.refresh_minute
            )));
        }
        Ok(())
    }

    pub fn sheet_file(&self, platform: Platform) -> String {
        self.sheets
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| format!("{}.csv", platform))
    }

    /// Path of the budget sheet assigned to `platform` for `month_code`, if a
    /// real one has been configured.
    pub fn budget_sheet(&self, platform: Platform, month_code: &str) -> Option<PathBuf> {
        self.budget_sheets
            .get(&platform)?
            .get(&month_code.to_uppercase())
            .filter(|f| !is_placeholder(f))
            .map(|f| self.data_dir.join(f))
    }

    pub fn default_budget(&self, platform: Platform) -> &[BudgetSeed] {
        self.default_budgets
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
