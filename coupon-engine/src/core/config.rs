use std::path::PathBuf;

/// Database file name inside the work directory
const DB_FILE_NAME: &str = "coupons.redb";

/// Engine configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | Database and log location |
/// | ENVIRONMENT | development | Runtime environment |
/// | LOG_LEVEL | info | Log level filter |
/// | LOG_DIR | (unset) | Enables daily rolling log files |
/// | MULTI_COUPON_ENABLED | false | Allow more than one coupon per cart |
/// | MAX_COUPONS_PER_ORDER | 1 | Cap when multi-coupon mode is enabled |
/// | CURRENCY_SCALE | 2 | Minor-unit decimal places for discount lines |
///
/// ```ignore
/// MULTI_COUPON_ENABLED=true MAX_COUPONS_PER_ORDER=3 cargo test
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the redb database
    pub work_dir: String,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Multi-coupon mode switch; when off the cap is always 1
    pub multi_coupon_enabled: bool,
    /// Administrator-set cap, used only in multi-coupon mode
    pub max_coupons_per_order: usize,
    /// Decimal places of the currency's minor unit
    pub currency_scale: u32,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            multi_coupon_enabled: std::env::var("MULTI_COUPON_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            max_coupons_per_order: std::env::var("MAX_COUPONS_PER_ORDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            currency_scale: std::env::var("CURRENCY_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
        }
    }

    /// Load `.env` (if present) and then read the environment
    pub fn load() -> Self {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "No .env file loaded");
        }
        Self::from_env()
    }

    /// Override work dir and coupon cap
    ///
    /// Mostly used by tests.
    pub fn with_overrides(
        work_dir: impl Into<String>,
        multi_coupon_enabled: bool,
        max_coupons_per_order: usize,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.multi_coupon_enabled = multi_coupon_enabled;
        config.max_coupons_per_order = max_coupons_per_order;
        config
    }

    /// Maximum number of coupons a cart or order may carry
    ///
    /// 1 unless multi-coupon mode is enabled; a configured 0 is treated as 1.
    pub fn effective_max_coupons(&self) -> usize {
        if self.multi_coupon_enabled {
            self.max_coupons_per_order.max(1)
        } else {
            1
        }
    }

    /// Path of the redb database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(DB_FILE_NAME)
    }

    /// Install the global subscriber from `log_level` and `log_dir`
    pub fn init_logging(&self) -> anyhow::Result<()> {
        crate::utils::logger::init_logger_with_file(&self.log_level, self.log_dir.as_deref())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
