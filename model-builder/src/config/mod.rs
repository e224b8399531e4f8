use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Inputs of the training job. Defaults reproduce the reference artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    pub n_samples: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub output_path: PathBuf,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            seed: 42,
            test_fraction: 0.2,
            n_estimators: 100,
            output_path: PathBuf::from("health_model.json"),
        }
    }
}

impl BuilderConfig {
    /// Defaults overridden by `BUILDER_*` environment variables (and `.env`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            n_samples: get_env("BUILDER_N_SAMPLES", defaults.n_samples)?,
            seed: get_env("BUILDER_SEED", defaults.seed)?,
            test_fraction: get_env("BUILDER_TEST_FRACTION", defaults.test_fraction)?,
            n_estimators: get_env("BUILDER_N_ESTIMATORS", defaults.n_estimators)?,
            output_path: get_env("BUILDER_OUTPUT_PATH", defaults.output_path)?,
        };

        if !(0.0..1.0).contains(&config.test_fraction) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BUILDER_TEST_FRACTION must be in [0, 1), got {}",
                config.test_fraction
            )));
        }
        Ok(config)
    }
}

fn get_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value `{}`: {}", key, val, e))
        }),
        Err(_) => Ok(default),
    }
}
