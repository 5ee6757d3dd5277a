//! Layered configuration for `pkl-builtins-gen`.
//!
//! Values are merged in increasing order of precedence: built-in defaults,
//! the `pkl-builtins-gen.toml` file, `PKL_BUILTINS_GEN_*` environment
//! variables, and finally flags passed on the command line.

use std::time::Duration;

use camino::Utf8PathBuf;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::{GenError, GenResult};

/// Configuration file read from the working directory when present.
pub const CONFIG_FILE_NAME: &str = "pkl-builtins-gen.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "PKL_BUILTINS_GEN_";

/// Default per-fragment reflection timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Project root; the fixed `pkl/` and `scripts/` layout lives beneath it.
    pub root: Utf8PathBuf,
    /// Pkl executable used for formatting and reflection.
    pub pkl: String,
    /// Seconds to wait for a single reflection call.
    pub timeout_secs: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            pkl: "pkl".to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GenConfig {
    /// Loads the configuration, applying every layer.
    ///
    /// A missing default configuration file is not an error, but a file named
    /// explicitly with `--config` must exist.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] when an explicit configuration file is missing
    /// and [`GenError::Config`] when the merged values cannot be extracted.
    pub fn load(args: &Args) -> GenResult<Self> {
        if let Some(path) = args.config.as_ref()
            && !path.is_file()
        {
            return Err(GenError::io(
                path.clone(),
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "configuration file not found",
                ),
            ));
        }

        Ok(Self::figment(args).extract()?)
    }

    /// Builds the layered figment without extracting it.
    ///
    /// The default configuration file joins the layers only when it exists.
    #[must_use]
    pub fn figment(args: &Args) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = config_file(args) {
            figment = figment.merge(Toml::file_exact(file.as_std_path()));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(args))
    }

    /// Reflection timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn config_file(args: &Args) -> Option<Utf8PathBuf> {
    args.config.clone().or_else(|| {
        let default = Utf8PathBuf::from(CONFIG_FILE_NAME);
        default.is_file().then_some(default)
    })
}
