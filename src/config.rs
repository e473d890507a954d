use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::domain::{DestinationFormat, SourceFormat, Threshold};
use crate::error::SimError;

pub const CONFIG_FILE_NAME: &str = "chembl-sim.json";
pub const BASE_URL_ENV: &str = "CHEMBL_SIM_BASE_URL";
pub const MAX_PAGE_SIZE: usize = 1000;

/// Run options as given on the command line, before validation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: Option<Utf8PathBuf>,
    pub output: Option<Utf8PathBuf>,
    pub threshold: String,
    pub source_format: String,
    pub destination_format: String,
    pub human: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            threshold: "95".to_string(),
            source_format: "csv".to_string(),
            destination_format: "chembl_id".to_string(),
            human: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: Option<Utf8PathBuf>,
    pub output: Option<Utf8PathBuf>,
    pub threshold: Threshold,
    pub source_format: SourceFormat,
    pub destination_format: DestinationFormat,
    pub human: bool,
}

impl RunOptions {
    /// Validates threshold and formats. Nothing is opened or read here.
    pub fn resolve(self) -> Result<RunConfig, SimError> {
        let threshold = self.threshold.parse::<Threshold>()?;
        let source_format = self.source_format.parse::<SourceFormat>()?;
        let destination_format = self.destination_format.parse::<DestinationFormat>()?;
        Ok(RunConfig {
            input: self.input,
            output: self.output,
            threshold,
            source_format,
            destination_format,
            human: self.human,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            max_retries: default_max_retries(),
        }
    }
}

impl ServiceConfig {
    pub fn page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV)
            && !url.trim().is_empty()
        {
            self.base_url = url.trim().to_string();
        }
        self
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist. Otherwise the working directory and then
    /// the user config dir are searched, falling back to built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ServiceConfig, SimError> {
        let config = match path {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => match Self::discover() {
                Some(found) => Self::load(found)?,
                None => ServiceConfig::default(),
            },
        };
        Ok(config.with_env_overrides())
    }

    pub fn parse(content: &str) -> Result<ServiceConfig, SimError> {
        serde_json::from_str(content).map_err(|err| SimError::ConfigParse(err.to_string()))
    }

    fn load(path: PathBuf) -> Result<ServiceConfig, SimError> {
        let content = fs::read_to_string(&path).map_err(|_| SimError::ConfigRead(path.clone()))?;
        tracing::debug!(path = %path.display(), "loaded service config");
        Self::parse(&content)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("org", "chembl", "chembl-sim")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }
}

fn default_base_url() -> String {
    "https://www.ebi.ac.uk/chembl/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    20
}

fn default_max_retries() -> usize {
    3
}
