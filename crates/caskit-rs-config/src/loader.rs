//! Layered loader: locate a properties file through init parameters

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use crate::{ConfigError, ConfigurationKey, PropertyStore, Result};

/// Init parameter that points at the properties file.
pub const CONFIGURATION_FILE_LOCATION: &str = "configFileLocation";

/// Location tried when neither init parameter scope names a file.
pub const DEFAULT_CONFIGURATION_FILE_LOCATION: &str = "/etc/cas-client.properties";

/// Two-scope init parameter lookup supplied by the embedding HTTP adapter.
pub trait InitParameters {
    /// Parameter set on the embedding component itself
    fn component_parameter(&self, name: &str) -> Option<String>;

    /// Parameter shared by every component in the application context
    fn context_parameter(&self, name: &str) -> Option<String>;
}

/// In-memory [`InitParameters`] for adapters that collect parameters up front.
#[derive(Debug, Clone, Default)]
pub struct InitConfig {
    pub component: HashMap<String, String>,
    pub context: HashMap<String, String>,
}

impl InitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.component.insert(name.into(), value.into());
        self
    }

    pub fn with_context_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.context.insert(name.into(), value.into());
        self
    }
}

impl InitParameters for InitConfig {
    fn component_parameter(&self, name: &str) -> Option<String> {
        self.component.get(name).cloned()
    }

    fn context_parameter(&self, name: &str) -> Option<String> {
        self.context.get(name).cloned()
    }
}

/// Where a properties file location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationSource {
    ComponentParameter,
    ContextParameter,
    DefaultLocation,
}

type LocationLookup = fn(&dyn InitParameters, &Path) -> Option<PathBuf>;

/// Candidate locations, most specific first.
const LOCATION_CHAIN: [(ConfigurationSource, LocationLookup); 3] = [
    (ConfigurationSource::ComponentParameter, component_location),
    (ConfigurationSource::ContextParameter, context_location),
    (ConfigurationSource::DefaultLocation, fallback_location),
];

fn component_location(params: &dyn InitParameters, _: &Path) -> Option<PathBuf> {
    non_empty_path(params.component_parameter(CONFIGURATION_FILE_LOCATION))
}

fn context_location(params: &dyn InitParameters, _: &Path) -> Option<PathBuf> {
    non_empty_path(params.context_parameter(CONFIGURATION_FILE_LOCATION))
}

fn fallback_location(_: &dyn InitParameters, default: &Path) -> Option<PathBuf> {
    Some(default.to_path_buf())
}

fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// A loaded store together with the scope used for specific overrides.
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    scope: String,
    source: ConfigurationSource,
    path: PathBuf,
    store: Arc<PropertyStore>,
}

impl LoadedConfiguration {
    /// Walk the location chain and load the first readable file.
    pub fn load(
        scope: &str,
        params: &dyn InitParameters,
        default_location: &Path,
    ) -> Result<Self> {
        let mut attempted = Vec::new();

        for (source, lookup) in LOCATION_CHAIN {
            let Some(path) = lookup(params, default_location) else {
                continue;
            };

            match PropertyStore::load(&path) {
                Ok(store) => {
                    tracing::info!(
                        scope,
                        ?source,
                        path = %path.display(),
                        entries = store.len(),
                        "Loaded CAS client properties"
                    );
                    return Ok(Self {
                        scope: scope.to_string(),
                        source,
                        path,
                        store: Arc::new(store),
                    });
                }
                Err(e) => {
                    tracing::warn!("Unable to load properties for file {}: {}", path.display(), e);
                    attempted.push(path);
                }
            }
        }

        Err(ConfigError::LoadFailed { attempted })
    }

    /// Wrap an already-built store, bypassing file discovery.
    pub fn from_store(scope: impl Into<String>, store: PropertyStore) -> Self {
        Self {
            scope: scope.into(),
            source: ConfigurationSource::DefaultLocation,
            path: PathBuf::new(),
            store: Arc::new(store),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn source(&self) -> ConfigurationSource {
        self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Scoped lookup of a single key
    pub fn get<T>(&self, key: &ConfigurationKey<T>) -> Option<&str>
    where
        T: Copy,
    {
        self.store.get_scoped(&self.scope, key.name())
    }
}

/// Resolves configuration keys for one embedding component.
///
/// Starts out uninitialized; [`ConfigurationResolver::initialize`] loads the
/// store exactly once and the resolver is read-only from then on.
#[derive(Debug)]
pub struct ConfigurationResolver {
    scope: String,
    default_location: PathBuf,
    state: OnceLock<LoadedConfiguration>,
}

impl ConfigurationResolver {
    /// `scope` is the embedding component's type name, used as the key prefix
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            default_location: PathBuf::from(DEFAULT_CONFIGURATION_FILE_LOCATION),
            state: OnceLock::new(),
        }
    }

    /// Replace the fixed fallback location
    pub fn with_default_location<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.default_location = path.as_ref().to_path_buf();
        self
    }

    /// Build a resolver that is already loaded from `store`
    pub fn from_store(scope: impl Into<String>, store: PropertyStore) -> Self {
        let resolver = Self::new(scope);
        let _ = resolver
            .state
            .set(LoadedConfiguration::from_store(resolver.scope.clone(), store));
        resolver
    }

    /// Load the store. Fails if no location yields a readable file, or if
    /// the resolver was already initialized.
    pub fn initialize(&self, params: &dyn InitParameters) -> Result<&LoadedConfiguration> {
        if self.state.get().is_some() {
            return Err(ConfigError::AlreadyInitialized(self.scope.clone()));
        }

        let loaded = LoadedConfiguration::load(&self.scope, params, &self.default_location)?;
        self.state
            .set(loaded)
            .map_err(|_| ConfigError::AlreadyInitialized(self.scope.clone()))?;

        self.loaded()
    }

    /// Release the loaded store. Consumes the resolver: there is no reload.
    pub fn shutdown(self) {
        if let Some(loaded) = self.state.into_inner() {
            tracing::debug!(scope = %loaded.scope, "Configuration resolver shut down");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The loaded configuration, or `NotInitialized`
    pub fn loaded(&self) -> Result<&LoadedConfiguration> {
        self.state
            .get()
            .ok_or_else(|| ConfigError::NotInitialized(self.scope.clone()))
    }

    /// Resolve one key; absent when unset, empty, or not yet initialized.
    pub fn resolve<T>(&self, key: &ConfigurationKey<T>) -> Option<String>
    where
        T: Copy,
    {
        let value = self.state.get()?.get(key).map(str::to_string);
        tracing::trace!(scope = %self.scope, key = key.name(), found = value.is_some(), "Resolved key");
        value
    }
}
