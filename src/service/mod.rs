// Subtitle provider abstraction
//
// Every remote subtitle source implements `Service`, and every subtitle
// offer it produces implements `SubtitleCandidate`. The ranker and the
// selection loop only ever see these traits, never a concrete provider.

pub mod opensubtitles;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Result, SubhuntError};
use crate::guess::Information;
use crate::target::FileTarget;

/// A subtitle offer from a provider, not yet confirmed to be the best
/// match for its (file, language) pair.
#[async_trait]
pub trait SubtitleCandidate: Send + Sync {
    /// The video file this subtitle was offered for.
    fn file_target(&self) -> &Arc<FileTarget>;

    /// Language tag of the subtitle, lowercase (e.g. "en", "pt-br").
    fn lang(&self) -> &str;

    /// Release information parsed from the subtitle's release name.
    fn info(&self) -> Information;

    /// Name of the originating service.
    fn service(&self) -> &'static str;

    /// Provider-supplied popularity score (e.g. download count). Only
    /// comparable between candidates of the same service.
    fn ranking(&self) -> f32;

    /// Subtitle format file extension.
    fn format_extension(&self) -> &'static str {
        "srt"
    }

    /// Downloads the subtitle content.
    async fn open(&self) -> Result<Vec<u8>>;
}

/// A remote subtitle source that can produce candidates for file targets
/// and languages.
#[async_trait]
pub trait Service: Send + Sync {
    /// Identifies this service. All lowercase.
    fn name(&self) -> &'static str;

    /// Sets a configuration value. No costly operations here.
    fn set_config(&mut self, key: &str, value: &str) -> Result<()>;

    /// Initializes the service (session setup, login).
    async fn initialize(&mut self) -> Result<()>;

    /// Streams candidates of all requested languages for each target.
    /// The stream closes once every target has been queried; per-target
    /// failures are logged and skipped.
    fn candidates(
        &self,
        files: Vec<Arc<FileTarget>>,
        langs: Vec<String>,
    ) -> mpsc::Receiver<Box<dyn SubtitleCandidate>>;
}

/// The set of known providers, constructed once at startup.
pub struct ServiceRegistry {
    services: HashMap<&'static str, Box<dyn Service>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registry holding every built-in provider.
    pub fn with_default_services() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(opensubtitles::OpenSubtitles::new()));
        registry
    }

    pub fn register(&mut self, service: Box<dyn Service>) {
        self.services.insert(service.name(), service);
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.keys().copied().collect();
        names.sort();
        names
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Box<dyn Service>> {
        self.services
            .get_mut(name)
            .ok_or_else(|| SubhuntError::Service(format!("could not locate service \"{name}\"")))
    }

    /// Removes and returns the named services, or every registered
    /// service when the list is empty.
    pub fn take(&mut self, names: &[String]) -> Result<Vec<Box<dyn Service>>> {
        if names.is_empty() {
            return Ok(self.services.drain().map(|(_, s)| s).collect());
        }

        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let service = self.services.remove(name.as_str()).ok_or_else(|| {
                SubhuntError::Service(format!("could not locate service \"{name}\""))
            })?;
            selected.push(service);
        }
        Ok(selected)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_default_services()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_builtin_services() {
        let registry = ServiceRegistry::with_default_services();
        assert_eq!(registry.names(), vec!["opensubtitles"]);
    }

    #[test]
    fn test_registry_unknown_service() {
        let mut registry = ServiceRegistry::with_default_services();
        assert!(registry.get_mut("nonexistent").is_err());
        assert!(registry.take(&["nonexistent".to_string()]).is_err());
    }

    #[test]
    fn test_registry_take_all_when_unspecified() {
        let mut registry = ServiceRegistry::with_default_services();
        let services = registry.take(&[]).unwrap();
        assert_eq!(services.len(), 1);
    }
}
