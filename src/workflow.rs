// Download orchestration
//
// Discovers video targets, configures and initializes the requested
// services, merges their candidate streams, folds the merged stream into
// one best candidate per (file, language) pair, then downloads and saves
// the winners.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SubhuntError};
use crate::rank;
use crate::service::{ServiceRegistry, SubtitleCandidate};
use crate::target::FileTarget;
use crate::unify::unify;

const VIDEO_EXTENSIONS: &[&str] = &["avi", "mkv", "mov", "mp4", "webm", "wmv"];

/// One `download` invocation, already resolved against the configuration
/// defaults.
pub struct DownloadRequest {
    pub path: PathBuf,
    /// Lowercase language tags, in priority order. Must not be empty.
    pub languages: Vec<String>,
    /// Services to query; empty means every registered service.
    pub services: Vec<String>,
    /// Service settings from the command line, as "service.key=value".
    pub overrides: Vec<String>,
    /// Language renames from the command line, as "from=to".
    pub lang_names: Vec<String>,
}

pub struct Workflow {
    config: Config,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn download(
        &self,
        mut registry: ServiceRegistry,
        request: DownloadRequest,
    ) -> Result<()> {
        if request.languages.is_empty() {
            return Err(SubhuntError::Config(
                "no languages requested; pass --languages or set general.languages".to_string(),
            ));
        }

        let lang_names = self.resolve_lang_names(&request.lang_names)?;

        let targets = scan_targets(&request.path)?;
        if targets.is_empty() {
            info!("No video files found under {}", request.path.display());
            return Ok(());
        }
        info!("Found {} video file(s)", targets.len());

        self.apply_config(&mut registry, &request.overrides)?;

        let mut services = registry.take(&request.services)?;
        let mut streams = Vec::with_capacity(services.len());
        for service in &mut services {
            if let Err(e) = service.initialize().await {
                // A single misconfigured service must not abort the run.
                warn!("Skipping service {}: {}", service.name(), e);
                streams.push(None);
                continue;
            }
            debug!("Querying service {}", service.name());
            streams.push(Some(
                service.candidates(targets.clone(), request.languages.clone()),
            ));
        }

        let merged = unify(streams);
        let best = select_best(merged).await;

        self.save_all(&targets, &request.languages, &lang_names, &best)
            .await
    }

    /// Applies the configuration file's service tables, then the
    /// command-line overrides on top.
    fn apply_config(&self, registry: &mut ServiceRegistry, overrides: &[String]) -> Result<()> {
        for (name, table) in &self.config.services {
            match registry.get_mut(name) {
                Ok(service) => {
                    for (key, value) in table {
                        service.set_config(key, value)?;
                    }
                }
                // The config file may mention services this build does
                // not carry.
                Err(e) => warn!("{}", e),
            }
        }

        for pair in overrides {
            let (service, key, value) = parse_config_pair(pair)?;
            registry.get_mut(service)?.set_config(key, value)?;
        }

        Ok(())
    }

    /// Language renames: configuration file entries first, command-line
    /// pairs override them.
    fn resolve_lang_names(&self, pairs: &[String]) -> Result<HashMap<String, String>> {
        let mut names: HashMap<String, String> = self
            .config
            .general
            .lang_names
            .iter()
            .map(|(from, to)| (from.to_lowercase(), to.clone()))
            .collect();

        for pair in pairs {
            let (from, to) = pair.split_once('=').ok_or_else(|| {
                SubhuntError::Config(format!("invalid language rename \"{pair}\", expected from=to"))
            })?;
            names.insert(from.to_lowercase(), to.to_string());
        }

        Ok(names)
    }

    async fn save_all(
        &self,
        targets: &[Arc<FileTarget>],
        languages: &[String],
        lang_names: &HashMap<String, String>,
        best: &HashMap<(PathBuf, String), Box<dyn SubtitleCandidate>>,
    ) -> Result<()> {
        let mut saved = 0usize;

        for target in targets {
            for lang in languages {
                let key = (target.path().to_path_buf(), lang.clone());
                let Some(candidate) = best.get(&key) else {
                    println!("✗ {} [{}]", target, lang);
                    continue;
                };

                let label = lang_names.get(lang.as_str()).map_or(lang.as_str(), String::as_str);

                let content = match candidate.open().await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("{}: download failed for {}: {}", candidate.service(), target, e);
                        println!("✗ {} [{}]", target, lang);
                        continue;
                    }
                };

                match target
                    .save_subtitle(&content, label, candidate.format_extension())
                    .await
                {
                    Ok(_) => {
                        saved += 1;
                        println!("✓ {} [{}]", target, lang);
                    }
                    Err(e) => {
                        warn!("Failed to save subtitle for {}: {}", target, e);
                        println!("✗ {} [{}]", target, lang);
                    }
                }
            }
        }

        info!("Saved {} subtitle(s)", saved);
        Ok(())
    }
}

/// Collects video targets: a file path is taken as-is, a directory is
/// walked recursively for known video extensions.
pub fn scan_targets(path: &Path) -> Result<Vec<Arc<FileTarget>>> {
    if !path.exists() {
        return Err(SubhuntError::FileNotFound(path.display().to_string()));
    }

    if path.is_file() {
        return Ok(vec![Arc::new(FileTarget::new(path))]);
    }

    let mut targets: Vec<Arc<FileTarget>> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_video(entry.path()))
        .map(|entry| Arc::new(FileTarget::new(entry.path())))
        .collect();

    targets.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(targets)
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn parse_config_pair(pair: &str) -> Result<(&str, &str, &str)> {
    let invalid = || {
        SubhuntError::Config(format!(
            "invalid service setting \"{pair}\", expected service.key=value"
        ))
    };

    let (target, value) = pair.split_once('=').ok_or_else(invalid)?;
    let (service, key) = target.split_once('.').ok_or_else(invalid)?;
    if service.is_empty() || key.is_empty() {
        return Err(invalid());
    }
    Ok((service, key, value))
}

/// Drains the merged candidate stream, keeping the best candidate per
/// (file, language) pair.
pub async fn select_best(
    mut candidates: mpsc::Receiver<Box<dyn SubtitleCandidate>>,
) -> HashMap<(PathBuf, String), Box<dyn SubtitleCandidate>> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .expect("progress template should be valid"),
    );

    let mut best: HashMap<(PathBuf, String), Box<dyn SubtitleCandidate>> = HashMap::new();
    let mut seen = 0u64;

    while let Some(candidate) = candidates.recv().await {
        seen += 1;
        progress.set_message(format!("Evaluated {seen} candidate(s)"));

        let key = (
            candidate.file_target().path().to_path_buf(),
            candidate.lang().to_string(),
        );
        match best.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
            Entry::Occupied(mut entry) => {
                let target = candidate.file_target().info();
                let current = entry.get();
                if rank::greater(
                    &target,
                    candidate.service(),
                    current.service(),
                    candidate.ranking(),
                    current.ranking(),
                    &candidate.info(),
                    &current.info(),
                ) {
                    entry.insert(candidate);
                }
            }
        }
    }

    progress.finish_and_clear();
    info!("Evaluated {} candidate(s)", seen);
    best
}
