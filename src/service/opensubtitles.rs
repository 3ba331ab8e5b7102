// OpenSubtitles REST provider
//
// Talks to api.opensubtitles.com v1: subtitle search per target file,
// then a two-step download (request a link, fetch the link). An API key
// is required; a username/password login is optional and only raises the
// download quota.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Result, SubhuntError};
use crate::guess::{self, Information};
use crate::service::{Service, SubtitleCandidate};
use crate::target::FileTarget;

const NAME: &str = "opensubtitles";
const BASE_URL: &str = "https://api.opensubtitles.com";
const USER_AGENT: &str = concat!("subhunt/", env!("CARGO_PKG_VERSION"));
const CANDIDATE_BUFFER: usize = 16;

pub struct OpenSubtitles {
    client: Client,
    api_key: String,
    username: String,
    password: String,
    token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SubtitlesResult {
    #[serde(default)]
    data: Vec<Subtitle>,
}

#[derive(Debug, Clone, Deserialize)]
struct Subtitle {
    #[serde(default)]
    attributes: Attributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Attributes {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    download_count: i64,
    #[serde(default)]
    release: String,
    #[serde(default)]
    files: Vec<SubtitleFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct SubtitleFile {
    file_id: i64,
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginResult {
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DownloadResult {
    link: String,
}

impl OpenSubtitles {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
            token: None,
        }
    }

}

impl Default for OpenSubtitles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for OpenSubtitles {
    fn name(&self) -> &'static str {
        NAME
    }

    fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "apikey" => self.api_key = value.to_string(),
            "username" => self.username = value.to_string(),
            "password" => self.password = value.to_string(),
            _ => {
                return Err(SubhuntError::Config(format!(
                    "{NAME}: option \"{key}\" was not found"
                )));
            }
        }
        Ok(())
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(SubhuntError::Config(format!(
                "{NAME}: an \"apikey\" config value is required"
            )));
        }

        if self.username.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(format!("{BASE_URL}/api/v1/login"))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubhuntError::Service(format!(
                "{NAME}: login returned {}",
                response.status()
            )));
        }

        let login: LoginResult = response.json().await?;
        self.token = Some(login.token);
        Ok(())
    }

    fn candidates(
        &self,
        files: Vec<Arc<FileTarget>>,
        langs: Vec<String>,
    ) -> mpsc::Receiver<Box<dyn SubtitleCandidate>> {
        let (tx, rx) = mpsc::channel(CANDIDATE_BUFFER);

        let service = Downloader {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            token: self.token.clone(),
        };
        let languages = join_languages(&langs);

        tokio::spawn(async move {
            for file in files {
                let result = service.search(&file.name(), &languages).await;
                let subtitles = match result {
                    Ok(result) => result.data,
                    Err(e) => {
                        // Go to the next file.
                        warn!("{NAME}: {e}");
                        continue;
                    }
                };

                let target_season = file.info().season;
                for subtitle in subtitles {
                    let Some(candidate) = make_candidate(&service, &file, subtitle) else {
                        continue;
                    };

                    // Skip subtitles for a different season than the
                    // target's.
                    if target_season != 0 && candidate.parsed.season != target_season {
                        continue;
                    }

                    let boxed: Box<dyn SubtitleCandidate> = Box::new(candidate);
                    if tx.send(boxed).await.is_err() {
                        return;
                    }
                }
            }
        });

        rx
    }
}

/// The subset of the provider state a candidate needs for downloading.
#[derive(Clone)]
struct Downloader {
    client: Client,
    api_key: String,
    token: Option<String>,
}

impl Downloader {
    async fn search(&self, query: &str, languages: &str) -> Result<SubtitlesResult> {
        let response = self
            .client
            .get(format!("{BASE_URL}/api/v1/subtitles"))
            .header("Api-Key", &self.api_key)
            .query(&[("query", query), ("languages", languages)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubhuntError::Service(format!(
                "{NAME}: search returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn download(&self, file_id: i64) -> Result<Vec<u8>> {
        let mut request = self
            .client
            .post(format!("{BASE_URL}/api/v1/download"))
            .header("Api-Key", &self.api_key)
            .json(&json!({ "file_id": file_id, "sub_format": "srt" }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SubhuntError::Service(format!(
                "{NAME}: download returned {}",
                response.status()
            )));
        }

        let download: DownloadResult = response.json().await?;
        debug!("{NAME}: fetching {}", download.link);

        let content = self.client.get(download.link).send().await?.bytes().await?;
        Ok(content.to_vec())
    }
}

struct OpenSubtitlesCandidate {
    downloader: Downloader,
    target: Arc<FileTarget>,
    lang: String,
    parsed: Information,
    file_id: i64,
    download_count: i64,
}

fn make_candidate(
    downloader: &Downloader,
    target: &Arc<FileTarget>,
    subtitle: Subtitle,
) -> Option<OpenSubtitlesCandidate> {
    let attributes = subtitle.attributes;
    let file = attributes.files.first()?;

    // Prefer the release string the uploader filled in; fall back to the
    // subtitle file name.
    let release_name = if attributes.release.is_empty() {
        file.file_name.clone().unwrap_or_default()
    } else {
        attributes.release.clone()
    };

    Some(OpenSubtitlesCandidate {
        downloader: downloader.clone(),
        target: Arc::clone(target),
        lang: attributes.language.unwrap_or_default().to_lowercase(),
        parsed: guess::parse(&release_name),
        file_id: file.file_id,
        download_count: attributes.download_count,
    })
}

#[async_trait]
impl SubtitleCandidate for OpenSubtitlesCandidate {
    fn file_target(&self) -> &Arc<FileTarget> {
        &self.target
    }

    fn lang(&self) -> &str {
        &self.lang
    }

    fn info(&self) -> Information {
        self.parsed.clone()
    }

    fn service(&self) -> &'static str {
        NAME
    }

    fn ranking(&self) -> f32 {
        self.download_count as f32
    }

    async fn open(&self) -> Result<Vec<u8>> {
        self.downloader.download(self.file_id).await
    }
}

/// Lowercase, comma-separated language list for the search query.
fn join_languages(langs: &[String]) -> String {
    langs
        .iter()
        .map(|l| l.to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_languages() {
        let langs = vec!["en".to_string(), "pt-BR".to_string()];
        assert_eq!(join_languages(&langs), "en,pt-br");
        assert_eq!(join_languages(&[]), "");
    }

    #[test]
    fn test_config_keys() {
        let mut service = OpenSubtitles::new();
        service.set_config("apikey", "abc123").unwrap();
        service.set_config("username", "user").unwrap();
        service.set_config("password", "hunter2").unwrap();
        assert!(service.set_config("timeout", "30").is_err());
    }

    #[tokio::test]
    async fn test_initialize_requires_api_key() {
        let mut service = OpenSubtitles::new();
        assert!(service.initialize().await.is_err());
    }

    #[test]
    fn test_deserialize_search_response() {
        let body = r#"{
            "total_pages": 1,
            "total_count": 1,
            "data": [{
                "id": "9000",
                "type": "subtitle",
                "attributes": {
                    "language": "en",
                    "download_count": 697844,
                    "release": "Greyhound.2020.1080p.WEBRip.x264-RARBG",
                    "files": [{"file_id": 1955, "cd_number": 1, "file_name": "greyhound.srt"}]
                }
            }]
        }"#;

        let result: SubtitlesResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.data.len(), 1);

        let attributes = &result.data[0].attributes;
        assert_eq!(attributes.language.as_deref(), Some("en"));
        assert_eq!(attributes.download_count, 697844);
        assert_eq!(attributes.files[0].file_id, 1955);

        let downloader = Downloader {
            client: Client::new(),
            api_key: String::new(),
            token: None,
        };
        let target = Arc::new(FileTarget::new("/videos/Greyhound.2020.mkv"));
        let candidate = make_candidate(&downloader, &target, result.data[0].clone()).unwrap();
        assert_eq!(candidate.lang, "en");
        assert_eq!(candidate.parsed.title, "Greyhound");
        assert_eq!(candidate.ranking(), 697844.0);
    }

    #[test]
    fn test_candidate_skipped_without_files() {
        let downloader = Downloader {
            client: Client::new(),
            api_key: String::new(),
            token: None,
        };
        let target = Arc::new(FileTarget::new("/videos/Greyhound.2020.mkv"));
        let subtitle = Subtitle {
            attributes: Attributes::default(),
        };
        assert!(make_candidate(&downloader, &target, subtitle).is_none());
    }
}
