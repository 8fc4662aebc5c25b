use crate::Match;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type SourceResult<T> = Result<T, SourceError>;

const SAMPLE_BRACKET_JSON: &str = include_str!("../../sample_bracket.json");

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid match list in {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
}

/// Where a match list comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchSource {
    File(PathBuf),
    Url(String),
    /// Bundled 16-team sample bracket.
    #[default]
    Embedded,
}

impl MatchSource {
    /// `http://` and `https://` arguments are URLs, anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        let arg = arg.trim();
        if arg.starts_with("http://") || arg.starts_with("https://") {
            MatchSource::Url(arg.to_string())
        } else {
            MatchSource::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::File(path) => write!(f, "{}", path.display()),
            MatchSource::Url(url) => f.write_str(url),
            MatchSource::Embedded => f.write_str("sample bracket"),
        }
    }
}

/// Loads match lists. Holds one HTTP client for all URL sources.
#[derive(Debug, Clone)]
pub struct MatchClient {
    client: Client,
    timeout: Duration,
}

impl Default for MatchClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("bracket-layout/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl MatchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, source: &MatchSource) -> SourceResult<Vec<Match>> {
        match source {
            MatchSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                parse_matches(&content, &path.display().to_string())
            }
            MatchSource::Url(url) => self.fetch(url).await,
            MatchSource::Embedded => embedded_matches(),
        }
    }

    async fn fetch(&self, url: &str) -> SourceResult<Vec<Match>> {
        let network = |source| SourceError::Network {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(network)?;
        parse_matches(&body, url)
    }
}

/// Parse a JSON array of matches. `origin` only labels errors.
pub fn parse_matches(json: &str, origin: &str) -> SourceResult<Vec<Match>> {
    serde_json::from_str(json).map_err(|source| SourceError::Parse {
        origin: origin.to_string(),
        source,
    })
}

pub fn embedded_matches() -> SourceResult<Vec<Match>> {
    parse_matches(SAMPLE_BRACKET_JSON, "embedded sample")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;

    const THREE_MATCHES: &str = r#"[
        {"index": 0, "matchId": "final", "home": "UConn", "away": "Purdue"},
        {"index": 1, "parentIndex": 0, "matchId": "sf-1"},
        {"index": 2, "parentIndex": 0, "matchId": "sf-2"}
    ]"#;

    #[test]
    fn embedded_sample_is_a_valid_four_round_bracket() {
        let matches = embedded_matches().expect("sample bracket should parse");
        assert_eq!(matches.len(), 15);
        assert_eq!(validate(&matches), Ok(4));
        assert!(matches[0].payload.contains_key("winner"));
    }

    #[test]
    fn from_arg_tells_urls_from_paths() {
        assert_eq!(
            MatchSource::from_arg("https://example.com/bracket.json"),
            MatchSource::Url("https://example.com/bracket.json".into())
        );
        assert_eq!(
            MatchSource::from_arg(" ./brackets/2025.json "),
            MatchSource::File(PathBuf::from("./brackets/2025.json"))
        );
    }

    #[test]
    fn source_display() {
        assert_eq!(MatchSource::Embedded.to_string(), "sample bracket");
        assert_eq!(MatchSource::Url("http://x/y".into()).to_string(), "http://x/y");
    }

    #[test]
    fn parse_error_names_its_origin() {
        let err = parse_matches("{}", "bracket.json").unwrap_err();
        assert!(err.to_string().starts_with("invalid match list in bracket.json"));
    }

    #[tokio::test]
    async fn loads_embedded_source() {
        let matches = MatchClient::new().load(&MatchSource::Embedded).await.unwrap();
        assert_eq!(matches.len(), 15);
    }

    #[tokio::test]
    async fn loads_file_source() {
        let path = std::env::temp_dir().join(format!("bracket-layout-{}.json", std::process::id()));
        std::fs::write(&path, THREE_MATCHES).unwrap();

        let matches = MatchClient::new().load(&MatchSource::File(path.clone())).await;
        std::fs::remove_file(&path).unwrap();

        let matches = matches.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].payload["away"], "Purdue");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let source = MatchSource::File(PathBuf::from("/definitely/not/here.json"));
        let err = MatchClient::new().load(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[tokio::test]
    async fn loads_url_source() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/bracket.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(THREE_MATCHES)
            .create_async()
            .await;

        let source = MatchSource::from_arg(&format!("{}/bracket.json", server.url()));
        let matches = MatchClient::new().load(&source).await.unwrap();

        mock.assert_async().await;
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[2].parent_index, Some(0));
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.json")
            .with_status(404)
            .create_async()
            .await;

        let source = MatchSource::Url(format!("{}/missing.json", server.url()));
        let err = MatchClient::new().load(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bracket.json")
            .with_status(200)
            .with_body("[{\"index\": \"zero\"}]")
            .create_async()
            .await;

        let source = MatchSource::Url(format!("{}/bracket.json", server.url()));
        let err = MatchClient::new().load(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
