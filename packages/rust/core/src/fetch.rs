//! The external fetch and persistence capabilities the core consumes.
//!
//! The aggregator never performs network I/O or authentication itself; it
//! talks to an authenticated collaborator through [`PageFetcher`] and hands
//! syllabus payloads to a [`SyllabusSink`]. [`HttpFetcher`] is the default
//! collaborator for a portal that serves rendered HTML to a cookie-bearing
//! session; tests substitute in-memory fakes.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use classgrab_shared::{ClassgrabError, Result};

/// User-Agent string for portal requests.
const USER_AGENT: &str = concat!("classgrab/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Authenticated page fetching, supplied by an external collaborator.
/// Retries, sessions, and cookie lifecycle are the implementor's concern.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page as HTML text.
    async fn fetch_html(&self, url: &Url) -> Result<String>;

    /// Fetch a raw byte payload (syllabus files).
    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Persistence collaborator for syllabus file payloads. The core fetches the
/// bytes but never parses them.
pub trait SyllabusSink: Send + Sync {
    fn store(&self, course_name: &str, url: &Url, bytes: &[u8]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`PageFetcher`] backed by `reqwest`, presenting a stored session cookie
/// on every request.
pub struct HttpFetcher {
    client: Client,
    session_cookie: Option<String>,
}

impl HttpFetcher {
    /// Build the HTTP client. `session_cookie` is the full `Cookie` header
    /// value of an authenticated portal session; without it the portal
    /// serves login redirects, which surface as per-tab fetch failures.
    pub fn new(timeout: Duration, session_cookie: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| ClassgrabError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            session_cookie,
        })
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        debug!(%url, "fetching portal page");

        let mut request = self.client.get(url.as_str());
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassgrabError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassgrabError::Network(format!("{url}: HTTP {status}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| ClassgrabError::Network(format!("{url}: body read failed: {e}")))
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| ClassgrabError::Network(format!("{url}: body read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// SnapshotFetcher
// ---------------------------------------------------------------------------

/// Decorator that writes every fetched HTML body to a snapshot directory
/// for offline re-parsing, then passes it through unchanged.
pub struct SnapshotFetcher<F> {
    inner: F,
    dir: PathBuf,
}

impl<F: PageFetcher> SnapshotFetcher<F> {
    pub fn new(inner: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for SnapshotFetcher<F> {
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        let html = self.inner.fetch_html(url).await?;

        let path = self.dir.join(snapshot_name(url));
        if let Err(e) = std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, &html))
        {
            // Snapshots are a convenience; a failed write must not degrade the scrape.
            tracing::warn!(?path, error = %e, "failed to write HTML snapshot");
        }

        Ok(html)
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        self.inner.fetch_bytes(url).await
    }
}

/// Filesystem-safe snapshot file name derived from the URL path.
fn snapshot_name(url: &Url) -> String {
    let path = url.path().trim_matches('/');
    let slug: String = path
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    if slug.is_empty() {
        "index.html".to_string()
    } else {
        format!("{slug}.html")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn snapshot_names_are_filesystem_safe() {
        let url = Url::parse("https://classroom.example.edu/en/course/12/scores").unwrap();
        assert_eq!(snapshot_name(&url), "en_course_12_scores.html");

        let root = Url::parse("https://classroom.example.edu/").unwrap();
        assert_eq!(snapshot_name(&root), "index.html");
    }

    #[tokio::test]
    async fn fetch_html_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5), None).unwrap();
        let url = Url::parse(&format!("{}/courses", server.uri())).unwrap();
        let html = fetcher.fetch_html(&url).await.unwrap();
        assert_eq!(html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn session_cookie_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("authed"))
            .mount(&server)
            .await;

        let fetcher =
            HttpFetcher::new(Duration::from_secs(5), Some("session=abc123".into())).unwrap();
        let url = Url::parse(&format!("{}/me", server.uri())).unwrap();
        assert_eq!(fetcher.fetch_html(&url).await.unwrap(), "authed");
    }

    #[tokio::test]
    async fn http_error_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5), None).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher.fetch_html(&url).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn snapshot_fetcher_writes_and_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>snap</html>"))
            .mount(&server)
            .await;

        let dir = std::env::temp_dir().join(format!("classgrab-snap-test-{}", std::process::id()));
        let inner = HttpFetcher::new(Duration::from_secs(5), None).unwrap();
        let fetcher = SnapshotFetcher::new(inner, &dir);

        let url = Url::parse(&format!("{}/en/courses", server.uri())).unwrap();
        let html = fetcher.fetch_html(&url).await.unwrap();
        assert_eq!(html, "<html>snap</html>");

        let written = std::fs::read_to_string(dir.join("en_courses.html")).unwrap();
        assert_eq!(written, "<html>snap</html>");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
