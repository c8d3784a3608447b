//! Loading topology documents and caching the decoded atlas.

use super::Atlas;
use crate::{MapError, Result};
use async_trait::async_trait;
use futures::lock::Mutex;
use fxhash::FxHashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Shared async HTTP client; building it once keeps one connection pool for
/// every geometry request.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.user_agent(concat!("worldroute/", env!("CARGO_PKG_VERSION")));
    builder.build().unwrap_or_else(|e| {
        log::warn!("falling back to default HTTP client: {e}");
        reqwest::Client::new()
    })
});

/// Retrieves the text of a geometry document
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<F: Fetch + Send + Sync + ?Sized> Fetch for Box<F> {
    async fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url).await
    }
}

/// Fetches over HTTP(S)
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        let response = HTTP_CLIENT.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Reads documents from the local filesystem
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<std::path::PathBuf>,
}

#[cfg(feature = "tokio-runtime")]
impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative urls against `root`
    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let path = match &self.root {
            Some(root) => root.join(url),
            None => std::path::PathBuf::from(url),
        };
        log::debug!("reading {}", path.display());
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Serves documents held in memory, keyed by url
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: FxHashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| MapError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no such document")))
    }
}

/// Loads topologies once and keeps the decoded atlas for the rest of the session
pub struct GeometrySource<F> {
    fetcher: F,
    cache: Mutex<FxHashMap<String, Arc<Atlas>>>,
}

impl<F: Fetch> GeometrySource<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Fetch and decode `url`, or return the cached atlas.
    ///
    /// The cache lock is held across the fetch so concurrent callers for the
    /// same document share a single request.
    pub async fn load(&self, url: &str) -> Result<Arc<Atlas>> {
        let mut cache = self.cache.lock().await;
        if let Some(atlas) = cache.get(url) {
            log::debug!("geometry cache hit for {url}");
            return Ok(atlas.clone());
        }

        let atlas = self.fetch_and_decode(url).await.map_err(|e| match e {
            MapError::Load { .. } => e,
            other => MapError::Load {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;
        log::info!(
            "loaded {url}: {} countries, {} states",
            atlas.countries.len(),
            atlas.states.len()
        );

        let atlas = Arc::new(atlas);
        cache.insert(url.to_string(), atlas.clone());
        Ok(atlas)
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<Atlas> {
        let text = self.fetcher.fetch(url).await?;
        Atlas::from_json(&text)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EMPTY_ATLAS: &str = r#"{
        "type": "Topology",
        "arcs": [],
        "objects": {
            "countries": {"type": "GeometryCollection", "geometries": []},
            "states": {"type": "GeometryCollection", "geometries": []}
        }
    }"#;

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetch for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EMPTY_ATLAS.to_string())
        }
    }

    #[tokio::test]
    async fn test_load_is_cached() {
        let source = GeometrySource::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let a = source.load("combined.json").await.unwrap();
        let b = source.load("combined.json").await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.fetcher().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_document_reports_url() {
        let source = GeometrySource::new(StaticFetcher::new());
        match source.load("missing.json").await {
            Err(MapError::Load { url, .. }) => assert_eq!(url, "missing.json"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_failure_is_load_error() {
        let source = GeometrySource::new(
            StaticFetcher::new()
                .with_document("bad.json", "{not json")
                .with_document("partial.json", r#"{"arcs": [], "objects": {"countries": {"type": null}}}"#),
        );
        assert!(matches!(source.load("bad.json").await, Err(MapError::Load { .. })));
        match source.load("partial.json").await {
            Err(MapError::Load { reason, .. }) => assert!(reason.contains("states")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
