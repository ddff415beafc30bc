//! One load-classify-render cycle.

use ipo_core::{Config, FeedConfig, LifecycleStatus, Result, TimestampMs};
use ipo_feed::{FallbackSource, HttpIpoSource, IpoSource, IpoStore, LoadPhase, LoadState, SeedIpoSource};
use ipo_ingestion::LifecycleClassifier;
use ipo_report::{Page, RenderFormat};
use std::sync::Arc;

/// What to show and when "now" is.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Active tab; `None` renders every bucket.
    pub status: Option<LifecycleStatus>,
    pub format: RenderFormat,
    pub now: TimestampMs,
}

/// Build the source chain for the feed settings.
///
/// Live mode polls the HTTP feed and falls back to the seed when one is
/// configured. Offline mode reads the seed only.
pub fn build_source(feed: &FeedConfig) -> Result<FallbackSource> {
    let seed: Option<Arc<dyn IpoSource>> = match &feed.seed_path {
        Some(path) => Some(Arc::new(SeedIpoSource::from_file(path)?)),
        None => None,
    };

    if !feed.live {
        let seed = seed.ok_or_else(|| ipo_core::Error::config("offline mode needs a seed dataset"))?;
        return Ok(FallbackSource::new(seed));
    }

    let primary = FallbackSource::new(Arc::new(HttpIpoSource::from_config(feed)?));
    Ok(match seed {
        Some(seed) => primary.with_seed(seed),
        None => primary,
    })
}

/// Load, classify and render. Feed failures end up in the page banner.
pub async fn run(config: &Config, options: RunOptions) -> Result<String> {
    let source = build_source(&config.feed)?;
    let store = IpoStore::new();
    store.load(&source).await;
    render_state(config, &store.snapshot().await, options)
}

/// Classify and render one store snapshot, in whatever phase it is.
pub fn render_state(config: &Config, state: &LoadState, options: RunOptions) -> Result<String> {
    let classifier = LifecycleClassifier::new(config.classification.rule);
    let categorized = classifier.categorize(&state.records, options.now);

    tracing::info!(
        phase = ?state.phase,
        upcoming = categorized.upcoming.len(),
        open = categorized.open.len(),
        closed = categorized.closed.len(),
        from_seed = state.from_seed,
        "rendering IPO view"
    );
    if state.phase == LoadPhase::Failed {
        tracing::warn!(error = state.error.as_deref().unwrap_or(""), "showing degraded IPO view");
    }

    let page = Page::build(
        &categorized,
        options.status,
        state.error.clone(),
        state.is_loading(),
        &config.display,
    );
    page.render(options.format, config.display.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipo_core::ClassificationRule;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // 2024-01-03 00:00 UTC
    const NOW: TimestampMs = 1_704_240_000_000;

    fn seed_file(payload: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", payload).unwrap();
        file
    }

    fn offline(seed: &NamedTempFile) -> Config {
        let mut config = Config::default();
        config.feed.live = false;
        config.feed.seed_path = Some(seed.path().to_path_buf());
        config
    }

    /// Live config pointing at a port nobody listens on.
    async fn unreachable() -> Config {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = Config::default();
        config.feed.url = format!("http://{}/api/ipos", addr);
        config.feed.retry_attempts = 1;
        config.feed.timeout_ms = 2_000;
        config
    }

    fn options(status: Option<LifecycleStatus>) -> RunOptions {
        RunOptions {
            status,
            format: RenderFormat::Text,
            now: NOW,
        }
    }

    #[tokio::test]
    async fn test_acme_open_end_to_end() {
        let seed = seed_file(json!({ "data": [{
            "name": "Acme Corp",
            "issueStart": "2024-01-01",
            "issueEnd": "2024-01-05",
            "raw": "Active | 45,71,882 | 93,23,118 | 2.04"
        }]}));

        let out = run(&offline(&seed), options(Some(LifecycleStatus::Open))).await.unwrap();
        assert!(out.contains("[Open (1)]"));
        assert!(out.contains("Acme Corp (EQ)"));
        assert!(out.contains("45,71,882"));
        assert!(out.contains("2.04%"));
        assert!(!out.starts_with('!'));
    }

    #[tokio::test]
    async fn test_bad_dates_land_in_upcoming() {
        let seed = seed_file(json!([{ "name": "Mystery", "issueStart": "", "issueEnd": "" }]));
        let out = run(&offline(&seed), options(Some(LifecycleStatus::Upcoming))).await.unwrap();
        assert!(out.contains("[Upcoming (1)]"));
        assert!(out.contains("Mystery (EQ)"));
        assert!(out.contains("N/A – N/A"));
    }

    #[tokio::test]
    async fn test_empty_feed_closed_tab() {
        let seed = seed_file(json!([]));
        let out = run(&offline(&seed), options(Some(LifecycleStatus::Closed))).await.unwrap();
        assert!(out.contains("No Closed IPOs are currently available"));
    }

    #[tokio::test]
    async fn test_negative_gmp_html() {
        let seed = seed_file(json!([{
            "name": "Bad Co",
            "issueStart": "2024-02-01",
            "issueEnd": "2024-02-05",
            "gmp": "-15",
            "estimatedPrice": "n/a"
        }]));
        let out = run(
            &offline(&seed),
            RunOptions {
                status: None,
                format: RenderFormat::Html,
                now: NOW,
            },
        )
        .await
        .unwrap();
        assert!(out.contains("gmp-negative"));
        assert!(out.contains("est. N/A"));
        assert!(!out.contains("NaN"));
    }

    #[tokio::test]
    async fn test_feed_failure_without_seed_shows_banner() {
        let config = unreachable().await;
        let out = run(&config, options(Some(LifecycleStatus::Open))).await.unwrap();
        assert!(out.starts_with("! failed to load IPO data"));
        assert!(out.contains("No Open IPOs are currently available"));
    }

    #[tokio::test]
    async fn test_feed_failure_falls_back_to_seed() {
        let seed = seed_file(json!([{ "name": "Seeded", "issueStart": "2024-01-01", "issueEnd": "2024-01-05" }]));
        let mut config = unreachable().await;
        config.feed.seed_path = Some(seed.path().to_path_buf());

        let out = run(&config, options(Some(LifecycleStatus::Open))).await.unwrap();
        assert!(out.starts_with("! failed to load live data, showing seed data"));
        assert!(out.contains("Seeded (EQ)"));
    }

    #[tokio::test]
    async fn test_listing_aware_rule() {
        let seed = seed_file(json!([{
            "name": "Listed",
            "issueStart": "2024-01-01",
            "issueEnd": "2024-01-10",
            "listingDate": "2024-01-02"
        }]));
        let mut config = offline(&seed);

        let out = run(&config, options(None)).await.unwrap();
        assert!(out.contains("Open (1)"));

        config.classification.rule = ClassificationRule::ListingAware;
        let out = run(&config, options(None)).await.unwrap();
        assert!(out.contains("Closed (1)"));
    }

    #[tokio::test]
    async fn test_outstanding_load_shows_indicator() {
        let seed = seed_file(json!([{ "name": "Acme Corp", "issueStart": "2024-01-01", "issueEnd": "2024-01-05" }]));
        let config = offline(&seed);
        let source = build_source(&config.feed).unwrap();
        let store = IpoStore::new();

        let ticket = store.begin().await;
        let out = render_state(&config, &store.snapshot().await, options(None)).unwrap();
        assert!(out.contains("Loading IPOs..."));

        store.finish(ticket, source.fetch().await).await;
        let out = render_state(&config, &store.snapshot().await, options(None)).unwrap();
        assert!(!out.contains("Loading IPOs..."));
        assert!(out.contains("Acme Corp (EQ)"));
    }

    #[test]
    fn test_missing_seed_file_is_an_error() {
        let mut config = Config::default();
        config.feed.live = false;
        config.feed.seed_path = Some("/no/such/seed.json".into());
        assert!(build_source(&config.feed).is_err());
    }

    #[test]
    fn test_live_source_has_optional_seed() {
        let config = Config::default();
        assert!(!build_source(&config.feed).unwrap().has_seed());

        let seed = seed_file(json!([]));
        let mut feed = config.feed.clone();
        feed.seed_path = Some(seed.path().to_path_buf());
        assert!(build_source(&feed).unwrap().has_seed());
    }
}
