//! Fire-and-forget recording of successful searches.

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::Client;
use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::JoinHandle;

use crate::model::{LogAck, LogRequest};

/// Destination for search records.
#[async_trait]
pub trait SearchLogSink: Send + Sync + Debug {
    async fn send(&self, city: &str) -> anyhow::Result<()>;
}

/// Posts `{city}` to `<endpoint>/api/log`.
#[derive(Debug, Clone)]
pub struct HttpLogSink {
    endpoint: String,
    http: Client,
}

impl HttpLogSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl SearchLogSink for HttpLogSink {
    async fn send(&self, city: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/log", self.endpoint);

        let ack: LogAck = self
            .http
            .post(url)
            .json(&LogRequest { city: city.to_string() })
            .send()
            .await
            .context("Failed to send search log request")?
            .json()
            .await
            .context("Failed to parse search log response")?;

        if !ack.success {
            bail!("log endpoint rejected the entry");
        }
        Ok(())
    }
}

/// Detaches every record onto its own task; the caller never observes the outcome.
///
/// Clones share the set of outstanding tasks, so [`BackgroundLogger::drain`]
/// on any clone waits for records made through all of them.
#[derive(Debug, Clone)]
pub struct BackgroundLogger {
    sink: Arc<dyn SearchLogSink>,
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundLogger {
    pub fn new(sink: Arc<dyn SearchLogSink>) -> Self {
        Self { sink, in_flight: Arc::default() }
    }

    pub fn record(&self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(city, "no async runtime, search not logged");
            return;
        };

        let sink = Arc::clone(&self.sink);
        let city = city.to_string();
        let handle = runtime.spawn(async move {
            match sink.send(&city).await {
                Ok(()) => tracing::debug!(city = %city, "search logged"),
                Err(e) => tracing::debug!(city = %city, error = ?e, "search log failed"),
            }
        });

        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.retain(|h| !h.is_finished());
            in_flight.push(handle);
        }
    }

    /// Wait up to `grace` for outstanding records, e.g. before the runtime
    /// shuts down. Records still running afterwards stay detached.
    pub async fn drain(&self, grace: Duration) {
        let handles = match self.in_flight.lock() {
            Ok(mut in_flight) => std::mem::take(&mut *in_flight),
            Err(_) => return,
        };

        let deadline = tokio::time::Instant::now() + grace;
        for handle in handles {
            if tokio::time::timeout_at(deadline, handle).await.is_err() {
                tracing::debug!("search log still pending after grace period");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        cities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchLogSink for Recorder {
        async fn send(&self, city: &str) -> anyhow::Result<()> {
            self.cities.lock().unwrap().push(city.to_string());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl SearchLogSink for Failing {
        async fn send(&self, _city: &str) -> anyhow::Result<()> {
            bail!("collaborator unreachable")
        }
    }

    #[tokio::test]
    async fn record_sends_trimmed_city() {
        let recorder = Arc::new(Recorder::default());
        let logger = BackgroundLogger::new(recorder.clone());

        logger.record("  Lon ");
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        assert_eq!(*recorder.cities.lock().unwrap(), vec!["Lon".to_string()]);
    }

    #[tokio::test]
    async fn blank_city_is_not_sent() {
        let recorder = Arc::new(Recorder::default());
        let logger = BackgroundLogger::new(recorder.clone());

        logger.record("   ");
        tokio::task::yield_now().await;

        assert!(recorder.cities.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let logger = BackgroundLogger::new(Arc::new(Failing));
        logger.record("Paris");
        tokio::task::yield_now().await;
    }

    #[test]
    fn record_outside_runtime_does_not_panic() {
        let logger = BackgroundLogger::new(Arc::new(Failing));
        logger.record("Paris");
    }

    #[derive(Debug)]
    struct Slow {
        delay: Duration,
        inner: Recorder,
    }

    #[async_trait]
    impl SearchLogSink for Slow {
        async fn send(&self, city: &str) -> anyhow::Result<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.send(city).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_outstanding_records() {
        let sink = Arc::new(Slow { delay: Duration::from_millis(300), inner: Recorder::default() });
        let logger = BackgroundLogger::new(sink.clone());

        logger.clone().record("Lon");
        logger.record("Paris");
        logger.drain(Duration::from_secs(1)).await;

        assert_eq!(*sink.inner.cities.lock().unwrap(), vec!["Lon".to_string(), "Paris".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_grace_period() {
        let sink = Arc::new(Slow { delay: Duration::from_secs(60), inner: Recorder::default() });
        let logger = BackgroundLogger::new(sink.clone());

        logger.record("Lon");
        let started = tokio::time::Instant::now();
        logger.drain(Duration::from_millis(200)).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(sink.inner.cities.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn drain_with_nothing_recorded_returns() {
        let logger = BackgroundLogger::new(Arc::new(Failing));
        logger.drain(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn http_sink_reports_unreachable_collaborator() {
        let sink = HttpLogSink::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(sink.send("Paris").await.is_err());
    }
}
