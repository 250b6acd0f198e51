// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Query Orchestrator
//!
//! Fans one prompt out to every requested model concurrently and merges the
//! outcomes back into request order.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Per-model isolation of failures and timeouts
//!
//! Only request validation can fail a whole call. Unknown ids, adapter
//! errors, timeouts and even a panicking backend become data in the
//! corresponding [`ModelResult`].

use crate::domain::llm::{AdapterError, CompletionBackend};
use crate::domain::model::ModelDescriptor;
use crate::domain::query::{ComparisonResult, ModelResult, QueryError, QueryRequest};
use crate::infrastructure::llm::ModelRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub struct QueryOrchestrator {
    registry: Arc<ModelRegistry>,
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
}

/// Position in the output; resolved up front or still running
enum Slot {
    Ready(ModelResult),
    Running {
        model_id: String,
        model_name: String,
        handle: JoinHandle<ModelResult>,
    },
}

impl QueryOrchestrator {
    pub fn new(
        registry: Arc<ModelRegistry>,
        backend: Arc<dyn CompletionBackend>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            backend,
            timeout,
            limiter: None,
        }
    }

    /// Cap concurrent backend calls across every request sharing this
    /// orchestrator. Waiting for a permit does not count towards a model's
    /// timeout or latency.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query every requested model and return one result per id, in order
    pub async fn run(&self, request: QueryRequest) -> Result<ComparisonResult, QueryError> {
        request.validate()?;

        let query_id = Uuid::new_v4();
        let span = info_span!("comparison", %query_id, models = request.models.len());

        async move {
            info!(temperature = request.temperature, "Starting comparison");

            let prompt: Arc<str> = Arc::from(request.prompt.as_str());

            let slots: Vec<Slot> = request
                .models
                .iter()
                .map(|model_id| match self.registry.resolve(model_id) {
                    Ok(descriptor) => Slot::Running {
                        model_id: descriptor.id.clone(),
                        model_name: descriptor.name.clone(),
                        handle: tokio::spawn(
                            query_model(
                                self.backend.clone(),
                                descriptor.clone(),
                                prompt.clone(),
                                request.temperature,
                                self.timeout,
                                self.limiter.clone(),
                            )
                            .in_current_span(),
                        ),
                    },
                    Err(err) => {
                        warn!(model_id = %model_id, "Requested model is not in the catalog");
                        metrics::counter!(
                            "biaslens_model_queries_total",
                            "model_id" => model_id.clone(),
                            "outcome" => "unknown_model"
                        )
                        .increment(1);
                        Slot::Ready(ModelResult::failure(
                            model_id.as_str(),
                            model_id.as_str(),
                            err.to_string(),
                            0,
                        ))
                    }
                })
                .collect();

            // Every task is already running; awaiting in slot order only
            // fixes the output order.
            let mut responses = Vec::with_capacity(slots.len());
            for slot in slots {
                let result = match slot {
                    Slot::Ready(result) => result,
                    Slot::Running {
                        model_id,
                        model_name,
                        handle,
                    } => match handle.await {
                        Ok(result) => result,
                        Err(join_error) => {
                            error!(model_id = %model_id, "Model task aborted: {}", join_error);
                            ModelResult::failure(
                                model_id,
                                model_name,
                                format!("Internal error: {}", join_error),
                                0,
                            )
                        }
                    },
                };
                responses.push(result);
            }

            let comparison = ComparisonResult::new(request.prompt, chrono::Utc::now(), responses);
            info!(
                succeeded = comparison.success_count(),
                total = comparison.responses().len(),
                "Comparison finished"
            );

            Ok(comparison)
        }
        .instrument(span)
        .await
    }
}

/// One unit of work: a single attempt against one model under a hard timeout
async fn query_model(
    backend: Arc<dyn CompletionBackend>,
    descriptor: ModelDescriptor,
    prompt: Arc<str>,
    temperature: f32,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
) -> ModelResult {
    let _permit = match limiter {
        Some(semaphore) => semaphore.acquire_owned().await.ok(),
        None => None,
    };

    let started = Instant::now();
    let outcome = tokio::time::timeout(
        timeout,
        backend.complete(&prompt, temperature, &descriptor, timeout),
    )
    .await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (result, outcome_label) = match outcome {
        Ok(Ok(text)) => {
            info!(model_id = %descriptor.id, latency_ms, "Model responded");
            (
                ModelResult::success(&descriptor.id, &descriptor.name, text, latency_ms),
                "success",
            )
        }
        Ok(Err(err)) => {
            warn!(model_id = %descriptor.id, latency_ms, kind = err.kind(), "Model query failed: {}", err);
            let label = err.kind();
            (
                ModelResult::failure(&descriptor.id, &descriptor.name, err.to_string(), latency_ms),
                label,
            )
        }
        Err(_) => {
            let err = AdapterError::timed_out(timeout);
            warn!(model_id = %descriptor.id, latency_ms, "Model query timed out");
            (
                ModelResult::failure(&descriptor.id, &descriptor.name, err.to_string(), latency_ms),
                err.kind(),
            )
        }
    };

    metrics::counter!(
        "biaslens_model_queries_total",
        "model_id" => descriptor.id.clone(),
        "outcome" => outcome_label
    )
    .increment(1);
    metrics::histogram!("biaslens_model_latency_ms", "model_id" => descriptor.id.clone())
        .record(latency_ms as f64);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnvSnapshot, ProviderKind};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    enum Script {
        Reply(&'static str, u64),
        Fail(AdapterError, u64),
        Hang,
        Panic,
    }

    struct ScriptedBackend {
        scripts: HashMap<String, Script>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(scripts: &[(&str, Script)]) -> Arc<Self> {
            Arc::new(Self {
                scripts: scripts
                    .iter()
                    .map(|(id, s)| (id.to_string(), s.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _temperature: f32,
            descriptor: &ModelDescriptor,
            _timeout: Duration,
        ) -> Result<String, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);

            let script = self.scripts.get(&descriptor.id).cloned().unwrap();
            let outcome = match script {
                Script::Reply(text, ms) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(text.to_string())
                }
                Script::Fail(err, ms) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Err(err)
                }
                Script::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Script::Panic => panic!("backend exploded"),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn descriptor(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: format!("Model {}", id),
            provider: ProviderKind::LocalOpenAiCompatible,
            model_name: id.to_string(),
            endpoint: None,
            requires_credential: false,
            credential_env: None,
        }
    }

    fn orchestrator(ids: &[&str], backend: Arc<ScriptedBackend>) -> QueryOrchestrator {
        let registry =
            ModelRegistry::new(ids.iter().map(|id| descriptor(id)).collect(), EnvSnapshot::new())
                .unwrap();
        QueryOrchestrator::new(Arc::new(registry), backend, Duration::from_secs(30))
    }

    fn request(models: &[&str]) -> QueryRequest {
        QueryRequest::new(
            "The doctor said",
            models.iter().map(|m| m.to_string()).collect(),
            0.7,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_request_order_not_completion_order() {
        let backend = ScriptedBackend::new(&[
            ("slow", Script::Reply("slow answer", 900)),
            ("fast", Script::Reply("fast answer", 10)),
            ("mid", Script::Reply("mid answer", 300)),
        ]);
        let orchestrator = orchestrator(&["slow", "fast", "mid"], backend);

        let result = orchestrator.run(request(&["mid", "slow", "fast"])).await.unwrap();
        let ids: Vec<&str> = result.responses().iter().map(|r| r.model_id()).collect();
        assert_eq!(ids, vec!["mid", "slow", "fast"]);
        assert_eq!(result.responses()[1].response(), Some("slow answer"));
        assert!((900..1000).contains(&result.responses()[1].latency_ms()));
        assert_eq!(result.success_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_models_run_concurrently() {
        let backend = ScriptedBackend::new(&[
            ("a", Script::Reply("a", 1000)),
            ("b", Script::Reply("b", 1000)),
            ("c", Script::Reply("c", 1000)),
        ]);
        let orchestrator = orchestrator(&["a", "b", "c"], backend.clone());

        let started = Instant::now();
        orchestrator.run(request(&["a", "b", "c"])).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(1500));
        assert_eq!(backend.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_model_becomes_an_error_entry() {
        let backend = ScriptedBackend::new(&[("known", Script::Reply("ok", 5))]);
        let orchestrator = orchestrator(&["known"], backend.clone());

        let result = orchestrator.run(request(&["ghost", "known"])).await.unwrap();
        let ghost = &result.responses()[0];
        assert_eq!(ghost.model_id(), "ghost");
        assert_eq!(ghost.model_name(), "ghost");
        assert_eq!(ghost.error(), Some("unknown model"));
        assert_eq!(ghost.latency_ms(), 0);
        assert!(result.responses()[1].is_success());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_affect_siblings() {
        let backend = ScriptedBackend::new(&[
            ("down", Script::Fail(AdapterError::ConnectionFailed("refused".into()), 2)),
            ("boom", Script::Panic),
            ("up", Script::Reply("fine", 20)),
        ]);
        let orchestrator = orchestrator(&["down", "boom", "up"], backend);

        let result = orchestrator.run(request(&["down", "boom", "up"])).await.unwrap();
        let responses = result.responses();

        assert_eq!(responses[0].error(), Some("Connection failed: refused"));
        assert!(responses[0].latency_ms() >= 2);
        assert!(responses[1].error().unwrap().starts_with("Internal error"));
        assert_eq!(responses[2].response(), Some("fine"));

        for r in responses {
            assert_ne!(r.response().is_some(), r.error().is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported_with_elapsed_latency() {
        let backend = ScriptedBackend::new(&[
            ("stuck", Script::Hang),
            ("quick", Script::Reply("done", 50)),
        ]);
        let registry = ModelRegistry::new(
            vec![descriptor("stuck"), descriptor("quick")],
            EnvSnapshot::new(),
        )
        .unwrap();
        let orchestrator =
            QueryOrchestrator::new(Arc::new(registry), backend, Duration::from_secs(2));

        let result = orchestrator.run(request(&["stuck", "quick"])).await.unwrap();
        let stuck = &result.responses()[0];

        assert_eq!(
            stuck.error(),
            Some("Request timeout: model took longer than 2 seconds")
        );
        assert!(stuck.latency_ms() >= 2000);
        assert_eq!(result.responses()[1].response(), Some("done"));
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let backend = ScriptedBackend::new(&[("a", Script::Reply("a", 0))]);
        let orchestrator = orchestrator(&["a"], backend.clone());

        let err = orchestrator.run(request(&[])).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));

        let mut bad = request(&["a"]);
        bad.temperature = 3.0;
        assert!(orchestrator.run(bad).await.is_err());

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_ids_are_queried_independently() {
        let backend = ScriptedBackend::new(&[("a", Script::Reply("a", 5))]);
        let orchestrator = orchestrator(&["a"], backend.clone());

        let result = orchestrator.run(request(&["a", "a"])).await.unwrap();
        assert_eq!(result.responses().len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_limit_caps_in_flight_calls() {
        let backend = ScriptedBackend::new(&[
            ("a", Script::Reply("a", 100)),
            ("b", Script::Reply("b", 100)),
            ("c", Script::Reply("c", 100)),
            ("d", Script::Reply("d", 100)),
        ]);
        let orchestrator =
            orchestrator(&["a", "b", "c", "d"], backend.clone()).with_concurrency_limit(2);

        let result = orchestrator.run(request(&["a", "b", "c", "d"])).await.unwrap();

        assert_eq!(result.success_count(), 4);
        assert_eq!(backend.peak.load(Ordering::SeqCst), 2);
        // Queue time is not latency
        assert!(result
            .responses()
            .iter()
            .all(|r| (100..200).contains(&r.latency_ms())));
    }
}
