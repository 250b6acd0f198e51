// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Behavioural properties of the query orchestrator.
//!
//! Scripted backends drive the ordering, isolation and latency properties
//! under paused tokio time; the final test runs the real HTTP backend
//! against a mockito provider and an unreachable local endpoint.

use async_trait::async_trait;
use biaslens_core::application::QueryOrchestrator;
use biaslens_core::domain::llm::{AdapterError, CompletionBackend};
use biaslens_core::domain::model::{EndpointRef, EnvSnapshot, ModelDescriptor, ProviderKind};
use biaslens_core::domain::query::QueryRequest;
use biaslens_core::infrastructure::llm::{HttpCompletionBackend, ModelRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Replies with `"<id> says hello"` after a per-model delay, or fails when
/// the delay is missing
struct DelayBackend {
    delays: HashMap<String, u64>,
    calls: AtomicUsize,
}

impl DelayBackend {
    fn new(delays: &[(&str, u64)]) -> Arc<Self> {
        Arc::new(Self {
            delays: delays.iter().map(|(id, ms)| (id.to_string(), *ms)).collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionBackend for DelayBackend {
    async fn complete(
        &self,
        _prompt: &str,
        _temperature: f32,
        descriptor: &ModelDescriptor,
        _timeout: Duration,
    ) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.delays.get(&descriptor.id) {
            Some(ms) => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(format!("{} says hello", descriptor.id))
            }
            None => Err(AdapterError::ConnectionFailed("model not running".into())),
        }
    }
}

fn local_descriptor(id: &str, url: &str) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: id.to_uppercase(),
        provider: ProviderKind::LocalOpenAiCompatible,
        model_name: format!("{}-model", id),
        endpoint: Some(EndpointRef::Fixed {
            url: url.to_string(),
        }),
        requires_credential: false,
        credential_env: None,
    }
}

fn registry(ids: &[&str]) -> Arc<ModelRegistry> {
    let models = ids
        .iter()
        .map(|id| local_descriptor(id, "http://localhost:1234/v1"))
        .collect();
    Arc::new(ModelRegistry::new(models, EnvSnapshot::new()).unwrap())
}

fn request(prompt: &str, models: &[&str]) -> QueryRequest {
    QueryRequest::new(prompt, models.iter().map(|m| m.to_string()).collect(), 0.7)
}

fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_every_permutation_preserves_order_and_count() {
    let backend = DelayBackend::new(&[("m1", 300), ("m2", 10), ("m3", 120)]);
    let orchestrator = QueryOrchestrator::new(
        registry(&["m1", "m2", "m3", "m4"]),
        backend,
        Duration::from_secs(30),
    );

    // m4 has no delay entry and fails; "ghost" is not in the catalog
    for order in permutations(&["m1", "m2", "m3", "m4", "ghost"]) {
        let result = orchestrator.run(request("Order check", &order)).await.unwrap();

        let ids: Vec<&str> = result.responses().iter().map(|r| r.model_id()).collect();
        assert_eq!(ids, order);

        for entry in result.responses() {
            assert_ne!(entry.response().is_some(), entry.error().is_some());
            match entry.model_id() {
                "m4" => assert!(entry.error().unwrap().contains("model not running")),
                "ghost" => assert_eq!(entry.error(), Some("unknown model")),
                id => assert_eq!(entry.response(), Some(format!("{} says hello", id).as_str())),
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_known_and_unknown_ids_side_by_side() {
    let backend = DelayBackend::new(&[("m1", 50)]);
    let orchestrator = QueryOrchestrator::new(registry(&["m1"]), backend.clone(), Duration::from_secs(30));

    let result = orchestrator
        .run(request("Hello", &["m1", "unknown-id"]))
        .await
        .unwrap();

    assert_eq!(result.responses().len(), 2);
    assert_eq!(result.responses()[0].response(), Some("m1 says hello"));
    assert_eq!(result.responses()[1].model_id(), "unknown-id");
    assert_eq!(result.responses()[1].model_name(), "unknown-id");
    assert_eq!(result.responses()[1].error(), Some("unknown model"));
    assert_eq!(result.responses()[1].latency_ms(), 0);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_latency_is_near_the_bound() {
    let backend = DelayBackend::new(&[("slow", 60_000), ("fast", 100)]);
    let orchestrator = QueryOrchestrator::new(registry(&["slow", "fast"]), backend, Duration::from_secs(5));

    let result = orchestrator.run(request("Tick", &["slow", "fast"])).await.unwrap();
    let slow = &result.responses()[0];

    assert!(slow.error().unwrap().starts_with("Request timeout"));
    assert!((5000..5100).contains(&slow.latency_ms()));
    assert_eq!(result.responses()[1].response(), Some("fast says hello"));
}

#[tokio::test]
async fn test_invalid_requests_reach_no_backend() {
    let backend = DelayBackend::new(&[("m1", 0)]);
    let orchestrator = QueryOrchestrator::new(registry(&["m1"]), backend.clone(), Duration::from_secs(30));

    assert!(orchestrator.run(request("", &["m1"])).await.is_err());
    assert!(orchestrator.run(request("hello", &[])).await.is_err());
    assert!(orchestrator
        .run(request(&"x".repeat(5001), &["m1"]))
        .await
        .is_err());

    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_doctor_scenario_over_http() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"content": "he will see you now"}}]}"#)
        .create_async()
        .await;

    let models = vec![
        local_descriptor("m1", &server.url()),
        local_descriptor("m2", "http://127.0.0.1:1/v1"),
    ];
    let registry = Arc::new(ModelRegistry::new(models, EnvSnapshot::new()).unwrap());
    let orchestrator = QueryOrchestrator::new(
        registry,
        Arc::new(HttpCompletionBackend::new(EnvSnapshot::new())),
        Duration::from_secs(10),
    );

    let result = orchestrator
        .run(request("The doctor said", &["m1", "m2"]))
        .await
        .unwrap();

    assert_eq!(result.prompt(), "The doctor said");
    assert_eq!(result.success_count(), 1);

    let m1 = &result.responses()[0];
    assert_eq!(m1.response(), Some("he will see you now"));
    assert!(m1.error().is_none());

    let m2 = &result.responses()[1];
    assert!(m2.response().is_none());
    assert!(m2.error().unwrap().starts_with("Connection failed"));
}
