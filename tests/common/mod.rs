//! Shared fixtures for the integration tests: an in-memory API double and
//! config builders pointing at a mock server.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hme_cli::api::{ApiError, HideMyEmailApi};
use hme_cli::config::Config;
use hme_cli::envelope::Envelope;
use serde_json::json;
use tokio_util::sync::CancellationToken;

pub fn envelope(value: serde_json::Value) -> Envelope {
    serde_json::from_value(value).expect("valid envelope")
}

/// In-memory stand-in for the remote service. Addresses are handed out as
/// `alias<N>@icloud.com` in call order.
#[derive(Default)]
pub struct FakeApi {
    pub generate_calls: AtomicUsize,
    pub reserve_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Returned by every generate call instead of a fresh address.
    pub generate_reply: Option<Envelope>,
    /// Addresses whose reserve call fails.
    pub reject_reserve: Mutex<HashSet<String>>,
    /// Reply used for rejected reserve calls.
    pub reserve_reply: Option<Envelope>,
    /// Cancel this token once the given number of generate calls started.
    pub cancel_after: Option<(usize, CancellationToken)>,
    pub list_reply: Option<Envelope>,
}

impl FakeApi {
    pub fn rejecting(addresses: &[&str], reply: Envelope) -> Self {
        FakeApi {
            reject_reserve: Mutex::new(addresses.iter().map(|a| a.to_string()).collect()),
            reserve_reply: Some(reply),
            ..FakeApi::default()
        }
    }

    pub fn generated(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn reserved(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HideMyEmailApi for FakeApi {
    async fn generate_email(&self) -> Result<Envelope, ApiError> {
        let n = self.generate_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((threshold, token)) = &self.cancel_after {
            if n >= *threshold {
                token.cancel();
            }
        }
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(match &self.generate_reply {
            Some(reply) => reply.clone(),
            None => envelope(json!({"success": true, "result": {"hme": format!("alias{n}@icloud.com")}})),
        })
    }

    async fn reserve_email(&self, address: &str) -> Result<Envelope, ApiError> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let rejected = self
            .reject_reserve
            .lock()
            .expect("reserve set")
            .contains(address);
        Ok(match (&self.reserve_reply, rejected) {
            (Some(reply), true) => reply.clone(),
            _ => envelope(json!({"success": true, "result": {"hme": {"hme": address, "isActive": true}}})),
        })
    }

    async fn list_email(&self) -> Result<Envelope, ApiError> {
        Ok(self
            .list_reply
            .clone()
            .unwrap_or_else(|| envelope(json!({"success": true, "result": {"hmeEmails": []}}))))
    }
}

/// Configuration aimed at a mock server's `/v1/hme` prefix.
pub fn config_for(server_uri: &str) -> Config {
    Config {
        base_url: format!("{server_uri}/v1/hme"),
        timeout: Duration::from_millis(300),
        ..Config::default()
    }
}
