//! Shared test helpers: a scripted in-memory transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use device_flow::config::FlowConfig;
use device_flow::protocol::{DeviceCodes, TokenResponse};
use device_flow::transport::{Transport, TransportFailure};

/// A recorded request: which endpoint, with which config snapshot.
#[derive(Debug, Clone)]
pub enum Call {
    DeviceCode { config: FlowConfig },
    Token { config: FlowConfig, device_code: String },
}

/// Transport that replays queued responses, optionally after a delay.
///
/// An exhausted token queue answers `authorization_pending`.
#[derive(Default)]
pub struct ScriptedTransport {
    device_codes: Mutex<VecDeque<(Duration, Result<DeviceCodes, TransportFailure>)>>,
    tokens: Mutex<VecDeque<Result<TokenResponse, TransportFailure>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_codes(&self, result: Result<DeviceCodes, TransportFailure>) {
        self.queue_codes_after(Duration::ZERO, result);
    }

    pub fn queue_codes_after(&self, delay: Duration, result: Result<DeviceCodes, TransportFailure>) {
        self.device_codes.lock().unwrap().push_back((delay, result));
    }

    pub fn queue_token(&self, result: Result<TokenResponse, TransportFailure>) {
        self.tokens.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Token { .. }))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request_device_code(
        &self,
        config: &FlowConfig,
    ) -> Result<DeviceCodes, TransportFailure> {
        self.calls.lock().unwrap().push(Call::DeviceCode {
            config: config.clone(),
        });
        let next = self.device_codes.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or((
            Duration::ZERO,
            Err(TransportFailure::NetworkError("no scripted response".to_string())),
        ));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn request_token(
        &self,
        config: &FlowConfig,
        device_code: &str,
    ) -> Result<TokenResponse, TransportFailure> {
        self.calls.lock().unwrap().push(Call::Token {
            config: config.clone(),
            device_code: device_code.to_string(),
        });
        let next = self.tokens.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(pending()))
    }
}

pub fn codes(interval: Option<i64>) -> DeviceCodes {
    DeviceCodes {
        device_code: "d1".to_string(),
        user_code: "U1".to_string(),
        verification_url: "http://x".to_string(),
        expires_in_secs: 1800,
        interval_secs: interval,
        received_at: Utc::now(),
    }
}

pub fn token() -> TokenResponse {
    TokenResponse {
        access_token: "t".to_string(),
        refresh_token: "r".to_string(),
        expires_in_secs: 3600,
        token_type: "bearer".to_string(),
    }
}

pub fn oauth_error(code: &str) -> TransportFailure {
    TransportFailure::BadStatus {
        status: 400,
        body: format!(r#"{{"error":"{code}"}}"#),
    }
}

pub fn pending() -> TransportFailure {
    oauth_error("authorization_pending")
}
