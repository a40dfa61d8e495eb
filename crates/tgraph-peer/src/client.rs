//! Outbound HTTP client to other nodes, with optional node-to-node HMAC
//! signing (spec §4.1, §4.7, §6 "Node-to-node auth headers").

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use tgraph_core::now_unix;
use tgraph_crypto::sign_request;

use crate::error::PeerError;

const SIGNATURE_HEADER: &str = "X-Node-Signature";
const TIMESTAMP_HEADER: &str = "X-Node-Timestamp";

/// Shared HMAC secret used to sign node-to-node requests. `None` means this
/// node never signs outbound requests (mirrors `REQUIRE_NODE_AUTH=false`).
#[derive(Clone)]
pub struct NodeAuth {
    pub secret: Option<Vec<u8>>,
}

impl NodeAuth {
    pub fn disabled() -> Self {
        Self { secret: None }
    }

    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: Some(secret.into()) }
    }
}

pub struct RpcClient {
    http: reqwest::Client,
    auth: NodeAuth,
}

impl RpcClient {
    pub fn new(timeout: std::time::Duration, auth: NodeAuth) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client config is static and infallible");
        Self { http, auth }
    }

    /// Unauthenticated `GET` returning the JSON body, for read-only peer
    /// endpoints (`/api/nodes`, `/api/v1/node/domains`, domain queries).
    pub async fn get_json<T: DeserializeOwned>(&self, base_url: &str, path: &str) -> Result<T, PeerError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let resp = self.http.get(&url).send().await?;
        Self::check_status(&resp)?;
        Ok(resp.json::<T>().await?)
    }

    /// Authenticated `POST` carrying `X-Node-Signature` / `X-Node-Timestamp`
    /// headers when this node has a configured auth secret.
    pub async fn signed_post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        base_url: &str,
        path: &str,
        body: &B,
    ) -> Result<T, PeerError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let payload = serde_json::to_vec(body).map_err(|e| PeerError::InvalidGossip(e.to_string()))?;

        let mut req = self.http.post(&url).header("Content-Type", "application/json").body(payload.clone());
        if let Some(secret) = &self.auth.secret {
            let ts = now_unix();
            let sig = sign_request(secret, Method::POST.as_str(), path, ts, &payload)?;
            req = req.header(SIGNATURE_HEADER, sig).header(TIMESTAMP_HEADER, ts.to_string());
        }

        let resp = req.send().await?;
        Self::check_status(&resp)?;
        Ok(resp.json::<T>().await?)
    }

    fn check_status(resp: &reqwest::Response) -> Result<(), PeerError> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(PeerError::Status(resp.status().as_u16()))
        }
    }
}

/// `true` for any 2xx status, the "first 2xx JSON wins" rule of
/// `query_other_domain` (spec §4.7).
pub fn is_success(status: StatusCode) -> bool {
    status.is_success()
}
