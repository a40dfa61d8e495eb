//! `Pin`/`Get`/`IsAvailable` contract over an IPFS (Kubo-compatible) gateway
//! (spec §6 "External optional collaborator").

use async_trait::async_trait;

use crate::error::IpfsError;

/// Abstraction the node depends on for optional blob storage. Swapped
/// between [`KuboClient`] and [`NoopIpfs`] by `IPFS_ENABLED`; callers never
/// branch on which implementation is active.
#[async_trait]
pub trait IpfsCollaborator: Send + Sync {
    /// Upload `data`, returning the CID it was pinned under.
    async fn pin(&self, data: Vec<u8>) -> Result<String, IpfsError>;

    /// Fetch the bytes behind `cid`.
    async fn get(&self, cid: &str) -> Result<Vec<u8>, IpfsError>;

    /// Whether the backing gateway is reachable right now.
    async fn is_available(&self) -> bool;
}

/// Kubo-compatible gateway client: `POST /api/v0/add` (multipart) to pin,
/// `POST /api/v0/cat?arg=<cid>` to fetch.
pub struct KuboClient {
    http: reqwest::Client,
    gateway_url: String,
}

impl KuboClient {
    pub fn new(gateway_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client config is static and infallible");
        Self { http, gateway_url: gateway_url.into() }
    }
}

#[derive(serde::Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[async_trait]
impl IpfsCollaborator for KuboClient {
    async fn pin(&self, data: Vec<u8>) -> Result<String, IpfsError> {
        let url = format!("{}/api/v0/add", self.gateway_url.trim_end_matches('/'));
        let part = reqwest::multipart::Part::bytes(data).file_name("blob");
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self.http.post(&url).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(IpfsError::Status(resp.status().as_u16()));
        }
        let parsed: AddResponse = resp.json().await?;
        Ok(parsed.hash)
    }

    async fn get(&self, cid: &str) -> Result<Vec<u8>, IpfsError> {
        let url = format!("{}/api/v0/cat", self.gateway_url.trim_end_matches('/'));
        let resp = self.http.post(&url).query(&[("arg", cid)]).send().await?;
        if !resp.status().is_success() {
            return Err(IpfsError::Status(resp.status().as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/v0/cat", self.gateway_url.trim_end_matches('/'));
        self.http.post(&url).query(&[("arg", "")]).send().await.is_ok()
    }
}

/// Default collaborator when `IPFS_ENABLED=false`: every call fails fast
/// with [`IpfsError::Disabled`] rather than silently no-op-succeeding, so
/// callers that forget to check `is_available` first still get a clear error.
pub struct NoopIpfs;

#[async_trait]
impl IpfsCollaborator for NoopIpfs {
    async fn pin(&self, _data: Vec<u8>) -> Result<String, IpfsError> {
        Err(IpfsError::Disabled)
    }

    async fn get(&self, _cid: &str) -> Result<Vec<u8>, IpfsError> {
        Err(IpfsError::Disabled)
    }

    async fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_always_reports_unavailable_and_errors() {
        let ipfs = NoopIpfs;
        assert!(!ipfs.is_available().await);
        assert!(ipfs.pin(vec![1, 2, 3]).await.is_err());
        assert!(ipfs.get("QmSomething").await.is_err());
    }
}
