//! End-to-end smoke test for tgraph-node.
//!
//! Starts a real node process against an ephemeral port, waits for the
//! health endpoint, mints a quid for a freshly generated keypair, and
//! submits a signed trust transaction through the REST surface.
//!
//! Run with:
//!   cargo test -p tgraph-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tgraph_core::{Transaction, TxKind};
use tgraph_crypto::KeyPair;

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

async fn wait_for_health(client: &reqwest::Client, base: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{base}/api/health")).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    false
}

fn build_trust_tx(kp: &KeyPair, truster: tgraph_core::Quid, trustee: tgraph_core::Quid) -> Transaction {
    let mut tx = Transaction {
        id: String::new(),
        trust_domain: "default".into(),
        timestamp: 1_700_000_000,
        public_key: kp.public_key.clone(),
        signature: None,
        kind: TxKind::Trust { truster, trustee, trust_level: 0.9, nonce: 1 },
    };
    tx.id = tx.compute_id();
    tx.signature = Some(kp.sign(&tx.signable_bytes()).expect("sign"));
    tx
}

#[tokio::test]
async fn smoke_health_mint_and_submit() {
    let data_dir = std::env::temp_dir().join(format!("tgraph_node_e2e_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&data_dir);
    std::fs::create_dir_all(&data_dir).unwrap();

    let port = free_port();
    let base = format!("http://127.0.0.1:{port}");

    let node_bin = env!("CARGO_BIN_EXE_tgraph-node");
    let child = Command::new(node_bin)
        .env("PORT", port.to_string())
        .env("DATA_DIR", &data_dir)
        .env("LOG_LEVEL", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn tgraph-node");

    let _guard = NodeGuard { child, data_dir };

    let http = reqwest::Client::new();
    assert!(
        wait_for_health(&http, &base, Duration::from_secs(20)).await,
        "tgraph-node did not become ready within 20 seconds"
    );

    let health: serde_json::Value = http.get(format!("{base}/api/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");

    let info: serde_json::Value = http.get(format!("{base}/api/info")).send().await.unwrap().json().await.unwrap();
    assert_eq!(info["managed_domains"], serde_json::json!(["default"]));

    let truster_kp = KeyPair::generate();
    let trustee_kp = KeyPair::generate();

    let mint_resp: serde_json::Value = http
        .post(format!("{base}/api/quids"))
        .json(&serde_json::json!({ "public_key": truster_kp.public_key.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mint_resp["created"], true);
    let truster_quid = truster_kp.public_key.to_quid().expect("derive truster quid");
    let trustee_quid = trustee_kp.public_key.to_quid().expect("derive trustee quid");
    assert_eq!(mint_resp["quid_id"], truster_quid.to_string());

    let tx = build_trust_tx(&truster_kp, truster_quid, trustee_quid);
    let submit = http.post(format!("{base}/api/transactions/trust")).json(&tx).send().await.unwrap();
    assert_eq!(submit.status(), reqwest::StatusCode::CREATED, "trust transaction should be admitted");

    let pending: serde_json::Value = http.get(format!("{base}/api/transactions")).send().await.unwrap().json().await.unwrap();
    let pending_list = pending["pending_transactions"].as_array().unwrap();
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0]["id"], tx.id);
}
