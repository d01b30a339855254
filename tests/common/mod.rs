#![allow(dead_code)]

use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@lawdir.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const LAWYER_PASSWORD: &str = "abogado-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    // Holds the server's stdin open; the server exits once this process does
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lawyer-directory"));
        cmd.env("LAWDIR_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("STORE_BACKEND", "memory")
            .env("JWT_SECRET", "integration-test-secret")
            .env("BOOTSTRAP_ADMIN_EMAIL", ADMIN_EMAIL)
            .env("BOOTSTRAP_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env("LAWDIR_EXIT_ON_STDIN_EOF", "true")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Close the server's stdin and wait for the process to exit
    pub async fn close_stdin(&mut self, timeout: Duration) -> Result<ExitStatus> {
        drop(self.child.stdin.take());

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() > deadline {
                let _ = self.child.kill();
                anyhow::bail!("server on {} still running {:?} after stdin closed", self.base_url, timeout);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build http client")
}

/// Tests share one server, so every created lawyer needs a fresh email and RUT
pub fn unique() -> (String, String) {
    let n = Uuid::new_v4().as_u128();
    let email = format!("abogado-{}@lawdir.test", n % 1_000_000_000);
    let rut = format!("{:08}-{}", n % 100_000_000, n % 10);
    (email, rut)
}

/// Log in and return the session token from the response body
pub async fn login(server: &TestServer, email: &str, password: &str) -> Result<String> {
    let res = client()
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());

    let body: Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response without token")
}

pub async fn admin_token(server: &TestServer) -> Result<String> {
    login(server, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Create a lawyer through the admin API and return its JSON record
pub async fn create_lawyer(server: &TestServer, admin_token: &str, full_name: &str, commune: &str) -> Result<Value> {
    let (email, rut) = unique();
    let res = client()
        .post(server.url("/api/admin/lawyers"))
        .bearer_auth(admin_token)
        .json(&json!({
            "full_name": full_name,
            "rut": rut,
            "commune": commune,
            "specialty": "Derecho de Familia",
            "phone": "",
            "email": email,
            "password": LAWYER_PASSWORD
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create lawyer failed with {}", res.status());

    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}
