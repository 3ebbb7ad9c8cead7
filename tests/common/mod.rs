use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static EMAIL_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Keep registration fast in tests; must be set before the config
        // singleton is first touched by the server thread.
        std::env::set_var("BCRYPT_COST", "4");

        // Serve the router in-process on a dedicated runtime thread so the
        // server outlives each test's own runtime.
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");

            rt.block_on(async move {
                let pool = projecthub_api::database::connect("sqlite::memory:", 1)
                    .await
                    .expect("test pool");
                projecthub_api::database::migrate(&pool).await.expect("migrate");

                let app = projecthub_api::app(pool);
                let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
                    .await
                    .expect("bind test listener");

                axum::serve(listener, app).await.expect("test server");
            });
        });

        Ok(Self { base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
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
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to start test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique email per call; the server (and its database) is shared by every
/// test in the binary.
pub fn unique_email(tag: &str) -> String {
    let n = EMAIL_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}+{}-{}@example.com", tag, std::process::id(), n)
}

/// Register a user and return a bearer token for them.
pub async fn register_user(
    client: &reqwest::Client,
    base_url: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&serde_json::json!({
            "first_name": first_name,
            "last_name": last_name,
            "email": email,
            "password": "correct-horse-battery",
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "registration failed with {}",
        res.status()
    );

    let body: serde_json::Value = res.json().await?;
    let token = body["token"]
        .as_str()
        .context("registration response missing token")?
        .to_string();
    Ok(token)
}
