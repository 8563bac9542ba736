//! Test helpers: HTTP health servers and process liveness checks

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Local server answering `/health` with 503 until enough requests were made
pub struct HealthServer {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl HealthServer {
    /// Answer 200 from the `ready_after`-th request on (1-based)
    pub async fn start(ready_after: usize) -> Self {
        let requests = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/health", get(health))
            .with_state((requests.clone(), ready_after));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/health", self.addr)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn health(State((requests, ready_after)): State<(Arc<AtomicUsize>, usize)>) -> StatusCode {
    let seen = requests.fetch_add(1, Ordering::SeqCst) + 1;
    if seen >= ready_after {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub struct TestHelpers;

impl TestHelpers {
    /// A port on localhost nobody listens on
    pub fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        format!("http://127.0.0.1:{port}/health")
    }

    /// Whether a process with this pid exists
    #[cfg(unix)]
    pub fn is_alive(pid: u32) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    /// Poll until the process is gone or the timeout passes
    #[cfg(unix)]
    pub async fn wait_until_gone(pid: u32, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if !Self::is_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        !Self::is_alive(pid)
    }
}
