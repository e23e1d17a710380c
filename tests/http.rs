use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct StatsResponse {
    total_tasks: usize,
    completed_tasks: usize,
    completion_rate: u32,
    current_day: u32,
    days_left: u32,
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    task_id: String,
    completed: bool,
    stats: StatsResponse,
}

#[derive(Debug, Deserialize)]
struct CompletionRecord {
    id: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct StartDateResponse {
    start_date: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("routine_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/stats")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(store_disabled: bool) -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_routine_tracker"))
        .env("PORT", port.to_string())
        .env("ROUTINE_DATA_PATH", data_path)
        .env("ROUTINE_STORE_DISABLED", if store_disabled { "1" } else { "0" })
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(false).await);
    #[cfg(unix)]
    cleanup::register(server.child.id());
    *guard = Some(Arc::clone(&server));
    server
}

async fn post_toggle(client: &Client, base_url: &str, task_id: &str, completed: bool) -> ToggleResponse {
    let response = client
        .post(format!("{base_url}/api/progress"))
        .json(&serde_json::json!({ "task_id": task_id, "completed": completed }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn stored_ids(client: &Client, base_url: &str) -> Vec<String> {
    let records: Vec<CompletionRecord> = client
        .get(format!("{base_url}/api/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(records.iter().all(|record| record.completed));
    records.into_iter().map(|record| record.id).collect()
}

#[tokio::test]
async fn http_toggle_persists_and_updates_stats() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before: StatsResponse = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let toggled = post_toggle(&client, &server.base_url, "wednesday-2", true).await;
    assert_eq!(toggled.task_id, "wednesday-2");
    assert!(toggled.completed);
    assert_eq!(toggled.stats.completed_tasks, before.completed_tasks + 1);
    assert_eq!(toggled.stats.total_tasks, before.total_tasks);
    assert!(toggled.stats.completion_rate >= before.completion_rate);
    assert_eq!(toggled.stats.current_day + toggled.stats.days_left, 90);
    assert!(stored_ids(&client, &server.base_url).await.contains(&"wednesday-2".to_string()));

    let untoggled = post_toggle(&client, &server.base_url, "wednesday-2", false).await;
    assert_eq!(untoggled.stats.completed_tasks, before.completed_tasks);
    assert!(!stored_ids(&client, &server.base_url).await.contains(&"wednesday-2".to_string()));
}

#[tokio::test]
async fn http_page_reconciles_stored_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    post_toggle(&client, &server.base_url, "saturday-1", true).await;

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains(r#"class="check-button completed" type="submit" data-task-id="saturday-1""#));
    assert!(page.contains(r#"class="check-button" type="submit" data-task-id="saturday-2""#));

    post_toggle(&client, &server.base_url, "saturday-1", false).await;
}

#[tokio::test]
async fn http_form_toggle_redirects_home() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(format!("{}/tasks/sunday-1/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert!(stored_ids(&client, &server.base_url).await.contains(&"sunday-1".to_string()));

    client
        .post(format!("{}/tasks/sunday-1/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(!stored_ids(&client, &server.base_url).await.contains(&"sunday-1".to_string()));
}

#[tokio::test]
async fn http_start_date_is_recorded_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for _ in 0..2 {
        let response = client.get(format!("{}/", server.base_url)).send().await.unwrap();
        assert!(response.status().is_success());
    }
    let first: StartDateResponse = client
        .get(format!("{}/api/settings/start-date", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(first.start_date.is_some());

    client.get(format!("{}/", server.base_url)).send().await.unwrap();
    let second: StartDateResponse = client
        .get(format!("{}/api/settings/start-date", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.start_date, second.start_date);
}

#[tokio::test]
async fn http_unknown_task_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/progress", server.base_url))
        .json(&serde_json::json!({ "task_id": "not-a-task", "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!stored_ids(&client, &server.base_url).await.contains(&"not-a-task".to_string()));
}

#[tokio::test]
async fn http_serves_offline_worker() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/sw.js", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "application/javascript");
    assert!(response.text().await.unwrap().contains("addEventListener('fetch'"));
}

#[tokio::test]
async fn http_disabled_store_keeps_page_usable() {
    let server = spawn_server(true).await;
    let client = Client::new();

    let toggled = post_toggle(&client, &server.base_url, "monday-1", true).await;
    assert_eq!(toggled.stats.completed_tasks, 1);
    assert!(stored_ids(&client, &server.base_url).await.is_empty());

    let page = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert!(page.status().is_success());

    let start: StartDateResponse = client
        .get(format!("{}/api/settings/start-date", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(start.start_date.is_none());
}
