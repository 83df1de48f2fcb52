use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

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
    path.push(format!("fastway_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/standings")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_fastway_league"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .env("FASTWAY_SEED_DEMO", "0")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(client: &Client, url: String) -> Value {
    let response = client.get(url).send().await.unwrap();
    assert!(response.status().is_success(), "status {}", response.status());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_roster_drives_standings_and_awards() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let roster = json!([
        { "name": "Time Track", "points": "40", "wins": 5, "chWins": 1, "bestTime": "1:21.50" },
        { "name": "Delorean", "points": 35, "wins": 7, "chWins": 0, "bestTime": "DNF" },
        { "name": "High Voltage", "points": 20, "wins": 2, "chWins": 2, "bestTime": "1:19.90" },
        { "name": "Stingray", "points": 50, "wins": 1, "chWins": 0 }
    ]);
    let response = client
        .put(format!("{}/api/store/fastwayAllData", server.base_url))
        .body(roster.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let standings = get_json(&client, format!("{}/api/standings", server.base_url)).await;
    let serie_a: Vec<&str> = standings[0]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(serie_a, ["Time Track", "Delorean"]);
    let serie_b = &standings[1]["entries"];
    assert_eq!(serie_b[0]["name"], "High Voltage");
    assert_eq!(serie_b[1]["total"], 60);

    let awards = get_json(&client, format!("{}/api/awards", server.base_url)).await;
    assert_eq!(awards["mostWins"]["winner"], "Delorean");
    assert_eq!(awards["fastestLap"]["winner"], "High Voltage");
    assert_eq!(awards["overallWinner"]["winner"], "Delorean");
    assert_eq!(awards["serieBWinner"]["winner"], "Stingray");
    assert_eq!(awards["chWinner"]["status"], "notYetAvailable");

    let stored = get_json(&client, format!("{}/api/store/fastwayAllData", server.base_url)).await;
    assert_eq!(stored, roster);
}

#[tokio::test]
async fn http_award_history_is_newest_season_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/history/awards/fastestLap", server.base_url);

    for (winner, season) in [("Old Hand", 2023), ("New Kid", 2025)] {
        let response = client
            .post(&url)
            .json(&json!({ "winner": winner, "season": season, "time": "1:20.00" }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let history = get_json(&client, url.clone()).await;
    let seasons: Vec<i64> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["season"].as_i64().unwrap())
        .collect();
    assert!(seasons.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(history[0]["winner"], "New Kid");
    assert!(!history[0]["date"].as_str().unwrap().is_empty());

    let blank = client
        .post(&url)
        .json(&json!({ "winner": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status().as_u16(), 400);

    let unknown = client
        .post(format!("{}/api/history/awards/quickest", server.base_url))
        .json(&json!({ "winner": "Someone" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn http_unknown_driver_page_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/driver?driver=Nobody%20Here", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("Driver not found"));

    let missing_key = client
        .get(format!("{}/api/store/fastway_unused_key", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_key.status().as_u16(), 404);
}

#[tokio::test]
async fn http_playoffs_start_and_advance_show_the_bracket() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let roster = json!([
        { "name": "Time Track", "points": 40, "wins": 5 },
        { "name": "Delorean", "points": 35, "wins": 7 },
        { "name": "High Voltage", "points": 20, "wins": 2 },
        { "name": "Stingray", "points": 50, "wins": 1 }
    ]);
    let response = client
        .put(format!("{}/api/store/fastwayAllData", server.base_url))
        .body(roster.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let started = client
        .post(format!("{}/api/playoffs/start", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(started.status().is_success());
    let started: Value = started.json().await.unwrap();
    assert_eq!(started["state"]["active"], true);
    assert_eq!(started["data"]["A"]["qualified"], json!(["Delorean", "Time Track"]));

    let advanced: Value = client
        .post(format!("{}/api/playoffs/advance", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(advanced["state"]["currentRaceInRound"], 1);

    let playoffs = get_json(&client, format!("{}/api/playoffs", server.base_url)).await;
    assert_eq!(playoffs[0]["status"], "bracket");
    let bracket = &playoffs[0]["bracket"];
    assert_eq!(bracket["currentRound"]["name"], "ROUND 1");
    assert_eq!(bracket["raceNumber"], 2);
    assert_eq!(bracket["qualified"][0]["name"], "Delorean");

    let page = client
        .get(format!("{}/playoffs", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("Race 2 / 3"));

    let added = client
        .post(format!("{}/hall-of-fame/add", server.base_url))
        .form(&[
            ("name", "Delorean"),
            ("year", "2024"),
            ("wins", "7"),
            ("points", "35"),
            ("serie", "A"),
        ])
        .send()
        .await
        .unwrap();
    assert!(added.status().is_success());
    assert!(added.url().path().ends_with("/hall-of-fame"));

    let hall = get_json(&client, format!("{}/api/hall-of-fame", server.base_url)).await;
    let champion = &hall["history"][0];
    assert_eq!(champion["name"], "Delorean");
    assert_eq!(champion["year"], 2024);
    assert_eq!(champion["serie"], "A");
}
