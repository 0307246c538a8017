/*!
Test support helpers shared across integration tests.

- FakeBoxingServer: in-process HTTP/1.1 server on 127.0.0.1 that implements the boxing
  API contract in memory (boxers, ring of at most two, fights, leaderboard) and records
  every request line it receives.
- smoketest_cmd(): Command for the built binary with a clean BOXING_* environment.
- closed_port(): a local port with nothing listening.
*/

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde_json::{json, Value};

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Paths (without query) answered with a JSON error instead of being handled.
    pub fail_paths: Vec<String>,
    /// Serialize responses compactly (`"status":"success"`, no space).
    pub compact: bool,
    /// Include `boxer_id` in create-boxer responses.
    pub report_ids: bool,
    /// First id handed out by create-boxer.
    pub first_id: i64,
    /// Paths (without query) whose response is held back for two seconds.
    pub stall_paths: Vec<String>,
}

#[derive(Debug, Clone)]
struct StoredBoxer {
    id: i64,
    name: String,
    weight: i64,
    height: i64,
    reach: f64,
    age: i64,
    fights: i64,
    wins: i64,
}

impl StoredBoxer {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "weight": self.weight,
            "height": self.height,
            "reach": self.reach,
            "age": self.age,
        })
    }

    fn skill(&self) -> f64 {
        let age_modifier = if self.age < 25 {
            -1.0
        } else if self.age > 35 {
            -2.0
        } else {
            0.0
        };
        (self.weight as f64 * self.name.len() as f64) + self.reach / 10.0 + age_modifier
    }
}

#[derive(Debug, Default)]
struct State {
    boxers: BTreeMap<i64, StoredBoxer>,
    next_id: i64,
    ring: Vec<i64>,
    log: Vec<String>,
}

pub struct FakeBoxingServer {
    pub base_url: String,
    port: u16,
    state: Arc<Mutex<State>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeBoxingServer {
    #[allow(dead_code)]
    pub fn start() -> Self {
        Self::start_with(ServerOptions::default())
    }

    #[allow(dead_code)]
    pub fn start_with(opts: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        let port = listener.local_addr().expect("local addr").port();
        let state = Arc::new(Mutex::new(State {
            next_id: if opts.first_id > 0 { opts.first_id } else { 1 },
            ..State::default()
        }));
        let running = Arc::new(AtomicBool::new(true));

        let st = Arc::clone(&state);
        let flag = Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            for conn in listener.incoming() {
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if let Ok(stream) = conn {
                    handle_connection(stream, &st, &opts);
                }
            }
        });

        FakeBoxingServer {
            base_url: format!("http://127.0.0.1:{port}/api"),
            port,
            state,
            running,
            handle: Some(handle),
        }
    }

    /// Request lines received so far, e.g. `POST /api/fight`.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    #[allow(dead_code)]
    pub fn ring_ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().ring.clone()
    }

    #[allow(dead_code)]
    pub fn boxer_names(&self) -> Vec<String> {
        let st = self.state.lock().unwrap();
        st.boxers.values().map(|b| b.name.clone()).collect()
    }
}

impl Drop for FakeBoxingServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Wake the blocking accept so the thread observes the flag
        let _ = TcpStream::connect(("127.0.0.1", self.port));
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

struct Request {
    method: String,
    path: String,
    query: Vec<(String, String)>,
    body: Vec<u8>,
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?.to_string();

    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (
            p.to_string(),
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        ),
        None => (target.clone(), Vec::new()),
    };

    Some(Request {
        method,
        path,
        query,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, state: &Mutex<State>, opts: &ServerOptions) {
    let req = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let (code, payload) = {
        let mut st = state.lock().unwrap();
        st.log.push(format!("{} {}", req.method, req.path));
        if opts.fail_paths.iter().any(|p| req.path.starts_with(p.as_str())) {
            (500, error("Injected failure"))
        } else {
            route(&mut st, &req, opts)
        }
    };
    if opts.stall_paths.iter().any(|p| req.path.starts_with(p.as_str())) {
        std::thread::sleep(std::time::Duration::from_secs(2));
    }

    let body = if opts.compact {
        serde_json::to_string(&payload).unwrap()
    } else {
        serde_json::to_string_pretty(&payload).unwrap()
    };
    let reason = match code {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    };
    let resp = format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(resp.as_bytes());
    let _ = stream.flush();
}

fn success(extra: Value) -> Value {
    let mut v = json!({"status": "success"});
    if let (Value::Object(dst), Value::Object(src)) = (&mut v, extra) {
        dst.extend(src);
    }
    v
}

fn error(message: &str) -> Value {
    json!({"status": "error", "message": message})
}

fn path_id(path: &str, prefix: &str) -> Option<i64> {
    path.strip_prefix(prefix)?.parse().ok()
}

fn route(st: &mut State, req: &Request, opts: &ServerOptions) -> (u16, Value) {
    let method = req.method.as_str();
    let path = req.path.as_str();

    match (method, path) {
        ("GET", "/api/health") => (200, success(json!({}))),
        ("GET", "/api/db-check") => (200, success(json!({"database_status": "healthy"}))),
        ("POST", "/api/create-boxer") => {
            let v: Value = match serde_json::from_slice(&req.body) {
                Ok(v) => v,
                Err(_) => return (400, error("Invalid JSON body")),
            };
            let name = v.get("name").and_then(Value::as_str).unwrap_or("").to_string();
            let weight = v.get("weight").and_then(Value::as_i64).unwrap_or(0);
            let height = v.get("height").and_then(Value::as_i64).unwrap_or(0);
            let reach = v.get("reach").and_then(Value::as_f64).unwrap_or(-1.0);
            let age = v.get("age").and_then(Value::as_i64).unwrap_or(0);
            if name.is_empty() || weight < 125 || height <= 0 || reach < 0.0 || !(18..=40).contains(&age) {
                return (400, error("Invalid boxer attributes"));
            }
            if st.boxers.values().any(|b| b.name == name) {
                return (400, error(&format!("Boxer with name '{name}' already exists")));
            }
            let id = st.next_id;
            st.next_id += 1;
            st.boxers.insert(
                id,
                StoredBoxer {
                    id,
                    name: name.clone(),
                    weight,
                    height,
                    reach,
                    age,
                    fights: 0,
                    wins: 0,
                },
            );
            let mut extra = json!({"message": format!("Boxer '{name}' created successfully")});
            if opts.report_ids {
                extra["boxer_id"] = json!(id);
            }
            (201, success(extra))
        }
        ("DELETE", p) if p.starts_with("/api/delete-boxer/") => {
            let removed = path_id(p, "/api/delete-boxer/").and_then(|id| st.boxers.remove(&id));
            match removed {
                Some(b) => {
                    st.ring.retain(|r| *r != b.id);
                    (200, success(json!({"message": format!("Boxer with ID {} deleted", b.id)})))
                }
                None => (404, error("Boxer not found")),
            }
        }
        ("GET", p) if p.starts_with("/api/get-boxer-by-id/") => {
            match path_id(p, "/api/get-boxer-by-id/").and_then(|id| st.boxers.get(&id)) {
                Some(b) => (200, success(json!({"boxer": b.to_json()}))),
                None => (404, error("Boxer not found")),
            }
        }
        ("GET", "/api/get-boxer-by-name") => {
            let name = req
                .query
                .iter()
                .find(|(k, _)| k == "name")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            match st.boxers.values().find(|b| b.name == name) {
                Some(b) => (200, success(json!({"boxer": b.to_json()}))),
                None => (404, error(&format!("Boxer with name {name} not found"))),
            }
        }
        ("GET", "/api/get-leaderboard") => {
            let sort_by = req
                .query
                .iter()
                .find(|(k, _)| k == "sort_by")
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| "wins".to_string());
            let mut rows: Vec<&StoredBoxer> = st.boxers.values().filter(|b| b.fights > 0).collect();
            let pct = |b: &StoredBoxer| b.wins as f64 / b.fights as f64;
            match sort_by.as_str() {
                "wins" => rows.sort_by(|a, b| b.wins.cmp(&a.wins)),
                "win_pct" => rows.sort_by(|a, b| pct(b).total_cmp(&pct(a))),
                other => return (400, error(&format!("Invalid sort_by parameter: {other}"))),
            }
            let board: Vec<Value> = rows
                .iter()
                .map(|b| {
                    json!({
                        "id": b.id,
                        "name": b.name,
                        "fights": b.fights,
                        "wins": b.wins,
                        "win_pct": (pct(b) * 1000.0).round() / 10.0,
                    })
                })
                .collect();
            (200, success(json!({"leaderboard": board})))
        }
        ("POST", p) if p.starts_with("/api/enter-boxer-into-ring/") => {
            let id = match path_id(p, "/api/enter-boxer-into-ring/") {
                Some(id) if st.boxers.contains_key(&id) => id,
                _ => return (404, error("Boxer not found")),
            };
            if st.ring.len() >= 2 {
                return (400, error("Ring is full, cannot add more boxers."));
            }
            st.ring.push(id);
            (200, success(json!({"message": format!("Boxer {id} entered the ring")})))
        }
        ("GET", "/api/get-boxers-in-ring") => {
            let boxers: Vec<Value> = st
                .ring
                .iter()
                .filter_map(|id| st.boxers.get(id))
                .map(StoredBoxer::to_json)
                .collect();
            (200, success(json!({"boxers": boxers})))
        }
        ("POST", "/api/clear-ring") => {
            st.ring.clear();
            (200, success(json!({"message": "Ring cleared"})))
        }
        ("POST", "/api/fight") => {
            if st.ring.len() < 2 {
                return (400, error("There must be two boxers to start a fight."));
            }
            let (a, b) = (st.ring[0], st.ring[1]);
            let skill_a = st.boxers[&a].skill();
            let skill_b = st.boxers[&b].skill();
            let (winner, loser) = if skill_a >= skill_b { (a, b) } else { (b, a) };
            if let Some(w) = st.boxers.get_mut(&winner) {
                w.fights += 1;
                w.wins += 1;
            }
            if let Some(l) = st.boxers.get_mut(&loser) {
                l.fights += 1;
            }
            st.ring.clear();
            let name = st.boxers[&winner].name.clone();
            (200, success(json!({"winner": name})))
        }
        _ => (404, error(&format!("No route for {method} {path}"))),
    }
}

/// Command for the built binary with BOXING_* variables cleared and color disabled.
#[allow(dead_code)]
pub fn smoketest_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_boxing-smoketest"));
    for (key, _) in std::env::vars() {
        if key.starts_with("BOXING_") || key == "RUST_LOG" {
            cmd.env_remove(key);
        }
    }
    cmd.current_dir(workdir).env("NO_COLOR", "1");
    cmd
}

/// Port on 127.0.0.1 with nothing listening.
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let l = TcpListener::bind("127.0.0.1:0").expect("bind");
    l.local_addr().expect("addr").port()
}
