#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{Error, HttpClient, Request, Response};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vibesync::{ClientConfig, StaticToken, VibeSyncClient};

pub const API_BASE: &str = "https://api.test";

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
            delay: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// What the client actually sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: Option<String>,
}

/// In-memory HTTP client that answers from a URL → response table.
///
/// Unknown URLs get a 404. Every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    routes: Arc<Mutex<HashMap<String, VecDeque<ScriptedResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `url`. The last queued response repeats.
    pub fn route(self, url: &str, response: ScriptedResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn next_response(&self, url: &str) -> ScriptedResponse {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => ScriptedResponse::json(404, json!({"error": {"status": 404, "message": "Not found"}})),
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let url = req.url().to_string();
        let authorization = req
            .header("Authorization")
            .map(|values| values.last().as_str().to_string());

        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.clone(),
            authorization,
        });

        let scripted = self.next_response(&url);
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        let mut response = Response::new(scripted.status);
        response.insert_header("Content-Type", "application/json");
        for (name, value) in &scripted.headers {
            response.insert_header(name.as_str(), value.as_str());
        }
        response.set_body(scripted.body);
        Ok(response)
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new().with_api_base(API_BASE)
}

/// Client using `http` for provider calls and a fixed token.
pub fn client_with_token(http: &ScriptedClient, token: &str) -> VibeSyncClient {
    VibeSyncClient::with_config(
        Box::new(http.clone()),
        Box::new(StaticToken::new(token)),
        test_config(),
    )
}

pub fn tracks_url(playlist_id: &str) -> String {
    format!("{API_BASE}/v1/playlists/{playlist_id}/tracks?limit=50")
}

pub fn page_url(playlist_id: &str, offset: usize) -> String {
    format!("{API_BASE}/v1/playlists/{playlist_id}/tracks?offset={offset}&limit=50")
}

pub fn raw_track(id: &str, name: &str) -> Value {
    json!({
        "track": {
            "id": id,
            "name": name,
            "artists": [{"name": format!("Artist of {name}")}],
            "album": {"name": "Album", "images": [{"url": format!("https://img.test/{id}.jpg")}]},
            "duration_ms": 200000
        }
    })
}

pub fn tracks_page(items: Vec<Value>, next: Option<String>, total: usize) -> Value {
    json!({
        "items": items,
        "next": next,
        "total": total,
        "limit": 50
    })
}

/// Script a playlist of `total` tracks named `t0..`, 50 per page.
pub fn script_paged_playlist(http: ScriptedClient, playlist_id: &str, total: usize) -> ScriptedClient {
    let mut http = http;
    let mut offset = 0;
    loop {
        let end = (offset + 50).min(total);
        let items = (offset..end)
            .map(|i| raw_track(&format!("t{i}"), &format!("Track {i}")))
            .collect();
        let next = (end < total).then(|| page_url(playlist_id, end));
        let url = if offset == 0 {
            tracks_url(playlist_id)
        } else {
            page_url(playlist_id, offset)
        };
        http = http.route(&url, ScriptedResponse::ok(tracks_page(items, next, total)));
        if end >= total {
            break;
        }
        offset = end;
    }
    http
}

pub fn playlist_detail(playlist_id: &str, name: &str) -> Value {
    json!({
        "id": playlist_id,
        "name": name,
        "description": "",
        "images": []
    })
}
