use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use compprobe::fetch::{
    FetchError, PageFetcher,
    headers::{HeaderPools, HeaderRandomizer},
    http::HttpFetcher,
};

const PAGE: &str = "<h1 class=\"heading-title\">Beijing Spring 2024</h1>";

/// Minimal HTTP/1.1 host on loopback. Every response closes its connection,
/// so the connection count equals the number of requests received.
struct LocalHost {
    base: String,
    connections: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl LocalHost {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let conns = Arc::clone(&connections);
        let reqs = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                conns.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(stream, Arc::clone(&reqs)));
            }
        });

        Self {
            base: format!("http://{addr}/competition/"),
            connections,
            requests,
        }
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> String {
        self.requests
            .lock()
            .expect("lock")
            .last()
            .cloned()
            .expect("a request was received")
    }
}

async fn serve(mut stream: TcpStream, requests: Arc<Mutex<Vec<String>>>) {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&raw).into_owned();
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    requests.lock().expect("lock").push(request);

    let (status, body) = if path.ends_with("/Beijing-Spring-2024") {
        ("200 OK", PAGE)
    } else if path.ends_with("/Slow-Open-2024") {
        tokio::time::sleep(Duration::from_secs(5)).await;
        ("200 OK", PAGE)
    } else {
        ("404 Not Found", "no such competition")
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    let headers = HeaderRandomizer::new(HeaderPools::default(), 7);
    HttpFetcher::new(timeout, Arc::new(headers)).expect("client")
}

#[tokio::test]
async fn missing_page_is_a_response_not_an_error() {
    let host = LocalHost::start().await;
    let fetcher = fetcher(Duration::from_secs(5));

    let resp = fetcher
        .fetch(&format!("{}Nowhere-Open-2024", host.base))
        .await
        .expect("404 is still a response");

    assert_eq!(resp.status, 404);
    assert!(!resp.is_success());
    assert_eq!(resp.body, b"no such competition");
    assert_eq!(host.connections(), 1);
}

#[tokio::test]
async fn published_page_returns_body_with_randomized_headers() {
    let host = LocalHost::start().await;
    let fetcher = fetcher(Duration::from_secs(5));

    let missing = fetcher
        .fetch(&format!("{}Nowhere-Open-2024", host.base))
        .await
        .expect("response");
    assert_eq!(missing.status, 404);
    assert_eq!(host.connections(), 1);

    let resp = fetcher
        .fetch(&format!("{}Beijing-Spring-2024", host.base))
        .await
        .expect("response");
    assert_eq!(resp.status, 200);
    assert!(resp.is_success());
    assert_eq!(resp.body, PAGE.as_bytes());
    assert_eq!(host.connections(), 2);

    let request = host.last_request().to_ascii_lowercase();
    assert!(request.starts_with("get /competition/beijing-spring-2024 "));
    assert!(request.contains("eagleid:"));
    assert!(request.contains("cache-control: no-cache"));
    let pools = HeaderPools::default();
    assert!(
        pools
            .user_agents
            .iter()
            .any(|ua| request.contains(&format!("user-agent: {}", ua.to_ascii_lowercase())))
    );
    assert!(
        pools
            .languages
            .iter()
            .any(|lang| request.contains(&format!("accept-language: {}", lang.to_ascii_lowercase())))
    );
}

#[tokio::test]
async fn slow_host_maps_to_timeout() {
    let host = LocalHost::start().await;
    let fetcher = fetcher(Duration::from_millis(200));

    let result = fetcher.fetch(&format!("{}Slow-Open-2024", host.base)).await;

    assert!(matches!(result, Err(FetchError::Timeout)));
    assert_eq!(host.connections(), 1);
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let fetcher = fetcher(Duration::from_secs(5));

    let result = fetcher.fetch(&format!("http://{addr}/competition/Gone-Open-2024")).await;

    assert!(matches!(result, Err(FetchError::Transport(_))));
}
