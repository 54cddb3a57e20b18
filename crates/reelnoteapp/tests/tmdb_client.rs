use reelnoteapp::catalog::retry::{is_retryable, AttemptFailure, FailureKind};
use reelnoteapp::catalog::{Catalog, TmdbClient};
use reelnoteapp::model::MediaKind;
use reelnoteapp::ReelnoteError;
use std::io::{Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

type Route = dyn Fn(&str) -> (u16, &'static str, Vec<u8>) + Send + Sync;

/// Minimal HTTP/1.1 server answering one request per connection.
struct MockServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    fn start(route: Arc<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &route, &log);
            }
        });

        Self { base, requests }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|target| target.split('?').next() == Some(path))
            .count()
    }

    fn client(&self) -> TmdbClient {
        TmdbClient::new("test-key")
            .with_base_url(&self.base)
            .with_image_base_url(&format!("{}/img", self.base))
            .with_timeout(Duration::from_secs(5))
    }
}

fn handle(mut stream: TcpStream, route: &Arc<Route>, log: &Arc<Mutex<Vec<String>>>) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return,
        }
    }
    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().unwrap().push(target.clone());

    let path = target.split('?').next().unwrap_or("/");
    let (status, content_type, body) = (**route)(path);
    let reason = if status == 200 { "OK" } else { "Error" };
    let header = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&body);
}

fn json(body: &str) -> (u16, &'static str, Vec<u8>) {
    (200, "application/json", body.as_bytes().to_vec())
}

fn not_found() -> (u16, &'static str, Vec<u8>) {
    (404, "application/json", br#"{"status_message":"not found"}"#.to_vec())
}

fn catalog_routes() -> Arc<Route> {
    Arc::new(|path: &str| match path {
        "/search/multi" => json(
            r#"{"results":[
                {"id":949,"media_type":"movie","title":"Heat","poster_path":"/heat.jpg","release_date":"1995-12-15"},
                {"id":7,"media_type":"person","name":"Al Pacino","poster_path":"/al.jpg"},
                {"id":8,"media_type":"tv","name":"Heat Wave","poster_path":null},
                {"id":9,"media_type":"tv","name":"Heatwave","poster_path":"/hw.jpg","first_air_date":"2010-01-01"}
            ]}"#,
        ),
        "/movie/949" => json(
            r#"{"id":949,"runtime":170,"poster_path":"/heat.jpg","genres":[{"id":80,"name":"Crime"},{"id":18}]}"#,
        ),
        "/movie/500" => json(r#"{"id":500,"runtime":99,"poster_path":"","genres":[{"id":80}]}"#),
        "/tv/1396" => json(
            r#"{"id":1396,"episode_run_time":[45,47],"number_of_episodes":62,"genres":[{"id":10765,"name":"Sci-Fi & Fantasy"}]}"#,
        ),
        "/genre/movie/list" => json(r#"{"genres":[{"id":80,"name":"Crime"},{"id":18,"name":"Drama"}]}"#),
        "/genre/tv/list" => json(r#"{"genres":[{"id":10765,"name":"Sci-Fi & Fantasy"}]}"#),
        _ => not_found(),
    })
}

#[test]
fn test_search_filters_unusable_results() {
    let server = MockServer::start(catalog_routes());
    let found = server.client().search_multi("Heat", 10).unwrap();

    let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![949, 9]);
    assert_eq!(found[0].kind, MediaKind::Movie);
    assert_eq!(found[1].kind, MediaKind::Tv);
    assert_eq!(found[1].title, "Heatwave");

    let request = &server.requests()[0];
    assert!(request.contains("api_key=test-key"));
    assert!(request.contains("query=Heat"));
}

#[test]
fn test_search_respects_limit() {
    let server = MockServer::start(catalog_routes());
    let found = server.client().search_multi("Heat", 1).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_movie_metadata_and_genre_cache() {
    let server = MockServer::start(catalog_routes());
    let client = server.client();

    let heat = client.metadata_by_id(949, MediaKind::Movie).unwrap();
    assert_eq!(heat.runtime, Some(170));
    assert_eq!(heat.total_episodes, None);
    assert_eq!(heat.genre_tags, vec!["movie/Crime", "movie/Drama"]);

    let other = client.metadata_by_id(500, MediaKind::Movie).unwrap();
    assert_eq!(other.genre_tags, vec!["movie/Crime"]);

    assert_eq!(server.count("/genre/movie/list"), 1);
}

#[test]
fn test_tv_metadata_uses_first_run_time() {
    let server = MockServer::start(catalog_routes());
    let show = server
        .client()
        .metadata_by_id(1396, MediaKind::Tv)
        .unwrap();
    assert_eq!(show.runtime, Some(45));
    assert_eq!(show.total_episodes, Some(62));
    assert_eq!(show.genre_tags, vec!["tv/Sci-Fi-and-Fantasy"]);
    assert_eq!(show.external_kind, MediaKind::Tv);
}

#[test]
fn test_status_errors_are_not_retried() {
    let server = MockServer::start(catalog_routes());
    let err = server
        .client()
        .metadata_by_id(1, MediaKind::Movie)
        .unwrap_err();
    assert!(matches!(err, ReelnoteError::HttpStatus { status: 404, .. }));
    assert_eq!(server.count("/movie/1"), 1);
}

#[test]
fn test_cover_url_and_missing_poster() {
    let server = MockServer::start(catalog_routes());
    let client = server.client();

    let url = client.cover_url_by_id(949, MediaKind::Movie).unwrap();
    assert_eq!(url, format!("{}/img/heat.jpg", server.base));

    let err = client.cover_url_by_id(500, MediaKind::Movie).unwrap_err();
    assert!(matches!(err, ReelnoteError::NoPoster));
}

#[test]
fn test_full_details_requests_appended_data() {
    let server = MockServer::start(catalog_routes());
    let details = server
        .client()
        .full_details(1396, MediaKind::Tv)
        .unwrap();
    assert_eq!(details["number_of_episodes"], 62);
    let request = &server.requests()[0];
    assert!(request.contains("append_to_response=external_ids%2Ckeywords%2Ccontent_ratings"));
}

#[test]
fn test_download_scales_wide_cover() {
    let mut png = Vec::new();
    image::RgbImage::new(2000, 1000)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let png = Arc::new(png);
    let served = Arc::clone(&png);
    let server = MockServer::start(Arc::new(move |path: &str| match path {
        "/img/wide.png" => (200, "image/png", served.to_vec()),
        _ => not_found(),
    }));

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("attachments").join("Wide - cover.jpg");
    let client = server.client();
    client
        .download_image(&client.image_url("/wide.png"), &dest, 1000)
        .unwrap();

    assert_eq!(image::image_dimensions(&dest).unwrap(), (1000, 500));
}

#[test]
fn test_download_failure_leaves_no_file() {
    let server = MockServer::start(catalog_routes());
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("missing.jpg");
    let client = server.client();

    assert!(client
        .download_image(&client.image_url("/missing.png"), &dest, 1000)
        .is_err());
    assert!(!dest.exists());
}

#[test]
fn test_refused_connection_is_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/search/multi", listener.local_addr().unwrap());
    drop(listener);

    let err = ureq::get(&url).call().unwrap_err();
    let failure = AttemptFailure::from_ureq(err);
    assert_eq!(failure.kind, FailureKind::Connection);
    assert!(is_retryable(failure.kind));
}

#[test]
fn test_stalled_server_is_a_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/search/multi", listener.local_addr().unwrap());
    thread::spawn(move || {
        // accept and never answer
        let held: Vec<TcpStream> = listener.incoming().take(1).filter_map(Result::ok).collect();
        thread::sleep(Duration::from_secs(3));
        drop(held);
    });

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_millis(300))
        .build();
    let err = agent.get(&url).call().unwrap_err();
    let failure = AttemptFailure::from_ureq(err);
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(is_retryable(failure.kind));
}
