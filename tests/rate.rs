use std::sync::Mutex;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;

use biocyc_cache::client::Client;
use biocyc_cache::config::ClientConfig;
use biocyc_cache::error::BiocycError;
use biocyc_cache::remote::{Transport, TransportResponse};

#[derive(Default)]
struct CountingTransport {
    calls: Mutex<usize>,
}

impl Transport for CountingTransport {
    fn get(&self, _url: &str) -> Result<TransportResponse, BiocycError> {
        *self.calls.lock().unwrap() += 1;
        Ok(TransportResponse {
            status: 404,
            body: String::new(),
        })
    }
}

#[test]
fn sequential_fetches_respect_min_interval() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap();
    let mut config = ClientConfig::with_cache_root(root);
    config.min_interval = Duration::from_millis(60);
    let client = Client::new(config, CountingTransport::default());

    let start = Instant::now();
    client.resolve_all(&["A", "B", "C", "D"]).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(*client.transport().calls.lock().unwrap(), 4);
    assert!(elapsed >= Duration::from_millis(175), "{elapsed:?}");
}

#[test]
fn cache_hits_do_not_wait() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap();
    let mut config = ClientConfig::with_cache_root(root);
    config.min_interval = Duration::from_secs(2);
    let client = Client::new(config, CountingTransport::default());

    client.resolve("A").unwrap();
    let start = Instant::now();
    for _ in 0..5 {
        client.resolve("A").unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(*client.transport().calls.lock().unwrap(), 1);
}
