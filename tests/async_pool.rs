//! Concurrent decoding through the async worker pool

#![cfg(feature = "async")]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use futures::StreamExt;
use std::collections::HashSet;
use std::io::Write;
use wzimage::{AsyncDecodePool, DecodeRequest, DecodeResponse};

fn request(id: usize, width: u32) -> DecodeRequest {
    let pixels = vec![(id % 256) as u8; (width * 4 * 2) as usize];
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&pixels).unwrap();
    let payload = STANDARD.encode(encoder.finish().unwrap());
    DecodeRequest::new(id, payload, width, 4, Some(1))
}

#[tokio::test]
async fn test_one_response_per_request() {
    let pool = AsyncDecodePool::new().with_concurrency(4);
    let requests: Vec<_> = (0..32).map(|id| request(id, 8 + id as u32)).collect();

    let responses = pool.decode_all(requests).await;
    assert_eq!(responses.len(), 32);

    let ids: HashSet<u64> = responses
        .iter()
        .map(|response| {
            assert!(!response.is_error(), "{response:?}");
            response.id().as_u64().unwrap()
        })
        .collect();
    assert_eq!(ids, (0..32).collect());
}

#[tokio::test]
async fn test_errors_do_not_stop_the_batch() {
    let pool = AsyncDecodePool::new().with_concurrency(2);
    let mut requests = vec![request(0, 4), request(1, 4)];
    requests.push(DecodeRequest::new("broken", "not base64", 4, 4, None));
    requests.push(DecodeRequest::new("empty", "", 0, 0, None));

    let responses = pool.decode_all(requests).await;
    let errors: HashSet<_> = responses
        .iter()
        .filter(|r| r.is_error())
        .filter_map(|r| r.id().as_str())
        .collect();
    assert_eq!(responses.len(), 4);
    assert_eq!(errors, HashSet::from(["broken", "empty"]));
}

#[tokio::test]
async fn test_stream_yields_every_response() {
    let pool = AsyncDecodePool::new().with_concurrency(3);
    let requests: Vec<_> = (0..10).map(|id| request(id, 4)).collect();

    let mut stream = Box::pin(pool.decode_stream(requests));
    let mut count = 0;
    while let Some(response) = stream.next().await {
        assert!(matches!(response, DecodeResponse::Image { .. }));
        count += 1;
    }
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_decode_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.json");
    let batch = serde_json::to_string(&vec![request(1, 2), request(2, 2)]).unwrap();
    std::fs::write(&path, batch).unwrap();

    let responses = AsyncDecodePool::new().decode_file(&path).await.unwrap();
    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| !r.is_error()));
}
