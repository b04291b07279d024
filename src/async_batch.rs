//! Async batch decoding module
//!
//! This module runs independent decode requests concurrently on tokio's
//! blocking thread pool. Every request yields exactly one response carrying
//! its `id`; responses come back in completion order.

#[cfg(feature = "async")]
/// Concurrent request decoding with a configurable concurrency limit
pub mod pool {
    use crate::message::{parse_batch, DecodeRequest, DecodeResponse};
    use crate::pipeline::{DecodeOptions, WzDecoder};
    use crate::{Result, WzImageError};
    use futures::stream::{self, Stream, StreamExt};
    use std::path::Path;
    use std::sync::Arc;

    /// Worker pool that decodes requests with a shared [`WzDecoder`]
    #[derive(Debug, Clone)]
    pub struct AsyncDecodePool {
        decoder: Arc<WzDecoder>,
        concurrency_limit: usize,
    }

    impl AsyncDecodePool {
        /// Create a pool with the default decoder, one task per CPU
        pub fn new() -> Self {
            Self::with_options(DecodeOptions::default())
        }

        /// Create a pool whose decoder uses `options`
        pub fn with_options(options: DecodeOptions) -> Self {
            Self::with_decoder(Arc::new(WzDecoder::new(options)))
        }

        /// Create a pool around an existing decoder
        pub fn with_decoder(decoder: Arc<WzDecoder>) -> Self {
            Self {
                decoder,
                concurrency_limit: num_cpus::get(),
            }
        }

        /// Set the number of requests decoded at once
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Number of requests decoded at once
        pub fn concurrency(&self) -> usize {
            self.concurrency_limit
        }

        /// Shared decoder
        pub fn decoder(&self) -> &Arc<WzDecoder> {
            &self.decoder
        }

        /// Decode one request on the blocking pool
        pub async fn decode(&self, request: DecodeRequest) -> DecodeResponse {
            let decoder = Arc::clone(&self.decoder);
            let id = request.id.clone();
            match tokio::task::spawn_blocking(move || decoder.handle(request)).await {
                Ok(response) => response,
                Err(err) => {
                    log::warn!("decode task for request {id} did not complete: {err}");
                    DecodeResponse::error(
                        id,
                        &WzImageError::InvalidData(format!("decode task failed: {err}")),
                    )
                }
            }
        }

        /// Decode all requests, returning responses in completion order
        pub async fn decode_all(&self, requests: Vec<DecodeRequest>) -> Vec<DecodeResponse> {
            self.decode_stream(requests).collect().await
        }

        /// Stream responses as they complete
        pub fn decode_stream(
            &self,
            requests: Vec<DecodeRequest>,
        ) -> impl Stream<Item = DecodeResponse> + '_ {
            stream::iter(requests.into_iter().map(move |request| self.decode(request)))
                .buffer_unordered(self.concurrency_limit)
        }

        /// Read a request batch file (JSON array or JSON lines) and decode it
        pub async fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<DecodeResponse>> {
            let text = tokio::fs::read_to_string(path).await?;
            let requests = parse_batch(&text)?;
            Ok(self.decode_all(requests).await)
        }
    }

    impl Default for AsyncDecodePool {
        fn default() -> Self {
            Self::new()
        }
    }

}

#[cfg(feature = "async")]
pub use pool::AsyncDecodePool;
