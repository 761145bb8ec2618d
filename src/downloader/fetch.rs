//! Transport seam between a download task and the network.
//!
//! [`HttpFetcher`] performs the real transfer: it connects to the hub's
//! download endpoint, adopts the server-announced name and size, then streams
//! the body to `{destination}/{name}`. Tests plug in their own [`Fetcher`].

use super::task::{TaskProgress, TaskState};
use crate::error::{Error, Result};
use crate::product::ProductRecord;
use crate::utils::{declared_length, disposition_filename};

use futures::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_ENCODING};
use reqwest_middleware::ClientWithMiddleware;
use std::future::Future;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

/// Brings one product's payload to disk.
///
/// Implementations own the `Connecting` and `Streaming` phases: they may
/// correct `record.name` and `record.expected_size` once connected (mirroring
/// the change into `progress` before the first byte is counted), must move
/// `progress` to [`TaskState::Streaming`] before transferring, and must leave
/// the payload at `record.output_path()` on success.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        record: &mut ProductRecord,
        progress: &TaskProgress,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`Fetcher`] downloading products over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    async fn connect(
        &self,
        record: &mut ProductRecord,
        progress: &TaskProgress,
    ) -> Result<reqwest::Response> {
        let url = record.hub.download_url(&record.id)?;
        debug!("Fetching {}", url);

        let connect_error = |message: String| Error::Connect {
            product: record.name.clone(),
            message,
        };

        let res = self
            .client
            .get(url)
            .basic_auth(record.hub.username(), Some(record.hub.password()))
            .header(ACCEPT, HeaderValue::from_static("application/octet-stream"))
            .header(ACCEPT_ENCODING, HeaderValue::from_static("identity"))
            .send()
            .await
            .map_err(|e| connect_error(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(connect_error(format!("server answered {}", status)));
        }

        if let Some(name) = disposition_filename(res.headers()) {
            if name != record.name {
                debug!("Server renamed {} to {}", record.name, name);
                progress.rename(name.clone());
                record.name = name;
            }
        }

        let size = declared_length(res.headers()).unwrap_or(0);
        record.expected_size = size;
        progress.set_expected_size(size);

        Ok(res)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, record: &mut ProductRecord, progress: &TaskProgress) -> Result<()> {
        let res = self.connect(record, progress).await?;
        progress.transition(TaskState::Streaming);

        let stream_error = |e: &dyn std::fmt::Display| Error::Stream {
            product: record.name.clone(),
            message: e.to_string(),
        };

        let output = record.output_path()?;
        debug!("Creating destination directory {:?}", record.destination);
        fs::create_dir_all(&record.destination).await?;

        let mut file = fs::File::create(&output).await?;

        let mut stream = res.bytes_stream();
        while let Some(item) = stream.next().await {
            let mut chunk = item.map_err(|e| stream_error(&e))?;
            let len = chunk.len() as u64;
            file.write_all_buf(&mut chunk)
                .await
                .map_err(|e| stream_error(&e))?;
            progress.advance(len);
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", progress.transferred(), output.display());
        Ok(())
    }
}
