//! The host protocol over newline-delimited JSON streams.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::host::{Host, HostConfig};
use crate::protocol::{decode_request, Response};

/// Read one JSON request per line from `reader` and write one JSON response
/// per line to `writer`, until `reader` is exhausted and every request has
/// been answered. Blank lines are ignored. Responses appear in completion
/// order.
pub async fn serve_lines<R, W>(reader: R, mut writer: W, config: HostConfig) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let host = Host::spawn(config);
    let (requests, mut responses) = host.into_channels();
    let mut lines = reader.lines();
    let mut reading = true;
    let mut requests = Some(requests);

    loop {
        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match decode_request(&line) {
                    Ok(request) => {
                        let Some(sender) = &requests else { continue };
                        let id = request.id.clone();
                        let envelope = crate::host::Envelope {
                            request,
                            token: CancellationToken::new(),
                        };
                        if sender.send(envelope).await.is_err() {
                            warn!(id = %id, "host closed, dropping request");
                            write_response(&mut writer, &Response::error(id, "host closed")).await?;
                        }
                    }
                    Err(response) => write_response(&mut writer, &response).await?,
                },
                None => {
                    debug!("input closed");
                    reading = false;
                    // Dropping the sender lets the host drain and close.
                    requests = None;
                }
            },
            response = responses.recv() => match response {
                Some(response) => write_response(&mut writer, &response).await?,
                None => break,
            },
        }
    }

    writer.flush().await
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> io::Result<()> {
    let mut line = serde_json::to_vec(response).map_err(io::Error::other)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}
