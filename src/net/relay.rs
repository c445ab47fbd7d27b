//! Bidirectional byte relay for CONNECT tunnels.
//!
//! # Data Flow
//! ```text
//! client ──read──▶ [client → destination task] ──write──▶ destination
//! client ◀─write── [destination → client task] ◀──read── destination
//! ```
//!
//! # Design Decisions
//! - Exactly two tasks per session, one per direction, never joined
//! - Each direction exclusively owns one read half and one write half
//! - Whichever direction ends first closes the session for both; there is
//!   no idle timeout or liveness check
//! - Stream errors are logged and end the session, nothing is reported
//!   to either peer

use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::net::connection::ConnectionGuard;

/// Size of the copy buffer of each relay direction.
pub const RELAY_BUFFER_SIZE: usize = 8 * 1024;

/// Direction of one relay loop within a tunnel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToDestination,
    DestinationToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ClientToDestination => f.write_str("client->destination"),
            Direction::DestinationToClient => f.write_str("destination->client"),
        }
    }
}

/// Close signal shared by the two directions of one session.
///
/// Firing it is the equivalent of closing both connection handles: the
/// opposite direction stops at its next read or write.
#[derive(Debug, Clone)]
pub struct Teardown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Close the session. Idempotent.
    pub fn close(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the session has been closed by either direction.
    pub async fn closed(&mut self) {
        // The sender lives as long as `self`, so this cannot fail.
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

/// Splice a client connection and a destination connection until either
/// side closes.
///
/// The client → destination direction is spawned; the destination → client
/// direction runs on the calling task. `session` is released once both
/// directions have exited.
pub async fn splice<C, D>(client: C, destination: D, session: ConnectionGuard)
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    D: AsyncRead + AsyncWrite + Send + 'static,
{
    let (client_read, client_write) = tokio::io::split(client);
    let (destination_read, destination_write) = tokio::io::split(destination);

    let session = Arc::new(session);
    let teardown = Teardown::new();

    tracing::debug!(session_id = %session.id(), "Tunnel relaying");

    tokio::spawn(relay(
        Direction::ClientToDestination,
        client_read,
        destination_write,
        teardown.clone(),
        Arc::clone(&session),
    ));
    relay(
        Direction::DestinationToClient,
        destination_read,
        client_write,
        teardown,
        session,
    )
    .await;
}

/// Copy one direction of a session until EOF, error, or teardown.
///
/// Returns the number of bytes relayed.
pub async fn relay<R, W>(
    direction: Direction,
    mut reader: R,
    mut writer: W,
    mut teardown: Teardown,
    session: Arc<ConnectionGuard>,
) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut copied = 0u64;
    let outcome = tokio::select! {
        result = copy(&mut reader, &mut writer, &mut copied) => result,
        _ = teardown.closed() => Ok(()),
    };

    teardown.close();
    let _ = writer.shutdown().await;
    drop(reader);

    match outcome {
        Ok(()) => tracing::debug!(
            session_id = %session.id(),
            %direction,
            bytes = copied,
            "Relay finished"
        ),
        Err(e) => tracing::debug!(
            session_id = %session.id(),
            %direction,
            bytes = copied,
            error = %e,
            "Relay stream failed"
        ),
    }

    copied
}

async fn copy<R, W>(reader: &mut R, writer: &mut W, copied: &mut u64) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        writer.write_all(&buf[..n]).await?;
        *copied += n as u64;
    }
}
