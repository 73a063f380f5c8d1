//! TCP accept loop for the line protocol.

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::session::Session;
use crate::state::AppState;

/// Accept connections forever, one spawned session per client.
///
/// Accept errors are logged and skipped; only the caller decides when to
/// stop (by dropping or aborting this future).
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Line protocol listening on {}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                info!("Connection from {}", addr);
                let state = state.clone();

                tokio::spawn(async move {
                    let (reader, writer) = socket.into_split();
                    match Session::new(reader, writer, state).run().await {
                        Ok(()) => debug!("Session completed for {}", addr),
                        Err(e) => warn!("Session error for {}: {:#}", addr, e),
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
