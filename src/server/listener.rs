//! HTTP listener.
//!
//! Accepts connections and serves each one on its own task, handing every
//! request to the configured handler chain.

use crate::server::handler::{Handler, HttpResponse};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// HTTP/1.1 server bound to a TCP address.
pub struct HttpServer {
    listener: TcpListener,
    handler: Arc<dyn Handler>,
}

impl HttpServer {
    /// Bind the server socket.
    pub async fn bind(address: SocketAddr, handler: Arc<dyn Handler>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        info!(address = %listener.local_addr()?, "http listener bound");
        Ok(Self { listener, handler })
    }

    /// Address the server is actually listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until a shutdown signal arrives.
    #[instrument(skip_all)]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("http server starting");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => self.handle_connection(stream, addr),
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("http server shutting down");
                    break;
                }
            }
        }
    }

    fn handle_connection(&self, stream: TcpStream, client_addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY on client connection");
        }

        let handler = Arc::clone(&self.handler);

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let handler = Arc::clone(&handler);
                async move { serve_request(req, handler).await }
            });

            if let Err(e) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(io, service)
                .await
            {
                debug!(client = %client_addr, error = %e, "connection error");
            }
        });
    }
}

/// Hand the request head to the handler chain. The body is left unread;
/// hyper drains or drops it once the response is written.
async fn serve_request(
    req: Request<Incoming>,
    handler: Arc<dyn Handler>,
) -> Result<HttpResponse, Infallible> {
    Ok(handler.call(req.map(|_| ())).await)
}
