//! Blog gRPC server: configuration, storage, request handling, and the
//! transport stack that ties them together.
//!
//! ## Structure
//!
//! - [`config`] - CLI/environment configuration.
//! - [`store`] - The [`BlogStore`](store::BlogStore) adapter and its MongoDB
//!   and in-memory implementations.
//! - [`service`] - The `BlogService` implementation.
//! - [`telemetry`] - Logging, tracing and metrics setup.

pub mod config;
pub mod service;
pub mod store;
pub mod telemetry;

use blog_tonic_core::proto::{FILE_DESCRIPTOR_SET, blog_service_server::BlogServiceServer};
use config::ServerConfig;
use futures::Stream;
use service::BlogHandler;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Serves the blog service, health and reflection on `incoming` until
/// `shutdown` is cancelled.
///
/// The health status of `blog.BlogService` flips to `NOT_SERVING` as soon as
/// shutdown begins; in-flight requests are allowed to finish.
pub async fn run_server_with_incoming<I, IO, IE>(
    handler: BlogHandler,
    config: &ServerConfig,
    incoming: I,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<BlogServiceServer<BlogHandler>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .timeout(config.request_timeout)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_blog_service(handler))
        .serve_with_incoming_shutdown(incoming, async move {
            shutdown.cancelled().await;
            health_reporter
                .set_not_serving::<BlogServiceServer<BlogHandler>>()
                .await;
        })
        .await?;

    Ok(())
}

/// Wraps `handler` in the generated server with every supported compression.
pub fn build_blog_service(handler: BlogHandler) -> BlogServiceServer<BlogHandler> {
    BlogServiceServer::new(handler)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}
