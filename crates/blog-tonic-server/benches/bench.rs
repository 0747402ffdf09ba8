use core::{fmt, hint::black_box};
use blog_tonic_core::proto::{
    Blog, CreateBlogRequest, ReadBlogRequest, blog_service_client::BlogServiceClient,
};
use blog_tonic_server::server::{
    config::{ServerConfig, StoreKind},
    run_server_with_incoming,
    service::BlogHandler,
    store::MemoryBlogStore,
};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{sync::Arc, time::Instant};
use tokio::{net::TcpListener, runtime::Builder, task::JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{codec::CompressionEncoding, transport::Channel};

#[derive(Clone, Copy, Debug)]
enum Compression {
    None,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl From<Compression> for Option<CompressionEncoding> {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => None,
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct GrpcBenchParams {
    concurrency: usize,
    compression: Compression,
}

fn grpc_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    // In-process server on an ephemeral port, backed by the memory store so
    // the numbers reflect the gRPC and service layers only.
    let shutdown = CancellationToken::new();
    let (addr, server) = rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig {
            store: StoreKind::Memory,
            ..ServerConfig::default()
        };
        let handler = BlogHandler::new(Arc::new(MemoryBlogStore::new()), &config);
        let token = shutdown.clone();
        let server = tokio::spawn(async move {
            run_server_with_incoming(handler, &config, TcpListenerStream::new(listener), token)
                .await
        });
        (addr, server)
    });
    let uri = format!("http://{addr}");

    let concurrency_cases = [1, 8, 32];
    let compression_cases = [Compression::None, Compression::Zstd, Compression::Gzip];

    let mut cases = Vec::new();
    for &concurrency in &concurrency_cases {
        for &compression in &compression_cases {
            cases.push(GrpcBenchParams {
                concurrency,
                compression,
            });
        }
    }

    for params in &cases {
        let mut group = c.benchmark_group("grpc/create_then_read");
        group.throughput(Throughput::Elements(params.concurrency as u64));

        group.bench_function(
            format!(
                "conc/{}/comp/{}",
                params.concurrency, params.compression
            ),
            |b| {
                b.to_async(&rt).iter_custom(|iters| {
                    let uri = uri.clone();
                    async move {
                        let channel = Channel::from_shared(uri)
                            .expect("Invalid URI")
                            .connect()
                            .await
                            .expect("Failed to connect to server");

                        let start = Instant::now();

                        for _ in 0..iters {
                            run_create_then_read(&channel, params).await;
                        }

                        start.elapsed()
                    }
                });
            },
        );

        group.finish();
    }

    shutdown.cancel();
    if let Err(err) = rt.block_on(server) {
        eprintln!("server task failed: {err}");
    }
}

async fn run_create_then_read(channel: &Channel, params: &GrpcBenchParams) {
    let mut tasks = JoinSet::new();

    for _ in 0..params.concurrency {
        let channel = channel.clone();
        let compression = params.compression;

        tasks.spawn(async move {
            let mut client = BlogServiceClient::new(channel);
            if let Some(encoding) = compression.into() {
                client = client.accept_compressed(encoding).send_compressed(encoding)
            }

            let created = client
                .create_blog(CreateBlogRequest {
                    blog: Some(Blog {
                        id: String::new(),
                        author_id: "bench".to_string(),
                        title: "Benchmark".to_string(),
                        content: "x".repeat(512),
                    }),
                })
                .await
                .expect("create failed")
                .into_inner()
                .blog
                .expect("missing blog");

            let read = client
                .read_blog(ReadBlogRequest {
                    blog_id: created.id,
                })
                .await
                .expect("read failed")
                .into_inner();
            black_box(read);
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

criterion_group!(benches, grpc_bench);
criterion_main!(benches);
