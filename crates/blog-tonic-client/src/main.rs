use anyhow::{Context, bail};
use blog_tonic_core::proto::{
    Blog, CreateBlogRequest, DeleteBlogRequest, ReadBlogRequest, UpdateBlogRequest,
    blog_service_client::BlogServiceClient,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tonic::{Code, Request, codec::CompressionEncoding, transport::Channel};

#[derive(Parser, Debug)]
#[command(name = "blog-client", version, about = "Talk to a blog gRPC service")]
struct Cli {
    /// Server URI.
    ///
    /// Environment variable: `BLOG_SERVER_ADDR`
    #[arg(long, env = "BLOG_SERVER_ADDR", default_value_t = String::from("http://127.0.0.1:50051"))]
    server_addr: String,

    /// Deadline sent with every call, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,

    /// Compress requests and ask for compressed responses.
    #[arg(long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Compression {
    None,
    Zstd,
    Gzip,
    Deflate,
}

impl From<Compression> for Option<CompressionEncoding> {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => None,
            Compression::Zstd => Some(CompressionEncoding::Zstd),
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Deflate => Some(CompressionEncoding::Deflate),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a blog and print it with its new id.
    Create(BlogArgs),
    /// Print the blog with the given id.
    Read { blog_id: String },
    /// Replace every field of an existing blog.
    Update {
        blog_id: String,
        #[command(flatten)]
        blog: BlogArgs,
    },
    /// Delete the blog with the given id.
    Delete { blog_id: String },
    /// Walk a blog through create, read, update and delete.
    Demo,
}

#[derive(Args, Debug)]
struct BlogArgs {
    #[arg(long)]
    author_id: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
}

impl BlogArgs {
    fn into_blog(self, id: String) -> Blog {
        Blog {
            id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
        }
    }
}

struct Client {
    inner: BlogServiceClient<Channel>,
    timeout: Duration,
}

impl Client {
    async fn connect(cli: &Cli) -> anyhow::Result<Self> {
        let channel = Channel::from_shared(cli.server_addr.clone())
            .with_context(|| format!("invalid server address {}", cli.server_addr))?
            .connect()
            .await
            .with_context(|| format!("failed to connect to {}", cli.server_addr))?;

        let mut inner = BlogServiceClient::new(channel);
        if let Some(encoding) = cli.compression.into() {
            inner = inner.send_compressed(encoding).accept_compressed(encoding);
        }

        Ok(Self {
            inner,
            timeout: Duration::from_millis(cli.timeout_ms),
        })
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut req = Request::new(message);
        req.set_timeout(self.timeout);
        req
    }

    async fn create(&mut self, blog: Blog) -> Result<Blog, tonic::Status> {
        let req = self.request(CreateBlogRequest { blog: Some(blog) });
        let res = self.inner.create_blog(req).await?;
        Ok(res.into_inner().blog.unwrap_or_default())
    }

    async fn read(&mut self, blog_id: &str) -> Result<Blog, tonic::Status> {
        let req = self.request(ReadBlogRequest {
            blog_id: blog_id.to_string(),
        });
        let res = self.inner.read_blog(req).await?;
        Ok(res.into_inner().blog.unwrap_or_default())
    }

    async fn update(&mut self, blog: Blog) -> Result<Blog, tonic::Status> {
        let req = self.request(UpdateBlogRequest { blog: Some(blog) });
        let res = self.inner.update_blog(req).await?;
        Ok(res.into_inner().blog.unwrap_or_default())
    }

    async fn delete(&mut self, blog_id: &str) -> Result<String, tonic::Status> {
        let req = self.request(DeleteBlogRequest {
            blog_id: blog_id.to_string(),
        });
        let res = self.inner.delete_blog(req).await?;
        Ok(res.into_inner().blog_id)
    }
}

fn print_blog(label: &str, blog: &Blog) {
    println!("{label}:");
    println!("  id:        {}", blog.id);
    println!("  author_id: {}", blog.author_id);
    println!("  title:     {}", blog.title);
    println!("  content:   {}", blog.content);
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let mut client = Client::connect(&cli).await?;

    match cli.command {
        Command::Create(args) => {
            let blog = client.create(args.into_blog(String::new())).await?;
            print_blog("Created blog", &blog);
        }
        Command::Read { blog_id } => {
            let blog = client.read(&blog_id).await?;
            print_blog("Blog", &blog);
        }
        Command::Update { blog_id, blog } => {
            let blog = client.update(blog.into_blog(blog_id)).await?;
            print_blog("Updated blog", &blog);
        }
        Command::Delete { blog_id } => {
            let blog_id = client.delete(&blog_id).await?;
            println!("Deleted blog {blog_id}");
        }
        Command::Demo => run_demo(&mut client).await?,
    }

    Ok(())
}

async fn run_demo(client: &mut Client) -> anyhow::Result<()> {
    let created = client
        .create(Blog {
            id: String::new(),
            author_id: "Apurv".to_string(),
            title: "My First Blog".to_string(),
            content: "My first blog contents".to_string(),
        })
        .await
        .context("create failed")?;
    print_blog("Created blog", &created);

    match client.read("sdnflsdnfkl").await {
        Err(status) if status.code() == Code::InvalidArgument => {
            println!("Malformed id rejected: {}", status.message());
        }
        Err(status) => bail!("unexpected error for malformed id: {status}"),
        Ok(blog) => bail!("malformed id returned a blog: {blog:?}"),
    }

    let read = client.read(&created.id).await.context("read failed")?;
    print_blog("Read blog", &read);

    let updated = client
        .update(Blog {
            id: created.id.clone(),
            author_id: "Apurv Sawant".to_string(),
            title: "My Second Blog".to_string(),
            content: "My second Blog content".to_string(),
        })
        .await
        .context("update failed")?;
    print_blog("Updated blog", &updated);

    let deleted = client.delete(&created.id).await.context("delete failed")?;
    println!("Deleted blog {deleted}");

    match client.read(&created.id).await {
        Err(status) if status.code() == Code::NotFound => {
            println!("Blog {deleted} is gone");
            Ok(())
        }
        Err(status) => bail!("unexpected error reading deleted blog: {status}"),
        Ok(blog) => bail!("deleted blog is still readable: {blog:?}"),
    }
}
