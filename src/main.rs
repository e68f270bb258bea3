use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rootwalk::resolver::{Resolver, ResolverConfig, DEFAULT_ROOT_SERVER, DNS_PORT};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rootwalk")]
#[command(about = "Resolve a name to an IPv4 address by walking referrals from a root server")]
struct Cli {
    /// Domain name to resolve
    #[arg(default_value = "google.com")]
    name: String,

    /// Root server to start from
    #[arg(long, default_value_t = DEFAULT_ROOT_SERVER)]
    root: Ipv4Addr,

    #[arg(long, default_value_t = DNS_PORT)]
    port: u16,

    /// Per-query timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Extra attempts per server after a timeout or malformed response
    #[arg(long, default_value_t = 2)]
    retries: usize,

    #[arg(long, default_value_t = 32)]
    max_referrals: usize,

    #[arg(long, default_value_t = 8)]
    max_depth: usize,
}

impl From<Cli> for ResolverConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root_server: cli.root,
            port: cli.port,
            timeout: Duration::from_millis(cli.timeout_ms),
            max_retries: cli.retries,
            max_referrals: cli.max_referrals,
            max_depth: cli.max_depth,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let name = cli.name.clone();
    let resolver = Resolver::with_config(cli.into());

    match resolver.resolve_ipv4(&name) {
        Ok(addr) => {
            println!("Resolved IP for {name} is {addr}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
