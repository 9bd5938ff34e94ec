use bluecarbon::Variant;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Blue Carbon NDVI/EVI API server
///
/// Earth Engine credentials are read from EE_SERVICE_ACCOUNT_KEY, or from
/// EE_ACCESS_TOKEN together with EE_PROJECT.
#[derive(Debug, Parser)]
#[command(name = "bluecarbon-server", version, about, long_about = None)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Request shape: `bbox` (min/max lon/lat, MOD13Q1 only) or `polygon` (coords, all datasets)
    #[arg(long, env = "BLUECARBON_VARIANT", default_value_t = Variant::Polygon)]
    pub variant: Variant,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
