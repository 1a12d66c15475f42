#![warn(clippy::unwrap_used)]
use std::{path::PathBuf, str::FromStr};

use agririsk::{Config, RasterCompositor, Result};
use clap::Parser;
use env_logger::{Env, TimestampPrecision};
use layerserver::layerapihandler;

#[derive(Parser, Debug)]
#[clap(name = "layerserver", about = "Serves climate risk layers clipped to administrative boundaries")]
pub struct Opt {
    // set the listen addr
    #[clap(short = 'a', long = "addr")]
    pub addr: Option<String>,

    // set the listen port
    #[clap(short = 'p', long = "port", default_value = "4444")]
    pub port: u16,

    // root directory of the source rasters
    #[clap(long = "data-root-dir", env = "DATA_ROOT_DIR")]
    pub data_root_dir: PathBuf,

    // directory containing the boundary geojson files
    #[clap(long = "boundary-dir", env = "BOUNDARY_DIR")]
    pub boundary_dir: PathBuf,

    // json file with the country and state names
    #[clap(long = "region-catalog", env = "REGION_CATALOG")]
    pub region_catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let mut config = Config::new(opt.data_root_dir, opt.boundary_dir);
    if let Some(catalog) = opt.region_catalog {
        config = config.with_region_catalog(catalog);
    }

    let compositor = RasterCompositor::from_config(config)?;

    let ip_addr = match opt.addr {
        Some(addr) => std::net::IpAddr::from_str(addr.as_str())
            .map_err(|err| agririsk::Error::InvalidArgument(format!("Invalid ip address provided: {err}")))?,
        None => std::net::IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
    };

    let sock_addr = std::net::SocketAddr::from((ip_addr, opt.port));
    let listener = tokio::net::TcpListener::bind(&sock_addr).await?;
    log::info!("Listening on {sock_addr}");

    axum::serve(listener, layerapihandler::create_router(compositor)).await?;
    Ok(())
}
