use std::path::PathBuf;

use agririsk::{AdminLevel, BoundarySelector, Config, RasterCompositor};
use clap::Parser;
use env_logger::{Env, TimestampPrecision};

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    Colorized,
    Raw,
}

#[derive(Parser, Debug)]
#[clap(name = "clipraster", about = "Clip a climate risk raster to an administrative boundary")]
pub struct Opt {
    #[arg(long = "data-root-dir", env = "DATA_ROOT_DIR")]
    pub data_root_dir: PathBuf,

    #[arg(long = "boundary-dir", env = "BOUNDARY_DIR")]
    pub boundary_dir: PathBuf,

    #[arg(long = "region-catalog", env = "REGION_CATALOG")]
    pub region_catalog: Option<PathBuf>,

    #[arg(long = "admin-level", value_name = "total|country|state", default_value = "total")]
    pub admin_level: AdminLevel,

    #[arg(long = "admin-level-id")]
    pub admin_level_id: Option<u32>,

    /// Source raster, relative to the data root directory
    #[arg(long = "input", short = 'i')]
    pub input: String,

    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    #[arg(long = "variant", value_name = "colorized|raw", default_value = "colorized")]
    pub variant: Variant,

    /// Hex colors of the ramp, the first color is used for value 1
    #[arg(long = "color", short = 'c', value_delimiter = ',')]
    pub colors: Vec<String>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let mut config = Config::new(opt.data_root_dir, opt.boundary_dir);
    if let Some(catalog) = opt.region_catalog {
        config = config.with_region_catalog(catalog);
    }

    let compositor = RasterCompositor::from_config(config)?;
    let selector = BoundarySelector::from_admin_level(opt.admin_level, opt.admin_level_id)?;

    let tiff = match opt.variant {
        Variant::Colorized => {
            if opt.colors.is_empty() {
                anyhow::bail!("A color ramp is required for the colorized variant");
            }
            compositor.render_colorized(selector, &opt.input, &opt.colors)?
        }
        Variant::Raw => compositor.render_raw(selector, &opt.input)?,
    };

    let tiff = tiff.into_inner();
    std::fs::write(&opt.output, &tiff)?;
    log::info!("Wrote {} {} ({} bytes)", opt.variant, opt.output.display(), tiff.len());
    Ok(())
}
