use anyhow::Result;
use datanorm::{load_data_files, summarise_data};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let (data_sets, data_columns) = load_data_files(None, None, None)?;
    info!("loaded {} data sets", data_sets.len());
    summarise_data(&data_sets, &data_columns);

    Ok(())
}
