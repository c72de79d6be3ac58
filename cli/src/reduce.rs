use clap::Args;
use eyre::Result;
use pitchline::{CsvCodec, JsonCodec, SeriesCodec};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::io;
use crate::search::SearchOpts;

#[derive(Args, Debug)]
pub struct Opts {
    #[command(flatten)]
    pub search: SearchOpts,

    /// Output encoding (json, csv)
    #[clap(long, default_value = "json")]
    pub to: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,
}

pub async fn reduce(opts: &Opts) -> Result<()> {
    let to_csv = match opts.to.as_str() {
        "json" => false,
        "csv" => true,
        other => eyre::bail!("unknown output encoding: {}", other),
    };

    let reducer = opts.search.reducer()?;
    let mut output = io::create(&opts.output).await?;

    for source in &opts.search.sources() {
        let samples = opts.search.load(source).await?;
        let reduction = opts.search.run(&reducer, &samples)?;
        info!(
            source = source.as_str(),
            samples = samples.len(),
            reduced = reduction.values.len(),
            epsilon = reduction.epsilon,
            status = %reduction.status,
            "reduced"
        );

        if to_csv {
            CsvCodec.encode(&mut output, &reduction).await?;
        } else {
            JsonCodec::default().encode(&mut output, &reduction).await?;
        }
    }

    output.flush().await?;
    Ok(())
}
