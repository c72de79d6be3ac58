use clap::Args;
use eyre::Result;
use pitchline::Summary;
use tokio::io::AsyncWriteExt;

use crate::io;
use crate::search::SearchOpts;

#[derive(Args, Debug)]
pub struct Opts {
    #[command(flatten)]
    pub search: SearchOpts,

    /// Report type (text, json)
    #[clap(long, name = "type", default_value = "text")]
    pub report_type: String,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,
}

pub async fn report(opts: &Opts) -> Result<()> {
    let reducer = opts.search.reducer()?;
    let sources = opts.search.sources();
    let mut output = io::create(&opts.output).await?;

    for source in &sources {
        let samples = opts.search.load(source).await?;
        let reduction = opts.search.run(&reducer, &samples)?;
        let summary = Summary::new(&samples, &reduction);

        let mut buf = Vec::new();
        match opts.report_type.as_str() {
            "text" => {
                if sources.len() > 1 {
                    buf.extend_from_slice(format!("{}\n", source).as_bytes());
                }
                pitchline::report_text(&summary, &mut buf)?
            }
            "json" => pitchline::report_json(&summary, &mut buf)?,
            other => eyre::bail!("unknown report type: {}", other),
        }
        output.write_all(&buf).await?;
    }

    output.flush().await?;
    Ok(())
}
