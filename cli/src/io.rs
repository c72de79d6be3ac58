use eyre::{Result, WrapErr};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};

pub type Reader = Box<dyn AsyncBufRead + Unpin + Send>;
pub type Writer = Box<dyn AsyncWrite + Unpin + Send>;

/// Opens `name` for buffered reading; `stdin` and `-` read standard input.
pub async fn open(name: &str) -> Result<Reader> {
    if matches!(name, "stdin" | "-") {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let f = File::open(name)
        .await
        .wrap_err_with(|| format!("opening {name}"))?;
    Ok(Box::new(BufReader::new(f)))
}

/// Creates `name` for buffered writing; `stdout` and `-` write standard output.
pub async fn create(name: &str) -> Result<Writer> {
    if matches!(name, "stdout" | "-") {
        return Ok(Box::new(BufWriter::new(tokio::io::stdout())));
    }
    let f = File::create(name)
        .await
        .wrap_err_with(|| format!("creating {name}"))?;
    Ok(Box::new(BufWriter::new(f)))
}
