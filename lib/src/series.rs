use std::str::FromStr;

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Reduction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Guess the encoding from the first non-blank byte of `buf`.
    pub fn detect(buf: &[u8]) -> Option<Format> {
        let first = buf.iter().find(|b| !b.is_ascii_whitespace())?;
        match first {
            b'{' | b'[' => Some(Format::Json),
            _ => Some(Format::Csv),
        }
    }
}

impl FromStr for Format {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => eyre::bail!("unknown format: {}", other),
        }
    }
}

// A SeriesCodec reads a sample sequence and writes a reduction back out.
#[async_trait]
pub trait SeriesCodec {
    async fn decode<R: AsyncRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<f64>>;
    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        reduction: &Reduction,
    ) -> Result<()>;
}

/// Samples from a JSON document: either a bare array of numbers or an
/// object holding the array under `field`.
pub struct JsonCodec {
    pub field: String,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            field: "pitches".to_string(),
        }
    }
}

#[async_trait]
impl SeriesCodec for JsonCodec {
    async fn decode<R: AsyncRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<f64>> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        if buf.iter().all(|b| b.is_ascii_whitespace()) {
            eyre::bail!("empty input");
        }

        let doc: Value = serde_json::from_slice(&buf)?;
        let items = match &doc {
            Value::Array(items) => items,
            Value::Object(record) => match record.get(&self.field) {
                Some(Value::Array(items)) => items,
                Some(_) => eyre::bail!("field {:?} is not an array", self.field),
                None => eyre::bail!("missing field {:?}", self.field),
            },
            _ => eyre::bail!("expected a JSON array or object"),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_f64()
                    .ok_or_else(|| eyre::eyre!("element {} is not a number: {}", i, v))
            })
            .collect()
    }

    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        reduction: &Reduction,
    ) -> Result<()> {
        writer.write_all(&serde_json::to_vec(reduction)?).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

/// One sample per row, first column. A non-numeric first row is a header.
pub struct CsvCodec;

#[async_trait]
impl SeriesCodec for CsvCodec {
    async fn decode<R: AsyncRead + Unpin + Send>(&self, reader: &mut R) -> Result<Vec<f64>> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(buf.as_slice());

        let mut samples = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let field = record.get(0).unwrap_or_default();
            match field.parse::<f64>() {
                Ok(v) => samples.push(v),
                Err(_) if row == 0 => continue,
                Err(_) if field.is_empty() => eyre::bail!("row {}: missing sample", row + 1),
                Err(e) => eyre::bail!("row {}: {:?}: {}", row + 1, field, e),
            }
        }

        if samples.is_empty() {
            eyre::bail!("no samples in CSV input");
        }
        Ok(samples)
    }

    async fn encode<W: AsyncWrite + Unpin + Send>(
        &self,
        writer: &mut W,
        reduction: &Reduction,
    ) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["index", "value"])?;
        for (i, v) in reduction.indices.iter().zip(&reduction.values) {
            wtr.write_record(&[i.to_string(), v.to_string()])?;
        }
        let buf = wtr.into_inner().map_err(|e| eyre::eyre!("{}", e))?;

        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Decode samples from `reader`, detecting the format from the first
/// buffered bytes when `format` is `None`. `field` names the JSON record field.
pub async fn decode_samples<R: AsyncBufRead + Unpin + Send>(
    reader: &mut R,
    format: Option<Format>,
    field: &str,
) -> Result<Vec<f64>> {
    let format = match format {
        Some(f) => f,
        None => {
            let buf = reader.fill_buf().await?;
            match Format::detect(buf) {
                Some(f) => f,
                None => eyre::bail!("empty input"),
            }
        }
    };

    match format {
        Format::Json => {
            JsonCodec {
                field: field.to_string(),
            }
            .decode(reader)
            .await
        }
        Format::Csv => CsvCodec.decode(reader).await,
    }
}
