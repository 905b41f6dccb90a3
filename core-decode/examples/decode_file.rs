//! Decode an MP3 file through the chunked pipeline and print a summary.
//!
//! ```text
//! cargo run -p core-decode --example decode_file -- path/to/track.mp3 [chunk_max_bytes]
//! ```

use core_decode::{ChunkedDecoder, DecodeConfig, FileSource, SourceProvider, SymphoniaChunkDecoder};
use core_mpeg::Section;
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: decode_file <file.mp3> [chunk_max_bytes]")?;

    let mut config = DecodeConfig::default();
    if let Some(budget) = args.next() {
        config = config.with_chunk_max_bytes(budget.parse()?);
    }

    let source = FileSource::new(&path);
    let bytes = source.fetch().await?;
    let decoder = ChunkedDecoder::with_config(Arc::new(SymphoniaChunkDecoder::new()), config)?;

    let plan = decoder.plan(&bytes)?;
    for section in &plan.sections {
        match section {
            Section::Id3v2(tag) => println!(
                "ID3v2.{} tag: {} bytes, {} frames",
                tag.major_version,
                tag.byte_length(),
                tag.frames.len()
            ),
            Section::Xing(xing) => println!("{} tag at {}", xing.identifier.as_str(), xing.offset),
            Section::Frame(frame) => println!(
                "First frame at {}: {} {}, {} Hz, {} kbps",
                frame.offset,
                frame.header.version,
                frame.header.layer,
                frame.header.sample_rate,
                frame.header.bitrate.kbps()
            ),
        }
    }
    println!("{} chunks, {} frames", plan.chunks.len(), plan.frame_count());

    let started = Instant::now();
    let decoded = decoder.decode(bytes).await?;

    println!(
        "Decoded {:.2}s of audio ({} channels, {} Hz, {} samples) in {:?}",
        decoded.duration().as_secs_f64(),
        decoded.channel_count(),
        decoded.sample_rate,
        decoded.length(),
        started.elapsed()
    );

    Ok(())
}
