use std::collections::HashMap;
use std::f64::consts::TAU;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};

use ffmpeg_types::{
    AudioBuffer, AudioInfo, Image, ImageInfo, PixelFormat, Rational, RationalTime, SampleFormat,
    TimeRange, VideoInfo,
};
use mediawrite::{WriteInfo, WriteOptions, WriteSession};

/**
    Render a moving test pattern and a sine tone into a media file.
*/
#[derive(Parser)]
#[command(name = "mediawrite")]
struct Cli {
    /// Output file. The container is picked from the extension.
    output: PathBuf,

    /// Frame width.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Frame height.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frame rate, e.g. 24 or 29.97.
    #[arg(long, default_value_t = 24.0)]
    fps: f64,

    /// Length in seconds.
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Write no video stream.
    #[arg(long)]
    no_video: bool,

    /// Write no audio stream.
    #[arg(long)]
    no_audio: bool,

    /// Audio sample rate.
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Audio channel count.
    #[arg(long, default_value_t = 2)]
    channels: u16,

    /// Tone frequency in Hz.
    #[arg(long, default_value_t = 440.0)]
    tone: f64,

    /// Writer option as key=value (WriteProfile=ProResHQ, AudioCodec=aac,
    /// PixelFormat=yuv422p10le, timecode=01:00:00:00, ...). Can be repeated.
    #[arg(short = 'o', long = "option", value_parser = parse_key_value)]
    options: Vec<(String, String)>,

    /// Print the finish report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{s}'"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_tracing()?;

    if cli.no_video && cli.no_audio {
        bail!("nothing to write with both --no-video and --no-audio");
    }

    let frame_rate = Rational::from_f64(cli.fps);
    let fps = frame_rate.to_f64();

    let mut info = WriteInfo::default();
    if !cli.no_video {
        info.video = Some(VideoInfo::new(
            cli.width,
            cli.height,
            PixelFormat::Rgba,
            frame_rate,
        ));
    }
    if !cli.no_audio {
        info.audio = Some(AudioInfo::new(
            cli.channels,
            SampleFormat::F32,
            cli.sample_rate,
        ));
    }

    let map: HashMap<String, String> = cli.options.iter().cloned().collect();
    let options = WriteOptions::from_map(&map).context("invalid writer options")?;

    let mut session = WriteSession::new(&cli.output, info, options)
        .with_context(|| format!("failed to open {}", cli.output.display()))?;

    let frames = (cli.duration * fps).round() as u64;
    let mut samples_written = 0u64;
    for index in 0..frames {
        if !cli.no_video {
            let image = test_pattern(cli.width, cli.height, index)?;
            session.write_video(RationalTime::new(index as f64, fps), &image)?;
        }
        if !cli.no_audio {
            // Audio up to the end of this frame
            let end = ((index + 1) as f64 * cli.sample_rate as f64 / fps).round() as u64;
            let count = (end - samples_written) as usize;
            let buffer = sine(cli.tone, cli.channels, cli.sample_rate, samples_written, count)?;
            let rate = cli.sample_rate as f64;
            let range = TimeRange::new(
                RationalTime::new(samples_written as f64, rate),
                RationalTime::new(count as f64, rate),
            );
            session.write_audio(range, &buffer)?;
            samples_written = end;
        }
    }

    let report = session.finish()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            path = %cli.output.display(),
            video_frames = report.video_frames,
            audio_samples = report.audio_samples,
            "done"
        );
    }
    Ok(())
}

fn configure_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| anyhow!(err.to_string()))
}

/**
    Color bars scrolling one column per frame, with a white bar sweeping
    down the frame.
*/
fn test_pattern(width: u32, height: u32, index: u64) -> Result<Image> {
    const BARS: [[u8; 3]; 7] = [
        [192, 192, 192],
        [192, 192, 0],
        [0, 192, 192],
        [0, 192, 0],
        [192, 0, 192],
        [192, 0, 0],
        [0, 0, 192],
    ];

    let (w, h) = (width as usize, height as usize);
    let sweep = (index as usize * 4) % h.max(1);
    let mut data = Vec::with_capacity(w * h * 4);
    for y in 0..h {
        for x in 0..w {
            let rgb = if y.abs_diff(sweep) < 4 {
                [255, 255, 255]
            } else {
                let column = (x + index as usize) % w;
                BARS[column * BARS.len() / w]
            };
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
    }
    Ok(Image::new(ImageInfo::new(width, height, PixelFormat::Rgba), data)?)
}

fn sine(frequency: f64, channels: u16, rate: u32, first: u64, count: usize) -> Result<AudioBuffer> {
    let mut samples = Vec::with_capacity(count * channels as usize);
    for n in 0..count as u64 {
        let t = (first + n) as f64 / rate as f64;
        let value = (0.25 * (TAU * frequency * t).sin()) as f32;
        samples.extend(std::iter::repeat_n(value, channels as usize));
    }
    Ok(AudioBuffer::from_f32(channels, rate, &samples)?)
}
