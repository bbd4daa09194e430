/*!
    Write session lifecycle.
*/

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use ffmpeg_encode::{
    AudioEncoder, AudioEncoderConfig, AudioStreamConfig, Encoder, VideoEncoder, VideoEncoderConfig,
    VideoStreamConfig, preset::load_preset,
};
use ffmpeg_sink::Sink;
use ffmpeg_types::{
    AudioBuffer, AudioInfo, ContainerFormat, Image, Rational, RationalTime, StreamType, Tags,
    TimeRange, VideoInfo,
};

use crate::audio::AudioStreamWriter;
use crate::error::{WriteError, WriteResult};
use crate::options::WriteOptions;
use crate::timecode::Timecode;
use crate::video::VideoStreamWriter;

/**
    The streams a session writes. At least one must be present.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WriteInfo {
    pub video: Option<VideoInfo>,
    pub audio: Option<AudioInfo>,
}

impl WriteInfo {
    pub fn video(info: VideoInfo) -> Self {
        Self {
            video: Some(info),
            audio: None,
        }
    }

    pub fn audio(info: AudioInfo) -> Self {
        Self {
            video: None,
            audio: Some(info),
        }
    }

    pub fn with_audio(mut self, info: AudioInfo) -> Self {
        self.audio = Some(info);
        self
    }
}

/**
    Where a session is in its lifecycle.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Configuring,
    Open,
    Flushing,
    Closed,
}

/**
    What a finished session wrote.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FinishReport {
    pub video_frames: u64,
    pub video_packets: u64,
    pub audio_samples: u64,
    pub audio_packets: u64,
}

/**
    Writes video frames and audio buffers into one container file.

    Construction opens the container, negotiates and opens the encoders
    and writes the header; if any of that fails the partial file is
    removed. [`WriteSession::finish`] flushes everything and writes the
    trailer. Dropping an unfinished session does the same, logging any
    error instead of returning it.

    After an encode error the session refuses further writes but is still
    finalized when finished or dropped.
*/
pub struct WriteSession {
    // Field order is release order: writers (encoders, converters) go
    // before the container.
    video: Option<VideoStreamWriter<VideoEncoder>>,
    audio: Option<AudioStreamWriter<AudioEncoder>>,
    sink: Option<Sink>,
    path: PathBuf,
    state: SessionState,
    failed: bool,
    video_config: Option<VideoStreamConfig>,
    audio_config: Option<AudioStreamConfig>,
}

impl WriteSession {
    /**
        Open a session writing to `path`.

        The container is picked from the path extension.
    */
    pub fn new(path: impl AsRef<Path>, info: WriteInfo, options: WriteOptions) -> WriteResult<Self> {
        let path = path.as_ref();
        let mut session = Self {
            video: None,
            audio: None,
            sink: None,
            path: path.to_path_buf(),
            state: SessionState::Unopened,
            failed: false,
            video_config: None,
            audio_config: None,
        };

        let config_error = |e: ffmpeg_types::Error| WriteError::configuration(path, e);

        options.validate().map_err(config_error)?;
        if info.video.is_none() && info.audio.is_none() {
            return Err(WriteError::configuration(
                path,
                "neither video nor audio was requested",
            ));
        }
        if let Some(video) = &info.video {
            video.validate().map_err(config_error)?;
        }
        if let Some(audio) = &info.audio {
            audio.validate().map_err(config_error)?;
        }
        if info.video.is_some()
            && let Some(container) = ContainerFormat::from_path(path)
            && container.is_audio_only()
        {
            return Err(WriteError::configuration(
                path,
                format!("{container} cannot carry video"),
            ));
        }

        let timecode = options.timecode.as_deref().and_then(|value| {
            value
                .parse::<Timecode>()
                .inspect_err(|e| warn!(error = %e, "skipping invalid timecode"))
                .ok()
        });

        let mut container_tags = options.tags.clone();
        if let Some(timecode) = timecode {
            container_tags.insert("timecode".to_string(), timecode.to_string());
        }

        session.state = SessionState::Configuring;
        let mut sink = Sink::create(path, &container_tags).map_err(config_error)?;

        match session.configure(&mut sink, &info, &options, timecode) {
            Ok(()) => {
                session.sink = Some(sink);
                session.state = SessionState::Open;
                info!(
                    path = %path.display(),
                    video = session.video_config.as_ref().map(|c| c.encoder.as_str()),
                    audio = session.audio_config.as_ref().map(|c| c.encoder.as_str()),
                    "write session open"
                );
                Ok(session)
            }
            Err(message) => {
                // Encoders go before the file does
                session.video = None;
                session.audio = None;
                session.state = SessionState::Closed;
                sink.discard();
                error!(path = %path.display(), %message, "write session failed to open");
                Err(WriteError::configuration(path, message))
            }
        }
    }

    fn configure(
        &mut self,
        sink: &mut Sink,
        info: &WriteInfo,
        options: &WriteOptions,
        timecode: Option<Timecode>,
    ) -> Result<(), String> {
        let global_header = sink.needs_global_header();

        if let Some(video) = info.video {
            let frame_rate = match options.speed {
                Some(speed) if info.audio.is_none() => {
                    let rate = Rational::from_f64(speed);
                    info!(fps = speed, frame_rate = %rate, "overriding frame rate");
                    rate
                }
                Some(speed) => {
                    warn!(fps = speed, "ignoring Speed, the session also writes audio");
                    video.frame_rate
                }
                None => video.frame_rate,
            };

            let preset = match &options.preset_file {
                Some(file) => load_preset(file)
                    .map_err(|e| format!("cannot read preset {}: {e}", file.display()))?,
                None => Vec::new(),
            };

            let mut config =
                VideoEncoderConfig::new(options.profile, video.width, video.height, frame_rate)
                    .with_start_time(video.start_time)
                    .with_color(options.color)
                    .with_options(preset)
                    .with_global_header(global_header);
            if let Some(format) = options.pixel_format {
                config = config.with_pixel_format(format);
            }
            if options.hardware {
                config = config.with_hw_accel();
            }

            let (encoder, resolved) = VideoEncoder::open(&config).map_err(|e| e.to_string())?;

            let mut stream_tags = Tags::new();
            if let Some(timecode) = timecode {
                stream_tags.insert("timecode".to_string(), timecode.to_string());
            }
            sink.add_stream(
                StreamType::Video,
                encoder.parameters(),
                encoder.time_base(),
                &stream_tags,
            )
            .map_err(|e| e.to_string())?;

            let writer = VideoStreamWriter::new(encoder, &resolved, &video)
                .map_err(|e| e.to_string())?;
            self.video = Some(writer);
            self.video_config = Some(resolved);
        }

        if let Some(audio) = info.audio {
            let mut config = AudioEncoderConfig::new(audio).with_global_header(global_header);
            if let Some(container) = sink.container() {
                config = config.with_container(container.clone());
            }
            if let Some(codec) = options.audio_codec {
                config = config.with_codec(codec);
            }

            let (encoder, resolved) = AudioEncoder::open(&config).map_err(|e| e.to_string())?;
            sink.add_stream(
                StreamType::Audio,
                encoder.parameters(),
                encoder.time_base(),
                &Tags::new(),
            )
            .map_err(|e| e.to_string())?;

            let writer =
                AudioStreamWriter::new(encoder, audio, &resolved).map_err(|e| e.to_string())?;
            self.audio = Some(writer);
            self.audio_config = Some(resolved);
        }

        sink.write_header().map_err(|e| e.to_string())
    }

    fn ensure_usable(&self) -> WriteResult<()> {
        if self.failed || self.state != SessionState::Open {
            return Err(WriteError::Unusable {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn encode_failed(&mut self, stream: StreamType, source: ffmpeg_types::Error) -> WriteError {
        error!(path = %self.path.display(), %stream, error = %source, "encoding failed");
        self.failed = true;
        WriteError::Encode {
            stream,
            path: self.path.clone(),
            source,
        }
    }

    /**
        Encode one image presented at `time`.
    */
    pub fn write_video(&mut self, time: RationalTime, image: &Image) -> WriteResult<()> {
        self.ensure_usable()?;
        let (Some(writer), Some(sink)) = (self.video.as_mut(), self.sink.as_mut()) else {
            return Err(WriteError::NoStream {
                stream: StreamType::Video,
            });
        };
        writer.check(image).map_err(|source| WriteError::InvalidInput {
            stream: StreamType::Video,
            source,
        })?;
        match writer.write(time, image, sink) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.encode_failed(StreamType::Video, e)),
        }
    }

    /**
        Queue one audio buffer covering `range` and encode every full
        frame it completes.
    */
    pub fn write_audio(&mut self, range: TimeRange, buffer: &AudioBuffer) -> WriteResult<()> {
        self.ensure_usable()?;
        let (Some(writer), Some(sink)) = (self.audio.as_mut(), self.sink.as_mut()) else {
            return Err(WriteError::NoStream {
                stream: StreamType::Audio,
            });
        };
        writer.check(buffer).map_err(|source| WriteError::InvalidInput {
            stream: StreamType::Audio,
            source,
        })?;
        match writer.write(range, buffer, sink) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.encode_failed(StreamType::Audio, e)),
        }
    }

    /**
        Flush buffered audio and both encoders, write the trailer and
        close the file.

        Returns the first error hit along the way; every step is still
        attempted.
    */
    pub fn finish(mut self) -> WriteResult<FinishReport> {
        self.close()
    }

    fn close(&mut self) -> WriteResult<FinishReport> {
        let mut report = FinishReport::default();
        if self.state != SessionState::Open {
            // Never opened, nothing to flush
            self.state = SessionState::Closed;
            return Ok(report);
        }
        self.state = SessionState::Flushing;
        let mut first_error = None;

        if let Some(sink) = self.sink.as_mut() {
            if let Some(video) = self.video.as_mut() {
                if let Err(e) = video.finish(sink) {
                    first_error.get_or_insert(WriteError::Encode {
                        stream: StreamType::Video,
                        path: self.path.clone(),
                        source: e,
                    });
                }
                report.video_frames = video.frames_written();
                report.video_packets = video.packets_written();
            }
            if let Some(audio) = self.audio.as_mut() {
                if let Err(e) = audio.finish(sink) {
                    first_error.get_or_insert(WriteError::Encode {
                        stream: StreamType::Audio,
                        path: self.path.clone(),
                        source: e,
                    });
                }
                report.audio_samples = audio.samples_encoded();
                report.audio_packets = audio.packets_written();
            }
        }

        // Converters and encoders, then the container
        self.video = None;
        self.audio = None;
        if let Some(sink) = self.sink.take()
            && let Err(e) = sink.finish()
        {
            first_error.get_or_insert(WriteError::Finalize {
                path: self.path.clone(),
                source: e,
            });
        }
        self.state = SessionState::Closed;

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(
                    path = %self.path.display(),
                    video_frames = report.video_frames,
                    audio_samples = report.audio_samples,
                    "write session finished"
                );
                Ok(report)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /**
        Negotiated video settings, if the session writes video.
    */
    pub fn video_config(&self) -> Option<&VideoStreamConfig> {
        self.video_config.as_ref()
    }

    /**
        Negotiated audio settings, if the session writes audio.
    */
    pub fn audio_config(&self) -> Option<&AudioStreamConfig> {
        self.audio_config.as_ref()
    }
}

impl Drop for WriteSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(path = %self.path.display(), error = %e, "failed to finalize on drop");
        }
    }
}

impl std::fmt::Debug for WriteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSession")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("failed", &self.failed)
            .field("video", &self.video_config)
            .field("audio", &self.audio_config)
            .finish_non_exhaustive()
    }
}
