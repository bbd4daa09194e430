/*!
    Write session options.
*/

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use ffmpeg_encode::{ColorOverrides, VideoProfile};
use ffmpeg_types::{CodecId, Error, PixelFormat, Result, Tags};

/**
    Options for a [`WriteSession`](crate::WriteSession).

    Anything not set falls back to the negotiated defaults.
*/
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    /// Requested audio codec (None = container default).
    pub audio_codec: Option<CodecId>,
    /// Video profile to write.
    pub profile: VideoProfile,
    /// Prefer a hardware video encoder.
    pub hardware: bool,
    /// Requested encoder pixel format (None = profile default).
    pub pixel_format: Option<PixelFormat>,
    /// Color metadata overrides.
    pub color: ColorOverrides,
    /// Frame rate override, only honored when no audio is written.
    pub speed: Option<f64>,
    /// File of `key: value` encoder options.
    pub preset_file: Option<PathBuf>,
    /// SMPTE start timecode.
    pub timecode: Option<String>,
    /// Container metadata.
    pub tags: Tags,
}

impl WriteOptions {
    /**
        Build options from a raw string map.

        Recognized keys are `AudioCodec`, `WriteProfile`, `HardwareEncode`,
        `PixelFormat`, `ColorRange`, `ColorSpace`, `ColorPrimaries`,
        `ColorTRC`, `Speed`, `PresetFile` and `timecode`. Every other key is
        kept as a container tag.
    */
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "AudioCodec" => options.audio_codec = Some(value.parse()?),
                "WriteProfile" => options.profile = value.parse()?,
                "HardwareEncode" => options.hardware = parse_bool(key, value)?,
                "PixelFormat" => options.pixel_format = Some(value.parse()?),
                "ColorRange" => options.color.range = Some(value.parse()?),
                "ColorSpace" => options.color.space = Some(value.parse()?),
                "ColorPrimaries" => options.color.primaries = Some(value.parse()?),
                "ColorTRC" => options.color.transfer = Some(value.parse()?),
                "Speed" => {
                    let speed = value.trim().parse::<f64>().map_err(|e| {
                        Error::config(format!("Speed '{value}' is not a number: {e}"))
                    })?;
                    options.speed = Some(speed);
                }
                "PresetFile" => options.preset_file = Some(PathBuf::from(value)),
                "timecode" => options.timecode = Some(value.clone()),
                _ => {
                    debug!(key = %key, "passing option through as tag");
                    options.tags.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(options)
    }

    pub fn with_audio_codec(mut self, codec: CodecId) -> Self {
        self.audio_codec = Some(codec);
        self
    }

    pub fn with_profile(mut self, profile: VideoProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_hardware(mut self, hardware: bool) -> Self {
        self.hardware = hardware;
        self
    }

    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = Some(format);
        self
    }

    pub fn with_color(mut self, color: ColorOverrides) -> Self {
        self.color = color;
        self
    }

    /**
        Override the frame rate. Ignored when the session also writes audio.
    */
    pub fn with_speed(mut self, fps: f64) -> Self {
        self.speed = Some(fps);
        self
    }

    pub fn with_preset_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.preset_file = Some(path.into());
        self
    }

    pub fn with_timecode(mut self, timecode: impl Into<String>) -> Self {
        self.timecode = Some(timecode.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /**
        Check option values that can be rejected without touching FFmpeg.
    */
    pub fn validate(&self) -> Result<()> {
        if let Some(speed) = self.speed
            && !(speed.is_finite() && speed > 0.0)
        {
            return Err(Error::config(format!("Speed must be positive, got {speed}")));
        }
        if let Some(codec) = self.audio_codec
            && !codec.is_audio()
        {
            return Err(Error::config(format!("{codec} is not an audio codec")));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::config(format!("{key} expects a boolean, got '{value}'"))),
    }
}
