/*!
    Requested encoder configuration.

    These types describe what the caller asks for. The negotiated result,
    with every fallback applied, is described by
    [`VideoStreamConfig`](crate::VideoStreamConfig) and
    [`AudioStreamConfig`](crate::AudioStreamConfig).
*/

use std::fmt;
use std::str::FromStr;

use ffmpeg_types::{
    AudioInfo, CodecId, ColorPrimaries, ColorRange, ColorSpace, ColorTransfer, ContainerFormat,
    Error, PixelFormat, Rational, RationalTime,
};

/**
    Named video write profile: a codec family plus variant.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VideoProfile {
    #[default]
    H264,
    /// ProRes 422
    ProRes,
    ProResProxy,
    ProResLt,
    ProResHq,
    ProRes4444,
    /// ProRes 4444 XQ
    ProResXq,
    Dnxhd,
    DnxhrLb,
    DnxhrSq,
    DnxhrHq,
    DnxhrHqx,
    Dnxhr444,
    Vp9,
    Av1,
    Hap,
    Cineform,
}

impl VideoProfile {
    pub const ALL: [VideoProfile; 17] = [
        Self::H264,
        Self::ProRes,
        Self::ProResProxy,
        Self::ProResLt,
        Self::ProResHq,
        Self::ProRes4444,
        Self::ProResXq,
        Self::Dnxhd,
        Self::DnxhrLb,
        Self::DnxhrSq,
        Self::DnxhrHq,
        Self::DnxhrHqx,
        Self::Dnxhr444,
        Self::Vp9,
        Self::Av1,
        Self::Hap,
        Self::Cineform,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::ProRes => "prores",
            Self::ProResProxy => "prores_proxy",
            Self::ProResLt => "prores_lt",
            Self::ProResHq => "prores_hq",
            Self::ProRes4444 => "prores_4444",
            Self::ProResXq => "prores_xq",
            Self::Dnxhd => "dnxhd",
            Self::DnxhrLb => "dnxhr_lb",
            Self::DnxhrSq => "dnxhr_sq",
            Self::DnxhrHq => "dnxhr_hq",
            Self::DnxhrHqx => "dnxhr_hqx",
            Self::Dnxhr444 => "dnxhr_444",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Hap => "hap",
            Self::Cineform => "cineform",
        }
    }

    /**
        Codec written by this profile.
    */
    pub const fn codec(self) -> CodecId {
        match self {
            Self::H264 => CodecId::H264,
            Self::ProRes
            | Self::ProResProxy
            | Self::ProResLt
            | Self::ProResHq
            | Self::ProRes4444
            | Self::ProResXq => CodecId::ProRes,
            Self::Dnxhd
            | Self::DnxhrLb
            | Self::DnxhrSq
            | Self::DnxhrHq
            | Self::DnxhrHqx
            | Self::Dnxhr444 => CodecId::DnxHd,
            Self::Vp9 => CodecId::Vp9,
            Self::Av1 => CodecId::Av1,
            Self::Hap => CodecId::Hap,
            Self::Cineform => CodecId::Cineform,
        }
    }

    pub const fn is_prores(self) -> bool {
        matches!(self.codec(), CodecId::ProRes)
    }

    /**
        Pixel format used when the caller does not request one.
    */
    pub const fn default_pixel_format(self) -> PixelFormat {
        match self {
            Self::H264 | Self::Vp9 | Self::Av1 => PixelFormat::Yuv420p,
            Self::ProRes | Self::ProResProxy | Self::ProResLt | Self::ProResHq => {
                PixelFormat::Yuv422p10le
            }
            Self::ProRes4444 | Self::ProResXq => PixelFormat::Yuva444p10le,
            Self::Dnxhd | Self::DnxhrLb | Self::DnxhrSq | Self::DnxhrHq => PixelFormat::Yuv422p,
            Self::DnxhrHqx => PixelFormat::Yuv422p10le,
            Self::Dnxhr444 => PixelFormat::Yuv444p10le,
            Self::Hap => PixelFormat::Rgba,
            Self::Cineform => PixelFormat::Yuv422p10le,
        }
    }
}

impl fmt::Display for VideoProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VideoProfile {
    type Err = Error;

    /**
        Accepts the profile names (`prores_hq`) and the display forms
        callers tend to use (`ProRes/HQ`, `DNxHR HQX`, `ProRes 422`).
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if matches!(c, ' ' | '/' | '-') { '_' } else { c })
            .collect();
        let aliased = match normalized.as_str() {
            "avc" | "x264" => "h264",
            "prores_422" | "prores_standard" => "prores",
            "prores_4444_xq" | "prores_4444xq" => "prores_xq",
            "dnxhr_lb" | "dnxhd_lb" => "dnxhr_lb",
            "cfhd" => "cineform",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == aliased)
            .ok_or_else(|| Error::config(format!("unknown write profile '{s}'")))
    }
}

/**
    Hardware encoder backend.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HwEncoder {
    /// VideoToolbox (macOS).
    VideoToolbox,
    /// NVIDIA NVENC.
    Nvenc,
    /// Intel Quick Sync Video.
    Qsv,
    /// VA-API (Linux).
    Vaapi,
    /// AMD AMF (Windows).
    Amf,
}

/**
    Operating system family, used to pick hardware encoder names.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /**
        The platform this binary was built for. Anything that is neither
        macOS nor Windows is treated as Linux.
    */
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }
}

/**
    Explicit color settings. Anything left as None uses the profile default.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorOverrides {
    pub range: Option<ColorRange>,
    pub primaries: Option<ColorPrimaries>,
    pub transfer: Option<ColorTransfer>,
    pub space: Option<ColorSpace>,
}

/**
    Configuration for video encoding.
*/
#[derive(Clone, Debug)]
pub struct VideoEncoderConfig {
    /// Profile to write.
    pub profile: VideoProfile,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate.
    pub frame_rate: Rational,
    /// Time of the first frame; frame times are relative to it.
    pub start_time: RationalTime,
    /// Requested encoder pixel format (None = profile default).
    pub pixel_format: Option<PixelFormat>,
    /// Prefer hardware encoding if available.
    pub hardware: bool,
    /// Platform used to pick hardware encoder names.
    pub platform: Platform,
    /// Color overrides.
    pub color: ColorOverrides,
    /// Extra encoder options, applied after the profile hints.
    pub options: Vec<(String, String)>,
    /// Emit codec headers out of band (set when the container asks for it).
    pub global_header: bool,
}

impl VideoEncoderConfig {
    /**
        Create a new video encoder configuration.
    */
    pub fn new(profile: VideoProfile, width: u32, height: u32, frame_rate: Rational) -> Self {
        Self {
            profile,
            width,
            height,
            frame_rate,
            start_time: RationalTime::zero(frame_rate.to_f64()),
            pixel_format: None,
            hardware: false,
            platform: Platform::current(),
            color: ColorOverrides::default(),
            options: Vec::new(),
            global_header: false,
        }
    }

    pub fn with_start_time(mut self, start_time: RationalTime) -> Self {
        self.start_time = start_time;
        self
    }

    /**
        Request an encoder pixel format.
    */
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = Some(format);
        self
    }

    /**
        Enable hardware encoding with auto-detection.
    */
    pub fn with_hw_accel(mut self) -> Self {
        self.hardware = true;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_color(mut self, color: ColorOverrides) -> Self {
        self.color = color;
        self
    }

    /**
        Add encoder options, e.g. the lines of a preset file.
    */
    pub fn with_options(mut self, options: impl IntoIterator<Item = (String, String)>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn with_global_header(mut self, global_header: bool) -> Self {
        self.global_header = global_header;
        self
    }
}

/**
    Configuration for audio encoding.
*/
#[derive(Clone, Debug)]
pub struct AudioEncoderConfig {
    /// Requested codec (None = container default).
    pub codec: Option<CodecId>,
    /// Target container, which may restrict the codec.
    pub container: Option<ContainerFormat>,
    /// Description of the audio the caller will supply.
    pub input: AudioInfo,
    /// Target bitrate in bits per second (None = codec default).
    pub bitrate: Option<u64>,
    /// Extra encoder options.
    pub options: Vec<(String, String)>,
    /// Emit codec headers out of band (set when the container asks for it).
    pub global_header: bool,
}

impl AudioEncoderConfig {
    /**
        Create a new audio encoder configuration.
    */
    pub fn new(input: AudioInfo) -> Self {
        Self {
            codec: None,
            container: None,
            input,
            bitrate: None,
            options: Vec::new(),
            global_header: false,
        }
    }

    pub fn with_codec(mut self, codec: CodecId) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_container(mut self, container: ContainerFormat) -> Self {
        self.container = Some(container);
        self
    }

    /**
        Set the target bitrate in bits per second.
    */
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = (String, String)>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn with_global_header(mut self, global_header: bool) -> Self {
        self.global_header = global_header;
        self
    }
}
