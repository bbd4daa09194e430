/*!
    Codec identification.
*/

use std::fmt;
use std::str::FromStr;

use crate::Error;

/**
    Codec identifiers.

    The codecs the write pipeline can negotiate. Not all FFmpeg codecs
    are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecId {
    // Video codecs
    /// H.264 / AVC
    H264,
    /// Apple ProRes
    ProRes,
    /// Avid DNxHD / DNxHR
    DnxHd,
    /// VP9
    Vp9,
    /// AV1
    Av1,
    /// Vidvox HAP
    Hap,
    /// GoPro CineForm HD
    Cineform,

    // Audio codecs
    /// AAC (Advanced Audio Coding)
    Aac,
    /// AC-3 (Dolby Digital)
    Ac3,
    /// MP3 (MPEG Audio Layer 3)
    Mp3,
    /// Opus
    Opus,
    /// Vorbis
    Vorbis,
    /// FLAC (Free Lossless Audio Codec)
    Flac,
    /// PCM signed 16-bit little-endian
    PcmS16Le,
    /// PCM signed 16-bit big-endian
    PcmS16Be,
}

impl CodecId {
    /**
        FFmpeg short name of the codec.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::ProRes => "prores",
            Self::DnxHd => "dnxhd",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
            Self::Hap => "hap",
            Self::Cineform => "cfhd",
            Self::Aac => "aac",
            Self::Ac3 => "ac3",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::PcmS16Le => "pcm_s16le",
            Self::PcmS16Be => "pcm_s16be",
        }
    }

    /**
        Returns true if this is a video codec.
    */
    pub const fn is_video(self) -> bool {
        matches!(
            self,
            Self::H264
                | Self::ProRes
                | Self::DnxHd
                | Self::Vp9
                | Self::Av1
                | Self::Hap
                | Self::Cineform
        )
    }

    /**
        Returns true if this is an audio codec.
    */
    pub const fn is_audio(self) -> bool {
        !self.is_video()
    }

    /**
        Returns true for raw PCM codecs, which accept any frame size.
    */
    pub const fn is_pcm(self) -> bool {
        matches!(self, Self::PcmS16Le | Self::PcmS16Be)
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s.trim().to_ascii_lowercase().as_str() {
            "h264" | "avc" => Self::H264,
            "prores" => Self::ProRes,
            "dnxhd" | "dnxhr" => Self::DnxHd,
            "vp9" => Self::Vp9,
            "av1" => Self::Av1,
            "hap" => Self::Hap,
            "cfhd" | "cineform" => Self::Cineform,
            "aac" => Self::Aac,
            "ac3" => Self::Ac3,
            "mp3" => Self::Mp3,
            "opus" => Self::Opus,
            "vorbis" => Self::Vorbis,
            "flac" => Self::Flac,
            "pcm_s16le" | "pcm_s16" | "pcm16" => Self::PcmS16Le,
            "pcm_s16be" => Self::PcmS16Be,
            _ => return Err(Error::unsupported_format(format!("unknown codec '{s}'"))),
        };
        Ok(id)
    }
}
