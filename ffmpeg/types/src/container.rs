/*!
    Output container formats.
*/

use std::fmt;
use std::path::Path;

/**
    Container format, guessed from the output path extension.

    Anything not listed is passed to FFmpeg by extension as [`ContainerFormat::Other`].
*/
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Mov,
    Mp4,
    Mkv,
    Webm,
    Avi,
    Mxf,
    Wav,
    Aiff,
    Mp3,
    Ogg,
    Opus,
    Other(String),
}

impl ContainerFormat {
    /**
        Guess the container from a path extension (case-insensitive).

        Returns None if the path has no extension.
    */
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        Some(Self::from_extension(&ext))
    }

    /**
        Container for a lowercase extension without the leading dot.
    */
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "mov" | "qt" => Self::Mov,
            "mp4" | "m4v" | "m4a" => Self::Mp4,
            "mkv" => Self::Mkv,
            "webm" => Self::Webm,
            "avi" => Self::Avi,
            "mxf" => Self::Mxf,
            "wav" => Self::Wav,
            "aif" | "aiff" => Self::Aiff,
            "mp3" => Self::Mp3,
            "ogg" | "oga" => Self::Ogg,
            "opus" => Self::Opus,
            other => Self::Other(other.to_string()),
        }
    }

    /**
        Returns true for containers that only carry audio.
    */
    pub fn is_audio_only(&self) -> bool {
        matches!(
            self,
            Self::Wav | Self::Aiff | Self::Mp3 | Self::Ogg | Self::Opus
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Mov => "mov",
            Self::Mp4 => "mp4",
            Self::Mkv => "matroska",
            Self::Webm => "webm",
            Self::Avi => "avi",
            Self::Mxf => "mxf",
            Self::Wav => "wav",
            Self::Aiff => "aiff",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Other(ext) => ext,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
