/*!
    Color description enums.

    Names follow FFmpeg's option values (`-color_range`, `-color_primaries`,
    `-color_trc`, `-colorspace`) so configuration strings can be passed
    through unchanged.
*/

use std::fmt;
use std::str::FromStr;

use crate::Error;

/**
    Quantization range of the encoded samples.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorRange {
    /// Limited ("tv", "mpeg") range, 16-235 for 8-bit luma
    Limited,
    /// Full ("pc", "jpeg") range
    Full,
}

/**
    Chromaticity of the color primaries.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorPrimaries {
    Bt709,
    Bt2020,
    Bt470bg,
    Smpte170m,
    /// SMPTE RP 431-2 (DCI-P3, DCI white point)
    DciP3,
    /// SMPTE EG 432-1 (P3 primaries, D65 white point)
    DisplayP3,
}

/**
    Transfer characteristics.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorTransfer {
    Bt709,
    /// IEC 61966-2-1
    Srgb,
    Linear,
    /// SMPTE ST 2084
    Pq,
    /// ARIB STD-B67
    Hlg,
    Smpte170m,
    Bt2020_10,
}

/**
    Matrix coefficients used to derive luma and chroma from RGB.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Bt709,
    Bt470bg,
    Smpte170m,
    /// BT.2020 non-constant luminance
    Bt2020Ncl,
    /// BT.2020 constant luminance
    Bt2020Cl,
    /// Identity matrix (GBR)
    Rgb,
}

impl ColorRange {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Limited => "tv",
            Self::Full => "pc",
        }
    }
}

impl ColorPrimaries {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bt709 => "bt709",
            Self::Bt2020 => "bt2020",
            Self::Bt470bg => "bt470bg",
            Self::Smpte170m => "smpte170m",
            Self::DciP3 => "smpte431",
            Self::DisplayP3 => "smpte432",
        }
    }
}

impl ColorTransfer {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bt709 => "bt709",
            Self::Srgb => "iec61966-2-1",
            Self::Linear => "linear",
            Self::Pq => "smpte2084",
            Self::Hlg => "arib-std-b67",
            Self::Smpte170m => "smpte170m",
            Self::Bt2020_10 => "bt2020-10",
        }
    }
}

impl ColorSpace {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bt709 => "bt709",
            Self::Bt470bg => "bt470bg",
            Self::Smpte170m => "smpte170m",
            Self::Bt2020Ncl => "bt2020nc",
            Self::Bt2020Cl => "bt2020c",
            Self::Rgb => "gbr",
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}

fn unknown(kind: &str, s: &str) -> Error {
    Error::unsupported_format(format!("unknown {kind} '{s}'"))
}

impl FromStr for ColorRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "tv" | "limited" | "mpeg" => Ok(Self::Limited),
            "pc" | "full" | "jpeg" => Ok(Self::Full),
            _ => Err(unknown("color range", s)),
        }
    }
}

impl FromStr for ColorPrimaries {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bt709" => Ok(Self::Bt709),
            "bt2020" => Ok(Self::Bt2020),
            "bt470bg" => Ok(Self::Bt470bg),
            "smpte170m" => Ok(Self::Smpte170m),
            "smpte431" | "dci-p3" => Ok(Self::DciP3),
            "smpte432" | "display-p3" | "p3-d65" => Ok(Self::DisplayP3),
            _ => Err(unknown("color primaries", s)),
        }
    }
}

impl FromStr for ColorTransfer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bt709" => Ok(Self::Bt709),
            "iec61966-2-1" | "srgb" => Ok(Self::Srgb),
            "linear" => Ok(Self::Linear),
            "smpte2084" | "pq" => Ok(Self::Pq),
            "arib-std-b67" | "hlg" => Ok(Self::Hlg),
            "smpte170m" => Ok(Self::Smpte170m),
            "bt2020-10" => Ok(Self::Bt2020_10),
            _ => Err(unknown("color transfer", s)),
        }
    }
}

impl FromStr for ColorSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "bt709" => Ok(Self::Bt709),
            "bt470bg" | "bt601" => Ok(Self::Bt470bg),
            "smpte170m" => Ok(Self::Smpte170m),
            "bt2020nc" | "bt2020-ncl" | "bt2020" => Ok(Self::Bt2020Ncl),
            "bt2020c" | "bt2020-cl" => Ok(Self::Bt2020Cl),
            "gbr" | "rgb" => Ok(Self::Rgb),
            _ => Err(unknown("color space", s)),
        }
    }
}

macro_rules! display_by_name {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )*
    };
}

display_by_name!(ColorRange, ColorPrimaries, ColorTransfer, ColorSpace);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ffmpeg_names() {
        assert_eq!("tv".parse::<ColorRange>().unwrap(), ColorRange::Limited);
        assert_eq!("JPEG".parse::<ColorRange>().unwrap(), ColorRange::Full);
        assert_eq!("smpte2084".parse::<ColorTransfer>().unwrap(), ColorTransfer::Pq);
        assert_eq!("arib_std_b67".parse::<ColorTransfer>().unwrap(), ColorTransfer::Hlg);
        assert_eq!("bt2020nc".parse::<ColorSpace>().unwrap(), ColorSpace::Bt2020Ncl);
        assert_eq!("BT2020".parse::<ColorPrimaries>().unwrap(), ColorPrimaries::Bt2020);
    }

    #[test]
    fn names_parse_back() {
        for trc in [
            ColorTransfer::Bt709,
            ColorTransfer::Srgb,
            ColorTransfer::Linear,
            ColorTransfer::Pq,
            ColorTransfer::Hlg,
            ColorTransfer::Smpte170m,
            ColorTransfer::Bt2020_10,
        ] {
            assert_eq!(trc.name().parse::<ColorTransfer>().unwrap(), trc);
        }
        assert_eq!(format!("{}", ColorSpace::Rgb), "gbr");
    }

    #[test]
    fn unknown_is_error() {
        assert!("bt999".parse::<ColorSpace>().is_err());
        assert!("".parse::<ColorRange>().is_err());
    }
}
