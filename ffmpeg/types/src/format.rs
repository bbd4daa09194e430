/*!
    Pixel and sample format types.
*/

use std::fmt;
use std::str::FromStr;

use crate::Error;

/**
    Chroma subsampling of a pixel format.

    RGB and gray formats report [`Chroma::Full`], they carry a full
    resolution sample for every component.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chroma {
    /// Half horizontal and vertical chroma resolution
    Yuv420,
    /// Half horizontal chroma resolution
    Yuv422,
    /// Full chroma resolution
    Full,
}

/**
    Color model family of a pixel format.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    Gray,
    Rgb,
    Yuv,
}

/**
    Byte shape of one image plane.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneShape {
    /// Bytes of pixel data in one row (excluding alignment padding)
    pub row_bytes: usize,
    /// Number of rows
    pub rows: usize,
}

/**
    Video pixel formats.

    Covers the formats callers hand in (packed RGB/gray, planar YUV) and
    the formats the supported encoders declare. Multi-byte formats are
    little-endian.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Gray, 8-bit
    Gray8,
    /// Gray, 16-bit
    Gray16le,
    /// Gray + alpha, 8-bit
    Ya8,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGB, 16 bits per component
    Rgb48le,
    /// Packed RGBA, 16 bits per component
    Rgba64le,
    /// Planar GBR, 10-bit
    Gbrp10le,
    /// Planar GBR, 12-bit
    Gbrp12le,
    /// Planar GBR + alpha, 12-bit
    Gbrap12le,
    /// Planar YUV 4:2:0, 8-bit
    Yuv420p,
    /// Planar YUV 4:2:0 + alpha, 8-bit
    Yuva420p,
    /// Planar YUV 4:2:2, 8-bit
    Yuv422p,
    /// Planar YUV 4:4:4, 8-bit
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit
    Yuv420p10le,
    /// Planar YUV 4:2:2, 10-bit
    Yuv422p10le,
    /// Planar YUV 4:4:4, 10-bit
    Yuv444p10le,
    /// Planar YUV 4:4:4 + alpha, 10-bit
    Yuva444p10le,
    /// Planar YUV 4:2:0, 12-bit
    Yuv420p12le,
    /// Planar YUV 4:2:2, 12-bit
    Yuv422p12le,
    /// Planar YUV 4:4:4, 12-bit
    Yuv444p12le,
    /// Semi-planar YUV 4:2:0, 8-bit (hardware encoder input)
    Nv12,
    /// Semi-planar YUV 4:2:0, 10-bit in 16-bit words (hardware encoder input)
    P010le,
}

impl PixelFormat {
    /**
        Every format, in declaration order.
    */
    pub const ALL: [PixelFormat; 25] = [
        Self::Gray8,
        Self::Gray16le,
        Self::Ya8,
        Self::Rgb24,
        Self::Bgr24,
        Self::Rgba,
        Self::Bgra,
        Self::Rgb48le,
        Self::Rgba64le,
        Self::Gbrp10le,
        Self::Gbrp12le,
        Self::Gbrap12le,
        Self::Yuv420p,
        Self::Yuva420p,
        Self::Yuv422p,
        Self::Yuv444p,
        Self::Yuv420p10le,
        Self::Yuv422p10le,
        Self::Yuv444p10le,
        Self::Yuva444p10le,
        Self::Yuv420p12le,
        Self::Yuv422p12le,
        Self::Yuv444p12le,
        Self::Nv12,
        Self::P010le,
    ];

    /**
        FFmpeg name of the format.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gray8 => "gray",
            Self::Gray16le => "gray16le",
            Self::Ya8 => "ya8",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
            Self::Rgb48le => "rgb48le",
            Self::Rgba64le => "rgba64le",
            Self::Gbrp10le => "gbrp10le",
            Self::Gbrp12le => "gbrp12le",
            Self::Gbrap12le => "gbrap12le",
            Self::Yuv420p => "yuv420p",
            Self::Yuva420p => "yuva420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv420p10le => "yuv420p10le",
            Self::Yuv422p10le => "yuv422p10le",
            Self::Yuv444p10le => "yuv444p10le",
            Self::Yuva444p10le => "yuva444p10le",
            Self::Yuv420p12le => "yuv420p12le",
            Self::Yuv422p12le => "yuv422p12le",
            Self::Yuv444p12le => "yuv444p12le",
            Self::Nv12 => "nv12",
            Self::P010le => "p010le",
        }
    }

    /**
        Bits per color component.
    */
    pub const fn depth(self) -> u32 {
        match self {
            Self::Gray8
            | Self::Ya8
            | Self::Rgb24
            | Self::Bgr24
            | Self::Rgba
            | Self::Bgra
            | Self::Yuv420p
            | Self::Yuva420p
            | Self::Yuv422p
            | Self::Yuv444p
            | Self::Nv12 => 8,
            Self::Gbrp10le
            | Self::Yuv420p10le
            | Self::Yuv422p10le
            | Self::Yuv444p10le
            | Self::Yuva444p10le
            | Self::P010le => 10,
            Self::Gbrp12le
            | Self::Gbrap12le
            | Self::Yuv420p12le
            | Self::Yuv422p12le
            | Self::Yuv444p12le => 12,
            Self::Gray16le | Self::Rgb48le | Self::Rgba64le => 16,
        }
    }

    /**
        Chroma subsampling.
    */
    pub const fn chroma(self) -> Chroma {
        match self {
            Self::Yuv420p
            | Self::Yuva420p
            | Self::Yuv420p10le
            | Self::Yuv420p12le
            | Self::Nv12
            | Self::P010le => Chroma::Yuv420,
            Self::Yuv422p | Self::Yuv422p10le | Self::Yuv422p12le => Chroma::Yuv422,
            _ => Chroma::Full,
        }
    }

    /**
        Color model family.
    */
    pub const fn family(self) -> ColorFamily {
        match self {
            Self::Gray8 | Self::Gray16le | Self::Ya8 => ColorFamily::Gray,
            Self::Rgb24
            | Self::Bgr24
            | Self::Rgba
            | Self::Bgra
            | Self::Rgb48le
            | Self::Rgba64le
            | Self::Gbrp10le
            | Self::Gbrp12le
            | Self::Gbrap12le => ColorFamily::Rgb,
            _ => ColorFamily::Yuv,
        }
    }

    /**
        Returns true if the format carries an alpha channel.
    */
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Ya8
                | Self::Rgba
                | Self::Bgra
                | Self::Rgba64le
                | Self::Gbrap12le
                | Self::Yuva420p
                | Self::Yuva444p10le
        )
    }

    /**
        Returns true if components are stored in separate planes.
    */
    pub const fn is_planar(self) -> bool {
        self.packed_bytes_per_pixel().is_none()
    }

    /**
        Bytes per pixel for packed (single plane, interleaved) layouts.

        Returns None for planar and semi-planar layouts.
    */
    pub const fn packed_bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Gray8 => Some(1),
            Self::Gray16le | Self::Ya8 => Some(2),
            Self::Rgb24 | Self::Bgr24 => Some(3),
            Self::Rgba | Self::Bgra => Some(4),
            Self::Rgb48le => Some(6),
            Self::Rgba64le => Some(8),
            _ => None,
        }
    }

    /**
        Shapes of the planes holding a `width` x `height` image, in FFmpeg
        plane order.
    */
    pub fn planes(self, width: u32, height: u32) -> Vec<PlaneShape> {
        let w = width as usize;
        let h = height as usize;
        if let Some(bpp) = self.packed_bytes_per_pixel() {
            return vec![PlaneShape {
                row_bytes: w * bpp,
                rows: h,
            }];
        }

        let bytes = if self.depth() > 8 { 2 } else { 1 };
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);
        let full = PlaneShape {
            row_bytes: w * bytes,
            rows: h,
        };

        match self {
            Self::Nv12 | Self::P010le => vec![
                full,
                PlaneShape {
                    row_bytes: half_w * 2 * bytes,
                    rows: half_h,
                },
            ],
            _ => {
                let chroma = match self.chroma() {
                    Chroma::Yuv420 => PlaneShape {
                        row_bytes: half_w * bytes,
                        rows: half_h,
                    },
                    Chroma::Yuv422 => PlaneShape {
                        row_bytes: half_w * bytes,
                        rows: h,
                    },
                    Chroma::Full => full,
                };
                let mut planes = vec![full, chroma, chroma];
                if self.has_alpha() {
                    planes.push(full);
                }
                planes
            }
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    /**
        Parses FFmpeg names (`yuv422p10le`, case-insensitive) as well as the
        `<channels>_<type>` image names used by callers (`RGBA_U8`, `L_U16`).
    */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let aliased = match lower.as_str() {
            "l_u8" | "gray8" => "gray",
            "l_u16" | "gray16" => "gray16le",
            "la_u8" => "ya8",
            "rgb_u8" => "rgb24",
            "rgba_u8" => "rgba",
            "rgb_u16" | "rgb48" => "rgb48le",
            "rgba_u16" | "rgba64" => "rgba64le",
            "yuv420p10" => "yuv420p10le",
            "yuv422p10" => "yuv422p10le",
            "yuv444p10" => "yuv444p10le",
            "yuva444p10" => "yuva444p10le",
            "yuv420p12" => "yuv420p12le",
            "yuv422p12" => "yuv422p12le",
            "yuv444p12" => "yuv444p12le",
            "p010" => "p010le",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == aliased)
            .ok_or_else(|| Error::unsupported_format(format!("unknown pixel format '{s}'")))
    }
}

/**
    Audio sample formats.

    The `*Planar` variants store each channel in its own plane, the others
    interleave channels sample by sample.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    /// Unsigned 8-bit integer, planar
    U8Planar,
    /// Signed 16-bit integer, planar
    S16Planar,
    /// Signed 32-bit integer, planar
    S32Planar,
    /// 32-bit floating point, planar
    F32Planar,
    /// 64-bit floating point, planar
    F64Planar,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::U8Planar => 1,
            Self::S16 | Self::S16Planar => 2,
            Self::S32 | Self::F32 | Self::S32Planar | Self::F32Planar => 4,
            Self::F64 | Self::F64Planar => 8,
        }
    }

    /**
        Returns true if this is a floating-point format.
    */
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            Self::F32 | Self::F64 | Self::F32Planar | Self::F64Planar
        )
    }

    /**
        Returns true if channels are stored in separate planes.
    */
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Self::U8Planar | Self::S16Planar | Self::S32Planar | Self::F32Planar | Self::F64Planar
        )
    }

    /**
        The planar format with the same sample type.
    */
    pub const fn to_planar(self) -> Self {
        match self {
            Self::U8 | Self::U8Planar => Self::U8Planar,
            Self::S16 | Self::S16Planar => Self::S16Planar,
            Self::S32 | Self::S32Planar => Self::S32Planar,
            Self::F32 | Self::F32Planar => Self::F32Planar,
            Self::F64 | Self::F64Planar => Self::F64Planar,
        }
    }

    /**
        The interleaved format with the same sample type.
    */
    pub const fn to_packed(self) -> Self {
        match self {
            Self::U8 | Self::U8Planar => Self::U8,
            Self::S16 | Self::S16Planar => Self::S16,
            Self::S32 | Self::S32Planar => Self::S32,
            Self::F32 | Self::F32Planar => Self::F32,
            Self::F64 | Self::F64Planar => Self::F64,
        }
    }

    /**
        FFmpeg name of the format.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::F32 => "flt",
            Self::F64 => "dbl",
            Self::U8Planar => "u8p",
            Self::S16Planar => "s16p",
            Self::S32Planar => "s32p",
            Self::F32Planar => "fltp",
            Self::F64Planar => "dblp",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
    Audio channel layout.

    Layouts are identified by channel count; each count maps to FFmpeg's
    default layout for that count.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Left and right channels
    Stereo,
    /// 2.1 (FL, FR, LFE)
    Surround2_1,
    /// Quad (FL, FR, BL, BR)
    Quad,
    /// 5.0 (FL, FR, FC, BL, BR)
    Surround5_0,
    /// 5.1 surround (FL, FR, FC, LFE, BL, BR)
    Surround5_1,
    /// 6.1 surround (FL, FR, FC, LFE, BC, SL, SR)
    Surround6_1,
    /// 7.1 surround (FL, FR, FC, LFE, BL, BR, SL, SR)
    Surround7_1,
}

impl ChannelLayout {
    /**
        Returns the number of channels.
    */
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Surround2_1 => 3,
            Self::Quad => 4,
            Self::Surround5_0 => 5,
            Self::Surround5_1 => 6,
            Self::Surround6_1 => 7,
            Self::Surround7_1 => 8,
        }
    }

    /**
        Default layout for a channel count.

        Counts above eight clamp to 7.1 and zero maps to mono.
    */
    pub const fn from_count(count: u16) -> Self {
        match count {
            0 | 1 => Self::Mono,
            2 => Self::Stereo,
            3 => Self::Surround2_1,
            4 => Self::Quad,
            5 => Self::Surround5_0,
            6 => Self::Surround5_1,
            7 => Self::Surround6_1,
            _ => Self::Surround7_1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_properties() {
        assert_eq!(PixelFormat::Yuv422p10le.depth(), 10);
        assert_eq!(PixelFormat::Yuv422p10le.chroma(), Chroma::Yuv422);
        assert_eq!(PixelFormat::Rgba.family(), ColorFamily::Rgb);
        assert!(PixelFormat::Yuva444p10le.has_alpha());
        assert!(!PixelFormat::Yuv444p10le.has_alpha());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Rgb48le.is_planar());
    }

    #[test]
    fn pixel_format_planes() {
        let planes = PixelFormat::Yuv420p.planes(5, 3);
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0], PlaneShape { row_bytes: 5, rows: 3 });
        assert_eq!(planes[1], PlaneShape { row_bytes: 3, rows: 2 });

        let planes = PixelFormat::Yuva444p10le.planes(4, 4);
        assert_eq!(planes.len(), 4);
        assert_eq!(planes[3], PlaneShape { row_bytes: 8, rows: 4 });

        let planes = PixelFormat::Rgba64le.planes(2, 2);
        assert_eq!(planes, vec![PlaneShape { row_bytes: 16, rows: 2 }]);

        let planes = PixelFormat::P010le.planes(4, 2);
        assert_eq!(planes[1], PlaneShape { row_bytes: 8, rows: 1 });
    }

    #[test]
    fn pixel_format_parse() {
        assert_eq!("YUV420P".parse::<PixelFormat>().unwrap(), PixelFormat::Yuv420p);
        assert_eq!("YUV444P10LE".parse::<PixelFormat>().unwrap(), PixelFormat::Yuv444p10le);
        assert_eq!("RGBA_U8".parse::<PixelFormat>().unwrap(), PixelFormat::Rgba);
        assert_eq!("L_U16".parse::<PixelFormat>().unwrap(), PixelFormat::Gray16le);
        assert!("xyz".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn pixel_format_names_round_trip_through_parse() {
        for format in PixelFormat::ALL {
            assert_eq!(format.name().parse::<PixelFormat>().unwrap(), format);
        }
    }

    #[test]
    fn sample_format_planarity() {
        assert_eq!(SampleFormat::F32.to_planar(), SampleFormat::F32Planar);
        assert_eq!(SampleFormat::S16Planar.to_packed(), SampleFormat::S16);
        assert!(SampleFormat::F32Planar.is_planar());
        assert!(!SampleFormat::S16.is_planar());
        assert_eq!(SampleFormat::F64Planar.bytes_per_sample(), 8);
        assert!(SampleFormat::F32Planar.is_float());
    }

    #[test]
    fn channel_layout_counts() {
        for count in 1..=8 {
            assert_eq!(ChannelLayout::from_count(count).channels(), count);
        }
        assert_eq!(ChannelLayout::from_count(0), ChannelLayout::Mono);
        assert_eq!(ChannelLayout::from_count(12), ChannelLayout::Surround7_1);
    }
}
