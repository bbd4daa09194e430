/*!
    Video pixel conversion.
*/

use std::os::raw::c_int;
use std::ptr;

use ffmpeg_next::{
    ffi,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::{debug, warn};

use ffmpeg_types::{ColorFamily, ColorRange, ColorSpace, Error, Image, PixelFormat, Result};

use crate::convert::pixel_format_to_ffmpeg;

/**
    Scaling algorithm for video resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    #[default]
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Color range and matrix used by the scaler.

    Copied from the encoder's resolved settings so the luma/chroma math
    matches the metadata written into the stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorDetails {
    /// Range of the source samples
    pub src_range: ColorRange,
    /// Range the encoder was configured with
    pub dst_range: ColorRange,
    /// Matrix coefficients the encoder was configured with
    pub space: ColorSpace,
}

impl ColorDetails {
    /**
        Details for a source of the given format feeding an encoder with
        the given range and matrix. RGB and gray sources are full range,
        YUV sources are assumed limited.
    */
    pub fn for_source(src: PixelFormat, dst_range: ColorRange, space: ColorSpace) -> Self {
        let src_range = match src.family() {
            ColorFamily::Rgb | ColorFamily::Gray => ColorRange::Full,
            ColorFamily::Yuv => ColorRange::Limited,
        };
        Self {
            src_range,
            dst_range,
            space,
        }
    }
}

impl Default for ColorDetails {
    fn default() -> Self {
        Self {
            src_range: ColorRange::Full,
            dst_range: ColorRange::Limited,
            space: ColorSpace::Bt709,
        }
    }
}

/**
    Configuration for a pixel converter.
*/
#[derive(Clone, Debug)]
pub struct PixelConverterConfig {
    /// Pixel format of the caller's images.
    pub src_format: PixelFormat,
    /// Pixel format the encoder expects.
    pub dst_format: PixelFormat,
    /// Width in pixels, shared by source and destination.
    pub width: u32,
    /// Height in pixels, shared by source and destination.
    pub height: u32,
    /// Scaling algorithm to use.
    pub algorithm: ScalingAlgorithm,
    /// Color range and matrix details.
    pub color: ColorDetails,
}

impl PixelConverterConfig {
    /**
        Create a new converter configuration.
    */
    pub fn new(src_format: PixelFormat, dst_format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            src_format,
            dst_format,
            width,
            height,
            algorithm: ScalingAlgorithm::default(),
            color: ColorDetails::default(),
        }
    }

    /**
        Set the scaling algorithm.
    */
    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /**
        Set the color range and matrix details.
    */
    pub fn with_color(mut self, color: ColorDetails) -> Self {
        self.color = color;
        self
    }
}

/**
    Pixel converter for one exact `(src, dst, width, height)` combination.

    Caller images are wrapped in a scratch frame without copying. Bottom-up
    packed images are read through a negated stride starting at the last
    row; bottom-up planar images are rejected.
*/
pub struct PixelConverter {
    config: PixelConverterConfig,
    context: ScalerContext,
    scratch: VideoFrameFFmpeg,
}

impl PixelConverter {
    /**
        Create a converter and apply the configured color details.
    */
    pub fn new(config: PixelConverterConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid_data("converter has zero dimensions"));
        }

        let src_pixel = pixel_format_to_ffmpeg(config.src_format);
        let dst_pixel = pixel_format_to_ffmpeg(config.dst_format);

        let mut context = ScalerContext::get(
            src_pixel,
            config.width,
            config.height,
            dst_pixel,
            config.width,
            config.height,
            config.algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| Error::codec(format!("failed to create scaler: {}", e)))?;

        apply_color_details(&mut context, &config.color);

        let mut scratch = VideoFrameFFmpeg::empty();
        scratch.set_format(src_pixel);
        scratch.set_width(config.width);
        scratch.set_height(config.height);

        debug!(
            src = %config.src_format,
            dst = %config.dst_format,
            width = config.width,
            height = config.height,
            range = %config.color.dst_range,
            space = %config.color.space,
            "created pixel converter"
        );

        Ok(Self {
            config,
            context,
            scratch,
        })
    }

    /**
        Get the converter configuration.
    */
    pub fn config(&self) -> &PixelConverterConfig {
        &self.config
    }

    /**
        Allocate a destination frame matching the converter output.
    */
    pub fn alloc_output(&self) -> VideoFrameFFmpeg {
        VideoFrameFFmpeg::new(
            pixel_format_to_ffmpeg(self.config.dst_format),
            self.config.width,
            self.config.height,
        )
    }

    /**
        Convert an image into `dst`, which must come from [`Self::alloc_output`].

        `dst` is made writable first, so a frame still referenced by an
        encoder is never overwritten.
    */
    pub fn convert(&mut self, image: &Image, dst: &mut VideoFrameFFmpeg) -> Result<()> {
        self.check_image(image)?;

        let ret = unsafe { ffi::av_frame_make_writable(dst.as_mut_ptr()) };
        if ret < 0 {
            return Err(Error::codec(format!(
                "cannot make encode frame writable: {}",
                ffmpeg_next::Error::from(ret)
            )));
        }

        self.wrap(image);
        let result = self
            .context
            .run(&self.scratch, dst)
            .map_err(|e| Error::codec(format!("scaling failed: {}", e)));
        self.unwrap_scratch();
        result
    }

    fn check_image(&self, image: &Image) -> Result<()> {
        let info = &image.info;
        if info.width != self.config.width
            || info.height != self.config.height
            || info.format != self.config.src_format
        {
            return Err(Error::invalid_data(format!(
                "image is {}x{} {}, converter expects {}x{} {}",
                info.width,
                info.height,
                info.format,
                self.config.width,
                self.config.height,
                self.config.src_format
            )));
        }
        if info.layout.bottom_up && info.format.is_planar() {
            return Err(Error::unsupported_format(format!(
                "bottom-up {} images cannot be flipped",
                info.format
            )));
        }
        image.validate()
    }

    /**
        Point the scratch frame at the image planes.
    */
    fn wrap(&mut self, image: &Image) {
        let bottom_up = image.info.layout.bottom_up;
        let base = image.data.as_ptr();
        unsafe {
            let frame = self.scratch.as_mut_ptr();
            for (index, plane) in image.info.plane_layout().iter().enumerate() {
                let first_row = base.add(plane.offset);
                if bottom_up {
                    let last_row = first_row.add(plane.stride * (plane.rows - 1));
                    (*frame).data[index] = last_row as *mut u8;
                    (*frame).linesize[index] = -(plane.stride as c_int);
                } else {
                    (*frame).data[index] = first_row as *mut u8;
                    (*frame).linesize[index] = plane.stride as c_int;
                }
            }
        }
    }

    /**
        Drop the scratch frame's borrowed plane pointers.
    */
    fn unwrap_scratch(&mut self) {
        unsafe {
            let frame = self.scratch.as_mut_ptr();
            for index in 0..(*frame).data.len() {
                (*frame).data[index] = ptr::null_mut();
                (*frame).linesize[index] = 0;
            }
        }
    }
}

/**
    SWS_CS_* constant for a color space.
*/
fn sws_colorspace(space: ColorSpace) -> c_int {
    match space {
        ColorSpace::Bt709 => ffi::SWS_CS_ITU709 as c_int,
        ColorSpace::Bt470bg | ColorSpace::Smpte170m | ColorSpace::Rgb => {
            ffi::SWS_CS_ITU601 as c_int
        }
        ColorSpace::Bt2020Ncl | ColorSpace::Bt2020Cl => ffi::SWS_CS_BT2020 as c_int,
    }
}

fn apply_color_details(context: &mut ScalerContext, color: &ColorDetails) {
    let src_range = c_int::from(color.src_range == ColorRange::Full);
    let dst_range = c_int::from(color.dst_range == ColorRange::Full);
    let ret = unsafe {
        let coefficients = ffi::sws_getCoefficients(sws_colorspace(color.space));
        ffi::sws_setColorspaceDetails(
            context.as_mut_ptr(),
            coefficients,
            src_range,
            coefficients,
            dst_range,
            0,
            1 << 16,
            1 << 16,
        )
    };
    if ret < 0 {
        warn!(
            space = %color.space,
            range = %color.dst_range,
            "scaler ignored color details for this format pair"
        );
    }
}

impl std::fmt::Debug for PixelConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelConverter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{ImageInfo, ImageLayout};

    fn gray_image(bottom_up: bool) -> Image {
        // Row 0 is black, row 1 is white in display order
        let rows: [[u8; 4]; 2] = if bottom_up {
            [[255; 4], [0; 4]]
        } else {
            [[0; 4], [255; 4]]
        };
        let info = ImageInfo::new(4, 2, PixelFormat::Gray8).with_layout(ImageLayout {
            bottom_up,
            alignment: 1,
        });
        Image::new(info, rows.concat()).unwrap()
    }

    fn converter(src: PixelFormat, dst: PixelFormat) -> PixelConverter {
        let config = PixelConverterConfig::new(src, dst, 4, 2)
            .with_algorithm(ScalingAlgorithm::Nearest)
            .with_color(ColorDetails::for_source(src, ColorRange::Full, ColorSpace::Bt709));
        PixelConverter::new(config).unwrap()
    }

    #[test]
    fn bottom_up_images_are_flipped() {
        let mut conv = converter(PixelFormat::Gray8, PixelFormat::Gray8);
        let mut top_down = conv.alloc_output();
        let mut flipped = conv.alloc_output();

        conv.convert(&gray_image(false), &mut top_down).unwrap();
        conv.convert(&gray_image(true), &mut flipped).unwrap();

        let stride = top_down.stride(0);
        assert_eq!(&top_down.data(0)[..4], &[0; 4]);
        assert_eq!(&top_down.data(0)[stride..stride + 4], &[255; 4]);
        assert_eq!(&flipped.data(0)[..4], &top_down.data(0)[..4]);
        assert_eq!(
            &flipped.data(0)[stride..stride + 4],
            &top_down.data(0)[stride..stride + 4]
        );
    }

    #[test]
    fn bottom_up_planar_is_rejected() {
        let mut conv = converter(PixelFormat::Yuv420p, PixelFormat::Yuv422p);
        let info = ImageInfo::new(4, 2, PixelFormat::Yuv420p).with_layout(ImageLayout {
            bottom_up: true,
            alignment: 1,
        });
        let image = Image::new(info, vec![0; info.expected_len()]).unwrap();
        let mut out = conv.alloc_output();
        let err = conv.convert(&image, &mut out).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn mismatched_image_is_invalid() {
        let mut conv = converter(PixelFormat::Rgba, PixelFormat::Yuv420p);
        let mut out = conv.alloc_output();
        let err = conv.convert(&gray_image(false), &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }

    #[test]
    fn rgba_to_yuv_uses_full_range_when_requested() {
        let mut conv = converter(PixelFormat::Rgba, PixelFormat::Yuv444p);
        let info = ImageInfo::new(4, 2, PixelFormat::Rgba);
        let image = Image::new(info, vec![255; info.expected_len()]).unwrap();
        let mut out = conv.alloc_output();
        conv.convert(&image, &mut out).unwrap();
        // White maps to 255 luma in full range (235 in limited range)
        assert!(out.data(0)[0] >= 250);
    }
}
