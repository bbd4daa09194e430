/*!
    Video encoder implementation.
*/

use ffmpeg_next::{
    Codec, Dictionary, Rational as FFmpegRational,
    codec::{self, Parameters, encoder::Video as VideoEncoderFFmpeg},
    ffi,
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::{debug, info, warn};

use ffmpeg_transform::convert::pixel_format_to_ffmpeg;
use ffmpeg_types::{
    ColorPrimaries, ColorRange, ColorSpace, ColorTransfer, Error, Packet, PixelFormat, Rational,
    Result, StreamType,
};

use crate::caps::{find_encoder, video_capabilities};
use crate::config::VideoEncoderConfig;
use crate::encoder::{Encoder, receive_packets};
use crate::negotiate::{
    Candidate, ColorSettings, NegotiationWarning, VideoStreamConfig, encoder_options,
    resolve_color, resolve_pixel_format, video_candidates,
};

/**
    Video encoder.

    Encodes frames in the negotiated pixel format into compressed packets.
    Frame pts values are frame indices in the codec time base.
*/
pub struct VideoEncoder {
    encoder: VideoEncoderFFmpeg,
    time_base: Rational,
}

impl VideoEncoder {
    /**
        Negotiate and open a video encoder.

        Candidates are tried in priority order. A hardware encoder that is
        present but fails to open is skipped with a warning; a software
        encoder that fails to open is a configuration error naming the
        pixel format and encoder.
    */
    pub fn open(config: &VideoEncoderConfig) -> Result<(Self, VideoStreamConfig)> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        if !config.frame_rate.is_positive() {
            return Err(Error::config(format!(
                "invalid frame rate {}",
                config.frame_rate
            )));
        }

        let requested = config
            .pixel_format
            .unwrap_or_else(|| config.profile.default_pixel_format());
        let candidates = video_candidates(config.profile, config.hardware, config.platform);

        let mut warnings = Vec::new();
        let mut hardware_found = false;

        for candidate in &candidates {
            let Some(codec) = find_encoder(candidate) else {
                debug!(encoder = %candidate, "encoder not available");
                continue;
            };
            if candidate.is_hardware() {
                hardware_found = true;
            }

            match Self::open_candidate(config, candidate, codec, requested) {
                Ok((encoder, mut resolved)) => {
                    if config.hardware && !candidate.is_hardware() {
                        let warning = NegotiationWarning::HardwareUnavailable {
                            profile: config.profile,
                        };
                        warn!(hardware_found, "{warning}");
                        warnings.push(warning);
                    }
                    warnings.append(&mut resolved.warnings);
                    resolved.warnings = warnings;
                    info!(
                        encoder = %resolved.encoder,
                        pixel_format = %resolved.pixel_format,
                        hardware = resolved.hardware,
                        "opened video encoder"
                    );
                    return Ok((encoder, resolved));
                }
                Err(e) if candidate.is_hardware() => {
                    warn!(encoder = %candidate, error = %e, "hardware encoder failed to open");
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::config(format!(
            "no encoder available for {}",
            config.profile
        )))
    }

    fn open_candidate(
        config: &VideoEncoderConfig,
        candidate: &Candidate,
        codec: Codec,
        requested: PixelFormat,
    ) -> Result<(Self, VideoStreamConfig)> {
        let name = codec.name().to_string();
        let hardware = candidate.is_hardware();

        let caps = video_capabilities(&codec);
        let (pixel_format, warning) =
            resolve_pixel_format(requested, caps.pixel_formats.as_deref(), &name)?;
        let color = resolve_color(config.profile, hardware, &config.color);

        // Create encoder context
        let encoder_ctx = codec::context::Context::new_with_codec(codec);
        let mut encoder = encoder_ctx
            .encoder()
            .video()
            .map_err(|e| Error::codec(e.to_string()))?;

        encoder.set_width(config.width);
        encoder.set_height(config.height);
        encoder.set_format(pixel_format_to_ffmpeg(pixel_format));

        let frame_rate = FFmpegRational::new(config.frame_rate.num, config.frame_rate.den);
        encoder.set_frame_rate(Some(frame_rate));

        // Time base is inverse of frame rate for video
        let time_base = config.frame_rate.invert();
        encoder.set_time_base(FFmpegRational::new(time_base.num, time_base.den));

        if config.global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        unsafe {
            set_color(encoder.as_mut_ptr(), &color);
        }

        // Profile hints first, caller options override them
        let mut opts = Dictionary::new();
        for (key, value) in encoder_options(config.profile, &name, pixel_format)
            .iter()
            .chain(config.options.iter())
        {
            debug!(encoder = %name, key = %key, value = %value, "encoder option");
            opts.set(key, value);
        }

        let encoder = encoder.open_with(opts).map_err(|e| {
            Error::config(format!(
                "failed to open {name} with pixel format {pixel_format}: {e}"
            ))
        })?;

        let resolved = VideoStreamConfig {
            profile: config.profile,
            codec: config.profile.codec(),
            encoder: name,
            hardware,
            width: config.width,
            height: config.height,
            pixel_format,
            color,
            frame_rate: config.frame_rate,
            start_time: config.start_time,
            time_base,
            warnings: warning.into_iter().collect(),
        };

        Ok((Self { encoder, time_base }, resolved))
    }

    /**
        Codec parameters for the container stream.
    */
    pub fn parameters(&self) -> Parameters {
        Parameters::from(&self.encoder)
    }
}

impl Encoder for VideoEncoder {
    type Frame = VideoFrameFFmpeg;

    fn stream_type(&self) -> StreamType {
        StreamType::Video
    }

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn push(&mut self, frame: Option<&VideoFrameFFmpeg>) -> Result<Vec<Packet>> {
        match frame {
            Some(frame) => self
                .encoder
                .send_frame(frame)
                .map_err(|e| Error::codec(format!("video encoder rejected frame: {e}")))?,
            None => self
                .encoder
                .send_eof()
                .map_err(|e| Error::codec(format!("video encoder rejected flush: {e}")))?,
        }
        receive_packets(&mut self.encoder, self.time_base, StreamType::Video)
    }
}

unsafe fn set_color(ctx: *mut ffi::AVCodecContext, color: &ColorSettings) {
    unsafe {
        (*ctx).color_range = match color.range {
            ColorRange::Limited => ffi::AVColorRange::AVCOL_RANGE_MPEG,
            ColorRange::Full => ffi::AVColorRange::AVCOL_RANGE_JPEG,
        };
        (*ctx).color_primaries = match color.primaries {
            ColorPrimaries::Bt709 => ffi::AVColorPrimaries::AVCOL_PRI_BT709,
            ColorPrimaries::Bt2020 => ffi::AVColorPrimaries::AVCOL_PRI_BT2020,
            ColorPrimaries::Bt470bg => ffi::AVColorPrimaries::AVCOL_PRI_BT470BG,
            ColorPrimaries::Smpte170m => ffi::AVColorPrimaries::AVCOL_PRI_SMPTE170M,
            ColorPrimaries::DciP3 => ffi::AVColorPrimaries::AVCOL_PRI_SMPTE431,
            ColorPrimaries::DisplayP3 => ffi::AVColorPrimaries::AVCOL_PRI_SMPTE432,
        };
        (*ctx).color_trc = match color.transfer {
            ColorTransfer::Bt709 => ffi::AVColorTransferCharacteristic::AVCOL_TRC_BT709,
            ColorTransfer::Srgb => ffi::AVColorTransferCharacteristic::AVCOL_TRC_IEC61966_2_1,
            ColorTransfer::Linear => ffi::AVColorTransferCharacteristic::AVCOL_TRC_LINEAR,
            ColorTransfer::Pq => ffi::AVColorTransferCharacteristic::AVCOL_TRC_SMPTE2084,
            ColorTransfer::Hlg => ffi::AVColorTransferCharacteristic::AVCOL_TRC_ARIB_STD_B67,
            ColorTransfer::Smpte170m => ffi::AVColorTransferCharacteristic::AVCOL_TRC_SMPTE170M,
            ColorTransfer::Bt2020_10 => ffi::AVColorTransferCharacteristic::AVCOL_TRC_BT2020_10,
        };
        (*ctx).colorspace = match color.space {
            ColorSpace::Bt709 => ffi::AVColorSpace::AVCOL_SPC_BT709,
            ColorSpace::Bt470bg => ffi::AVColorSpace::AVCOL_SPC_BT470BG,
            ColorSpace::Smpte170m => ffi::AVColorSpace::AVCOL_SPC_SMPTE170M,
            ColorSpace::Bt2020Ncl => ffi::AVColorSpace::AVCOL_SPC_BT2020_NCL,
            ColorSpace::Bt2020Cl => ffi::AVColorSpace::AVCOL_SPC_BT2020_CL,
            ColorSpace::Rgb => ffi::AVColorSpace::AVCOL_SPC_RGB,
        };
    }
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("width", &self.encoder.width())
            .field("height", &self.encoder.height())
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}
