/*!
    Audio encoder implementation.
*/

use ffmpeg_next::{
    Dictionary,
    codec::{self, Parameters, capabilities::Capabilities, encoder::Audio as AudioEncoderFFmpeg},
    util::frame::audio::Audio as AudioFrameFFmpeg,
};
use tracing::{info, warn};

use ffmpeg_transform::convert::{
    channel_layout_to_ffmpeg, copy_samples_to_ffmpeg, sample_format_to_ffmpeg,
};
use ffmpeg_types::{AudioFrame, Error, Packet, Rational, Result, StreamType};

use crate::caps::{audio_capabilities, find_encoder};
use crate::config::AudioEncoderConfig;
use crate::encoder::{Encoder, receive_packets};
use crate::negotiate::{
    AudioStreamConfig, NegotiationWarning, audio_candidates, audio_frame_size, clears_block_align,
    container_audio_codec, default_audio_bitrate, first_viable, needs_resampler, resolve_channels,
    resolve_sample_format, resolve_sample_rate,
};

/**
    Audio encoder.

    Encodes frames in the negotiated sample format, layout and rate into
    compressed packets. Frame pts values are sample counts in the codec
    time base `1/sample_rate`.
*/
pub struct AudioEncoder {
    encoder: AudioEncoderFFmpeg,
    time_base: Rational,
    config: AudioStreamConfig,
}

impl AudioEncoder {
    /**
        Negotiate and open an audio encoder.

        Container restrictions are applied to the requested codec first,
        then sample format, channel layout and sample rate are resolved
        against what the encoder declares.
    */
    pub fn open(config: &AudioEncoderConfig) -> Result<(Self, AudioStreamConfig)> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;
        config.input.validate()?;

        let mut warnings = Vec::new();
        let (codec_id, warning) = container_audio_codec(config.container.as_ref(), config.codec);
        warnings.extend(warning);

        let (_, codec) = first_viable(audio_candidates(codec_id), find_encoder)
            .ok_or_else(|| Error::config(format!("no encoder available for {codec_id}")))?;
        let name = codec.name().to_string();
        let caps = audio_capabilities(&codec);
        let input = &config.input;

        let sample_format =
            resolve_sample_format(input.sample_format, caps.sample_formats.as_deref())
                .ok_or_else(|| {
                    Error::config(format!(
                        "{name} supports none of the sample formats {} can be converted to",
                        input.sample_format
                    ))
                })?;
        if sample_format.fallback {
            let warning = NegotiationWarning::SampleFormatFallback {
                requested: input.sample_format,
                resolved: sample_format.format,
                encoder: name.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
        let sample_format = sample_format.format;

        let channels = resolve_channels(input.channels, caps.channel_layouts.as_deref());
        let sample_rate = resolve_sample_rate(input.sample_rate, caps.sample_rates.as_deref());
        if sample_rate != input.sample_rate {
            let warning = NegotiationWarning::SampleRateFallback {
                requested: input.sample_rate,
                resolved: sample_rate,
                encoder: name.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
        let bitrate = config.bitrate.or_else(|| default_audio_bitrate(codec_id));
        let experimental = codec.capabilities().contains(Capabilities::EXPERIMENTAL);

        // Create encoder context
        let encoder_ctx = codec::context::Context::new_with_codec(codec);
        let mut encoder = encoder_ctx
            .encoder()
            .audio()
            .map_err(|e| Error::codec(e.to_string()))?;

        encoder.set_format(sample_format_to_ffmpeg(sample_format));
        encoder.set_rate(sample_rate as i32);
        encoder.set_channel_layout(channel_layout_to_ffmpeg(channels));

        // Time base (1/sample_rate is standard for audio)
        let time_base = Rational::new(1, sample_rate as i32);
        encoder.set_time_base(ffmpeg_next::Rational::new(1, sample_rate as i32));

        if let Some(bitrate) = bitrate {
            encoder.set_bit_rate(bitrate as usize);
        }
        if config.global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        if clears_block_align(codec_id) {
            unsafe {
                (*encoder.as_mut_ptr()).block_align = 0;
            }
        }

        let mut opts = Dictionary::new();
        if experimental {
            opts.set("strict", "experimental");
        }
        for (key, value) in &config.options {
            opts.set(key, value);
        }

        let encoder = encoder.open_with(opts).map_err(|e| {
            Error::config(format!(
                "failed to open {name} with sample format {sample_format}: {e}"
            ))
        })?;

        let resolved = AudioStreamConfig {
            codec: codec_id,
            encoder: name,
            sample_format,
            channels,
            sample_rate,
            frame_size: audio_frame_size(codec_id, encoder.frame_size()),
            planar: sample_format.is_planar(),
            resample: needs_resampler(input, sample_format, channels, sample_rate),
            bitrate,
            time_base,
            warnings,
        };
        info!(
            encoder = %resolved.encoder,
            sample_format = %resolved.sample_format,
            channels = resolved.channels.channels(),
            sample_rate = resolved.sample_rate,
            frame_size = resolved.frame_size,
            resample = resolved.resample,
            "opened audio encoder"
        );

        Ok((
            Self {
                encoder,
                time_base,
                config: resolved.clone(),
            },
            resolved,
        ))
    }

    /**
        Codec parameters for the container stream.
    */
    pub fn parameters(&self) -> Parameters {
        Parameters::from(&self.encoder)
    }

    /**
        Samples per frame the encoder expects, 0 if any size is accepted.
    */
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    fn to_ffmpeg(&self, frame: &AudioFrame) -> Result<AudioFrameFFmpeg> {
        if frame.format != self.config.sample_format
            || frame.channels != self.config.channels
            || frame.sample_rate != self.config.sample_rate
        {
            return Err(Error::invalid_data(format!(
                "frame is {} ch {} at {} Hz, encoder expects {} ch {} at {} Hz",
                frame.channels.channels(),
                frame.format,
                frame.sample_rate,
                self.config.channels.channels(),
                self.config.sample_format,
                self.config.sample_rate
            )));
        }

        let mut ffmpeg_frame = AudioFrameFFmpeg::new(
            sample_format_to_ffmpeg(frame.format),
            frame.samples,
            channel_layout_to_ffmpeg(frame.channels),
        );
        ffmpeg_frame.set_rate(frame.sample_rate);
        copy_samples_to_ffmpeg(
            &mut ffmpeg_frame,
            &frame.data,
            frame.format,
            frame.channels.channels() as usize,
            frame.samples,
        )?;
        ffmpeg_frame.set_pts(frame.pts.map(|p| p.0));
        unsafe {
            (*ffmpeg_frame.as_mut_ptr()).duration = frame.duration.0;
        }
        Ok(ffmpeg_frame)
    }
}

impl Encoder for AudioEncoder {
    type Frame = AudioFrame;

    fn stream_type(&self) -> StreamType {
        StreamType::Audio
    }

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn push(&mut self, frame: Option<&AudioFrame>) -> Result<Vec<Packet>> {
        match frame {
            Some(frame) => {
                let ffmpeg_frame = self.to_ffmpeg(frame)?;
                self.encoder
                    .send_frame(&ffmpeg_frame)
                    .map_err(|e| Error::codec(format!("audio encoder rejected frame: {e}")))?;
            }
            None => self
                .encoder
                .send_eof()
                .map_err(|e| Error::codec(format!("audio encoder rejected flush: {e}")))?,
        }
        receive_packets(&mut self.encoder, self.time_base, StreamType::Audio)
    }
}

impl std::fmt::Debug for AudioEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEncoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
