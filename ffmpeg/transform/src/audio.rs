/*!
    Audio resampling.
*/

use ffmpeg_next::{
    software::resampling::context::Context as ResamplerContext,
    util::frame::audio::Audio as AudioFrameFFmpeg,
};
use tracing::debug;

use ffmpeg_types::{
    AudioBuffer, AudioFrame, ChannelLayout, Error, MediaDuration, Rational, Result, SampleFormat,
};

use crate::convert::{
    channel_layout_to_ffmpeg, copy_samples_from_ffmpeg, copy_samples_to_ffmpeg,
    sample_format_to_ffmpeg,
};

/**
    Configuration for audio resampling.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResamplerConfig {
    /// Input sample rate in Hz.
    pub src_rate: u32,
    /// Input channel layout.
    pub src_channels: ChannelLayout,
    /// Input sample format.
    pub src_format: SampleFormat,
    /// Output sample rate in Hz.
    pub dst_rate: u32,
    /// Output channel layout.
    pub dst_channels: ChannelLayout,
    /// Output sample format.
    pub dst_format: SampleFormat,
}

/**
    Audio resampler.

    Converts buffers between sample rates, channel layouts and sample
    formats. Resampling is stateful: buffers must be passed in order, and
    [`Resampler::flush`] returns the delayed tail at end of stream.
*/
pub struct Resampler {
    config: ResamplerConfig,
    context: ResamplerContext,
}

impl Resampler {
    /**
        Create a new resampler.
    */
    pub fn new(config: ResamplerConfig) -> Result<Self> {
        let context = ResamplerContext::get(
            sample_format_to_ffmpeg(config.src_format),
            channel_layout_to_ffmpeg(config.src_channels),
            config.src_rate,
            sample_format_to_ffmpeg(config.dst_format),
            channel_layout_to_ffmpeg(config.dst_channels),
            config.dst_rate,
        )
        .map_err(|e| Error::codec(format!("failed to create resampler: {}", e)))?;

        debug!(
            src_rate = config.src_rate,
            src_channels = config.src_channels.channels(),
            src_format = %config.src_format,
            dst_rate = config.dst_rate,
            dst_channels = config.dst_channels.channels(),
            dst_format = %config.dst_format,
            "created resampler"
        );

        Ok(Self { config, context })
    }

    /**
        Get the resampler configuration.
    */
    pub fn config(&self) -> &ResamplerConfig {
        &self.config
    }

    /**
        Convert a buffer. The output may hold fewer or more samples than
        the input when the rates differ.
    */
    pub fn convert(&mut self, input: &AudioBuffer) -> Result<AudioFrame> {
        if input.format != self.config.src_format
            || input.sample_rate != self.config.src_rate
            || input.channels != self.config.src_channels.channels()
        {
            return Err(Error::invalid_data(format!(
                "buffer is {} ch {} at {} Hz, resampler expects {} ch {} at {} Hz",
                input.channels,
                input.format,
                input.sample_rate,
                self.config.src_channels.channels(),
                self.config.src_format,
                self.config.src_rate
            )));
        }
        if input.samples == 0 {
            return Ok(self.output_frame(Vec::new(), 0));
        }

        let mut src_frame = AudioFrameFFmpeg::new(
            sample_format_to_ffmpeg(input.format),
            input.samples,
            channel_layout_to_ffmpeg(self.config.src_channels),
        );
        src_frame.set_rate(input.sample_rate);
        copy_samples_to_ffmpeg(
            &mut src_frame,
            &input.data,
            input.format,
            input.channels as usize,
            input.samples,
        )?;

        // Room for the converted input plus whatever the resampler had buffered
        let buffered = self
            .context
            .delay()
            .map(|d| d.output.max(0) as usize)
            .unwrap_or(0);
        let output_samples = (input.samples as u64 * self.config.dst_rate as u64)
            .div_ceil(input.sample_rate as u64) as usize
            + buffered
            + 64;

        let mut dst_frame = self.alloc_output(output_samples);
        self.context
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| Error::codec(format!("resampling failed: {}", e)))?;

        let samples = dst_frame.samples();
        let data = copy_samples_from_ffmpeg(
            &dst_frame,
            self.config.dst_format,
            self.config.dst_channels.channels() as usize,
        );
        Ok(self.output_frame(data, samples))
    }

    /**
        Flush any samples still held by the resampler.

        Returns None if nothing is buffered.
    */
    pub fn flush(&mut self) -> Result<Option<AudioFrame>> {
        let delay_samples = self
            .context
            .delay()
            .map(|d| d.output.max(0) as usize)
            .unwrap_or(0);
        if delay_samples == 0 {
            return Ok(None);
        }

        let mut dst_frame = self.alloc_output(delay_samples);
        match self.context.flush(&mut dst_frame) {
            Ok(_) => {}
            Err(e) => {
                if dst_frame.samples() == 0 {
                    return Ok(None);
                }
                return Err(Error::codec(format!("resampler flush failed: {}", e)));
            }
        }

        let samples = dst_frame.samples();
        if samples == 0 {
            return Ok(None);
        }
        let data = copy_samples_from_ffmpeg(
            &dst_frame,
            self.config.dst_format,
            self.config.dst_channels.channels() as usize,
        );
        Ok(Some(self.output_frame(data, samples)))
    }

    fn alloc_output(&self, samples: usize) -> AudioFrameFFmpeg {
        let mut frame = AudioFrameFFmpeg::new(
            sample_format_to_ffmpeg(self.config.dst_format),
            samples,
            channel_layout_to_ffmpeg(self.config.dst_channels),
        );
        frame.set_rate(self.config.dst_rate);
        frame
    }

    fn output_frame(&self, data: Vec<u8>, samples: usize) -> AudioFrame {
        AudioFrame {
            data,
            samples,
            sample_rate: self.config.dst_rate,
            channels: self.config.dst_channels,
            format: self.config.dst_format,
            pts: None,
            duration: MediaDuration(samples as i64),
            time_base: Rational::new(1, self.config.dst_rate as i32),
        }
    }
}

impl std::fmt::Debug for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
