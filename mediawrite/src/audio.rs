/*!
    Audio stream writer.
*/

use tracing::{debug, warn};

use ffmpeg_encode::{AudioStreamConfig, Encoder};
use ffmpeg_sink::PacketSink;
use ffmpeg_transform::{AudioFifo, Resampler, ResamplerConfig};
use ffmpeg_types::{
    AudioBuffer, AudioFrame, AudioInfo, ChannelLayout, Error, MediaDuration, Pts, Rational,
    Result, TimeRange,
};

use crate::mux::encode_and_write;

/**
    Buffers caller audio and feeds the encoder frames of exactly its frame
    size.

    Caller buffers go through an optional resampler into a FIFO in the
    encoder's sample format. After every write the FIFO holds fewer than
    `frame_size` samples; the remainder goes out as one shorter frame when
    the stream is finished. Encoders that take any frame size get the
    whole FIFO on every write.
*/
pub struct AudioStreamWriter<E> {
    encoder: E,
    input: AudioInfo,
    resampler: Option<Resampler>,
    fifo: AudioFifo,
    frame_size: usize,
    sample_rate: u32,
    channels: ChannelLayout,
    time_base: Rational,
    /// Start of the first buffer, in output samples
    offset: Option<i64>,
    /// Caller samples received, at the input rate
    received: u64,
    /// Samples handed to the encoder, the pts of the next frame
    encoded: i64,
    packets: u64,
    flushed: bool,
}

impl<E> AudioStreamWriter<E>
where
    E: Encoder<Frame = AudioFrame>,
{
    /**
        Create a writer for audio described by `input` feeding an encoder
        opened with `config`.
    */
    pub fn new(encoder: E, input: AudioInfo, config: &AudioStreamConfig) -> Result<Self> {
        let resampler = if config.resample {
            Some(Resampler::new(ResamplerConfig {
                src_rate: input.sample_rate,
                src_channels: ChannelLayout::from_count(input.channels),
                src_format: input.sample_format,
                dst_rate: config.sample_rate,
                dst_channels: config.channels,
                dst_format: config.sample_format,
            })?)
        } else {
            None
        };

        Ok(Self {
            encoder,
            input,
            resampler,
            fifo: AudioFifo::new(config.sample_format, config.channels.channels()),
            frame_size: config.frame_size,
            sample_rate: config.sample_rate,
            channels: config.channels,
            time_base: config.time_base,
            offset: None,
            received: 0,
            encoded: 0,
            packets: 0,
            flushed: false,
        })
    }

    /**
        Check that a buffer matches the stream description.
    */
    pub fn check(&self, buffer: &AudioBuffer) -> Result<()> {
        buffer.validate()?;
        if buffer.channels != self.input.channels
            || buffer.format != self.input.sample_format
            || buffer.sample_rate != self.input.sample_rate
        {
            return Err(Error::invalid_data(format!(
                "buffer is {} ch {} at {} Hz, stream expects {} ch {} at {} Hz",
                buffer.channels,
                buffer.format,
                buffer.sample_rate,
                self.input.channels,
                self.input.sample_format,
                self.input.sample_rate
            )));
        }
        Ok(())
    }

    /**
        Queue a buffer that starts at `range.start` and encode every full
        frame now available.

        Buffers are always appended. A start time that does not line up
        with what has been received so far is logged and otherwise
        ignored.
    */
    pub fn write<S: PacketSink + ?Sized>(
        &mut self,
        range: TimeRange,
        buffer: &AudioBuffer,
        sink: &mut S,
    ) -> Result<()> {
        self.track_start(range);
        self.received += buffer.samples as u64;

        match &mut self.resampler {
            Some(resampler) => {
                let frame = resampler.convert(buffer)?;
                self.fifo.push(&frame.data, frame.format, frame.samples)?;
            }
            None => self.fifo.push(&buffer.data, buffer.format, buffer.samples)?,
        }

        self.drain(sink, false)
    }

    fn track_start(&mut self, range: TimeRange) {
        let start = range.start.to_units(self.sample_rate as f64);
        let Some(offset) = self.offset else {
            debug!(offset = start, "audio starts");
            self.offset = Some(start);
            return;
        };

        let expected = offset
            + Rational::rescale(
                self.received as i64,
                Rational::new(1, self.input.sample_rate as i32),
                self.time_base,
            );
        if start != expected {
            warn!(
                expected,
                start,
                gap = start - expected,
                "audio buffer is not contiguous, appending anyway"
            );
        }
    }

    fn drain<S: PacketSink + ?Sized>(&mut self, sink: &mut S, last: bool) -> Result<()> {
        loop {
            let available = self.fifo.len();
            let take = if self.frame_size == 0 || (last && available < self.frame_size) {
                available
            } else if available >= self.frame_size {
                self.frame_size
            } else {
                0
            };
            if take == 0 {
                return Ok(());
            }

            let (samples, data) = self.fifo.pop(take);
            let frame = AudioFrame {
                data,
                samples,
                sample_rate: self.sample_rate,
                channels: self.channels,
                format: self.fifo.format(),
                pts: Some(Pts(self.encoded)),
                duration: MediaDuration(samples as i64),
                time_base: self.time_base,
            };
            if last && self.frame_size > 0 && samples < self.frame_size {
                debug!(samples, frame_size = self.frame_size, "encoding short final frame");
            }
            self.packets += encode_and_write(&mut self.encoder, Some(&frame), sink)? as u64;
            self.encoded += samples as i64;
        }
    }

    /**
        Encode everything still buffered, then flush the encoder. Does
        nothing after the first call.
    */
    pub fn finish<S: PacketSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;

        if let Some(resampler) = &mut self.resampler
            && let Some(tail) = resampler.flush()?
        {
            self.fifo.push(&tail.data, tail.format, tail.samples)?;
        }
        self.drain(sink, true)?;
        self.packets += encode_and_write(&mut self.encoder, None, sink)? as u64;
        debug!(samples = self.encoded, packets = self.packets, "flushed audio");
        Ok(())
    }

    /**
        Samples waiting in the FIFO.
    */
    pub fn buffered(&self) -> usize {
        self.fifo.len()
    }

    pub fn samples_encoded(&self) -> u64 {
        self.encoded as u64
    }

    pub fn packets_written(&self) -> u64 {
        self.packets
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mux::testing::{MemorySink, MockEncoder};
    use ffmpeg_types::{CodecId, RationalTime, SampleFormat, StreamType};

    fn config(frame_size: usize, format: SampleFormat, resample: bool) -> AudioStreamConfig {
        AudioStreamConfig {
            codec: CodecId::Aac,
            encoder: "mock".to_string(),
            sample_format: format,
            channels: ChannelLayout::Stereo,
            sample_rate: 48000,
            frame_size,
            planar: format.is_planar(),
            resample,
            bitrate: None,
            time_base: Rational::new(1, 48000),
            warnings: Vec::new(),
        }
    }

    fn writer(
        input: AudioInfo,
        config: &AudioStreamConfig,
    ) -> AudioStreamWriter<MockEncoder<AudioFrame, (i64, usize)>> {
        let encoder = MockEncoder {
            stream_type: StreamType::Audio,
            time_base: Rational::new(1, 48000),
            record: |f: &AudioFrame| (f.pts.map_or(-1, |p| p.0), f.samples),
            pts: |f: &AudioFrame| f.pts.map(|p| p.0),
            frames: Vec::new(),
            flushes: 0,
            fail: false,
        };
        AudioStreamWriter::new(encoder, input, config).unwrap()
    }

    fn chunk(samples: usize) -> AudioBuffer {
        AudioBuffer::from_f32(2, 48000, &vec![0.25; samples * 2]).unwrap()
    }

    fn range(start: i64, samples: usize) -> TimeRange {
        TimeRange::new(
            RationalTime::new(start as f64, 48000.0),
            RationalTime::new(samples as f64, 48000.0),
        )
    }

    #[test]
    fn small_chunks_fill_whole_frames() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        let config = config(1024, SampleFormat::F32Planar, false);
        let mut writer = writer(input, &config);
        let mut sink = MemorySink::default();

        let mut start = 0;
        for _ in 0..100 {
            writer.write(range(start, 37), &chunk(37), &mut sink).unwrap();
            start += 37;
            assert!(writer.buffered() < 1024);
        }

        // 3700 samples make three full frames with 628 left over
        let frames = &writer.encoder().frames;
        assert_eq!(frames, &[(0, 1024), (1024, 1024), (2048, 1024)]);
        assert_eq!(writer.buffered(), 3700 - 3 * 1024);
        assert_eq!(sink.packets.len(), 3);
    }

    #[test]
    fn finish_writes_one_short_frame() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        let config = config(1024, SampleFormat::F32Planar, false);
        let mut writer = writer(input, &config);
        let mut sink = MemorySink::default();

        writer.write(range(0, 1500), &chunk(1500), &mut sink).unwrap();
        writer.finish(&mut sink).unwrap();
        writer.finish(&mut sink).unwrap();

        assert_eq!(writer.encoder().frames, [(0, 1024), (1024, 476)]);
        assert_eq!(writer.encoder().flushes, 1);
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.samples_encoded(), 1500);
    }

    #[test]
    fn variable_frame_size_empties_fifo() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        let config = config(0, SampleFormat::F32, false);
        let mut writer = writer(input, &config);
        let mut sink = MemorySink::default();

        writer.write(range(0, 37), &chunk(37), &mut sink).unwrap();
        writer.write(range(37, 100), &chunk(100), &mut sink).unwrap();
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.encoder().frames, [(0, 37), (37, 100)]);
    }

    #[test]
    fn gaps_are_appended() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        let config = config(0, SampleFormat::F32, false);
        let mut writer = writer(input, &config);
        let mut sink = MemorySink::default();

        writer.write(range(48000, 10), &chunk(10), &mut sink).unwrap();
        // Starts 90 samples late, still encoded right after the first buffer
        writer.write(range(48100, 10), &chunk(10), &mut sink).unwrap();
        assert_eq!(writer.encoder().frames, [(0, 10), (10, 10)]);
    }

    #[test]
    fn resampled_input_reaches_encoder_format() {
        let input = AudioInfo::new(2, SampleFormat::S16, 44100);
        let config = config(1024, SampleFormat::F32Planar, true);
        let mut writer = writer(input, &config);
        let mut sink = MemorySink::default();

        let buffer = AudioBuffer::from_i16(2, 44100, &vec![1000; 4410 * 2]).unwrap();
        assert!(writer.check(&buffer).is_ok());
        writer.write(range(0, 4410), &buffer, &mut sink).unwrap();
        writer.finish(&mut sink).unwrap();

        let frames = &writer.encoder().frames;
        assert!(frames.len() >= 4);
        assert!(frames[..frames.len() - 1].iter().all(|&(_, n)| n == 1024));
        let total: usize = frames.iter().map(|&(_, n)| n).sum();
        // 0.1 s at 48 kHz, give or take the resampler's filter delay
        assert!((4700..=4900).contains(&total), "{total}");
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        let config = config(1024, SampleFormat::F32, false);
        let writer = writer(input, &config);
        let mono = AudioBuffer::from_f32(1, 48000, &[0.0; 10]).unwrap();
        assert!(writer.check(&mono).is_err());
    }
}
