/*!
    Video stream writer.
*/

use ffmpeg_next::util::frame::video::Video as VideoFrameFFmpeg;
use tracing::{debug, warn};

use ffmpeg_encode::{Encoder, VideoStreamConfig, hdr};
use ffmpeg_sink::PacketSink;
use ffmpeg_transform::{ColorDetails, PixelConverter, PixelConverterConfig};
use ffmpeg_types::{Error, HdrMetadata, Image, RationalTime, Result, VideoInfo};

use crate::mux::encode_and_write;

/**
    Converts caller images into the encoder's pixel format and pushes them
    through the encoder.

    The encode frame is allocated once and reused for every image. Frame
    times are counted in frames of the source rate, so an encoder opened at
    another rate plays the same frames faster or slower.
*/
pub struct VideoStreamWriter<E> {
    encoder: E,
    converter: PixelConverter,
    frame: VideoFrameFFmpeg,
    fps: f64,
    start_time: RationalTime,
    pending_hdr: Option<HdrMetadata>,
    frames: u64,
    packets: u64,
    flushed: bool,
}

impl<E> VideoStreamWriter<E>
where
    E: Encoder<Frame = VideoFrameFFmpeg>,
{
    /**
        Create a writer for images described by `source` feeding an encoder
        opened with `config`.
    */
    pub fn new(encoder: E, config: &VideoStreamConfig, source: &VideoInfo) -> Result<Self> {
        let color = ColorDetails::for_source(
            source.pixel_format,
            config.color.range,
            config.color.space,
        );
        let converter = PixelConverter::new(
            PixelConverterConfig::new(
                source.pixel_format,
                config.pixel_format,
                config.width,
                config.height,
            )
            .with_color(color),
        )?;
        let frame = converter.alloc_output();
        Ok(Self {
            encoder,
            converter,
            frame,
            fps: source.frame_rate.to_f64(),
            start_time: config.start_time,
            pending_hdr: None,
            frames: 0,
            packets: 0,
            flushed: false,
        })
    }

    /**
        Check that an image matches the stream description.
    */
    pub fn check(&self, image: &Image) -> Result<()> {
        image.validate()?;
        let expected = self.converter.config();
        let info = &image.info;
        if info.width != expected.width
            || info.height != expected.height
            || info.format != expected.src_format
        {
            return Err(Error::invalid_data(format!(
                "image is {}x{} {}, stream expects {}x{} {}",
                info.width,
                info.height,
                info.format,
                expected.width,
                expected.height,
                expected.src_format
            )));
        }
        Ok(())
    }

    /**
        Frame index of `time` at the source rate, relative to the stream
        start.
    */
    pub fn frame_pts(&self, time: RationalTime) -> i64 {
        (time - self.start_time).to_units(self.fps)
    }

    /**
        Convert and encode one image presented at `time`.
    */
    pub fn write<S: PacketSink + ?Sized>(
        &mut self,
        time: RationalTime,
        image: &Image,
        sink: &mut S,
    ) -> Result<()> {
        if let Some(hdr) = image.hdr() {
            match hdr {
                Ok(hdr) => self.pending_hdr = Some(hdr),
                Err(e) => warn!(error = %e, "ignoring malformed hdr tag"),
            }
        }

        self.converter.convert(image, &mut self.frame)?;

        match self.pending_hdr.take() {
            Some(hdr) => {
                debug!(max_cll = hdr.max_cll, max_fall = hdr.max_fall, "attaching hdr metadata");
                hdr::attach(&mut self.frame, &hdr)?;
            }
            None => hdr::clear(&mut self.frame),
        }

        let pts = self.frame_pts(time);
        self.frame.set_pts(Some(pts));

        self.packets += encode_and_write(&mut self.encoder, Some(&self.frame), sink)? as u64;
        self.frames += 1;
        Ok(())
    }

    /**
        Flush the encoder. Does nothing after the first call.
    */
    pub fn finish<S: PacketSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        if self.flushed {
            return Ok(());
        }
        self.flushed = true;
        self.packets += encode_and_write(&mut self.encoder, None, sink)? as u64;
        debug!(frames = self.frames, packets = self.packets, "flushed video");
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn packets_written(&self) -> u64 {
        self.packets
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}
