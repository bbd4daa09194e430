/*!
    Caller-supplied media and encoder-sized audio frames.
*/

use crate::{
    ChannelLayout, Error, HDR_TAG, HdrMetadata, MediaDuration, PixelFormat, Pts, Rational, Result,
    SampleFormat, Tags,
};

/**
    Memory layout of an image buffer.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageLayout {
    /// Rows are stored last row first
    pub bottom_up: bool,
    /// Row alignment in bytes, each plane row starts on a multiple of this
    pub alignment: usize,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            bottom_up: false,
            alignment: 1,
        }
    }
}

/**
    Position of one plane inside an image buffer.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Byte offset of the first stored row
    pub offset: usize,
    /// Distance in bytes between consecutive stored rows
    pub stride: usize,
    /// Bytes of pixel data in one row
    pub row_bytes: usize,
    /// Number of rows
    pub rows: usize,
}

/**
    Size, pixel type and layout of an image.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub layout: ImageLayout,
}

impl ImageInfo {
    /**
        Create image info with the default (top-down, unaligned) layout.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            layout: ImageLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ImageLayout) -> Self {
        self.layout = layout;
        self
    }

    /**
        Planes in storage order, each one directly following the previous.
    */
    pub fn plane_layout(&self) -> Vec<PlaneLayout> {
        let alignment = self.layout.alignment.max(1);
        let mut offset = 0;
        self.format
            .planes(self.width, self.height)
            .into_iter()
            .map(|shape| {
                let stride = shape.row_bytes.div_ceil(alignment) * alignment;
                let plane = PlaneLayout {
                    offset,
                    stride,
                    row_bytes: shape.row_bytes,
                    rows: shape.rows,
                };
                offset += stride * shape.rows;
                plane
            })
            .collect()
    }

    /**
        Total number of bytes a buffer for this image must hold.
    */
    pub fn expected_len(&self) -> usize {
        self.plane_layout()
            .iter()
            .map(|p| p.stride * p.rows)
            .sum()
    }
}

/**
    A raw image handed to the writer.

    Planar formats store their planes back to back, in FFmpeg plane order.
*/
#[derive(Clone, Debug)]
pub struct Image {
    pub info: ImageInfo,
    pub data: Vec<u8>,
    /// Free-form tags, the `"hdr"` tag carries a JSON [`HdrMetadata`] record
    pub tags: Tags,
}

impl Image {
    /**
        Create an image, checking that the buffer is large enough.
    */
    pub fn new(info: ImageInfo, data: Vec<u8>) -> Result<Self> {
        let image = Self {
            info,
            data,
            tags: Tags::new(),
        };
        image.validate()?;
        Ok(image)
    }

    /**
        Check dimensions and buffer size against the image info.
    */
    pub fn validate(&self) -> Result<()> {
        if self.info.width == 0 || self.info.height == 0 {
            return Err(Error::invalid_data(format!(
                "image has empty dimensions {}x{}",
                self.info.width, self.info.height
            )));
        }
        let expected = self.info.expected_len();
        if self.data.len() < expected {
            return Err(Error::invalid_data(format!(
                "{}x{} {} image needs {expected} bytes, got {}",
                self.info.width,
                self.info.height,
                self.info.format,
                self.data.len()
            )));
        }
        Ok(())
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /**
        Parse the `"hdr"` tag, if present.
    */
    pub fn hdr(&self) -> Option<Result<HdrMetadata>> {
        self.tag(HDR_TAG).map(HdrMetadata::from_json)
    }
}

/**
    A chunk of raw audio handed to the writer.

    Packed formats interleave channels sample by sample, planar formats
    store one plane per channel back to back.
*/
#[derive(Clone, Debug)]
pub struct AudioBuffer {
    pub channels: u16,
    pub format: SampleFormat,
    pub sample_rate: u32,
    /// Samples per channel
    pub samples: usize,
    pub data: Vec<u8>,
}

impl AudioBuffer {
    /**
        Create a buffer, checking that the data length matches.
    */
    pub fn new(
        channels: u16,
        format: SampleFormat,
        sample_rate: u32,
        samples: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        let buffer = Self {
            channels,
            format,
            sample_rate,
            samples,
            data,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /**
        Create an interleaved F32 buffer from samples.
    */
    pub fn from_f32(channels: u16, sample_rate: u32, interleaved: &[f32]) -> Result<Self> {
        let per_channel = interleaved.len() / channels.max(1) as usize;
        let data = interleaved.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(channels, SampleFormat::F32, sample_rate, per_channel, data)
    }

    /**
        Create an interleaved S16 buffer from samples.
    */
    pub fn from_i16(channels: u16, sample_rate: u32, interleaved: &[i16]) -> Result<Self> {
        let per_channel = interleaved.len() / channels.max(1) as usize;
        let data = interleaved.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::new(channels, SampleFormat::S16, sample_rate, per_channel, data)
    }

    pub fn expected_len(&self) -> usize {
        self.samples * self.channels as usize * self.format.bytes_per_sample()
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.sample_rate == 0 {
            return Err(Error::invalid_data(format!(
                "audio buffer with {} channels at {} Hz",
                self.channels, self.sample_rate
            )));
        }
        if self.data.len() != self.expected_len() {
            return Err(Error::invalid_data(format!(
                "{} samples x {} channels of {} need {} bytes, got {}",
                self.samples,
                self.channels,
                self.format,
                self.expected_len(),
                self.data.len()
            )));
        }
        Ok(())
    }
}

/**
    An audio frame sized for an encoder.

    Planar formats store `channels` planes of `samples * bytes_per_sample`
    bytes back to back.
*/
#[derive(Clone, Debug)]
pub struct AudioFrame {
    /**
        Raw sample data as bytes.

        For interleaved stereo F32: [L0, R0, L1, R1, ...]
    */
    pub data: Vec<u8>,
    /**
        Number of samples per channel.
    */
    pub samples: usize,
    /**
        Sample rate in Hz.
    */
    pub sample_rate: u32,
    /**
        Channel layout.
    */
    pub channels: ChannelLayout,
    /**
        Sample format.
    */
    pub format: SampleFormat,
    /**
        Presentation timestamp.
    */
    pub pts: Option<Pts>,
    /**
        Duration in time_base units.
    */
    pub duration: MediaDuration,
    /**
        Time base for interpreting the PTS.
    */
    pub time_base: Rational,
}

impl AudioFrame {
    /**
        Returns the total number of samples (samples per channel * channels).
    */
    pub fn total_samples(&self) -> usize {
        self.samples * self.channels.channels() as usize
    }

    /**
        Returns the expected data length in bytes.
    */
    pub fn expected_data_len(&self) -> usize {
        self.total_samples() * self.format.bytes_per_sample()
    }

    /**
        Number of planes, one per channel for planar formats.
    */
    pub fn plane_count(&self) -> usize {
        if self.format.is_planar() {
            self.channels.channels() as usize
        } else {
            1
        }
    }

    /**
        Bytes of a single plane.
    */
    pub fn plane(&self, index: usize) -> &[u8] {
        let len = self.data.len() / self.plane_count();
        &self.data[index * len..(index + 1) * len]
    }
}

static_assertions::assert_impl_all!(Image: Send, Sync);
static_assertions::assert_impl_all!(AudioBuffer: Send, Sync);
static_assertions::assert_impl_all!(AudioFrame: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_image_size() {
        let info = ImageInfo::new(3, 2, PixelFormat::Rgb24);
        assert_eq!(info.expected_len(), 18);
        assert!(Image::new(info, vec![0; 18]).is_ok());
        assert!(Image::new(info, vec![0; 17]).is_err());
    }

    #[test]
    fn aligned_rows() {
        let info = ImageInfo::new(3, 2, PixelFormat::Rgb24).with_layout(ImageLayout {
            bottom_up: true,
            alignment: 4,
        });
        let planes = info.plane_layout();
        assert_eq!(planes[0].stride, 12);
        assert_eq!(planes[0].row_bytes, 9);
        assert_eq!(info.expected_len(), 24);
    }

    #[test]
    fn planar_offsets() {
        let info = ImageInfo::new(4, 4, PixelFormat::Yuv420p);
        let planes = info.plane_layout();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[1].offset, 16);
        assert_eq!(planes[2].offset, 20);
        assert_eq!(info.expected_len(), 24);
    }

    #[test]
    fn empty_image_rejected() {
        let info = ImageInfo::new(0, 4, PixelFormat::Gray8);
        assert!(Image::new(info, vec![]).is_err());
    }

    #[test]
    fn hdr_tag_parsing() {
        let info = ImageInfo::new(1, 1, PixelFormat::Gray8);
        let image = Image::new(info, vec![0]).unwrap();
        assert!(image.hdr().is_none());

        let image = image.with_tag(HDR_TAG, r#"{"maxCLL": 1000, "maxFALL": 400}"#);
        let hdr = image.hdr().unwrap().unwrap();
        assert_eq!(hdr.max_fall, 400.0);

        let image = image.with_tag(HDR_TAG, "oops");
        assert!(image.hdr().unwrap().is_err());
    }

    #[test]
    fn audio_buffer_validation() {
        let buffer = AudioBuffer::from_f32(2, 48000, &[0.0; 8]).unwrap();
        assert_eq!(buffer.samples, 4);
        assert_eq!(buffer.data.len(), 32);

        assert!(AudioBuffer::new(2, SampleFormat::S16, 48000, 4, vec![0; 15]).is_err());
        assert!(AudioBuffer::new(0, SampleFormat::S16, 48000, 0, vec![]).is_err());
    }

    #[test]
    fn audio_frame_planes() {
        let frame = AudioFrame {
            data: (0u8..16).collect(),
            samples: 2,
            sample_rate: 48000,
            channels: ChannelLayout::Stereo,
            format: SampleFormat::F32Planar,
            pts: Some(Pts(0)),
            duration: MediaDuration(2),
            time_base: Rational::new(1, 48000),
        };
        assert_eq!(frame.plane_count(), 2);
        assert_eq!(frame.plane(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(frame.expected_data_len(), 16);
    }
}
