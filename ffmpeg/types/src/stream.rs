/*!
    Stream descriptions supplied when a write session is created.
*/

use crate::{Error, PixelFormat, Rational, RationalTime, Result, SampleFormat};

/**
    Description of the video a caller will write.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the images passed to the writer.
    pub pixel_format: PixelFormat,
    /// Nominal frame rate.
    pub frame_rate: Rational,
    /// Time of the first frame, subtracted from every frame time.
    pub start_time: RationalTime,
}

impl VideoInfo {
    /**
        Create video info starting at time zero.
    */
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, frame_rate: Rational) -> Self {
        Self {
            width,
            height,
            pixel_format,
            frame_rate,
            start_time: RationalTime::zero(frame_rate.to_f64()),
        }
    }

    pub fn with_start_time(mut self, start_time: RationalTime) -> Self {
        self.start_time = start_time;
        self
    }

    /**
        Returns the frame rate as fps.
    */
    pub fn fps(&self) -> f64 {
        self.frame_rate.to_f64()
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::config(format!(
                "video size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !self.frame_rate.is_positive() {
            return Err(Error::config(format!(
                "frame rate {} is not positive",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

/**
    Description of the audio a caller will write.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioInfo {
    /// Channel count.
    pub channels: u16,
    /// Sample format of the buffers passed to the writer.
    pub sample_format: SampleFormat,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioInfo {
    pub fn new(channels: u16, sample_format: SampleFormat, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_format,
            sample_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::config("audio has no channels"));
        }
        if self.sample_rate == 0 {
            return Err(Error::config("audio sample rate is zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_info_defaults_start_at_zero() {
        let info = VideoInfo::new(1920, 1080, PixelFormat::Rgba, Rational::new(24000, 1001));
        assert_eq!(info.start_time.value, 0.0);
        assert!((info.fps() - 23.976).abs() < 0.001);
        assert!(info.validate().is_ok());
    }

    #[test]
    fn video_info_validation() {
        let info = VideoInfo::new(0, 1080, PixelFormat::Rgba, Rational::new(24, 1));
        assert!(info.validate().unwrap_err().is_config());
        let info = VideoInfo::new(16, 16, PixelFormat::Rgba, Rational::new(0, 1));
        assert!(info.validate().is_err());
    }

    #[test]
    fn audio_info_validation() {
        assert!(AudioInfo::new(2, SampleFormat::F32, 48000).validate().is_ok());
        assert!(AudioInfo::new(0, SampleFormat::F32, 48000).validate().is_err());
        assert!(AudioInfo::new(2, SampleFormat::F32, 0).validate().is_err());
    }
}
