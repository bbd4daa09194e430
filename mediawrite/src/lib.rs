/*!
    Write raw video frames and audio buffers into a media container.

    A [`WriteSession`] owns everything needed to produce one file: the
    container, a negotiated encoder per stream, the pixel converter, and
    the resampler and FIFO that cut caller audio into encoder-sized frames.

    ```ignore
    use mediawrite::{WriteInfo, WriteOptions, WriteSession};
    use ffmpeg_types::{AudioInfo, PixelFormat, Rational, RationalTime, SampleFormat, VideoInfo};

    let info = WriteInfo::video(VideoInfo::new(1920, 1080, PixelFormat::Rgba, Rational::new(24, 1)))
        .with_audio(AudioInfo::new(2, SampleFormat::F32, 48000));
    let options = WriteOptions::default().with_profile(VideoProfile::ProResHq);

    let mut session = WriteSession::new("out.mov", info, options)?;
    for (index, image) in images.enumerate() {
        session.write_video(RationalTime::new(index as f64, 24.0), &image)?;
    }
    let report = session.finish()?;
    ```

    Codec, pixel format, sample format and sample rate fall back to the
    closest thing the encoder supports; each fallback is logged and
    recorded in [`WriteSession::video_config`] and
    [`WriteSession::audio_config`].
*/

pub mod mux;
pub mod timecode;

mod audio;
mod error;
mod options;
mod session;
mod video;

pub use audio::AudioStreamWriter;
pub use error::{WriteError, WriteResult};
pub use options::WriteOptions;
pub use session::{FinishReport, SessionState, WriteInfo, WriteSession};
pub use video::VideoStreamWriter;

pub use ffmpeg_encode::{
    AudioStreamConfig, ColorOverrides, NegotiationWarning, VideoProfile, VideoStreamConfig,
};
