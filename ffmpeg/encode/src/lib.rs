/*!
    Codec negotiation and encoding for the ffmpeg media writing crates.

    This crate turns raw frames into compressed packets. Opening an encoder
    is a negotiation: the requested profile or codec is mapped to a list of
    candidate encoders, and pixel format, sample format, channel layout and
    sample rate are resolved against what the chosen encoder declares.
    Every fallback taken along the way is recorded as a
    [`NegotiationWarning`] on the resolved stream config.

    # Video Encoding

    ```ignore
    use ffmpeg_encode::{Encoder, VideoEncoder, VideoEncoderConfig, VideoProfile};
    use ffmpeg_types::Rational;

    let config = VideoEncoderConfig::new(VideoProfile::ProResHq, 1920, 1080, Rational::new(24, 1));
    let (mut encoder, resolved) = VideoEncoder::open(&config)?;

    // Frames must already be in resolved.pixel_format
    let packets = encoder.push(Some(&frame))?;

    // Flush remaining packets
    let final_packets = encoder.push(None)?;
    ```

    # Audio Encoding

    ```ignore
    use ffmpeg_encode::{AudioEncoder, AudioEncoderConfig};
    use ffmpeg_types::{AudioInfo, ContainerFormat, SampleFormat};

    let config = AudioEncoderConfig::new(AudioInfo::new(2, SampleFormat::F32, 48000))
        .with_container(ContainerFormat::Mov);
    let (mut encoder, resolved) = AudioEncoder::open(&config)?;
    ```

    Frames handed to an audio encoder must match the resolved sample format,
    layout and rate, and hold exactly `frame_size` samples unless the
    encoder accepts any size. Use `ffmpeg-transform` to get there.

    # Hardware Encoding

    With [`VideoEncoderConfig::with_hw_accel`] the platform's hardware
    encoders (VideoToolbox, NVENC, Quick Sync, VA-API, AMF) are tried
    before the software ones. They are looked up by name at runtime, so no
    build features are involved.
*/

pub mod caps;
pub mod hdr;
pub mod negotiate;
pub mod preset;

mod audio;
mod config;
mod encoder;
mod video;

pub use audio::AudioEncoder;
pub use config::{
    AudioEncoderConfig, ColorOverrides, HwEncoder, Platform, VideoEncoderConfig, VideoProfile,
};
pub use encoder::Encoder;
pub use negotiate::{AudioStreamConfig, ColorSettings, NegotiationWarning, VideoStreamConfig};
pub use video::VideoEncoder;
