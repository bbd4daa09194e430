/*!
    Frame transformation for the ffmpeg media writing crates.

    This crate normalizes caller media into what an encoder expects:

    - [`PixelConverter`] wraps caller images without copying and scales them
      into an encoder frame, with explicit color range and matrix details.
    - [`Resampler`] converts sample rate, channel layout and sample format.
    - [`AudioFifo`] regroups arbitrarily sized audio chunks into
      encoder-sized frames, deinterleaving on the way in when needed.

    The [`convert`] module maps the shared types onto their FFmpeg
    counterparts.
*/

pub mod convert;

mod audio;
mod fifo;
mod video;

pub use audio::{Resampler, ResamplerConfig};
pub use fifo::AudioFifo;
pub use video::{ColorDetails, PixelConverter, PixelConverterConfig, ScalingAlgorithm};
