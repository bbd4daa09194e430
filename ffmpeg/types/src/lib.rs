/*!
    Shared types for the ffmpeg media writing crates.

    This crate defines the vocabulary that crosses crate boundaries: the
    values callers hand to a write session and the values passed between the
    converters, encoders and the container sink. It has no dependency on
    FFmpeg, so everything here can be unit tested without native libraries.

    # Core Types

    - [`Rational`] - Time bases and frame rates, with [`Rational::rescale`]
    - [`RationalTime`] and [`TimeRange`] - Caller-facing media times
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`Image`] and [`AudioBuffer`] - Caller-supplied media
    - [`AudioFrame`] - Encoder-sized audio frames
    - [`Packet`] - Encoded packet data

    # Format Types

    - [`PixelFormat`], [`SampleFormat`], [`ChannelLayout`]
    - [`ColorRange`], [`ColorPrimaries`], [`ColorTransfer`], [`ColorSpace`]
    - [`CodecId`], [`ContainerFormat`]

    # Metadata

    - [`HdrMetadata`] - Mastering display and content light levels
    - [`Tags`] - Ordered string metadata
*/

use std::collections::BTreeMap;

mod codec;
mod color;
mod container;
mod error;
mod format;
mod frame;
mod hdr;
mod packet;
mod rational;
mod stream;
mod time;
mod timestamp;

pub use codec::CodecId;
pub use color::{ColorPrimaries, ColorRange, ColorSpace, ColorTransfer};
pub use container::ContainerFormat;
pub use error::{Error, Result};
pub use format::{Chroma, ChannelLayout, ColorFamily, PixelFormat, PlaneShape, SampleFormat};
pub use frame::{AudioBuffer, AudioFrame, Image, ImageInfo, ImageLayout, PlaneLayout};
pub use hdr::{Chromaticity, DisplayPrimaries, HDR_TAG, HdrMetadata, LuminanceRange};
pub use packet::{Packet, StreamType};
pub use rational::Rational;
pub use stream::{AudioInfo, VideoInfo};
pub use time::{RationalTime, TimeRange};
pub use timestamp::{MediaDuration, Pts};

/**
    Ordered string metadata written into containers and streams.
*/
pub type Tags = BTreeMap<String, String>;
