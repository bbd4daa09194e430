/*!
    Conversions between the shared types and FFmpeg's types.
*/

use ffmpeg_next::{
    ChannelLayout as FFmpegChannelLayout,
    format::{Pixel, Sample, sample::Type as SampleType},
    util::frame::audio::Audio as AudioFrameFFmpeg,
};

use ffmpeg_types::{ChannelLayout, Error, PixelFormat, Result, SampleFormat};

/**
    Convert our PixelFormat to FFmpeg's Pixel format.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::Gray8 => Pixel::GRAY8,
        PixelFormat::Gray16le => Pixel::GRAY16LE,
        PixelFormat::Ya8 => Pixel::YA8,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Rgb48le => Pixel::RGB48LE,
        PixelFormat::Rgba64le => Pixel::RGBA64LE,
        PixelFormat::Gbrp10le => Pixel::GBRP10LE,
        PixelFormat::Gbrp12le => Pixel::GBRP12LE,
        PixelFormat::Gbrap12le => Pixel::GBRAP12LE,
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuva420p => Pixel::YUVA420P,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuv420p10le => Pixel::YUV420P10LE,
        PixelFormat::Yuv422p10le => Pixel::YUV422P10LE,
        PixelFormat::Yuv444p10le => Pixel::YUV444P10LE,
        PixelFormat::Yuva444p10le => Pixel::YUVA444P10LE,
        PixelFormat::Yuv420p12le => Pixel::YUV420P12LE,
        PixelFormat::Yuv422p12le => Pixel::YUV422P12LE,
        PixelFormat::Yuv444p12le => Pixel::YUV444P12LE,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::P010le => Pixel::P010LE,
    }
}

/**
    Convert FFmpeg's Pixel format to ours, if we model it.
*/
pub fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    PixelFormat::ALL
        .into_iter()
        .find(|ours| pixel_format_to_ffmpeg(*ours) == format)
}

/**
    Convert our SampleFormat to FFmpeg's Sample format.
*/
pub fn sample_format_to_ffmpeg(format: SampleFormat) -> Sample {
    match format {
        SampleFormat::U8 => Sample::U8(SampleType::Packed),
        SampleFormat::S16 => Sample::I16(SampleType::Packed),
        SampleFormat::S32 => Sample::I32(SampleType::Packed),
        SampleFormat::F32 => Sample::F32(SampleType::Packed),
        SampleFormat::F64 => Sample::F64(SampleType::Packed),
        SampleFormat::U8Planar => Sample::U8(SampleType::Planar),
        SampleFormat::S16Planar => Sample::I16(SampleType::Planar),
        SampleFormat::S32Planar => Sample::I32(SampleType::Planar),
        SampleFormat::F32Planar => Sample::F32(SampleType::Planar),
        SampleFormat::F64Planar => Sample::F64(SampleType::Planar),
    }
}

/**
    Convert FFmpeg's Sample format to ours.
*/
pub fn sample_format_from_ffmpeg(format: Sample) -> Option<SampleFormat> {
    let planar = matches!(
        format,
        Sample::U8(SampleType::Planar)
            | Sample::I16(SampleType::Planar)
            | Sample::I32(SampleType::Planar)
            | Sample::F32(SampleType::Planar)
            | Sample::F64(SampleType::Planar)
    );
    let packed = match format {
        Sample::U8(_) => SampleFormat::U8,
        Sample::I16(_) => SampleFormat::S16,
        Sample::I32(_) => SampleFormat::S32,
        Sample::F32(_) => SampleFormat::F32,
        Sample::F64(_) => SampleFormat::F64,
        _ => return None,
    };
    Some(if planar { packed.to_planar() } else { packed })
}

/**
    Convert our ChannelLayout to FFmpeg's ChannelLayout.
*/
pub fn channel_layout_to_ffmpeg(layout: ChannelLayout) -> FFmpegChannelLayout {
    match layout {
        ChannelLayout::Mono => FFmpegChannelLayout::MONO,
        ChannelLayout::Stereo => FFmpegChannelLayout::STEREO,
        ChannelLayout::Surround2_1 => FFmpegChannelLayout::_2POINT1,
        ChannelLayout::Quad => FFmpegChannelLayout::QUAD,
        ChannelLayout::Surround5_0 => FFmpegChannelLayout::_5POINT0,
        ChannelLayout::Surround5_1 => FFmpegChannelLayout::_5POINT1,
        ChannelLayout::Surround6_1 => FFmpegChannelLayout::_6POINT1,
        ChannelLayout::Surround7_1 => FFmpegChannelLayout::_7POINT1,
    }
}

/**
    Bytes of one plane for `samples` samples per channel.
*/
fn plane_bytes(format: SampleFormat, channels: usize, samples: usize) -> usize {
    if format.is_planar() {
        samples * format.bytes_per_sample()
    } else {
        samples * channels * format.bytes_per_sample()
    }
}

/**
    Copy concatenated-plane sample data into an allocated FFmpeg audio frame.
*/
pub fn copy_samples_to_ffmpeg(
    dst: &mut AudioFrameFFmpeg,
    data: &[u8],
    format: SampleFormat,
    channels: usize,
    samples: usize,
) -> Result<()> {
    let plane_count = if format.is_planar() { channels } else { 1 };
    let plane_len = plane_bytes(format, channels, samples);
    if data.len() < plane_len * plane_count {
        return Err(Error::invalid_data(format!(
            "audio data too small: {} < {}",
            data.len(),
            plane_len * plane_count
        )));
    }

    for plane in 0..plane_count {
        let dst_data = dst.data_mut(plane);
        if dst_data.len() < plane_len {
            return Err(Error::invalid_data(format!(
                "destination buffer too small: {} < {}",
                dst_data.len(),
                plane_len
            )));
        }
        dst_data[..plane_len].copy_from_slice(&data[plane * plane_len..(plane + 1) * plane_len]);
    }
    Ok(())
}

/**
    Copy the samples of an FFmpeg audio frame into a buffer of
    concatenated planes.
*/
pub fn copy_samples_from_ffmpeg(
    src: &AudioFrameFFmpeg,
    format: SampleFormat,
    channels: usize,
) -> Vec<u8> {
    let plane_count = if format.is_planar() { channels } else { 1 };
    let plane_len = plane_bytes(format, channels, src.samples());
    let mut output = Vec::with_capacity(plane_len * plane_count);
    for plane in 0..plane_count {
        output.extend_from_slice(&src.data(plane)[..plane_len]);
    }
    output
}
