/*!
    Encoder lookup and declared capabilities.
*/

use ffmpeg_next::{
    Codec,
    codec::Id as CodecIdFFmpeg,
    ffi,
    format::{Pixel, Sample},
};

use ffmpeg_transform::convert::{pixel_format_from_ffmpeg, sample_format_from_ffmpeg};
use ffmpeg_types::{ChannelLayout, CodecId, PixelFormat, SampleFormat};

use crate::negotiate::Candidate;

/**
    Convert our CodecId to FFmpeg's codec ID.
*/
pub fn codec_id_to_ffmpeg(codec: CodecId) -> CodecIdFFmpeg {
    match codec {
        CodecId::H264 => CodecIdFFmpeg::H264,
        CodecId::ProRes => CodecIdFFmpeg::PRORES,
        CodecId::DnxHd => CodecIdFFmpeg::DNXHD,
        CodecId::Vp9 => CodecIdFFmpeg::VP9,
        CodecId::Av1 => CodecIdFFmpeg::AV1,
        CodecId::Hap => CodecIdFFmpeg::HAP,
        CodecId::Cineform => CodecIdFFmpeg::CFHD,
        CodecId::Aac => CodecIdFFmpeg::AAC,
        CodecId::Ac3 => CodecIdFFmpeg::AC3,
        CodecId::Mp3 => CodecIdFFmpeg::MP3,
        CodecId::Opus => CodecIdFFmpeg::OPUS,
        CodecId::Vorbis => CodecIdFFmpeg::VORBIS,
        CodecId::Flac => CodecIdFFmpeg::FLAC,
        CodecId::PcmS16Le => CodecIdFFmpeg::PCM_S16LE,
        CodecId::PcmS16Be => CodecIdFFmpeg::PCM_S16BE,
    }
}

/**
    Look up the encoder a candidate names. Returns None if this FFmpeg
    build does not provide it.
*/
pub fn find_encoder(candidate: &Candidate) -> Option<Codec> {
    match candidate {
        Candidate::Codec(id) => ffmpeg_next::encoder::find(codec_id_to_ffmpeg(*id)),
        named => ffmpeg_next::encoder::find_by_name(named.name()),
    }
}

/**
    Formats a video encoder declares. None means the encoder does not
    declare a list, formats we do not model are left out.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoCapabilities {
    pub pixel_formats: Option<Vec<PixelFormat>>,
}

/**
    Formats, rates and layouts an audio encoder declares.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioCapabilities {
    pub sample_formats: Option<Vec<SampleFormat>>,
    pub sample_rates: Option<Vec<u32>>,
    pub channel_layouts: Option<Vec<ChannelLayout>>,
}

pub fn video_capabilities(codec: &Codec) -> VideoCapabilities {
    let mut pixel_formats = None;
    unsafe {
        let ptr = codec.as_ptr();
        let mut fmt = (*ptr).pix_fmts;
        if !fmt.is_null() {
            let mut formats = Vec::new();
            while *fmt != ffi::AVPixelFormat::AV_PIX_FMT_NONE {
                if let Some(format) = pixel_format_from_ffmpeg(Pixel::from(*fmt)) {
                    push_unique(&mut formats, format);
                }
                fmt = fmt.add(1);
            }
            pixel_formats = Some(formats);
        }
    }
    VideoCapabilities { pixel_formats }
}

pub fn audio_capabilities(codec: &Codec) -> AudioCapabilities {
    let mut caps = AudioCapabilities {
        sample_formats: None,
        sample_rates: None,
        channel_layouts: None,
    };
    unsafe {
        let ptr = codec.as_ptr();

        let mut fmt = (*ptr).sample_fmts;
        if !fmt.is_null() {
            let mut formats = Vec::new();
            while *fmt != ffi::AVSampleFormat::AV_SAMPLE_FMT_NONE {
                if let Some(format) = sample_format_from_ffmpeg(Sample::from(*fmt)) {
                    push_unique(&mut formats, format);
                }
                fmt = fmt.add(1);
            }
            caps.sample_formats = Some(formats);
        }

        let mut rate = (*ptr).supported_samplerates;
        if !rate.is_null() {
            let mut rates = Vec::new();
            while *rate != 0 {
                if *rate > 0 {
                    push_unique(&mut rates, *rate as u32);
                }
                rate = rate.add(1);
            }
            caps.sample_rates = Some(rates);
        }

        let mut layout = (*ptr).ch_layouts;
        if !layout.is_null() {
            let mut layouts = Vec::new();
            while (*layout).nb_channels != 0 {
                let count = (*layout).nb_channels;
                if (1..=8).contains(&count) {
                    push_unique(&mut layouts, ChannelLayout::from_count(count as u16));
                }
                layout = layout.add(1);
            }
            caps.channel_layouts = Some(layouts);
        }
    }
    caps
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
