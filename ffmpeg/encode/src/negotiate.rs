/*!
    Codec and format negotiation.

    Everything in this module is a pure function of the request and of the
    capabilities an encoder declares, so the fallback rules can be tested
    without opening codecs. [`crate::caps`] reads the declared capabilities
    from FFmpeg; the encoders in [`crate::video`] and [`crate::audio`] feed
    them through these rules.
*/

use std::fmt;

use tracing::{info, warn};

use ffmpeg_types::{
    AudioInfo, ChannelLayout, Chroma, CodecId, ColorFamily, ColorPrimaries, ColorRange, ColorSpace,
    ColorTransfer, ContainerFormat, Error, PixelFormat, Rational, RationalTime, Result,
    SampleFormat,
};

use crate::config::{ColorOverrides, HwEncoder, Platform, VideoProfile};

/**
    One way of obtaining an encoder, tried in priority order.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Candidate {
    /// Platform hardware encoder, looked up by name.
    Hardware {
        name: &'static str,
        backend: HwEncoder,
    },
    /// Software encoder, looked up by name.
    Software(&'static str),
    /// Whatever encoder FFmpeg registers for the codec id.
    Codec(CodecId),
}

impl Candidate {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hardware { name, .. } => *name,
            Self::Software(name) => *name,
            Self::Codec(id) => id.name(),
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::Hardware { .. })
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(id) => write!(f, "{} (by id)", id.name()),
            other => f.write_str(other.name()),
        }
    }
}

/**
    Evaluate candidates in order and return the first one `attempt`
    accepts, together with what it produced.
*/
pub fn first_viable<C, T>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: impl FnMut(&C) -> Option<T>,
) -> Option<(C, T)> {
    candidates
        .into_iter()
        .find_map(|candidate| attempt(&candidate).map(|value| (candidate, value)))
}

fn hardware_names(codec: CodecId, platform: Platform) -> &'static [(&'static str, HwEncoder)] {
    use HwEncoder::*;
    match (codec, platform) {
        (CodecId::H264, Platform::MacOs) => &[("h264_videotoolbox", VideoToolbox)],
        (CodecId::H264, Platform::Windows) => {
            &[("h264_nvenc", Nvenc), ("h264_qsv", Qsv), ("h264_amf", Amf)]
        }
        (CodecId::H264, Platform::Linux) => {
            &[("h264_nvenc", Nvenc), ("h264_vaapi", Vaapi), ("h264_qsv", Qsv)]
        }
        (CodecId::ProRes, Platform::MacOs) => &[("prores_videotoolbox", VideoToolbox)],
        (CodecId::Vp9, Platform::Windows) => &[("vp9_qsv", Qsv)],
        (CodecId::Vp9, Platform::Linux) => &[("vp9_vaapi", Vaapi), ("vp9_qsv", Qsv)],
        (CodecId::Av1, Platform::Windows) => {
            &[("av1_nvenc", Nvenc), ("av1_qsv", Qsv), ("av1_amf", Amf)]
        }
        (CodecId::Av1, Platform::Linux) => {
            &[("av1_nvenc", Nvenc), ("av1_vaapi", Vaapi), ("av1_qsv", Qsv)]
        }
        _ => &[],
    }
}

fn software_names(codec: CodecId) -> &'static [&'static str] {
    match codec {
        CodecId::H264 => &["libx264"],
        CodecId::ProRes => &["prores_ks"],
        CodecId::DnxHd => &["dnxhd"],
        CodecId::Vp9 => &["libvpx-vp9"],
        CodecId::Av1 => &["libsvtav1", "libaom-av1", "librav1e"],
        CodecId::Hap => &["hap"],
        CodecId::Cineform => &["cfhd"],
        CodecId::Aac => &["aac"],
        CodecId::Ac3 => &["ac3"],
        CodecId::Mp3 => &["libmp3lame"],
        CodecId::Opus => &["libopus"],
        CodecId::Vorbis => &["libvorbis"],
        CodecId::Flac => &["flac"],
        CodecId::PcmS16Le => &["pcm_s16le"],
        CodecId::PcmS16Be => &["pcm_s16be"],
    }
}

/**
    Encoder priority list for a video profile.

    Hardware names for the platform come first when hardware encoding is
    requested, then software names, then the codec id itself.
*/
pub fn video_candidates(profile: VideoProfile, hardware: bool, platform: Platform) -> Vec<Candidate> {
    let codec = profile.codec();
    let mut candidates = Vec::new();
    if hardware {
        candidates.extend(
            hardware_names(codec, platform)
                .iter()
                .map(|&(name, backend)| Candidate::Hardware { name, backend }),
        );
    }
    candidates.extend(software_names(codec).iter().map(|&name| Candidate::Software(name)));
    candidates.push(Candidate::Codec(codec));
    candidates
}

/**
    Encoder priority list for an audio codec.
*/
pub fn audio_candidates(codec: CodecId) -> Vec<Candidate> {
    let mut candidates: Vec<_> = software_names(codec)
        .iter()
        .map(|&name| Candidate::Software(name))
        .collect();
    candidates.push(Candidate::Codec(codec));
    candidates
}

/**
    A substitution that has a viable fallback. Logged and recorded on the
    resolved configuration, never raised as an error.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NegotiationWarning {
    HardwareUnavailable {
        profile: VideoProfile,
    },
    PixelFormatFallback {
        requested: PixelFormat,
        resolved: PixelFormat,
        encoder: String,
    },
    AudioCodecSubstituted {
        requested: CodecId,
        resolved: CodecId,
        container: ContainerFormat,
    },
    SampleFormatFallback {
        requested: SampleFormat,
        resolved: SampleFormat,
        encoder: String,
    },
    SampleRateFallback {
        requested: u32,
        resolved: u32,
        encoder: String,
    },
}

impl fmt::Display for NegotiationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareUnavailable { profile } => {
                write!(f, "no hardware encoder for {profile}, using software")
            }
            Self::PixelFormatFallback {
                requested,
                resolved,
                encoder,
            } => write!(
                f,
                "{encoder} does not support {requested}, falling back to {resolved}"
            ),
            Self::AudioCodecSubstituted {
                requested,
                resolved,
                container,
            } => write!(
                f,
                "{container} cannot hold {requested} audio, writing {resolved} instead"
            ),
            Self::SampleFormatFallback {
                requested,
                resolved,
                encoder,
            } => write!(
                f,
                "{encoder} does not support {requested} samples, converting to {resolved}"
            ),
            Self::SampleRateFallback {
                requested,
                resolved,
                encoder,
            } => write!(
                f,
                "{encoder} does not support {requested} Hz, resampling to {resolved} Hz"
            ),
        }
    }
}

/**
    Cost of encoding `requested` content as `candidate`, zero for an exact
    match. Losing information costs far more than gaining it.
*/
pub fn pixel_format_distance(requested: PixelFormat, candidate: PixelFormat) -> u32 {
    if requested == candidate {
        return 0;
    }

    let mut score = 1;
    match (requested.has_alpha(), candidate.has_alpha()) {
        (true, false) => score += 1000,
        (false, true) => score += 40,
        _ => {}
    }
    if requested.family() != candidate.family() {
        score += 200;
    }

    let (want, have) = (requested.depth(), candidate.depth());
    score += if have < want {
        (want - have) * 30
    } else {
        (have - want) * 2
    };

    if requested.family() != ColorFamily::Gray {
        let (want, have) = (chroma_rank(requested.chroma()), chroma_rank(candidate.chroma()));
        score += if have < want {
            (want - have) * 100
        } else {
            (have - want) * 10
        };
    }
    score
}

fn chroma_rank(chroma: Chroma) -> u32 {
    match chroma {
        Chroma::Yuv420 => 0,
        Chroma::Yuv422 => 1,
        Chroma::Full => 2,
    }
}

/**
    The member of `supported` closest to `requested`. Ties go to the
    earlier entry. Returns None only for an empty set.
*/
pub fn nearest_pixel_format(requested: PixelFormat, supported: &[PixelFormat]) -> Option<PixelFormat> {
    supported
        .iter()
        .copied()
        .min_by_key(|&candidate| pixel_format_distance(requested, candidate))
}

/**
    Resolve the encoder pixel format.

    `supported` is None when the encoder does not declare its formats, in
    which case the request is used as is.
*/
pub fn resolve_pixel_format(
    requested: PixelFormat,
    supported: Option<&[PixelFormat]>,
    encoder: &str,
) -> Result<(PixelFormat, Option<NegotiationWarning>)> {
    let Some(supported) = supported else {
        return Ok((requested, None));
    };
    if supported.contains(&requested) {
        return Ok((requested, None));
    }

    let resolved = nearest_pixel_format(requested, supported).ok_or_else(|| {
        Error::config(format!("{encoder} declares no usable pixel formats"))
    })?;
    let warning = NegotiationWarning::PixelFormatFallback {
        requested,
        resolved,
        encoder: encoder.to_string(),
    };
    warn!("{warning}");
    Ok((resolved, Some(warning)))
}

/**
    H.264 profile tier for a pixel format.
*/
pub fn h264_profile(format: PixelFormat) -> &'static str {
    match format.chroma() {
        Chroma::Full => "high444",
        Chroma::Yuv422 => "high422",
        Chroma::Yuv420 if format.depth() > 8 => "high10",
        Chroma::Yuv420 => "high",
    }
}

/**
    Color signaling written into the stream and used by the scaler.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSettings {
    pub range: ColorRange,
    pub primaries: ColorPrimaries,
    pub transfer: ColorTransfer,
    pub space: ColorSpace,
}

/**
    Limited range for ProRes and hardware encoders, full range otherwise.
*/
pub fn default_color_range(profile: VideoProfile, hardware: bool) -> ColorRange {
    if profile.is_prores() || hardware {
        ColorRange::Limited
    } else {
        ColorRange::Full
    }
}

fn pick<T: fmt::Display + Copy>(what: &str, over: Option<T>, default: T) -> T {
    match over {
        Some(value) => {
            info!("{what} {value} (override)");
            value
        }
        None => {
            info!("{what} {default} (default)");
            default
        }
    }
}

/**
    Apply color overrides on top of the profile defaults.
*/
pub fn resolve_color(profile: VideoProfile, hardware: bool, overrides: &ColorOverrides) -> ColorSettings {
    ColorSettings {
        range: pick(
            "color range",
            overrides.range,
            default_color_range(profile, hardware),
        ),
        primaries: pick("color primaries", overrides.primaries, ColorPrimaries::Bt709),
        transfer: pick("color transfer", overrides.transfer, ColorTransfer::Bt709),
        space: pick("color space", overrides.space, ColorSpace::Bt709),
    }
}

/**
    Profile-name and rate hints for an encoder. Caller options are applied
    after these and win.
*/
pub fn encoder_options(
    profile: VideoProfile,
    encoder: &str,
    pixel_format: PixelFormat,
) -> Vec<(String, String)> {
    let mut options: Vec<(&str, &str)> = Vec::new();
    match encoder {
        "libx264" => {
            options.push(("preset", "medium"));
            options.push(("crf", "23"));
            options.push(("profile", h264_profile(pixel_format)));
        }
        "prores_ks" | "prores_videotoolbox" => {
            let name = match profile {
                VideoProfile::ProResProxy => "proxy",
                VideoProfile::ProResLt => "lt",
                VideoProfile::ProResHq => "hq",
                VideoProfile::ProRes4444 => "4444",
                VideoProfile::ProResXq if encoder == "prores_ks" => "4444xq",
                VideoProfile::ProResXq => "xq",
                _ => "standard",
            };
            options.push(("profile", name));
        }
        "dnxhd" => {
            let name = match profile {
                VideoProfile::DnxhrLb => "dnxhr_lb",
                VideoProfile::DnxhrSq => "dnxhr_sq",
                VideoProfile::DnxhrHq => "dnxhr_hq",
                VideoProfile::DnxhrHqx => "dnxhr_hqx",
                VideoProfile::Dnxhr444 => "dnxhr_444",
                _ => "dnxhd",
            };
            options.push(("profile", name));
            if profile == VideoProfile::Dnxhd {
                options.push(("b", "115M"));
            }
        }
        "libvpx-vp9" => {
            options.push(("crf", "31"));
            options.push(("b", "0"));
        }
        "libsvtav1" => options.push(("crf", "30")),
        "libaom-av1" => {
            options.push(("crf", "30"));
            options.push(("b", "0"));
        }
        _ => {}
    }
    options
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/**
    Apply container restrictions to the requested audio codec.

    A request the container cannot hold is replaced by the container's
    codec and reported as a warning. None picks the container default.
*/
pub fn container_audio_codec(
    container: Option<&ContainerFormat>,
    requested: Option<CodecId>,
) -> (CodecId, Option<NegotiationWarning>) {
    let (allowed, default): (&[CodecId], CodecId) = match container {
        Some(ContainerFormat::Wav) => (
            &[CodecId::PcmS16Le, CodecId::Mp3, CodecId::Aac],
            CodecId::PcmS16Le,
        ),
        Some(ContainerFormat::Aiff) => (&[CodecId::PcmS16Be], CodecId::PcmS16Be),
        Some(ContainerFormat::Mp3) => (&[CodecId::Mp3], CodecId::Mp3),
        Some(ContainerFormat::Opus) => (&[CodecId::Opus], CodecId::Opus),
        Some(ContainerFormat::Ogg) => (&[CodecId::Vorbis], CodecId::Vorbis),
        Some(ContainerFormat::Webm) => (&[CodecId::Opus, CodecId::Vorbis], CodecId::Opus),
        _ => return (requested.unwrap_or(CodecId::Aac), None),
    };

    match requested {
        None => (default, None),
        Some(codec) if allowed.contains(&codec) => (codec, None),
        Some(codec) => {
            let warning = container.map(|container| NegotiationWarning::AudioCodecSubstituted {
                requested: codec,
                resolved: default,
                container: container.clone(),
            });
            if let Some(warning) = &warning {
                warn!("{warning}");
            }
            (default, warning)
        }
    }
}

/**
    Sample formats to try, in order: the native format, its planar
    counterpart, then F32, planar F32 and S16.
*/
pub fn sample_format_candidates(native: SampleFormat) -> Vec<SampleFormat> {
    let mut candidates = Vec::with_capacity(5);
    for format in [
        native,
        native.to_planar(),
        SampleFormat::F32,
        SampleFormat::F32Planar,
        SampleFormat::S16,
    ] {
        if !candidates.contains(&format) {
            candidates.push(format);
        }
    }
    candidates
}

/**
    Outcome of sample format resolution.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleFormatResolution {
    pub format: SampleFormat,
    /// True when neither the native format nor its planar twin was usable
    pub fallback: bool,
}

/**
    Resolve the encoder sample format. Returns None if nothing in the
    candidate list is supported.
*/
pub fn resolve_sample_format(
    native: SampleFormat,
    supported: Option<&[SampleFormat]>,
) -> Option<SampleFormatResolution> {
    let Some(supported) = supported else {
        return Some(SampleFormatResolution {
            format: native,
            fallback: false,
        });
    };
    let (format, ()) = first_viable(sample_format_candidates(native), |format| {
        supported.contains(format).then_some(())
    })?;
    Some(SampleFormatResolution {
        format,
        fallback: format.to_packed() != native.to_packed(),
    })
}

/**
    Resolve the encoder channel layout: the default layout for the input
    count when the encoder declares none, otherwise the declared layout
    with the most channels.
*/
pub fn resolve_channels(input_channels: u16, declared: Option<&[ChannelLayout]>) -> ChannelLayout {
    declared
        .and_then(|layouts| layouts.iter().copied().max_by_key(|l| l.channels()))
        .unwrap_or_else(|| ChannelLayout::from_count(input_channels))
}

/**
    Resolve the encoder sample rate: the input rate if the encoder is
    unconstrained or supports it, otherwise the closest declared rate.
*/
pub fn resolve_sample_rate(input_rate: u32, declared: Option<&[u32]>) -> u32 {
    match declared {
        Some(rates) if !rates.is_empty() && !rates.contains(&input_rate) => rates
            .iter()
            .copied()
            .min_by_key(|rate| rate.abs_diff(input_rate))
            .unwrap_or(input_rate),
        _ => input_rate,
    }
}

/**
    Default bitrate for lossy audio codecs.
*/
pub fn default_audio_bitrate(codec: CodecId) -> Option<u64> {
    match codec {
        CodecId::Ac3 => Some(448_000),
        CodecId::Aac => Some(128_000),
        CodecId::Vorbis | CodecId::Mp3 => Some(192_000),
        CodecId::Opus => Some(64_000),
        _ => None,
    }
}

/**
    Codecs that reject a preset block_align.
*/
pub fn clears_block_align(codec: CodecId) -> bool {
    matches!(codec, CodecId::Mp3 | CodecId::Ac3 | CodecId::Aac)
}

/**
    Samples per encoded audio frame. Zero means any size is accepted,
    which only raw PCM gets; other codecs that report zero use 1024.
*/
pub fn audio_frame_size(codec: CodecId, reported: u32) -> usize {
    if reported > 0 {
        reported as usize
    } else if codec.is_pcm() {
        0
    } else {
        1024
    }
}

/**
    Returns true if caller audio has to go through a resampler before it
    reaches the encoder.
*/
pub fn needs_resampler(
    input: &AudioInfo,
    format: SampleFormat,
    channels: ChannelLayout,
    sample_rate: u32,
) -> bool {
    input.sample_rate != sample_rate
        || input.channels != channels.channels()
        || input.sample_format.to_packed() != format.to_packed()
}

/**
    Negotiated video stream settings.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoStreamConfig {
    pub profile: VideoProfile,
    pub codec: CodecId,
    /// Name of the encoder that was opened
    pub encoder: String,
    /// True if a hardware encoder was opened
    pub hardware: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub color: ColorSettings,
    pub frame_rate: Rational,
    pub start_time: RationalTime,
    /// Codec time base, the inverse of the frame rate
    pub time_base: Rational,
    pub warnings: Vec<NegotiationWarning>,
}

/**
    Negotiated audio stream settings.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct AudioStreamConfig {
    pub codec: CodecId,
    /// Name of the encoder that was opened
    pub encoder: String,
    pub sample_format: SampleFormat,
    pub channels: ChannelLayout,
    pub sample_rate: u32,
    /// Samples per encoded frame, 0 for variable
    pub frame_size: usize,
    pub planar: bool,
    /// True if caller audio goes through a resampler
    pub resample: bool,
    pub bitrate: Option<u64>,
    /// Codec time base, one over the sample rate
    pub time_base: Rational,
    pub warnings: Vec<NegotiationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h264_candidates_per_platform() {
        let names = |platform| -> Vec<&str> {
            video_candidates(VideoProfile::H264, true, platform)
                .iter()
                .map(Candidate::name)
                .collect()
        };
        assert_eq!(names(Platform::MacOs), ["h264_videotoolbox", "libx264", "h264"]);
        assert_eq!(
            names(Platform::Windows),
            ["h264_nvenc", "h264_qsv", "h264_amf", "libx264", "h264"]
        );
        assert_eq!(
            names(Platform::Linux),
            ["h264_nvenc", "h264_vaapi", "h264_qsv", "libx264", "h264"]
        );
    }

    #[test]
    fn software_only_without_hardware_request() {
        let candidates = video_candidates(VideoProfile::ProResHq, false, Platform::MacOs);
        assert!(candidates.iter().all(|c| !c.is_hardware()));
        assert_eq!(candidates[0], Candidate::Software("prores_ks"));
        assert_eq!(candidates.last(), Some(&Candidate::Codec(CodecId::ProRes)));
    }

    #[test]
    fn first_viable_short_circuits() {
        let mut tried = Vec::new();
        let found = first_viable([1, 2, 3, 4], |&n| {
            tried.push(n);
            (n % 2 == 0).then_some(n * 10)
        });
        assert_eq!(found, Some((2, 20)));
        assert_eq!(tried, [1, 2]);
        assert_eq!(first_viable(Vec::<u8>::new(), |_| Some(())), None);
    }

    #[test]
    fn prores_fallback_picks_ten_bit_422() {
        let supported = [
            PixelFormat::Yuv422p10le,
            PixelFormat::Yuv444p10le,
            PixelFormat::Yuva444p10le,
        ];
        let (resolved, warning) =
            resolve_pixel_format(PixelFormat::Yuv420p, Some(&supported), "prores_ks").unwrap();
        assert_eq!(resolved, PixelFormat::Yuv422p10le);
        assert!(matches!(
            warning,
            Some(NegotiationWarning::PixelFormatFallback { .. })
        ));
    }

    #[test]
    fn alpha_requests_keep_alpha() {
        let supported = [
            PixelFormat::Yuv422p10le,
            PixelFormat::Yuv444p10le,
            PixelFormat::Yuva444p10le,
        ];
        assert_eq!(
            nearest_pixel_format(PixelFormat::Rgba, &supported),
            Some(PixelFormat::Yuva444p10le)
        );
        assert_eq!(
            nearest_pixel_format(PixelFormat::Rgb24, &supported),
            Some(PixelFormat::Yuv444p10le)
        );
    }

    #[test]
    fn nearest_is_always_a_member() {
        let sets: [&[PixelFormat]; 4] = [
            &[PixelFormat::Yuv420p],
            &[PixelFormat::Nv12, PixelFormat::P010le],
            &[PixelFormat::Rgba],
            &[PixelFormat::Yuv422p, PixelFormat::Yuv422p10le, PixelFormat::Gray8],
        ];
        for supported in sets {
            for requested in PixelFormat::ALL {
                let (resolved, warning) =
                    resolve_pixel_format(requested, Some(supported), "test").unwrap();
                assert!(supported.contains(&resolved), "{requested} -> {resolved}");
                assert_eq!(warning.is_none(), requested == resolved);
            }
        }
    }

    #[test]
    fn pixel_format_edge_cases() {
        let (resolved, warning) = resolve_pixel_format(PixelFormat::Rgba, None, "hap").unwrap();
        assert_eq!(resolved, PixelFormat::Rgba);
        assert!(warning.is_none());

        let err = resolve_pixel_format(PixelFormat::Rgba, Some(&[]), "odd").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn h264_tiers() {
        assert_eq!(h264_profile(PixelFormat::Yuv420p), "high");
        assert_eq!(h264_profile(PixelFormat::Yuv420p10le), "high10");
        assert_eq!(h264_profile(PixelFormat::Yuv422p), "high422");
        assert_eq!(h264_profile(PixelFormat::Yuv422p10le), "high422");
        assert_eq!(h264_profile(PixelFormat::Yuv444p10le), "high444");
    }

    #[test]
    fn color_defaults_and_overrides() {
        let color = resolve_color(VideoProfile::ProRes, false, &ColorOverrides::default());
        assert_eq!(color.range, ColorRange::Limited);
        assert_eq!(color.space, ColorSpace::Bt709);

        let color = resolve_color(VideoProfile::H264, false, &ColorOverrides::default());
        assert_eq!(color.range, ColorRange::Full);
        assert_eq!(
            resolve_color(VideoProfile::H264, true, &ColorOverrides::default()).range,
            ColorRange::Limited
        );

        let overrides = ColorOverrides {
            range: Some(ColorRange::Full),
            transfer: Some(ColorTransfer::Pq),
            ..Default::default()
        };
        let color = resolve_color(VideoProfile::ProRes, false, &overrides);
        assert_eq!(color.range, ColorRange::Full);
        assert_eq!(color.transfer, ColorTransfer::Pq);
        assert_eq!(color.primaries, ColorPrimaries::Bt709);
    }

    #[test]
    fn encoder_hints() {
        let opts = encoder_options(VideoProfile::ProResXq, "prores_ks", PixelFormat::Yuva444p10le);
        assert_eq!(opts, [("profile".to_string(), "4444xq".to_string())]);

        let opts = encoder_options(VideoProfile::H264, "libx264", PixelFormat::Yuv420p10le);
        assert!(opts.contains(&("profile".to_string(), "high10".to_string())));

        let opts = encoder_options(VideoProfile::Dnxhd, "dnxhd", PixelFormat::Yuv422p);
        assert!(opts.contains(&("b".to_string(), "115M".to_string())));

        assert!(encoder_options(VideoProfile::Hap, "hap", PixelFormat::Rgba).is_empty());
    }

    #[test]
    fn aiff_forces_big_endian_pcm() {
        let (codec, warning) =
            container_audio_codec(Some(&ContainerFormat::Aiff), Some(CodecId::Aac));
        assert_eq!(codec, CodecId::PcmS16Be);
        assert_eq!(
            warning,
            Some(NegotiationWarning::AudioCodecSubstituted {
                requested: CodecId::Aac,
                resolved: CodecId::PcmS16Be,
                container: ContainerFormat::Aiff,
            })
        );
    }

    #[test]
    fn container_codec_rules() {
        let wav = Some(&ContainerFormat::Wav);
        assert_eq!(container_audio_codec(wav, Some(CodecId::Mp3)), (CodecId::Mp3, None));
        assert_eq!(container_audio_codec(wav, None), (CodecId::PcmS16Le, None));
        assert_eq!(container_audio_codec(wav, Some(CodecId::Opus)).0, CodecId::PcmS16Le);

        let ogg = Some(&ContainerFormat::Ogg);
        assert_eq!(container_audio_codec(ogg, Some(CodecId::Aac)).0, CodecId::Vorbis);
        let opus = Some(&ContainerFormat::Opus);
        assert_eq!(container_audio_codec(opus, None).0, CodecId::Opus);

        let mov = Some(&ContainerFormat::Mov);
        assert_eq!(container_audio_codec(mov, None), (CodecId::Aac, None));
        assert_eq!(container_audio_codec(mov, Some(CodecId::Ac3)), (CodecId::Ac3, None));
    }

    #[test]
    fn sample_format_fallback_order() {
        assert_eq!(
            sample_format_candidates(SampleFormat::S32),
            [
                SampleFormat::S32,
                SampleFormat::S32Planar,
                SampleFormat::F32,
                SampleFormat::F32Planar,
                SampleFormat::S16
            ]
        );
        assert_eq!(
            sample_format_candidates(SampleFormat::F32),
            [SampleFormat::F32, SampleFormat::F32Planar, SampleFormat::S16]
        );
    }

    #[test]
    fn sample_format_resolution() {
        let planar = resolve_sample_format(SampleFormat::F32, Some(&[SampleFormat::F32Planar]));
        assert_eq!(
            planar,
            Some(SampleFormatResolution {
                format: SampleFormat::F32Planar,
                fallback: false
            })
        );

        let pcm = resolve_sample_format(SampleFormat::F32, Some(&[SampleFormat::S16])).unwrap();
        assert_eq!(pcm.format, SampleFormat::S16);
        assert!(pcm.fallback);

        assert_eq!(resolve_sample_format(SampleFormat::S32, Some(&[SampleFormat::U8])), None);
        assert_eq!(
            resolve_sample_format(SampleFormat::S32, None).map(|r| r.format),
            Some(SampleFormat::S32)
        );
    }

    #[test]
    fn unsupported_sample_formats_resolve_within_fallback_set() {
        let all = [
            SampleFormat::U8,
            SampleFormat::S16,
            SampleFormat::S32,
            SampleFormat::F32,
            SampleFormat::F64,
            SampleFormat::U8Planar,
            SampleFormat::S16Planar,
            SampleFormat::S32Planar,
            SampleFormat::F32Planar,
            SampleFormat::F64Planar,
        ];
        let supported_sets: [&[SampleFormat]; 3] = [
            &[SampleFormat::F32Planar],
            &[SampleFormat::S16],
            &[SampleFormat::S16, SampleFormat::S32Planar],
        ];
        for supported in supported_sets {
            for native in all {
                if supported.contains(&native) {
                    continue;
                }
                if let Some(resolved) = resolve_sample_format(native, Some(supported)) {
                    let allowed = [
                        native.to_planar(),
                        SampleFormat::F32,
                        SampleFormat::F32Planar,
                        SampleFormat::S16,
                    ];
                    assert!(allowed.contains(&resolved.format));
                    assert!(supported.contains(&resolved.format));
                }
            }
        }
    }

    #[test]
    fn channel_resolution() {
        assert_eq!(resolve_channels(2, None), ChannelLayout::Stereo);
        assert_eq!(resolve_channels(6, Some(&[])), ChannelLayout::Surround5_1);
        assert_eq!(
            resolve_channels(
                1,
                Some(&[ChannelLayout::Mono, ChannelLayout::Stereo, ChannelLayout::Quad])
            ),
            ChannelLayout::Quad
        );
    }

    #[test]
    fn sample_rate_resolution() {
        assert_eq!(resolve_sample_rate(44100, None), 44100);
        assert_eq!(resolve_sample_rate(44100, Some(&[48000, 44100])), 44100);
        assert_eq!(
            resolve_sample_rate(44100, Some(&[48000, 24000, 16000, 12000, 8000])),
            48000
        );
        assert_eq!(resolve_sample_rate(19000, Some(&[24000, 16000])), 16000);
        assert_eq!(resolve_sample_rate(20000, Some(&[24000, 16000])), 24000);
    }

    #[test]
    fn audio_defaults() {
        assert_eq!(default_audio_bitrate(CodecId::Ac3), Some(448_000));
        assert_eq!(default_audio_bitrate(CodecId::Opus), Some(64_000));
        assert_eq!(default_audio_bitrate(CodecId::PcmS16Le), None);
        assert!(clears_block_align(CodecId::Aac));
        assert!(!clears_block_align(CodecId::Flac));
        assert_eq!(audio_frame_size(CodecId::Aac, 1024), 1024);
        assert_eq!(audio_frame_size(CodecId::Vorbis, 0), 1024);
        assert_eq!(audio_frame_size(CodecId::PcmS16Be, 0), 0);
    }

    #[test]
    fn resampler_decision() {
        let input = AudioInfo::new(2, SampleFormat::F32, 48000);
        assert!(!needs_resampler(&input, SampleFormat::F32Planar, ChannelLayout::Stereo, 48000));
        assert!(needs_resampler(&input, SampleFormat::S16, ChannelLayout::Stereo, 48000));
        assert!(needs_resampler(&input, SampleFormat::F32, ChannelLayout::Stereo, 44100));
        assert!(needs_resampler(&input, SampleFormat::F32, ChannelLayout::Mono, 48000));
    }
}
