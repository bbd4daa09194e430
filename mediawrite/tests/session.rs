use std::path::Path;

use ffmpeg_next::{codec, format, media};

use ffmpeg_types::{
    AudioBuffer, AudioInfo, CodecId, Image, ImageInfo, PixelFormat, Rational, RationalTime,
    SampleFormat, StreamType, TimeRange, VideoInfo,
};
use mediawrite::{
    NegotiationWarning, SessionState, VideoProfile, WriteError, WriteInfo, WriteOptions,
    WriteSession,
};

fn stereo(samples: usize) -> AudioBuffer {
    let data: Vec<f32> = (0..samples * 2).map(|i| ((i % 64) as f32 / 64.0) - 0.5).collect();
    AudioBuffer::from_f32(2, 48000, &data).unwrap()
}

fn range(start: usize, samples: usize) -> TimeRange {
    TimeRange::new(
        RationalTime::new(start as f64, 48000.0),
        RationalTime::new(samples as f64, 48000.0),
    )
}

fn rgba(width: u32, height: u32, shade: u8) -> Image {
    let len = (width * height * 4) as usize;
    Image::new(ImageInfo::new(width, height, PixelFormat::Rgba), vec![shade; len]).unwrap()
}

fn stream_codecs(path: &Path) -> Vec<(media::Type, codec::Id)> {
    let input = format::input(&path).unwrap();
    input
        .streams()
        .map(|s| (s.parameters().medium(), s.parameters().id()))
        .collect()
}

fn packet_count(path: &Path) -> usize {
    let mut input = format::input(&path).unwrap();
    input.packets().count()
}

#[test]
fn wav_pcm_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let info = WriteInfo::audio(AudioInfo::new(2, SampleFormat::S16, 48000));
    let mut session = WriteSession::new(&path, info, WriteOptions::default()).unwrap();
    let config = session.audio_config().unwrap();
    assert_eq!(config.codec, CodecId::PcmS16Le);
    assert_eq!(config.frame_size, 0);
    assert!(!config.resample);

    let mut start = 0;
    for _ in 0..10 {
        let buffer = AudioBuffer::from_i16(2, 48000, &[100; 37 * 2]).unwrap();
        session.write_audio(range(start, 37), &buffer).unwrap();
        start += 37;
    }
    let report = session.finish().unwrap();
    assert_eq!(report.audio_samples, 370);
    assert_eq!(report.video_frames, 0);

    assert_eq!(
        stream_codecs(&path),
        [(media::Type::Audio, codec::Id::PCM_S16LE)]
    );
    let len = std::fs::metadata(&path).unwrap().len();
    assert!(len >= 370 * 4);
}

#[test]
fn aiff_substitutes_big_endian_pcm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.aiff");

    let info = WriteInfo::audio(AudioInfo::new(2, SampleFormat::F32, 48000));
    let options = WriteOptions::default().with_audio_codec(CodecId::Aac);
    let mut session = WriteSession::new(&path, info, options).unwrap();

    let config = session.audio_config().unwrap();
    assert_eq!(config.codec, CodecId::PcmS16Be);
    assert_eq!(config.sample_format, SampleFormat::S16);
    assert!(config.resample);
    assert!(config.warnings.iter().any(|w| matches!(
        w,
        NegotiationWarning::AudioCodecSubstituted {
            requested: CodecId::Aac,
            resolved: CodecId::PcmS16Be,
            ..
        }
    )));

    session.write_audio(range(0, 4800), &stereo(4800)).unwrap();
    let report = session.finish().unwrap();
    assert!(report.audio_samples >= 4700);

    assert_eq!(
        stream_codecs(&path),
        [(media::Type::Audio, codec::Id::PCM_S16BE)]
    );
}

#[test]
fn prores_session_falls_back_to_ten_bit_422() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.mov");

    let info = WriteInfo::video(VideoInfo::new(
        64,
        48,
        PixelFormat::Rgba,
        Rational::new(24, 1),
    ));
    let options = WriteOptions::default()
        .with_profile(VideoProfile::ProResHq)
        .with_pixel_format(PixelFormat::Yuv420p)
        .with_timecode("01:00:00:00")
        .with_tag("title", "pattern");
    let mut session = WriteSession::new(&path, info, options).unwrap();
    assert_eq!(session.state(), SessionState::Open);

    let config = session.video_config().unwrap().clone();
    assert_eq!(config.encoder, "prores_ks");
    assert_eq!(config.pixel_format, PixelFormat::Yuv422p10le);
    assert!(matches!(
        config.warnings.as_slice(),
        [NegotiationWarning::PixelFormatFallback {
            requested: PixelFormat::Yuv420p,
            resolved: PixelFormat::Yuv422p10le,
            ..
        }]
    ));

    for index in 0..3 {
        session
            .write_video(RationalTime::new(index as f64, 24.0), &rgba(64, 48, 40 * index as u8))
            .unwrap();
    }
    let report = session.finish().unwrap();
    assert_eq!(report.video_frames, 3);
    assert_eq!(report.video_packets, 3);

    let codecs = stream_codecs(&path);
    assert!(codecs.contains(&(media::Type::Video, codec::Id::PRORES)));
    let input = format::input(&path).unwrap();
    assert_eq!(input.metadata().get("title"), Some("pattern"));
}

#[test]
fn video_and_audio_in_one_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("av.mov");

    let info = WriteInfo::video(VideoInfo::new(
        32,
        32,
        PixelFormat::Rgba,
        Rational::new(25, 1),
    ))
    .with_audio(AudioInfo::new(2, SampleFormat::F32, 48000));
    let options = WriteOptions::default()
        .with_profile(VideoProfile::ProRes)
        .with_audio_codec(CodecId::PcmS16Le);
    let mut session = WriteSession::new(&path, info, options).unwrap();

    for index in 0..5 {
        session
            .write_video(RationalTime::new(index as f64, 25.0), &rgba(32, 32, 90))
            .unwrap();
        session
            .write_audio(range(index * 1920, 1920), &stereo(1920))
            .unwrap();
    }
    let report = session.finish().unwrap();
    assert_eq!(report.video_frames, 5);
    assert!(report.audio_samples > 0);

    let codecs = stream_codecs(&path);
    assert_eq!(codecs.len(), 2);
    assert!(codecs.iter().any(|(m, _)| *m == media::Type::Video));
    assert!(codecs.iter().any(|(m, _)| *m == media::Type::Audio));
}

#[test]
fn dropped_session_flushes_short_frame_and_trailer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abandoned.m4a");

    {
        let info = WriteInfo::audio(AudioInfo::new(2, SampleFormat::F32, 48000));
        let mut session = WriteSession::new(&path, info, WriteOptions::default()).unwrap();
        let config = session.audio_config().unwrap();
        assert_eq!(config.codec, CodecId::Aac);
        assert_eq!(config.frame_size, 1024);
        assert!(!config.resample);

        // One full frame plus a remainder that only goes out on teardown
        session.write_audio(range(0, 1500), &stereo(1500)).unwrap();
    }

    assert_eq!(
        stream_codecs(&path),
        [(media::Type::Audio, codec::Id::AAC)]
    );
    assert!(packet_count(&path) >= 2);
}

#[test]
fn unknown_container_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.nosuchformat");
    let info = WriteInfo::audio(AudioInfo::new(2, SampleFormat::F32, 48000));
    let err = WriteSession::new(&path, info, WriteOptions::default()).unwrap_err();
    assert!(matches!(err, WriteError::Configuration { .. }));
    assert!(!path.exists());
}

#[test]
fn missing_preset_discards_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preset.mov");
    let info = WriteInfo::video(VideoInfo::new(
        16,
        16,
        PixelFormat::Rgba,
        Rational::new(24, 1),
    ));
    let options = WriteOptions::default()
        .with_profile(VideoProfile::ProRes)
        .with_preset_file(dir.path().join("missing.preset"));
    let err = WriteSession::new(&path, info, options).unwrap_err();
    assert!(err.to_string().contains("preset"));
    assert!(!path.exists());
}

#[test]
fn bad_input_keeps_session_usable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.wav");
    let info = WriteInfo::audio(AudioInfo::new(2, SampleFormat::F32, 48000));
    let mut session = WriteSession::new(&path, info, WriteOptions::default()).unwrap();

    let mono = AudioBuffer::from_f32(1, 48000, &[0.0; 16]).unwrap();
    let err = session.write_audio(range(0, 16), &mono).unwrap_err();
    assert!(matches!(
        err,
        WriteError::InvalidInput {
            stream: StreamType::Audio,
            ..
        }
    ));
    assert!(!err.is_fatal());

    let err = session
        .write_video(RationalTime::new(0.0, 24.0), &rgba(8, 8, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        WriteError::NoStream {
            stream: StreamType::Video
        }
    ));

    session.write_audio(range(0, 480), &stereo(480)).unwrap();
    let report = session.finish().unwrap();
    assert!(report.audio_samples > 0 && report.audio_samples <= 480);
}

#[test]
fn speed_overrides_frame_rate_without_audio() {
    let dir = tempfile::tempdir().unwrap();
    for speed in [20.0, 48.0] {
        let path = dir.path().join(format!("speed{speed}.mov"));
        let info = WriteInfo::video(VideoInfo::new(
            16,
            16,
            PixelFormat::Rgba,
            Rational::new(24, 1),
        ));
        let options = WriteOptions::default()
            .with_profile(VideoProfile::ProResProxy)
            .with_speed(speed);
        let mut session = WriteSession::new(&path, info, options).unwrap();
        assert_eq!(
            session.video_config().unwrap().frame_rate,
            Rational::from_f64(speed)
        );

        for index in 0..8 {
            session
                .write_video(RationalTime::new(index as f64, 24.0), &rgba(16, 16, 30))
                .unwrap();
        }
        let report = session.finish().unwrap();
        assert_eq!(report.video_packets, 8);

        // One frame per tick of the new rate
        let mut input = format::input(&path).unwrap();
        let video = input.streams().best(media::Type::Video).unwrap();
        let index = video.index();
        let stream_tb = Rational::new(video.time_base().numerator(), video.time_base().denominator());
        let frame_tb = Rational::new(1, speed as i32);
        let pts: Vec<i64> = input
            .packets()
            .filter(|(stream, _)| stream.index() == index)
            .filter_map(|(_, packet)| packet.pts())
            .map(|pts| Rational::rescale(pts, stream_tb, frame_tb))
            .collect();
        assert_eq!(pts, (0..8).collect::<Vec<_>>(), "speed {speed}");
    }
}
