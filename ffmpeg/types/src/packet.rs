/*!
    Encoded packet type.
*/

use std::fmt;

use crate::{MediaDuration, Pts, Rational};

/**
    Type of media stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// Video stream
    Video,
    /// Audio stream
    Audio,
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/**
    An encoded media packet.

    Timestamps are in the encoder's time base when the packet leaves an
    encoder. The sink rescales them into the stream time base on write.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<Pts>,
    /// Decode timestamp (may differ from PTS for B-frames).
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe.
    pub is_keyframe: bool,
    /// Type of stream this packet belongs to.
    pub stream_type: StreamType,
}

impl Packet {
    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }

    /**
        Returns the packet duration as a std Duration.
    */
    pub fn packet_duration(&self) -> std::time::Duration {
        self.duration.to_duration(self.time_base)
    }

    pub fn is_video(&self) -> bool {
        self.stream_type == StreamType::Video
    }

    pub fn is_audio(&self) -> bool {
        self.stream_type == StreamType::Audio
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TB_1_48000: Rational = Rational { num: 1, den: 48000 };

    fn audio_packet(pts: i64, duration: i64) -> Packet {
        Packet {
            data: vec![0u8; 16],
            pts: Some(Pts(pts)),
            dts: Some(Pts(pts)),
            duration: MediaDuration(duration),
            time_base: TB_1_48000,
            is_keyframe: true,
            stream_type: StreamType::Audio,
        }
    }

    #[test]
    fn packet_times() {
        let packet = audio_packet(48000, 1024);
        assert_eq!(packet.presentation_time(), Some(Duration::from_secs(1)));
        assert_eq!(
            packet.packet_duration(),
            Duration::from_secs_f64(1024.0 / 48000.0)
        );
    }

    #[test]
    fn stream_type_checks() {
        let packet = audio_packet(0, 0);
        assert!(packet.is_audio());
        assert!(!packet.is_video());
        assert_eq!(StreamType::Video.to_string(), "video");
    }
}
