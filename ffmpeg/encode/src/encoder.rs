/*!
    The push/pull encoder contract.
*/

use ffmpeg_next::{codec::encoder::Encoder as EncoderFFmpeg, ffi};

use ffmpeg_types::{Error, MediaDuration, Packet, Pts, Rational, Result, StreamType};

/**
    A codec that turns frames into packets.

    `push(Some(frame))` submits a frame, `push(None)` signals end of
    stream. Either way the encoder is then drained until it reports that
    it needs more input or has finished, and every packet it produced is
    returned.
*/
pub trait Encoder {
    type Frame;

    /// Stream the packets belong to.
    fn stream_type(&self) -> StreamType;

    /// Time base of the pts values on pushed frames and returned packets.
    fn time_base(&self) -> Rational;

    fn push(&mut self, frame: Option<&Self::Frame>) -> Result<Vec<Packet>>;
}

/**
    Receive all available packets from an FFmpeg encoder.
*/
pub(crate) fn receive_packets(
    encoder: &mut EncoderFFmpeg,
    time_base: Rational,
    stream_type: StreamType,
) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();
    let mut encoded_pkt = ffmpeg_next::Packet::empty();

    loop {
        match encoder.receive_packet(&mut encoded_pkt) {
            Ok(()) => {
                packets.push(convert_packet(&encoded_pkt, time_base, stream_type));
            }
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::AVERROR(ffi::EAGAIN) => {
                break;
            }
            Err(ffmpeg_next::Error::Eof) => {
                break;
            }
            Err(e) => {
                return Err(Error::codec(format!("{stream_type} packet retrieval failed: {e}")));
            }
        }
    }

    Ok(packets)
}

/**
    Convert an FFmpeg packet to our Packet type.
*/
fn convert_packet(pkt: &ffmpeg_next::Packet, time_base: Rational, stream_type: StreamType) -> Packet {
    Packet {
        data: pkt.data().map(|d| d.to_vec()).unwrap_or_default(),
        pts: pkt.pts().map(Pts),
        dts: pkt.dts().map(Pts),
        duration: MediaDuration(pkt.duration()),
        time_base,
        is_keyframe: pkt.is_key(),
        stream_type,
    }
}
