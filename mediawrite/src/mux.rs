/*!
    Encode/mux driver.
*/

use tracing::trace;

use ffmpeg_encode::Encoder;
use ffmpeg_sink::PacketSink;
use ffmpeg_types::Result;

/**
    Push one frame (or end of stream) through an encoder and write every
    packet it produces. Returns the number of packets written.
*/
pub fn encode_and_write<E, S>(encoder: &mut E, frame: Option<&E::Frame>, sink: &mut S) -> Result<usize>
where
    E: Encoder + ?Sized,
    S: PacketSink + ?Sized,
{
    let packets = encoder.push(frame)?;
    for packet in &packets {
        trace!(
            stream = %packet.stream_type,
            pts = ?packet.pts,
            size = packet.data.len(),
            keyframe = packet.is_keyframe,
            "writing packet"
        );
        sink.write(packet)?;
    }
    Ok(packets.len())
}
