/*!
    Media output and muxing for the ffmpeg media writing crates.

    This crate handles the output side of the pipeline. It creates a
    container for a path, adds the streams the encoders describe, and
    writes their packets in interleaved order, finishing with the
    container trailer.

    ```ignore
    use ffmpeg_sink::Sink;
    use ffmpeg_types::{StreamType, Tags};

    let mut sink = Sink::create("out.mov", &Tags::new())?;
    sink.add_stream(StreamType::Video, encoder.parameters(), encoder.time_base(), &Tags::new())?;
    sink.write_header()?;
    for packet in packets {
        sink.write(&packet)?;
    }
    sink.finish()?;
    ```
*/

mod sink;

pub use ffmpeg_types::ContainerFormat;
pub use sink::{PacketSink, Sink};
