/*!
    Media sink implementation.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Dictionary, Rational as FFmpegRational, codec::Parameters, format,
    format::context::Output as OutputContext,
};
use tracing::{debug, info, warn};

use ffmpeg_types::{ContainerFormat, Error, Packet, Rational, Result, StreamType, Tags};

/**
    Destination for encoded packets.

    Implemented by [`Sink`]; the session code writes through this trait so
    it can be driven without a container in tests.
*/
pub trait PacketSink {
    fn write(&mut self, packet: &Packet) -> Result<()>;
}

#[derive(Clone, Copy, Debug)]
struct StreamSlot {
    kind: StreamType,
    index: usize,
    time_base: Rational,
}

/**
    Media sink for writing to container files.

    Streams are added after creation, then the header is written, then
    packets are written in any order across streams (the container
    interleaves them). [`Sink::finish`] writes the trailer.
*/
pub struct Sink {
    output: OutputContext,
    path: PathBuf,
    container: Option<ContainerFormat>,
    streams: Vec<StreamSlot>,
    header_written: bool,
}

impl Sink {
    /**
        Create a sink for the given path.

        The container is guessed from the path extension. Tags are written
        as container metadata.
    */
    pub fn create(path: impl AsRef<Path>, tags: &Tags) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let path = path.as_ref();
        let container = ContainerFormat::from_path(path);

        let mut output = format::output(path).map_err(|e| {
            Error::config(format!(
                "cannot create container for {}: {e}",
                path.display()
            ))
        })?;

        if !tags.is_empty() {
            output.set_metadata(to_dictionary(tags));
        }

        info!(
            path = %path.display(),
            container = output.format().name(),
            "created output"
        );

        Ok(Self {
            output,
            path: path.to_path_buf(),
            container,
            streams: Vec::new(),
            header_written: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /**
        Container guessed from the path extension, if it had one.
    */
    pub fn container(&self) -> Option<&ContainerFormat> {
        self.container.as_ref()
    }

    /**
        Returns true if encoders must put codec headers in extradata
        instead of the bitstream.
    */
    pub fn needs_global_header(&self) -> bool {
        self.output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER)
    }

    /**
        Add a stream with the given codec parameters.

        `time_base` is a hint; the muxer may pick a different one when the
        header is written.
    */
    pub fn add_stream(
        &mut self,
        kind: StreamType,
        parameters: Parameters,
        time_base: Rational,
        tags: &Tags,
    ) -> Result<usize> {
        if self.header_written {
            return Err(Error::config("cannot add a stream after the header"));
        }
        if self.streams.iter().any(|s| s.kind == kind) {
            return Err(Error::config(format!("{kind} stream already added")));
        }

        let mut stream = self
            .output
            .add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))
            .map_err(|e| Error::config(format!("failed to add {kind} stream: {e}")))?;
        stream.set_parameters(parameters);
        // Let the muxer pick the codec tag for the container
        unsafe {
            (*stream.parameters().as_mut_ptr()).codec_tag = 0;
        }
        stream.set_time_base(FFmpegRational::new(time_base.num, time_base.den));
        if !tags.is_empty() {
            stream.set_metadata(to_dictionary(tags));
        }

        let index = stream.index();
        debug!(stream = index, kind = %kind, time_base = %time_base, "added stream");
        self.streams.push(StreamSlot {
            kind,
            index,
            time_base,
        });
        Ok(index)
    }

    /**
        Write the container header.

        Stream time bases are re-read afterwards since muxers are free to
        change them.
    */
    pub fn write_header(&mut self) -> Result<()> {
        if self.streams.is_empty() {
            return Err(Error::config("container has no streams"));
        }
        self.output
            .write_header()
            .map_err(|e| Error::config(format!("failed to write header: {e}")))?;

        for slot in &mut self.streams {
            if let Some(stream) = self.output.stream(slot.index) {
                let tb = stream.time_base();
                let time_base = Rational::new(tb.numerator(), tb.denominator());
                if time_base != slot.time_base {
                    debug!(stream = slot.index, time_base = %time_base, "muxer changed time base");
                }
                slot.time_base = time_base;
            }
        }
        self.header_written = true;
        Ok(())
    }

    fn slot(&self, kind: StreamType) -> Option<&StreamSlot> {
        self.streams.iter().find(|s| s.kind == kind)
    }

    /**
        Write a packet to the sink.

        Packets are routed to the stream of their type and rescaled from
        the packet time base into the stream time base.
    */
    pub fn write(&mut self, packet: &Packet) -> Result<()> {
        if !self.header_written {
            return Err(Error::invalid_data("header not written"));
        }
        let slot = *self.slot(packet.stream_type).ok_or_else(|| {
            Error::invalid_data(format!("no {} stream configured", packet.stream_type))
        })?;

        // Create FFmpeg packet
        let mut ffmpeg_pkt = if packet.data.is_empty() {
            ffmpeg_next::Packet::empty()
        } else {
            ffmpeg_next::Packet::copy(&packet.data)
        };
        ffmpeg_pkt.set_stream(slot.index);

        let rescale = |ts: i64| Rational::rescale(ts, packet.time_base, slot.time_base);
        ffmpeg_pkt.set_pts(packet.pts.map(|pts| rescale(pts.0)));
        ffmpeg_pkt.set_dts(packet.dts.map(|dts| rescale(dts.0)));
        ffmpeg_pkt.set_duration(rescale(packet.duration.0));

        if packet.is_keyframe {
            ffmpeg_pkt.set_flags(ffmpeg_next::packet::Flags::KEY);
        }

        ffmpeg_pkt
            .write_interleaved(&mut self.output)
            .map_err(|e| Error::codec(format!("failed to write packet: {e}")))?;

        Ok(())
    }

    /**
        Finish writing and close the sink.

        This writes any trailing metadata (duration, seeking index) and
        finalizes the container. The file may be corrupt if this is not called.
    */
    pub fn finish(mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::invalid_data("header not written"));
        }
        self.output
            .write_trailer()
            .map_err(|e| Error::codec(format!("failed to write trailer: {e}")))?;
        info!(path = %self.path.display(), "finished output");
        Ok(())
    }

    /**
        Close the sink without a trailer and delete the file.
    */
    pub fn discard(self) {
        let Self { output, path, .. } = self;
        drop(output);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial output"),
        }
    }
}

impl PacketSink for Sink {
    fn write(&mut self, packet: &Packet) -> Result<()> {
        Sink::write(self, packet)
    }
}

fn to_dictionary(tags: &Tags) -> Dictionary<'static> {
    let mut dict = Dictionary::new();
    for (key, value) in tags {
        dict.set(key, value);
    }
    dict
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("path", &self.path)
            .field("streams", &self.streams)
            .field("header_written", &self.header_written)
            .finish_non_exhaustive()
    }
}
