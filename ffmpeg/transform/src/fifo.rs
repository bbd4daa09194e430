/*!
    Audio sample FIFO.
*/

use ffmpeg_types::{Error, Result, SampleFormat};

/**
    Queue of not-yet-encoded samples in an encoder's sample format.

    Holds one plane per channel for planar formats and a single
    interleaved plane otherwise. Input may arrive in either the packed or
    the planar form of the same sample type; it is interleaved or
    deinterleaved on the way in.
*/
#[derive(Clone, Debug)]
pub struct AudioFifo {
    format: SampleFormat,
    channels: usize,
    planes: Vec<Vec<u8>>,
    samples: usize,
}

impl AudioFifo {
    /**
        Create an empty FIFO.
    */
    pub fn new(format: SampleFormat, channels: u16) -> Self {
        let channels = channels.max(1) as usize;
        let plane_count = if format.is_planar() { channels } else { 1 };
        Self {
            format,
            channels,
            planes: vec![Vec::new(); plane_count],
            samples: 0,
        }
    }

    /**
        Number of buffered samples per channel.
    */
    pub fn len(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn channels(&self) -> u16 {
        self.channels as u16
    }

    /**
        Append `samples` samples per channel.

        `data` holds either interleaved samples or concatenated planes,
        according to `format`.
    */
    pub fn push(&mut self, data: &[u8], format: SampleFormat, samples: usize) -> Result<()> {
        if format.to_packed() != self.format.to_packed() {
            return Err(Error::invalid_data(format!(
                "cannot queue {} samples in a {} fifo",
                format, self.format
            )));
        }
        let bps = self.format.bytes_per_sample();
        let expected = samples * self.channels * bps;
        if data.len() != expected {
            return Err(Error::invalid_data(format!(
                "{} samples x {} channels need {} bytes, got {}",
                samples,
                self.channels,
                expected,
                data.len()
            )));
        }

        match (format.is_planar(), self.format.is_planar()) {
            (false, false) => self.planes[0].extend_from_slice(data),
            (true, true) => {
                let plane_len = samples * bps;
                for (plane, chunk) in self.planes.iter_mut().zip(data.chunks_exact(plane_len)) {
                    plane.extend_from_slice(chunk);
                }
            }
            (false, true) => {
                // Deinterleave
                for frame in data.chunks_exact(self.channels * bps) {
                    for (plane, sample) in self.planes.iter_mut().zip(frame.chunks_exact(bps)) {
                        plane.extend_from_slice(sample);
                    }
                }
            }
            (true, false) => {
                // Interleave
                let plane_len = samples * bps;
                let out = &mut self.planes[0];
                out.reserve(expected);
                for i in 0..samples {
                    for channel in 0..self.channels {
                        let start = channel * plane_len + i * bps;
                        out.extend_from_slice(&data[start..start + bps]);
                    }
                }
            }
        }

        self.samples += samples;
        Ok(())
    }

    /**
        Remove up to `samples` samples per channel from the front.

        Returns the number of samples removed and their data as
        concatenated planes in the FIFO's format.
    */
    pub fn pop(&mut self, samples: usize) -> (usize, Vec<u8>) {
        let count = samples.min(self.samples);
        let bps = self.format.bytes_per_sample();
        let bytes = if self.format.is_planar() {
            count * bps
        } else {
            count * bps * self.channels
        };

        let mut out = Vec::with_capacity(bytes * self.planes.len());
        for plane in &mut self.planes {
            out.extend(plane.drain(..bytes));
        }
        self.samples -= count;
        (count, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    #[test]
    fn deinterleaves_into_planes() {
        let mut fifo = AudioFifo::new(SampleFormat::S16Planar, 2);
        fifo.push(&s16_bytes(&[1, -1, 2, -2, 3, -3]), SampleFormat::S16, 3)
            .unwrap();
        assert_eq!(fifo.len(), 3);

        let (count, data) = fifo.pop(2);
        assert_eq!(count, 2);
        assert_eq!(data, s16_bytes(&[1, 2, -1, -2]));
        assert_eq!(fifo.len(), 1);

        let (count, data) = fifo.pop(10);
        assert_eq!(count, 1);
        assert_eq!(data, s16_bytes(&[3, -3]));
        assert!(fifo.is_empty());
    }

    #[test]
    fn interleaves_planar_input() {
        let mut fifo = AudioFifo::new(SampleFormat::S16, 2);
        fifo.push(&s16_bytes(&[1, 2, -1, -2]), SampleFormat::S16Planar, 2)
            .unwrap();
        let (_, data) = fifo.pop(2);
        assert_eq!(data, s16_bytes(&[1, -1, 2, -2]));
    }

    #[test]
    fn rejects_other_sample_types_and_sizes() {
        let mut fifo = AudioFifo::new(SampleFormat::F32Planar, 2);
        assert!(fifo.push(&[0; 8], SampleFormat::S16, 2).is_err());
        assert!(fifo.push(&[0; 12], SampleFormat::F32, 2).is_err());
        assert!(fifo.is_empty());
    }

    #[test]
    fn occupancy_stays_below_frame_size_after_drain() {
        let frame_size = 1024;
        let mut fifo = AudioFifo::new(SampleFormat::F32Planar, 2);
        let chunk = vec![0u8; 37 * 2 * 4];
        let mut popped = 0;
        for _ in 0..200 {
            fifo.push(&chunk, SampleFormat::F32, 37).unwrap();
            while fifo.len() >= frame_size {
                let (count, data) = fifo.pop(frame_size);
                assert_eq!(count, frame_size);
                assert_eq!(data.len(), frame_size * 2 * 4);
                popped += count;
            }
            assert!(fifo.len() < frame_size);
        }
        assert_eq!(popped + fifo.len(), 200 * 37);
    }
}
