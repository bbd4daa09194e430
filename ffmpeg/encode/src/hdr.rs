/*!
    HDR side data on video frames.
*/

use std::os::raw::{c_int, c_uint};

use ffmpeg_next::{ffi, util::frame::video::Video as VideoFrameFFmpeg};

use ffmpeg_types::{Chromaticity, Error, HdrMetadata, Result};

/// Chromaticity coordinates are stored in units of 1/50000.
const CHROMA_DEN: c_int = 50000;
/// Luminance is stored in units of 1/10000 cd/m².
const LUMA_DEN: c_int = 10000;
/// Smallest mastering luminance written, in cd/m².
pub const MIN_LUMINANCE: f64 = 0.0001;

const SIDE_DATA: [ffi::AVFrameSideDataType; 2] = [
    ffi::AVFrameSideDataType::AV_FRAME_DATA_MASTERING_DISPLAY_METADATA,
    ffi::AVFrameSideDataType::AV_FRAME_DATA_CONTENT_LIGHT_LEVEL,
];

fn q(value: f64, den: c_int) -> ffi::AVRational {
    ffi::AVRational {
        num: (value * den as f64).round() as c_int,
        den,
    }
}

fn chroma(c: Chromaticity) -> [ffi::AVRational; 2] {
    [q(c.x, CHROMA_DEN), q(c.y, CHROMA_DEN)]
}

/**
    Attach mastering display and content light level side data to a frame,
    replacing any the frame already carries.
*/
pub fn attach(frame: &mut VideoFrameFFmpeg, hdr: &HdrMetadata) -> Result<()> {
    clear(frame);
    unsafe {
        let ptr = frame.as_mut_ptr();

        let mastering = ffi::av_mastering_display_metadata_create_side_data(ptr);
        if mastering.is_null() {
            return Err(Error::codec("failed to allocate mastering display side data"));
        }
        let primaries = &hdr.primaries;
        (*mastering).display_primaries = [
            chroma(primaries.red),
            chroma(primaries.green),
            chroma(primaries.blue),
        ];
        (*mastering).white_point = chroma(primaries.white);
        let luminance = &hdr.display_mastering_luminance;
        (*mastering).min_luminance = q(luminance.min.max(MIN_LUMINANCE), LUMA_DEN);
        (*mastering).max_luminance = q(luminance.max, LUMA_DEN);
        (*mastering).has_primaries = 1;
        (*mastering).has_luminance = 1;

        let light = ffi::av_content_light_metadata_create_side_data(ptr);
        if light.is_null() {
            return Err(Error::codec("failed to allocate content light side data"));
        }
        (*light).MaxCLL = hdr.max_cll.max(0.0).round() as c_uint;
        (*light).MaxFALL = hdr.max_fall.max(0.0).round() as c_uint;
    }
    Ok(())
}

/**
    Remove HDR side data from a frame.
*/
pub fn clear(frame: &mut VideoFrameFFmpeg) {
    unsafe {
        let ptr = frame.as_mut_ptr();
        for kind in SIDE_DATA {
            ffi::av_frame_remove_side_data(ptr, kind);
        }
    }
}

/**
    Returns true if the frame carries any HDR side data.
*/
pub fn has_side_data(frame: &VideoFrameFFmpeg) -> bool {
    unsafe {
        let ptr = frame.as_ptr();
        SIDE_DATA
            .iter()
            .any(|&kind| !ffi::av_frame_get_side_data(ptr, kind).is_null())
    }
}

/**
    Mastering minimum luminance as written, in 1/10000 cd/m² units.
*/
pub fn min_luminance_units(frame: &VideoFrameFFmpeg) -> Option<i32> {
    unsafe {
        let side = ffi::av_frame_get_side_data(frame.as_ptr(), SIDE_DATA[0]);
        if side.is_null() {
            return None;
        }
        let mastering = (*side).data as *const ffi::AVMasteringDisplayMetadata;
        Some((*mastering).min_luminance.num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_next::format::Pixel;

    #[test]
    fn attach_then_clear() {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV422P10LE, 16, 16);
        assert!(!has_side_data(&frame));

        attach(&mut frame, &HdrMetadata::default()).unwrap();
        assert!(has_side_data(&frame));

        clear(&mut frame);
        assert!(!has_side_data(&frame));
    }

    #[test]
    fn zero_minimum_luminance_is_floored() {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV422P10LE, 16, 16);
        let mut hdr = HdrMetadata::default();
        hdr.display_mastering_luminance.min = 0.0;
        attach(&mut frame, &hdr).unwrap();
        assert_eq!(min_luminance_units(&frame), Some(1));
    }

    #[test]
    fn attach_replaces_previous_record() {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, 16, 16);
        attach(&mut frame, &HdrMetadata::default()).unwrap();
        let mut hdr = HdrMetadata::default();
        hdr.display_mastering_luminance.min = 0.05;
        attach(&mut frame, &hdr).unwrap();
        assert_eq!(min_luminance_units(&frame), Some(500));
    }
}
