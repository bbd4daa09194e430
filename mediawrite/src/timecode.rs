/*!
    SMPTE timecode strings.
*/

use std::fmt;
use std::str::FromStr;

use ffmpeg_types::Error;

/**
    A SMPTE timecode, `HH:MM:SS:FF` or drop-frame `HH:MM:SS;FF`.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub drop_frame: bool,
}

impl FromStr for Timecode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_data(format!("invalid timecode '{s}'"));

        let s = s.trim();
        let (head, frames, drop_frame) = match (s.rfind(';'), s.rfind(':')) {
            (Some(semi), colon) if colon.is_none_or(|c| c < semi) => (&s[..semi], &s[semi + 1..], true),
            (_, Some(colon)) => (&s[..colon], &s[colon + 1..], false),
            _ => return Err(invalid()),
        };

        let fields: Vec<&str> = head.split(':').collect();
        let [hours, minutes, seconds] = fields.as_slice() else {
            return Err(invalid());
        };

        let field = |text: &str, max: u8| -> Result<u8, Error> {
            if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            text.parse::<u8>()
                .ok()
                .filter(|&v| v <= max)
                .ok_or_else(invalid)
        };

        Ok(Self {
            hours: field(hours, 23)?,
            minutes: field(minutes, 59)?,
            seconds: field(seconds, 59)?,
            frames: field(frames, 99)?,
            drop_frame,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.drop_frame { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{sep}{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}
