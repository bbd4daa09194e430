/*!
    Timestamp newtypes in time_base units.
*/

use std::time::Duration;

use crate::Rational;

/**
    Presentation or decode timestamp in time_base units.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert to a std Duration. Negative timestamps clamp to zero.
    */
    pub fn to_duration(self, time_base: Rational) -> Duration {
        let secs = self.0 as f64 * time_base.to_f64();
        Duration::from_secs_f64(secs.max(0.0))
    }

    /**
        Rescale into another time base.
    */
    pub fn rescale(self, from: Rational, to: Rational) -> Self {
        Self(Rational::rescale(self.0, from, to))
    }
}

/**
    Duration in time_base units.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);

impl MediaDuration {
    /**
        Convert to a std Duration. Negative durations clamp to zero.
    */
    pub fn to_duration(self, time_base: Rational) -> Duration {
        let secs = self.0 as f64 * time_base.to_f64();
        Duration::from_secs_f64(secs.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_to_duration() {
        let tb = Rational::new(1, 48000);
        assert_eq!(Pts(48000).to_duration(tb), Duration::from_secs(1));
        assert_eq!(Pts(-5).to_duration(tb), Duration::ZERO);
    }

    #[test]
    fn pts_rescale() {
        let pts = Pts(2).rescale(Rational::new(1, 25), Rational::new(1, 1000));
        assert_eq!(pts, Pts(80));
    }

    #[test]
    fn duration_to_std() {
        assert_eq!(
            MediaDuration(1024).to_duration(Rational::new(1, 1024)),
            Duration::from_secs(1)
        );
    }
}
