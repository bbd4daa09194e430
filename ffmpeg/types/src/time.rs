/*!
    Caller-facing media times.
*/

use std::fmt;
use std::ops::{Add, Sub};

/**
    A point in time expressed as `value` units of `1/rate` seconds.

    Frame times use the frame rate as their rate (`RationalTime::new(12.0, 24.0)`
    is frame 12 at 24 fps), audio times usually use the sample rate.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RationalTime {
    pub value: f64,
    pub rate: f64,
}

impl RationalTime {
    /**
        Create a new time.
    */
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /**
        Zero at the given rate.
    */
    pub const fn zero(rate: f64) -> Self {
        Self { value: 0.0, rate }
    }

    /**
        Returns true if the rate is usable for conversions.
    */
    pub fn is_valid(&self) -> bool {
        self.rate > 0.0 && self.value.is_finite()
    }

    /**
        Express this time at a different rate.
    */
    pub fn rescaled_to(self, rate: f64) -> Self {
        if self.rate == rate {
            return self;
        }
        Self {
            value: self.value * rate / self.rate,
            rate,
        }
    }

    /**
        Returns the time in seconds.
    */
    pub fn to_seconds(self) -> f64 {
        self.value / self.rate
    }

    /**
        Returns the time as a whole number of `1/rate` units, rounded to
        the nearest unit.
    */
    pub fn to_units(self, rate: f64) -> i64 {
        self.rescaled_to(rate).value.round() as i64
    }
}

impl Add for RationalTime {
    type Output = RationalTime;

    fn add(self, rhs: Self) -> Self::Output {
        let rhs = rhs.rescaled_to(self.rate);
        Self::new(self.value + rhs.value, self.rate)
    }
}

impl Sub for RationalTime {
    type Output = RationalTime;

    fn sub(self, rhs: Self) -> Self::Output {
        let rhs = rhs.rescaled_to(self.rate);
        Self::new(self.value - rhs.value, self.rate)
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.rate)
    }
}

/**
    A half-open span of media time.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    /**
        Create a new range.
    */
    pub const fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /**
        Exclusive end of the range, at the start's rate.
    */
    pub fn end_exclusive(&self) -> RationalTime {
        self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_frames_to_samples() {
        let t = RationalTime::new(24.0, 24.0);
        assert_eq!(t.to_units(48000.0), 48000);
    }

    #[test]
    fn subtraction_uses_left_rate() {
        let t = RationalTime::new(48.0, 24.0) - RationalTime::new(1.0, 1.0);
        assert_eq!(t, RationalTime::new(24.0, 24.0));
    }

    #[test]
    fn to_units_rounds() {
        let t = RationalTime::new(1.0, 3.0);
        assert_eq!(t.to_units(2.0), 1);
    }

    #[test]
    fn range_end() {
        let range = TimeRange::new(RationalTime::new(100.0, 48000.0), RationalTime::new(37.0, 48000.0));
        assert_eq!(range.end_exclusive(), RationalTime::new(137.0, 48000.0));
    }

    #[test]
    fn validity() {
        assert!(RationalTime::new(0.0, 24.0).is_valid());
        assert!(!RationalTime::new(0.0, 0.0).is_valid());
        assert!(!RationalTime::new(f64::NAN, 24.0).is_valid());
    }
}
