/*!
    HDR mastering metadata carried on tagged images.
*/

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/**
    Image tag key holding a JSON-encoded [`HdrMetadata`] record.
*/
pub const HDR_TAG: &str = "hdr";

/**
    CIE 1931 xy chromaticity coordinate.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chromaticity {
    pub x: f64,
    pub y: f64,
}

/**
    Primaries and white point of a mastering display.
*/
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrimaries {
    pub red: Chromaticity,
    pub green: Chromaticity,
    pub blue: Chromaticity,
    pub white: Chromaticity,
}

impl Default for DisplayPrimaries {
    /**
        BT.2020 primaries with a D65 white point.
    */
    fn default() -> Self {
        Self {
            red: Chromaticity { x: 0.708, y: 0.292 },
            green: Chromaticity { x: 0.170, y: 0.797 },
            blue: Chromaticity { x: 0.131, y: 0.046 },
            white: Chromaticity {
                x: 0.3127,
                y: 0.3290,
            },
        }
    }
}

/**
    Luminance bounds in cd/m².
*/
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LuminanceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for LuminanceRange {
    fn default() -> Self {
        Self {
            min: 0.005,
            max: 1000.0,
        }
    }
}

/**
    HDR mastering display and content light level metadata.

    Serialized as camelCase JSON, e.g.

    ```json
    {
      "primaries": {
        "red": {"x": 0.708, "y": 0.292},
        "green": {"x": 0.17, "y": 0.797},
        "blue": {"x": 0.131, "y": 0.046},
        "white": {"x": 0.3127, "y": 0.329}
      },
      "displayMasteringLuminance": {"min": 0.005, "max": 1000.0},
      "maxCLL": 1000.0,
      "maxFALL": 400.0
    }
    ```
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HdrMetadata {
    pub primaries: DisplayPrimaries,
    pub display_mastering_luminance: LuminanceRange,
    /// Maximum content light level, cd/m²
    #[serde(rename = "maxCLL")]
    pub max_cll: f64,
    /// Maximum frame-average light level, cd/m²
    #[serde(rename = "maxFALL")]
    pub max_fall: f64,
}

impl HdrMetadata {
    /**
        Parse a record from its JSON tag value.
    */
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_data(format!("malformed HDR metadata: {e}")))
    }

    /**
        Serialize the record to JSON for use as an image tag.
    */
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::invalid_data(format!("cannot serialize HDR metadata: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_record() {
        let json = r#"{
            "primaries": {
                "red": {"x": 0.68, "y": 0.32},
                "green": {"x": 0.265, "y": 0.69},
                "blue": {"x": 0.15, "y": 0.06},
                "white": {"x": 0.3127, "y": 0.329}
            },
            "displayMasteringLuminance": {"min": 0.0, "max": 4000.0},
            "maxCLL": 1200.0,
            "maxFALL": 350.0
        }"#;
        let hdr = HdrMetadata::from_json(json).unwrap();
        assert_eq!(hdr.primaries.red, Chromaticity { x: 0.68, y: 0.32 });
        assert_eq!(hdr.display_mastering_luminance.max, 4000.0);
        assert_eq!(hdr.display_mastering_luminance.min, 0.0);
        assert_eq!(hdr.max_cll, 1200.0);
        assert_eq!(hdr.max_fall, 350.0);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let hdr = HdrMetadata::from_json(r#"{"maxCLL": 800}"#).unwrap();
        assert_eq!(hdr.max_cll, 800.0);
        assert_eq!(hdr.primaries, DisplayPrimaries::default());
        assert_eq!(hdr.display_mastering_luminance, LuminanceRange::default());
    }

    #[test]
    fn json_round_trip_uses_tag_names() {
        let hdr = HdrMetadata {
            max_cll: 1000.0,
            max_fall: 400.0,
            ..Default::default()
        };
        let json = hdr.to_json().unwrap();
        assert!(json.contains("\"maxCLL\""));
        assert!(json.contains("\"displayMasteringLuminance\""));
        assert_eq!(HdrMetadata::from_json(&json).unwrap(), hdr);
    }

    #[test]
    fn malformed_is_invalid_data() {
        let err = HdrMetadata::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
    }
}
