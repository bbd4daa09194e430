/*!
    Encoder preset files.

    A preset is a plain text file of `key: value` lines that are passed to
    the encoder as options. Blank lines and lines starting with `#` are
    ignored.
*/

use std::path::Path;

use ffmpeg_types::{Error, Result};

/**
    Parse preset text into ordered option pairs.
*/
pub fn parse_preset(text: &str) -> Result<Vec<(String, String)>> {
    let mut options = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(Error::invalid_data(format!(
                "preset line {} has no ':' separator",
                index + 1
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::invalid_data(format!(
                "preset line {} has an empty key",
                index + 1
            )));
        }
        options.push((key.to_string(), value.trim().to_string()));
    }
    Ok(options)
}

/**
    Read and parse a preset file.
*/
pub fn load_preset(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)?;
    parse_preset(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_pairs_in_order() {
        let text = "# x264 tuning\npreset: slow\n\ncrf : 18\nx264-params: keyint=24:min-keyint=24\n";
        let options = parse_preset(text).unwrap();
        assert_eq!(
            options,
            [
                ("preset".to_string(), "slow".to_string()),
                ("crf".to_string(), "18".to_string()),
                (
                    "x264-params".to_string(),
                    "keyint=24:min-keyint=24".to_string()
                ),
            ]
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        let err = parse_preset("preset: slow\ncrf 18\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_preset(": value").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile: 3").unwrap();
        let options = load_preset(file.path()).unwrap();
        assert_eq!(options, [("profile".to_string(), "3".to_string())]);
        assert!(matches!(
            load_preset(file.path().with_extension("missing")),
            Err(Error::Io(_))
        ));
    }
}
