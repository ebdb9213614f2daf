use std::io::Write;
use std::path::Path;

use log::debug;

use crate::constants::{JSON_EXTENSIONS, STDOUT_INDICATOR, YAML_EXTENSIONS};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::preprocess::{PlaceholderValue, Placeholders};

pub fn create_dir_all<P: AsRef<Path>>(dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    std::fs::create_dir_all(dest_path).map_err(Error::IoError)
}

/// Writes `content` to `dest_path`, creating parent directories as needed.
pub fn write_file<P: AsRef<Path>>(content: &str, dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    let base_path = std::env::current_dir().unwrap_or_default();
    let abs_path = if dest_path.is_absolute() {
        dest_path.to_path_buf()
    } else {
        base_path.join(dest_path)
    };

    if let Some(parent) = abs_path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(abs_path, content).map_err(Error::IoError)
}

/// Writes rendered output to a file, or to stdout for `None` and `-`.
pub fn write_output<P: AsRef<Path>>(content: &str, dest_path: Option<P>) -> Result<()> {
    match dest_path {
        Some(path) if path.as_ref() != Path::new(STDOUT_INDICATOR) => {
            debug!("Writing output to {}", path.as_ref().display());
            write_file(content, path)
        }
        _ => write_to(std::io::stdout().lock(), content),
    }
}

pub fn write_to(mut writer: impl Write, content: &str) -> Result<()> {
    writer.write_all(content.as_bytes()).map_err(Error::IoError)?;
    writer.flush().map_err(Error::IoError)
}

pub fn read_from(mut reader: impl std::io::Read) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(Error::IoError)?;
    Ok(buf)
}

/// Loads placeholder values from a JSON or YAML mapping, picked by extension.
pub fn load_placeholders_file<P: AsRef<Path>>(path: P) -> Result<Placeholders> {
    let path = path.as_ref();
    let content = read_from(std::fs::File::open(path)?)?;
    let ext = path.extension_lowercase().unwrap_or_default();

    if JSON_EXTENSIONS.contains(&ext.as_str()) {
        Ok(serde_json::from_str(&content)?)
    } else if YAML_EXTENSIONS.contains(&ext.as_str()) {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Err(Error::PlaceholderParseError(format!(
            "{}: unsupported placeholder file type",
            path.to_str_checked()?
        )))
    }
}

/// Parses a `KEY=VALUE` pair given on the command line.
pub fn parse_placeholder_arg(raw: &str) -> Result<(String, PlaceholderValue)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), PlaceholderValue::from_cli(value)))
        }
        _ => Err(Error::PlaceholderParseError(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs() {
        assert_eq!(
            parse_placeholder_arg("PORT=8080").unwrap(),
            ("PORT".to_string(), PlaceholderValue::Int(8080))
        );
        assert_eq!(
            parse_placeholder_arg("HOST=a=b").unwrap(),
            ("HOST".to_string(), PlaceholderValue::Str("a=b".into()))
        );
        assert!(matches!(
            parse_placeholder_arg("=1"),
            Err(Error::PlaceholderParseError(_))
        ));
        assert!(matches!(
            parse_placeholder_arg("PORT"),
            Err(Error::PlaceholderParseError(_))
        ));
    }

    #[test]
    fn loads_json_and_yaml_placeholder_files() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("values.json");
        std::fs::write(&json, r#"{"PORT": 8080, "HOST": "example.org"}"#).unwrap();
        let values = load_placeholders_file(&json).unwrap();
        assert_eq!(values["PORT"], PlaceholderValue::Int(8080));
        assert_eq!(values["HOST"], PlaceholderValue::Str("example.org".into()));

        let yaml = dir.path().join("values.yml");
        std::fs::write(&yaml, "PORT: 443\nRATIO: 0.5\n").unwrap();
        let values = load_placeholders_file(&yaml).unwrap();
        assert_eq!(values["PORT"], PlaceholderValue::Int(443));
        assert_eq!(values["RATIO"], PlaceholderValue::Float(0.5));
    }

    #[test]
    fn rejects_unknown_placeholder_file_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.toml");
        std::fs::write(&path, "PORT = 1").unwrap();
        assert!(matches!(
            load_placeholders_file(&path),
            Err(Error::PlaceholderParseError(_))
        ));
    }

    #[test]
    fn writes_output_files_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/site.conf");
        write_output("listen 80;\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "listen 80;\n");
    }

    #[test]
    fn write_to_copies_content() {
        let mut buf = Vec::new();
        write_to(&mut buf, "x\n").unwrap();
        assert_eq!(buf, b"x\n");
    }
}
