//! Layered conversion defaults: built-in values, then a config file, then
//! `COORD_CONVERTER_*` environment variables. Command-line flags are applied
//! on top by the CLI.

use crate::error::Result;
use crate::models::{ConversionRequest, CoordinateSystem, OutputSystems, Separator};
use crate::utils::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub include_header: bool,
    pub lon_column: usize,
    pub lat_column: usize,
    pub same_column: bool,
    pub separator: Separator,
    pub source: CoordinateSystem,
    #[validate(custom(function = "validate_outputs"))]
    pub outputs: OutputSystems,
    pub encoding: Option<String>,
    pub overwrite: bool,
}

fn validate_outputs(outputs: &OutputSystems) -> std::result::Result<(), ValidationError> {
    if outputs.is_empty() {
        return Err(ValidationError::new("empty_outputs"));
    }
    Ok(())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_header: false,
            lon_column: 0,
            lat_column: 1,
            same_column: false,
            separator: Separator::Comma,
            source: CoordinateSystem::Bd09,
            outputs: OutputSystems::new().with(CoordinateSystem::Wgs84),
            encoding: None,
            overwrite: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `coord-converter.toml` in the
    /// working directory when no path is given and that file exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("outputs"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn to_request(&self, input_paths: Vec<PathBuf>) -> ConversionRequest {
        let mut request = ConversionRequest::new(input_paths, self.source, self.outputs)
            .with_header(self.include_header)
            .with_encoding(self.encoding.clone());
        request.lon_index = self.lon_column;
        request.lat_index = self.lat_column;
        request.same_column = self.same_column;
        request.separator = self.separator;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_toml_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
include_header = true
lon_column = 3
same_column = true
separator = "space"
source = "GCJ02"
outputs = ["wgs84", "bd09"]
"#
        )?;
        file.flush()?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(
            settings,
            Settings {
                include_header: true,
                lon_column: 3,
                same_column: true,
                separator: Separator::Space,
                source: CoordinateSystem::Gcj02,
                outputs: OutputSystems::new()
                    .with(CoordinateSystem::Bd09)
                    .with(CoordinateSystem::Wgs84),
                ..Settings::default()
            }
        );
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "separator = \":\"")?;
        file.flush()?;
        assert!(Settings::load(Some(file.path())).is_err());

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "source = \"cgcs2000\"")?;
        file.flush()?;
        assert!(Settings::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_empty_outputs_fail_validation() {
        let settings = Settings {
            outputs: OutputSystems::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_to_request() {
        let settings = Settings {
            lon_column: 4,
            lat_column: 5,
            ..Settings::default()
        };
        let request = settings.to_request(vec![PathBuf::from("a.csv")]);
        assert_eq!(request.lon_index, 4);
        assert_eq!(request.lat_index, 5);
        assert_eq!(request.source, CoordinateSystem::Bd09);
        assert!(request.outputs.contains(CoordinateSystem::Wgs84));
    }
}
