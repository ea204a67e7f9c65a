use crate::error::{ConversionError, Result};
use crate::models::{ConversionRequest, CoordinateSystem, OutputSystems, Separator};
use crate::transform::transform;

/// Read the longitude and latitude of a row
pub fn extract_lonlat(
    row: &[String],
    lon_index: usize,
    lat_index: usize,
    same_column: bool,
    separator: Separator,
) -> Result<(f64, f64)> {
    let len = row.len();

    if !same_column {
        for index in [lon_index, lat_index] {
            if index >= len {
                return Err(ConversionError::MissingColumn { index, len });
            }
        }
        return Ok((parse_number(&row[lon_index])?, parse_number(&row[lat_index])?));
    }

    let cell = row
        .get(lon_index)
        .ok_or(ConversionError::MissingColumn { index: lon_index, len })?;
    let mut parts = cell.split(separator.as_char());
    match (parts.next(), parts.next()) {
        (Some(lon), Some(lat)) => Ok((parse_number(lon)?, parse_number(lat)?)),
        _ => Err(ConversionError::InvalidLonLatPair {
            value: cell.clone(),
            separator: separator.as_char(),
        }),
    }
}

fn parse_number(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConversionError::InvalidNumber {
            value: value.to_string(),
        })
}

/// Coordinates of one point in every requested system, flattened as
/// `[x, y, x, y, ...]` in BD09 -> GCJ02 -> WGS84 order
pub fn convert_lonlat(
    lon: f64,
    lat: f64,
    source: CoordinateSystem,
    outputs: OutputSystems,
) -> Vec<f64> {
    let mut result = Vec::with_capacity(outputs.len() * 2);
    for target in outputs.iter() {
        let (x, y) = transform(lon, lat, source, target);
        result.push(x);
        result.push(y);
    }
    result
}

/// Column names appended to a header row, matching `convert_lonlat` order
pub fn header_columns(outputs: OutputSystems) -> Vec<String> {
    outputs
        .iter()
        .flat_map(|system| system.column_names())
        .map(str::to_string)
        .collect()
}

/// Turns input rows into output rows according to a request
#[derive(Debug, Clone)]
pub struct RowConverter {
    include_header: bool,
    lon_index: usize,
    lat_index: usize,
    same_column: bool,
    separator: Separator,
    source: CoordinateSystem,
    outputs: OutputSystems,
}

impl RowConverter {
    pub fn new(source: CoordinateSystem, outputs: OutputSystems) -> Self {
        Self {
            include_header: false,
            lon_index: 0,
            lat_index: 1,
            same_column: false,
            separator: Separator::default(),
            source,
            outputs,
        }
    }

    pub fn from_request(request: &ConversionRequest) -> Self {
        Self {
            include_header: request.include_header,
            lon_index: request.lon_index,
            lat_index: request.lat_index,
            same_column: request.same_column,
            separator: request.separator,
            source: request.source,
            outputs: request.outputs,
        }
    }

    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    pub fn with_columns(mut self, lon_index: usize, lat_index: usize) -> Self {
        self.lon_index = lon_index;
        self.lat_index = lat_index;
        self.same_column = false;
        self
    }

    pub fn with_same_column(mut self, index: usize, separator: Separator) -> Self {
        self.lon_index = index;
        self.lat_index = index;
        self.same_column = true;
        self.separator = separator;
        self
    }

    pub fn is_header(&self, index: usize) -> bool {
        index == 0 && self.include_header
    }

    /// Values appended to the row at `index`; the row itself is left alone
    pub fn appended_cells(&self, index: usize, row: &[String]) -> Result<Vec<String>> {
        if self.is_header(index) {
            return Ok(header_columns(self.outputs));
        }

        let (lon, lat) =
            extract_lonlat(row, self.lon_index, self.lat_index, self.same_column, self.separator)?;
        Ok(convert_lonlat(lon, lat, self.source, self.outputs)
            .into_iter()
            .map(|value| format!("{:?}", value))
            .collect())
    }

    /// Original cells followed by the appended cells, as a new row
    pub fn convert_row(&self, index: usize, row: &[String]) -> Result<Vec<String>> {
        let appended = self.appended_cells(index, row)?;
        Ok(row.iter().cloned().chain(appended).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_extract_same_column() {
        let lonlat = extract_lonlat(&row(&["116.3,39.9"]), 0, 0, true, Separator::Comma).unwrap();
        assert_eq!(lonlat, (116.3, 39.9));

        let lonlat = extract_lonlat(&row(&["a", "116.3 39.9"]), 1, 0, true, Separator::Space).unwrap();
        assert_eq!(lonlat, (116.3, 39.9));
    }

    #[test]
    fn test_extract_separate_columns() {
        let lonlat =
            extract_lonlat(&row(&["116.3", "39.9", "extra"]), 0, 1, false, Separator::Comma).unwrap();
        assert_eq!(lonlat, (116.3, 39.9));

        let lonlat = extract_lonlat(&row(&[" 39.9", "116.3 "]), 1, 0, false, Separator::Comma).unwrap();
        assert_eq!(lonlat, (116.3, 39.9));
    }

    #[test]
    fn test_extract_errors() {
        assert!(matches!(
            extract_lonlat(&row(&["116.3"]), 0, 1, false, Separator::Comma),
            Err(ConversionError::MissingColumn { index: 1, len: 1 })
        ));
        assert!(matches!(
            extract_lonlat(&row(&["116.3"]), 3, 0, true, Separator::Comma),
            Err(ConversionError::MissingColumn { index: 3, len: 1 })
        ));
        assert!(matches!(
            extract_lonlat(&row(&["abc", "39.9"]), 0, 1, false, Separator::Comma),
            Err(ConversionError::InvalidNumber { .. })
        ));
        assert!(matches!(
            extract_lonlat(&row(&["116.3"]), 0, 0, true, Separator::Pipe),
            Err(ConversionError::InvalidLonLatPair { .. })
        ));
        assert!(matches!(
            extract_lonlat(&row(&["116.3|north"]), 0, 0, true, Separator::Pipe),
            Err(ConversionError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_identity_output_is_exact() {
        let outputs = OutputSystems::new().with(CoordinateSystem::Bd09);
        assert_eq!(
            convert_lonlat(116.3, 39.9, CoordinateSystem::Bd09, outputs),
            vec![116.3, 39.9]
        );
    }

    #[test]
    fn test_output_order_is_fixed() {
        let outputs = OutputSystems::all();
        let values = convert_lonlat(116.3, 39.9, CoordinateSystem::Gcj02, outputs);
        assert_eq!(values.len(), 6);
        // GCJ02 pair sits in the middle, untouched
        assert_eq!(&values[2..4], &[116.3, 39.9]);
        assert_eq!(
            (values[0], values[1]),
            crate::transform::gcj02_to_bd09(116.3, 39.9)
        );
        assert_eq!(
            (values[4], values[5]),
            crate::transform::gcj02_to_wgs84(116.3, 39.9)
        );
    }

    #[test]
    fn test_header_columns() {
        let outputs = OutputSystems::new()
            .with(CoordinateSystem::Wgs84)
            .with(CoordinateSystem::Gcj02);
        assert_eq!(
            header_columns(outputs),
            vec!["gcj02_x", "gcj02_y", "wgs84_x", "wgs84_y"]
        );
    }

    #[test]
    fn test_convert_header_row() {
        let converter = RowConverter::new(
            CoordinateSystem::Bd09,
            OutputSystems::new()
                .with(CoordinateSystem::Gcj02)
                .with(CoordinateSystem::Wgs84),
        )
        .with_header(true);

        let converted = converter.convert_row(0, &row(&["name", "lon", "lat"])).unwrap();
        assert_eq!(
            converted,
            row(&["name", "lon", "lat", "gcj02_x", "gcj02_y", "wgs84_x", "wgs84_y"])
        );
    }

    #[test]
    fn test_convert_data_row_keeps_original_cells() {
        let converter = RowConverter::new(
            CoordinateSystem::Wgs84,
            OutputSystems::new().with(CoordinateSystem::Wgs84),
        )
        .with_columns(0, 1);

        let input = row(&["116.3", "39.9", "extra"]);
        let converted = converter.convert_row(1, &input).unwrap();
        assert_eq!(converted, row(&["116.3", "39.9", "extra", "116.3", "39.9"]));
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_integral_values_keep_a_decimal_point() {
        let converter = RowConverter::new(
            CoordinateSystem::Gcj02,
            OutputSystems::new().with(CoordinateSystem::Gcj02),
        );

        let converted = converter.convert_row(0, &row(&["116", "40"])).unwrap();
        assert_eq!(converted, row(&["116", "40", "116.0", "40.0"]));
    }

    #[test]
    fn test_blank_row_is_missing_columns() {
        let converter = RowConverter::new(CoordinateSystem::Gcj02, OutputSystems::all());
        assert!(matches!(
            converter.convert_row(3, &[]),
            Err(ConversionError::MissingColumn { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_first_row_is_data_without_header() {
        let converter = RowConverter::new(CoordinateSystem::Gcj02, OutputSystems::all());
        assert!(!converter.is_header(0));
        assert!(converter.convert_row(0, &row(&["lon", "lat"])).is_err());
    }
}
