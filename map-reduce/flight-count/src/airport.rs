// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::flight_record::airport_code;

const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AirportParseError {
    #[error("expected {expected} fields, found {0}", expected = FIELD_COUNT)]
    FieldCount(usize),
    #[error("airport name is empty")]
    EmptyName,
    #[error("`{0}` is not a three-letter airport code")]
    Code(String),
    #[error("`{value}` is not a valid {field}")]
    Coordinate { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("airport list line {line}: {reason}")]
pub struct AirportListError {
    pub line: usize,
    #[source]
    pub reason: AirportParseError,
}

/// An entry of the reference airport list
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub name: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    /// Parses `name,code,latitude,longitude`; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, AirportParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(AirportParseError::FieldCount(fields.len()));
        }
        if fields[0].is_empty() {
            return Err(AirportParseError::EmptyName);
        }
        let code = airport_code(fields[1])
            .ok_or_else(|| AirportParseError::Code(fields[1].to_string()))?;

        Ok(Some(Self {
            name: fields[0].to_string(),
            code,
            latitude: coordinate(fields[2], "latitude", 90.0)?,
            longitude: coordinate(fields[3], "longitude", 180.0)?,
        }))
    }

    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.name, self.code, self.latitude, self.longitude
        )
    }
}

/// Parses a whole airport list, stopping at the first bad line
pub fn parse_airports(contents: &str) -> Result<Vec<Airport>, AirportListError> {
    let mut airports = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let parsed = Airport::parse(line).map_err(|reason| AirportListError {
            line: index + 1,
            reason,
        })?;
        airports.extend(parsed);
    }
    Ok(airports)
}

fn coordinate(value: &str, field: &'static str, bound: f64) -> Result<f64, AirportParseError> {
    match value.parse::<f64>() {
        Ok(degrees) if degrees.abs() <= bound => Ok(degrees),
        _ => Err(AirportParseError::Coordinate {
            field,
            value: value.to_string(),
        }),
    }
}
