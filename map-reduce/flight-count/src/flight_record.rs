// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::Pair;

const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlightParseError {
    #[error("expected {expected} fields, found {0}", expected = FIELD_COUNT)]
    FieldCount(usize),
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("`{0}` is not a three-letter airport code")]
    AirportCode(String),
    #[error("field `{field}` is not a number: `{value}`")]
    Number { field: &'static str, value: String },
}

/// One passenger on one flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRecord {
    pub passenger_id: String,
    pub flight_id: String,
    pub from_airport: String,
    pub to_airport: String,
    pub departure_epoch: u64,
    pub flight_minutes: u32,
}

impl FlightRecord {
    /// Parses a CSV line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, FlightParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(FlightParseError::FieldCount(fields.len()));
        }

        Ok(Some(Self {
            passenger_id: text(fields[0], "passenger_id")?,
            flight_id: text(fields[1], "flight_id")?,
            from_airport: airport(fields[2])?,
            to_airport: airport(fields[3])?,
            departure_epoch: number(fields[4], "departure_epoch")?,
            flight_minutes: number(fields[5], "flight_minutes")?,
        }))
    }

    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.passenger_id,
            self.flight_id,
            self.from_airport,
            self.to_airport,
            self.departure_epoch,
            self.flight_minutes
        )
    }
}

/// Map function: a record line becomes (departure airport, flight id)
#[allow(clippy::ptr_arg)]
pub fn departure(line: &String) -> Result<Option<Pair<String, String>>, FlightParseError> {
    let record = FlightRecord::parse(line)?;
    Ok(record.map(|record| Pair::new(record.from_airport, record.flight_id)))
}

fn text(value: &str, field: &'static str) -> Result<String, FlightParseError> {
    if value.is_empty() {
        return Err(FlightParseError::EmptyField(field));
    }
    Ok(value.to_string())
}

fn airport(value: &str) -> Result<String, FlightParseError> {
    airport_code(value).ok_or_else(|| FlightParseError::AirportCode(value.to_string()))
}

/// Accepts three uppercase ASCII letters
pub(crate) fn airport_code(value: &str) -> Option<String> {
    (value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())).then(|| value.to_string())
}

fn number<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, FlightParseError> {
    value.parse().map_err(|_| FlightParseError::Number {
        field,
        value: value.to_string(),
    })
}
