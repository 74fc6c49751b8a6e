// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::airport::Airport;
use crate::config::SyntheticConfig;
use crate::flight_record::FlightRecord;
use rand::Rng;

const MINUTES_PER_DAY: u64 = 24 * 60;
const BASE_EPOCH: u64 = 1_420_070_400;
const MAX_AIRPORTS: usize = 26 * 26 * 26;

struct Flight {
    id: String,
    from: String,
    to: String,
    departure_epoch: u64,
    minutes: u32,
}

fn random_code(rng: &mut impl Rng, alphabet: &[u8], length: usize) -> String {
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

fn uppercase(rng: &mut impl Rng, length: usize) -> String {
    random_code(rng, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ", length)
}

fn digits(rng: &mut impl Rng, length: usize) -> String {
    random_code(rng, b"0123456789", length)
}

fn place_name(rng: &mut impl Rng) -> String {
    let length = rng.random_range(5..10);
    uppercase(rng, length)
}

/// Generates a reference list of airports with distinct codes
pub fn generate_airports(rng: &mut impl Rng, count: usize) -> Vec<Airport> {
    let count = count.clamp(2, MAX_AIRPORTS);
    let mut codes: Vec<String> = Vec::with_capacity(count);
    while codes.len() < count {
        let code = uppercase(rng, 3);
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    codes
        .into_iter()
        .map(|code| Airport {
            name: place_name(rng),
            code,
            latitude: rng.random_range(-90.0..=90.0),
            longitude: rng.random_range(-180.0..=180.0),
        })
        .collect()
}

/// Generates passenger records spread over a random flight network between `airports`
pub fn generate_records(
    rng: &mut impl Rng,
    airports: &[Airport],
    config: &SyntheticConfig,
) -> Vec<String> {
    let num_airports = airports.len();
    if num_airports < 2 {
        return Vec::new();
    }

    let flights: Vec<Flight> = (0..config.num_flights.max(1))
        .map(|_| {
            let from = rng.random_range(0..num_airports);
            let to = (from + rng.random_range(1..num_airports)) % num_airports;
            Flight {
                id: format!(
                    "{}{}{}",
                    uppercase(rng, 3),
                    digits(rng, 4),
                    uppercase(rng, 1)
                ),
                from: airports[from].code.clone(),
                to: airports[to].code.clone(),
                departure_epoch: BASE_EPOCH + rng.random_range(0..MINUTES_PER_DAY) * 60,
                minutes: rng.random_range(30..1_200),
            }
        })
        .collect();

    (0..config.num_records)
        .map(|_| {
            let flight = &flights[rng.random_range(0..flights.len())];
            FlightRecord {
                passenger_id: format!(
                    "{}{}{}",
                    uppercase(rng, 3),
                    digits(rng, 4),
                    uppercase(rng, 3)
                ),
                flight_id: flight.id.clone(),
                from_airport: flight.from.clone(),
                to_airport: flight.to.clone(),
                departure_epoch: flight.departure_epoch,
                flight_minutes: flight.minutes,
            }
            .to_line()
        })
        .collect()
}
