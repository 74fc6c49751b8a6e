// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::airport::Airport;
use map_reduce_core::Group;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportFlightCount {
    pub airport: String,
    pub flights: usize,
    pub passengers: usize,
}

/// Reduces each airport's flight ids to the number of distinct flights
/// Keeps the airport order of the shuffled groups
pub fn count_flights(groups: &[Group<String, String>]) -> Vec<AirportFlightCount> {
    groups
        .iter()
        .map(|group| {
            let distinct: HashSet<&String> = group.value().iter().collect();
            AirportFlightCount {
                airport: group.key().clone(),
                flights: distinct.len(),
                passengers: group.value().len(),
            }
        })
        .collect()
}

/// Airports of the reference list that no flight departs from, in list order
pub fn unused_airports<'a>(
    airports: &'a [Airport],
    counts: &[AirportFlightCount],
) -> Vec<&'a Airport> {
    let used: HashSet<&str> = counts.iter().map(|count| count.airport.as_str()).collect();
    airports
        .iter()
        .filter(|airport| !used.contains(airport.code.as_str()))
        .collect()
}

pub fn render(counts: &[AirportFlightCount], airports: &[Airport], rejected: &[String]) -> String {
    let names: HashMap<&str, &str> = airports
        .iter()
        .map(|airport| (airport.code.as_str(), airport.name.as_str()))
        .collect();

    let mut out = String::from("Flights from each airport\n-------------------------\n");
    for count in counts {
        let label = match names.get(count.airport.as_str()) {
            Some(name) => format!("{} ({})", name, count.airport),
            None => count.airport.clone(),
        };
        out.push_str(&format!(
            "{}: {} flights, {} passengers\n",
            label, count.flights, count.passengers
        ));
    }

    if !airports.is_empty() {
        out.push_str("\nUnused airports\n---------------\n");
        for airport in unused_airports(airports, counts) {
            out.push_str(&format!("{} ({})\n", airport.name, airport.code));
        }
    }

    if !rejected.is_empty() {
        out.push_str(&format!("\nRejected records ({})\n----------------\n", rejected.len()));
        for line in rejected {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
