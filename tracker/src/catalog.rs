use overheadcore::{AircraftResolver, Observation};

/// ICAO type code, display name, manufacturer.
const AIRCRAFT_TYPES: &[(&str, &str, &str)] = &[
    ("B712", "B717", "Boeing"),
    ("B722", "B727", "Boeing"),
    ("B738", "B737-800", "Boeing"),
    ("B739", "B737-900", "Boeing"),
    ("B38M", "B737 MAX 8", "Boeing"),
    ("B39M", "B737 MAX 9", "Boeing"),
    ("B742", "B747-200", "Boeing"),
    ("B744", "B747-400", "Boeing"),
    ("B748", "B747-8", "Boeing"),
    ("B752", "B757-200", "Boeing"),
    ("B753", "B757-300", "Boeing"),
    ("B763", "B767-300", "Boeing"),
    ("B772", "B777-200", "Boeing"),
    ("B773", "B777-300", "Boeing"),
    ("B77W", "B777-300ER", "Boeing"),
    ("B788", "B787-8", "Boeing"),
    ("B789", "B787-9", "Boeing"),
    ("B78X", "B787-10", "Boeing"),
    ("A306", "A300", "Airbus"),
    ("A310", "A310", "Airbus"),
    ("A318", "A318", "Airbus"),
    ("A319", "A319", "Airbus"),
    ("A320", "A320", "Airbus"),
    ("A321", "A321", "Airbus"),
    ("A20N", "A320neo", "Airbus"),
    ("A21N", "A321neo", "Airbus"),
    ("BCS1", "A220-100", "Airbus"),
    ("BCS3", "A220-300", "Airbus"),
    ("A332", "A330-200", "Airbus"),
    ("A333", "A330-300", "Airbus"),
    ("A359", "A350-900", "Airbus"),
    ("A35K", "A350-1000", "Airbus"),
    ("A388", "A380-800", "Airbus"),
    ("E170", "E170", "Embraer"),
    ("E75L", "E175", "Embraer"),
    ("E75S", "E175", "Embraer"),
    ("E190", "E190", "Embraer"),
    ("E195", "E195", "Embraer"),
    ("CRJ2", "CRJ-200", "Bombardier"),
    ("CRJ7", "CRJ-700", "Bombardier"),
    ("CRJ9", "CRJ-900", "Bombardier"),
    ("CRJX", "CRJ-1000", "Bombardier"),
    ("DH8C", "Q300", "De Havilland"),
    ("DH8D", "Q400", "De Havilland"),
    ("AT43", "ATR-42", "ATR"),
    ("AT45", "ATR-42", "ATR"),
    ("AT75", "ATR-72", "ATR"),
    ("AT76", "ATR-72", "ATR"),
    ("C172", "C172", "Cessna"),
    ("C182", "C182", "Cessna"),
    ("C208", "Caravan", "Cessna"),
    ("C25A", "CJ2", "Cessna"),
    ("C25B", "CJ3", "Cessna"),
    ("C56X", "Citation X", "Cessna"),
    ("CL60", "Challenger", "Bombardier"),
    ("G650", "G650", "Gulfstream"),
    ("GLF5", "G550", "Gulfstream"),
    ("GLF6", "G650", "Gulfstream"),
    ("F2TH", "Falcon 2000", "Dassault"),
    ("FA7X", "Falcon 7X", "Dassault"),
    ("FA8X", "Falcon 8X", "Dassault"),
    ("PC12", "PC-12", "Pilatus"),
    ("TBM7", "TBM-700", "Daher"),
    ("TBM9", "TBM-900", "Daher"),
    ("H60", "Black Hawk", "Sikorsky"),
    ("S92", "S-92", "Sikorsky"),
    ("EC35", "EC135", "Airbus Helicopters"),
    ("EC45", "EC145", "Airbus Helicopters"),
    ("AS50", "AS350", "Airbus Helicopters"),
    ("AS55", "AS355", "Airbus Helicopters"),
    ("A109", "A109", "Leonardo"),
    ("B407", "Bell 407", "Bell"),
    ("B429", "Bell 429", "Bell"),
    ("C17", "C-17", "Boeing"),
    ("K35R", "KC-135", "Boeing"),
    ("P8", "P-8", "Boeing"),
    ("C130", "C-130", "Lockheed Martin"),
    ("C30J", "C-130J", "Lockheed Martin"),
    ("C5M", "C-5", "Lockheed Martin"),
    ("F16", "F-16", "Lockheed Martin"),
    ("F22", "F-22", "Lockheed Martin"),
    ("F35", "F-35", "Lockheed Martin"),
    ("F18", "F-18", "Boeing"),
    ("A400", "A400M", "Airbus"),
];

/// Airline ICAO designator to IATA code.
const AIRLINE_CODES: &[(&str, &str)] = &[
    ("AAL", "AA"),
    ("UAL", "UA"),
    ("DAL", "DL"),
    ("SWA", "WN"),
    ("ASA", "AS"),
    ("FFT", "F9"),
    ("JBU", "B6"),
    ("NKS", "NK"),
    ("AFR", "AF"),
    ("BAW", "BA"),
    ("DLH", "LH"),
    ("UAE", "EK"),
    ("QTR", "QR"),
    ("CPA", "CX"),
    ("ANA", "NH"),
    ("JAL", "JL"),
    ("KLM", "KL"),
    ("VIR", "VS"),
    ("QFA", "QF"),
    ("ACA", "AC"),
    ("AMX", "AM"),
    ("AVA", "AV"),
    ("LAN", "LA"),
    ("TAM", "JJ"),
    ("CMP", "CM"),
    ("ICE", "FI"),
    ("SAS", "SK"),
    ("AUA", "OS"),
    ("SWR", "LX"),
    ("IBE", "IB"),
    ("THA", "TG"),
    ("SIA", "SQ"),
    ("MAS", "MH"),
    ("GIA", "GA"),
    ("PAL", "PR"),
    ("KAL", "KE"),
    ("AAR", "OZ"),
    ("CES", "MU"),
    ("CSN", "CZ"),
    ("CCA", "CA"),
    ("CHH", "HU"),
    ("HVN", "VN"),
    ("AIJ", "4O"),
    ("VOI", "Y4"),
];

/// Regional operators whose callsign prefix implies the fleet type.
const REGIONAL_OPERATORS: &[(&str, &str)] = &[
    ("SKW", "E175/CRJ"),
    ("RPA", "E175"),
    ("ENY", "E175"),
    ("ASH", "CRJ"),
    ("GJS", "CRJ"),
    ("EDV", "CRJ"),
    ("JIA", "CRJ"),
    ("QXE", "Q400"),
    ("PDT", "E145"),
];

const MAX_FLIGHT_NUMBER_LEN: usize = 7;

/// Built-in lookup of common ICAO aircraft type codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    fn entry(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
        let code = code.trim();
        AIRCRAFT_TYPES
            .iter()
            .find(|(known, _, _)| known.eq_ignore_ascii_case(code))
    }
}

impl AircraftResolver for StaticCatalog {
    fn resolve(&self, code: &str) -> Option<String> {
        Self::entry(code).map(|(_, name, _)| name.to_string())
    }

    fn manufacturer(&self, code: &str) -> Option<String> {
        Self::entry(code).map(|(_, _, maker)| maker.to_string())
    }

    /// Fleet of known regional operators, otherwise a coarse class from
    /// altitude and speed.
    fn guess(&self, obs: &Observation) -> Option<String> {
        let callsign = obs.callsign.trim().to_ascii_uppercase();
        if let Some((_, fleet)) = REGIONAL_OPERATORS
            .iter()
            .find(|(prefix, _)| callsign.starts_with(prefix))
        {
            return Some(fleet.to_string());
        }

        let class = match (obs.altitude_ft, obs.speed_kt) {
            (Some(alt), speed) if alt > 25_000.0 => {
                if speed.is_some_and(|kt| kt > 450.0) {
                    "B737/A320"
                } else {
                    "Regional Jet"
                }
            }
            (Some(alt), Some(kt)) if alt < 5_000.0 && kt < 150.0 => "GA/Small",
            _ => return None,
        };
        Some(class.to_string())
    }

    fn flight_number(&self, callsign: &str) -> Option<String> {
        let callsign = callsign.trim().to_ascii_uppercase();
        let (icao, iata) = AIRLINE_CODES
            .iter()
            .find(|(icao, _)| callsign.starts_with(icao))?;
        let formatted: String = iata
            .chars()
            .chain(callsign[icao.len()..].chars())
            .take(MAX_FLIGHT_NUMBER_LEN)
            .collect();
        Some(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = StaticCatalog;
        assert_eq!(catalog.resolve("b738").as_deref(), Some("B737-800"));
        assert_eq!(catalog.manufacturer(" E75L ").as_deref(), Some("Embraer"));
    }

    #[test]
    fn airline_designator_becomes_iata() {
        let catalog = StaticCatalog;
        assert_eq!(catalog.flight_number("UAL498").as_deref(), Some("UA498"));
        assert_eq!(catalog.flight_number(" swa2053 ").as_deref(), Some("WN2053"));
        assert_eq!(catalog.flight_number("DAL12345678").as_deref(), Some("DL12345"));
        assert!(catalog.flight_number("N123AB").is_none());
    }

    #[test]
    fn guess_uses_operator_then_performance() {
        let now = Utc::now();
        let catalog = StaticCatalog;

        let regional = Observation::new("QXE2301", 0.0, 0.0, now);
        assert_eq!(catalog.guess(&regional).as_deref(), Some("Q400"));

        let mainline = Observation::new("UAL498", 0.0, 0.0, now)
            .with_altitude(35_000.0)
            .with_speed(480.0);
        assert_eq!(catalog.guess(&mainline).as_deref(), Some("B737/A320"));

        let slow_jet = mainline.clone().with_speed(400.0);
        assert_eq!(catalog.guess(&slow_jet).as_deref(), Some("Regional Jet"));

        let light = Observation::new("N123AB", 0.0, 0.0, now)
            .with_altitude(3_500.0)
            .with_speed(110.0);
        assert_eq!(catalog.guess(&light).as_deref(), Some("GA/Small"));

        let climbing = Observation::new("N123AB", 0.0, 0.0, now).with_altitude(12_000.0);
        assert!(catalog.guess(&climbing).is_none());
    }

    #[test]
    fn unknown_code_resolves_to_none() {
        assert!(StaticCatalog.resolve("ZZZZ").is_none());
        assert!(StaticCatalog.manufacturer("").is_none());
    }
}
