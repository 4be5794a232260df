use overheadcore::math::GeodesyHelper;
use overheadcore::TrackerEvent;

/// Two or three letter airline prefix of a flight number or callsign.
pub fn airline_code(flight_number: Option<&str>, callsign: &str) -> String {
    let flight = flight_number
        .filter(|f| !f.is_empty())
        .or(Some(callsign).filter(|c| !c.is_empty()))
        .unwrap_or("PLANE");

    let letters = flight
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .take(3)
        .count();
    if letters >= 2 {
        flight[..letters].to_string()
    } else {
        flight.chars().take(3).collect()
    }
}

pub fn format_distance(distance_nm: Option<f64>) -> String {
    distance_nm
        .map(|d| format!("{:.1}NM", d))
        .unwrap_or_else(|| "?NM".to_string())
}

pub fn format_altitude(altitude_ft: Option<f64>) -> String {
    altitude_ft
        .map(|alt| format!("{:.1}Kft", alt / 1000.0))
        .unwrap_or_else(|| "?Kft".to_string())
}

pub fn format_speed(speed_kt: Option<f64>) -> String {
    speed_kt
        .map(|speed| format!("{}kt", speed.round() as i64))
        .unwrap_or_else(|| "?kt".to_string())
}

/// One-line summary, e.g. `UA (B737-800) | SMF→PDX | 1.2NM | 12.3Kft | 450kt`.
pub fn summary_line(event: &TrackerEvent) -> String {
    let mut line = format!(
        "{} ({}) | {} | {} | {} | {}",
        airline_code(event.flight_number.as_deref(), &event.callsign),
        event.aircraft_type,
        event.route_label(),
        format_distance(event.distance_nm),
        format_altitude(event.altitude_ft),
        format_speed(event.speed_kt),
    );
    if let Some(track) = event.track_deg {
        line.push_str(" | ");
        line.push_str(GeodesyHelper::cardinal(track));
    }
    line
}
