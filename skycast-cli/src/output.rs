//! Human-friendly rendering of core results.

use skycast_core::{CurrentWeather, ForecastDay, ForecastReport, LocationMatch, WeatherReport};

pub fn print_current(current: &CurrentWeather) {
    println!(
        "{} ({:.2}, {:.2})",
        current.location, current.coordinates.lat, current.coordinates.lon
    );
    println!(
        "  {}°C (feels like {}°C), {} - {}",
        current.temperature_c, current.feels_like_c, current.condition, current.description
    );
    println!(
        "  humidity {}%  wind {} km/h  pressure {} hPa  dew point {}°C",
        current.humidity_pct, current.wind_speed_kmh, current.pressure_hpa, current.dew_point_c
    );
    if let Some(visibility) = current.visibility_km {
        println!("  visibility {visibility} km");
    }
    println!(
        "  observed {}",
        current.observed_at.format("%Y-%m-%d %H:%M UTC")
    );
}

fn print_days(days: &[ForecastDay]) {
    for d in days {
        let marker = if d.synthetic { "~" } else { " " };
        println!(
            "{marker} {} {:<6} {:>3}°C / {:>3}°C  {:<13} precip {:>3}%  wind {:>3} km/h  humidity {:>3}%",
            d.day.day,
            d.day.date.format("%d %b").to_string(),
            d.day.high_c,
            d.day.low_c,
            d.day.condition.as_str(),
            d.day.precipitation_pct,
            d.day.wind_speed_kmh,
            d.day.humidity_pct,
        );
    }
    if days.iter().any(|d| d.synthetic) {
        println!("(~ extrapolated beyond the provider forecast)");
    }
}

pub fn print_forecast_report(report: &ForecastReport) {
    println!("{} - {}-day forecast", report.location, report.forecast.len());
    print_days(&report.forecast);
}

pub fn print_weather_report(report: &WeatherReport) {
    print_current(&report.current);
    println!();
    print_days(&report.forecast);
}

pub fn print_matches(matches: &[LocationMatch]) {
    if matches.is_empty() {
        println!("No matching locations.");
        return;
    }
    for m in matches {
        println!("{:<40} {:>9.4} {:>10.4}", m.display_name, m.lat, m.lon);
    }
}
