use chrono::{DateTime, Utc};
use nightsky::constellations::VisibilityRecord;
use nightsky::geometry::CompassOctant;
use nightsky::iss::{describe_location, is_daylight_below, ISS_VELOCITY_KMH};
use nightsky::passes::{next_pass, SatellitePass};
use nightsky::report::NightSkyReport;
use nightsky::solar::SunTimes;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::AppState;

pub fn draw_ui(f: &mut Frame, app_state: &AppState) {
    let show_sky_map = app_state.config.display.show_sky_map;
    let show_passes = !app_state.passes.is_empty();

    let main_chunks = if show_sky_map {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(f.area())
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(f.area())
    };

    let mut left_constraints = vec![
        Constraint::Length(5),  // Header
        Constraint::Length(10), // Sun and moon
        Constraint::Min(8),     // Constellations
    ];
    if show_passes {
        left_constraints.push(Constraint::Length(app_state.passes.len() as u16 + 4));
    }
    left_constraints.push(Constraint::Length(3)); // Footer

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(left_constraints)
        .split(main_chunks[0]);

    draw_header(f, left_chunks[0], app_state);

    let almanac_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(left_chunks[1]);
    draw_sun(f, almanac_chunks[0], &app_state.report);
    draw_moon(f, almanac_chunks[1], &app_state.report);

    draw_constellation_table(f, left_chunks[2], app_state);

    let mut chunk_idx = 3;
    if show_passes {
        draw_pass_table(f, left_chunks[chunk_idx], app_state);
        chunk_idx += 1;
    }
    draw_footer(f, left_chunks[chunk_idx], app_state);

    if show_sky_map {
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Percentage(50), // Sky map
                Constraint::Percentage(30), // ISS
                Constraint::Percentage(20), // Planets and showers
            ])
            .split(main_chunks[1]);

        draw_sky_map(f, right_chunks[0], app_state);
        draw_iss(f, right_chunks[1], app_state);
        draw_planets_and_showers(f, right_chunks[2], &app_state.report);
    }
}

/// Clock time at the observer's longitude.
fn mean_time(time: DateTime<Utc>, longitude: f64) -> String {
    (time + SunTimes::mean_solar_offset(longitude))
        .format("%H:%M")
        .to_string()
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::Cyan))
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(Color::White))
}

fn draw_header(f: &mut Frame, area: Rect, app_state: &AppState) {
    let report = &app_state.report;
    let observer = &report.observer;

    let header_text = vec![
        Line::from(vec![
            label("Observer: "),
            Span::raw(format!("{} ", observer.name)),
            label("Location: "),
            Span::raw(format!(
                "{:.4}°, {:.4}°, {:.0}m",
                observer.latitude, observer.longitude, observer.altitude
            )),
        ]),
        Line::from(vec![
            label("Time: "),
            Span::raw(report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            Span::raw(format!(
                " ({} local mean time)",
                mean_time(report.generated_at, observer.longitude)
            )),
            Span::raw("  "),
            if report.is_night() {
                Span::styled("NIGHT", Style::default().fg(Color::Green))
            } else {
                Span::styled("DAYTIME", Style::default().fg(Color::Yellow))
            },
        ]),
    ];

    let header = Paragraph::new(header_text).block(panel("Night Sky"));
    f.render_widget(header, area);
}

fn draw_sun(f: &mut Frame, area: Rect, report: &NightSkyReport) {
    let sun = &report.sun;
    let lon = report.observer.longitude;
    let band = |begin: DateTime<Utc>, end: DateTime<Utc>| {
        format!("{} / {}", mean_time(begin, lon), mean_time(end, lon))
    };

    let mut lines = vec![
        Line::from(vec![label("Sunrise:      "), Span::raw(mean_time(sun.sunrise, lon))]),
        Line::from(vec![label("Sunset:       "), Span::raw(mean_time(sun.sunset, lon))]),
        Line::from(vec![
            label("Day length:   "),
            Span::raw(format!("{:.1} h", sun.day_length_hours)),
        ]),
        Line::from(vec![
            label("Civil:        "),
            Span::raw(band(sun.civil.begin, sun.civil.end)),
        ]),
        Line::from(vec![
            label("Nautical:     "),
            Span::raw(band(sun.nautical.begin, sun.nautical.end)),
        ]),
        Line::from(vec![
            label("Astronomical: "),
            Span::raw(band(sun.astronomical.begin, sun.astronomical.end)),
        ]),
    ];
    if sun.hour_angle_fallback {
        lines.push(Line::from(Span::styled(
            "Polar day/night: times are nominal",
            Style::default().fg(Color::Red),
        )));
    }

    let title = format!("Sun {}", sun.date.format("%b %d"));
    f.render_widget(Paragraph::new(lines).block(panel(&title)), area);
}

fn draw_moon(f: &mut Frame, area: Rect, report: &NightSkyReport) {
    let moon = &report.moon;
    let summary = &report.summary;

    let lines = vec![
        Line::from(vec![label("Phase:        "), Span::raw(moon.phase.as_str())]),
        Line::from(vec![
            label("Illumination: "),
            Span::raw(format!("{:.0}%", moon.illumination_percent)),
        ]),
        Line::from(vec![
            label("Age:          "),
            Span::raw(format!(
                "{:.1} days ({:.0}°)",
                moon.age_days, moon.phase_angle_degrees
            )),
        ]),
        Line::from(vec![
            label("Next full:    "),
            Span::raw(moon.next_full_moon.format("%b %d").to_string()),
        ]),
        Line::from(vec![
            label("Next new:     "),
            Span::raw(moon.next_new_moon.format("%b %d").to_string()),
        ]),
        Line::from(""),
        Line::from(format!(
            "{} up tonight, {} now, {} later",
            summary.total_tonight, summary.visible_now, summary.rising_later
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(panel("Moon")), area);
}

fn record_style(record: &VisibilityRecord, selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if record.is_visible_now {
        Style::default().fg(Color::Green)
    } else if record.seasonal_default {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_constellation_table(f: &mut Frame, area: Rect, app_state: &AppState) {
    let report = &app_state.report;
    let lon = report.observer.longitude;

    let header_cells = ["Constellation", "Star", "Max Alt", "At", "Now", "Dir", "Status"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = report
        .constellations
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let status = if record.seasonal_default {
                "Seasonal pick"
            } else if record.is_visible_now {
                "Visible now"
            } else {
                "Later tonight"
            };
            let cells = vec![
                Cell::from(record.constellation.clone()),
                Cell::from(record.star.clone()),
                Cell::from(format!("{:.0}°", record.max_altitude)),
                Cell::from(mean_time(record.time_of_max, lon)),
                Cell::from(format!("{:.0}°", record.current_altitude)),
                Cell::from(record.direction().as_str()),
                Cell::from(status),
            ];
            Row::new(cells)
                .height(1)
                .style(record_style(record, i == app_state.selected))
        });

    let title = match report.constellations.get(app_state.selected) {
        Some(record) => format!("Constellations: {}", record.description),
        None => "Constellations".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(15),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(4),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(panel(&title));

    f.render_widget(table, area);
}

fn draw_pass_table(f: &mut Frame, area: Rect, app_state: &AppState) {
    let lon = app_state.observer.longitude;
    let now = app_state.report.generated_at;

    let header_cells = [
        "#", "AOS", "Max", "LOS", "Duration", "Max El", "AOS Az", "LOS Az", "Mag", "Type",
    ]
    .iter()
    .map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app_state.passes.iter().enumerate().map(|(i, pass)| {
        let is_current = pass.aos_time <= now && pass.los_time >= now;
        let style = if is_current {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else if pass.los_time < now {
            Style::default().fg(Color::DarkGray)
        } else if pass.pass_type.is_observable() {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };

        let cells = vec![
            Cell::from(format!("{}", i + 1)),
            Cell::from(
                (pass.aos_time + SunTimes::mean_solar_offset(lon))
                    .format("%m/%d %H:%M")
                    .to_string(),
            ),
            Cell::from(mean_time(pass.max_elevation_time, lon)),
            Cell::from(mean_time(pass.los_time, lon)),
            Cell::from(format!("{:.1} min", pass.duration_minutes())),
            Cell::from(format!("{:.1}°", pass.max_elevation)),
            Cell::from(format!("{:.0}°", pass.aos_azimuth)),
            Cell::from(format!("{:.0}°", pass.los_azimuth)),
            Cell::from(format!("{:.1}", pass.magnitude)),
            Cell::from(pass.pass_type.as_str()),
        ];

        Row::new(cells).height(1).style(style)
    });

    let next_pass_info = next_pass(&app_state.passes, now)
        .map(|pass| {
            let time_until = (pass.aos_time - now).num_minutes();
            if time_until > 60 {
                format!(" (Next pass in {}h {}m)", time_until / 60, time_until % 60)
            } else {
                format!(" (Next pass in {}m)", time_until)
            }
        })
        .unwrap_or_else(|| " (No upcoming passes)".to_string());

    let name = app_state
        .satellite
        .as_ref()
        .map_or("ISS", |sat| sat.name.as_str());

    let title = format!("Passes for: {}{}", name, next_pass_info);
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(28),
        ],
    )
    .header(header)
    .block(panel(&title));

    f.render_widget(table, area);
}

fn draw_iss(f: &mut Frame, area: Rect, app_state: &AppState) {
    let report = &app_state.report;

    let mut lines = match &report.iss {
        Ok(visibility) => {
            let sub = visibility.sub_point;
            let mut lines = vec![
                Line::from(vec![
                    label("Over:       "),
                    Span::raw(describe_location(sub.latitude, sub.longitude)),
                ]),
                Line::from(vec![
                    label("Sub-point:  "),
                    Span::raw(format!("{:.2}°, {:.2}°", sub.latitude, sub.longitude)),
                ]),
                Line::from(vec![
                    label("Distance:   "),
                    Span::raw(format!(
                        "{:.0} km {}",
                        visibility.distance_km,
                        CompassOctant::from_azimuth(visibility.azimuth_degrees).as_str()
                    )),
                ]),
                Line::from(vec![
                    label("Elevation:  "),
                    Span::raw(format!(
                        "{:.1}° ({})",
                        visibility.elevation_degrees,
                        visibility.quality.detail()
                    )),
                ]),
            ];

            let status = if !visibility.visible {
                Span::styled("Out of range", Style::default().fg(Color::Gray))
            } else if report.is_night() {
                Span::styled(
                    format!("VISIBLE, mag {:.1}", visibility.magnitude),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled("In range, sky too bright", Style::default().fg(Color::Yellow))
            };
            lines.push(Line::from(vec![label("Status:     "), status]));

            match &app_state.iss_position {
                Some(position) => lines.push(Line::from(vec![
                    label("Height:     "),
                    Span::raw(format!(
                        "{:.0} km at {:.2} km/s",
                        position.altitude_km, position.velocity_km_s
                    )),
                ])),
                None => lines.push(Line::from(vec![
                    label("Speed:      "),
                    Span::raw(format!("{:.0} km/h", ISS_VELOCITY_KMH)),
                ])),
            }
            if is_daylight_below(sub.timestamp, sub.longitude) {
                lines.push(Line::from("Daylight below the station"));
            }
            lines
        }
        Err(e) => vec![Line::from(Span::styled(
            format!("{}", e),
            Style::default().fg(Color::Gray),
        ))],
    };

    if let Some(status) = &app_state.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(panel("ISS")), area);
}

fn draw_planets_and_showers(f: &mut Frame, area: Rect, report: &NightSkyReport) {
    let planets = report
        .planets
        .iter()
        .map(|p| format!("{} ({:+.1})", p.as_str(), p.typical_magnitude()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![Line::from(vec![label("Planets: "), Span::raw(planets)])];
    if report.showers.is_empty() {
        lines.push(Line::from(vec![label("Meteors: "), Span::raw("none this month")]));
    }
    for shower in &report.showers {
        lines.push(Line::from(vec![
            label("Meteors: "),
            Span::raw(format!(
                "{} peak {}, ~{}/h",
                shower.name, shower.peak, shower.rate_per_hour
            )),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).block(panel("Planets and showers")),
        area,
    );
}

fn draw_sky_map(f: &mut Frame, area: Rect, app_state: &AppState) {
    use ratatui::symbols;
    use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};

    // Polar projection: zenith at the centre, horizon at radius 1, north up
    fn project(azimuth: f64, altitude: f64) -> (f64, f64) {
        let radius = (90.0 - altitude) / 90.0;
        let az = azimuth.to_radians();
        (radius * az.sin(), radius * az.cos())
    }

    let report = &app_state.report;
    let iss_look = match &app_state.iss_position {
        Some(position) => Some((position.azimuth, position.elevation)),
        None => report
            .iss
            .as_ref()
            .ok()
            .filter(|v| v.visible)
            .map(|v| (v.azimuth_degrees, v.elevation_degrees)),
    };

    let canvas = Canvas::default()
        .block(panel("Sky map (polar view)"))
        .x_bounds([-1.2, 1.2])
        .y_bounds([-1.2, 1.2])
        .marker(symbols::Marker::Braille)
        .paint(|ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
                color: Color::White,
            });
            for radius in [0.667, 0.333] {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius,
                    color: Color::DarkGray,
                });
            }
            for (x2, y2) in [(0.0, 1.0), (1.0, 0.0), (0.0, -1.0), (-1.0, 0.0)] {
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2,
                    y2,
                    color: Color::Gray,
                });
            }

            for (idx, record) in report.constellations.iter().enumerate() {
                if record.current_altitude <= 0.0 {
                    continue;
                }
                let (x, y) = project(record.current_azimuth, record.current_altitude);
                let style = record_style(record, idx == app_state.selected);
                ctx.print(
                    x,
                    y,
                    Line::styled(record.constellation.chars().take(3).collect::<String>(), style),
                );
            }

            if let Some((azimuth, elevation)) = iss_look {
                if elevation > 0.0 {
                    let (x, y) = project(azimuth, elevation);
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: 0.05,
                        color: Color::Red,
                    });
                    ctx.print(x, y, Line::styled("ISS", Style::default().fg(Color::Red)));
                }
            }

            ctx.print(0.0, 1.05, "N");
            ctx.print(1.05, 0.0, "E");
            ctx.print(0.0, -1.05, "S");
            ctx.print(-1.05, 0.0, "W");
            ctx.print(0.0, 0.0, "+");
        });

    f.render_widget(canvas, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app_state: &AppState) {
    let source = match app_state.config.iss.source {
        crate::config::IssSource::Feed => "live feed",
        crate::config::IssSource::Tle => "TLE",
    };
    let footer = Paragraph::new(format!(
        "↑/↓ or j/k: Select | r: Refresh | q/ESC: Quit | ISS: {}",
        source
    ))
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

/// Plain-text rendering of a report, for `--once`.
pub fn render_text(report: &NightSkyReport, passes: &[SatellitePass]) -> String {
    let observer = &report.observer;
    let lon = observer.longitude;
    let sun = &report.sun;
    let moon = &report.moon;

    let mut out = vec![
        format!(
            "Night sky for {} ({:.4}°, {:.4}°) at {}",
            observer.name,
            observer.latitude,
            observer.longitude,
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        String::new(),
        format!(
            "Sun: rise {}  set {}  ({:.1} h of daylight, local mean time)",
            mean_time(sun.sunrise, lon),
            mean_time(sun.sunset, lon),
            sun.day_length_hours
        ),
        format!(
            "Twilight: civil {}-{}  nautical {}-{}  astronomical {}-{}",
            mean_time(sun.civil.begin, lon),
            mean_time(sun.civil.end, lon),
            mean_time(sun.nautical.begin, lon),
            mean_time(sun.nautical.end, lon),
            mean_time(sun.astronomical.begin, lon),
            mean_time(sun.astronomical.end, lon)
        ),
        format!(
            "Moon: {} ({:.0}% lit, {:.1} days), next full {}",
            moon.phase.as_str(),
            moon.illumination_percent,
            moon.age_days,
            moon.next_full_moon.format("%Y-%m-%d")
        ),
        String::new(),
        format!(
            "Constellations ({} tonight, {} visible now, {} rising later):",
            report.summary.total_tonight, report.summary.visible_now, report.summary.rising_later
        ),
    ];

    for record in &report.constellations {
        out.push(format!(
            "  {:<14} {:<15} max {:>3.0}° at {}  {}{}",
            record.constellation,
            record.star,
            record.max_altitude,
            mean_time(record.time_of_max, lon),
            record.altitude_display(),
            if record.seasonal_default {
                " (seasonal pick)"
            } else {
                ""
            }
        ));
    }

    out.push(String::new());
    let planets: Vec<&str> = report.planets.iter().map(|p| p.as_str()).collect();
    out.push(format!("Planets: {}", planets.join(", ")));
    for shower in &report.showers {
        out.push(format!(
            "Meteor shower: {} (peak {}, ~{}/h)",
            shower.name, shower.peak, shower.rate_per_hour
        ));
    }

    out.push(String::new());
    match &report.iss {
        Ok(iss) => out.push(format!(
            "ISS: {}, {:.0} km away, elevation {:.1}° {} ({}), {}",
            describe_location(iss.sub_point.latitude, iss.sub_point.longitude),
            iss.distance_km,
            iss.elevation_degrees,
            CompassOctant::from_azimuth(iss.azimuth_degrees).as_str(),
            iss.quality.as_str(),
            if iss.visible { "in range" } else { "out of range" }
        )),
        Err(e) => out.push(format!("ISS: {}", e)),
    }
    for pass in passes {
        out.push(format!(
            "  pass {}  max {:.0}° for {:.1} min, mag {:.1}, {}",
            (pass.aos_time + SunTimes::mean_solar_offset(lon)).format("%m/%d %H:%M"),
            pass.max_elevation,
            pass.duration_minutes(),
            pass.magnitude,
            pass.pass_type.as_str()
        ));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nightsky::observer::ObserverLocation;
    use nightsky::solar::ApproximateAlmanac;

    #[test]
    fn test_render_text_lists_report_sections() {
        let observer = ObserverLocation::new("Austin", 30.2672, -97.7431, 150.0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 21, 4, 0, 0).unwrap();
        let report = NightSkyReport::build(&observer, now, &ApproximateAlmanac, None).unwrap();
        let text = render_text(&report, &[]);

        assert!(text.starts_with("Night sky for Austin"));
        assert!(text.contains("Lyra"));
        assert!(text.contains("Planets: Jupiter, Saturn"));
        assert!(text.contains("ISS: satellite position unknown"));
    }

    #[test]
    fn test_mean_time_shifts_by_longitude() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        assert_eq!(mean_time(t, 0.0), "12:00");
        assert_eq!(mean_time(t, -90.0), "06:00");
    }
}
