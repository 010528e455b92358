mod config;
mod feed;
mod ui;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use config::{Config, IssSource};
use feed::Feed;
use nightsky::iss::SubPoint;
use nightsky::observer::ObserverLocation;
use nightsky::orbit::{parse_tles, Satellite, SatellitePosition};
use nightsky::passes::{passes_valid_until, predict_passes, PassSearch, SatellitePass};
use nightsky::report::NightSkyReport;
use nightsky::solar::ApproximateAlmanac;

#[derive(Parser, Debug)]
#[command(name = "nightsky", version, about = "What is up in the night sky tonight")]
struct Args {
    /// Configuration file (default: <config dir>/nightsky/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Place name to geocode instead of the configured observer
    #[arg(short, long)]
    place: Option<String>,

    /// Observer latitude in degrees, north positive
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Observer longitude in degrees, east positive
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Print a text report and exit
    #[arg(long)]
    once: bool,
}

pub struct AppState {
    pub config: Config,
    pub observer: ObserverLocation,
    pub report: NightSkyReport,
    pub satellite: Option<Satellite>,
    pub iss_position: Option<SatellitePosition>,
    pub passes: Vec<SatellitePass>,
    pub selected: usize,
    /// Last collaborator failure, shown until the next successful refresh.
    pub status: Option<String>,
    feed: Feed,
    iss_sub_point: Option<SubPoint>,
    last_poll: Option<Instant>,
    /// Passes are searched again from this instant on.
    passes_valid_until: Option<DateTime<Utc>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(Config::default_path)
        .ok_or_else(|| anyhow!("no configuration directory on this platform; pass --config"))?;
    let config = Config::load(&config_path)?;

    let feed = Feed::new();
    let observer = resolve_observer(&args, &config, &feed)?;
    info!(
        "observer {} at {:.4}, {:.4}",
        observer.name, observer.latitude, observer.longitude
    );

    let satellite = match config.iss.source {
        IssSource::Tle => Some(load_satellite(&config, &feed)?),
        IssSource::Feed => None,
    };

    let now = Utc::now();
    let report = NightSkyReport::build(&observer, now, &ApproximateAlmanac, None)?;
    let mut app_state = AppState {
        config,
        observer,
        report,
        satellite,
        iss_position: None,
        passes: Vec::new(),
        selected: 0,
        status: None,
        feed,
        iss_sub_point: None,
        last_poll: None,
        passes_valid_until: None,
    };
    refresh(&mut app_state, now)?;

    if args.once {
        println!("{}", ui::render_text(&app_state.report, &app_state.passes));
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app_state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

/// `--lat/--lon` win over `--place`, which wins over the config file.
fn resolve_observer(args: &Args, config: &Config, feed: &Feed) -> Result<ObserverLocation> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        return Ok(ObserverLocation::new("Custom location", lat, lon, 0.0)?);
    }

    match args.place.as_deref().or(config.observer.place.as_deref()) {
        Some(place) => feed.geocode(place),
        None => config.observer(),
    }
}

fn load_satellite(config: &Config, feed: &Feed) -> Result<Satellite> {
    let tle_data = match &config.iss.tle_file {
        Some(path) => fs::read_to_string(path)?,
        None => feed.tle(&config.iss.tle_url)?,
    };

    let satellites = parse_tles(&tle_data, Some(&config.iss.satellite));
    match satellites.into_iter().next() {
        Some(sat) => Ok(sat),
        None => bail!(
            "No valid TLE matching {:?} found in TLE data",
            config.iss.satellite
        ),
    }
}

fn search_passes(
    satellite: &Satellite,
    observer: &ObserverLocation,
    now: DateTime<Utc>,
    search: &PassSearch,
) -> Vec<SatellitePass> {
    match predict_passes(satellite, observer, now, search) {
        Ok(passes) => {
            info!("{}: found {} passes", satellite.name, passes.len());
            passes
        }
        Err(e) => {
            warn!("{}: {}", satellite.name, e);
            Vec::new()
        }
    }
}

/// Update the ISS position from the configured source and rebuild the report.
/// Passes are searched again once the previous list has run out.
fn refresh(app_state: &mut AppState, now: DateTime<Utc>) -> Result<()> {
    if let Some(sat) = &app_state.satellite {
        let stale = app_state.passes_valid_until.map_or(true, |until| now >= until);
        if stale {
            let search = app_state.config.prediction.search();
            app_state.passes = search_passes(sat, &app_state.observer, now, &search);
            app_state.passes_valid_until = Some(passes_valid_until(&app_state.passes, now));
        }
    }

    match &app_state.satellite {
        Some(sat) => match sat.position(now, &app_state.observer) {
            Ok(position) => {
                app_state.iss_sub_point = Some(position.sub_point());
                app_state.iss_position = Some(position);
                app_state.status = None;
            }
            Err(e) => {
                app_state.iss_sub_point = None;
                app_state.iss_position = None;
                app_state.status = Some(e.to_string());
            }
        },
        None => {
            let poll_interval = Duration::from_secs(app_state.config.iss.poll_seconds);
            let due = app_state
                .last_poll
                .map_or(true, |last| last.elapsed() >= poll_interval);
            if due {
                app_state.last_poll = Some(Instant::now());
                match app_state.feed.iss_sub_point(&app_state.config.iss.feed_url) {
                    Ok(sub_point) => {
                        app_state.iss_sub_point = Some(sub_point);
                        app_state.status = None;
                    }
                    Err(e) => {
                        debug!("ISS feed: {:#}", e);
                        app_state.iss_sub_point = None;
                        app_state.status = Some(format!("ISS feed unavailable: {}", e));
                    }
                }
            }
        }
    }

    app_state.report = NightSkyReport::build(
        &app_state.observer,
        now,
        &ApproximateAlmanac,
        app_state.iss_sub_point,
    )?;
    let rows = app_state.report.constellations.len();
    app_state.selected = app_state.selected.min(rows.saturating_sub(1));
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app_state: &mut AppState,
) -> Result<()> {
    loop {
        refresh(app_state, Utc::now())?;

        terminal.draw(|f| {
            ui::draw_ui(f, app_state);
        })?;

        if event::poll(Duration::from_millis(app_state.config.display.refresh_rate))? {
            if let Event::Key(key) = event::read()? {
                let rows = app_state.report.constellations.len();
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        return Ok(());
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        app_state.selected = app_state.selected.saturating_sub(1);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if app_state.selected + 1 < rows {
                            app_state.selected += 1;
                        }
                    }
                    KeyCode::Home => {
                        app_state.selected = 0;
                    }
                    KeyCode::End => {
                        app_state.selected = rows.saturating_sub(1);
                    }
                    KeyCode::Char('r') => {
                        app_state.last_poll = None;
                    }
                    _ => {}
                }
            }
        }
    }
}
