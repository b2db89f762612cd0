//! Sigscope - headless signal scope
//!
//! Starts a set of signal producers, registers their series and plays the
//! renderer role: every frame it queries a binned window of each series and
//! periodically prints what a plot would draw.

use anyhow::Result;
use sigscope::series::sparse::SparseSeries;
use sigscope::signal::generator::{SignalGenerator, Waveform};
use sigscope::signal::producer::{ProducerHandle, SignalProducer};
use sigscope::{Database, EngineConfig, SeriesHandle, TimeSeries, TsSample};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Series holding the render loop's own frame times
const FRAME_TIME_SERIES: &str = "frame_time_ms";

/// Command line options
struct Options {
    config: Option<PathBuf>,
    duration: Option<f64>,
    bins: usize,
    window: f64,
    fps: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            duration: None,
            bins: 1000,
            window: 1.0,
            fps: 30,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sigscope=info".parse()?)
                .add_directive("sigscope_core=info".parse()?),
        )
        .init();

    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let config = options
        .config
        .as_deref()
        .map(EngineConfig::load)
        .unwrap_or_default();

    println!("Sigscope v{} - headless signal scope", sigscope::VERSION);
    println!(
        "Sample rate: {} Hz | Chunk size: {} | Bins: {} | Window: {:.2}s",
        config.sample_rate, config.chunk_size, options.bins, options.window
    );
    println!();

    run(&config, &options)
}

fn parse_args() -> Result<Option<Options>> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--version" | "-v", _) => {
                println!("sigscope {}", sigscope::VERSION);
                return Ok(None);
            }
            ("--help" | "-h", _) => {
                print_help();
                return Ok(None);
            }
            ("--config" | "-c", Some(v)) => options.config = Some(PathBuf::from(v)),
            ("--duration" | "-d", Some(v)) => options.duration = Some(v.parse()?),
            ("--bins" | "-b", Some(v)) => options.bins = v.parse()?,
            ("--window" | "-w", Some(v)) => options.window = v.parse()?,
            ("--fps", Some(v)) => options.fps = v.parse::<u32>()?.max(1),
            (arg, _) => {
                eprintln!("Unknown or incomplete argument: {}", arg);
                print_help();
                return Ok(None);
            }
        }
        i += 2;
    }

    Ok(Some(options))
}

fn print_help() {
    println!("Usage: sigscope [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config PATH     Engine config JSON (default: built-in defaults)");
    println!("  -d, --duration SECS   Stop after SECS seconds (default: until Ctrl+C)");
    println!("  -b, --bins N          Bins per queried window (default: 1000)");
    println!("  -w, --window SECS     Width of the queried window (default: 1.0)");
    println!("      --fps N           Query frames per second (default: 30)");
    println!("  -v, --version         Show version");
    println!("  -h, --help            Show this help");
}

fn start_producers(config: &EngineConfig, db: &Database) -> Result<Vec<ProducerHandle>> {
    let sources = [
        ("sine_440", Waveform::Sine, 440.0),
        ("saw_110", Waveform::Saw, 110.0),
        ("square_50", Waveform::Square, 50.0),
        ("noise", Waveform::Noise, 0.0),
    ];

    let mut producers = Vec::with_capacity(sources.len());
    for (name, waveform, frequency) in sources {
        let series = Arc::new(config.dense_series(0.0));
        db.register(name, Arc::clone(&series))?;

        let generator = SignalGenerator::new(waveform, frequency, config.sample_rate);
        producers.push(SignalProducer::new(generator, series).start(name)?);
    }
    Ok(producers)
}

fn run(config: &EngineConfig, options: &Options) -> Result<()> {
    let db = Database::new();
    let frame_times = Arc::new(config.sparse_series());
    db.register(FRAME_TIME_SERIES, Arc::clone(&frame_times))?;

    let mut producers = start_producers(config, &db)?;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .ok();

    println!("Scope running. Press Ctrl+C to stop.");
    println!("────────────────────────────────────────");

    let frame_period = Duration::from_secs_f64(1.0 / options.fps as f64);
    let started = Instant::now();
    let mut bins = vec![TsSample::default(); options.bins];
    let mut last_report = 0.0;

    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();
        let now = started.elapsed().as_secs_f64();
        if options.duration.is_some_and(|d| now >= d) {
            break;
        }

        let mut lines = Vec::new();
        for name in db.names() {
            if name == FRAME_TIME_SERIES {
                continue;
            }
            let series = db.get(&name)?;
            if let Some(line) = draw_window(&name, &series, options, &mut bins) {
                lines.push(line);
            }
        }

        let query_ms = frame_start.elapsed().as_secs_f64() * 1000.0;
        if let Err(e) = frame_times.push_value(now, query_ms) {
            warn!("Frame time not recorded: {}", e);
        }

        if now - last_report >= 1.0 {
            last_report = now;
            for line in &lines {
                println!("{}", line);
            }
            print_frame_report(&frame_times, now);
            let stats = db.stats();
            info!(
                "{} series, {} samples, {:.2} MiB",
                stats.series_count,
                stats.num_samples,
                stats.memory_mib()
            );
        }

        std::thread::sleep(frame_period.saturating_sub(frame_start.elapsed()));
    }

    println!();
    println!("Stopping...");
    for producer in &mut producers {
        producer.stop();
    }

    print_frame_history(&frame_times, config);
    println!("{}", serde_json::to_string_pretty(&db.series_stats())?);
    println!("{}", serde_json::to_string_pretty(&db.stats())?);
    println!("Done.");

    Ok(())
}

/// Query the most recent window of a series, as a renderer would per frame
fn draw_window(
    name: &str,
    series: &SeriesHandle,
    options: &Options,
    bins: &mut [TsSample],
) -> Option<String> {
    let (start, end) = match series.query_span() {
        Ok(span) => span,
        Err(e) if e.is_no_data() => return None,
        Err(e) => {
            warn!("Query failed for {}: {}", name, e);
            return None;
        }
    };
    if end <= start {
        return None;
    }

    let window_start = (end - options.window).max(start);
    let bin_width = (end - window_start) / options.bins as f64;
    let written = series.get_samples(bins, window_start, bin_width, options.bins);

    let drawn = &bins[..written];
    let filled = drawn.iter().filter(|b| !b.is_empty()).count();
    let low = drawn
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| b.min)
        .fold(f64::INFINITY, f64::min);
    let high = drawn
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| b.max)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(format!(
        "{:<10} | {:>9} samples | {:>4}/{} bins | range [{:>6.3}, {:>6.3}] | t={:.2}s",
        name,
        series.size(),
        filled,
        written,
        low,
        high,
        end
    ))
}

fn print_frame_report(frame_times: &SparseSeries, now: f64) {
    let since = now - 1.0;
    let mean = frame_times.mean(since, now);
    match frame_times.max(since, now) {
        Ok(worst) => println!(
            "{:<10} | mean {:.3}ms | worst {:.3}ms | {} frames",
            "frames",
            mean,
            worst,
            frame_times.range(since, now).len()
        ),
        Err(e) if e.is_no_data() => {}
        Err(e) => warn!("Frame report failed: {}", e),
    }
}

/// Per-second mean frame times over the whole run, binned per the config
fn print_frame_history(frame_times: &SparseSeries, config: &EngineConfig) {
    let (first, last) = match frame_times.span() {
        Ok(span) => span,
        Err(_) => return,
    };
    let origin = config.bin_anchor.origin(first);
    let count = (last - origin).floor() as usize + 1;
    let means = frame_times.mean_bins_anchored(first, 1.0, count, config.bin_anchor);

    println!("Mean frame time per second ({:?} anchored):", config.bin_anchor);
    for (i, mean) in means.iter().enumerate() {
        if !mean.is_nan() {
            println!("  t={:>6.1}s  {:.3}ms", origin + i as f64, mean);
        }
    }
}
