mod trace;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use notepilot_core::{
    aggregate, decode_with_header, load_points, sources::parse_pack, AppConfig, CoverImage,
    Easing, EasingCurve, MapFormat, NotepilotError, PlaybackEngine, PlaybackOutcome,
    DEFAULT_CONFIG_PATH,
};
use tracing_subscriber::EnvFilter;

use crate::trace::{IdleInput, PathRecorder, SteppedClock, TraceSample};

fn main() -> notepilot_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { path, format, song } => run_inspect(&path, format, song.as_deref()),
        Commands::Easings => {
            run_easings();
            Ok(())
        }
        Commands::Configure {
            easing,
            scale,
            config,
        } => run_configure(&config, easing, scale),
        Commands::Trace {
            path,
            format,
            song,
            easing,
            tick_ms,
            anchor,
            output,
            config,
        } => run_trace(TraceArgs {
            path: &path,
            format,
            song: song.as_deref(),
            easing,
            tick_ms,
            anchor,
            output: output.as_deref(),
            config: &config,
        }),
    }
}

fn run_inspect(
    path: &Path,
    format: Option<MapFormat>,
    song: Option<&str>,
) -> notepilot_core::Result<()> {
    let format = MapFormat::resolve(format, path)?;
    tracing::info!(?path, %format, "inspecting map");

    match format {
        MapFormat::Sspm => {
            let (header, _) = decode_with_header(&std::fs::read(path)?)?;
            println!("id:         {}", header.id);
            println!("name:       {}", header.name);
            println!("creator:    {}", header.creator);
            println!("duration:   {} ms", header.duration_ms);
            println!("difficulty: {}", header.difficulty);
            println!("declared:   {} notes", header.declared_notes);
            println!("cover:      {}", describe_cover(&header.cover));
            println!("audio:      {} bytes", header.audio_len);
        }
        MapFormat::Pack => {
            let songs = parse_pack(&std::fs::read_to_string(path)?);
            println!("{} songs:", songs.len());
            for song in &songs {
                println!("  {}", song.name);
            }
        }
        MapFormat::Text | MapFormat::Vulnus => {}
    }

    let points = load_points(path, format, song)?;
    let timeline = aggregate(points.clone());
    println!("raw notes:  {}", points.len());
    println!("timeline:   {} points", timeline.len());
    if let (Some(first), Some(last)) = (timeline.first(), timeline.last()) {
        println!(
            "span:       {} ms .. {} ms",
            first.timestamp_ms, last.timestamp_ms
        );
    }
    Ok(())
}

fn describe_cover(cover: &CoverImage) -> String {
    match cover {
        CoverImage::None => "none".to_string(),
        CoverImage::Legacy {
            width, height, len, ..
        } => format!("{width}x{height} image, {len} bytes"),
        CoverImage::Blob { len } => format!("{len} bytes"),
    }
}

fn run_easings() {
    for easing in Easing::ALL {
        println!("{easing}");
    }
}

fn run_configure(
    path: &Path,
    easing: Option<Easing>,
    scale: Option<f64>,
) -> notepilot_core::Result<()> {
    let mut config = AppConfig::load_or_default(path);
    if let Some(easing) = easing {
        config.easing = easing;
    }
    if let Some(scale) = scale {
        config.scale = scale;
    }
    config.save(path)?;
    tracing::info!(?path, easing = %config.easing, scale = config.scale, "config updated");
    println!("easing: {}", config.easing);
    println!("scale:  {}", config.scale);
    Ok(())
}

struct TraceArgs<'a> {
    path: &'a Path,
    format: Option<MapFormat>,
    song: Option<&'a str>,
    easing: Option<Easing>,
    tick_ms: f64,
    anchor: (f64, f64),
    output: Option<&'a Path>,
    config: &'a Path,
}

fn run_trace(args: TraceArgs<'_>) -> notepilot_core::Result<()> {
    if args.tick_ms.is_nan() || args.tick_ms <= 0.0 {
        return Err(NotepilotError::InvalidInput("tick must be a positive duration"));
    }

    let config = AppConfig::load_or_default(args.config);
    let easing = args.easing.unwrap_or(config.easing);
    let format = MapFormat::resolve(args.format, args.path)?;
    let timeline = aggregate(load_points(args.path, format, args.song)?);

    let clock = SteppedClock::new(args.tick_ms / 1000.0);
    let recorder = PathRecorder::new(args.anchor, &clock);
    let mut engine = PlaybackEngine::new(clock, recorder, IdleInput, EasingCurve::unit(easing))
        .with_hotkeys(config.hotkeys.clone())
        .with_scale(config.scale);

    let outcome = engine.run(timeline, |offset_ms| {
        tracing::info!(offset_ms, "offset set");
    });
    if let PlaybackOutcome::InvalidInput(reason) = outcome {
        return Err(NotepilotError::InvalidInput(reason));
    }

    let (_, recorder, _) = engine.into_parts();
    let samples = recorder.into_samples();
    match args.output {
        Some(path) => write_samples(BufWriter::new(File::create(path)?), &samples)?,
        None => write_samples(BufWriter::new(io::stdout().lock()), &samples)?,
    }
    tracing::info!(?outcome, samples = samples.len(), "trace written");
    Ok(())
}

fn write_samples(mut out: impl Write, samples: &[TraceSample]) -> notepilot_core::Result<()> {
    for sample in samples {
        serde_json::to_writer(&mut out, sample)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn parse_anchor(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y`, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid coordinate `{part}`: {err}"))
    };
    Ok((parse(x)?, parse(y)?))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays rhythm maps as pointer movement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print header metadata and note counts for a map.
    Inspect {
        /// Map file to read.
        path: PathBuf,
        /// Map format; guessed from the extension when omitted.
        #[arg(short, long)]
        format: Option<MapFormat>,
        /// Song to count when reading a map pack.
        #[arg(short, long)]
        song: Option<String>,
    },
    /// List the available easing curves.
    Easings,
    /// Update the stored configuration.
    Configure {
        /// Easing curve used between notes.
        #[arg(short, long)]
        easing: Option<Easing>,
        /// Device units per map unit.
        #[arg(long)]
        scale: Option<f64>,
        /// Config file to update.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Play a map against a simulated clock and write the pointer path as
    /// JSON lines.
    Trace {
        /// Map file to play.
        path: PathBuf,
        /// Map format; guessed from the extension when omitted.
        #[arg(short, long)]
        format: Option<MapFormat>,
        /// Song to play when reading a map pack.
        #[arg(short, long)]
        song: Option<String>,
        /// Easing curve; defaults to the configured one.
        #[arg(short, long)]
        easing: Option<Easing>,
        /// Simulated time between two polls of the playback loop.
        #[arg(long, default_value_t = 1.0)]
        tick_ms: f64,
        /// Pointer position captured as the calibration anchor.
        #[arg(long, value_parser = parse_anchor, default_value = "0,0")]
        anchor: (f64, f64),
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file providing easing, scale and hotkeys.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}
