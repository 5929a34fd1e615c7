use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use flatland_core::{ActionLog, UnknownCuePolicy};
use flatland_pipeline::{read_script, PipelineError, Studio, StudioConfig};
use flatland_tts::ProviderType;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a script into speaker/text records and write them as JSON
    Parse {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Run the full pipeline and write the render-action script
    Produce {
        /// Script text, or the JSON written by `parse`
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output path for the actions (defaults to SCRIPT.actions.json)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Studio configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Voice provider: openai, elevenlabs, gemini or espeak
        #[arg(long, conflicts_with = "no_voice")]
        provider: Option<String>,

        /// Skip speech synthesis entirely
        #[arg(long)]
        no_voice: bool,

        /// Never download sound effects
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        primary: Option<String>,

        #[arg(long)]
        secondary: Option<String>,

        #[arg(long)]
        audio_dir: Option<PathBuf>,

        #[arg(long)]
        sfx_dir: Option<PathBuf>,

        /// Report unknown bracket cues instead of dropping them quietly
        #[arg(long)]
        warn_unknown_cues: bool,

        /// Delete the run's voice audio after playback
        #[arg(long)]
        discard_audio: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);
    info!(log_level = %cli.log_level, "Flatland starting");

    let result = match cli.command {
        Command::Parse { script, out } => parse(&script, out.as_deref()),
        Command::Produce {
            script,
            out,
            config,
            provider,
            no_voice,
            offline,
            primary,
            secondary,
            audio_dir,
            sfx_dir,
            warn_unknown_cues,
            discard_audio,
        } => {
            let overrides = Overrides {
                provider,
                no_voice,
                primary,
                secondary,
                audio_dir,
                sfx_dir,
                warn_unknown_cues,
                discard_audio,
            };
            produce(&script, out, config.as_deref(), overrides, offline)
        }
    };

    if let Err(e) = result {
        if let Some(failure) = e.downcast_ref::<PipelineError>() {
            for diagnostic in &failure.diagnostics {
                warn!("{}", diagnostic);
            }
        }
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn parse(script: &Path, out: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(script).with_context(|| format!("Failed to read script {:?}", script))?;
    let document = flatland_core::split_script(&text);
    info!(lines = document.len(), "Script split into records");

    match out {
        Some(path) => {
            document
                .save(path)
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("Records written to {:?}", path);
        }
        None => println!("{}", document.to_json()?),
    }
    Ok(())
}

/// Command-line settings that beat the config file and environment.
struct Overrides {
    provider: Option<String>,
    no_voice: bool,
    primary: Option<String>,
    secondary: Option<String>,
    audio_dir: Option<PathBuf>,
    sfx_dir: Option<PathBuf>,
    warn_unknown_cues: bool,
    discard_audio: bool,
}

impl Overrides {
    fn apply(self, config: &mut StudioConfig) -> Result<()> {
        if self.no_voice {
            config.voice.provider = None;
        } else if let Some(name) = self.provider {
            config.voice.provider = Some(name.parse::<ProviderType>()?);
        }
        if let Some(name) = self.primary {
            config.primary_actor = name;
        }
        if let Some(name) = self.secondary {
            config.secondary_actor = name;
        }
        if let Some(dir) = self.audio_dir {
            config.audio_root = dir;
        }
        if let Some(dir) = self.sfx_dir {
            config.sfx_cache_dir = dir;
        }
        if self.warn_unknown_cues {
            config.unknown_cue_policy = UnknownCuePolicy::Warn;
        }
        if self.discard_audio {
            config.keep_audio = false;
        }
        Ok(())
    }
}

fn produce(
    script: &Path,
    out: Option<PathBuf>,
    config_path: Option<&Path>,
    overrides: Overrides,
    offline: bool,
) -> Result<()> {
    let mut config = StudioConfig::resolve(config_path)?;
    overrides.apply(&mut config)?;

    let output_path = out.unwrap_or_else(|| script.with_extension("actions.json"));
    info!("Script: {:?}", script);
    info!("Output: {:?}", output_path);

    let input = fs::read_to_string(script).with_context(|| format!("Failed to read script {:?}", script))?;
    let document = read_script(&input);

    let downloader = config.downloader(offline)?;
    let mut synth = config.voice.build_synthesizer()?;
    let mut log = ActionLog::new();

    let production = Studio::new(&config, downloader.as_ref(), synth.as_mut())
        .produce_document(&document, &mut log)?;

    for diagnostic in &production.diagnostics {
        warn!("{}", diagnostic);
    }

    log.save(&output_path)
        .with_context(|| format!("Failed to write actions to {:?}", output_path))?;

    info!(
        events = production.report.events_played,
        actions = log.actions.len(),
        seconds = production.report.elapsed_seconds,
        "Scene complete"
    );
    if let Some(dir) = &production.audio_dir {
        info!("Voice audio kept in {:?}", dir);
    }
    Ok(())
}
