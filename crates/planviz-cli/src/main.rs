use planviz::raster::{RasterError, RasterOptions, export_jpeg, export_png};
use planviz::render::DeterministicTextMeasurer;
use planviz::{PageMetadata, PlanLayout, PlanViz, PlanVizConfig, ViewState};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Plan(planviz::plan::Error),
    Render(planviz::render::Error),
    Raster(RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Plan(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<planviz::plan::Error> for CliError {
    fn from(value: planviz::plan::Error) -> Self {
        Self::Plan(value)
    }
}

impl From<planviz::render::Error> for CliError {
    fn from(value: planviz::render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Parse,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    verbose: bool,
    config: Option<String>,
    metadata: Option<String>,
    stylesheet_href: Option<String>,
    expand: Vec<u32>,
    expand_all: bool,
    show_hidden_metrics: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "planviz-cli\n\
\n\
USAGE:\n\
  planviz-cli [parse] [--pretty] [<path>|-]\n\
  planviz-cli layout [--pretty] [--config <json>] [--expand <node-id>]... [--expand-all] [--show-hidden-metrics] [<path>|-]\n\
  planviz-cli render [--format svg|png|jpg] [--config <json>] [--metadata <json>] [--stylesheet-href <href>] [--expand <node-id>]... [--expand-all] [--show-hidden-metrics] [--scale <n>] [--background <css-color>] [--out <path>] [<path>|-]\n\
\n\
OPTIONS:\n\
  --verbose  log pipeline stages to stderr (same as PLANVIZ_LOG=debug)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - parse prints the plan graph as JSON; layout prints node, cluster and edge geometry.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG output is named after the metadata title when there is one, else written next to\n\
    the input file (or ./plan.png for stdin).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--expand-all" => args.expand_all = true,
            "--show-hidden-metrics" => args.show_hidden_metrics = true,
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--metadata" => args.metadata = Some(next_value(&mut it)?.clone()),
            "--stylesheet-href" => args.stylesheet_href = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--expand" => {
                let id = next_value(&mut it)?
                    .parse::<u32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.expand.push(id);
            }
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

/// Logs go to stderr. `PLANVIZ_LOG` takes an env-filter directive; `--verbose` forces `debug`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PLANVIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("plan.{ext}")),
    }
}

fn load_config(path: Option<&str>) -> Result<PlanVizConfig, CliError> {
    match path {
        None => Ok(PlanVizConfig::default()),
        Some(path) => Ok(PlanVizConfig::from_json(&std::fs::read_to_string(path)?)?),
    }
}

fn load_metadata(args: &Args) -> Result<PageMetadata, CliError> {
    let mut metadata = match args.metadata.as_deref() {
        None => PageMetadata::default(),
        Some(path) => PageMetadata::from_json(&std::fs::read_to_string(path)?)?,
    };
    if let Some(href) = &args.stylesheet_href {
        metadata.stylesheet_href = Some(href.clone());
    }
    Ok(metadata)
}

fn view_state(args: &Args, text: &str) -> ViewState {
    let mut view = ViewState::from_description(text);
    if args.expand_all {
        view.expand_all(true);
    }
    for &id in &args.expand {
        view.set_panel(id, true);
    }
    if args.show_hidden_metrics {
        view.set_show_hidden_metrics(true);
    }
    view
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Parse => {
            let plan = planviz::parse_plan_graph(&text)?;
            write_json(&plan, args.pretty)
        }
        Command::Layout => {
            let config = load_config(args.config.as_deref())?;
            let viz = PlanViz::new(text.as_str())
                .with_config(config.clone())
                .with_view_state(view_state(&args, &text));
            let plan = planviz::parse_plan_graph(&viz.effective_description())?;
            let g = planviz::layout_plan(&plan, &config, &DeterministicTextMeasurer::default())?;
            write_json(&PlanLayout::from_graph(&plan, &g), args.pretty)
        }
        Command::Render => {
            let mut viz = PlanViz::new(text.as_str())
                .with_config(load_config(args.config.as_deref())?)
                .with_metadata(load_metadata(&args)?)
                .with_view_state(view_state(&args, &text));
            viz.render()?;

            if args.render_format == RenderFormat::Svg {
                let svg = viz.svg().unwrap_or_default();
                return write_text(&svg, args.out.as_deref());
            }

            let options = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..Default::default()
            };
            let export = match args.render_format {
                RenderFormat::Jpeg => export_jpeg(&viz, &options)?,
                _ => export_png(&viz, &options)?,
            };
            let out = match (&args.out, &viz.metadata().title) {
                (Some(out), _) => out.clone(),
                (None, Some(_)) => export.file_name.clone(),
                (None, None) => {
                    default_raster_out_path(args.input.as_deref(), args.render_format.extension())
                        .to_string_lossy()
                        .to_string()
                }
            };
            tracing::debug!(out = %out, "writing image");
            write_bytes(&export.bytes, &out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
