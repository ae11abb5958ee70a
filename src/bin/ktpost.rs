use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ktpost", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one poster.
    Render(RenderArgs),
    /// Print the aspect ratio picked for a set of platforms.
    Aspect(AspectArgs),
    /// Render every card of a carousel plan.
    Carousel(CarouselArgs),
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Engine config JSON (brand marks, fonts, colors, output).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preferences JSON holding the default template under `kt-post-template`.
    #[arg(long)]
    prefs: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Background image: URL, data URI or file path.
    #[arg(long)]
    image: String,

    /// Headline.
    #[arg(long)]
    title: String,

    /// Category label.
    #[arg(long, default_value = "")]
    category: String,

    /// Aspect ratio (1:1, 4:5, 16:9, 9:16). Overrides --platforms.
    #[arg(long)]
    aspect: Option<ktpost::AspectRatio>,

    /// Target platforms, comma separated; picks the aspect ratio when --aspect is absent.
    #[arg(long, value_delimiter = ',')]
    platforms: Vec<String>,

    /// Template (classic, modern-center, minimal-top).
    #[arg(long)]
    template: Option<ktpost::TemplateId>,

    /// Render as a follow-up card (no badge, no mark).
    #[arg(long)]
    follow_up: bool,

    #[command(flatten)]
    engine: EngineArgs,

    /// Output file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct AspectArgs {
    /// Platform identifiers, e.g. `instagram twitter`.
    platforms: Vec<String>,
}

#[derive(Parser, Debug)]
struct CarouselArgs {
    /// Carousel plan JSON.
    #[arg(long)]
    plan: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Directory receiving `card-NN.<ext>`.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    match cli.cmd {
        Command::Render(args) => run_async(cmd_render(args)),
        Command::Aspect(args) => cmd_aspect(args),
        Command::Carousel(args) => run_async(cmd_carousel(args)),
    }
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn run_async<F>(fut: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    rt.block_on(fut)
}

fn build_engine(args: &EngineArgs) -> anyhow::Result<ktpost::PosterEngine> {
    let config = match &args.config {
        Some(path) => ktpost::EngineConfig::from_path(path)?,
        None => ktpost::EngineConfig::default(),
    };
    let stored = match &args.prefs {
        Some(path) => {
            let prefs = ktpost::JsonPreferenceFile::load(path)?;
            ktpost::PreferenceStore::get(&prefs, ktpost::TEMPLATE_PREFERENCE_KEY)
        }
        None => None,
    };
    let default_template =
        ktpost::resolve_template(None, stored.as_deref(), config.default_template);
    Ok(ktpost::PosterEngine::builder()
        .config(config)
        .default_template(default_template)
        .build()?)
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let engine = build_engine(&args.engine)?;
    let aspect = args
        .aspect
        .unwrap_or_else(|| ktpost::best_aspect_ratio(&args.platforms));
    let options = ktpost::RenderOptions {
        image_source: args.image,
        title: args.title,
        category: args.category,
        aspect_ratio: aspect,
        template: args.template,
        is_follow_up: args.follow_up,
    };

    let poster = engine.render(&options).await?;
    write_output(&args.out, &poster.bytes)?;
    tracing::info!(
        out = %args.out.display(),
        width = poster.width,
        height = poster.height,
        bytes = poster.bytes.len(),
        "poster written"
    );
    Ok(())
}

fn cmd_aspect(args: AspectArgs) -> anyhow::Result<()> {
    println!("{}", ktpost::best_aspect_ratio(&args.platforms));
    Ok(())
}

async fn cmd_carousel(args: CarouselArgs) -> anyhow::Result<()> {
    let plan: ktpost::CarouselPlan = {
        let f = File::open(&args.plan)
            .with_context(|| format!("open carousel plan '{}'", args.plan.display()))?;
        serde_json::from_reader(BufReader::new(f)).context("parse carousel plan JSON")?
    };
    let engine = build_engine(&args.engine)?;
    let posters = engine.render_carousel(&plan).await?;

    let ext = engine.config().output.extension();
    for (i, poster) in posters.iter().enumerate() {
        let path = args.out_dir.join(format!("card-{i:02}.{ext}"));
        write_output(&path, &poster.bytes)?;
    }
    tracing::info!(cards = posters.len(), out_dir = %args.out_dir.display(), "carousel written");
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
