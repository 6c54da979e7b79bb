use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use rplace_painter::canvas::{Canvas, HalfBlockFolder};
use rplace_painter::config::SubmitMode;
use rplace_painter::{CanvasServer, Config, Painter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve an image as pixel records, with an optional virtual canvas
    Serve(ServeArgs),
    /// Poll a server and paint every pixel that is not yet correct
    Paint(PaintArgs),
    /// Render an image through the canvas and print the debug board
    Preview {
        /// Image to render
        image: PathBuf,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address
    #[arg(short, long)]
    bind: Option<String>,
    /// Image to serve
    #[arg(short, long)]
    image: Option<PathBuf>,
    #[arg(long)]
    x_offset: Option<u16>,
    #[arg(long)]
    y_offset: Option<u16>,
    /// Do not keep a canvas; `/put` and `/canvas` answer 404
    #[arg(long)]
    no_virtual_canvas: bool,
    /// Log the board after every accepted pixel
    #[arg(long)]
    render_board: bool,
}

#[derive(Args)]
struct PaintArgs {
    /// Snapshot server base URL
    #[arg(short, long)]
    url: Option<String>,
    /// Paint by running this command instead of calling `/put`
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "PROGRAM [ARGS]...")]
    command: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set log level based on flags
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting rplace-painter version {}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            apply_serve_args(&mut config, args);
            config.validate()?;
            serve(&config).await
        }
        Commands::Paint(args) => {
            apply_paint_args(&mut config, args);
            config.validate()?;
            paint(config).await
        }
        Commands::Preview { image } => {
            config.validate()?;
            preview(&config, &image)
        }
    }
}

fn apply_serve_args(config: &mut Config, args: ServeArgs) {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(image) = args.image {
        config.server.image = Some(image);
    }
    if let Some(x) = args.x_offset {
        config.server.x_offset = x;
    }
    if let Some(y) = args.y_offset {
        config.server.y_offset = y;
    }
    if args.no_virtual_canvas {
        config.server.virtual_canvas = false;
    }
    if args.render_board {
        config.server.render_board = true;
    }
}

fn apply_paint_args(config: &mut Config, args: PaintArgs) {
    if let Some(url) = args.url {
        config.painter.url = url;
    }
    if let Some(mut command) = args.command {
        if !command.is_empty() {
            let program = command.remove(0);
            config.painter.submit = SubmitMode::Command {
                program,
                args: command,
            };
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let server = Arc::new(CanvasServer::from_config(config).context("Failed to load image")?);
    let bind = config.server.bind.clone();

    tokio::select! {
        result = server.run(&bind) => {
            result.with_context(|| format!("Server on {bind} failed"))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Server shutting down normally");
        }
    }
    Ok(())
}

async fn paint(config: Config) -> anyhow::Result<()> {
    let painter = Painter::new(config.painter)?;

    tokio::select! {
        result = painter.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Painter stopped");
        }
    }
    Ok(())
}

fn preview(config: &Config, image: &std::path::Path) -> anyhow::Result<()> {
    let rendered = HalfBlockFolder::new(config.palette()?).open(image)?;
    let mut canvas = Canvas::new(u32::from(rendered.width), u32::from(rendered.rows))?;
    for cell in rendered.cells {
        canvas.apply_cell(cell)?;
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(canvas.render().as_bytes())?;
    stdout.flush()?;
    Ok(())
}
