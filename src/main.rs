use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spanpaper::app::controller::Controller;
use spanpaper::config::{BezelSpec, PreviewSettings, preview};

/// Span one wallpaper image across every monitor.
#[derive(Debug, Parser)]
#[command(name = "spanpaper", version, about)]
struct Cli {
    /// Per-monitor bezels in pixels, "LEFT,TOP;LEFT,TOP;..." from left to
    /// right in monitor order
    #[arg(long, global = true, default_value = "")]
    bezels: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// List the monitors reported by the X server
    Monitors {
        /// Emit the monitor list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a placement preview PNG without touching the wallpaper
    Preview {
        #[command(flatten)]
        placement: PlacementArgs,

        /// Where to write the preview PNG
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Slice the image and hand every monitor its wallpaper
    Set {
        #[command(flatten)]
        placement: PlacementArgs,
    },
}

#[derive(Debug, Args)]
struct PlacementArgs {
    /// Image to place
    #[arg(short, long)]
    file: PathBuf,

    /// Zoom factor; 1 covers the canvas exactly, values below 1 are floored
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Horizontal pan in preview pixels (negative moves the image left)
    #[arg(long, default_value_t = 0.0)]
    pan_x: f64,

    /// Vertical pan in preview pixels (negative moves the image up)
    #[arg(long, default_value_t = 0.0)]
    pan_y: f64,

    /// Preview container width the pan values are expressed in
    #[arg(long, default_value_t = preview::DEFAULT_CONTAINER_WIDTH)]
    container_width: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let bezels: BezelSpec = cli.bezels.parse()?;

    match cli.command {
        CliCommand::Monitors { json } => {
            let controller = Controller::bootstrap(&bezels, PreviewSettings::default())?;
            print_monitors(&controller, json)?;
        }
        CliCommand::Preview { placement, out } => {
            let controller = place(&bezels, &placement)?;
            controller.write_preview(&out)?;
            println!("wrote {}", out.display());
        }
        CliCommand::Set { placement } => {
            let controller = place(&bezels, &placement)?;
            controller.set_wallpaper()?;
        }
    }

    Ok(())
}

/// Bootstraps a session and applies the requested placement to it.
fn place(bezels: &BezelSpec, args: &PlacementArgs) -> Result<Controller, Box<dyn std::error::Error>> {
    let settings = PreviewSettings::new(args.container_width);
    let mut controller = Controller::bootstrap(bezels, settings)?;
    controller.load_image(&args.file)?;
    if args.zoom != 1.0 {
        controller.apply_zoom_factor(args.zoom);
    }
    if args.pan_x != 0.0 || args.pan_y != 0.0 {
        controller.pan(args.pan_x, args.pan_y);
    }
    Ok(controller)
}

fn print_monitors(controller: &Controller, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let monitors = controller.session().monitors();
    if json {
        println!("{}", serde_json::to_string_pretty(monitors)?);
        return Ok(());
    }

    for monitor in monitors {
        println!(
            "{}  {}x{}+{}+{}  {:.1} px/mm  {:.0}mm x {:.0}mm",
            monitor.name,
            monitor.pixel_width,
            monitor.pixel_height,
            monitor.x,
            monitor.y,
            monitor.dpi(),
            monitor.physical_width_mm,
            monitor.physical_height_mm,
        );
    }
    if let Some(canvas) = controller.session().canvas() {
        println!(
            "canvas  {}x{}  aspect {:.3}  min dpi {:.1} px/mm",
            canvas.total_width(),
            canvas.max_height(),
            canvas.aspect_ratio(),
            canvas.min_dpi(),
        );
    }
    Ok(())
}
