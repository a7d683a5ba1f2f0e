//! MouseMover - Jump the cursor between displays
//!
//! Global hotkeys move the mouse cursor (and optionally the frontmost window)
//! to a chosen display, with a smooth animation and a brief highlight where
//! it lands.

mod config;
mod cursor;
mod engine;
mod feedback;
mod geometry;
mod hotkey;
mod platform;
mod screen;
mod window;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use engine::{AppContext, Outcome, RelocationRequest, Relocator};
use hotkey::{HotkeyBinding, Key, ModifierSet};
use platform::Platform;
use screen::{DisplayDirectory, DisplayId};

/// MouseMover - Move the cursor between displays with global hotkeys
#[derive(Parser)]
#[command(name = "mousemover")]
#[command(author = "MouseMover Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Jump the mouse cursor between displays with global hotkeys", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in the background and listen for hotkeys
    Run,

    /// Move the cursor to a display once and exit
    Jump {
        /// Display id (see `displays`)
        #[arg(short, long)]
        display: u32,

        /// Move the frontmost window along with the cursor
        #[arg(short, long)]
        window: bool,
    },

    /// List attached displays
    Displays,

    /// Show the active hotkeys
    Bindings,

    /// Bind a display to a hotkey, replacing its current one
    Bind {
        /// Display id (see `displays`)
        #[arg(short, long)]
        display: u32,

        /// Key: 0-9 or a-z
        #[arg(short, long, value_parser = parse_key)]
        key: Key,

        /// Comma-separated modifiers (cmd, shift, opt, ctrl)
        #[arg(short, long, default_value = "cmd,shift")]
        modifiers: ModifierSet,
    },

    /// Remove the hotkey of a display
    Unbind {
        /// Display id (see `displays`)
        #[arg(short, long)]
        display: u32,
    },

    /// Forget stored hotkeys and go back to the defaults
    Reset,

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show system information
    Info,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over the flag
    let level = if cli.verbose || config.general.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run => {
            run_daemon(config, cli.config).await?;
        }
        Commands::Jump { display, window } => {
            run_jump(config, DisplayId(display), window).await?;
        }
        Commands::Displays => {
            print_displays()?;
        }
        Commands::Bindings => {
            print_bindings(config)?;
        }
        Commands::Bind {
            display,
            key,
            modifiers,
        } => {
            let mut context = AppContext::new(config, Platform::native()?);
            let binding = HotkeyBinding::new(DisplayId(display), key, modifiers);
            context.bind(binding)?;
            println!("{} -> display {}", binding.chord(), binding.display);
            print_reload_hint();
        }
        Commands::Unbind { display } => {
            let mut context = AppContext::new(config, Platform::native()?);
            if context.unbind(DisplayId(display))? {
                println!("Display {} unbound", display);
                print_reload_hint();
            } else {
                println!("Display {} has no hotkey", display);
            }
        }
        Commands::Reset => {
            let mut context = AppContext::new(config, Platform::native()?);
            context.reset_bindings()?;
            println!("Default hotkeys restored");
            print_reload_hint();
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Info => {
            print_system_info(&config);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    })
}

/// Listen for hotkeys until interrupted
async fn run_daemon(config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let platform = Platform::native()?;

    if !platform.accessibility.is_trusted() {
        tracing::warn!(
            "Accessibility permission not granted: window moves, drag events and refocus are disabled"
        );
    }

    let mut context = AppContext::new(config, platform);

    let mut capture = hotkey::native_capture()?;
    let mut chords = capture.start().await?;
    let mut reload = ReloadSignal::new()?;

    println!("\n========================================");
    println!("  MouseMover Running");
    println!("========================================");
    for (chord, request) in context.registry().entries() {
        println!("  {:<8} -> {}", chord.to_string(), describe(&request));
    }
    println!("========================================");
    println!("\nPress Ctrl+C to stop.\n");

    // Main event loop
    loop {
        tokio::select! {
            Some(chord) = chords.recv() => {
                if context.dispatch(&chord).is_none() {
                    tracing::trace!("Unbound chord {}", chord);
                }
            }
            _ = reload.recv() => {
                tracing::info!("Reloading configuration");
                match load_config(config_path.as_deref()) {
                    Ok(config) => context.reload(config),
                    Err(e) => {
                        tracing::error!("Failed to reload configuration: {}", e);
                        context.refresh();
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    capture.stop().await?;
    tracing::info!("Stopped");

    Ok(())
}

/// One-shot relocation
async fn run_jump(config: Config, display: DisplayId, window: bool) -> anyhow::Result<()> {
    let platform = Platform::native()?;
    let request = if window {
        RelocationRequest::window(display)
    } else {
        RelocationRequest::cursor(display)
    };

    let relocator = Relocator::new(platform, &config);
    let outcome = relocator.handle(request).await;

    match &outcome {
        Outcome::CursorMoved { target, .. } => {
            println!("Cursor moved to ({:.0}, {:.0})", target.x, target.y);
        }
        Outcome::WindowMoved { frame, maximized, .. } => {
            println!(
                "Window moved to ({:.0}, {:.0}) {:.0}x{:.0}{}",
                frame.min_x(),
                frame.min_y(),
                frame.width(),
                frame.height(),
                if *maximized { " (maximized)" } else { "" }
            );
        }
        Outcome::Superseded => {}
        Outcome::Skipped(reason) => anyhow::bail!("Nothing moved: {}", reason),
    }

    // Let the highlight play out before the runtime goes away
    if config.feedback.enabled {
        tokio::time::sleep(std::time::Duration::from_millis(config.feedback.duration_ms)).await;
    }

    Ok(())
}

fn print_displays() -> anyhow::Result<()> {
    let platform = Platform::native()?;
    let directory = DisplayDirectory::enumerate(platform.displays.as_ref())?;

    if directory.is_empty() {
        println!("No displays attached.");
        return Ok(());
    }

    for display in directory.displays() {
        let usable = display.usable_bounds;
        println!("{:>10}  {}", display.id, display.label());
        println!(
            "{:>10}  origin ({:.0}, {:.0}), usable {:.0}x{:.0} at ({:.0}, {:.0})",
            "",
            display.bounds.min_x(),
            display.bounds.min_y(),
            usable.width(),
            usable.height(),
            usable.min_x(),
            usable.min_y()
        );
    }

    Ok(())
}

fn print_bindings(config: Config) -> anyhow::Result<()> {
    let platform = Platform::native()?;
    let context = AppContext::new(config, platform);

    println!("Bindings file: {}", context.config().bindings_path().display());

    let entries = context.registry().entries();
    if entries.is_empty() {
        println!("No hotkeys registered.");
        return Ok(());
    }

    for (chord, request) in entries {
        println!("  {:<8} -> {}", chord.to_string(), describe(&request));
    }

    Ok(())
}

fn parse_key(s: &str) -> Result<Key, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Key::from_char(c).ok_or_else(|| format!("'{}' is not 0-9 or a-z", c)),
        _ => Err("expected a single character".to_string()),
    }
}

fn print_reload_hint() {
    println!("A running mousemover picks this up on SIGHUP (kill -HUP <pid>).");
}

fn describe(request: &RelocationRequest) -> String {
    if request.move_window {
        format!("display {} (with window)", request.display)
    } else {
        format!("display {}", request.display)
    }
}

/// Print system information
fn print_system_info(config: &Config) {
    println!("MouseMover System Information");
    println!("=============================\n");

    println!("Platform: {}", platform::platform_name());

    match Platform::native() {
        Ok(platform) => {
            println!(
                "Accessibility: {}",
                if platform.accessibility.is_trusted() {
                    "granted"
                } else {
                    "not granted"
                }
            );
            if let Ok(directory) = DisplayDirectory::enumerate(platform.displays.as_ref()) {
                println!("Displays: {}", directory.len());
            }
        }
        Err(e) => println!("Window system: {}", e),
    }

    println!("\nConfiguration search paths:");
    for path in Config::search_paths() {
        println!("  - {}", path.display());
    }
    println!("Bindings file: {}", config.bindings_path().display());

    #[cfg(target_os = "macos")]
    {
        println!("\nmacOS Requirements:");
        println!("  - Accessibility permissions required for hotkeys and window moves");
        println!("  - System Settings > Privacy & Security > Accessibility");
    }
}

/// Configuration reload requests (SIGHUP)
struct ReloadSignal {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl ReloadSignal {
    #[cfg(unix)]
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        self.hangup.recv().await;
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        std::future::pending::<()>().await;
    }
}
