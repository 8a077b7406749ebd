//! src/main.rs
//! Cartridge configurator: pick an image from the medium's file list and
//! send commands to the cartridge register window.

use std::{
    io::{self, Write},
    panic::PanicHookInfo,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use cartcfg_core::{
    config::Config,
    controller::{KeyBindings, PageNavigator, SelectionOutcome},
    logging::LoggerBuilder,
    model::FileListModel,
    protocol::{
        CommandEncoder, CommandRequest, MmapTransport, RegisterFrame, WindowTransport, dispatch,
    },
    view::{
        CrosstermConsole, TerminalSession,
        prompt::{Choice, ChoiceSpec, print_numbered, prompt_number},
        terminal::restore_terminal,
    },
};

#[derive(Debug, Parser)]
#[command(name = "cartcfg", version, about = "Cartridge add-on configurator")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level override, e.g. "debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Page through a file list and pick one entry
    Select(SelectArgs),

    /// Send a raw command to the register window
    Send(SendArgs),
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Packed list of NUL-terminated names, ending with an empty name
    #[arg(long)]
    list: PathBuf,

    #[arg(long)]
    page_size: Option<usize>,

    /// Noun shown in the header
    #[arg(long)]
    label: Option<String>,

    /// Entry highlighted first (1-based)
    #[arg(long, default_value_t = 1)]
    start: usize,

    /// Numbered list and line prompt instead of the interactive screen
    #[arg(long)]
    plain: bool,

    /// Command sent with the selected position as payload
    #[arg(long, value_parser = parse_u16)]
    command: Option<u16>,

    /// Device file exposing the register window; dry run when absent
    #[arg(long)]
    device: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SendArgs {
    #[arg(long, value_parser = parse_u16)]
    command: u16,

    /// Hex bytes, e.g. "01,02,03" or "01 02 03"
    #[arg(long, value_parser = parse_payload, default_value = "")]
    payload: Payload,

    #[arg(long)]
    device: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Payload(Vec<u8>);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_panic_handler();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;

    let mut builder = LoggerBuilder::new().with_config(config.logging.clone());
    if let Some(level) = cli.log_level.as_deref() {
        builder = builder.with_level(level);
    }
    let _log_guard = builder.build().await.context("Failed to initialize logging")?;
    info!("Starting cartcfg");

    match cli.command {
        Commands::Select(args) => tokio::task::spawn_blocking(move || run_select(&config, &args))
            .await
            .context("Selector task failed")??,
        Commands::Send(args) => run_send(&config, &args)?,
    }

    info!("cartcfg exited cleanly");
    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load_from(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    Ok(Config::load().await.unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    }))
}

fn run_select(config: &Config, args: &SelectArgs) -> Result<()> {
    let buffer =
        std::fs::read(&args.list).with_context(|| format!("Failed to read {}", args.list.display()))?;
    let list = FileListModel::parse_bounded(&buffer, config.list.max_bytes)
        .with_context(|| format!("Invalid file list {}", args.list.display()))?;

    let page_size = args.page_size.unwrap_or(config.ui.page_size);
    let rows = usize::from(config.ui.layout().max_rows());
    if page_size == 0 || page_size > rows {
        bail!("Page size must be between 1 and {rows}");
    }

    let label = args.label.as_deref().unwrap_or(&config.ui.item_label);
    let start = args.start.saturating_sub(1);

    let outcome = if args.plain {
        select_plain(&list, label)?
    } else {
        select_interactive(config, &list, page_size, label, start)?
    };

    report(outcome, &list, label)?;

    if let (SelectionOutcome::Selected(position), Some(code)) = (outcome, args.command) {
        let request = CommandRequest::for_selection(code, position)?;
        send(config, args.device.as_deref(), &request)?;
    }

    Ok(())
}

fn select_interactive(
    config: &Config,
    list: &FileListModel,
    page_size: usize,
    label: &str,
    start: usize,
) -> Result<SelectionOutcome> {
    let layout = config.ui.layout();

    let _session = TerminalSession::enter().context("Failed to initialize terminal")?;
    let mut console = CrosstermConsole::stdout(KeyBindings::new(config.ui.keymap), layout);
    console.begin(&config.ui.title)?;

    let outcome = PageNavigator::new(list, &mut console, page_size, label)?
        .with_layout(layout)
        .starting_at(start)
        .run()?;

    Ok(outcome)
}

fn select_plain(list: &FileListModel, label: &str) -> Result<SelectionOutcome> {
    if list.is_empty() {
        return Ok(SelectionOutcome::NoContent);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{label} found: {}.", list.item_count())?;
    print_numbered(&mut out, list.iter())?;

    let prompt = format!("Enter the number (1-{}), or press ENTER to cancel: ", list.item_count());
    let choice = prompt_number(
        &mut io::stdin().lock(),
        &mut out,
        &prompt,
        &ChoiceSpec::range(1, list.item_count()),
    )?;

    Ok(match choice {
        Choice::Number(position) => SelectionOutcome::Selected(position),
        Choice::Cancel | Choice::Save => SelectionOutcome::Cancelled,
    })
}

fn report(outcome: SelectionOutcome, list: &FileListModel, label: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    match outcome {
        SelectionOutcome::Selected(position) => {
            let index = outcome
                .index()
                .context("Selected positions start at 1")?;
            let name = list.name_at(index)?;
            writeln!(out, "Selected {position}: {name}")?;
        }
        SelectionOutcome::Cancelled => writeln!(out, "Selection cancelled")?,
        SelectionOutcome::NoContent => writeln!(out, "No {label} to select")?,
    }
    Ok(())
}

fn run_send(config: &Config, args: &SendArgs) -> Result<()> {
    let request = CommandRequest::new(args.command, &args.payload.0)?;
    send(config, args.device.as_deref(), &request)
}

fn send(config: &Config, device: Option<&Path>, request: &CommandRequest) -> Result<()> {
    let transport = &config.transport;
    let frame: RegisterFrame = CommandEncoder::new(transport.protocol_header).encode(request);

    match device.or(transport.device.as_deref()) {
        Some(device) => {
            let mut window = MmapTransport::open(device, transport.base_address, transport.window_size)
                .with_context(|| format!("Failed to map register window from {}", device.display()))?;
            dispatch(&mut window, &frame)?;
            info!("Command {:#06x} sent through {}", request.command_code(), device.display());
        }
        None => {
            let mut window = WindowTransport::new(transport.base_address, transport.window_size);
            dispatch(&mut window, &frame)?;

            let mut out = io::stdout().lock();
            writeln!(out, "Dry run, no device configured. Register accesses:")?;
            for access in window.accesses() {
                writeln!(
                    out,
                    "  {:#010x} <- {:#04x}",
                    window.base_address() + u64::from(access.offset),
                    access.value
                )?;
            }
        }
    }

    Ok(())
}

fn parse_u16(text: &str) -> Result<u16, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid 16-bit value '{text}': {e}"))
}

fn parse_payload(text: &str) -> Result<Payload, String> {
    text.split([',', ' ', ':'])
        .filter(|token| !token.is_empty())
        .map(|token| {
            let hex = token.trim_start_matches("0x").trim_start_matches("0X");
            u8::from_str_radix(hex, 16).map_err(|e| format!("invalid byte '{token}': {e}"))
        })
        .collect::<Result<Vec<u8>, String>>()
        .map(Payload)
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = restore_terminal();

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
