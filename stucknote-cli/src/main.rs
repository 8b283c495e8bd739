mod source;

use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;

use stucknote_core::config::Config;
use stucknote_core::monitor::{Monitor, MonitorError};

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    device: Option<String>,
    timeout: Option<Duration>,
    interval: Option<Duration>,
    debug: bool,
    verbose: bool,
    list_ports: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-d" | "--device" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{} requires a device name", arg))?;
                cli.device = Some(value.clone());
            }
            "-t" | "--timeout" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{} requires a duration (e.g. 2s, 500ms)", arg))?;
                cli.timeout = Some(parse_duration(value)?);
            }
            "--interval" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{} requires a duration (e.g. 20ms)", arg))?;
                cli.interval = Some(parse_duration(value)?);
            }
            "--debug" => cli.debug = true,
            "-v" | "--verbose" => cli.verbose = true,
            "--list-ports" => cli.list_ports = true,
            other => {
                return Err(format!("Unknown argument: {}", other));
            }
        }
    }

    Ok(cli)
}

/// Parse `2s`, `500ms`, or a bare millisecond count.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "ms"),
    };
    let n: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration: {}", s))?;
    match unit {
        "ms" => Ok(Duration::from_millis(n)),
        "s" => Ok(Duration::from_secs(n)),
        _ => Err(format!("Invalid duration unit in {}: use ms or s", s)),
    }
}

fn print_usage() {
    println!("stucknote - reports MIDI Note Ons that never get a Note Off");
    println!();
    println!("Usage: stucknote [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --device <name>   Input port name filter, case-insensitive substring");
    println!("  -t, --timeout <dur>   Time allowed for a matching Note Off (default 2s)");
    println!("      --interval <dur>  Sweep cadence (default 20ms)");
    println!("      --debug           Dump raw packets instead of tracking them");
    println!("      --list-ports      List available MIDI inputs and exit");
    println!("  -v, --verbose         Debug-level logging");
    println!("  -h, --help            Show this help text");
}

fn init_logging(verbose: bool) {
    use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize logger");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return;
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };
    // Packet dumps come out at debug level, so --debug implies it.
    init_logging(cli.verbose || cli.debug);

    if cli.list_ports {
        match source::list_ports() {
            Ok(names) if names.is_empty() => println!("No MIDI inputs found."),
            Ok(names) => {
                println!("MIDI inputs:");
                for name in names {
                    println!("  {}", name);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut config = Config::load().monitor_config();
    if let Some(device) = cli.device {
        config.device = device;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(interval) = cli.interval {
        config.sweep_interval = interval;
    }
    if cli.debug {
        config.debug = true;
    }

    let (source, packets) = match source::connect(&config.device) {
        Ok(connected) => connected,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    println!("Connected to MIDI input: {}", source.port_name);
    println!("Press Enter to quit.");

    // Enter or EOF on stdin requests shutdown; the monitor also stops if
    // this thread dies and drops the sender.
    let (cancel_tx, cancel_rx) = bounded::<()>(1);
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        let _ = cancel_tx.send(());
    });

    let mut sink = |key: u8| eprintln!("Missing Note Off for {}", key);
    match Monitor::new(config).run(packets, cancel_rx, &mut sink) {
        MonitorError::Cancelled => {}
        MonitorError::Transport(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
