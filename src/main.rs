use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use shellbox::config::{self, SessionOptions};
use shellbox::display::{render_line, CLEAR_SCREEN};
use shellbox::network::http_fetch_fn;
use shellbox::output::{LineKind, OutputEvent};
use shellbox::Session;

#[derive(Parser)]
#[command(name = "shellbox")]
#[command(about = "An in-memory Unix-like shell with a JavaScript sandbox")]
#[command(version)]
struct Cli {
    /// Run a command line and exit (may be repeated)
    #[arg(short = 'c', value_name = "LINE")]
    commands: Vec<String>,

    /// TOML file with session options
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable HTTP access for curl
    #[arg(long = "no-network")]
    no_network: bool,

    /// Print raw HTML fragments instead of terminal colors
    #[arg(long = "html")]
    html: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Print new display events. The REPL skips prompt echoes since the
/// terminal already shows what was typed.
fn print_events(session: &Session, html: bool, echo_prompts: bool) {
    for event in session.take_events() {
        match event {
            OutputEvent::Line(line) if line.kind == LineKind::Prompt && !echo_prompts => {}
            OutputEvent::Clear if !html => print!("{}", CLEAR_SCREEN),
            OutputEvent::Clear => {}
            OutputEvent::Line(line) if html => println!("{}", line.render()),
            OutputEvent::Line(line) => println!("{}", render_line(&line)),
        }
    }
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let options = match &cli.config {
        Some(path) => match config::load(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => SessionOptions::default(),
    };

    let mut session = if options.network.enabled && !cli.no_network {
        let fetch_fn = http_fetch_fn(options.network.timeout());
        Session::with_fetch(options, fetch_fn)
    } else {
        Session::new(options)
    };

    if !cli.commands.is_empty() {
        for line in &cli.commands {
            session.submit(line);
            session.settle().await;
            print_events(&session, cli.html, true);
        }
        return;
    }

    let stdin = std::io::stdin();
    let mut input = String::new();
    loop {
        print!("{} $ ", session.cwd());
        let _ = std::io::stdout().flush();

        input.clear();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        session.submit(input.trim_end());
        session.settle().await;
        print_events(&session, cli.html, false);
    }
}
