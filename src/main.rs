use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use web2app::{
    AddRequest, AppManager, HttpFetcher, Platform, Settings, SystemEnv, SUPPORTED_BROWSERS,
};

const PROGRAM: &str = "web2app";

#[derive(Parser, Debug)]
#[command(name = PROGRAM, version, about = "Turn websites into desktop apps", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the desktop entries
    #[arg(long, global = true, env = "WEB2APP_APPS_DIR", value_name = "DIR")]
    apps_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new webapp
    Add {
        /// Name of the webapp, also used for its file names
        name: String,

        /// Page to open
        url: String,

        /// Image to download as the launcher icon
        icon_url: String,

        /// Display server (auto-detected if not specified)
        #[arg(long, value_enum)]
        platform: Option<Platform>,

        /// Browser to use (auto-detected if not specified)
        #[arg(long, value_name = "NAME")]
        browser: Option<String>,
    },

    /// List all installed webapps
    List,

    /// Remove a webapp
    Remove {
        /// Name of the webapp
        name: String,
    },
}

fn after_help() -> String {
    format!(
        "Supported browsers: {}\n\nFYI: `<ICON_URL>` must be a png file, use: https://dashboardicons.com",
        SUPPORTED_BROWSERS.join(", ")
    )
}

fn parse_args() -> Args {
    let parsed = Args::command()
        .after_help(after_help())
        .try_get_matches()
        .and_then(|matches| Args::from_arg_matches(&matches));

    match parsed {
        Ok(args) => args,
        Err(e) => {
            // Help and version go to stdout and succeed; everything else is a usage error.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "web2app=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::new(args.apps_dir)?;
    let manager = AppManager::new(settings, SystemEnv);

    match args.command {
        Command::Add {
            name,
            url,
            icon_url,
            platform,
            browser,
        } => {
            let request = AddRequest {
                name,
                url,
                icon_url,
                platform,
                browser,
            };
            let created = manager.create(&request, &HttpFetcher::new()?)?;
            for warning in &created.warnings {
                eprintln!("[WARNING] {}", warning);
            }
            println!(
                "{}: web-app '{}' created successfully.",
                PROGRAM, created.app.name
            );
        }
        Command::Remove { name } => {
            for warning in manager.remove(&name)? {
                eprintln!("[WARNING] {}", warning);
            }
            println!("{}: web-app '{}' deleted successfully.", PROGRAM, name);
        }
        Command::List => {
            let apps = manager.list()?;
            if apps.is_empty() {
                println!("No web apps found.");
                return Ok(());
            }

            println!("Installed web apps:");
            for app in &apps {
                let icon_status = if app.has_icon { "" } else { " (no icon)" };
                println!("  {:20} {}{}", app.name, app.url, icon_status);
            }
            println!("\nTotal: {} web app(s)", apps.len());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("[ERROR] {:#}", e);
        if let Some(hint) = e.downcast_ref::<web2app::Error>().and_then(|e| e.hint()) {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
