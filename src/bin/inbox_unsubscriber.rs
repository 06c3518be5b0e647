use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use inbox_unsubscriber::Error;
use inbox_unsubscriber::auth::credentials;
use inbox_unsubscriber::config::{Config, load_config, load_config_from};
use inbox_unsubscriber::mail::FetchOrder;
use inbox_unsubscriber::mail::imap_client::{ImapClient, MailboxSession, validate_email};
use inbox_unsubscriber::store::fs::FsArtifactStore;
use inbox_unsubscriber::terminal::input::read_secret;
use inbox_unsubscriber::terminal::printer::{
    print_compact, print_decode_warning, print_error, print_purple, print_success, print_verbose,
};
use inbox_unsubscriber::terminal::run_menu;
use inbox_unsubscriber::unsubscribe::{
    ActionRunner, ReqwestFetcher, ScanReport, ScanRequest, scan_mailbox,
};

const MAX_LOGIN_ATTEMPTS: usize = 3;
const PASSWORD_PROMPT: &str = "Enter your email third party app password: ";

#[derive(Parser)]
#[command(name = "inbox_unsubscriber")]
#[command(about = "Find unsubscribe links in your inbox and follow the ones you pick", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Args, Clone, Default)]
struct ScanArgs {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mail provider, e.g. yahoo or gmail
    #[arg(long)]
    provider: Option<String>,

    /// IMAP host; overrides the provider table
    #[arg(long)]
    server: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Login address
    #[arg(long)]
    user: Option<String>,

    /// How many emails to scan (default: all)
    #[arg(long)]
    count: Option<u32>,

    #[arg(long, value_enum)]
    order: Option<FetchOrder>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the inbox, then choose whom to unsubscribe from (default)
    Run {
        #[command(flatten)]
        scan: ScanArgs,

        /// Where captured unsubscribe responses are written
        #[arg(long)]
        response_dir: Option<PathBuf>,
    },

    /// Scan the inbox and print what was found without following any link
    List {
        #[command(flatten)]
        scan: ScanArgs,

        #[arg(long)]
        json: bool,
    },

    /// Store the email app password in the keyring
    SetPassword {
        #[arg(long)]
        user: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Run {
        scan: ScanArgs::default(),
        response_dir: None,
    });

    match cmd {
        Command::SetPassword { user } => {
            validate_email(&user)?;
            let secret = read_secret(PASSWORD_PROMPT)?;
            credentials::save_app_password(&user, secret.trim())?;
            println!("Saved app password for {}", user);
            Ok(())
        }

        Command::List { scan, json } => {
            let cancel = install_interrupt_handler()?;
            let cfg = load_with_overrides(&scan)?;
            let report = scan_inbox(&cfg, &cancel)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.registry)?);
            } else {
                print_verbose(&report.registry);
            }
            Ok(())
        }

        Command::Run { scan, response_dir } => {
            let cancel = install_interrupt_handler()?;
            let cfg = load_with_overrides(&scan)?;
            let mut report = scan_inbox(&cfg, &cancel)?;

            print_purple(&format!(
                "Found {} emails to unsubscribe from out of {} scanned!",
                report.registry.len(),
                report.scanned
            ));
            if !report.warnings.is_empty() {
                print_error(&format!(
                    "{} email part(s) could not be decoded and were skipped.",
                    report.warnings.len()
                ));
            }
            if report.registry.is_empty() {
                print_success("\nGoodbye!");
                return Ok(());
            }
            print_compact(&report.registry);

            let http = ReqwestFetcher::new(cfg.http_timeout())?;
            let store = FsArtifactStore::new(response_dir.unwrap_or_else(|| cfg.response_dir()));
            let runner = ActionRunner::new(&http, &store).with_cancel_flag(cancel.clone());

            let stdin = std::io::stdin();
            run_menu(&mut stdin.lock(), &mut report.registry, &runner, &cancel)
        }
    }
}

fn load_with_overrides(args: &ScanArgs) -> Result<Config> {
    let loaded = match &args.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    let mut cfg = loaded.map_err(|e| anyhow!("Configuration error: {e}"))?;

    if let Some(p) = &args.provider {
        cfg.provider = Some(p.clone());
    }
    if let Some(s) = &args.server {
        cfg.imap_server = Some(s.clone());
    }
    if let Some(p) = args.port {
        cfg.imap_port = Some(p);
    }
    if let Some(u) = &args.user {
        cfg.user_email = Some(u.clone());
    }
    if let Some(c) = args.count {
        cfg.scan_count = Some(c);
    }
    if let Some(o) = args.order {
        cfg.order = Some(o);
    }
    Ok(cfg)
}

/// First Ctrl-C asks running work to stop between steps; the second exits.
fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("\nInterrupted; stopping after the current step (Ctrl-C again to quit now)");
    })?;
    Ok(cancel)
}

fn scan_inbox(cfg: &Config, cancel: &Arc<AtomicBool>) -> Result<ScanReport> {
    let server = cfg.resolve_server()?;
    let user = cfg.user_email()?.to_string();
    let client = ImapClient::new(server, user.clone()).with_port(cfg.port());

    let mut session = login(&client, &user)?;

    print_purple("Fetching emails...");
    let request = ScanRequest {
        count: cfg.scan_count,
        order: cfg.order(),
    };
    // on error the session logs out when dropped
    let report = scan_mailbox(&mut session, request, Some(cancel), print_decode_warning)?;
    session.logout()?;
    print_purple("Done fetching emails!");

    Ok(report)
}

fn login(client: &ImapClient, user: &str) -> Result<MailboxSession> {
    validate_email(user)?;

    if let Some(password) = credentials::stored_password(user)? {
        let session = client.login(&password)?;
        print_success("Login Successful");
        return Ok(session);
    }

    for _ in 0..MAX_LOGIN_ATTEMPTS {
        let password = read_secret(PASSWORD_PROMPT)?;
        match client.login(&password) {
            Ok(session) => {
                print_success("Login Successful");
                return Ok(session);
            }
            Err(Error::LoginFailed(e)) => print_error(&format!("Login Failed: {e}")),
            Err(e) => return Err(e.into()),
        }
    }
    Err(anyhow!("giving up after {MAX_LOGIN_ATTEMPTS} failed logins"))
}
