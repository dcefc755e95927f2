//!
//! sizehub CLI binary
//! ------------------
//! Interactive shell over the local auth service. Useful for poking at a
//! sizehub data directory by hand: register accounts, log in and out, edit
//! the profile and watch the notifications the dashboard would display.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;

use sizehub::identity::{AccountKind, AuthService, ProfilePatch};
use sizehub::notify::{Notification, NotificationSink, Severity};
use sizehub::storage::Store;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--root <data_root>]\n\nFlags:\n  --root <path>   Data directory holding accounts.json/credentials.json/session.json\n                  (default: sizehub_data relative to the current working directory)\n  -h, --help      Show this help\n\nInteractive commands:\n  register <name> <email> <password> <affiliate|creator>\n  login <email> <password>\n  logout\n  profile name|bio|avatar <value...>\n  whoami                             show the current session\n  accounts                           list registered accounts\n  help\n  quit | exit"
    );
}

/// Prints notifications the way the dashboard would toast them.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Info => println!("[info] {}", n.message),
            Severity::Error => println!("[erro] {}", n.message),
        }
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "sizehub_cli".into());
    let mut root: String = "sizehub_data".into();
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                if i + 1 >= args.len() {
                    print_usage(&program);
                    std::process::exit(2);
                }
                root = args[i + 1].clone();
                i += 2;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            other => {
                eprintln!("unknown flag: {other}");
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let store = Store::open_shared(&root)?;
    let svc = AuthService::open(store, Arc::new(StdoutSink))?;

    // silent startup restoration, as the dashboard does before first render
    if let Some(account) = rt.block_on(svc.restore_session()) {
        println!("sessão restaurada: {} <{}>", account.name, account.email);
    }

    run_repl(rt, svc, &program)
}

fn run_repl(rt: tokio::runtime::Runtime, svc: AuthService, program: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("sizehub auth shell. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() || input.is_empty() {
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_lowercase().as_str() {
            "quit" | "exit" => break,
            "help" => print_usage(program),
            "register" => {
                if parts.len() != 5 {
                    eprintln!("usage: register <name> <email> <password> <affiliate|creator>");
                    continue;
                }
                let kind = match parts[4].to_lowercase().as_str() {
                    "affiliate" => AccountKind::Affiliate,
                    "creator" => AccountKind::Creator,
                    other => {
                        eprintln!("unknown kind: {other} (expected affiliate|creator)");
                        continue;
                    }
                };
                // sink already voices success/failure; nothing else to print
                let _ = rt.block_on(svc.register(parts[1], parts[2], parts[3], kind));
            }
            "login" => {
                if parts.len() != 3 {
                    eprintln!("usage: login <email> <password>");
                    continue;
                }
                let _ = rt.block_on(svc.login(parts[1], parts[2]));
            }
            "logout" => rt.block_on(svc.logout()),
            "profile" => {
                if parts.len() < 3 {
                    eprintln!("usage: profile name|bio|avatar <value...>");
                    continue;
                }
                let value = parts[2..].join(" ");
                let patch = match parts[1] {
                    "name" => ProfilePatch { name: Some(value), ..Default::default() },
                    "bio" => ProfilePatch { bio: Some(value), ..Default::default() },
                    "avatar" => ProfilePatch { avatar_url: Some(value), ..Default::default() },
                    other => {
                        eprintln!("unknown field: {other}");
                        continue;
                    }
                };
                let _ = rt.block_on(svc.update_profile(patch));
            }
            "whoami" => match svc.current() {
                Some(a) => println!("{} <{}> ({})", a.name, a.email, a.kind.label()),
                None => println!("anônimo"),
            },
            "accounts" => {
                for a in svc.accounts() {
                    let last = a
                        .last_login
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".into());
                    println!("{}  {} <{}>  {}  last_login={}", a.id, a.name, a.email, a.kind, last);
                }
            }
            other => eprintln!("unknown command: {other} (try 'help')"),
        }
    }
    Ok(())
}
