//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use neighborhood_core::{Role, Screen};

#[derive(Parser, Debug)]
#[command(name = "neighborhood", version, about = "Smart Neighborhood from the command line")]
pub struct Args {
    /// Directory holding the session file and the offline cache
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start a session (any non-empty identifier and password are accepted)
    Login {
        /// Email or username; defaults to the last one used
        identifier: Option<String>,
        #[arg(long, short, default_value = "resident")]
        role: Role,
    },
    /// End the session
    Logout,
    /// Show the session and its permissions
    Whoami,
    /// List the sidebar entries for the session's role
    Menu,
    /// Open a screen by name or path (e.g. residents, /security-schedule)
    Open { screen: Screen },
    /// Resident roster
    Residents {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Security shift schedule
    Schedule {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Announcements from the RT/RW
    Announcements {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Resident feedback
    Feedback {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Security incident reports
    Reports {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Dashboard statistics
    Stats,
    /// Read commands from stdin against one in-memory neighborhood
    Shell,
    /// Raw JSON requests against the backend API
    Api {
        #[command(subcommand)]
        request: ApiRequest,
    },
    /// Offline cache for the web front-end
    Offline {
        #[command(subcommand)]
        command: OfflineCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EntityAction {
    /// List items
    List {
        /// Filter residents by name or address
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one item
    Show { id: u64 },
    /// Show the blank form with its defaults
    Form,
    /// Create an item
    Add {
        #[arg(short = 'f', long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Change fields of an item; unspecified fields keep their values
    Edit {
        id: u64,
        #[arg(short = 'f', long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Delete an item
    Delete { id: u64 },
    /// Reply to a feedback item
    Reply { id: u64, text: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ApiRequest {
    Get { endpoint: String },
    Post {
        endpoint: String,
        /// JSON request body
        #[arg(long)]
        data: String,
    },
    Put {
        endpoint: String,
        /// JSON request body
        #[arg(long)]
        data: String,
    },
    Delete { endpoint: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum OfflineCommand {
    /// Install the current cache version, pre-caching the app shell
    Install,
    /// Fetch URLs (absolute, or paths on the origin) through the cache
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value = "GET")]
        method: String,
        /// Print response bodies
        #[arg(long)]
        body: bool,
    },
    /// List cache versions and their entries
    Status,
}

/// Parse a `NAME=VALUE` form field.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in {:?}", s));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Split a shell line into arguments, honouring single and double quotes.
pub fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}
