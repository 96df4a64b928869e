use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "projectdesk")]
#[command(about = "ProjectDesk - order and contact intake for student projects")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Validate the environment configuration without starting
    Check,
}

/// Overrides applied on top of the environment configuration
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// Override HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Override PORT
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override STORE_BACKEND
    #[arg(long, value_enum)]
    pub store: Option<StoreArg>,

    /// Override LOG_FORMAT
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreArg {
    /// PostgreSQL at DATABASE_URL
    Postgres,
    /// Process memory, lost on exit
    Memory,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, `serve` with no overrides if none was given
    pub fn into_command(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }
}
