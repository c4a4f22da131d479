//! These structs provide the CLI interface for the agro CLI.

use crate::present::Locale;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// agro: A small-farm finance ledger.
///
/// Record income and expenses against a fixed set of farm categories, see balances and
/// per-category totals, and export everything to CSV. Data is kept as JSON under the agro home
/// directory.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/agro;
    /// pass --agro-home or set AGRO_HOME to put it somewhere else.
    Init(InitArgs),
    /// Record an income or expense transaction.
    Add(AddArgs),
    /// Show total income, expenses and the balance.
    Summary,
    /// Show income and expense totals for every category.
    Chart,
    /// Show the most recent transactions, newest first.
    History(HistoryArgs),
    /// List the transaction categories.
    Categories,
    /// Export every transaction to a CSV file.
    Export(ExportArgs),
    /// Register a user and sign in.
    Register(RegisterArgs),
    /// Sign in as a registered user.
    Login(LoginArgs),
    /// Sign out. New transactions will be recorded by the guest.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Ask a question in plain Portuguese, e.g. "qual é o meu saldo?"
    Ask(AskArgs),
    /// Identify a crop from image classifier predictions and get care recommendations.
    Analyze(AnalyzeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where agro data and configuration is held. Defaults to ~/agro
    #[arg(long, env = "AGRO_HOME", default_value_t = default_agro_home())]
    agro_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, agro_home: PathBuf) -> Self {
        Self {
            log_level,
            agro_home: agro_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn agro_home(&self) -> &DisplayPath {
        &self.agro_home
    }
}

/// (Not shown): Args for the `agro init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// How currency, dates and labels are displayed: pt-BR or en-US.
    #[arg(long, default_value_t = Locale::PtBr)]
    locale: Locale,
}

impl InitArgs {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

/// (Not shown): Args for the `agro add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the transaction was for.
    #[arg(long)]
    description: String,

    /// A positive amount, e.g. 150 or 1500.50
    #[arg(long)]
    amount: String,

    /// Either "income" or "expense".
    #[arg(long = "type")]
    kind: String,

    /// The transaction date, e.g. 2024-03-01
    #[arg(long)]
    date: String,

    /// One of: seeds, fertilizer, equipment, labor, sales, other
    #[arg(long)]
    category: String,
}

impl AddArgs {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind: kind.into(),
            date: date.into(),
            category: category.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// (Not shown): Args for the `agro history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// How many transactions to show. Defaults to the `history_limit` in config.json.
    #[arg(long)]
    limit: Option<usize>,
}

impl HistoryArgs {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// (Not shown): Args for the `agro export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The directory to write the CSV file to. Defaults to $AGRO_HOME/exports
    #[arg(long)]
    out: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(out: Option<PathBuf>) -> Self {
        Self { out }
    }

    pub fn out(&self) -> Option<&Path> {
        self.out.as_deref()
    }
}

/// (Not shown): Args for the `agro register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
}

impl RegisterArgs {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }
}

/// (Not shown): Args for the `agro login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `agro ask` command.
#[derive(Debug, Parser, Clone)]
pub struct AskArgs {
    /// The question, as it would have been spoken.
    #[arg(required = true, num_args = 1..)]
    transcript: Vec<String>,
}

impl AskArgs {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: vec![transcript.into()],
        }
    }

    pub fn transcript(&self) -> String {
        self.transcript.join(" ")
    }
}

/// (Not shown): Args for the `agro analyze` command.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// The classifier output, best first, as JSON:
    /// '[{"className": "corn", "probability": 0.87}]'
    #[arg(long)]
    predictions: String,

    /// Save the analysis for the signed-in user.
    #[arg(long)]
    save: bool,

    /// The analyzed image, recorded with a saved analysis.
    #[arg(long)]
    image: Option<PathBuf>,
}

impl AnalyzeArgs {
    pub fn new(predictions: impl Into<String>, save: bool, image: Option<PathBuf>) -> Self {
        Self {
            predictions: predictions.into(),
            save,
            image,
        }
    }

    pub fn predictions(&self) -> &str {
        &self.predictions
    }

    pub fn save(&self) -> bool {
        self.save
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }
}

fn default_agro_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("agro"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --agro-home or AGRO_HOME instead of relying on the default \
                agro home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("agro")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
