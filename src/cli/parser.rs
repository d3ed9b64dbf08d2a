use crate::export::{ExportEntity, ExportFormat};
use crate::models::invoice::InvoiceStatus;
use crate::models::task::{Priority, TaskStatus};
use crate::models::time_log::ApprovalStatus;
use crate::models::tracker::Provider;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimesheet
/// Multi-user time tracking, project management and invoicing on SQLite
#[derive(Parser)]
#[command(
    name = "rtimesheet",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track time, manage projects and tasks, and invoice clients using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Act as this user (e-mail) instead of the configured current user
    #[arg(global = true, long = "user", value_name = "EMAIL")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Run configuration file migrations if needed")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, help = "Compress the copy (tar.gz on Unix, zip elsewhere)")]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Register users and choose the acting user
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Manage your clients
    Client {
        #[command(subcommand)]
        action: ClientCmd,
    },

    /// Manage projects and their members
    Project {
        #[command(subcommand)]
        action: ProjectCmd,
    },

    /// Manage your team
    Team {
        #[command(subcommand)]
        action: TeamCmd,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskCmd,
    },

    /// Task maintenance jobs
    Tasks {
        #[command(subcommand)]
        action: TasksCmd,
    },

    /// Log time and run timers
    Time {
        #[command(subcommand)]
        action: TimeCmd,
    },

    /// Create and manage invoices
    Invoice {
        #[command(subcommand)]
        action: InvoiceCmd,
    },

    /// Private notes
    Note {
        #[command(subcommand)]
        action: NoteCmd,
    },

    /// Tag autocomplete
    Tag {
        #[command(subcommand)]
        action: TagCmd,
    },

    /// Project chat
    Chat {
        #[command(subcommand)]
        action: ChatCmd,
    },

    /// Task attachments
    Attach {
        #[command(subcommand)]
        action: AttachCmd,
    },

    /// Link projects to GitHub or Jira and import issues as tasks
    Tracker {
        #[command(subcommand)]
        action: TrackerCmd,
    },

    /// Totals, counters and the 7-day trend for the acting user
    Dashboard {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Reference day (default: today)")]
        date: Option<String>,

        #[arg(long, help = "Print the statistics as JSON")]
        json: bool,
    },

    /// Export data to CSV, JSON, XLSX or PDF
    Export {
        #[arg(value_enum)]
        entity: ExportEntity,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "Filter export by year/month/day or a custom range"
        )]
        range: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    /// Register a new user
    Add { name: String, email: String },
    /// List registered users
    List,
    /// Make this user the default acting user
    Switch { email: String },
    /// Show the acting user
    Whoami,
}

#[derive(Subcommand)]
pub enum ClientCmd {
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long, help = "3-letter currency code (default from config)")]
        currency: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
    },
    List,
    Show { id: i64 },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
    },
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum ProjectCmd {
    Add {
        name: String,
        #[arg(long)]
        client: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
    },
    List {
        #[arg(long, help = "Include archived projects")]
        archived: bool,
    },
    Show { id: i64 },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        client: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        rate: Option<f64>,
    },
    Archive { id: i64 },
    Unarchive { id: i64 },
    Del { id: i64 },
    /// Add a team member to the project
    MemberAdd {
        project: i64,
        email: String,
        #[arg(long, help = "Project-specific hourly rate")]
        rate: Option<f64>,
    },
    MemberRemove { project: i64, email: String },
    Members { project: i64 },
}

#[derive(Subcommand)]
pub enum TeamCmd {
    Add {
        email: String,
        #[arg(long)]
        rate: Option<f64>,
    },
    Remove { email: String },
    List,
}

#[derive(Subcommand)]
pub enum TaskCmd {
    Add {
        project: i64,
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
        #[arg(long, value_name = "FREQ", help = "daily, weekly, every_other_week or monthly")]
        recurring: Option<String>,
        #[arg(long = "assign", value_name = "EMAIL")]
        assign: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    List {
        #[arg(long)]
        project: Option<i64>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, help = "Only tasks assigned to me")]
        mine: bool,
    },
    Show { id: i64 },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
        #[arg(long, value_name = "FREQ", conflicts_with = "no_recurring")]
        recurring: Option<String>,
        #[arg(long)]
        no_recurring: bool,
        #[arg(long = "assign", value_name = "EMAIL", help = "Replace the assignees")]
        assign: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Status {
        id: i64,
        #[arg(value_enum)]
        status: TaskStatus,
    },
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TasksCmd {
    /// Create the next occurrence of recurring tasks due on a day
    Recur {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Day to process (default: today)")]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TimeCmd {
    Add {
        project: i64,
        #[arg(long, value_name = "YYYY-MM-DD HH:MM")]
        start: String,
        #[arg(long, value_name = "YYYY-MM-DD HH:MM")]
        end: String,
        #[arg(long)]
        task: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Start {
        project: i64,
        #[arg(long)]
        task: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD HH:MM", help = "Start time (default: now)")]
        at: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Stop {
        #[arg(long, value_name = "YYYY-MM-DD HH:MM", help = "Stop time (default: now)")]
        at: Option<String>,
    },
    /// Show the running timer
    Current,
    List {
        #[arg(long)]
        project: Option<i64>,
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ApprovalStatus>,
        #[arg(long, help = "Only my own logs")]
        mine: bool,
    },
    Edit {
        id: i64,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        task: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Approve { id: i64 },
    Reject { id: i64 },
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum InvoiceCmd {
    /// Bill the approved, unbilled time of a client
    Create {
        client: i64,
        #[arg(long = "project", help = "Restrict to these projects")]
        projects: Vec<i64>,
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,
        #[arg(long, default_value_t = 0.0, help = "Tax rate in percent")]
        tax: f64,
        #[arg(long, default_value_t = 0.0)]
        discount: f64,
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD", help = "Issue date (default: today)")]
        issued: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    List {
        #[arg(long, value_enum)]
        status: Option<InvoiceStatus>,
    },
    Show { id: i64 },
    Status {
        id: i64,
        #[arg(value_enum)]
        status: InvoiceStatus,
    },
    Del { id: i64 },
    /// Render the invoice as PDF
    Pdf {
        id: i64,
        #[arg(long, value_name = "FILE")]
        file: String,
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum NoteCmd {
    Add {
        title: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        client: Option<i64>,
    },
    List {
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        client: Option<i64>,
    },
    Show { id: i64 },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        client: Option<i64>,
    },
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TagCmd {
    /// Your tags starting with a prefix, with usage counts
    List {
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

#[derive(Subcommand)]
pub enum ChatCmd {
    Send { project: i64, message: String },
    List {
        project: i64,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum AttachCmd {
    Add { task: i64, file: String },
    List { task: i64 },
    /// Copy an attachment out to a file
    Get {
        id: i64,
        #[arg(long, value_name = "FILE")]
        file: String,
        #[arg(long, short = 'f')]
        force: bool,
    },
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TrackerCmd {
    Link {
        project: i64,
        #[arg(long, value_enum)]
        provider: Provider,
        #[arg(long, value_name = "OWNER/REPO | KEY")]
        repo: String,
        #[arg(long, value_name = "URL", help = "Jira base URL")]
        url: Option<String>,
    },
    Unlink { project: i64 },
    Show { project: i64 },
    Sync { project: i64 },
}
