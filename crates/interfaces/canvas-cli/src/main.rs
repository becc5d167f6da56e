use camino::Utf8PathBuf;
use canvas_cli::{commands, settings};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// API token (overrides the stored one)
    #[arg(long, global = true, env = canvas_config::TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,
    /// API base URL, e.g. https://canvas.example.edu/api/v1
    #[arg(long, global = true, env = canvas_config::BASE_URL_ENV)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored credentials
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List accessible courses
    Courses,
    /// Print a course's folder tree
    Folders {
        #[arg(long, help = "Course id or course code")]
        course: String,
    },
    /// Count new or changed files without downloading
    Check {
        #[arg(long, help = "Course id or course code (default: all)")]
        course: Option<String>,
        #[arg(long, default_value = ".")]
        dest: Utf8PathBuf,
    },
    /// Download new or changed files
    Sync {
        #[arg(long, help = "Course id or course code (default: all)")]
        course: Option<String>,
        #[arg(long, default_value = ".")]
        dest: Utf8PathBuf,
        #[arg(long, default_value_t = canvas_config::DEFAULT_WRITE_RETRY_LIMIT)]
        retry_limit: u32,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    SetToken { token: String },
    SetBaseUrl { url: String },
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = settings::SettingsStore::new()?;
    let options = || -> anyhow::Result<_> {
        settings::client_options(cli.token.clone(), cli.base_url.clone(), &store.load()?)
    };

    match cli.command {
        Commands::Config { ref command } => match command {
            ConfigCommands::SetToken { token } => settings::handle_set_token(&store, token.clone())?,
            ConfigCommands::SetBaseUrl { url } => settings::handle_set_base_url(&store, url.clone())?,
            ConfigCommands::Show => settings::handle_show(&store)?,
        },
        Commands::Courses => {
            commands::cmd_courses(options()?).await?;
        }
        Commands::Folders { ref course } => {
            commands::cmd_folders(options()?, course.clone()).await?;
        }
        Commands::Check {
            ref course,
            ref dest,
        } => {
            commands::cmd_check(options()?, course.clone(), dest.clone()).await?;
        }
        Commands::Sync {
            ref course,
            ref dest,
            retry_limit,
        } => {
            commands::cmd_sync(options()?, course.clone(), dest.clone(), retry_limit).await?;
        }
    }

    Ok(())
}
