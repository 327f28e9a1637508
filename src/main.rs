use chrono::{DateTime, Local, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use taskquery::models::parse_due;
use taskquery::{Clock, Config, FilterSet, Priority, QueryEngine, SystemClock, Task, TaskFile};
use tracing::Level;

#[derive(Parser)]
#[command(name = "taskquery")]
#[command(about = "TaskQuery CLI - search, filter and sort your task list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/taskquery/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Task file, overriding the configured one
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks matching a query
    List(ListArgs),

    /// List the distinct tag names in use
    Tags,

    /// Add a task
    Add(AddArgs),

    /// Mark a task completed (recurring tasks spawn their next occurrence)
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Mark a task pending again
    Undone {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive text in title, description or tag names
    #[arg(short, long)]
    search: Option<String>,

    /// pending | completed ("" for all)
    #[arg(long)]
    status: Option<String>,

    /// Low | Medium | High | Critical ("" for all)
    #[arg(short, long)]
    priority: Option<String>,

    /// Exact tag name ("" for all)
    #[arg(short, long)]
    tag: Option<String>,

    /// today | week | month | overdue | no-due-date ("" for all)
    #[arg(short, long)]
    due: Option<String>,

    /// createdAt | dueDate | priority | title | completed
    #[arg(long)]
    sort_by: Option<String>,

    /// asc | desc
    #[arg(long)]
    order: Option<String>,

    /// Print the matching tasks as JSON
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    fn params(&self) -> Vec<(&'static str, &str)> {
        [
            ("q", &self.search),
            ("status", &self.status),
            ("priority", &self.priority),
            ("tag", &self.tag),
            ("due_date_range", &self.due),
            ("sort_by", &self.sort_by),
            ("sort_order", &self.order),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[derive(Args)]
struct AddArgs {
    /// Task title
    title: String,

    #[arg(short, long)]
    description: Option<String>,

    /// Low | Medium | High | Critical
    #[arg(short, long)]
    priority: Option<Priority>,

    /// Due date: RFC 3339 timestamp, or YYYY-MM-DD meaning end of that local day
    #[arg(long)]
    due: Option<String>,

    /// Tag name (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// daily | weekly | monthly
    #[arg(long)]
    repeat: Option<taskquery::RecurrenceType>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    if !config.color {
        colored::control::set_override(false);
    }

    let file = TaskFile::new(cli.file.clone().unwrap_or_else(|| config.tasks_file.clone()));
    let engine = QueryEngine::new(SystemClock);

    match cli.command {
        Commands::List(args) => {
            let tasks = file.load()?;
            let query = config.default_query.clone().merge_params(args.params());
            let view = engine.evaluate(&tasks, &query);

            if args.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            let now = engine.clock().now().with_timezone(&Utc);
            for task in &view {
                println!("{}", render(task, now));
            }
            let filters = FilterSet::from_query(&query, engine.clock().now());
            println!(
                "{}",
                format!(
                    "{} of {} tasks | filters: {} | sort: {} {}",
                    view.len(),
                    tasks.len(),
                    filters,
                    query.sort_by,
                    query.sort_order
                )
                .dimmed()
            );
        }
        Commands::Tags => {
            let tasks = file.load()?;
            for name in engine.available_tags(&tasks) {
                println!("{}", name);
            }
        }
        Commands::Add(args) => {
            let mut task = Task::new(args.title);
            task.description = args.description;
            task.priority = args.priority;
            task.due_date = args.due.as_deref().map(parse_due).transpose()?;
            task.recurrence_type = args.repeat;
            let task = file.add_with_tags(&task, &args.tags)?;
            println!("Added {}", render(&task, Utc::now()));
        }
        Commands::Done { id } => {
            let (task, next) = file.set_completed(&id, true)?;
            println!("Completed {}", render(&task, Utc::now()));
            if let Some(next) = next {
                println!("Next up   {}", render(&next, Utc::now()));
            }
        }
        Commands::Undone { id } => {
            let (task, _) = file.set_completed(&id, false)?;
            println!("Reopened {}", render(&task, Utc::now()));
        }
        Commands::Rm { id } => {
            let task = file.remove(&id)?;
            println!("Removed {}", render(&task, Utc::now()));
        }
    }

    Ok(())
}

/// One display line for a task
fn render(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let short_id: String = task.id.chars().take(8).collect();
    let title = if task.completed {
        task.title.dimmed().strikethrough().to_string()
    } else {
        task.title.bold().to_string()
    };

    let mut line = format!("{} {} {}", mark, short_id.dimmed(), title);

    if let Some(priority) = task.priority {
        let label = format!("({})", priority);
        let label = match priority {
            Priority::Critical => label.red().bold(),
            Priority::High => label.yellow(),
            Priority::Medium => label.blue(),
            Priority::Low => label.normal(),
        };
        line.push_str(&format!(" {}", label));
    }

    if let Some(due) = task.due_date {
        let text = format!("due {}", due.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
        if task.is_overdue(now) {
            line.push_str(&format!(" {}", text.red()));
        } else {
            line.push_str(&format!(" {}", text.cyan()));
        }
    }

    if let Some(recurrence) = task.recurrence_type {
        line.push_str(&format!(" {}", format!("↻ {}", recurrence).magenta()));
    }

    for tag in &task.tags {
        line.push_str(&format!(" {}", format!("#{}", tag.name).green()));
    }

    line
}
