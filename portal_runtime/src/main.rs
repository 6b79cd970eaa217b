use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use directory_store::domain::{MessageId, NotificationId, NotificationKind, PaymentStatus};
use directory_store::MutationOutcome;

use portal_runtime::config::PortalConfig;
use portal_runtime::logging::init_logging;
use portal_runtime::pages::{self, sidebar_badges};
use portal_runtime::query::{
    calendar, filter_notifications, filter_payments, periods, resources_for, search_messages,
    GradeFilter, NotificationFilter, PaymentFilter, ReadFilter,
};
use portal_runtime::session::PortalSession;
use portal_runtime::snapshot;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Student portal over the directory store")]
struct Cli {
    /// Configuration file (default: ./portal.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON dataset to load instead of the built-in mock data.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Reference date, YYYY-MM-DD (default: today).
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Dashboard,
    Grades {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        period: Option<String>,
    },
    Performance,
    Payments {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        status: Option<StatusArg>,
    },
    Messages {
        #[arg(long, default_value = "")]
        search: String,
    },
    ReadMessage {
        id: u32,
    },
    Notifications {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        kind: Option<KindArg>,
        #[arg(long, conflicts_with = "read")]
        unread: bool,
        #[arg(long)]
        read: bool,
    },
    ReadNotification {
        id: u32,
    },
    ReadAll,
    Calendar,
    Resources {
        #[arg(long)]
        subject: Option<String>,
    },
    Profile,
    Tutor {
        question: String,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Canonical state hash.
    Hash,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Paid,
    Overdue,
}

impl From<StatusArg> for PaymentStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => PaymentStatus::Pending,
            StatusArg::Paid => PaymentStatus::Paid,
            StatusArg::Overdue => PaymentStatus::Overdue,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Info,
    Warning,
    Success,
    Error,
}

impl From<KindArg> for NotificationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Info => NotificationKind::Info,
            KindArg::Warning => NotificationKind::Warning,
            KindArg::Success => NotificationKind::Success,
            KindArg::Error => NotificationKind::Error,
        }
    }
}

fn describe(outcome: MutationOutcome) -> &'static str {
    match outcome {
        MutationOutcome::Applied { .. } => "marked as read",
        MutationOutcome::AlreadyRead => "already read",
        MutationOutcome::NotFound => "not found",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = PortalConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.dataset.is_some() {
        config.dataset_path = cli.dataset.clone();
    }
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut session = PortalSession::from_config(config).context("loading dataset")?;

    match cli.command {
        Command::Dashboard => {
            let d = session.dashboard(today);
            let badges = sidebar_badges(&session.state());
            println!("{}", d.student_name);
            println!("average {:.1}  subjects {}", d.average_grade, d.subject_count);
            println!(
                "unread messages {}  unread notifications {}",
                badges.messages, badges.notifications
            );
            println!("upcoming:");
            for e in &d.upcoming_events {
                println!("  {} {} {}", e.date, e.time.format("%H:%M"), e.title);
            }
            println!("recent messages:");
            for m in &d.recent_messages {
                let mark = if m.read { ' ' } else { '*' };
                println!("  {mark} [{}] {} - {}", m.id, m.sender, m.subject);
            }
            println!("pending payments:");
            for p in &d.pending_payments {
                println!("  [{}] {} {:.2} due {}", p.id, p.description, p.amount, p.due_date);
            }
        }
        Command::Grades { subject, period } => {
            let filter = GradeFilter { subject, period };
            let state = session.state();
            let summary = pages::grades(&state, &filter, today);
            println!(
                "{} grades  average {:.2}  this month {}",
                summary.filtered_count, summary.filtered_average, summary.this_month
            );
            for g in portal_runtime::query::filter_grades(&state, &filter) {
                let name = state.subject(g.subject_id).map_or("?", |s| s.name.as_str());
                println!(
                    "  {} {:<16} {:>5.1}/{} {:?} ({})",
                    g.date, name, g.grade, g.max_grade, g.kind, g.period
                );
            }
            println!("periods: {}", periods(&state).join(", "));
            for s in &summary.per_subject {
                println!("  {:<16} {:>5.2} ({} grades)", s.name, s.average, s.grade_count);
            }
        }
        Command::Performance => {
            let report = session.performance();
            println!(
                "overall {:.2}  target {:.0}",
                report.overall_average, report.target_average
            );
            for p in &report.ranking {
                println!(
                    "  {:<16} {:>5.2}  last {:>4.1}  {:?} {:?}",
                    p.name, p.average, p.last_grade, p.trend, p.standing
                );
            }
            let focus = session.focus_subjects();
            if !focus.is_empty() {
                println!("focus on: {}", focus.join(", "));
            }
        }
        Command::Payments { search, status } => {
            let summary = session.payments(today);
            println!(
                "pending {:.2}  paid {:.2}  overdue {}",
                summary.total_pending,
                summary.total_paid,
                summary.overdue.len()
            );
            let state = session.state();
            let filter = PaymentFilter {
                search,
                status: status.map(Into::into),
            };
            for p in filter_payments(&state, &filter) {
                let shown = directory_store::metrics::effective_status(p, today);
                println!(
                    "  [{}] {:<28} {:>8.2} due {} {:?}",
                    p.id, p.description, p.amount, p.due_date, shown
                );
            }
        }
        Command::Messages { search } => {
            let state = session.state();
            for m in search_messages(&state, &search) {
                let mark = if m.read { ' ' } else { '*' };
                println!("{mark} [{}] {} {} - {}", m.id, m.date, m.sender, m.subject);
            }
        }
        Command::ReadMessage { id } => {
            let outcome = session.open_message(MessageId(id));
            println!(
                "message {id}: {} (unread {})",
                describe(outcome),
                session.store().unread_messages()
            );
        }
        Command::Notifications {
            search,
            kind,
            unread,
            read,
        } => {
            let state = session.state();
            let filter = NotificationFilter {
                search,
                kind: kind.map(Into::into),
                read: match (unread, read) {
                    (true, _) => ReadFilter::Unread,
                    (_, true) => ReadFilter::Read,
                    _ => ReadFilter::All,
                },
            };
            let stats = session.notification_stats(today);
            println!(
                "total {}  unread {}  today {}  important {}",
                stats.total, stats.unread, stats.today, stats.important
            );
            for n in filter_notifications(&state, &filter) {
                let mark = if n.read { ' ' } else { '*' };
                println!("{mark} [{}] {} {:?} {}", n.id, n.date, n.kind, n.title);
            }
        }
        Command::ReadNotification { id } => {
            let outcome = session.read_notification(NotificationId(id));
            println!(
                "notification {id}: {} (unread {})",
                describe(outcome),
                session.store().unread_notifications()
            );
        }
        Command::ReadAll => {
            let outcome = session.read_all_notifications();
            let flipped = match outcome {
                MutationOutcome::Applied { flipped } => flipped,
                _ => 0,
            };
            println!("{flipped} notifications marked as read");
        }
        Command::Calendar => {
            let state = session.state();
            for e in calendar(&state) {
                let subject = e
                    .subject_id
                    .and_then(|id| state.subject(id))
                    .map_or("", |s| s.name.as_str());
                println!(
                    "{} {} {:?} {} {}",
                    e.date,
                    e.time.format("%H:%M"),
                    e.kind,
                    e.title,
                    subject
                );
            }
        }
        Command::Resources { subject } => {
            let state = session.state();
            for r in resources_for(&state, subject.as_deref()) {
                println!("[{}] {:?} {} {}", r.id, r.kind, r.title, r.url);
            }
        }
        Command::Profile => {
            let state = session.state();
            let s = &state.student;
            println!("{} ({})", s.name, s.student_id);
            println!("{}  class {}  year {}", s.email, s.class, s.year);
            println!("enrollment {}", s.enrollment_number);
            for subject in &state.subjects {
                println!(
                    "  {:<16} {} attendance {:.0}%",
                    subject.name, subject.teacher, subject.attendance
                );
            }
        }
        Command::Tutor { question, subject } => {
            let delay = session.config().tutor_reply_delay_ms;
            if session.ask_tutor(0, &question, subject.as_deref()).is_none() {
                anyhow::bail!("question is empty");
            }
            session.tick(delay);
            for m in session.tutor().conversation() {
                println!("[{:?}] {}\n", m.author, m.content);
            }
        }
        Command::Hash => {
            let record = snapshot::capture(&session.state());
            println!("{}", record.hash);
        }
    }

    session.teardown();
    Ok(())
}
