use crate::application::booking::BookingService;
use crate::application::dashboard::{DashboardSummary, visible_appointments};
use crate::application::recommend::RecommendationService;
use crate::application::search::{SubjectFilter, filter_tutors};
use crate::application::session::{AppState, SessionService};
use crate::config::{BackendKind, Config};
use crate::domain::auth::{Credentials, SignUpDetails};
use crate::domain::catalog::Catalog;
use crate::domain::ports::{
    AppointmentStoreRef, AuthProviderRef, ProfileStoreRef, StateBackendBox,
};
use crate::domain::profile::{ProfilePatch, UserProfile, UserRole};
use crate::domain::tutor::{Subject, Tutor};
use crate::domain::wallet::Amount;
use crate::error::{MarketError, Result};
use crate::infrastructure::json_file::JsonFileBackend;
use crate::infrastructure::local_state::LocalStateStore;
use crate::interfaces::csv::appointment_writer::AppointmentWriter;
use crate::interfaces::csv::tutor_writer::TutorWriter;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Find a tutor, book a session, manage your wallet",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List tutors matching a search
    Tutors {
        /// Text searched in name, specialty and bio
        #[arg(long, default_value = "")]
        query: String,
        /// Subject slug (math, physics, arabic, english, programming, science) or "all"
        #[arg(long, default_value = "all")]
        subject: SubjectFilter,
    },
    /// Show the days and times a tutor can be booked
    Availability { tutor: String },
    /// Ask the AI which tutor fits a request
    Recommend { query: String },
    #[command(flatten)]
    Account(AccountCommand),
}

/// Commands that act on the signed-in account.
#[derive(Subcommand)]
pub enum AccountCommand {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: UserRole,
        /// What you teach (tutors only)
        #[arg(long)]
        specialty: Option<String>,
    },
    /// Sign in to an existing account
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signout,
    /// Book a session and pay for it from the wallet
    Book {
        tutor: String,
        #[arg(long)]
        day: String,
        #[arg(long)]
        time: String,
    },
    /// Show your sessions and wallet
    Dashboard,
    /// Switch between the student and tutor views
    ToggleRole,
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        hourly_rate: Option<Decimal>,
        /// Repeat for each subject taught
        #[arg(long = "subject")]
        subjects: Vec<Subject>,
    },
}

/// The stores every account command works against.
struct Stores {
    auth: AuthProviderRef,
    profiles: ProfileStoreRef,
    appointments: AppointmentStoreRef,
}

async fn open_stores(config: &Config) -> Result<Stores> {
    match config.backend {
        BackendKind::Supabase => {
            let client = config.supabase()?;
            Ok(Stores {
                auth: Arc::new(client.clone()),
                profiles: Arc::new(client.clone()),
                appointments: Arc::new(client),
            })
        }
        BackendKind::Local => {
            let store = LocalStateStore::open(open_state_backend(config)?).await?;
            Ok(Stores {
                auth: Arc::new(store.clone()),
                profiles: Arc::new(store.clone()),
                appointments: Arc::new(store),
            })
        }
    }
}

fn open_state_backend(config: &Config) -> Result<StateBackendBox> {
    if let Some(db_path) = &config.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            debug!(path = %db_path.display(), "Using RocksDB state");
            let backend = crate::infrastructure::rocksdb::RocksDbBackend::open(db_path)?;
            return Ok(Box::new(backend));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            warn!(
                path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the JSON state file."
            );
        }
    }
    debug!(path = %config.state_file.display(), "Using JSON state file");
    Ok(Box::new(JsonFileBackend::open(&config.state_file)))
}

fn find_tutor<'a>(catalog: &'a Catalog, tutor_id: &str) -> Result<&'a Tutor> {
    catalog
        .find(tutor_id)
        .ok_or_else(|| MarketError::NotFound(format!("Tutor {tutor_id}")))
}

async fn require_session(session: &SessionService) -> Result<AppState> {
    session
        .restore()
        .await?
        .ok_or(MarketError::NotSignedIn)
}

/// Runs one command, writing its output to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config;
    let catalog = config.load_catalog()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Tutors { query, subject } => {
            let found = filter_tutors(catalog.tutors(), &query, subject);
            debug!(matches = found.len(), "Filtered tutors");
            TutorWriter::new(out).write_tutors(found)
        }
        Command::Availability { tutor } => {
            let tutor = find_tutor(&catalog, &tutor)?;
            TutorWriter::new(out).write_availability(tutor)
        }
        Command::Recommend { query } => {
            let service = RecommendationService::with_language(
                Box::new(config.gemini()?),
                &config.reasoning_language,
            );
            match service.recommend(&query, catalog.tutors()).await? {
                Some(rec) => {
                    let tutor = find_tutor(&catalog, &rec.tutor_id)?;
                    writeln!(out, "Recommended: {} ({})", tutor.name, tutor.id)?;
                    writeln!(out, "{}", rec.reasoning)?;
                }
                None => writeln!(out, "No recommendation is available right now.")?,
            }
            Ok(())
        }
        Command::Account(command) => {
            let stores = open_stores(&config).await?;
            let booking = BookingService::new(stores.profiles.clone(), stores.appointments.clone());
            let session = SessionService::new(stores.auth, stores.profiles, stores.appointments)
                .with_starting_balance(config.starting_balance()?)
                .with_credentials(config.credentials());
            run_account_command(command, &session, &booking, &catalog, &mut out).await
        }
    }
}

async fn run_account_command(
    command: AccountCommand,
    session: &SessionService,
    booking: &BookingService,
    catalog: &Catalog,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        AccountCommand::Signup {
            name,
            email,
            password,
            role,
            specialty,
        } => {
            let details = SignUpDetails {
                credentials: Credentials {
                    email: email.clone(),
                    password,
                },
                full_name: name,
                role,
                specialty,
            };
            match session.sign_up(&details).await? {
                Some(state) => describe_user(out, "Signed up as", &state.user)?,
                None => writeln!(out, "Check {email} for a confirmation link, then sign in.")?,
            }
        }
        AccountCommand::Signin { email, password } => {
            let state = session.sign_in(&Credentials { email, password }).await?;
            describe_user(out, "Signed in as", &state.user)?;
        }
        AccountCommand::Signout => {
            session.sign_out().await?;
            writeln!(out, "Signed out.")?;
        }
        AccountCommand::Book { tutor, day, time } => {
            let state = require_session(session).await?;
            let tutor = find_tutor(catalog, &tutor)?;
            let outcome = booking
                .confirm_booking(&state.user, &state.appointments, tutor, &day, &time)
                .await?;
            writeln!(
                out,
                "Booked {} on {day} at {time}. Wallet balance: {}",
                tutor.name, outcome.user.wallet_balance
            )?;
        }
        AccountCommand::Dashboard => {
            let state = require_session(session).await?;
            let summary = DashboardSummary::for_user(&state.user, &state.appointments);
            writeln!(out, "role: {}", summary.role)?;
            writeln!(out, "wallet: {}", summary.wallet_balance)?;
            writeln!(out, "upcoming: {}", summary.upcoming)?;
            writeln!(out)?;
            AppointmentWriter::new(&mut *out)
                .write_appointments(visible_appointments(&state.user, &state.appointments))?;
        }
        AccountCommand::ToggleRole => {
            let state = require_session(session).await?;
            let user = session.toggle_role(&state.user).await?;
            writeln!(out, "Now viewing as {}.", user.role)?;
        }
        AccountCommand::Profile { action } => {
            let state = require_session(session).await?;
            match action {
                ProfileCommand::Show => show_profile(out, &state.user)?,
                ProfileCommand::Update {
                    name,
                    email,
                    bio,
                    specialty,
                    hourly_rate,
                    subjects,
                } => {
                    let patch = ProfilePatch {
                        name,
                        email,
                        bio,
                        specialty,
                        hourly_rate: hourly_rate.map(Amount::new).transpose()?,
                        subjects: (!subjects.is_empty()).then_some(subjects),
                        ..ProfilePatch::default()
                    };
                    let user = session.update_profile(&state.user, patch).await?;
                    writeln!(out, "Profile updated.")?;
                    show_profile(out, &user)?;
                }
            }
        }
    }
    Ok(())
}

fn describe_user(out: &mut impl Write, verb: &str, user: &UserProfile) -> Result<()> {
    writeln!(
        out,
        "{verb} {} <{}> ({}). Wallet balance: {}",
        user.name, user.email, user.role, user.wallet_balance
    )?;
    Ok(())
}

fn show_profile(out: &mut impl Write, user: &UserProfile) -> Result<()> {
    writeln!(out, "id: {}", user.id)?;
    writeln!(out, "name: {}", user.name)?;
    writeln!(out, "email: {}", user.email)?;
    writeln!(out, "role: {}", user.role)?;
    writeln!(out, "wallet: {}", user.wallet_balance)?;
    if let Some(specialty) = &user.specialty {
        writeln!(out, "specialty: {specialty}")?;
    }
    if let Some(bio) = &user.bio {
        writeln!(out, "bio: {bio}")?;
    }
    if let Some(rate) = user.hourly_rate {
        writeln!(out, "hourly rate: {rate}")?;
    }
    if let Some(subjects) = &user.subjects {
        let labels: Vec<&str> = subjects.iter().map(|s| s.slug()).collect();
        writeln!(out, "subjects: {}", labels.join(", "))?;
    }
    Ok(())
}
