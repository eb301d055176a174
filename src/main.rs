use anyhow::Context;
use clap::Parser;
use employee_sync::{run_sync, FirebaseIdentity, FirestoreStore, SyncReport};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Links employee records to authentication identities: for every employee
/// document without a uid, finds or creates an auth account by email,
/// patches the uid back, and mirrors a minimal profile into `users`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target project id
    #[arg(short, long, env = "EMPLOYEE_SYNC_PROJECT_ID")]
    project_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            info!(
                "Done! {} employees: {} linked to existing accounts, {} accounts created, \
                 {} already linked, {} without email, {} failed",
                report.total,
                report.linked_existing,
                report.created,
                report.already_linked,
                report.missing_email,
                report.failed()
            );
            Ok(())
        }
        Err(err) => {
            error!("Fatal error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<SyncReport> {
    // The admin SDKs resolve credentials and emulator hosts from the
    // environment; the REST clients honor the same variables.
    let access_token = std::env::var("GOOGLE_ACCESS_TOKEN").ok();

    let store = match std::env::var("FIRESTORE_EMULATOR_HOST") {
        Ok(host) => FirestoreStore::with_host(
            &format!("http://{host}"),
            &args.project_id,
            access_token.clone(),
        ),
        Err(_) => FirestoreStore::new(&args.project_id, access_token.clone()),
    };

    let identity = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
        Ok(host) => FirebaseIdentity::with_host(
            &format!("http://{host}/identitytoolkit.googleapis.com"),
            &args.project_id,
            access_token,
        ),
        Err(_) => FirebaseIdentity::new(&args.project_id, access_token),
    };

    info!("Starting employee sync for project {}", args.project_id);

    run_sync(&store, &identity)
        .await
        .context("employee sync failed")
}
