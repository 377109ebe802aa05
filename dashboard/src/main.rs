use std::sync::Arc;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use futures::future::join;
use devscore_dashboard::{
    api::prometheus::PrometheusClient,
    config::Env,
    notify::{print_task, ChannelNotifier},
    state::{DevScore, GithubLink, Update},
    wallet::Wallet,
    Context,
};
use shared::{Activity, ScoreBreakdown, Tier, WalletAddress};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

#[derive(Parser)]
#[command(name = "devscore", version, about = "Developer reputation dashboard")]
struct Cli {
    /// Print Prometheus metrics before exiting
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a score locally from raw counts
    Score {
        #[arg(long, default_value_t = 0)]
        commits: u64,
        #[arg(long, default_value_t = 0)]
        prs: u64,
        #[arg(long, default_value_t = 0)]
        issues: u64,
        #[arg(long, default_value_t = 0)]
        discord: u64,
    },
    /// Fetch GitHub activity for a username
    Activity { username: Option<String> },
    /// Connect the wallet and sync the score linked to it
    Sync,
    /// Mint the reputation NFT for the current score
    Mint { username: Option<String> },
    #[command(subcommand)]
    Github(GithubCommand),
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum GithubCommand {
    /// Show the GitHub account linked to the wallet
    Check,
    /// Link a GitHub account to the wallet
    Connect { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let env = Env::from_env()?;

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(
        "Using backend {} with {} wallet and {} minter",
        env.api_url, env.wallet_provider, env.minter
    );

    let prometheus: Arc<PrometheusClient> = Default::default();
    let (notifier, receiver) = ChannelNotifier::new();
    let printer = tokio::spawn(print_task(receiver));

    let result = match env.context(Arc::new(notifier), prometheus.clone()) {
        Ok(context) => run(context, cli.command).await,
        Err(e) => Err(e),
    };

    // Every sender lives in the context, so the printer stops once `run` is done
    if let Err(e) = printer.await {
        warn!("Notification printer stopped unexpectedly: {e}");
    }

    if cli.metrics {
        println!("{}", prometheus.encode()?);
    }

    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}

async fn run(context: Context, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Score {
            commits,
            prs,
            issues,
            discord,
        } => {
            print_score(&Activity::new(commits, prs, issues, discord));
            Ok(())
        }
        Command::Activity { username } => {
            let username = resolve_username(&context, username).await?;
            let devscore = DevScore::new(context);
            if let Update::Applied(activity) = devscore.fetch_activity(&username).await? {
                print_score(&activity);
            }
            Ok(())
        }
        Command::Sync => {
            let address = connect_wallet(&context).await?;
            let devscore = DevScore::new(context);
            if let Update::Applied(activity) = devscore.sync_from_wallet(&address).await? {
                print_score(&activity);
            }
            Ok(())
        }
        Command::Mint { username } => {
            let devscore = DevScore::new(context.clone());
            match username {
                Some(username) => {
                    // The wallet prompt and the activity fetch don't depend on each other
                    let (address, fetched) =
                        join(connect_wallet(&context), devscore.fetch_activity(&username)).await;
                    fetched?;
                    devscore.attach_wallet(Some(address?));
                }
                None => {
                    let address = connect_wallet(&context).await?;
                    devscore.sync_from_wallet(&address).await?;
                }
            }

            let nft = devscore.mint().await?;
            println!("Token:     {}", nft.token_id());
            println!("Score:     {}", nft.score());
            println!("Minted on: {}", nft.minted_on());
            if let Some(hash) = nft.transaction_hash() {
                println!("Tx:        {hash}");
            }
            Ok(())
        }
        Command::Github(command) => {
            let address = connect_wallet(&context).await?;
            let link = GithubLink::new(context);
            match command {
                GithubCommand::Check => match link.check(&address).await? {
                    Update::Applied(Some(username)) => println!("Linked to GitHub user {username}"),
                    Update::Applied(None) => println!("No GitHub account linked"),
                    Update::Superseded => {}
                },
                GithubCommand::Connect { username } => {
                    link.connect(&address, &username).await?;
                }
            }
            Ok(())
        }
        Command::Leaderboard { limit } => {
            context.prometheus.add_backend_request();
            let entries = context.backend.leaderboard(limit).await?;
            info!("Fetched {} leaderboard entries", entries.len());
            for entry in entries {
                println!(
                    "{:>3}. {:<24} {:>4} {}",
                    entry.rank,
                    entry.username,
                    entry.score,
                    if entry.has_nft { "NFT" } else { "" }
                );
            }
            Ok(())
        }
    }
}

async fn connect_wallet(context: &Context) -> anyhow::Result<WalletAddress> {
    let wallet = Wallet::new(context.clone());
    match wallet.connect().await? {
        Update::Applied(address) => Ok(address),
        Update::Superseded => bail!("wallet connection was cancelled"),
    }
}

async fn resolve_username(context: &Context, username: Option<String>) -> anyhow::Result<String> {
    match username {
        Some(username) => Ok(username),
        None => context
            .auth
            .github_username()
            .await
            .context("Pass a username or set DEVSCORE_GITHUB_USERNAME"),
    }
}

fn print_score(activity: &Activity) {
    let breakdown = ScoreBreakdown::from(activity);
    println!("Commits:         {:>6} (+{})", activity.commits, breakdown.commits);
    println!("Pull requests:   {:>6} (+{})", activity.pull_requests, breakdown.pull_requests);
    println!("Issues:          {:>6} (+{})", activity.issues, breakdown.issues);
    println!("Discord:         {:>6} (+{})", activity.discord_messages, breakdown.discord);
    println!(
        "DevScore:        {:>6} {}{}",
        breakdown.total,
        Tier::from_score(breakdown.total),
        if breakdown.is_capped() { " (capped)" } else { "" }
    );
}
