use facet::Facet;
use figue as args;
use statetrace::{DumpConfig, Order, Registry};
use std::sync::Arc;
use std::time::Duration;

mod scenarios;

type AnyResult<T> = Result<T, String>;

const DEFAULT_RUN_MS: u64 = 3_000;
const DEFAULT_EXAMPLE_DUMP_MS: u64 = 1_000;
const PROGRAM_NAME: &str = "statetrace-examples";
const ABOUT: &str = "Run a stuck/leaky workload and watch its active states";

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    /// How long the scenario runs before the final snapshot is printed.
    #[facet(args::named, default)]
    run_ms: Option<u64>,
    /// Interval of the periodic dump; falls back to STATETRACE_DUMP_INTERVAL_MS.
    #[facet(args::named, default)]
    dump_ms: Option<u64>,
    /// `id` or `duration`; falls back to STATETRACE_DUMP_ORDER.
    #[facet(args::named, default)]
    order: Option<String>,
    /// Print the final snapshot as JSON instead of text.
    #[facet(args::named, default)]
    json: bool,
    #[facet(args::subcommand)]
    command: CommandKind,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum CommandKind {
    StuckWorker,
    LeakedConnections,
    SlowRequests,
}

struct Config {
    run_for: Duration,
    dump: DumpConfig,
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = parse_cli()?;
    let cfg = config_from_cli(&cli)?;

    let registry = Arc::new(Registry::new());
    let dumper = statetrace::spawn_periodic_dump(Arc::clone(&registry), cfg.dump.clone());

    let result = dispatch_command(Arc::clone(&registry), cli.command, cfg.run_for).await;
    dumper.abort();
    result?;

    let snapshot = registry.list(&cfg.dump.order);
    if cfg.json {
        let json = snapshot.to_json().map_err(|e| e.to_string())?;
        println!("{json}");
    } else if snapshot.is_empty() {
        println!("no active states");
    } else {
        print!("{snapshot}");
    }
    Ok(())
}

fn parse_cli() -> AnyResult<Cli> {
    let schema = args::builder::<Cli>().map_err(|e| format!("invalid CLI definition: {e}"))?;
    let figue_config = schema
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name(PROGRAM_NAME)
                .description(ABOUT)
                .version(env!("CARGO_PKG_VERSION"))
        })
        .build();

    let parsed = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(parsed.value)
}

fn config_from_cli(cli: &Cli) -> AnyResult<Config> {
    let mut dump = DumpConfig::from_env();
    dump.label = PROGRAM_NAME.to_string();
    if std::env::var_os(statetrace::DUMP_INTERVAL_ENV).is_none() {
        dump.interval = Duration::from_millis(DEFAULT_EXAMPLE_DUMP_MS);
    }
    if let Some(ms) = cli.dump_ms {
        if ms == 0 {
            return Err("--dump-ms must be greater than zero".to_string());
        }
        dump.interval = Duration::from_millis(ms);
    }
    if let Some(order) = cli.order.as_deref() {
        dump.order = Order::parse(order)
            .ok_or_else(|| format!("unknown order {order:?}, expected `id` or `duration`"))?;
    }

    Ok(Config {
        run_for: Duration::from_millis(cli.run_ms.unwrap_or(DEFAULT_RUN_MS)),
        dump,
        json: cli.json,
    })
}

async fn dispatch_command(
    registry: Arc<Registry>,
    command: CommandKind,
    run_for: Duration,
) -> AnyResult<()> {
    match command {
        CommandKind::StuckWorker => scenarios::stuck_worker::run(registry, run_for).await,
        CommandKind::LeakedConnections => {
            scenarios::leaked_connections::run(registry, run_for).await
        }
        CommandKind::SlowRequests => scenarios::slow_requests::run(registry, run_for).await,
    }
}
