use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use crate::{client::Bot, prelude::*};

#[derive(Debug, clap::Parser)]
#[command(version, author, about)]
struct Opts {
    /// Log filter, using env_logger-like syntax
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Hint for the number of threads to use
    #[arg(short = 'j', long, env)]
    threads: Option<usize>,

    #[command(flatten)]
    client: crate::client::ClientOpts,
}

macro_rules! init_error {
    ($($args:tt)*) => ({
        ::tracing::error!($($args)*);
        ::std::process::exit(1);
    })
}

fn fmt_layer<S>() -> tracing_subscriber::fmt::Layer<S> { tracing_subscriber::fmt::layer() }

#[instrument(name = "init_logger", skip(log_filter))]
fn init_subscriber(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter)
        .unwrap_or_else(|e| init_error!("Invalid log filter {log_filter:?}: {e}"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer())
        .try_init()
        .unwrap_or_else(|e| init_error!("Error initializing logger: {e}"));
}

fn load_env() -> Result {
    let profile = if cfg!(debug_assertions) {
        ".env.dev"
    } else {
        ".env.prod"
    };

    [".env.local", profile, ".env"]
        .into_iter()
        .try_for_each(|p| match dotenvy::from_filename(p) {
            Ok(p) => {
                trace!("Loaded env from {p:?}");
                Ok(())
            },
            Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Error loading env from {p:?}")),
        })
}

fn hook_panics() {
    let def = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |inf| {
        def(inf);

        let payload = inf.payload();
        let payload = payload
            .downcast_ref::<&'static str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("Box<dyn Any>");
        let thread = std::thread::current();
        let location = inf.location().map_or_else(String::new, ToString::to_string);

        error!(name = thread.name(), payload, %location, "Thread panicked!");
    }));
}

#[inline]
pub fn main() {
    let tmp_logger =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(fmt_layer()));
    let span = error_span!("boot").entered();

    load_env().unwrap_or_else(|e| init_error!("Error loading .env files: {e:?}"));

    let opts: Opts = clap::Parser::parse();
    drop(span);
    let span = error_span!("boot", ?opts).entered();

    init_subscriber(opts.log_filter.as_deref().unwrap_or("info"));

    drop((span, tmp_logger));

    let rt = {
        let mut builder = tokio::runtime::Builder::new_multi_thread();

        if let Some(threads) = opts.threads {
            builder
                .worker_threads(threads)
                .max_blocking_threads(threads * 2);
        }

        builder
            .enable_all()
            .build()
            .unwrap_or_else(|e| init_error!("Async runtime setup error: {e}"))
    };

    hook_panics();

    std::process::exit(match rt.block_on(run(opts)) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:?}");
            1
        },
    });
}

enum StopType<S> {
    Signal(S),
    Closed(Result<(), serenity::Error>),
}

#[cfg(unix)]
async fn signal() -> Result<Option<impl fmt::Debug>> {
    use futures_util::stream::FuturesUnordered;
    use tokio::signal::unix::SignalKind;

    let mut stream = [
        SignalKind::hangup(),
        SignalKind::interrupt(),
        SignalKind::quit(),
        SignalKind::terminate(),
    ]
    .into_iter()
    .map(|k| {
        tokio::signal::unix::signal(k)
            .with_context(|| format!("Error hooking signal {k:?}"))
            .map(|mut s| async move {
                s.recv().await;
                k
            })
    })
    .collect::<Result<FuturesUnordered<_>>>()?;

    Ok(stream.next().await)
}

#[cfg(not(unix))]
async fn signal() -> Result<Option<impl fmt::Debug>> {
    struct CtrlC;

    impl fmt::Debug for CtrlC {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str("^C") }
    }

    tokio::signal::ctrl_c()
        .map_ok(|()| Some(CtrlC))
        .map_err(Into::into)
        .await
}

#[inline]
#[instrument(level = "error", skip(opts))]
async fn run(opts: Opts) -> Result {
    let Opts {
        log_filter: _,
        threads: _,
        client,
    } = opts;

    let Bot {
        mut client,
        dispatcher,
        inbound,
    } = crate::client::build(client).await?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serve = tokio::spawn(dispatcher.serve(inbound, async move {
        let _ = stop_rx.await;
    }));

    let ret = tokio::select! {
        s = signal() => StopType::Signal(s),
        r = client.start() => StopType::Closed(r),
    };

    let shutdown = !matches!(ret, StopType::Closed(Err(_)));

    let ret = match ret {
        StopType::Signal(Ok(Some(s))) => {
            warn!("{s:?} received, shutting down...");
            Ok(())
        },
        StopType::Signal(Ok(None)) => Err(anyhow!("Unexpected error from signal handler")),
        StopType::Signal(Err(e)) => Err(e),
        StopType::Closed(Ok(())) => Err(anyhow!("Client hung up unexpectedly")),
        StopType::Closed(Err(e)) => Err(e).context("Fatal client error occurred"),
    };

    if shutdown {
        client.shard_manager.shutdown_all().await;
    }

    stop_tx.send(()).ok();
    if let Err(err) = serve.await {
        error!(%err, "Dispatcher task failed");
    }

    ret
}
