// * feeder -> bounded queue -> worker pool -> single writer, with a ticking reporter on the side
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::lkup::{first_hostname, DomainFilter, ReverseLookup};
use crate::output::{write_matches, MatchLine};

pub const QUEUE_SLOTS_PER_WORKER: usize = 10;
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_PARALLELISM: usize = 4096;

type WorkQueue = Arc<Mutex<mpsc::Receiver<String>>>;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub parallelism: usize,
    pub filter: DomainFilter,
    pub lookup_timeout: Option<Duration>,
    pub progress_interval: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallelism: 1,
            filter: DomainFilter::default(),
            lookup_timeout: None,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

/// Items processed so far. Workers bump it exactly once per item.
#[derive(Debug, Default)]
pub struct Progress {
    processed: AtomicU64,
}

impl Progress {
    pub fn inc(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Summary {
    pub processed: u64,
    pub matched: u64,
    /// set when the writer gave up; lookups still ran to completion
    pub write_error: Option<anyhow::Error>,
}

async fn feed(ips: Vec<String>, tx: mpsc::Sender<String>) {
    for ip in ips {
        // every worker gone means nobody is left to count the rest
        if tx.send(ip).await.is_err() {
            break;
        }
    }
    // dropping tx closes the queue
}

async fn work<L: ReverseLookup>(
    id: usize,
    queue: WorkQueue,
    lookup: Arc<L>,
    opts: Arc<PipelineOptions>,
    matches: mpsc::Sender<MatchLine>,
    progress: Arc<Progress>,
) {
    let mut n_done = 0;
    loop {
        let next = queue.lock().await.recv().await;
        let Some(ip) = next else { break };

        if let Some(hostname) = first_hostname(lookup.as_ref(), &ip, opts.lookup_timeout).await {
            if opts.filter.matches(&hostname) {
                trace!("worker {id}: {ip} matched {hostname}");
                // a dead writer has already recorded its error
                let _ = matches.send(MatchLine { ip, hostname }).await;
            }
        }
        progress.inc();
        n_done += 1;
    }
    debug!("worker {id} done after {n_done} items");
}

fn progress_line(processed: u64) -> String {
    format!("Records processed: {processed}")
}

async fn report<W: Write>(
    progress: Arc<Progress>,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
    mut out: W,
) {
    // first tick one full period from now, not immediately
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = writeln!(out, "{}", progress_line(progress.get()));
                let _ = out.flush();
            }
            _ = &mut stop => return,
        }
    }
}

/// Look up every address in `ips`, writing `"<ip>: <hostname>"` to `out` for
/// each first hostname that passes the filter. Returns once every item has
/// been counted and the output flushed.
pub async fn run_pipeline<L, W>(
    ips: Vec<String>,
    lookup: Arc<L>,
    out: W,
    opts: PipelineOptions,
) -> Summary
where
    L: ReverseLookup,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let n_workers = opts.parallelism.clamp(1, MAX_PARALLELISM);
    let capacity = n_workers * QUEUE_SLOTS_PER_WORKER;
    let progress = Arc::new(Progress::default());
    let opts = Arc::new(opts);
    info!("resolving {} addresses with {} workers", ips.len(), n_workers);

    let (tx_ip, rx_ip) = mpsc::channel(capacity);
    let (tx_match, rx_match) = mpsc::channel(capacity);
    let (tx_stop, rx_stop) = oneshot::channel();

    let writer = tokio::spawn(write_matches(rx_match, out));
    let reporter = tokio::spawn(report(
        progress.clone(),
        opts.progress_interval,
        rx_stop,
        std::io::stdout(),
    ));
    let feeder = tokio::spawn(feed(ips, tx_ip));

    let queue: WorkQueue = Arc::new(Mutex::new(rx_ip));
    let mut workers = JoinSet::new();
    for id in 0..n_workers {
        workers.spawn(work(
            id,
            queue.clone(),
            lookup.clone(),
            opts.clone(),
            tx_match.clone(),
            progress.clone(),
        ));
    }
    // have to drop the original sender so the writer sees the channel close
    drop(tx_match);

    while let Some(res) = workers.join_next().await {
        if let Err(e) = res {
            debug!("worker task failed: {e}");
        }
    }
    let _ = feeder.await;

    let (matched, write_error) = match writer.await {
        Ok(Ok(n)) => (n, None),
        Ok(Err(e)) => (0, Some(e)),
        Err(e) => (0, Some(e.into())),
    };

    let _ = tx_stop.send(());
    let _ = reporter.await;

    let summary = Summary {
        processed: progress.get(),
        matched,
        write_error,
    };
    info!(
        "processed {} addresses, {} matches",
        summary.processed, summary.matched
    );
    summary
}
