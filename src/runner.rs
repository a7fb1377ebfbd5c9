use crate::app::relay_use_case::RelayUseCase;
use crate::config::Config;
use crate::error::Result;
use crate::formatter::{DisplayZone, MessageFormatter};
use crate::infra::http_client::{build_client, ReqwestFeed};
use crate::infra::telegram::TelegramNotifier;
use crate::watermark::WatermarkStore;
use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, info_span, Instrument};

/// Wire the HTTP adapters, formatter and watermark store described by `config`.
pub fn build_relay(config: &Config) -> Result<RelayUseCase> {
    let client = build_client(config.http_timeout())?;
    let formatter = MessageFormatter::new(&config.site, DisplayZone::from(config.display_offset()?));
    Ok(RelayUseCase::new(
        Box::new(ReqwestFeed::new(client.clone(), config.feed_url.clone())),
        Box::new(TelegramNotifier::new(client, &config.telegram)),
        formatter,
        WatermarkStore::new(config.state_file.clone()),
    ))
}

/// Delay until the next tick of a cadence of `interval` that started `elapsed` ago.
///
/// Equals `interval - (elapsed mod interval)`, so a slow batch shortens the following
/// sleep instead of shifting every later wake-up.
pub fn next_tick_delay(elapsed: Duration, interval: Duration) -> Duration {
    let interval_nanos = interval.as_nanos();
    if interval_nanos == 0 {
        return Duration::ZERO;
    }
    let into_cycle = elapsed.as_nanos() % interval_nanos;
    let remaining = interval_nanos - into_cycle;
    Duration::new(
        (remaining / 1_000_000_000) as u64,
        (remaining % 1_000_000_000) as u32,
    )
}

async fn run_batch(relay: &mut RelayUseCase) -> usize {
    let sent = relay.handle_batch().instrument(info_span!("batch")).await;
    info!("Batch finished, {} entries sent", sent);
    sent
}

/// Run a single batch. Delivery problems are logged by the batch itself and do not
/// change the exit status.
pub async fn run_oneshot(relay: &mut RelayUseCase) -> ExitCode {
    info!("Running in oneshot mode");
    run_batch(relay).await;
    ExitCode::SUCCESS
}

/// Run batches on a fixed cadence anchored at `start` until SIGINT / Ctrl-C.
///
/// The listener is installed before the first batch, so an interrupt that arrives
/// while a batch is running stops the loop as soon as that batch finishes.
pub async fn run_daemon(relay: &mut RelayUseCase, interval: Duration, start: Instant) -> Result<ExitCode> {
    let interrupt = interrupt_listener()?;
    run_daemon_until(relay, interval, start, interrupt).await;
    Ok(ExitCode::SUCCESS)
}

/// Daemon loop that returns once `shutdown` resolves. `shutdown` is polled only
/// between batches, never mid-batch.
pub async fn run_daemon_until<F>(relay: &mut RelayUseCase, interval: Duration, start: Instant, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!(
        "Running in daemon mode. Current update interval: {} seconds",
        interval.as_secs()
    );
    tokio::pin!(shutdown);
    loop {
        run_batch(relay).await;

        let delay = next_tick_delay(start.elapsed(), interval);
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupt received, stopping daemon");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(unix)]
fn interrupt_listener() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        sigint.recv().await;
    })
}

#[cfg(not(unix))]
fn interrupt_listener() -> Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
