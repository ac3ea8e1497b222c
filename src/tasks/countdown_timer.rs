//! Countdown timer background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, CountdownTarget, Tick};

/// Wall-clock cadence of countdown updates
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// How one countdown epoch ended
enum EpochEnd {
    Completed,
    Retargeted,
    Closed,
}

/// Background task that runs one countdown epoch per countdown target
pub async fn countdown_timer_task(state: Arc<AppState>) {
    info!("Starting countdown timer task");

    let mut target_rx = state.target_tx.subscribe();

    loop {
        let target = *target_rx.borrow_and_update();

        match run_epoch(&state, target, &mut target_rx).await {
            EpochEnd::Retargeted => continue,
            EpochEnd::Closed => break,
            EpochEnd::Completed => {
                debug!("Countdown idle until the next target change");
                if target_rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    info!("Countdown timer task stopped");
}

async fn run_epoch(
    state: &AppState,
    target: CountdownTarget,
    target_rx: &mut watch::Receiver<CountdownTarget>,
) -> EpochEnd {
    if let Err(e) = state.retarget_countdown(target) {
        error!("Failed to retarget countdown: {}", e);
        return match target_rx.changed().await {
            Ok(()) => EpochEnd::Retargeted,
            Err(_) => EpochEnd::Closed,
        };
    }

    // Dropped with this epoch, so no ticker outlives a retarget.
    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match state.tick_countdown() {
                    Ok(Tick::Running { remaining_ms }) => {
                        debug!("Countdown tick: {}ms remaining", remaining_ms);
                    }
                    Ok(Tick::Completed { epoch }) => {
                        if let Err(e) = state.complete_countdown(epoch) {
                            error!("Failed to deliver countdown completion: {}", e);
                        }
                        return EpochEnd::Completed;
                    }
                    Ok(Tick::Idle) => return EpochEnd::Completed,
                    Err(e) => error!("Failed to tick countdown: {}", e),
                }
            }

            changed = target_rx.changed() => {
                return match changed {
                    Ok(()) => {
                        debug!("Countdown target changed mid-epoch");
                        EpochEnd::Retargeted
                    }
                    Err(_) => EpochEnd::Closed,
                };
            }
        }
    }
}
