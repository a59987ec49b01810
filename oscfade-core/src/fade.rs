//! Fade task: a tick-quantized linear ramp from a start value to a target.
//!
//! A fade reads its start value once, when it is planned, and never looks at
//! the store again. It sends one set per tick until its deadline passes or the
//! ramp reaches the target, then always sends the exact target once more.
//! There is no cancellation; a spawned fade runs until it finishes.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::console::Console;

/// Ticks per second of a fade.
pub const DEFAULT_TICK_RATE: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct FadePlan {
    pub address: String,
    pub start: f32,
    pub target: f32,
    pub duration: Duration,
}

/// What a finished fade actually sent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FadeReport {
    /// Interim tick values delivered to the console.
    pub ticks_sent: usize,
    /// Sends that failed, interim or final.
    pub failed_sends: usize,
    /// Whether the exact-target message went out.
    pub final_sent: bool,
}

/// Time between ticks (`tick_rate` clamped to 1..=1000).
pub fn tick_interval(tick_rate: u32) -> Duration {
    Duration::from_secs(1) / tick_rate.clamp(1, 1000)
}

/// Whole ticks that fit in `duration`.
pub fn tick_count(duration: Duration, interval: Duration) -> u32 {
    (duration.as_nanos() / interval.as_nanos().max(1)).min(u32::MAX as u128) as u32
}

fn sleep_until(when: Instant) {
    let now = Instant::now();
    if when > now {
        thread::sleep(when - now);
    }
}

/// Run a fade to completion on the current thread.
pub fn run_fade(console: &dyn Console, plan: &FadePlan, tick_rate: u32) -> FadeReport {
    let interval = tick_interval(tick_rate);
    let ticks = tick_count(plan.duration, interval);
    let started = Instant::now();
    let deadline = started + plan.duration;

    info!(
        target: "fade",
        "Fading {} from {:.3} to {:.3} over {:.1} seconds",
        plan.address,
        plan.start,
        plan.target,
        plan.duration.as_secs_f32()
    );

    let mut report = FadeReport::default();

    if ticks > 0 {
        let increment = (plan.target - plan.start) / ticks as f32;
        let rising = plan.target > plan.start;
        let falling = plan.target < plan.start;
        let mut value = plan.start;
        let mut tick: u32 = 0;

        loop {
            tick += 1;
            let mut next = started + interval * tick;
            // Drop missed ticks rather than bursting them.
            let now = Instant::now();
            if now > next + interval {
                tick = ((now - started).as_nanos() / interval.as_nanos()) as u32 + 1;
                next = started + interval * tick;
            }
            sleep_until(next);

            if Instant::now() > deadline {
                break;
            }

            value += increment;
            if (rising && value >= plan.target) || (falling && value <= plan.target) {
                break;
            }

            match console.set_fader(&plan.address, value) {
                Ok(()) => report.ticks_sent += 1,
                Err(e) => {
                    report.failed_sends += 1;
                    warn!(target: "fade", "failed sending {} = {}: {}", plan.address, value, e);
                }
            }
        }
    }

    match console.set_fader(&plan.address, plan.target) {
        Ok(()) => report.final_sent = true,
        Err(e) => {
            report.failed_sends += 1;
            warn!(target: "fade", "failed sending final {} = {}: {}", plan.address, plan.target, e);
        }
    }

    report
}

/// Run a fade on its own thread.
///
/// Callers that want fire-and-forget semantics simply drop the handle.
pub fn spawn_fade(
    console: Arc<dyn Console>,
    plan: FadePlan,
    tick_rate: u32,
) -> io::Result<JoinHandle<FadeReport>> {
    thread::Builder::new()
        .name(format!("fade {}", plan.address))
        .spawn(move || run_fade(console.as_ref(), &plan, tick_rate))
}
