//! Simulated Appliance Example
//!
//! Runs the full calibration loop against a simulated boiler that cycles
//! between standby (~12 W) and heating (~48 W), with a little measurement
//! noise. No network and no real time: a mock clock advances one tick per
//! loop iteration.
//!
//! ## What You'll Learn
//!
//! - Implementing `SignalSource` and `ThresholdSink`
//! - Driving a `Poller` step by step
//! - Reading `TickOutcome` for recomputes, publishes and transitions
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_appliance
//! ```

use autothresh_core::{
    time::{MockClock, TimeSource},
    traits::{SignalSource, ThresholdPair, ThresholdSink},
    Calibrator, CalibratorConfig, Poller, PublishOutcome,
};

/// Boiler power draw: 40 ticks standby, 40 ticks heating, repeated
struct Boiler {
    tick: u64,
}

impl SignalSource for Boiler {
    type Error = &'static str;

    fn fetch(&mut self) -> Result<Option<f64>, Self::Error> {
        self.tick += 1;
        // every 25th poll the meter has nothing to say
        if self.tick % 25 == 0 {
            return Ok(None);
        }
        let heating = (self.tick / 40) % 2 == 1;
        let level = if heating { 48.0 } else { 12.0 };
        let noise = ((self.tick * 37) % 11) as f64 * 0.2 - 1.0;
        Ok(Some(level + noise))
    }
}

/// Prints every threshold update it receives
struct Console;

impl ThresholdSink for Console {
    type Error = &'static str;

    fn push(&mut self, thresholds: ThresholdPair) -> Result<(), Self::Error> {
        println!("  -> sink received {}", thresholds);
        Ok(())
    }
}

fn main() {
    println!("AutoThresh Simulated Appliance Example");
    println!("======================================\n");

    let config = CalibratorConfig::default();
    let calibrator = Calibrator::new(&config).expect("default config is valid");
    let mut poller = Poller::new(
        calibrator,
        Boiler { tick: 0 },
        Console,
        MockClock::new(0),
        config.tick_period_ms,
    );

    for _ in 0..240 {
        let outcome = poller.step();
        let t = poller.clock().now() as f64 / 1000.0;

        if let (Some(reason), Some(cluster)) = (outcome.recompute, outcome.cluster) {
            if cluster.is_changed() {
                println!("t={:6.1}s recompute ({:?}) -> {:?}", t, reason, cluster.thresholds());
                if let PublishOutcome::Deferred { remaining_ms } = outcome.publish {
                    println!("t={:6.1}s publish deferred for {} ms", t, remaining_ms);
                }
            }
        }
        if let Some(transition) = outcome.transition {
            println!("t={:6.1}s {} -> {}", t, transition.from, transition.to);
        }
    }

    let snapshot = poller.calibrator().snapshot();
    println!("\nAfter {} ticks:", poller.ticks());
    println!("  thresholds: {:?}", snapshot.thresholds);
    println!("  state:      {}", snapshot.state);
    println!("  window:     {} samples", snapshot.window_len);
}
