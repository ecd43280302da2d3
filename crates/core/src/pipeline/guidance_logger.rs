use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for per-frame guidance processing.
pub trait GuidanceLogger: Send {
    fn progress(&mut self, current: usize, total: usize);

    /// Time spent in one stage (detect, brightness, geometry, classify) for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Per-frame measurement such as brightness or coverage ratio.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullGuidanceLogger;

impl GuidanceLogger for NullGuidanceLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Count, sum and extremes of a stream of samples, in constant space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningStat {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl RunningStat {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Folds stage timings and frame metrics into running statistics and
/// reports them through `log` when the session ends.
///
/// Memory stays constant however long the camera runs. Progress lines are
/// logged every `report_every` frames.
pub struct StatsGuidanceLogger {
    report_every: usize,
    stages: BTreeMap<String, RunningStat>,
    metrics: BTreeMap<String, RunningStat>,
    started: Instant,
    frames: usize,
}

impl StatsGuidanceLogger {
    pub fn new(report_every: usize) -> Self {
        Self {
            report_every: report_every.max(1),
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            frames: 0,
        }
    }

    pub fn stage(&self, name: &str) -> Option<&RunningStat> {
        self.stages.get(name)
    }

    pub fn measurement(&self, name: &str) -> Option<&RunningStat> {
        self.metrics.get(name)
    }

    /// Formatted report, or `None` before the first frame was recorded.
    pub fn report(&self) -> Option<String> {
        if self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let seconds = self.started.elapsed().as_secs_f64();
        let mut report = format!("Guided {} frames in {seconds:.1}s", self.frames);
        if seconds > 0.0 && self.frames > 0 {
            report.push_str(&format!(" ({:.1} fps)", self.frames as f64 / seconds));
        }

        for (stage, stat) in &self.stages {
            report.push_str(&format!(
                "\n  {stage:<10} {:>7.2} ms/frame, worst {:.2} ms",
                stat.mean(),
                stat.max
            ));
        }
        for (name, stat) in &self.metrics {
            report.push_str(&format!(
                "\n  {name:<10} mean {:.2}, range [{:.2}, {:.2}] over {} frames",
                stat.mean(),
                stat.min,
                stat.max,
                stat.count
            ));
        }
        Some(report)
    }
}

impl Default for StatsGuidanceLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl GuidanceLogger for StatsGuidanceLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if current % self.report_every == 0 || (total > 0 && current == total) {
            log::info!("Guided {current}/{total} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.stages
            .entry(stage.to_string())
            .or_insert_with(RunningStat::new)
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_insert_with(RunningStat::new)
            .record(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(report) = self.report() {
            log::info!("{report}");
        }
    }
}
