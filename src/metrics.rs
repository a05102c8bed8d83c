use crate::watcher::Outcome;

#[derive(Debug, Clone)]
pub struct Metrics {
    cycles: prometheus::IntCounterVec,
    notifications: prometheus::IntCounterVec,
    last_cycle: prometheus::Gauge,
}

impl Metrics {
    pub fn new(registry: &prometheus::Registry) -> Result<Self, prometheus::Error> {
        let cycles = prometheus::IntCounterVec::new(
            prometheus::Opts::new("cycles_total", "Poll cycles by how they ended"),
            &["outcome"],
        )?;
        registry.register(Box::new(cycles.clone()))?;

        let notifications = prometheus::IntCounterVec::new(
            prometheus::Opts::new("notifications_total", "Webhook deliveries attempted"),
            &["result"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let last_cycle =
            prometheus::Gauge::new("last_cycle", "The Unix Timestamp of the last finished cycle")?;
        registry.register(Box::new(last_cycle.clone()))?;

        Ok(Self {
            cycles,
            notifications,
            last_cycle,
        })
    }

    pub fn record(&self, outcome: &Outcome, unix_timestamp: i64) {
        self.cycles.with_label_values(&[outcome.label()]).inc();

        match outcome {
            Outcome::Notified { .. } => {
                self.notifications.with_label_values(&["delivered"]).inc();
            }
            Outcome::DeliveryFailed { .. } => {
                self.notifications.with_label_values(&["failed"]).inc();
            }
            _ => {}
        }

        self.last_cycle.set(unix_timestamp as f64);
    }

    pub fn record_store_failure(&self, unix_timestamp: i64) {
        self.cycles.with_label_values(&["store_failed"]).inc();
        self.last_cycle.set(unix_timestamp as f64);
    }

    pub fn cycles(&self, outcome: &str) -> u64 {
        self.cycles.with_label_values(&[outcome]).get()
    }

    pub fn notifications(&self, result: &str) -> u64 {
        self.notifications.with_label_values(&[result]).get()
    }
}
