use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub locker_searches_total: IntCounterVec,
    pub shipment_operations_total: IntCounterVec,
    pub webhook_events_total: IntCounterVec,
    pub fulfillments_open: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let locker_searches_total = IntCounterVec::new(
            Opts::new("locker_searches_total", "Locker directory searches by outcome"),
            &["outcome"],
        )
        .expect("valid locker_searches_total metric");

        let shipment_operations_total = IntCounterVec::new(
            Opts::new(
                "shipment_operations_total",
                "Courier shipment operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("valid shipment_operations_total metric");

        let webhook_events_total = IntCounterVec::new(
            Opts::new("webhook_events_total", "Courier webhook events by outcome"),
            &["outcome"],
        )
        .expect("valid webhook_events_total metric");

        let fulfillments_open = IntGauge::new(
            "fulfillments_open",
            "Fulfillment records currently held in memory",
        )
        .expect("valid fulfillments_open metric");

        registry
            .register(Box::new(locker_searches_total.clone()))
            .expect("register locker_searches_total");
        registry
            .register(Box::new(shipment_operations_total.clone()))
            .expect("register shipment_operations_total");
        registry
            .register(Box::new(webhook_events_total.clone()))
            .expect("register webhook_events_total");
        registry
            .register(Box::new(fulfillments_open.clone()))
            .expect("register fulfillments_open");

        Self {
            registry,
            locker_searches_total,
            shipment_operations_total,
            webhook_events_total,
            fulfillments_open,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
