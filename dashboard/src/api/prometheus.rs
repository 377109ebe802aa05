use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Operation {
    FetchActivity,
    SyncFromWallet,
    Mint,
    ConnectWallet,
    CheckGithub,
    ConnectGithub,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Success,
    Failure,
    // Refused before any request was made
    Rejected,
    // Finished after a newer request of the same kind and was dropped
    Superseded,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OperationRecord {
    pub operation: Operation,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct TimeMetric {
    pub operation: Operation,
    pub success: u32,
}

pub struct PrometheusClient {
    registry: Registry,
    operation: Family<OperationRecord, Counter>,
    operation_time: Family<TimeMetric, Histogram>,
    // Requests that actually left the process, rejected operations excluded
    backend_requests: Counter,
}

impl Default for PrometheusClient {
    fn default() -> Self {
        let mut registry = Registry::default();
        let operation = Family::default();
        let backend_requests = Counter::default();
        let operation_time: Family<TimeMetric, Histogram> = Family::new_with_constructor(|| {
            Histogram::new(
                [0.05, 0.1, 0.25, 0.5, 1., 2., 5., 10., 30., f64::INFINITY].into_iter(),
            )
        });

        registry.register(
            "devscore_operation",
            "State container operations by outcome",
            operation.clone(),
        );
        registry.register(
            "devscore_operation_time",
            "Time spent in state container operations",
            operation_time.clone(),
        );
        registry.register(
            "devscore_backend_requests",
            "Total requests sent to the backend or providers from the start",
            backend_requests.clone(),
        );

        Self {
            registry,
            operation,
            operation_time,
            backend_requests,
        }
    }
}

impl PrometheusClient {
    pub fn record(
        &self,
        operation: Operation,
        outcome: Outcome,
        started: chrono::DateTime<chrono::Utc>,
    ) {
        self.operation
            .get_or_create(&OperationRecord { operation, outcome })
            .inc();

        if outcome == Outcome::Rejected {
            return;
        }

        let time = chrono::Utc::now() - started;
        self.operation_time
            .get_or_create(&TimeMetric {
                operation,
                success: (outcome == Outcome::Success) as u32,
            })
            .observe(time.num_milliseconds() as f64 / 1000.0);
    }

    pub fn add_backend_request(&self) {
        self.backend_requests.inc();
    }

    pub fn operation_count(&self, operation: Operation, outcome: Outcome) -> u64 {
        self.operation
            .get_or_create(&OperationRecord { operation, outcome })
            .get()
    }

    pub fn backend_requests(&self) -> u64 {
        self.backend_requests.get()
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_by_outcome() {
        let prometheus = PrometheusClient::default();
        let started = chrono::Utc::now();

        prometheus.record(Operation::Mint, Outcome::Rejected, started);
        prometheus.record(Operation::Mint, Outcome::Success, started);
        prometheus.record(Operation::Mint, Outcome::Success, started);

        assert_eq!(prometheus.operation_count(Operation::Mint, Outcome::Success), 2);
        assert_eq!(prometheus.operation_count(Operation::Mint, Outcome::Rejected), 1);
        assert_eq!(prometheus.operation_count(Operation::FetchActivity, Outcome::Success), 0);
    }

    #[test]
    fn encodes_registered_metrics() {
        let prometheus = PrometheusClient::default();
        prometheus.add_backend_request();
        prometheus.record(Operation::FetchActivity, Outcome::Failure, chrono::Utc::now());

        let body = prometheus.encode().unwrap();
        assert!(body.contains("devscore_backend_requests_total 1"));
        assert!(body.contains("operation=\"FetchActivity\""));
        assert!(body.contains("outcome=\"Failure\""));
    }
}
