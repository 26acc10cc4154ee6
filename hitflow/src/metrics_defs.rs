//! Metrics definitions for hitflow.

use shared::metrics_defs::{MetricDef, MetricType};

pub const HITS_NORMALIZED: MetricDef = MetricDef {
    name: "hits.normalized",
    metric_type: MetricType::Counter,
    description: "Number of hits normalized and written",
};

pub const HITS_FAILED: MetricDef = MetricDef {
    name: "hits.failed",
    metric_type: MetricType::Counter,
    description: "Number of hits rejected by the normalizer. Tagged with reason.",
};

pub const HITS_MALFORMED: MetricDef = MetricDef {
    name: "hits.malformed",
    metric_type: MetricType::Counter,
    description: "Number of input lines that could not be decoded into a hit",
};

pub const NORMALIZE_DURATION: MetricDef = MetricDef {
    name: "hits.normalize.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent normalizing a single hit in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[
    HITS_NORMALIZED,
    HITS_FAILED,
    HITS_MALFORMED,
    NORMALIZE_DURATION,
];
