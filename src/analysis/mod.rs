pub mod metrics;

pub use metrics::{
    analyze, overshoot_percent, peak_value, rise_time, rmse, settling_time, AnalysisConfig,
    PerformanceMetrics,
};
