use crate::core::Pipeline;
use crate::domain::model::{ProcessingStage, StageReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub fields_filled: usize,
    pub stages: Vec<StageReport>,
    pub total_time: Duration,
    pub finished_at: DateTime<Utc>,
}

/// Drives a pipeline through its stages with per-stage timing and optional
/// process monitoring. A stage error stops the run.
pub struct FillEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FillEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitoring_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitoring_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let run_started = Instant::now();
        let mut stages = Vec::new();

        tracing::info!("Starting form fill pipeline");

        tracing::info!("📥 Stage 1: extracting from source documents");
        let stage_started = Instant::now();
        let outcomes = self.pipeline.extract().await?;
        let extracted_fields: usize = outcomes.iter().map(|o| o.values.len()).sum();
        tracing::info!(
            "📥 Extracted {} fields across {} documents",
            extracted_fields,
            outcomes.len()
        );
        stages.push(StageReport {
            stage: ProcessingStage::Extraction,
            field_count: extracted_fields,
            elapsed: stage_started.elapsed(),
        });
        self.monitor.log_stats("extraction");

        tracing::info!("🔄 Stage 2: merging, mapping and validating");
        let stage_started = Instant::now();
        let payload = self.pipeline.transform(outcomes).await?;
        tracing::info!("🔄 Prepared {} form fields", payload.fields.len());
        stages.push(StageReport {
            stage: ProcessingStage::Transform,
            field_count: payload.fields.len(),
            elapsed: stage_started.elapsed(),
        });
        self.monitor.log_stats("transform");

        tracing::info!("💾 Stage 3: writing the filled form");
        let stage_started = Instant::now();
        let fields_filled = payload.fields.len();
        let output_path = self.pipeline.load(payload).await?;
        stages.push(StageReport {
            stage: ProcessingStage::FormFilling,
            field_count: fields_filled,
            elapsed: stage_started.elapsed(),
        });
        self.monitor.log_final_stats();

        tracing::info!("✅ Filled form saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            fields_filled,
            stages,
            total_time: run_started.elapsed(),
            finished_at: Utc::now(),
        })
    }
}
