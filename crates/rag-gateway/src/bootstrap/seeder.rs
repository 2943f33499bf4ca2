//! Startup seeding of the pipeline corpus

use std::sync::Arc;
use std::time::Instant;

use crate::providers::Pipeline;
use crate::types::SourceRef;

/// A source the pipeline refused during seeding
#[derive(Debug, Clone)]
pub struct SeedFailure {
    pub source: String,
    pub error: String,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    /// Sources the pipeline accepted, in order
    pub added: Vec<String>,
    /// Sources that failed, in order
    pub failed: Vec<SeedFailure>,
    pub elapsed_ms: u64,
}

impl SeedReport {
    /// Number of `add` calls made
    pub fn attempted(&self) -> usize {
        self.added.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Pushes a fixed list of sources into the pipeline.
///
/// Calls are independent: a failed `add` is logged and the next source is
/// still attempted. Nothing is rolled back.
pub struct Seeder {
    pipeline: Arc<dyn Pipeline>,
    sources: Vec<SourceRef>,
}

impl Seeder {
    pub fn new(pipeline: Arc<dyn Pipeline>, sources: Vec<SourceRef>) -> Self {
        Self { pipeline, sources }
    }

    /// Add every source once, in declared order
    pub async fn run(&self) -> SeedReport {
        let start = Instant::now();
        let mut report = SeedReport::default();

        tracing::info!("Seeding pipeline with {} sources", self.sources.len());

        for (i, source) in self.sources.iter().enumerate() {
            match self.pipeline.add(source).await {
                Ok(()) => {
                    tracing::info!("[{}/{}] Added {}", i + 1, self.sources.len(), source);
                    report.added.push(source.source.clone());
                }
                Err(e) => {
                    tracing::warn!("[{}/{}] Failed to add {}: {}", i + 1, self.sources.len(), source, e);
                    report.failed.push(SeedFailure {
                        source: source.source.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;

        if report.is_complete() {
            tracing::info!(
                "Seeding complete: {} sources in {}ms",
                report.added.len(),
                report.elapsed_ms
            );
        } else {
            tracing::warn!(
                "Seeding finished with errors: {} added, {} failed in {}ms",
                report.added.len(),
                report.failed.len(),
                report.elapsed_ms
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::MockPipeline;
    use crate::types::DataType;
    use mockall::Sequence;

    fn sources() -> Vec<SourceRef> {
        vec![
            SourceRef::typed("https://example.com", DataType::WebPage),
            SourceRef::typed("https://example.com/sitemap.xml", DataType::Sitemap),
            SourceRef::new("https://example.com/list.pdf"),
        ]
    }

    #[tokio::test]
    async fn test_adds_each_source_in_order() {
        let mut mock = MockPipeline::new();
        let mut seq = Sequence::new();

        for expected in sources() {
            mock.expect_add()
                .withf(move |s| *s == expected)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let report = Seeder::new(Arc::new(mock), sources()).run().await;
        assert!(report.is_complete());
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.added[2], "https://example.com/list.pdf");
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_sources() {
        let mut mock = MockPipeline::new();
        let mut seq = Sequence::new();

        mock.expect_add()
            .withf(|s| s.source == "https://example.com")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::pipeline("quota exceeded")));
        mock.expect_add()
            .withf(|s| s.source == "https://example.com/sitemap.xml")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_add()
            .withf(|s| s.source == "https://example.com/list.pdf")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::pipeline("unreadable pdf")));

        let report = Seeder::new(Arc::new(mock), sources()).run().await;
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.added, vec!["https://example.com/sitemap.xml".to_string()]);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[0].error.contains("quota exceeded"));
        assert_eq!(report.failed[1].source, "https://example.com/list.pdf");
    }

    #[tokio::test]
    async fn test_empty_source_list() {
        let mock = MockPipeline::new();
        let report = Seeder::new(Arc::new(mock), Vec::new()).run().await;
        assert_eq!(report.attempted(), 0);
        assert!(report.is_complete());
    }
}
