//! The incremental publisher run, end to end.

use tracing::info;

use crate::aggregate::IncrementalAggregator;
use crate::config::JobConfig;
use crate::error::Result;
use crate::partition::PartitionKey;
use crate::publish::Publisher;
use crate::scan::PartitionScanner;
use crate::session::{EngineSession, SOURCE_TABLE};
use crate::watermark::WatermarkStore;

/// Terminal states of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing newer than the watermark; neither output nor state was
    /// touched.
    NoNewPartitions { watermark: PartitionKey },
    /// The delta window was published and the watermark advanced.
    Published { through: PartitionKey, groups: u64 },
}

/// Run the incremental partition publisher once.
///
/// One run either publishes its whole increment and advances the
/// watermark, or leaves both exactly as it found them. The publish and
/// the watermark advance are the run's only externally visible mutations,
/// and the advance only happens after the publish completes.
pub async fn run(config: &JobConfig) -> Result<Outcome> {
    let store = WatermarkStore::new(&config.watermark_path);
    let watermark = store.load()?;
    info!(%watermark, "Loaded watermark");

    let session = EngineSession::new();
    session.register_source(SOURCE_TABLE, &config.source_glob).await?;

    let scanner = PartitionScanner::new(&session, SOURCE_TABLE);
    let Some(newest) = scanner.max_available_key().await? else {
        info!("Source holds no partitions");
        return Ok(Outcome::NoNewPartitions { watermark });
    };
    if newest <= watermark {
        info!(%newest, %watermark, "No partitions beyond the watermark");
        return Ok(Outcome::NoNewPartitions { watermark });
    }

    let aggregator = IncrementalAggregator::new(&session, SOURCE_TABLE);
    let result = aggregator.aggregate_since(watermark).await?;
    result.validate(watermark)?;

    let publisher = Publisher::new(&config.output_path, config.codec);
    let groups = publisher.publish(result.batches())?;

    // Publish succeeded; advancing the watermark completes the unit.
    store.save(newest)?;

    info!(through = %newest, groups, "Incremental publish complete");
    Ok(Outcome::Published { through: newest, groups })
}
