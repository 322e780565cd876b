use crate::encode::sink::{RenderSink, SinkConfig};
use crate::episode::index::EpisodeId;
use crate::foundation::core::FrameRange;
use crate::foundation::error::UmiResult;
use crate::session::config::{RenderSettings, VisConfig};
use crate::store::dataset::ZarrDataset;
use crate::stream::source::FrameSource;
use crate::stream::streamer::{FrameStreamer, StreamOutcome, StreamReport};

/// Process exit status for a completed run.
pub const EXIT_OK: u8 = 0;
/// Process exit status for configuration, store and IO errors.
pub const EXIT_ERROR: u8 = 1;
/// Process exit status for a run stopped by an invalid frame.
pub const EXIT_ABORTED: u8 = 2;

/// Result of visualizing one episode.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Episode that was streamed.
    pub episode: EpisodeId,
    /// Its global frame range.
    pub range: FrameRange,
    /// Streaming summary.
    pub stream: StreamReport,
}

impl RunReport {
    /// `true` when the run stopped on an invalid frame.
    pub fn is_aborted(&self) -> bool {
        self.stream.is_aborted()
    }

    /// Exit status for this outcome: [`EXIT_OK`] or [`EXIT_ABORTED`].
    pub fn exit_code(&self) -> u8 {
        if self.is_aborted() {
            EXIT_ABORTED
        } else {
            EXIT_OK
        }
    }
}

/// Open the configured dataset and stream its episode into `sink`.
///
/// The dataset is released before this returns, on success and on error.
#[tracing::instrument(
    skip_all,
    fields(dataset = %config.dataset_path().display(), episode = config.episode().one_based())
)]
pub fn run_visualizer(config: &VisConfig, sink: &mut dyn RenderSink) -> UmiResult<RunReport> {
    let mut dataset = ZarrDataset::open(config.dataset_path())?;
    tracing::info!(
        episodes = dataset.num_episodes(),
        frames = dataset.num_frames(),
        "Number of episodes: {}",
        dataset.num_episodes()
    );
    visualize_episode(&mut dataset, config.episode(), *config.settings(), sink)
}

/// Stream one episode of `source` into `sink`.
///
/// An unknown episode fails before `sink.begin`. The sink is ended after a completed or aborted
/// stream; store and sink errors are returned as they happen.
pub fn visualize_episode<S>(
    source: &mut S,
    episode: EpisodeId,
    settings: RenderSettings,
    sink: &mut dyn RenderSink,
) -> UmiResult<RunReport>
where
    S: FrameSource + ?Sized,
{
    let range = source.episode_boundaries().resolve(episode)?;
    tracing::info!(
        start = range.start.0,
        end = range.end.0,
        frames = range.len_frames(),
        "resolved episode range"
    );

    sink.begin(SinkConfig {
        settings,
        episode,
        range,
    })?;
    let mut streamer = FrameStreamer::new(range);
    let stream = streamer.run(source, |frame| sink.push_frame(frame))?;
    sink.end()?;

    match &stream.outcome {
        StreamOutcome::Completed => tracing::info!(
            delivered = stream.delivered,
            skipped = stream.skipped.len(),
            "episode complete"
        ),
        StreamOutcome::Aborted { index, .. } => tracing::warn!(
            delivered = stream.delivered,
            skipped = stream.skipped.len(),
            frame = index.0,
            "episode aborted"
        ),
    }

    Ok(RunReport {
        episode,
        range,
        stream,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/visualize.rs"]
mod tests;
