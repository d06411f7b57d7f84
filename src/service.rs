//! Request-level orchestration shared by the HTTP server and the CLI.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::extract::{
    resolve_reference, Extractor, MetadataChain, MetadataSource, OEmbedSource, Searcher,
    VideoReference, YtDlp,
};
use crate::http_client::HttpClient;
use crate::media::{
    aggregate, probe_all, HeadProber, MediaKind, MediaMetadata, QualityTable, ResolutionResult,
    ResolvedVariant, SizeProber, VariantResolver,
};

/// Tunables for one [`ResolutionService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub qualities: QualityTable,
    pub concurrency_limit: usize,
    /// Bound on each extraction, and on search and metadata lookups.
    pub resolve_timeout: Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            qualities: QualityTable::default(),
            concurrency_limit: config.concurrency_limit,
            resolve_timeout: config.resolve_timeout(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Resolves references into metadata plus every available variant.
pub struct ResolutionService {
    searcher: Arc<dyn Searcher>,
    metadata: MetadataChain,
    resolver: VariantResolver,
    settings: ServiceSettings,
}

impl ResolutionService {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        searcher: Arc<dyn Searcher>,
        metadata: MetadataChain,
        prober: Arc<dyn SizeProber>,
        settings: ServiceSettings,
    ) -> Self {
        let resolver = VariantResolver::new(extractor, prober, settings.resolve_timeout);
        Self {
            searcher,
            metadata,
            resolver,
            settings,
        }
    }

    /// Production wiring: `yt-dlp` for everything, oEmbed as metadata fallback.
    pub fn from_config(config: &Config, client: HttpClient) -> Self {
        let ytdlp = Arc::new(YtDlp::new(config.ytdlp.clone()));
        let metadata = MetadataChain::new(vec![
            ytdlp.clone() as Arc<dyn MetadataSource>,
            Arc::new(OEmbedSource::new(client.clone())),
        ]);
        let prober = Arc::new(HeadProber::new(client, config.probe_timeout()));
        Self::new(
            ytdlp.clone(),
            ytdlp,
            metadata,
            prober,
            ServiceSettings::from_config(config),
        )
    }

    pub fn qualities(&self) -> &QualityTable {
        &self.settings.qualities
    }

    /// Metadata and every available variant of both kinds.
    ///
    /// Metadata is fetched concurrently with probing. The video batch
    /// finishes before the audio batch starts, so no more than
    /// `concurrency_limit` extractions run at once.
    ///
    /// # Errors
    ///
    /// Blank input, a search miss, or a failed search. Missing variants
    /// and missing metadata are not errors.
    #[instrument(skip(self))]
    pub async fn resolve(&self, input: &str) -> Result<ResolutionResult> {
        let reference = self.reference(input).await?;

        let probes = async {
            let video = self.probe_kind(&reference, MediaKind::Video).await;
            let audio = self.probe_kind(&reference, MediaKind::Audio).await;
            (video, audio)
        };
        let (metadata, (video, audio)) = tokio::join!(self.metadata(&reference), probes);

        let result = aggregate(metadata, video, audio);
        info!(
            reference = %reference,
            video = result.downloads.video.len(),
            audio = result.downloads.audio.len(),
            "resolved"
        );
        Ok(result)
    }

    /// One variant. `level` defaults to the kind's default level.
    ///
    /// # Errors
    ///
    /// [`ResolveError::InvalidInput`] for blank input or a level outside
    /// the kind's table (checked before any upstream call), and
    /// [`ResolveError::Unavailable`] when the variant cannot be produced.
    #[instrument(skip(self))]
    pub async fn fetch_variant(
        &self,
        input: &str,
        kind: MediaKind,
        level: Option<u32>,
    ) -> Result<ResolvedVariant> {
        let level = level.unwrap_or_else(|| kind.default_level());
        if !self.settings.qualities.contains(kind, level) {
            let allowed: Vec<String> = self
                .settings
                .qualities
                .levels(kind)
                .iter()
                .map(u32::to_string)
                .collect();
            return Err(ResolveError::invalid(format!(
                "Invalid quality '{level}' for {kind}. Use one of: {}",
                allowed.join(", ")
            )));
        }

        let reference = self.reference(input).await?;
        self.resolver
            .resolve(&reference, kind, level)
            .await
            .into_resolved()
            .ok_or(ResolveError::Unavailable("Could not generate download URL"))
    }

    async fn reference(&self, input: &str) -> Result<VideoReference> {
        tokio::time::timeout(
            self.settings.resolve_timeout,
            resolve_reference(input, self.searcher.as_ref()),
        )
        .await
        .map_err(|_| ResolveError::Unavailable("Search timed out"))?
    }

    async fn probe_kind(
        &self,
        reference: &VideoReference,
        kind: MediaKind,
    ) -> Vec<crate::media::VariantProbeOutcome> {
        probe_all(
            &self.resolver,
            reference,
            kind,
            self.settings.qualities.levels(kind),
            self.settings.concurrency_limit,
        )
        .await
    }

    async fn metadata(&self, reference: &VideoReference) -> MediaMetadata {
        let raw = tokio::time::timeout(self.settings.resolve_timeout, self.metadata.fetch(reference))
            .await
            .ok()
            .flatten();
        match raw {
            Some(raw) => MediaMetadata::from_raw(&raw, reference.video_id()),
            None => {
                warn!(reference = %reference, "metadata unavailable, using fallback");
                MediaMetadata::fallback(reference.video_id())
            }
        }
    }
}
