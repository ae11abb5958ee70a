//! Render orchestration: options in, encoded poster out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::loader::{AssetLoader, LoadedAssets};
use crate::assets::source::BlobStore;
use crate::assets::{STANDARD_MARK_SVG, STANDARD_MARK_URI, WHITE_MARK_SVG, WHITE_MARK_URI};
use crate::carousel::CarouselPlan;
use crate::config::{Clock, EngineConfig, SystemClock};
use crate::encode::jpeg::{EncodedPoster, encode_frame};
use crate::foundation::error::PosterResult;
use crate::layout::aspect::{AspectRatio, CanvasDimensions};
use crate::layout::cover::CoverFit;
use crate::layout::wrap::wrap_title;
use crate::render::gradient::draw_bottom_scrim;
use crate::render::surface::Surface;
use crate::render::templates::{Metrics, Palette, TemplateId, TemplateInput, draw_template};
use crate::text::typesetter::{FixedAdvanceTypesetter, TypesetterSource};

/// One render request.
///
/// Built fresh by the caller for every call; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Remote URL, `data:` URI, in-memory URI or file path of the photograph.
    #[serde(alias = "imageUrl")]
    pub image_source: String,
    /// Headline.
    pub title: String,
    /// Category label; empty renders an empty badge.
    #[serde(default)]
    pub category: String,
    /// Output aspect ratio.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Layout template; `None` uses the engine's resolved default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
    /// Non-hero carousel card.
    #[serde(default)]
    pub is_follow_up: bool,
}

impl RenderOptions {
    /// Hero-card options with the default aspect ratio and template.
    pub fn new(
        image_source: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            image_source: image_source.into(),
            title: title.into(),
            category: category.into(),
            aspect_ratio: AspectRatio::default(),
            template: None,
            is_follow_up: false,
        }
    }

    /// Set the aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set the template.
    pub fn with_template(mut self, template: TemplateId) -> Self {
        self.template = Some(template);
        self
    }

    /// Mark as a follow-up card.
    pub fn follow_up(mut self, is_follow_up: bool) -> Self {
        self.is_follow_up = is_follow_up;
        self
    }
}

/// Builder for [`PosterEngine`].
pub struct PosterEngineBuilder {
    config: EngineConfig,
    blobs: BlobStore,
    client: Option<reqwest::Client>,
    typesetters: Option<Arc<dyn TypesetterSource>>,
    clock: Arc<dyn Clock>,
    default_template: Option<TemplateId>,
}

impl PosterEngineBuilder {
    /// Engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry backing `blob:`/`mem:` sources; the built-in marks are added to it.
    pub fn blobs(mut self, blobs: BlobStore) -> Self {
        self.blobs = blobs;
        self
    }

    /// HTTP client for remote sources.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Text shaping backend. Defaults to the configured fonts.
    pub fn typesetter_source(mut self, source: Arc<dyn TypesetterSource>) -> Self {
        self.typesetters = Some(source);
        self
    }

    /// Date source for captions.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Template for renders that name none, typically from
    /// [`crate::resolve_template`]. Defaults to the config's `default_template`.
    pub fn default_template(mut self, template: TemplateId) -> Self {
        self.default_template = Some(template);
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> PosterResult<PosterEngine> {
        self.config.validate()?;
        let palette = self.config.palette()?;

        self.blobs
            .insert_named(STANDARD_MARK_URI, STANDARD_MARK_SVG.to_vec())?;
        self.blobs
            .insert_named(WHITE_MARK_URI, WHITE_MARK_SVG.to_vec())?;
        let loader = match self.client {
            Some(client) => AssetLoader::with_client(client, self.blobs),
            None => AssetLoader::new(self.blobs)?,
        };

        let typesetters: Arc<dyn TypesetterSource> = match self.typesetters {
            Some(source) => source,
            None => match self.config.font_set()? {
                Some(fonts) => Arc::new(fonts),
                None => {
                    tracing::warn!("no font files configured; text renders as fixed-advance blocks");
                    Arc::new(FixedAdvanceTypesetter::default())
                }
            },
        };
        let default_template = self
            .default_template
            .unwrap_or(self.config.default_template);

        Ok(PosterEngine {
            loader,
            typesetters,
            clock: self.clock,
            palette,
            default_template,
            config: self.config,
        })
    }
}

/// Renders branded posters.
///
/// The engine holds only configuration; every render owns its surface and its decoded assets.
pub struct PosterEngine {
    loader: AssetLoader,
    typesetters: Arc<dyn TypesetterSource>,
    clock: Arc<dyn Clock>,
    palette: Palette,
    default_template: TemplateId,
    config: EngineConfig,
}

impl PosterEngine {
    /// Start building an engine with default configuration.
    pub fn builder() -> PosterEngineBuilder {
        PosterEngineBuilder {
            config: EngineConfig::default(),
            blobs: BlobStore::new(),
            client: None,
            typesetters: None,
            clock: Arc::new(SystemClock),
            default_template: None,
        }
    }

    /// Engine with default configuration.
    pub fn new() -> PosterResult<Self> {
        Self::builder().build()
    }

    /// Registry backing `blob:` and `mem:` sources.
    pub fn blobs(&self) -> &BlobStore {
        self.loader.blobs()
    }

    /// Template used when options name none.
    pub fn default_template(&self) -> TemplateId {
        self.default_template
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render one poster.
    ///
    /// Loads the background and the brand mark concurrently, then draws and encodes in order.
    /// Any failure aborts the whole call.
    #[tracing::instrument(
        skip(self, options),
        fields(aspect = %options.aspect_ratio, follow_up = options.is_follow_up)
    )]
    pub async fn render(&self, options: &RenderOptions) -> PosterResult<EncodedPoster> {
        let template = options.template.unwrap_or(self.default_template);
        let dims = CanvasDimensions::for_aspect(options.aspect_ratio);
        tracing::debug!(%template, width = dims.width, height = dims.height, "dimensions resolved");

        let assets = self
            .loader
            .load_pair(&options.image_source, self.config.mark_source(template))
            .await?;
        let date = self.clock.today();
        self.compose(options, template, &assets, date)
    }

    /// Render every card of a carousel concurrently, returned in card order.
    #[tracing::instrument(skip(self, plan), fields(cards = plan.effective_card_count()))]
    pub async fn render_carousel(&self, plan: &CarouselPlan) -> PosterResult<Vec<EncodedPoster>> {
        let cards = plan.cards();
        futures::future::try_join_all(cards.iter().map(|card| self.render(card))).await
    }

    /// Draw and encode a poster from already-loaded assets.
    pub fn compose(
        &self,
        options: &RenderOptions,
        template: TemplateId,
        assets: &LoadedAssets,
        date: chrono::NaiveDate,
    ) -> PosterResult<EncodedPoster> {
        let dims = CanvasDimensions::for_aspect(options.aspect_ratio);
        let mut surface = Surface::new(dims)?;
        let mut typesetter = self.typesetters.typesetter()?;

        let (natural_w, natural_h) = assets.background.natural_size();
        let fit = CoverFit::compute(natural_w, natural_h, dims);
        let (background, dest) = assets.background.cover_pixels(&fit, dims)?;
        surface.draw_image(&background, dest)?;
        draw_bottom_scrim(&mut surface)?;

        let metrics = Metrics::for_dims(dims);
        let wrapped = wrap_title(
            &options.title,
            metrics.max_width,
            &metrics.headline_font(),
            options.aspect_ratio,
            &mut *typesetter,
        );

        let input = TemplateInput {
            aspect: options.aspect_ratio,
            mark: &assets.mark,
            lines: &wrapped.lines,
            category: &options.category,
            is_follow_up: options.is_follow_up,
            date,
            city: &self.config.brand.city,
            palette: self.palette,
        };
        draw_template(template, &mut surface, &mut *typesetter, &input)?;

        let frame = surface.finish();
        encode_frame(&frame, self.config.output, dims)
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
