//! Multi-card sequences: one hero card followed by plain follow-up cards.

use serde::{Deserialize, Serialize};

use crate::engine::RenderOptions;
use crate::layout::aspect::AspectRatio;
use crate::render::templates::TemplateId;

/// Most cards a carousel may hold.
pub const MAX_CARDS: usize = 10;

/// Inputs for a carousel; expands to one [`RenderOptions`] per card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselPlan {
    /// Background shared by every card.
    #[serde(alias = "imageUrl")]
    pub image_source: String,
    /// Hero headline.
    pub title: String,
    /// Hero category label.
    #[serde(default)]
    pub category: String,
    /// Captions for follow-up cards, in order.
    #[serde(default)]
    pub descriptions: Vec<String>,
    /// Requested number of cards; clamped to `1..=10`.
    #[serde(default = "default_card_count")]
    pub card_count: usize,
    /// Aspect ratio shared by every card.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Template shared by every card; `None` uses the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
}

fn default_card_count() -> usize {
    1
}

impl CarouselPlan {
    /// Number of cards after clamping.
    pub fn effective_card_count(&self) -> usize {
        self.card_count.clamp(1, MAX_CARDS)
    }

    /// One render request per card, hero first.
    ///
    /// Follow-up card `i` is captioned with `descriptions[i - 1]`, or the hero title when that
    /// description is missing or blank.
    pub fn cards(&self) -> Vec<RenderOptions> {
        let count = self.effective_card_count();
        if count != self.card_count {
            tracing::debug!(requested = self.card_count, count, "card count clamped");
        }
        (0..count)
            .map(|i| {
                if i == 0 {
                    return RenderOptions {
                        image_source: self.image_source.clone(),
                        title: self.title.clone(),
                        category: self.category.clone(),
                        aspect_ratio: self.aspect_ratio,
                        template: self.template,
                        is_follow_up: false,
                    };
                }
                let title = self
                    .descriptions
                    .get(i - 1)
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or(&self.title)
                    .clone();
                RenderOptions {
                    image_source: self.image_source.clone(),
                    title,
                    category: String::new(),
                    aspect_ratio: self.aspect_ratio,
                    template: self.template,
                    is_follow_up: true,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/carousel.rs"]
mod tests;
