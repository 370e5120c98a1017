//! Plant enrichment
//!
//! Adds a description, an image and a recipe-search link to a plant name.
//! A failed lookup becomes a placeholder record; enrichment never fails.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::encyclopedia::{Article, KnowledgeBase};
use crate::models::EnrichedPlant;

/// Description used when the knowledge base has nothing for a plant
pub const NO_INFO: &str = "No info found";

const RECIPE_SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Search link for recipes with `name`: spaces become `+`, then `+recipe`.
#[must_use]
pub fn recipe_link(name: &str) -> String {
    format!("{RECIPE_SEARCH_URL}{}+recipe", name.replace(' ', "+"))
}

#[must_use]
pub fn placeholder(name: &str) -> EnrichedPlant {
    EnrichedPlant {
        name: name.to_string(),
        description: NO_INFO.to_string(),
        image_url: String::new(),
        recipe_link: String::new(),
    }
}

#[derive(Clone)]
pub struct PlantEnricher {
    knowledge_base: Arc<dyn KnowledgeBase>,
}

impl PlantEnricher {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self { knowledge_base }
    }

    /// Enrich one plant by common name.
    pub async fn enrich(&self, common_name: &str) -> EnrichedPlant {
        match self.knowledge_base.lookup(common_name).await {
            Ok(Article {
                summary, image_url, ..
            }) => {
                debug!("Enriched {}", common_name);
                EnrichedPlant {
                    name: common_name.to_string(),
                    description: summary,
                    image_url: image_url.unwrap_or_default(),
                    recipe_link: recipe_link(common_name),
                }
            }
            Err(e) => {
                warn!(plant = common_name, error = %e, "lookup failed, using placeholder");
                placeholder(common_name)
            }
        }
    }

    /// Enrich plants one at a time, keeping input order.
    pub async fn enrich_all(&self, names: &[String]) -> Vec<EnrichedPlant> {
        let mut enriched = Vec::with_capacity(names.len());
        for name in names {
            enriched.push(self.enrich(name).await);
        }
        enriched
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::encyclopedia::LookupError;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::collections::HashMap;

    /// Knowledge base answering from a fixed table; unknown titles are not found
    #[derive(Default)]
    pub(crate) struct FixedKnowledgeBase {
        pub(crate) articles: HashMap<String, Article>,
        pub(crate) unreachable: bool,
    }

    impl FixedKnowledgeBase {
        pub(crate) fn with(titles: &[&str]) -> Self {
            let articles = titles
                .iter()
                .map(|t| {
                    (
                        t.to_string(),
                        Article {
                            title: t.to_string(),
                            summary: format!("{t} is an edible plant. It grows wild."),
                            image_url: Some(format!(
                                "https://upload.wikimedia.org/{}.jpg",
                                t.replace(' ', "_")
                            )),
                        },
                    )
                })
                .collect();
            Self {
                articles,
                unreachable: false,
            }
        }
    }

    #[async_trait]
    impl KnowledgeBase for FixedKnowledgeBase {
        async fn lookup(&self, title: &str) -> Result<Article, LookupError> {
            if self.unreachable {
                return Err(LookupError::Transport("connection refused".to_string()));
            }
            self.articles
                .get(title)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(title.to_string()))
        }
    }

    #[rstest]
    #[case("Taro", "https://www.google.com/search?q=Taro+recipe")]
    #[case("Wild Leek", "https://www.google.com/search?q=Wild+Leek+recipe")]
    #[case(
        "Malabar Spinach Leaf Tips",
        "https://www.google.com/search?q=Malabar+Spinach+Leaf+Tips+recipe"
    )]
    fn test_recipe_link(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(recipe_link(name), expected);
    }

    #[tokio::test]
    async fn test_enrich_found() {
        let enricher = PlantEnricher::new(Arc::new(FixedKnowledgeBase::with(&["Stinging Nettle"])));
        let plant = enricher.enrich("Stinging Nettle").await;
        assert_eq!(plant.name, "Stinging Nettle");
        assert!(plant.description.starts_with("Stinging Nettle is"));
        assert_eq!(
            plant.image_url,
            "https://upload.wikimedia.org/Stinging_Nettle.jpg"
        );
        assert_eq!(
            plant.recipe_link,
            "https://www.google.com/search?q=Stinging+Nettle+recipe"
        );
    }

    #[tokio::test]
    async fn test_enrich_article_without_image() {
        let mut kb = FixedKnowledgeBase::with(&["Taro"]);
        if let Some(article) = kb.articles.get_mut("Taro") {
            article.image_url = None;
        }
        let plant = PlantEnricher::new(Arc::new(kb)).enrich("Taro").await;
        assert_eq!(plant.image_url, "");
        assert!(!plant.recipe_link.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_becomes_placeholder() {
        let enricher = PlantEnricher::new(Arc::new(FixedKnowledgeBase::default()));
        let plant = enricher.enrich("Qwxzy Plant").await;
        assert_eq!(plant, placeholder("Qwxzy Plant"));
        assert_eq!(plant.description, NO_INFO);
        assert_eq!(plant.recipe_link, "");
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_placeholder() {
        let kb = FixedKnowledgeBase {
            unreachable: true,
            ..FixedKnowledgeBase::with(&["Taro"])
        };
        let plant = PlantEnricher::new(Arc::new(kb)).enrich("Taro").await;
        assert_eq!(plant.description, NO_INFO);
    }

    #[tokio::test]
    async fn test_enrich_all_keeps_order_and_isolates_failures() {
        let enricher = PlantEnricher::new(Arc::new(FixedKnowledgeBase::with(&["Taro", "Cassava"])));
        let names = ["Taro", "Unknown Weed", "Cassava"].map(String::from);
        let plants = enricher.enrich_all(&names).await;
        let names: Vec<_> = plants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Taro", "Unknown Weed", "Cassava"]);
        assert_ne!(plants[0].description, NO_INFO);
        assert_eq!(plants[1].description, NO_INFO);
        assert_ne!(plants[2].description, NO_INFO);
    }
}
