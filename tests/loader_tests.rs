//! Segment loading against an in-memory catalog source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tui_dispatch::EffectStore;

use dexgrid::action::Action;
use dexgrid::catalog::{CatalogSegment, CreatureDetail, CreatureSummary};
use dexgrid::effect::Effect;
use dexgrid::error::LoadError;
use dexgrid::loader::{load_segment, CatalogSource};
use dexgrid::reducer::reducer;
use dexgrid::state::AppState;

struct FakeSource {
    listing: Vec<CreatureSummary>,
    details: HashMap<String, CreatureDetail>,
    /// Per-url delay; later entries finish first when delays decrease.
    delays: HashMap<String, Duration>,
    failing: Option<String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeSource {
    fn new(entries: &[(u16, &str)]) -> Self {
        let mut listing = Vec::new();
        let mut details = HashMap::new();
        let mut delays = HashMap::new();
        let count = entries.len() as u64;
        for (position, (id, name)) in entries.iter().enumerate() {
            let url = format!("https://api.test/pokemon/{id}/");
            listing.push(CreatureSummary {
                name: name.to_string(),
                url: url.clone(),
            });
            details.insert(url.clone(), detail(*id, name));
            delays.insert(url, Duration::from_millis((count - position as u64) * 10));
        }
        Self {
            listing,
            details,
            delays,
            failing: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn failing_on(mut self, id: u16) -> Self {
        self.failing = Some(format!("https://api.test/pokemon/{id}/"));
        self
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn list_segment(
        &self,
        segment: &CatalogSegment,
    ) -> Result<Vec<CreatureSummary>, LoadError> {
        Ok(self
            .listing
            .iter()
            .skip(segment.offset as usize)
            .take(segment.count as usize)
            .cloned()
            .collect())
    }

    async fn fetch_detail(&self, summary: &CreatureSummary) -> Result<CreatureDetail, LoadError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&summary.url) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.as_deref() == Some(summary.url.as_str()) {
            return Err(LoadError::network(&summary.url, "connection reset"));
        }
        self.details
            .get(&summary.url)
            .cloned()
            .ok_or_else(|| LoadError::malformed(&summary.url, "unknown creature"))
    }
}

fn detail(id: u16, name: &str) -> CreatureDetail {
    CreatureDetail {
        id,
        name: name.to_string(),
        sprite_url: Some(format!("https://img.test/{id}.png")),
        artwork_url: Some(format!("https://img.test/art/{id}.png")),
        types: vec!["fire".to_string()],
        abilities: vec!["blaze".to_string()],
        stats: Vec::new(),
    }
}

fn window(offset: u32, count: u32) -> CatalogSegment {
    CatalogSegment {
        label: "Test",
        offset,
        count,
    }
}

#[tokio::test]
async fn details_keep_listing_order_despite_completion_order() {
    let source = Arc::new(FakeSource::new(&[
        (1, "bulbasaur"),
        (2, "ivysaur"),
        (3, "venusaur"),
        (4, "charmander"),
        (5, "charmeleon"),
    ]));

    let batch = load_segment(source, &window(0, 5), 8)
        .await
        .expect("segment loads");

    let ids: Vec<u16> = batch.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn concurrency_limit_is_respected() {
    let entries: Vec<(u16, String)> = (1..=12).map(|id| (id, format!("mon{id}"))).collect();
    let borrowed: Vec<(u16, &str)> = entries.iter().map(|(id, n)| (*id, n.as_str())).collect();
    let source = Arc::new(FakeSource::new(&borrowed));

    let batch = load_segment(source.clone(), &window(0, 12), 3)
        .await
        .expect("segment loads");

    assert_eq!(batch.len(), 12);
    assert!(source.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn any_detail_failure_fails_the_segment() {
    let source = Arc::new(
        FakeSource::new(&[(1, "bulbasaur"), (2, "ivysaur"), (3, "venusaur")]).failing_on(2),
    );

    let result = load_segment(source, &window(0, 3), 8).await;

    assert!(matches!(result, Err(LoadError::Network { .. })));
}

#[tokio::test]
async fn empty_listing_yields_empty_batch() {
    let source = Arc::new(FakeSource::new(&[(1, "bulbasaur")]));
    let batch = load_segment(source, &window(5, 3), 8)
        .await
        .expect("segment loads");
    assert!(batch.is_empty());
}

#[tokio::test]
async fn two_reference_segment_lands_in_catalog_and_grid() {
    let source = Arc::new(FakeSource::new(&[(1, "bulbasaur"), (4, "charmander")]));
    let batch = load_segment(source, &window(0, 2), 8)
        .await
        .expect("segment loads");

    let mut store = EffectStore::new(AppState::default(), reducer);
    let result = store.dispatch(Action::Init);
    assert_eq!(result.effects, vec![Effect::LoadSegment { index: 0 }]);
    store.dispatch(Action::SegmentDidLoad { index: 0, batch });

    let state = store.state();
    let ids: Vec<u16> = state.catalog.entries().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 4]);
    let labels: Vec<&str> = state.cards.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["#001", "#004"]);
    assert_eq!(
        state.cards[0].image_url.as_deref(),
        Some("https://img.test/art/1.png")
    );
}
