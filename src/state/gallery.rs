/// Gallery queries and card reconciliation
///
/// `list` turns the catalog into the ordered sequence the grid should show.
/// `CardSet` keeps the rendered cards for that sequence and only builds new
/// ones (i.e. renders new previews) for records it has not seen before.
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use super::data::ModelRecord;

/// Cards per grid row
pub const ROW_LEN: usize = 3;

/// Orderings offered by the "Sort by" picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    UploadDate,
    /// Case-insensitive, ascending
    Name,
    /// Ascending by the alphabetically sorted, comma-joined tag list
    Tags,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::UploadDate, SortKey::Name, SortKey::Tags];

    fn sort(self, models: &mut [ModelRecord]) {
        match self {
            SortKey::UploadDate => models.sort_by(|a, b| b.upload_date.cmp(&a.upload_date)),
            SortKey::Name => models.sort_by_cached_key(|m| m.name.to_lowercase()),
            SortKey::Tags => models.sort_by_cached_key(tag_sort_key),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::UploadDate => "Upload Date",
            SortKey::Name => "Name",
            SortKey::Tags => "Tags",
        })
    }
}

fn tag_sort_key(model: &ModelRecord) -> String {
    let mut tags = model.tags.clone();
    tags.sort();
    tags.join(",")
}

/// Case-insensitive substring match against the name, the comma-joined tags,
/// or the `YYYY-MM-DD` upload date. An empty filter matches everything.
pub fn matches_filter(model: &ModelRecord, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();

    model.name.to_lowercase().contains(&needle)
        || model.joined_tags(",").to_lowercase().contains(&needle)
        || model.upload_day().contains(&needle)
}

/// Filter then sort a snapshot of the catalog. The input is not modified.
pub fn list(models: &[ModelRecord], sort: SortKey, filter: &str) -> Vec<ModelRecord> {
    let mut visible: Vec<ModelRecord> = models
        .iter()
        .filter(|m| matches_filter(m, filter))
        .cloned()
        .collect();
    sort.sort(&mut visible);
    visible
}

/// A record together with whatever was built to display it
#[derive(Debug, Clone)]
pub struct Card<V> {
    pub model: ModelRecord,
    pub visual: V,
}

/// A card is the same visual entity only while both id and stored path match
type CardKey = (String, PathBuf);

fn card_key(model: &ModelRecord) -> CardKey {
    (model.id.clone(), model.file_path.clone())
}

/// What a reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub reused: usize,
    pub created: usize,
    pub discarded: usize,
}

/// The cards currently on screen, in display order
#[derive(Debug)]
pub struct CardSet<V> {
    cards: Vec<Card<V>>,
}

impl<V> Default for CardSet<V> {
    fn default() -> Self {
        Self { cards: Vec::new() }
    }
}

impl<V> CardSet<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rearrange the cards to match `models`.
    ///
    /// Existing cards are reused (their record snapshot is refreshed, their visual
    /// kept), cards for records no longer present are dropped, and `build` is
    /// called only for records without a matching card.
    pub fn reconcile<F>(&mut self, models: &[ModelRecord], mut build: F) -> ReconcileStats
    where
        F: FnMut(&ModelRecord) -> V,
    {
        let mut existing: HashMap<CardKey, Card<V>> = self
            .cards
            .drain(..)
            .map(|card| (card_key(&card.model), card))
            .collect();

        let mut stats = ReconcileStats::default();
        self.cards.reserve(models.len());

        for model in models {
            let card = match existing.remove(&card_key(model)) {
                Some(mut card) => {
                    stats.reused += 1;
                    card.model = model.clone();
                    card
                }
                None => {
                    stats.created += 1;
                    Card {
                        model: model.clone(),
                        visual: build(model),
                    }
                }
            };
            self.cards.push(card);
        }

        stats.discarded = existing.len();
        stats
    }

    /// Drop the card for `id`, if shown
    pub fn remove(&mut self, id: &str) {
        self.cards.retain(|card| card.model.id != id);
    }

    /// Refresh the record snapshot of a shown card (e.g. after a tag edit)
    pub fn update_model(&mut self, model: &ModelRecord) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.model.id == model.id) {
            card.model = model.clone();
        }
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[Card<V>] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards grouped into rows of `ROW_LEN`; only the last row can be short
    pub fn rows(&self) -> std::slice::Chunks<'_, Card<V>> {
        self.cards.chunks(ROW_LEN)
    }
}
