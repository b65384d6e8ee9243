//! Per-frame label storage.
//!
//! The store holds one [`FrameLabel`] per image position, index aligned with
//! the image sequence. Writes past the end backfill every missing position
//! with an empty placeholder so the set never has holes.

use std::collections::HashMap;

use crate::constants::MAX_POINTS;
use crate::format::{FormatError, label_file};
use crate::model::{FrameId, FrameIdMode, FrameLabel, Point};

/// Outcome of reconciling an imported label file against the image sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Image positions filled from the loaded file.
    pub placed: usize,
    /// Image positions filled with an empty placeholder.
    pub placeholders: usize,
    /// Loaded entries with no matching image, dropped.
    pub dropped: Vec<FrameId>,
    /// Filenames that appeared more than once (the later entry won).
    pub duplicates: Vec<String>,
}

impl ReconcileReport {
    /// Check if anything was dropped or overwritten.
    pub fn has_warnings(&self) -> bool {
        !self.dropped.is_empty() || !self.duplicates.is_empty()
    }
}

/// Ordered collection of per-frame labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelStore {
    labels: Vec<FrameLabel>,
    /// Set on every mutation, cleared by the owner after persisting.
    dirty: bool,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from already aligned labels.
    pub fn from_labels(labels: Vec<FrameLabel>) -> Self {
        Self {
            labels,
            dirty: false,
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after persisting.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Number of stored entries (including placeholders).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All entries in position order.
    pub fn labels(&self) -> &[FrameLabel] {
        &self.labels
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        if !self.labels.is_empty() {
            self.dirty = true;
        }
        self.labels.clear();
    }

    /// Get the entry at `index`, if one has been stored.
    pub fn get(&self, index: usize) -> Option<&FrameLabel> {
        self.labels.get(index)
    }

    /// Points stored at `index`; empty when nothing is stored there yet.
    pub fn points(&self, index: usize) -> &[Point] {
        self.labels
            .get(index)
            .map(|label| label.points.as_slice())
            .unwrap_or(&[])
    }

    /// Store `points` for the frame at `index`.
    ///
    /// The entry is stamped with an id from `mode` (the filename at `index`
    /// in `images`, or the index itself). Positions between the current end
    /// and `index` are backfilled with empty placeholders.
    pub fn set(&mut self, index: usize, mut points: Vec<Point>, mode: FrameIdMode, images: &[String]) {
        if points.len() > MAX_POINTS {
            log::warn!(
                "Frame {} got {} points, keeping the first {}",
                index,
                points.len(),
                MAX_POINTS
            );
            points.truncate(MAX_POINTS);
        }

        let label = FrameLabel::new(mode.frame_id(index, images), points);

        if index < self.labels.len() {
            self.labels[index] = label;
        } else {
            let backfill = index - self.labels.len();
            if backfill > 0 {
                log::debug!(
                    "Backfilling {} empty entries before frame {}",
                    backfill,
                    index
                );
            }
            while self.labels.len() < index {
                let j = self.labels.len();
                self.labels.push(FrameLabel::empty(mode.frame_id(j, images)));
            }
            self.labels.push(label);
        }

        self.dirty = true;
    }

    /// Points to start a newly visited frame with.
    ///
    /// Returns a copy of the previous frame's points when `carry_previous`
    /// is enabled, the frame at `index` has never been stored, and the
    /// previous frame holds a non-empty label. Otherwise returns nothing.
    pub fn carry_forward(&self, index: usize, carry_previous: bool) -> Vec<Point> {
        if !carry_previous || index == 0 || index < self.labels.len() {
            return Vec::new();
        }

        match self.labels.get(index - 1) {
            Some(prev) if !prev.is_empty() => {
                log::debug!(
                    "Carrying {} points forward from frame {} to {}",
                    prev.points.len(),
                    index - 1,
                    index
                );
                prev.points.clone()
            }
            _ => Vec::new(),
        }
    }

    /// Replace the contents with `loaded`, aligned to `images`.
    ///
    /// In filename mode each loaded entry is placed at the position of the
    /// image it names; entries naming no image (or carrying an integer id)
    /// are dropped with a warning, or abort the whole import when `strict`
    /// is set. Outside filename mode the loaded entries are taken as already
    /// aligned and padded or truncated to the number of images. Positions
    /// left without an entry get an empty placeholder stamped per `mode`.
    ///
    /// On error the store is left untouched.
    pub fn reconcile(
        &mut self,
        images: &[String],
        loaded: Vec<FrameLabel>,
        mode: FrameIdMode,
        strict: bool,
    ) -> Result<ReconcileReport, FormatError> {
        let mut report = ReconcileReport::default();

        let mut slots: Vec<Option<FrameLabel>> = if mode.is_filename() {
            let positions: HashMap<&str, usize> = images
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i))
                .collect();
            let mut slots: Vec<Option<FrameLabel>> = vec![None; images.len()];

            for entry in loaded {
                let position = entry
                    .frame_id
                    .as_filename()
                    .and_then(|name| positions.get(name).copied());

                match position {
                    Some(pos) => {
                        if slots[pos].is_some() {
                            log::warn!(
                                "Duplicate label for {}, keeping the later entry",
                                entry.frame_id
                            );
                            report.duplicates.push(entry.frame_id.to_string());
                        }
                        slots[pos] = Some(entry);
                    }
                    None if strict => {
                        return Err(FormatError::unmatched_frame(entry.frame_id.to_string()));
                    }
                    None => {
                        log::warn!("Image {} not found in folder, dropping its label", entry.frame_id);
                        report.dropped.push(entry.frame_id);
                    }
                }
            }
            slots
        } else {
            if loaded.len() != images.len() {
                log::info!(
                    "Loaded {} entries for {} images, aligning by position",
                    loaded.len(),
                    images.len()
                );
            }
            let mut slots: Vec<Option<FrameLabel>> =
                loaded.into_iter().take(images.len()).map(Some).collect();
            slots.resize(images.len(), None);
            slots
        };

        report.placed = slots.iter().filter(|slot| slot.is_some()).count();

        let labels: Vec<FrameLabel> = slots
            .iter_mut()
            .enumerate()
            .map(|(i, slot)| {
                slot.take()
                    .unwrap_or_else(|| FrameLabel::empty(mode.frame_id(i, images)))
            })
            .collect();
        report.placeholders = labels.len() - report.placed;

        log::info!(
            "Reconciled labels: {} placed, {} placeholders, {} dropped",
            report.placed,
            report.placeholders,
            report.dropped.len()
        );

        self.labels = labels;
        self.dirty = true;
        Ok(report)
    }

    // ========================================================================
    // Import/Export
    // ========================================================================

    /// Export all entries to the label file JSON form.
    pub fn to_json(&self) -> Result<String, FormatError> {
        label_file::to_json(&self.labels)
    }

    /// Parse label file JSON into a store, without any alignment.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        Ok(Self::from_labels(label_file::from_json(json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img_{:03}.png", i)).collect()
    }

    fn quad(offset: f64) -> Vec<Point> {
        vec![
            Point::new(offset, offset),
            Point::new(offset + 10.0, offset),
            Point::new(offset + 10.0, offset + 10.0),
            Point::new(offset, offset + 10.0),
        ]
    }

    fn filename(name: &str) -> FrameId {
        FrameId::Filename(name.to_string())
    }

    #[test]
    fn test_set_backfills_gaps() {
        let mut store = LabelStore::new();
        store.set(5, quad(1.0), FrameIdMode::Index, &images(10));

        assert_eq!(store.len(), 6);
        for i in 0..5 {
            let label = store.get(i).unwrap();
            assert_eq!(label.frame_id, FrameId::Index(i));
            assert!(label.is_empty());
        }
        assert_eq!(store.points(5), quad(1.0).as_slice());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_set_backfills_with_filenames() {
        let imgs = images(4);
        let mut store = LabelStore::new();
        store.set(2, quad(0.0), FrameIdMode::Filename, &imgs);

        let ids: Vec<_> = store.labels().iter().map(|l| l.frame_id.clone()).collect();
        assert_eq!(
            ids,
            vec![filename("img_000.png"), filename("img_001.png"), filename("img_002.png")]
        );
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut store = LabelStore::new();
        store.set(1, quad(0.0), FrameIdMode::Index, &images(3));
        store.set(0, quad(5.0), FrameIdMode::Index, &images(3));
        store.set(1, Vec::new(), FrameIdMode::Index, &images(3));

        assert_eq!(store.len(), 2);
        assert_eq!(store.points(0), quad(5.0).as_slice());
        assert!(store.points(1).is_empty());
    }

    #[test]
    fn test_set_truncates_extra_points() {
        let mut store = LabelStore::new();
        let mut pts = quad(0.0);
        pts.push(Point::new(99.0, 99.0));
        store.set(0, pts, FrameIdMode::Index, &images(1));
        assert_eq!(store.points(0).len(), MAX_POINTS);
    }

    #[test]
    fn test_get_missing_is_empty() {
        let store = LabelStore::new();
        assert!(store.get(3).is_none());
        assert!(store.points(3).is_empty());
    }

    #[test]
    fn test_carry_forward_copies_previous() {
        let mut store = LabelStore::new();
        store.set(0, quad(2.0), FrameIdMode::Index, &images(3));

        assert_eq!(store.carry_forward(1, true), quad(2.0));
        // Disabled, first frame, or already stored: nothing carried
        assert!(store.carry_forward(1, false).is_empty());
        assert!(store.carry_forward(0, true).is_empty());
        store.set(1, Vec::new(), FrameIdMode::Index, &images(3));
        assert!(store.carry_forward(1, true).is_empty());
    }

    #[test]
    fn test_carry_forward_skips_empty_previous() {
        let mut store = LabelStore::new();
        store.set(0, Vec::new(), FrameIdMode::Index, &images(3));
        assert!(store.carry_forward(1, true).is_empty());
        // Previous frame never stored
        assert!(store.carry_forward(2, true).is_empty());
    }

    #[test]
    fn test_carry_forward_is_isolated_copy() {
        let mut store = LabelStore::new();
        store.set(0, quad(2.0), FrameIdMode::Index, &images(2));

        let mut carried = store.carry_forward(1, true);
        carried[0] = Point::new(500.0, 500.0);
        carried.pop();

        assert_eq!(store.points(0), quad(2.0).as_slice());
    }

    #[test]
    fn test_reconcile_reorders_by_filename() {
        let imgs = images(3);
        let loaded = vec![
            FrameLabel::new(filename("img_002.png"), quad(2.0)),
            FrameLabel::new(filename("img_000.png"), quad(0.0)),
        ];

        let mut store = LabelStore::new();
        let report = store
            .reconcile(&imgs, loaded, FrameIdMode::Filename, false)
            .unwrap();

        assert_eq!(report.placed, 2);
        assert_eq!(report.placeholders, 1);
        assert!(!report.has_warnings());
        assert_eq!(store.points(0), quad(0.0).as_slice());
        assert_eq!(store.get(1).unwrap().frame_id, filename("img_001.png"));
        assert!(store.points(1).is_empty());
        assert_eq!(store.points(2), quad(2.0).as_slice());
    }

    #[test]
    fn test_reconcile_drops_unmatched() {
        let imgs = images(2);
        let loaded = vec![
            FrameLabel::new(filename("missing.png"), quad(0.0)),
            FrameLabel::new(FrameId::Index(0), quad(1.0)),
            FrameLabel::new(filename("img_001.png"), quad(3.0)),
        ];

        let mut store = LabelStore::new();
        let report = store
            .reconcile(&imgs, loaded, FrameIdMode::Filename, false)
            .unwrap();

        assert_eq!(report.dropped, vec![filename("missing.png"), FrameId::Index(0)]);
        assert_eq!(store.len(), 2);
        assert!(store.points(0).is_empty());
        assert_eq!(store.points(1), quad(3.0).as_slice());
    }

    #[test]
    fn test_reconcile_strict_leaves_store_untouched() {
        let imgs = images(2);
        let mut store = LabelStore::new();
        store.set(0, quad(7.0), FrameIdMode::Filename, &imgs);
        let before = store.clone();

        let loaded = vec![FrameLabel::new(filename("missing.png"), quad(0.0))];
        let err = store
            .reconcile(&imgs, loaded, FrameIdMode::Filename, true)
            .unwrap_err();

        assert!(matches!(err, FormatError::UnmatchedFrame { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_reconcile_duplicate_keeps_later() {
        let imgs = images(1);
        let loaded = vec![
            FrameLabel::new(filename("img_000.png"), quad(0.0)),
            FrameLabel::new(filename("img_000.png"), quad(4.0)),
        ];
        let mut store = LabelStore::new();
        let report = store
            .reconcile(&imgs, loaded, FrameIdMode::Filename, false)
            .unwrap();

        assert_eq!(report.duplicates, vec!["img_000.png".to_string()]);
        assert_eq!(store.points(0), quad(4.0).as_slice());
    }

    #[test]
    fn test_reconcile_positional_pads_and_truncates() {
        let loaded = vec![
            FrameLabel::new(FrameId::Index(0), quad(0.0)),
            FrameLabel::new(FrameId::Index(1), quad(1.0)),
        ];

        let mut store = LabelStore::new();
        store
            .reconcile(&images(4), loaded.clone(), FrameIdMode::Index, false)
            .unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.points(1), quad(1.0).as_slice());
        assert_eq!(store.get(3).unwrap().frame_id, FrameId::Index(3));

        store
            .reconcile(&images(1), loaded, FrameIdMode::Index, false)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.points(0), quad(0.0).as_slice());
    }

    #[test]
    fn test_reconcile_round_trip_is_identity() {
        let imgs = images(4);
        let mut store = LabelStore::new();
        store.set(0, quad(0.0), FrameIdMode::Filename, &imgs);
        store.set(2, quad(2.0), FrameIdMode::Filename, &imgs);
        store.set(3, vec![Point::new(1.25, 2.5)], FrameIdMode::Filename, &imgs);

        let json = store.to_json().unwrap();
        let loaded = LabelStore::from_json(&json).unwrap();

        let mut restored = LabelStore::new();
        restored
            .reconcile(&imgs, loaded.labels().to_vec(), FrameIdMode::Filename, false)
            .unwrap();

        assert_eq!(restored.labels(), store.labels());
    }
}
