use crate::config::PlacementStrategy;
use crate::host::ElementTypeId;
use crate::operations::type_cache::LayerTypeKey;
use crate::structure::{CompoundStructure, Layer, ReferenceLine};

/// Offset of the chosen reference line from the structure's geometric center.
///
/// Positive values lie toward the exterior face. Core-relative lines fall
/// back to the centerline (0) when the structure has no core.
#[must_use]
pub fn reference_offset(structure: &CompoundStructure, reference: ReferenceLine) -> f64 {
    let exterior_face = structure.total_thickness() / 2.0;
    match reference {
        ReferenceLine::Centerline => 0.0,
        ReferenceLine::ExteriorFace => exterior_face,
        ReferenceLine::InteriorFace => -exterior_face,
        ReferenceLine::CoreExteriorFace => structure
            .core_thicknesses()
            .map_or(0.0, |split| exterior_face - split.exterior),
        ReferenceLine::CoreInteriorFace => structure
            .core_thicknesses()
            .map_or(0.0, |split| -exterior_face + split.interior),
        ReferenceLine::CoreCenterline => structure
            .core_thicknesses()
            .map_or(0.0, |split| exterior_face - (split.exterior + split.core / 2.0)),
    }
}

/// Offset of layer `index`'s centerline from the structure's geometric center.
///
/// Returns `None` if `index` is out of range.
#[must_use]
pub fn layer_center_offset(structure: &CompoundStructure, index: usize) -> Option<f64> {
    let layer = structure.layer(index)?;
    let exterior_face = structure.total_thickness() / 2.0;
    Some(exterior_face - (structure.cumulative_width_before(index) + layer.half_width()))
}

/// One nonzero-width layer positioned across the element's thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSlot {
    /// Ordinal in the source structure (0 = exterior).
    pub layer_index: usize,
    pub layer: Layer,
    /// Offset of the layer's centerline from the structure center.
    pub center_offset: f64,
}

/// Lateral layout of a compound structure for one reference line.
///
/// Computed in a single pass over the layers. Zero-width layers are left
/// out of [`Self::slots`] but still count toward cumulative widths.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerLayout {
    total_thickness: f64,
    reference_offset: f64,
    slots: Vec<LayerSlot>,
}

impl LayerLayout {
    /// Lays out `structure` relative to `reference`.
    #[must_use]
    pub fn compute(structure: &CompoundStructure, reference: ReferenceLine) -> Self {
        let total_thickness = structure.total_thickness();
        let exterior_face = total_thickness / 2.0;

        let mut cumulative = 0.0;
        let mut slots = Vec::with_capacity(structure.layer_count());
        for (layer_index, layer) in structure.layers().iter().enumerate() {
            if !layer.is_empty() {
                slots.push(LayerSlot {
                    layer_index,
                    layer: *layer,
                    center_offset: exterior_face - (cumulative + layer.half_width()),
                });
            }
            cumulative += layer.width;
        }

        Self {
            total_thickness,
            reference_offset: reference_offset(structure, reference),
            slots,
        }
    }

    #[must_use]
    pub fn total_thickness(&self) -> f64 {
        self.total_thickness
    }

    #[must_use]
    pub fn reference_offset(&self) -> f64 {
        self.reference_offset
    }

    /// Nonzero-width layers, exterior first.
    #[must_use]
    pub fn slots(&self) -> &[LayerSlot] {
        &self.slots
    }

    /// Lateral offset of a slot's centerline from the element's path curve.
    #[must_use]
    pub fn placement_offset(&self, slot: &LayerSlot) -> f64 {
        self.reference_offset + slot.center_offset
    }

    /// Places every slot according to `strategy`, keyed for type resolution against `base`.
    #[must_use]
    pub fn placements(
        &self,
        base: ElementTypeId,
        strategy: PlacementStrategy,
        width_precision: usize,
    ) -> Vec<LayerPlacement> {
        self.slots
            .iter()
            .map(|slot| LayerPlacement {
                layer_index: slot.layer_index,
                layer: slot.layer,
                offset: match strategy {
                    PlacementStrategy::Adjacent => self.placement_offset(slot),
                    PlacementStrategy::Coincident => 0.0,
                },
                band_offset: self.placement_offset(slot),
                type_key: LayerTypeKey::new(base, &slot.layer, slot.layer_index, width_precision),
            })
            .collect()
    }
}

/// Where one layer element goes, relative to the source path.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlacement {
    pub layer_index: usize,
    pub layer: Layer,
    /// Signed lateral offset at which the layer element's path is placed,
    /// positive toward the exterior.
    pub offset: f64,
    /// Offset of the layer's centerline within the source thickness. Equals
    /// `offset` for adjacent placement; attached objects are matched against it.
    pub band_offset: f64,
    pub type_key: LayerTypeKey,
}

impl LayerPlacement {
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.layer.half_width()
    }

    /// Whether `offset` lies in this layer's band widened by `tolerance`.
    #[must_use]
    pub fn contains(&self, offset: f64, tolerance: f64) -> bool {
        let half = self.half_width() + tolerance;
        (self.band_offset - half..=self.band_offset + half).contains(&offset)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::structure::{CoreRange, LayerFunction};

    fn wall(widths: &[(f64, LayerFunction)], core: Option<CoreRange>) -> CompoundStructure {
        let layers = widths
            .iter()
            .map(|&(w, f)| Layer::new(w, f, None))
            .collect();
        CompoundStructure::new(layers, core).unwrap()
    }

    fn four_layer() -> CompoundStructure {
        wall(
            &[
                (0.05, LayerFunction::Finish1),
                (0.10, LayerFunction::Insulation),
                (0.15, LayerFunction::Structure),
                (0.05, LayerFunction::Finish2),
            ],
            Some(CoreRange::new(2, 2)),
        )
    }

    #[test]
    fn core_centerline_worked_example() {
        let structure = four_layer();
        let layout = LayerLayout::compute(&structure, ReferenceLine::CoreCenterline);

        assert_abs_diff_eq!(layout.total_thickness(), 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(layout.reference_offset(), -0.05, epsilon = 1e-12);
        assert_eq!(layout.slots().len(), 4);

        let first = &layout.slots()[0];
        assert_abs_diff_eq!(first.center_offset, 0.15, epsilon = 1e-12);
        assert_abs_diff_eq!(layout.placement_offset(first), 0.10, epsilon = 1e-12);

        let structural = &layout.slots()[2];
        assert_abs_diff_eq!(structural.center_offset, -0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(layout.placement_offset(structural), -0.10, epsilon = 1e-12);
    }

    #[test]
    fn free_functions_match_layout() {
        let structure = four_layer();
        for reference in ReferenceLine::ALL {
            let layout = LayerLayout::compute(&structure, reference);
            assert_abs_diff_eq!(
                layout.reference_offset(),
                reference_offset(&structure, reference),
                epsilon = 1e-12
            );
            for slot in layout.slots() {
                let expected = layer_center_offset(&structure, slot.layer_index).unwrap();
                assert_abs_diff_eq!(slot.center_offset, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn centerline_is_width_weighted_centroid() {
        let structure = wall(
            &[
                (0.02, LayerFunction::Finish1),
                (0.31, LayerFunction::Structure),
                (0.07, LayerFunction::Insulation),
                (0.013, LayerFunction::Finish2),
            ],
            None,
        );
        let layout = LayerLayout::compute(&structure, ReferenceLine::Centerline);
        let moment: f64 = layout
            .slots()
            .iter()
            .map(|slot| layout.placement_offset(slot) * slot.layer.width)
            .sum();
        assert_abs_diff_eq!(moment / layout.total_thickness(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn offsets_decrease_from_exterior_to_interior() {
        let structure = four_layer();
        for reference in ReferenceLine::ALL {
            let layout = LayerLayout::compute(&structure, reference);
            let offsets: Vec<f64> = layout
                .slots()
                .iter()
                .map(|slot| layout.placement_offset(slot))
                .collect();
            assert!(
                offsets.windows(2).all(|pair| pair[0] > pair[1]),
                "{reference}: {offsets:?}"
            );
        }
    }

    #[test]
    fn exterior_face_stack_starts_at_innermost_edge() {
        let structure = four_layer();
        let layout = LayerLayout::compute(&structure, ReferenceLine::ExteriorFace);
        let slots = layout.slots();
        let innermost = &slots[slots.len() - 1];
        let outermost = &slots[0];

        let innermost_low = layout.placement_offset(innermost) - innermost.layer.half_width();
        let outermost_high = layout.placement_offset(outermost) + outermost.layer.half_width();

        assert_abs_diff_eq!(innermost_low, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(outermost_high, structure.total_thickness(), epsilon = 1e-12);
    }

    #[test]
    fn bands_tile_without_gaps() {
        let structure = four_layer();
        let layout = LayerLayout::compute(&structure, ReferenceLine::InteriorFace);
        for pair in layout.slots().windows(2) {
            let outer_low = layout.placement_offset(&pair[0]) - pair[0].layer.half_width();
            let inner_high = layout.placement_offset(&pair[1]) + pair[1].layer.half_width();
            assert_abs_diff_eq!(outer_low, inner_high, epsilon = 1e-12);
        }
    }

    #[test]
    fn core_modes_degrade_to_centerline_without_core() {
        let structure = wall(
            &[
                (0.1, LayerFunction::Finish1),
                (0.2, LayerFunction::Structure),
            ],
            None,
        );
        for reference in [
            ReferenceLine::CoreCenterline,
            ReferenceLine::CoreExteriorFace,
            ReferenceLine::CoreInteriorFace,
        ] {
            assert!(reference_offset(&structure, reference).abs() < 1e-15);
        }
    }

    #[test]
    fn core_faces_bound_the_core() {
        let structure = four_layer();
        let exterior = reference_offset(&structure, ReferenceLine::CoreExteriorFace);
        let interior = reference_offset(&structure, ReferenceLine::CoreInteriorFace);
        assert_abs_diff_eq!(exterior, 0.025, epsilon = 1e-12);
        assert_abs_diff_eq!(interior, -0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(exterior - interior, 0.15, epsilon = 1e-12);
    }

    #[test]
    fn coincident_placements_share_the_path() {
        let structure = four_layer();
        let base = slotmap::SlotMap::<ElementTypeId, ()>::with_key().insert(());
        let layout = LayerLayout::compute(&structure, ReferenceLine::ExteriorFace);

        let adjacent = layout.placements(base, PlacementStrategy::Adjacent, 6);
        let coincident = layout.placements(base, PlacementStrategy::Coincident, 6);

        assert_eq!(adjacent.len(), 4);
        assert!(coincident.iter().all(|p| p.offset.abs() < 1e-15));
        assert_eq!(adjacent[2].type_key, coincident[2].type_key);
        for (a, c) in adjacent.iter().zip(&coincident) {
            assert_abs_diff_eq!(a.offset, a.band_offset, epsilon = 1e-15);
            assert_abs_diff_eq!(c.band_offset, a.band_offset, epsilon = 1e-15);
        }
        assert!(coincident[2].contains(adjacent[2].offset, 1e-9));
        assert!(!coincident[0].contains(0.0, 1e-9));
        assert!(adjacent[0].contains(adjacent[0].offset + 0.025, 1e-9));
        assert!(!adjacent[0].contains(adjacent[0].offset + 0.03, 1e-9));
    }

    #[test]
    fn zero_width_layers_are_skipped() {
        let structure = wall(
            &[
                (0.1, LayerFunction::Finish1),
                (0.0, LayerFunction::Membrane),
                (0.2, LayerFunction::Structure),
            ],
            None,
        );
        let layout = LayerLayout::compute(&structure, ReferenceLine::Centerline);
        let indices: Vec<usize> = layout.slots().iter().map(|s| s.layer_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_abs_diff_eq!(layout.slots()[1].center_offset, -0.05, epsilon = 1e-12);
    }
}
