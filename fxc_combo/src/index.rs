use crate::{annotation::Combo, error::IndexError};

/// The mixed radix layout mapping combo values to a linear index.
///
/// Dynamic combos take the low order digits in declaration order, so the
/// first dynamic combo has scale 1 and varies fastest. Static combos continue
/// the same progression starting at the product of every dynamic width. The
/// static and dynamic holders of a shader therefore contribute disjoint
/// digits of one combined index.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IndexLayout {
    pub dynamic_scales: Vec<u64>,
    pub static_scales: Vec<u64>,
    /// The product of every combo width, static and dynamic.
    pub total_combos: u64,
    /// The product of the dynamic combo widths alone.
    pub total_dynamic_combos: u64,
}

impl IndexLayout {
    pub fn new(static_combos: &[Combo], dynamic_combos: &[Combo]) -> Result<Self, IndexError> {
        let mut scale = 1u64;

        let mut dynamic_scales = Vec::with_capacity(dynamic_combos.len());
        for combo in dynamic_combos {
            dynamic_scales.push(scale);
            scale = scale
                .checked_mul(combo.width())
                .ok_or_else(|| IndexError::Overflow {
                    name: combo.name.to_string(),
                })?;
        }
        let total_dynamic_combos = scale;

        let mut static_scales = Vec::with_capacity(static_combos.len());
        for combo in static_combos {
            static_scales.push(scale);
            scale = scale
                .checked_mul(combo.width())
                .ok_or_else(|| IndexError::Overflow {
                    name: combo.name.to_string(),
                })?;
        }

        Ok(Self {
            dynamic_scales,
            static_scales,
            total_combos: scale,
            total_dynamic_combos,
        })
    }

    /// The combined index for raw combo values, matching the generated `GetIndex`.
    ///
    /// Values pair with combos in declaration order, one value per combo.
    pub fn index(&self, static_values: &[u32], dynamic_values: &[u32]) -> u64 {
        self.dynamic_scales
            .iter()
            .zip(dynamic_values)
            .chain(self.static_scales.iter().zip(static_values))
            .map(|(scale, value)| scale * u64::from(*value))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    fn combo(name: &str, min: u32, max: u32) -> Combo {
        Combo {
            name: name.into(),
            min,
            max,
        }
    }

    #[test]
    fn dynamic_scales_start_at_one() {
        let statics = [combo("C", 0, 3), combo("D", 0, 1)];
        let dynamics = [combo("A", 0, 1), combo("B", 0, 2)];

        let layout = IndexLayout::new(&statics, &dynamics).unwrap();
        assert_eq!(vec![1, 2], layout.dynamic_scales);
        assert_eq!(vec![6, 24], layout.static_scales);
        assert_eq!(6, layout.total_dynamic_combos);
        assert_eq!(48, layout.total_combos);
    }

    #[test]
    fn no_combos_is_one_combination() {
        let layout = IndexLayout::new(&[], &[]).unwrap();
        assert!(layout.dynamic_scales.is_empty());
        assert!(layout.static_scales.is_empty());
        assert_eq!(1, layout.total_combos);
        assert_eq!(1, layout.total_dynamic_combos);
    }

    #[test]
    fn first_dynamic_combo_varies_fastest() {
        let statics = [combo("FOG", 0, 1)];
        let dynamics = [combo("SKINNING", 0, 1), combo("LIGHTS", 0, 2)];
        let layout = IndexLayout::new(&statics, &dynamics).unwrap();

        let base = layout.index(&[0], &[0, 0]);
        assert_eq!(base + 1, layout.index(&[0], &[1, 0]));
        assert_eq!(base + 2, layout.index(&[0], &[0, 1]));
        assert_eq!(base + 6, layout.index(&[1], &[0, 0]));
    }

    #[test]
    fn zero_based_combos_index_every_combination_once() {
        let statics = [combo("C", 0, 2), combo("D", 0, 1)];
        let dynamics = [combo("A", 0, 1), combo("B", 0, 3)];
        let layout = IndexLayout::new(&statics, &dynamics).unwrap();

        let mut seen = BTreeSet::new();
        for c in 0..3 {
            for d in 0..2 {
                for a in 0..2 {
                    for b in 0..4 {
                        seen.insert(layout.index(&[c, d], &[a, b]));
                    }
                }
            }
        }
        assert_eq!((0..layout.total_combos).collect::<BTreeSet<_>>(), seen);
    }

    #[test]
    fn nonzero_minimums_stay_injective() {
        // GetIndex multiplies raw values, so ranges starting above zero
        // leave holes but never collide.
        let statics = [combo("X", 1, 2)];
        let dynamics = [combo("Y", 1, 3)];
        let layout = IndexLayout::new(&statics, &dynamics).unwrap();

        let mut seen = BTreeSet::new();
        for x in 1..=2 {
            for y in 1..=3 {
                seen.insert(layout.index(&[x], &[y]));
            }
        }
        assert_eq!(6, seen.len());
    }

    #[test]
    fn overflowing_combination_count_fails() {
        let statics = [combo("A", 0, u32::MAX), combo("B", 0, u32::MAX)];

        let result = IndexLayout::new(&statics, &[]);
        assert!(matches!(
            result,
            Err(IndexError::Overflow { name }) if name == "B"
        ));
    }
}
