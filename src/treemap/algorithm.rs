use super::node::{LayoutRect, TreemapRect, WeightedItem};

/// Lays out `items` as a treemap of the given container, one rectangle per
/// item, by recursive binary splitting: each region is cut across its longer
/// axis at the half-mass point of its item run, and both halves are laid out
/// independently.
///
/// Callers normally pass items sorted by descending value; any order is
/// accepted and only changes the shape of the result. Emitted rectangles are
/// floored at 1x1 so degenerate containers still yield visible cells.
pub fn compute_layout(items: &[WeightedItem], width: f64, height: f64) -> Vec<TreemapRect> {
    let mut rects = Vec::with_capacity(items.len());
    split_region(items, 0.0, 0.0, width.max(0.0), height.max(0.0), &mut rects);
    rects
}

fn split_region(items: &[WeightedItem], x: f64, y: f64, w: f64, h: f64, out: &mut Vec<TreemapRect>) {
    match items {
        [] => {}
        [item] => out.push(TreemapRect {
            rect: LayoutRect::new(x, y, w.max(1.0), h.max(1.0)),
            id: item.id,
            label: item.label.clone(),
            value: item.value,
        }),
        _ => {
            let total: f64 = items.iter().map(|i| i.value as f64).sum();
            let split = half_mass_index(items, total);
            let (first, second) = items.split_at(split);

            let first_value: f64 = first.iter().map(|i| i.value as f64).sum();
            // An all-zero run has no mass to apportion; fall back to a
            // count-based split so the result stays finite.
            let ratio = if total > 0.0 {
                first_value / total
            } else {
                first.len() as f64 / items.len() as f64
            };

            if w > h {
                let first_w = w * ratio;
                split_region(first, x, y, first_w, h, out);
                split_region(second, x + first_w, y, w - first_w, h, out);
            } else {
                let first_h = h * ratio;
                split_region(first, x, y, w, first_h, out);
                split_region(second, x, y + first_h, w, h - first_h, out);
            }
        }
    }
}

/// Smallest prefix length whose cumulative value reaches half the total.
/// Capped at `len - 1`: when the crossing lands on the last item (possible
/// for unsorted runs), an uncapped cut would leave the second half empty and
/// the recursion would never shrink.
fn half_mass_index(items: &[WeightedItem], total: f64) -> usize {
    let half = total / 2.0;
    let mut sum = 0.0;
    for (i, item) in items.iter().enumerate() {
        sum += item.value as f64;
        if sum >= half {
            return (i + 1).min(items.len() - 1);
        }
    }
    items.len() - 1
}
