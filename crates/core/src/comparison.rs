//! Tie-break ordering between stacks that a sort key considers equal.
//!
//! The chain is: larger count first, renamed before unnamed, hover text
//! (case-insensitive, line by line), dye color as hue/saturation/brightness
//! for dyeable items, and finally lower damage first.

use crate::item::{ItemFlags, ItemStack};
use std::cmp::Ordering;

/// Compare two stacks that are equal under the primary sort key.
pub fn compare_equal_items(a: &ItemStack, b: &ItemStack) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| compare_custom_names(a, b))
        .then_with(|| compare_tooltips(a, b))
        .then_with(|| compare_dye_colors(a, b))
        .then_with(|| a.damage.cmp(&b.damage))
}

fn compare_custom_names(a: &ItemStack, b: &ItemStack) -> Ordering {
    // Renamed stacks come first
    b.has_custom_name().cmp(&a.has_custom_name())
}

fn compare_tooltips(a: &ItemStack, b: &ItemStack) -> Ordering {
    let mut lines_b = b.tooltip.iter();
    for line_a in &a.tooltip {
        let Some(line_b) = lines_b.next() else {
            return Ordering::Greater;
        };
        let cmp = cmp_ignore_case(line_a, line_b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    if lines_b.next().is_some() {
        return Ordering::Less;
    }
    Ordering::Equal
}

fn compare_dye_colors(a: &ItemStack, b: &ItemStack) -> Ordering {
    // Either side dyeable keeps the comparison symmetric
    if !a.flags.contains(ItemFlags::DYEABLE) && !b.flags.contains(ItemFlags::DYEABLE) {
        return Ordering::Equal;
    }
    let [hue_a, sat_a, bri_a] = rgb_to_hsb(a.dye_color_or_default());
    let [hue_b, sat_b, bri_b] = rgb_to_hsb(b.dye_color_or_default());
    hue_a
        .total_cmp(&hue_b)
        .then_with(|| sat_a.total_cmp(&sat_b))
        .then_with(|| bri_a.total_cmp(&bri_b))
}

/// Compare two strings ignoring letter case.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Convert a packed `0xRRGGBB` color into `[hue, saturation, brightness]`,
/// each in `0.0..=1.0`.
pub fn rgb_to_hsb(rgb: u32) -> [f32; 3] {
    let r = ((rgb >> 16) & 0xFF) as f32;
    let g = ((rgb >> 8) & 0xFF) as f32;
    let b = (rgb & 0xFF) as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let brightness = max / 255.0;
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };
    if saturation == 0.0 {
        return [0.0, saturation, brightness];
    }

    let range = max - min;
    let red_c = (max - r) / range;
    let green_c = (max - g) / range;
    let blue_c = (max - b) / range;
    let mut hue = if r == max {
        blue_c - green_c
    } else if g == max {
        2.0 + red_c - blue_c
    } else {
        4.0 + green_c - red_c
    };
    hue /= 6.0;
    if hue < 0.0 {
        hue += 1.0;
    }
    [hue, saturation, brightness]
}
