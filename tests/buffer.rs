use std::cell::Cell;
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use modatlas::BufferCache;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn fill_red(surface: &mut RgbaImage, _w: u32, _h: u32, _dpi: f32) {
    for px in surface.pixels_mut() {
        *px = Rgba([255, 0, 0, 255]);
    }
}

// ── Memoization ──────────────────────────────────────────────────────────────

#[test]
fn generator_runs_exactly_once_for_one_key() {
    let mut cache = BufferCache::new();
    let runs = Cell::new(0u32);

    let first = cache.get_for_key("color", "#ff0000/1.0", 65, 65, 1.0, |s, w, h, dpi| {
        runs.set(runs.get() + 1);
        fill_red(s, w, h, dpi);
    });

    for _ in 0..999 {
        let again = cache.get_for_key("color", "#ff0000/1.0", 65, 65, 1.0, |s, w, h, dpi| {
            runs.set(runs.get() + 1);
            fill_red(s, w, h, dpi);
        });
        assert!(Rc::ptr_eq(&first, &again), "hits must return the stored surface");
    }

    assert_eq!(runs.get(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn identical_parameters_paint_identical_pixels() {
    let mut a = BufferCache::new();
    let mut b = BufferCache::new();
    let painter = |s: &mut RgbaImage, _w: u32, _h: u32, dpi: f32| {
        for (x, y, px) in s.enumerate_pixels_mut() {
            *px = Rgba([(x % 256) as u8, (y % 256) as u8, (dpi * 10.0) as u8, 255]);
        }
    };
    let sa = a.get_for_key("k", "s", 33, 17, 2.0, painter);
    let sb = b.get_for_key("k", "s", 33, 17, 2.0, painter);
    assert_eq!(sa.as_raw(), sb.as_raw());
}

#[test]
fn distinct_sub_keys_generate_separately() {
    let mut cache = BufferCache::new();
    let red = cache.get_for_key("color", "red", 8, 8, 1.0, |s, _, _, _| {
        s.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    });
    let blue = cache.get_for_key("color", "blue", 8, 8, 1.0, |s, _, _, _| {
        s.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
    });
    assert!(!Rc::ptr_eq(&red, &blue));
    assert_eq!(cache.len(), 2);
    assert_ne!(red.get_pixel(0, 0), blue.get_pixel(0, 0));
}

#[test]
fn distinct_dpi_tiers_generate_separately() {
    let mut cache = BufferCache::new();
    let low = cache.get_for_key("k", "s", 10, 10, 1.0, |_, _, _, _| {});
    let high = cache.get_for_key("k", "s", 10, 10, 2.0, |_, _, _, _| {});
    assert!(!Rc::ptr_eq(&low, &high));
    assert_eq!(low.dimensions(), (10, 10));
    assert_eq!(high.dimensions(), (20, 20));
}

#[test]
fn generator_sees_logical_size_and_quantized_dpi() {
    let mut cache = BufferCache::new();
    cache.get_for_key("k", "s", 65, 33, 1.99, |surface, w, h, dpi| {
        assert_eq!((w, h), (65, 33));
        assert_eq!(dpi, 2.0);
        assert_eq!(surface.dimensions(), (130, 66));
    });
}
