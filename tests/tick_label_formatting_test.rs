// tests/tick_label_formatting_test.rs

use ulog_csv_render::plot_framework::format_tick_label;

#[test]
fn wide_spans_use_k_and_m_notation() {
    assert_eq!(format_tick_label(2_500_000.0, 5_000_000.0), "2.5M");
    assert_eq!(format_tick_label(12_000.0, 50_000.0), "12k");
}

#[test]
fn narrow_spans_keep_enough_decimals() {
    // GPS latitude in raw 1e-7 degree units stays exact
    assert_eq!(format_tick_label(473_977_420.0, 2_000.0), "473977420");
    // degrees over a few metres of travel
    assert_eq!(format_tick_label(47.39774, 0.0005), "47.39774");
    assert_eq!(format_tick_label(0.2, 1.2), "0.2");
    assert_eq!(format_tick_label(1.5, 5.0), "1.5");
}

#[test]
fn seconds_axis() {
    assert_eq!(format_tick_label(-34.0, 60.0), "-34");
    assert_eq!(format_tick_label(12.0, 30.0), "12");
}

#[test]
fn degenerate_span_falls_back_to_plain_formatting() {
    assert_eq!(format_tick_label(3.25, 0.0), "3.25");
    assert_eq!(format_tick_label(f64::NAN, 1.0), "NaN");
}
