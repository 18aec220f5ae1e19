//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Calendar date for leaderboard entries
//! - Run seeds

/// Today's local date as `YYYY-MM-DD`
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Fresh seed for a run
#[cfg(target_arch = "wasm32")]
pub fn new_seed() -> u64 {
    let high = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (js_sys::Date::now() as u64) ^ (high << 32)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn new_seed() -> u64 {
    rand::random()
}
