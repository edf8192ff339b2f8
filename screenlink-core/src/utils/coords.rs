/// Maps a pixel position inside the sender's video element into `[0, 1]`.
pub fn normalize_coords(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    ((x / width).clamp(0.0, 1.0), (y / height).clamp(0.0, 1.0))
}

/// Maps normalized coordinates back onto the receiver's screen, rounded to whole pixels.
pub fn denormalize_coords(nx: f64, ny: f64, screen_width: u32, screen_height: u32) -> (i32, i32) {
    let x = (nx.clamp(0.0, 1.0) * f64::from(screen_width)).round() as i32;
    let y = (ny.clamp(0.0, 1.0) * f64::from(screen_height)).round() as i32;
    (x, y)
}
