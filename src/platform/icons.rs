//! Tray icon generation.
//!
//! Draws a speaker glyph into an RGBA buffer for the system tray.

use tray_icon::Icon;

/// Icon size in pixels.
pub const ICON_SIZE: u32 = 32;

/// Generate the mixer tray icon.
pub fn create_tray_icon() -> Result<Icon, String> {
    let rgba = generate_speaker_icon();
    Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| e.to_string())
}

/// Generate a speaker icon as RGBA data.
fn generate_speaker_icon() -> Vec<u8> {
    let size = ICON_SIZE as usize;
    let mut rgba = vec![0u8; size * size * 4];

    let center = size as f32 / 2.0;
    let radius = size as f32 / 2.0 - 2.0;

    // Rounded badge in the accent color
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            let alpha = if dist < radius {
                255
            } else if dist < radius + 1.0 {
                ((radius + 1.0 - dist) * 255.0) as u8
            } else {
                0
            };
            put_pixel(&mut rgba, size, x, y, (0, 120, 212, alpha));
        }
    }

    draw_speaker(&mut rgba, size);
    rgba
}

/// Draw the speaker cone and two sound waves in white.
fn draw_speaker(rgba: &mut [u8], size: usize) {
    let mid = size / 2;
    let white = (255, 255, 255, 255);

    // Speaker box
    for y in (mid - 3)..(mid + 3) {
        for x in 7..11 {
            put_pixel(rgba, size, x, y, white);
        }
    }

    // Cone widening to the right
    for x in 11..17 {
        let half = 3 + (x - 11);
        for y in (mid - half)..(mid + half) {
            put_pixel(rgba, size, x, y, white);
        }
    }

    // Waves
    for (radius, thickness) in [(5.0_f32, 1.5_f32), (9.0, 1.5)] {
        for y in 0..size {
            for x in 17..size {
                let dx = x as f32 - 14.0;
                let dy = y as f32 - mid as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                if (dist - radius).abs() < thickness && dy.abs() < radius * 0.8 {
                    put_pixel(rgba, size, x, y, white);
                }
            }
        }
    }
}

fn put_pixel(rgba: &mut [u8], size: usize, x: usize, y: usize, color: (u8, u8, u8, u8)) {
    if x >= size || y >= size {
        return;
    }
    let idx = (y * size + x) * 4;
    rgba[idx] = color.0;
    rgba[idx + 1] = color.1;
    rgba[idx + 2] = color.2;
    rgba[idx + 3] = color.3;
}
