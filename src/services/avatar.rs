//! Deterministic default avatars: an SVG of a few flat shapes seeded by the
//! user id, returned as a `data:` URI the client can drop into an `<img>`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const AVATAR_COLORS: [&str; 5] = ["2d3142", "4f5d75", "ef8354", "bfc0c0", "f5a882"];
const AVATAR_SIZE: u32 = 128;

pub fn default_avatar(user_id: Uuid) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    let background = AVATAR_COLORS[digest[0] as usize % AVATAR_COLORS.len()];

    let mut shapes = String::new();
    for chunk in digest[1..].chunks(6).take(3) {
        let color = pick_foreground(chunk[0], background);
        let x = chunk[1] as u32 % AVATAR_SIZE;
        let y = chunk[2] as u32 % AVATAR_SIZE;
        let extent = 24 + chunk[3] as u32 % 48;
        let rotation = chunk[4] as u32 * 360 / 256;
        let shape = match chunk[5] % 3 {
            0 => format!("<circle cx='{x}' cy='{y}' r='{}' fill='#{color}'/>", extent / 2),
            1 => format!(
                "<rect x='{x}' y='{y}' width='{extent}' height='{extent}' fill='#{color}' \
                 transform='rotate({rotation} {x} {y})'/>"
            ),
            _ => format!(
                "<polygon points='{x},{y} {},{y} {},{}' fill='#{color}' \
                 transform='rotate({rotation} {x} {y})'/>",
                x + extent,
                x + extent / 2,
                y + extent
            ),
        };
        shapes.push_str(&shape);
    }

    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{AVATAR_SIZE}' height='{AVATAR_SIZE}' \
         viewBox='0 0 {AVATAR_SIZE} {AVATAR_SIZE}'>\
         <rect width='{AVATAR_SIZE}' height='{AVATAR_SIZE}' fill='#{background}'/>{shapes}</svg>"
    );
    format!("data:image/svg+xml;utf8,{}", encode_svg(&svg))
}

fn pick_foreground(seed: u8, background: &str) -> &'static str {
    let start = seed as usize % AVATAR_COLORS.len();
    (0..AVATAR_COLORS.len())
        .map(|i| AVATAR_COLORS[(start + i) % AVATAR_COLORS.len()])
        .find(|c| *c != background)
        .unwrap_or(AVATAR_COLORS[start])
}

/// Percent-encode the characters that break an unquoted `utf8` data URI.
fn encode_svg(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len() + svg.len() / 4);
    for c in svg.chars() {
        match c {
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '"' => out.push_str("%22"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(default_avatar(id), default_avatar(id));
        assert_ne!(default_avatar(id), default_avatar(Uuid::new_v4()));
    }

    #[test]
    fn test_avatar_is_encoded_data_uri() {
        let avatar = default_avatar(Uuid::nil());
        assert!(avatar.starts_with("data:image/svg+xml;utf8,%3Csvg"));
        assert!(!avatar.contains('#'));
        assert!(!avatar.contains(' '));
    }
}
