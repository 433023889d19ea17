//! `#RRGGBB` colour strings as sent by the editor.

use crate::error::{Result, TextliftError};

/// Parse `#RRGGBB` (leading `#` optional) into an RGB triple.
pub fn parse_hex_color(input: &str) -> Result<[u8; 3]> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(TextliftError::InvalidRequest(format!(
            "invalid colour {input:?}, expected #RRGGBB"
        )));
    }

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
            TextliftError::InvalidRequest(format!("invalid colour {input:?}, expected #RRGGBB"))
        })?;
    }
    Ok(rgb)
}
