use rand::Rng;

pub const MAX_PLAYER_NAME_LENGTH: usize = 20;

pub fn sanitize_player_name(name: &str, fallback: &str) -> String {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return fallback.to_string();
    }
    cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}

pub fn guest_name() -> String {
    format!("Guest-{:04x}", rand::thread_rng().gen::<u16>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_truncates() {
        assert_eq!(sanitize_player_name("  Sir   Hiss  ", "x"), "Sir Hiss");
        let long = "a".repeat(50);
        assert_eq!(sanitize_player_name(&long, "x").len(), MAX_PLAYER_NAME_LENGTH);
    }

    #[test]
    fn blank_names_use_fallback() {
        assert_eq!(sanitize_player_name("   ", "Guest-0001"), "Guest-0001");
    }

    #[test]
    fn guest_names_have_hex_suffix() {
        let name = guest_name();
        assert!(name.starts_with("Guest-"));
        assert_eq!(name.len(), "Guest-".len() + 4);
    }
}
