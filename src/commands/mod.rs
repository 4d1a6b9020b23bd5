//! Command implementations for the pinwire CLI

pub mod info;
pub mod interrupts;
pub mod pin;
pub mod readall;

/// Human-readable name for a `get_alt` code.
pub fn alt_name(alt: i32) -> String {
    match alt {
        -1 => "-".to_string(),
        0 => "IN".to_string(),
        1 => "OUT".to_string(),
        n => format!("ALT{n}"),
    }
}

/// Human-readable name for a `get_pull` code.
pub fn pull_name(pull: i32) -> &'static str {
    match pull {
        0 => "off",
        1 => "down",
        2 => "up",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alt_codes_have_names() {
        assert_eq!(alt_name(-1), "-");
        assert_eq!(alt_name(0), "IN");
        assert_eq!(alt_name(1), "OUT");
        assert_eq!(alt_name(3), "ALT3");
    }

    #[test]
    fn pull_codes_have_names() {
        assert_eq!(pull_name(2), "up");
        assert_eq!(pull_name(-1), "unknown");
    }
}
