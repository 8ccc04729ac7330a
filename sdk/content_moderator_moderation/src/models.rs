//! Shared constants for the moderate endpoints.

/// Base path for image and text moderation requests.
pub(crate) const MODERATE_BASE: &str = "/contentmoderator/moderate/v1.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderate_base_path() {
        assert_eq!(MODERATE_BASE, "/contentmoderator/moderate/v1.0");
    }
}
