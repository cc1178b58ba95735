//! Hardware presence resolution.

use tracing::debug;

use crate::config::HardwareDescriptor;

/// Diagnostic used when no present descriptor matches.
pub const NO_HARDWARE: &str = "No valid hardware found";

/// Outcome of matching a board tag against the session descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one present descriptor carries the tag
    Found(HardwareDescriptor),
    /// The scenario must be skipped
    Skip(String),
}

impl Resolution {
    /// Descriptor, if found.
    pub fn descriptor(&self) -> Option<&HardwareDescriptor> {
        match self {
            Resolution::Found(d) => Some(d),
            Resolution::Skip(_) => None,
        }
    }
}

/// Find the single present descriptor whose `hw` equals `tag`.
///
/// Tags match exactly. Absent descriptors are ignored; two or more present
/// matches are ambiguous and skip as well.
pub fn resolve(descriptors: &[HardwareDescriptor], tag: &str) -> Resolution {
    let mut matches = descriptors.iter().filter(|d| d.present && d.hw == tag);
    let resolution = match (matches.next(), matches.count()) {
        (None, _) => Resolution::Skip(NO_HARDWARE.to_string()),
        (Some(found), 0) => Resolution::Found(found.clone()),
        (Some(_), rest) => Resolution::Skip(format!("ambiguous: {} contexts", rest + 1)),
    };
    debug!(tag, ?resolution, "resolved hardware");
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<HardwareDescriptor> {
        vec![
            HardwareDescriptor::new("fmcomms5", "ip:192.168.2.1"),
            HardwareDescriptor::new("daq2", "ip:192.168.2.2").absent(),
        ]
    }

    #[test]
    fn test_found() {
        let resolution = resolve(&descriptors(), "fmcomms5");
        assert_eq!(resolution.descriptor().map(|d| d.uri.as_str()), Some("ip:192.168.2.1"));
    }

    #[test]
    fn test_absent_descriptor_skips() {
        assert_eq!(resolve(&descriptors(), "daq2"), Resolution::Skip(NO_HARDWARE.to_string()));
    }

    #[test]
    fn test_no_descriptors_skips() {
        assert!(matches!(resolve(&[], "fmcomms5"), Resolution::Skip(_)));
    }

    #[test]
    fn test_tag_match_is_exact() {
        assert!(matches!(resolve(&descriptors(), "fmcomms"), Resolution::Skip(_)));
        assert!(matches!(resolve(&descriptors(), "FMCOMMS5"), Resolution::Skip(_)));
    }

    #[test]
    fn test_ambiguous_skips() {
        let mut list = descriptors();
        list.push(HardwareDescriptor::new("fmcomms5", "ip:192.168.2.9"));
        assert_eq!(
            resolve(&list, "fmcomms5"),
            Resolution::Skip("ambiguous: 2 contexts".to_string())
        );
    }
}
