//! Fulfillment destinations.

use serde::{Deserialize, Serialize};

/// The channel an order is delivered to.
///
/// Each known product type has a dedicated worker channel; every other
/// type goes to the single fallback channel:
/// ```text
/// chocolate ──► worker.chocolate.inbound
/// caramel   ──► worker.caramel.inbound
/// blueberry ──► worker.blueberry.inbound
/// *         ──► factory.unknown.inbound
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Chocolate,
    Caramel,
    Blueberry,
    /// Fallback for product types the bakery does not know.
    Unknown,
}

impl Destination {
    /// Destinations served by bakery workers.
    pub const KNOWN: [Destination; 3] = [
        Destination::Chocolate,
        Destination::Caramel,
        Destination::Blueberry,
    ];

    /// Returns every destination, fallback last.
    pub fn all() -> [Destination; 4] {
        [
            Destination::Chocolate,
            Destination::Caramel,
            Destination::Blueberry,
            Destination::Unknown,
        ]
    }

    /// Maps a product type to its destination.
    ///
    /// Matching ignores surrounding whitespace and ASCII case. Anything
    /// outside the known set maps to [`Destination::Unknown`].
    pub fn for_type(product_type: &str) -> Self {
        let product_type = product_type.trim();
        Self::KNOWN
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(product_type))
            .unwrap_or(Destination::Unknown)
    }

    /// Returns true for the fallback destination.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Destination::Unknown)
    }

    /// Returns the short name of the destination.
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Chocolate => "chocolate",
            Destination::Caramel => "caramel",
            Destination::Blueberry => "blueberry",
            Destination::Unknown => "unknown",
        }
    }

    /// Returns the channel identifier consumers subscribe to.
    pub fn channel_name(&self) -> &'static str {
        match self {
            Destination::Chocolate => "worker.chocolate.inbound",
            Destination::Caramel => "worker.caramel.inbound",
            Destination::Blueberry => "worker.blueberry.inbound",
            Destination::Unknown => "factory.unknown.inbound",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.channel_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_map_to_worker_channels() {
        assert_eq!(
            Destination::for_type("chocolate").channel_name(),
            "worker.chocolate.inbound"
        );
        assert_eq!(
            Destination::for_type("caramel").channel_name(),
            "worker.caramel.inbound"
        );
        assert_eq!(
            Destination::for_type("blueberry").channel_name(),
            "worker.blueberry.inbound"
        );
    }

    #[test]
    fn unknown_types_map_to_fallback() {
        for t in ["brownie", "", "chocolate chip", "unknown", "cookie"] {
            let d = Destination::for_type(t);
            assert_eq!(d, Destination::Unknown, "type {t:?}");
            assert_eq!(d.channel_name(), "factory.unknown.inbound");
        }
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        assert_eq!(Destination::for_type(" Chocolate "), Destination::Chocolate);
        assert_eq!(Destination::for_type("BLUEBERRY"), Destination::Blueberry);
    }

    #[test]
    fn mapping_is_pure() {
        for t in ["caramel", "brownie"] {
            assert_eq!(Destination::for_type(t), Destination::for_type(t));
        }
    }

    #[test]
    fn all_lists_fallback_last() {
        let all = Destination::all();
        assert_eq!(all.len(), 4);
        assert!(all[3].is_fallback());
        assert!(Destination::KNOWN.iter().all(|d| !d.is_fallback()));
    }

    #[test]
    fn display_is_channel_name() {
        assert_eq!(Destination::Unknown.to_string(), "factory.unknown.inbound");
    }
}
