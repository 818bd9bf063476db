use std::fmt;

/// A slash-separated key into the store tree, e.g. `products/Diamond/stock`.
///
/// Segments never contain `/`; an empty path addresses the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A string is usable as a path segment if it is non-empty and contains
    /// no separator. User-chosen keys (usernames) must pass this.
    pub fn valid_segment(s: &str) -> bool {
        !s.is_empty() && !s.contains('/')
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Constructors for every key the shop touches, so nothing else in the
/// codebase spells out raw path strings.
pub mod paths {
    use super::Path;

    pub fn users() -> Path {
        Path::parse("users")
    }

    pub fn user(id: &str) -> Path {
        users().child(id)
    }

    pub fn user_points(id: &str) -> Path {
        user(id).child("points")
    }

    pub fn products() -> Path {
        Path::parse("products")
    }

    pub fn product(id: &str) -> Path {
        products().child(id)
    }

    pub fn product_stock(id: &str) -> Path {
        product(id).child("stock")
    }

    pub fn product_price(id: &str) -> Path {
        product(id).child("price")
    }

    pub fn product_discount_price(id: &str) -> Path {
        product(id).child("discountPrice")
    }

    pub fn orders() -> Path {
        Path::parse("orders")
    }

    pub fn order(id: &str) -> Path {
        orders().child(id)
    }

    pub fn large_orders() -> Path {
        Path::parse("largeOrders")
    }

    pub fn large_order(id: &str) -> Path {
        large_orders().child(id)
    }

    pub fn branches() -> Path {
        Path::parse("branches")
    }

    pub fn promotions() -> Path {
        Path::parse("promotions")
    }

    pub fn bulk_order_chat(order_id: &str) -> Path {
        Path::parse("bulkOrderChats").child(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_segments() {
        let p = paths::product_stock("Diamond");
        assert_eq!(p.to_string(), "products/Diamond/stock");
    }

    #[test]
    fn parse_ignores_empty_segments() {
        let p = Path::parse("users//alice/");
        assert_eq!(p.segments(), ["users", "alice"]);
    }

    #[test]
    fn segment_validation() {
        assert!(Path::valid_segment("alice"));
        assert!(!Path::valid_segment(""));
        assert!(!Path::valid_segment("a/b"));
    }
}
