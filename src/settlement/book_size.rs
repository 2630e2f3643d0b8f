// src/settlement/book_size.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Preço de catálogo a partir do qual um livro é "grande".
/// Vale para painel, relatórios e conquistas.
pub const LARGE_BOOK_PRICE_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookSize {
    Large,
    Small,
}

impl BookSize {
    pub fn classify(catalog_price: Decimal) -> Self {
        if catalog_price >= LARGE_BOOK_PRICE_THRESHOLD {
            BookSize::Large
        } else {
            BookSize::Small
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_is_the_boundary() {
        assert_eq!(BookSize::classify(Decimal::new(1999, 2)), BookSize::Small);
        assert_eq!(BookSize::classify(Decimal::new(2000, 2)), BookSize::Large);
        assert_eq!(BookSize::classify(Decimal::new(45, 0)), BookSize::Large);
        assert_eq!(BookSize::classify(Decimal::ZERO), BookSize::Small);
    }
}
