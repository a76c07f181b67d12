use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ProductId);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(ProductId)
    }
}

/// A persisted inventory row.
///
/// `name` is only guaranteed non-empty at creation time through the add form;
/// renames and direct store inserts accept any text. `quantity` is signed
/// because the store itself does not enforce the non-negative floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
}

impl Product {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_product_id_with_surrounding_whitespace() {
        assert_eq!(" 42 ".parse::<ProductId>().expect("id"), ProductId(42));
        assert!("forty-two".parse::<ProductId>().is_err());
    }

    #[test]
    fn product_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&ProductId(7)).expect("json");
        assert_eq!(json, "7");
    }

    #[test]
    fn zero_quantity_is_out_of_stock() {
        let product = Product {
            id: ProductId(1),
            name: "Widget".into(),
            quantity: 0,
        };
        assert!(product.is_out_of_stock());
    }
}
