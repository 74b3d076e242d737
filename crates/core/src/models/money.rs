//! Serde adapter for money fields.
//!
//! Prices arrive as JSON numbers or numeric strings depending on the
//! endpoint. Either spelling is accepted, and amounts are always written
//! back as JSON numbers so a record read from the backend can be saved
//! without changing the type of its price fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    rust_decimal::serde::float::serialize(value, serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    <Decimal as Deserialize>::deserialize(deserializer)
}

/// Same as the parent module, for optional amounts.
pub mod option {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(amount) => super::serialize(amount, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        Option::<Decimal>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "super")]
        price: Decimal,
        #[serde(default, with = "super::option")]
        discount: Option<Decimal>,
    }

    #[test]
    fn test_string_and_number_inputs_write_back_as_numbers() {
        let priced: Priced =
            serde_json::from_value(json!({"price": "4.50", "discount": 3})).expect("decode");
        assert_eq!(priced.price, Decimal::new(450, 2));

        let written = serde_json::to_value(&priced).expect("encode");
        assert_eq!(written, json!({"price": 4.5, "discount": 3.0}));
    }

    #[test]
    fn test_missing_and_null_optional_amount() {
        let missing: Priced = serde_json::from_value(json!({"price": 1})).expect("missing");
        let null: Priced =
            serde_json::from_value(json!({"price": 1, "discount": null})).expect("null");
        assert!(missing.discount.is_none());
        assert!(null.discount.is_none());
        assert_eq!(serde_json::to_value(&null).expect("encode")["discount"], json!(null));
    }
}
