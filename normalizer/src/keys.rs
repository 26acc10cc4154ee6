//! Measurement Protocol Parameter Keys
//!
//! The protocol packs indexed families into flat parameter names. This module
//! is the single place where that grammar lives.
//!
//! # Grammar
//!
//! Every index is 1 to 3 ASCII digits and the whole key must be consumed.
//!
//! ```text
//! cd<N>                   custom dimension N
//! cm<N>                   custom metric N
//! promo<N>(id|nm|cr|ps)   promotion N field
//! pr<N><field>            cart/detail product N field
//! il<L>nm                 impression list L name
//! il<L>pi<N><field>       impression list L, product N field
//!
//! field := id | nm | br | ca | va | pr | qt | cc | ps | cd<M> | cm<M>
//! ```
//!
//! `ParamKey` renders back to the exact key string via `Display`, leading
//! zeros included, so sibling lookups are always built from typed tokens.

use std::fmt;

const MAX_INDEX_DIGITS: usize = 3;

/// An index as written in a key. `01` and `1` have the same value but name
/// different parameters, so the digit count is part of the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Index {
    value: u16,
    digits: u8,
}

impl Index {
    /// Index with its shortest spelling
    pub const fn new(value: u16) -> Self {
        let mut digits = 1;
        let mut rest = value / 10;
        while rest > 0 {
            digits += 1;
            rest /= 10;
        }
        Self { value, digits }
    }

    pub const fn value(self) -> u16 {
        self.value
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.value, width = usize::from(self.digits))
    }
}

/// A recognized, typed parameter key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    CustomDimension(Index),
    CustomMetric(Index),
    Promotion {
        index: Index,
        field: PromotionField,
    },
    Product {
        index: Index,
        field: ProductField,
    },
    ImpressionListName(Index),
    Impression {
        list: Index,
        index: Index,
        field: ProductField,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromotionField {
    Id,
    Name,
    Creative,
    Position,
}

impl PromotionField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(PromotionField::Id),
            "nm" => Some(PromotionField::Name),
            "cr" => Some(PromotionField::Creative),
            "ps" => Some(PromotionField::Position),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionField::Id => "id",
            PromotionField::Name => "nm",
            PromotionField::Creative => "cr",
            PromotionField::Position => "ps",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductField {
    Id,
    Name,
    Brand,
    Category,
    Variant,
    Price,
    Quantity,
    CouponCode,
    Position,
    CustomDimension(Index),
    CustomMetric(Index),
}

impl ProductField {
    fn parse(s: &str) -> Option<Self> {
        let field = match s {
            "id" => ProductField::Id,
            "nm" => ProductField::Name,
            "br" => ProductField::Brand,
            "ca" => ProductField::Category,
            "va" => ProductField::Variant,
            "pr" => ProductField::Price,
            "qt" => ProductField::Quantity,
            "cc" => ProductField::CouponCode,
            "ps" => ProductField::Position,
            _ => {
                if let Some(rest) = s.strip_prefix("cd") {
                    ProductField::CustomDimension(exact_index(rest)?)
                } else if let Some(rest) = s.strip_prefix("cm") {
                    ProductField::CustomMetric(exact_index(rest)?)
                } else {
                    return None;
                }
            }
        };
        Some(field)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductField::Id => f.write_str("id"),
            ProductField::Name => f.write_str("nm"),
            ProductField::Brand => f.write_str("br"),
            ProductField::Category => f.write_str("ca"),
            ProductField::Variant => f.write_str("va"),
            ProductField::Price => f.write_str("pr"),
            ProductField::Quantity => f.write_str("qt"),
            ProductField::CouponCode => f.write_str("cc"),
            ProductField::Position => f.write_str("ps"),
            ProductField::CustomDimension(i) => write!(f, "cd{i}"),
            ProductField::CustomMetric(i) => write!(f, "cm{i}"),
        }
    }
}

/// Splits a leading index off `s`. Returns None when there are no digits or
/// more than the protocol allows.
fn split_index(s: &str) -> Option<(Index, &str)> {
    let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || digits > MAX_INDEX_DIGITS {
        return None;
    }
    let (number, rest) = s.split_at(digits);
    let index = Index {
        value: number.parse().ok()?,
        digits: digits as u8,
    };
    Some((index, rest))
}

/// Parses `s` as an index that spans the whole string
fn exact_index(s: &str) -> Option<Index> {
    match split_index(s)? {
        (index, "") => Some(index),
        _ => None,
    }
}

impl ParamKey {
    /// Parses a parameter name. Unrecognized or malformed names yield None.
    pub fn parse(key: &str) -> Option<Self> {
        if let Some(rest) = key.strip_prefix("promo") {
            let (index, rest) = split_index(rest)?;
            let field = PromotionField::parse(rest)?;
            return Some(ParamKey::Promotion { index, field });
        }

        if let Some(rest) = key.strip_prefix("pr") {
            let (index, rest) = split_index(rest)?;
            let field = ProductField::parse(rest)?;
            return Some(ParamKey::Product { index, field });
        }

        if let Some(rest) = key.strip_prefix("il") {
            let (list, rest) = split_index(rest)?;
            if rest == "nm" {
                return Some(ParamKey::ImpressionListName(list));
            }
            let rest = rest.strip_prefix("pi")?;
            let (index, rest) = split_index(rest)?;
            let field = ProductField::parse(rest)?;
            return Some(ParamKey::Impression { list, index, field });
        }

        if let Some(rest) = key.strip_prefix("cd") {
            return exact_index(rest).map(ParamKey::CustomDimension);
        }

        if let Some(rest) = key.strip_prefix("cm") {
            return exact_index(rest).map(ParamKey::CustomMetric);
        }

        None
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::CustomDimension(i) => write!(f, "cd{i}"),
            ParamKey::CustomMetric(i) => write!(f, "cm{i}"),
            ParamKey::Promotion { index, field } => write!(f, "promo{index}{}", field.as_str()),
            ParamKey::Product { index, field } => write!(f, "pr{index}{field}"),
            ParamKey::ImpressionListName(list) => write!(f, "il{list}nm"),
            ParamKey::Impression { list, index, field } => write!(f, "il{list}pi{index}{field}"),
        }
    }
}
