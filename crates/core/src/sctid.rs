//! SCTID syntax: partition digits and the Verhoeff check digit
//!
//! An SCTID is a 6-18 digit decimal string with no leading zero. The last
//! digit is a Verhoeff check digit; the two digits before it form the
//! partition identifier. The first partition digit selects the format
//! (0 = short/international, 1 = long/namespaced), the second selects the
//! component category (0 = concept, 1 = description, 2 = relationship).
//!
//! Identifier *issuance* is the job of the external identifier service; this
//! module only knows how to validate and compose the syntax.

use crate::types::{ComponentCategory, IdNamespace};

/// Minimum SCTID length in digits.
pub const MIN_LENGTH: usize = 6;
/// Maximum SCTID length in digits.
pub const MAX_LENGTH: usize = 18;

// Verhoeff dihedral group multiplication table.
const D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

// Verhoeff position permutation table.
const P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

// Verhoeff inverse table.
const INV: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

fn digits_of(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.bytes().map(|b| b - b'0').collect())
}

/// Compute the Verhoeff check digit for a digit string (without the check
/// digit itself).
///
/// Returns None when the input is empty or not purely numeric.
pub fn check_digit(body: &str) -> Option<u8> {
    let digits = digits_of(body)?;
    let mut c = 0u8;
    for (i, d) in digits.iter().rev().enumerate() {
        c = D[c as usize][P[(i + 1) % 8][*d as usize] as usize];
    }
    Some(INV[c as usize])
}

/// Verify the Verhoeff checksum over a full digit string (check digit last).
pub fn verify_checksum(full: &str) -> bool {
    let Some(digits) = digits_of(full) else {
        return false;
    };
    let mut c = 0u8;
    for (i, d) in digits.iter().rev().enumerate() {
        c = D[c as usize][P[i % 8][*d as usize] as usize];
    }
    c == 0
}

/// Whether a string is a syntactically valid SCTID: 6-18 digits, no leading
/// zero, a known partition identifier, and a correct check digit.
pub fn is_valid(id: &str) -> bool {
    if id.len() < MIN_LENGTH || id.len() > MAX_LENGTH {
        return false;
    }
    if id.starts_with('0') {
        return false;
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let bytes = id.as_bytes();
    let format = bytes[id.len() - 3] - b'0';
    let category = bytes[id.len() - 2] - b'0';
    if format > 1 || category > 2 {
        return false;
    }
    verify_checksum(id)
}

/// The component category encoded in a valid SCTID's partition identifier.
///
/// Returns None when the identifier is not a syntactically valid SCTID.
pub fn category_of(id: &str) -> Option<ComponentCategory> {
    if !is_valid(id) {
        return None;
    }
    match id.as_bytes()[id.len() - 2] - b'0' {
        0 => Some(ComponentCategory::Concept),
        1 => Some(ComponentCategory::Description),
        2 => Some(ComponentCategory::Relationship),
        _ => None,
    }
}

/// Compose an SCTID from an item number, namespace, and category.
///
/// Short format (international namespace): `item ++ 0 ++ category ++ check`.
/// Long format (extension namespace): `item ++ namespace(7) ++ 1 ++ category
/// ++ check`. Returns None when `item` is zero (a leading zero is not
/// representable) or the result would exceed the maximum length.
pub fn compose(item: u64, namespace: IdNamespace, category: ComponentCategory) -> Option<String> {
    if item == 0 {
        return None;
    }
    let body = match namespace.0 {
        None => format!("{}0{}", item, category.partition_digit()),
        Some(ns) => {
            if ns > 9_999_999 {
                return None;
            }
            format!("{}{:07}1{}", item, ns, category.partition_digit())
        }
    };
    if body.len() + 1 > MAX_LENGTH || body.len() + 1 < MIN_LENGTH {
        return None;
    }
    let check = check_digit(&body)?;
    Some(format!("{}{}", body, check))
}
