//! Bilingual (EN/VN) keyword tables used by the detectors and ingestors.
//!
//! All tables are immutable statics; components take them through their
//! config structs so tests can substitute custom sets.

/// Substring match anchored at word boundaries on both sides, so "fee"
/// does not hit inside "coffee" and "atm" does not hit inside "Batman".
/// Callers lower-case both sides first. Multi-word keywords match as
/// phrases.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(keyword) {
        let begin = search_from + offset;
        let end = begin + keyword.len();
        let bounded_before = text[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let bounded_after = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if bounded_before && bounded_after {
            return true;
        }
        search_from = begin + text[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Keywords that classify a transaction as income regardless of amount sign.
pub const INCOME_KEYWORDS: &[&str] = &[
    "income",
    "salary",
    "payroll",
    "wage",
    "wages",
    "refund",
    "reimburse",
    "reimbursed",
    "reimbursement",
    "dividend",
    "interest paid",
    "interest credit",
    "cashback",
    "cash back",
    "bonus",
    "deposit",
    "incoming transfer",
    "received",
    "lương",
    "luong",
    "hoàn tiền",
    "hoan tien",
    "tiền lãi",
    "tien lai",
    "lãi suất",
    "thưởng",
    "nhận tiền",
    "nhan tien",
    "tiền vào",
];

/// Keywords that classify a transaction as expense (checked after income).
pub const EXPENSE_KEYWORDS: &[&str] = &[
    "expense",
    "purchase",
    "payment",
    "withdrawal",
    "withdraw",
    "atm",
    "fee",
    "charge",
    "bill",
    "debit",
    "pos",
    "mua hàng",
    "mua hang",
    "thanh toán",
    "thanh toan",
    "rút tiền",
    "rut tien",
    "phí",
    "chuyển khoản đi",
    "chuyen tien",
    "tiền ra",
];

/// Rows whose joined text contains one of these are summary rows, not data.
pub const SUMMARY_ROW_KEYWORDS: &[&str] = &[
    "total",
    "subtotal",
    "grand total",
    "balance",
    "opening balance",
    "closing balance",
    "carried forward",
    "brought forward",
    "tổng cộng",
    "tong cong",
    "tổng",
    "số dư",
    "so du",
    "dư đầu",
    "dư cuối",
    "cộng phát sinh",
];

/// Bank boilerplate prefixes stripped from descriptions (compared upper-case).
/// Transfer wording is deliberately absent: "transfer to"/"transfer from"
/// carries direction evidence the type detector reads off the cleaned text.
pub const BOILERPLATE_PREFIXES: &[&str] = &[
    "PURCHASE AT ",
    "PURCHASE FROM ",
    "PAYMENT TO ",
    "PAYMENT AT ",
    "POS PURCHASE ",
    "POS ",
    "CARD PAYMENT TO ",
    "DIRECT DEBIT ",
    "STANDING ORDER ",
    "MUA HÀNG TẠI ",
    "MUA HANG TAI ",
    "THANH TOÁN CHO ",
    "THANH TOAN CHO ",
    "THANH TOÁN TẠI ",
    "RÚT TIỀN TẠI ",
];

/// City/country tokens that mark the end of a merchant name.
pub const CITY_TOKENS: &[&str] = &[
    "HANOI",
    "HA NOI",
    "HÀ NỘI",
    "HO CHI MINH",
    "HCMC",
    "HCM",
    "SAIGON",
    "SAI GON",
    "DA NANG",
    "DANANG",
    "ĐÀ NẴNG",
    "HAI PHONG",
    "CAN THO",
    "HUE",
    "NHA TRANG",
    "VIETNAM",
    "VIET NAM",
    "SINGAPORE",
    "BANGKOK",
    "KUALA LUMPUR",
    "HONG KONG",
    "TOKYO",
    "SEOUL",
    "LONDON",
    "NEW YORK",
    "SAN FRANCISCO",
];

/// Minor words kept lower-case when title-casing, except as the first word.
pub const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// Currency symbols and ISO codes stripped before numeric parsing.
/// Multi-character tokens come first so they win over their prefixes.
pub const CURRENCY_TOKENS: &[&str] = &[
    "VND", "USD", "EUR", "GBP", "JPY", "CNY", "KRW", "THB", "INR", "CHF", "CAD", "AUD", "NZD",
    "SGD", "HKD", "R$", "₫", "đ", "Đ", "$", "€", "£", "¥", "₹", "฿", "₩", "₽",
];

/// Header-cell keywords per semantic column, used for mapping inference.
pub const DATE_HEADERS: &[&str] = &[
    "date",
    "transaction date",
    "posting date",
    "value date",
    "ngày",
    "ngay",
    "ngày giao dịch",
    "ngay giao dich",
    "ngày hiệu lực",
];

pub const AMOUNT_HEADERS: &[&str] = &[
    "amount",
    "value",
    "money",
    "sum",
    "số tiền",
    "so tien",
    "giá trị",
    "gia tri",
    "thành tiền",
];

pub const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "details",
    "detail",
    "memo",
    "narrative",
    "particulars",
    "remark",
    "content",
    "diễn giải",
    "dien giai",
    "nội dung",
    "noi dung",
    "chi tiết",
    "chi tiet",
    "mô tả",
];

pub const TYPE_HEADERS: &[&str] = &[
    "type",
    "dr/cr",
    "direction",
    "loại",
    "loai",
    "loại giao dịch",
];

pub const REFERENCE_HEADERS: &[&str] = &[
    "reference",
    "ref",
    "ref no",
    "transaction id",
    "số bút toán",
    "so but toan",
    "mã giao dịch",
    "ma giao dich",
];

pub const CATEGORY_HEADERS: &[&str] = &[
    "category",
    "danh mục",
    "danh muc",
    "nhóm",
    "phân loại",
];

/// Tokens identifying a debit column in a statement header.
pub const DEBIT_HEADERS: &[&str] = &[
    "debit",
    "withdrawal",
    "paid out",
    "money out",
    "ghi nợ",
    "ghi no",
    "tiền ra",
    "tien ra",
    "phát sinh nợ",
];

/// Tokens identifying a credit column in a statement header.
pub const CREDIT_HEADERS: &[&str] = &[
    "credit",
    "deposit",
    "paid in",
    "money in",
    "ghi có",
    "ghi co",
    "tiền vào",
    "tien vao",
    "phát sinh có",
];

/// Generic header-row keywords used when scoring candidate header rows.
pub const TABLE_HEADER_KEYWORDS: &[&str] = &[
    "date",
    "amount",
    "description",
    "balance",
    "debit",
    "credit",
    "reference",
    "type",
    "ngày",
    "số tiền",
    "diễn giải",
    "nội dung",
    "số dư",
    "ghi nợ",
    "ghi có",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_keyword_requires_word_boundaries() {
        assert!(contains_keyword("annual fee charged", "fee"));
        assert!(contains_keyword("fee", "fee"));
        assert!(contains_keyword("atm - hanoi", "atm"));
        assert!(!contains_keyword("coffee house", "fee"));
        assert!(!contains_keyword("batman store", "atm"));
        assert!(!contains_keyword("billiards", "bill"));
    }

    #[test]
    fn test_contains_keyword_matches_phrases() {
        assert!(contains_keyword("hoàn tiền đơn hàng", "hoàn tiền"));
        assert!(contains_keyword("incoming transfer from acme", "incoming transfer"));
        assert!(!contains_keyword("hoàn tiềnx", "hoàn tiền"));
    }
}
