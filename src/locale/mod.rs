use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTHS_BG: [&str; 12] = [
    "януари",
    "февруари",
    "март",
    "април",
    "май",
    "юни",
    "юли",
    "август",
    "септември",
    "октомври",
    "ноември",
    "декември",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Formatting preferences for amounts and month labels.
///
/// Month names follow the language tag; amounts always render with the
/// configured separators and currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub currency_code: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self::bulgarian()
    }
}

impl Locale {
    pub fn bulgarian() -> Self {
        Self {
            language_tag: "bg-BG".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            currency_code: "BGN".into(),
        }
    }

    pub fn english() -> Self {
        Self {
            language_tag: "en-US".into(),
            ..Self::bulgarian()
        }
    }

    /// Human-readable month-and-year label, e.g. `август 2025 г.`.
    ///
    /// Closed months are keyed by this label, so it must be stable for a
    /// given locale and date.
    pub fn month_label(&self, date: NaiveDate) -> String {
        let month = (date.month0() as usize).min(11);
        match self.language_tag.as_str() {
            "bg-BG" => format!("{} {} г.", MONTHS_BG[month], date.year()),
            _ => format!("{} {}", MONTHS_EN[month], date.year()),
        }
    }

    /// Renders an amount with grouping and the currency code.
    ///
    /// Whole amounts drop the fraction (`7,500 BGN`), everything else keeps
    /// two decimals (`1,234.56 BGN`).
    pub fn format_currency(&self, amount: f64) -> String {
        let precision = if amount.fract().abs() < f64::EPSILON {
            0
        } else {
            2
        };
        format!("{} {}", self.format_number(amount, precision), self.currency_code)
    }

    pub fn format_number(&self, value: f64, precision: u8) -> String {
        let mut body = format!("{:.*}", precision as usize, value);
        if self.decimal_separator != '.' {
            if let Some(pos) = body.find('.') {
                body.replace_range(pos..=pos, &self.decimal_separator.to_string());
            }
        }
        if let Some(pos) = body.find(self.decimal_separator) {
            let mut int_part = body[..pos].to_string();
            insert_grouping(&mut int_part, self.grouping_separator);
            body = format!("{}{}", int_part, &body[pos..]);
        } else {
            insert_grouping(&mut body, self.grouping_separator);
        }
        body
    }
}

fn insert_grouping(int_part: &mut String, separator: char) {
    let mut cleaned = int_part.replace(separator, "");
    if cleaned.starts_with('-') {
        let sign = cleaned.remove(0);
        let grouped = group_digits(&cleaned, separator);
        *int_part = format!("{}{}", sign, grouped);
    } else {
        *int_part = group_digits(&cleaned, separator);
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    let mut count = 0;
    for ch in digits.chars().rev() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
        count += 1;
    }
    grouped
}
